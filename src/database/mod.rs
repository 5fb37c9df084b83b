pub mod db;
pub mod kv;
pub mod saver;

pub use db::SqliteKv;
pub use kv::{KeyValueStore, MemoryKv};
pub use saver::Saver;
