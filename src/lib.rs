pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod images;
pub mod models;
pub mod store;

pub use error::AppError;
pub use models::{Card, Deck, DeckSet, NewCard, StudyMode, StudySession, Tally};
pub use store::DeckStore;
