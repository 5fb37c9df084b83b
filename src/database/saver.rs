//! Background writer for store snapshots.
//!
//! Saves are queued over a channel and written by a dedicated thread, so callers
//! never wait on storage. When several snapshots are queued at once only the newest
//! one is written. Failures are logged and dropped.

use super::KeyValueStore;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

enum SaveMsg {
    Save(String),
    Flush(Sender<()>),
}

pub struct Saver {
    tx: Option<Sender<SaveMsg>>,
    handle: Option<JoinHandle<()>>,
}

impl Saver {
    /// Starts the writer thread. If the thread cannot be started, saves are
    /// silently disabled.
    pub fn spawn(backend: Box<dyn KeyValueStore>, key: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let key = key.to_string();

        match thread::Builder::new()
            .name("docard-saver".to_string())
            .spawn(move || run(backend, &key, rx))
        {
            Ok(handle) => Self {
                tx: Some(tx),
                handle: Some(handle),
            },
            Err(e) => {
                warn!("Could not start save thread, changes will not be persisted: {}", e);
                Self {
                    tx: None,
                    handle: None,
                }
            }
        }
    }

    /// Queues a snapshot for writing and returns immediately.
    pub fn save(&self, blob: String) {
        if let Some(tx) = &self.tx {
            if tx.send(SaveMsg::Save(blob)).is_err() {
                warn!("Save thread is gone, snapshot dropped");
            }
        }
    }

    /// Blocks until every snapshot queued before this call has been attempted.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if tx.send(SaveMsg::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for Saver {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain what is queued and exit.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Save thread panicked");
            }
        }
    }
}

fn run(backend: Box<dyn KeyValueStore>, key: &str, rx: Receiver<SaveMsg>) {
    while let Ok(first) = rx.recv() {
        let mut latest = None;
        let mut acks = Vec::new();

        let mut next = Some(first);
        while let Some(msg) = next {
            match msg {
                SaveMsg::Save(blob) => latest = Some(blob),
                SaveMsg::Flush(ack) => acks.push(ack),
            }
            next = rx.try_recv().ok();
        }

        if let Some(blob) = latest {
            match backend.save(key, &blob) {
                Ok(()) => debug!("Saved snapshot ({} bytes)", blob.len()),
                Err(e) => warn!("Failed to save decks: {}", e),
            }
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryKv;

    #[test]
    fn test_flush_waits_for_queued_saves() {
        let kv = MemoryKv::new();
        let saver = Saver::spawn(Box::new(kv.clone()), "k");

        saver.save("one".to_string());
        saver.save("two".to_string());
        saver.flush();

        assert_eq!(kv.get("k").as_deref(), Some("two"));
    }

    #[test]
    fn test_drop_drains_queue() {
        let kv = MemoryKv::new();
        {
            let saver = Saver::spawn(Box::new(kv.clone()), "k");
            saver.save("last".to_string());
        }
        assert_eq!(kv.get("k").as_deref(), Some("last"));
    }

    #[test]
    fn test_failed_save_is_swallowed() {
        let kv = MemoryKv::with_entry("k", "old");
        kv.set_fail_saves(true);
        let saver = Saver::spawn(Box::new(kv.clone()), "k");

        saver.save("new".to_string());
        saver.flush();
        assert_eq!(kv.get("k").as_deref(), Some("old"));

        kv.set_fail_saves(false);
        saver.save("newer".to_string());
        saver.flush();
        assert_eq!(kv.get("k").as_deref(), Some("newer"));
    }
}
