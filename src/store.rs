//! The deck store: single owner of all decks and cards.
//!
//! Reads always see the in-memory state. Every mutation that changes something
//! queues a snapshot of the whole collection on the background [`Saver`], so
//! persistence trails the in-memory state and never blocks the caller.

use crate::database::db::DECKS_KEY;
use crate::database::{KeyValueStore, Saver};
use crate::models::{
    CardPatch, Deck, DeckSet, DeckStats, LastScore, NewCard, StudyMode, StudySession, Tally,
};
use chrono::Utc;
use tracing::{info, warn};

pub struct DeckStore {
    decks: DeckSet,
    saver: Saver,
    first_run: bool,
}

impl DeckStore {
    /// Loads the persisted snapshot from `backend` and takes ownership of it for
    /// later saves. A missing or unreadable snapshot gives an empty store.
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        let (decks, first_run) = load_snapshot(&*backend);
        info!("Loaded {} decks", decks.decks.len());

        Self {
            decks,
            saver: Saver::spawn(backend, DECKS_KEY),
            first_run,
        }
    }

    /// True when the backend had never stored a snapshot. An empty or unreadable
    /// snapshot does not count.
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks.decks
    }

    pub fn deck(&self, deck_id: &str) -> Option<&Deck> {
        self.decks.deck(deck_id)
    }

    pub fn search(&self, query: &str) -> Vec<&Deck> {
        self.decks.search(query)
    }

    pub fn stats(&self) -> DeckStats {
        self.decks.stats()
    }

    pub fn add_deck(&mut self, title: &str) -> Option<String> {
        let id = self.decks.add_deck(title)?;
        info!("Deck '{}' created", title.trim());
        self.persist();
        Some(id)
    }

    pub fn remove_deck(&mut self, deck_id: &str) -> bool {
        self.changed(|decks| decks.remove_deck(deck_id))
    }

    pub fn add_card(&mut self, deck_id: &str, card: NewCard) -> Option<String> {
        let id = self.decks.add_card(deck_id, card)?;
        self.persist();
        Some(id)
    }

    pub fn remove_card(&mut self, deck_id: &str, card_id: &str) -> bool {
        self.changed(|decks| decks.remove_card(deck_id, card_id))
    }

    pub fn update_card(&mut self, deck_id: &str, card_id: &str, patch: CardPatch) -> bool {
        self.changed(|decks| decks.update_card(deck_id, card_id, patch))
    }

    /// Records a session result as the deck's last score, stamped with the
    /// current time.
    pub fn set_deck_score(&mut self, deck_id: &str, correct: u32, total: u32) -> Option<LastScore> {
        let score = self
            .decks
            .set_deck_score(deck_id, correct, total, Utc::now())?
            .clone();
        self.persist();
        Some(score)
    }

    /// Adds a deck built elsewhere, e.g. read from a JSON file.
    pub fn import_deck(&mut self, deck: Deck) -> Option<String> {
        let title = deck.title.clone();
        let id = self.decks.insert_deck(deck)?;
        info!("Deck '{}' imported", title.trim());
        self.persist();
        Some(id)
    }

    /// Starts a study session over a snapshot of the deck's cards.
    /// Returns `None` if the deck does not exist.
    pub fn start_session(&self, deck_id: &str, mode: StudyMode) -> Option<StudySession> {
        self.deck(deck_id).map(|deck| StudySession::new(deck, mode))
    }

    /// Applies the result of a finished session to its deck.
    pub fn commit_tally(&mut self, tally: &Tally) -> Option<LastScore> {
        self.set_deck_score(&tally.deck_id, tally.correct, tally.total)
    }

    /// Waits until every change made so far has been written.
    pub fn flush(&self) {
        self.saver.flush();
    }

    fn changed(&mut self, mutate: impl FnOnce(&mut DeckSet) -> bool) -> bool {
        let changed = mutate(&mut self.decks);
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&self) {
        match self.decks.to_json() {
            Ok(blob) => self.saver.save(blob),
            Err(e) => warn!("Failed to serialize decks: {}", e),
        }
    }
}

/// Returns the loaded decks and whether no snapshot existed yet.
fn load_snapshot(backend: &dyn KeyValueStore) -> (DeckSet, bool) {
    let blob = match backend.load(DECKS_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return (DeckSet::default(), true),
        Err(e) => {
            warn!("Failed to load decks, starting empty: {}", e);
            return (DeckSet::default(), false);
        }
    };

    let decks = DeckSet::from_json(&blob).unwrap_or_else(|e| {
        warn!("Stored decks are unreadable, starting empty: {}", e);
        DeckSet::default()
    });
    (decks, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryKv, SqliteKv};
    use crate::models::SessionPhase;

    fn open_memory() -> (DeckStore, MemoryKv) {
        let kv = MemoryKv::new();
        (DeckStore::open(Box::new(kv.clone())), kv)
    }

    #[test]
    fn test_starts_empty_without_snapshot() {
        let (store, kv) = open_memory();
        assert!(store.decks().is_empty());
        store.flush();
        assert_eq!(kv.get(DECKS_KEY), None);
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let kv = MemoryKv::with_entry(DECKS_KEY, "{ not json");
        let store = DeckStore::open(Box::new(kv));
        assert!(store.decks().is_empty());
        assert!(!store.is_first_run());
    }

    #[test]
    fn test_first_run_only_without_snapshot() {
        let (store, _kv) = open_memory();
        assert!(store.is_first_run());
    }

    #[test]
    fn test_emptied_store_is_not_first_run() {
        let kv = MemoryKv::new();
        {
            let mut store = DeckStore::open(Box::new(kv.clone()));
            let deck = store.add_deck("Spanish").unwrap();
            store.remove_deck(&deck);
        }
        assert_eq!(kv.get(DECKS_KEY).as_deref(), Some(r#"{"version":1,"decks":[]}"#));

        let store = DeckStore::open(Box::new(kv));
        assert!(store.decks().is_empty());
        assert!(!store.is_first_run());
    }

    #[test]
    fn test_unreadable_snapshot_is_left_alone() {
        let blob = r#"{"version":2,"decks":[{"id":"keep","title":"Precious","cards":[]}]}"#;
        let kv = MemoryKv::with_entry(DECKS_KEY, blob);
        let store = DeckStore::open(Box::new(kv.clone()));

        assert!(store.decks().is_empty());
        assert!(!store.is_first_run());
        store.flush();
        assert_eq!(kv.get(DECKS_KEY).as_deref(), Some(blob));
    }

    #[test]
    fn test_mutations_are_persisted() {
        let (mut store, kv) = open_memory();
        let deck = store.add_deck("Spanish").unwrap();
        store.add_card(&deck, NewCard::new("hola", "hello")).unwrap();
        store.flush();

        let saved = DeckSet::from_json(&kv.get(DECKS_KEY).unwrap()).unwrap();
        assert_eq!(saved.decks.len(), 1);
        assert_eq!(saved.decks[0].cards[0].front, "hola");
    }

    #[test]
    fn test_noops_do_not_save() {
        let (mut store, kv) = open_memory();
        assert!(store.add_deck("  ").is_none());
        assert!(!store.remove_deck("missing"));
        assert!(store.add_card("missing", NewCard::new("a", "b")).is_none());
        assert!(!store.remove_card("missing", "card"));
        assert!(!store.update_card("missing", "card", CardPatch::default().front("x")));
        assert!(store.set_deck_score("missing", 1, 1).is_none());
        store.flush();

        assert_eq!(kv.get(DECKS_KEY), None);
    }

    #[test]
    fn test_reopen_restores_state() {
        let kv = MemoryKv::new();
        let (deck_id, card_id) = {
            let mut store = DeckStore::open(Box::new(kv.clone()));
            let deck_id = store.add_deck("Spanish").unwrap();
            let card_id = store
                .add_card(
                    &deck_id,
                    NewCard::new("gato", "cat").with_back_image("file:///cat.png"),
                )
                .unwrap();
            store.set_deck_score(&deck_id, 1, 2).unwrap();
            (deck_id, card_id)
        };

        let store = DeckStore::open(Box::new(kv));
        let deck = store.deck(&deck_id).unwrap();
        assert_eq!(deck.title, "Spanish");
        assert_eq!(deck.card(&card_id).unwrap().back, "cat");
        assert_eq!(
            deck.card(&card_id).unwrap().image_back_uri.as_deref(),
            Some("file:///cat.png")
        );
        assert_eq!(deck.last_score.as_ref().unwrap().pct, 50);
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        let (mut store, kv) = open_memory();
        kv.set_fail_saves(true);

        let deck = store.add_deck("Spanish").unwrap();
        store.flush();

        assert!(store.deck(&deck).is_some());
        assert_eq!(kv.get(DECKS_KEY), None);
    }

    #[test]
    fn test_session_round_trip_through_store() {
        let (mut store, _kv) = open_memory();
        let deck = store.add_deck("Spanish").unwrap();
        store.add_card(&deck, NewCard::new("hola", "hello"));
        store.add_card(&deck, NewCard::new("gato", "cat"));

        let mut session = store.start_session(&deck, StudyMode::All).unwrap();
        session.flip();
        session.mark_correct();
        session.flip();
        session.mark_wrong();

        let tally = session.tally().unwrap();
        let score = store.commit_tally(&tally).unwrap();
        assert_eq!(score.correct, 1);
        assert_eq!(score.total, 2);
        assert_eq!(score.pct, 50);
        assert_eq!(store.deck(&deck).unwrap().last_score, Some(score));

        let review = store.start_session(&deck, tally.review_wrong_mode()).unwrap();
        assert_eq!(review.total_count(), 1);
        assert_eq!(review.queue()[0].id, tally.wrong_ids[0]);
    }

    #[test]
    fn test_session_for_missing_deck() {
        let (store, _kv) = open_memory();
        assert!(store.start_session("missing", StudyMode::All).is_none());
    }

    #[test]
    fn test_session_snapshot_is_independent() {
        let (mut store, _kv) = open_memory();
        let deck = store.add_deck("Spanish").unwrap();
        let card = store.add_card(&deck, NewCard::new("hola", "hello")).unwrap();

        let session = store.start_session(&deck, StudyMode::All).unwrap();
        store.remove_card(&deck, &card);

        assert_eq!(session.phase(), SessionPhase::Presenting);
        assert_eq!(session.current_card().unwrap().front, "hola");
    }

    #[test]
    fn test_sqlite_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite3");

        {
            let mut store = DeckStore::open(Box::new(SqliteKv::open(&path).unwrap()));
            store.add_deck("Chemistry").unwrap();
        }

        let store = DeckStore::open(Box::new(SqliteKv::open(&path).unwrap()));
        assert_eq!(store.decks().len(), 1);
        assert_eq!(store.decks()[0].title, "Chemistry");
    }
}
