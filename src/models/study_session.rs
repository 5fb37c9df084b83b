//! Study session: one pass over a shuffled subset of a deck's cards.
//!
//! The session works on a snapshot of the cards taken when it starts and never
//! touches the store. When the queue is exhausted it yields a [`Tally`] that the
//! caller hands back to [`crate::store::DeckStore::commit_tally`].

use super::{Card, Deck, score::percentage};
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Which cards of the deck a session covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StudyMode {
    All,
    /// Only cards whose id is in the set (previously missed cards).
    Wrong(HashSet<String>),
}

impl StudyMode {
    pub fn wrong<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StudyMode::Wrong(ids.into_iter().map(Into::into).collect())
    }
}

/// Why a session has nothing to study.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyReason {
    /// The deck has no cards.
    NoCards,
    /// Review-wrong mode found none of the seed ids in the deck.
    NoWrongCards,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Empty(EmptyReason),
    /// Current card shows its front.
    Presenting,
    /// Current card shows its back and can be marked.
    Revealed,
    Complete,
}

/// Final result of a completed session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    pub deck_id: String,
    pub total: u32,
    pub correct: u32,
    /// Missed card ids in the order they were marked.
    pub wrong_ids: Vec<String>,
}

impl Tally {
    pub fn pct(&self) -> u8 {
        percentage(self.correct, self.total)
    }

    /// Mode for a follow-up session over the cards missed in this one.
    pub fn review_wrong_mode(&self) -> StudyMode {
        StudyMode::wrong(self.wrong_ids.iter().cloned())
    }
}

pub struct StudySession {
    pub deck_id: String,
    pub deck_title: String,
    pub mode: StudyMode,
    queue: Vec<Card>,
    cursor: usize,
    flipped: bool,
    correct_ids: Vec<String>,
    wrong_ids: Vec<String>,
}

impl StudySession {
    pub fn new(deck: &Deck, mode: StudyMode) -> Self {
        Self::with_rng(deck, mode, &mut rand::thread_rng())
    }

    /// Builds the session queue using `rng` for the shuffle.
    pub fn with_rng<R: Rng + ?Sized>(deck: &Deck, mode: StudyMode, rng: &mut R) -> Self {
        let mut queue: Vec<Card> = match &mode {
            StudyMode::All => deck.cards.clone(),
            StudyMode::Wrong(ids) => deck
                .cards
                .iter()
                .filter(|c| ids.contains(&c.id))
                .cloned()
                .collect(),
        };
        shuffle(&mut queue, rng);

        debug!(
            "Study session for '{}' started with {} of {} cards",
            deck.title,
            queue.len(),
            deck.cards.len()
        );

        Self {
            deck_id: deck.id.clone(),
            deck_title: deck.title.clone(),
            mode,
            queue,
            cursor: 0,
            flipped: false,
            correct_ids: Vec::new(),
            wrong_ids: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.queue.is_empty() {
            let reason = match self.mode {
                StudyMode::All => EmptyReason::NoCards,
                StudyMode::Wrong(_) => EmptyReason::NoWrongCards,
            };
            SessionPhase::Empty(reason)
        } else if self.cursor >= self.queue.len() {
            SessionPhase::Complete
        } else if self.flipped {
            SessionPhase::Revealed
        } else {
            SessionPhase::Presenting
        }
    }

    pub fn queue(&self) -> &[Card] {
        &self.queue
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.queue.get(self.cursor)
    }

    /// Turns the current card over. Does nothing once the session is over.
    pub fn flip(&mut self) -> bool {
        if self.current_card().is_none() {
            return false;
        }
        self.flipped = !self.flipped;
        true
    }

    /// Records the outcome for the current card and moves on.
    /// Only allowed while the card is revealed.
    pub fn mark(&mut self, correct: bool) -> bool {
        if self.phase() != SessionPhase::Revealed {
            return false;
        }
        let Some(card) = self.queue.get(self.cursor) else {
            return false;
        };

        if correct {
            self.correct_ids.push(card.id.clone());
        } else {
            self.wrong_ids.push(card.id.clone());
        }
        self.cursor += 1;
        self.flipped = false;
        true
    }

    pub fn mark_correct(&mut self) -> bool {
        self.mark(true)
    }

    pub fn mark_wrong(&mut self) -> bool {
        self.mark(false)
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == SessionPhase::Complete
    }

    pub fn total_count(&self) -> usize {
        self.queue.len()
    }

    pub fn correct_ids(&self) -> &[String] {
        &self.correct_ids
    }

    pub fn wrong_ids(&self) -> &[String] {
        &self.wrong_ids
    }

    /// 1-based position of the current card, capped at the queue length.
    pub fn position(&self) -> usize {
        (self.cursor + 1).min(self.queue.len())
    }

    /// Share of the queue already scored, in whole percent.
    pub fn progress_pct(&self) -> u8 {
        percentage(self.cursor as u32, self.queue.len() as u32)
    }

    /// The final tally, available once every card has been marked.
    pub fn tally(&self) -> Option<Tally> {
        if !self.is_complete() {
            return None;
        }
        Some(Tally {
            deck_id: self.deck_id.clone(),
            total: self.queue.len() as u32,
            correct: self.correct_ids.len() as u32,
            wrong_ids: self.wrong_ids.clone(),
        })
    }
}

/// Uniform in-place Fisher–Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewCard;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn deck_with(ids: &[&str]) -> Deck {
        let mut deck = Deck::new("deck".into(), "Spanish".into());
        deck.cards = ids
            .iter()
            .map(|id| {
                NewCard::new(format!("front {id}"), format!("back {id}"))
                    .into_card(id.to_string())
                    .unwrap()
            })
            .collect();
        deck
    }

    fn queue_ids(session: &StudySession) -> Vec<String> {
        session.queue().iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_all_mode_is_permutation() {
        let deck = deck_with(&["1", "2", "3", "4", "5"]);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let session = StudySession::with_rng(&deck, StudyMode::All, &mut rng);
            let mut ids = queue_ids(&session);
            ids.sort();
            assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
        }
    }

    #[test]
    fn test_wrong_mode_intersects_with_deck() {
        let deck = deck_with(&["1", "2", "3", "4"]);
        let session = StudySession::new(&deck, StudyMode::wrong(["2", "4", "gone"]));

        let mut ids = queue_ids(&session);
        ids.sort();
        assert_eq!(ids, vec!["2", "4"]);
        assert_eq!(session.phase(), SessionPhase::Presenting);
    }

    #[test]
    fn test_empty_reasons() {
        let empty_deck = deck_with(&[]);
        let session = StudySession::new(&empty_deck, StudyMode::All);
        assert_eq!(session.phase(), SessionPhase::Empty(EmptyReason::NoCards));
        assert!(session.tally().is_none());

        let deck = deck_with(&["1", "2"]);
        let none_seed: [&str; 0] = [];
        let session = StudySession::new(&deck, StudyMode::wrong(none_seed));
        assert_eq!(session.phase(), SessionPhase::Empty(EmptyReason::NoWrongCards));

        let mut session = StudySession::new(&deck, StudyMode::wrong(["gone"]));
        assert_eq!(session.phase(), SessionPhase::Empty(EmptyReason::NoWrongCards));
        assert!(!session.flip());
        assert!(!session.mark_correct());
    }

    #[test]
    fn test_mark_requires_flip() {
        let deck = deck_with(&["1", "2"]);
        let mut session = StudySession::new(&deck, StudyMode::All);

        assert_eq!(session.phase(), SessionPhase::Presenting);
        assert!(!session.mark_correct());
        assert!(session.correct_ids().is_empty());

        assert!(session.flip());
        assert_eq!(session.phase(), SessionPhase::Revealed);
        assert!(session.flip());
        assert_eq!(session.phase(), SessionPhase::Presenting);
    }

    #[test]
    fn test_spanish_session_scenario() {
        let deck = deck_with(&["1", "2"]);
        let mut session = StudySession::new(&deck, StudyMode::All);
        let order = queue_ids(&session);

        assert_eq!(session.position(), 1);
        assert_eq!(session.progress_pct(), 0);
        session.flip();
        assert!(session.mark_correct());

        assert_eq!(session.phase(), SessionPhase::Presenting);
        assert_eq!(session.position(), 2);
        assert_eq!(session.progress_pct(), 50);
        assert!(session.tally().is_none());
        session.flip();
        assert!(session.mark_wrong());

        assert_eq!(session.phase(), SessionPhase::Complete);
        assert!(session.current_card().is_none());
        assert!(!session.flip());
        assert_eq!(session.progress_pct(), 100);

        let tally = session.tally().unwrap();
        assert_eq!(tally.deck_id, "deck");
        assert_eq!(tally.total, 2);
        assert_eq!(tally.correct, 1);
        assert_eq!(tally.wrong_ids, vec![order[1].clone()]);
        assert_eq!(tally.pct(), 50);
    }

    #[test]
    fn test_every_card_scored_exactly_once() {
        let deck = deck_with(&["a", "b", "c", "d", "e", "f", "g"]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut session = StudySession::with_rng(&deck, StudyMode::All, &mut rng);

        let mut step = 0;
        while !session.is_complete() {
            session.flip();
            session.mark(step % 3 != 0);
            step += 1;
        }
        assert_eq!(step, 7);

        let correct: HashSet<_> = session.correct_ids().iter().collect();
        let wrong: HashSet<_> = session.wrong_ids().iter().collect();
        assert!(correct.is_disjoint(&wrong));
        assert_eq!(correct.len() + wrong.len(), session.total_count());
    }

    #[test]
    fn test_follow_up_reviews_only_missed_cards() {
        let deck = deck_with(&["1", "2", "3"]);
        let mut session = StudySession::new(&deck, StudyMode::All);
        let missed = session.current_card().unwrap().id.clone();
        while !session.is_complete() {
            let is_missed = session.current_card().unwrap().id == missed;
            session.flip();
            session.mark(!is_missed);
        }

        let tally = session.tally().unwrap();
        let review = StudySession::new(&deck, tally.review_wrong_mode());
        assert_eq!(queue_ids(&review), vec![missed]);

        let perfect = Tally {
            deck_id: "deck".into(),
            total: 3,
            correct: 3,
            wrong_ids: Vec::new(),
        };
        let review = StudySession::new(&deck, perfect.review_wrong_mode());
        assert_eq!(review.phase(), SessionPhase::Empty(EmptyReason::NoWrongCards));
    }

    #[test]
    fn test_shuffle_is_uniform() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
        let trials = 60_000;

        for _ in 0..trials {
            let mut items = [0u8, 1, 2];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }

        assert_eq!(counts.len(), 6);
        let expected = trials / 6;
        for (perm, count) in counts {
            let deviation = (count as i64 - expected as i64).abs();
            assert!(deviation < 500, "{perm:?} seen {count} times");
        }
    }
}
