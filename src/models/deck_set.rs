//! Container for all decks, newest first.
//!
//! Every mutation here is in place and synchronous. Persisting the result is the
//! job of [`crate::store::DeckStore`]; this type only knows how to turn itself into
//! a snapshot blob and back.
use super::{CardPatch, Deck, LastScore, NewCard};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

/// Version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Fresh id from the single namespace shared by decks and cards.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckSet {
    pub decks: Vec<Deck>,
}

/// Summary numbers shown above the deck list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeckStats {
    pub total_decks: usize,
    pub total_cards: usize,
    /// Rounded mean of the last scores, `None` when no deck has been studied.
    pub average_score: Option<u8>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    decks: &'a [Deck],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSnapshot {
    Envelope {
        #[serde(default)]
        version: Option<u32>,
        decks: Vec<Deck>,
    },
    // Older builds wrote the deck array directly.
    Bare(Vec<Deck>),
}

impl DeckSet {
    pub fn new(decks: Vec<Deck>) -> Self {
        Self { decks }
    }

    pub fn deck(&self, deck_id: &str) -> Option<&Deck> {
        self.decks.iter().find(|d| d.id == deck_id)
    }

    fn deck_mut(&mut self, deck_id: &str) -> Option<&mut Deck> {
        self.decks.iter_mut().find(|d| d.id == deck_id)
    }

    /// Prepends a new empty deck. Returns its id, or `None` for a blank title.
    pub fn add_deck(&mut self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let id = new_id();
        self.decks.insert(0, Deck::new(id.clone(), title.to_string()));
        Some(id)
    }

    pub fn remove_deck(&mut self, deck_id: &str) -> bool {
        let before = self.decks.len();
        self.decks.retain(|d| d.id != deck_id);
        self.decks.len() != before
    }

    /// Prepends a card to the deck. Returns the new card id, or `None` if the deck
    /// does not exist or either side is blank.
    pub fn add_card(&mut self, deck_id: &str, card: NewCard) -> Option<String> {
        let deck = self.deck_mut(deck_id)?;
        let card = card.into_card(new_id())?;
        let id = card.id.clone();
        deck.cards.insert(0, card);
        Some(id)
    }

    pub fn remove_card(&mut self, deck_id: &str, card_id: &str) -> bool {
        let Some(deck) = self.deck_mut(deck_id) else {
            return false;
        };
        let before = deck.cards.len();
        deck.cards.retain(|c| c.id != card_id);
        deck.cards.len() != before
    }

    pub fn update_card(&mut self, deck_id: &str, card_id: &str, patch: CardPatch) -> bool {
        self.deck_mut(deck_id)
            .and_then(|d| d.card_mut(card_id))
            .map(|c| c.apply(patch))
            .unwrap_or(false)
    }

    /// Overwrites the deck's last score. Returns the recorded score.
    pub fn set_deck_score(
        &mut self,
        deck_id: &str,
        correct: u32,
        total: u32,
        when: DateTime<Utc>,
    ) -> Option<&LastScore> {
        let deck = self.deck_mut(deck_id)?;
        deck.last_score = Some(LastScore::new(correct, total, when));
        deck.last_score.as_ref()
    }

    /// Prepends a deck that came from outside the store (e.g. a JSON import).
    /// Deck and cards get fresh ids and blank cards are dropped; the previous
    /// score is discarded.
    pub fn insert_deck(&mut self, deck: Deck) -> Option<String> {
        let title = deck.title.trim();
        if title.is_empty() {
            return None;
        }

        let cards = deck
            .cards
            .into_iter()
            .filter_map(|c| {
                NewCard {
                    front: c.front,
                    back: c.back,
                    image_front_uri: c.image_front_uri,
                    image_back_uri: c.image_back_uri,
                }
                .into_card(new_id())
            })
            .collect();

        let id = new_id();
        self.decks.insert(
            0,
            Deck {
                id: id.clone(),
                title: title.to_string(),
                cards,
                last_score: None,
            },
        );
        Some(id)
    }

    /// Decks whose title contains `query`, ignoring case and surrounding whitespace.
    pub fn search(&self, query: &str) -> Vec<&Deck> {
        let needle = query.trim().to_lowercase();
        self.decks
            .iter()
            .filter(|d| needle.is_empty() || d.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn stats(&self) -> DeckStats {
        let scores: Vec<u64> = self
            .decks
            .iter()
            .filter_map(|d| d.last_score.as_ref())
            .map(|s| u64::from(s.pct))
            .collect();

        let average_score = if scores.is_empty() {
            None
        } else {
            let n = scores.len() as u64;
            let sum: u64 = scores.iter().sum();
            Some(((2 * sum + n) / (2 * n)) as u8)
        };

        DeckStats {
            total_decks: self.decks.len(),
            total_cards: self.decks.iter().map(|d| d.cards.len()).sum(),
            average_score,
        }
    }

    /// Gives a fresh id to every deck or card whose id is blank or was already seen.
    /// Returns how many ids were replaced.
    pub fn repair_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut repaired = 0;

        for deck in &mut self.decks {
            if deck.id.trim().is_empty() || !seen.insert(deck.id.clone()) {
                let fresh = new_id();
                warn!("Deck id '{}' replaced with '{}'", deck.id, fresh);
                deck.id = fresh.clone();
                seen.insert(fresh);
                repaired += 1;
            }
            for card in &mut deck.cards {
                if card.id.trim().is_empty() || !seen.insert(card.id.clone()) {
                    let fresh = new_id();
                    warn!("Card id '{}' replaced with '{}'", card.id, fresh);
                    card.id = fresh.clone();
                    seen.insert(fresh);
                    repaired += 1;
                }
            }
        }

        repaired
    }

    /// Recomputes every stored score so `pct` agrees with `correct` and `total`.
    /// Returns how many scores were changed.
    pub fn repair_scores(&mut self) -> usize {
        let mut repaired = 0;
        for deck in &mut self.decks {
            let Some(score) = &mut deck.last_score else {
                continue;
            };
            let fixed = LastScore::new(score.correct, score.total, score.when);
            if *score != fixed {
                warn!(
                    "Score {}/{} ({}%) of deck '{}' recomputed as {}/{} ({}%)",
                    score.correct,
                    score.total,
                    score.pct,
                    deck.id,
                    fixed.correct,
                    fixed.total,
                    fixed.pct
                );
                *score = fixed;
                repaired += 1;
            }
        }
        repaired
    }

    /// Serializes the whole collection as a versioned snapshot blob.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            decks: &self.decks,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Parses a snapshot blob, accepting the versioned envelope as well as the
    /// older versionless layouts. Duplicate ids are repaired.
    pub fn from_json(blob: &str) -> Result<Self> {
        let decks = match serde_json::from_str::<StoredSnapshot>(blob)? {
            StoredSnapshot::Envelope { version, decks } => match version {
                Some(v) if v > SNAPSHOT_VERSION => return Err(AppError::UnsupportedVersion(v)),
                _ => decks,
            },
            StoredSnapshot::Bare(decks) => decks,
        };

        let mut set = Self::new(decks);
        set.repair_ids();
        set.repair_scores();
        Ok(set)
    }
}
