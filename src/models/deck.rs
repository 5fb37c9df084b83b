//! Deck is a titled set of cards. Newest cards come first.
use super::{Card, LastScore};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_score: Option<LastScore>,
}

impl Deck {
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            cards: Vec::new(),
            last_score: None,
        }
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }

    /// Cards whose front or back contains `query`, ignoring case and surrounding
    /// whitespace. A blank query returns every card.
    pub fn search_cards(&self, query: &str) -> Vec<&Card> {
        let needle = query.trim().to_lowercase();
        self.cards
            .iter()
            .filter(|c| needle.is_empty() || c.matches(&needle))
            .collect()
    }
}
