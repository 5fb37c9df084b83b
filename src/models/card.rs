//! Card is a <front, back> pair. Either side may carry an image reference
//! (a URI or an inlined data string).
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default)]
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub image_front_uri: Option<String>,
    #[serde(default)]
    pub image_back_uri: Option<String>,
}

/// Input for creating a card. Text is trimmed before it is accepted.
#[derive(Clone, Debug, Default)]
pub struct NewCard {
    pub front: String,
    pub back: String,
    pub image_front_uri: Option<String>,
    pub image_back_uri: Option<String>,
}

impl NewCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            image_front_uri: None,
            image_back_uri: None,
        }
    }

    pub fn with_front_image(mut self, uri: impl Into<String>) -> Self {
        self.image_front_uri = Some(uri.into());
        self
    }

    pub fn with_back_image(mut self, uri: impl Into<String>) -> Self {
        self.image_back_uri = Some(uri.into());
        self
    }

    /// Validates the input and turns it into a card with the given id.
    /// Returns `None` when either side is blank.
    pub fn into_card(self, id: String) -> Option<Card> {
        let front = self.front.trim();
        let back = self.back.trim();
        if front.is_empty() || back.is_empty() {
            return None;
        }

        Some(Card {
            id,
            front: front.to_string(),
            back: back.to_string(),
            image_front_uri: normalize_image(self.image_front_uri),
            image_back_uri: normalize_image(self.image_back_uri),
        })
    }
}

/// Partial update of a card. `None` leaves a field untouched.
///
/// Image fields are tri-state: `None` keeps the image, `Some(None)` clears it and
/// `Some(Some(uri))` replaces it.
#[derive(Clone, Debug, Default)]
pub struct CardPatch {
    pub front: Option<String>,
    pub back: Option<String>,
    pub image_front_uri: Option<Option<String>>,
    pub image_back_uri: Option<Option<String>>,
}

impl CardPatch {
    pub fn front(mut self, text: impl Into<String>) -> Self {
        self.front = Some(text.into());
        self
    }

    pub fn back(mut self, text: impl Into<String>) -> Self {
        self.back = Some(text.into());
        self
    }

    pub fn front_image(mut self, uri: Option<String>) -> Self {
        self.image_front_uri = Some(uri);
        self
    }

    pub fn back_image(mut self, uri: Option<String>) -> Self {
        self.image_back_uri = Some(uri);
        self
    }
}

impl Card {
    /// Merges `patch` into the card. Blank text is ignored so a card never ends up
    /// with an empty side. Returns true if anything changed.
    pub fn apply(&mut self, patch: CardPatch) -> bool {
        let before = self.clone();

        if let Some(front) = patch.front {
            let front = front.trim();
            if !front.is_empty() {
                self.front = front.to_string();
            }
        }
        if let Some(back) = patch.back {
            let back = back.trim();
            if !back.is_empty() {
                self.back = back.to_string();
            }
        }
        if let Some(uri) = patch.image_front_uri {
            self.image_front_uri = normalize_image(uri);
        }
        if let Some(uri) = patch.image_back_uri {
            self.image_back_uri = normalize_image(uri);
        }

        *self != before
    }

    pub fn matches(&self, needle: &str) -> bool {
        self.front.to_lowercase().contains(needle) || self.back.to_lowercase().contains(needle)
    }
}

/// Empty image strings are stored as absent.
fn normalize_image(uri: Option<String>) -> Option<String> {
    uri.filter(|u| !u.trim().is_empty())
}
