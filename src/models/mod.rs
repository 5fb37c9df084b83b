pub mod card;
pub mod deck;
pub mod deck_set;
pub mod score;
pub mod study_session;

pub use card::{Card, CardPatch, NewCard};
pub use deck::Deck;
pub use deck_set::{DeckSet, DeckStats};
pub use score::{LastScore, ScoreGrade};
pub use study_session::{EmptyReason, SessionPhase, StudyMode, StudySession, Tally};
