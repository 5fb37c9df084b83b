//! JSON import/export of single decks.
//! An exported file holds one deck with its cards; importing gives it fresh ids.

use crate::error::{AppError, Result};
use crate::models::Deck;
use std::fs;
use std::path::Path;
use tracing::info;

/// Writes the deck as pretty-printed JSON to `path`.
pub fn export_json_to_path(deck: &Deck, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path, json_string)?;
    info!("Deck '{}' exported to '{}'", deck.title, path.display());
    Ok(())
}

/// Reads a deck from a JSON file.
/// Fails if the file is missing, is not a deck, or the deck has a blank title.
pub fn import_json(path: &Path) -> Result<Deck> {
    let contents = fs::read_to_string(path)?;
    let deck: Deck = serde_json::from_str(&contents)?;

    if deck.title.trim().is_empty() {
        return Err(AppError::InvalidDeck("deck title is empty".to_string()));
    }

    info!("Deck '{}' read from '{}'", deck.title, path.display());
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewCard;

    fn create_test_deck() -> Deck {
        let mut deck = Deck::new("d1".into(), "Test Deck".into());
        deck.cards = vec![
            NewCard::new("hello", "cześć").into_card("c1".into()).unwrap(),
            NewCard::new("goodbye", "do widzenia")
                .with_front_image("file:///wave.png")
                .into_card("c2".into())
                .unwrap(),
        ];
        deck
    }

    #[test]
    fn test_export_and_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");
        let original = create_test_deck();

        export_json_to_path(&original, &path).unwrap();
        let imported = import_json(&path).unwrap();

        assert_eq!(imported, original);
    }

    #[test]
    fn test_import_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        fs::write(
            &path,
            r#"{
  "id": "123",
  "title": "Import Test Deck",
  "cards": [
    { "id": "1", "front": "test term", "back": "test definition" }
  ]
}"#,
        )
        .unwrap();

        let deck = import_json(&path).unwrap();
        assert_eq!(deck.title, "Import Test Deck");
        assert_eq!(deck.cards.len(), 1);
        assert_eq!(deck.cards[0].front, "test term");
        assert_eq!(deck.cards[0].image_front_uri, None);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_json(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_json(&path), Err(AppError::Serialization(_))));
    }

    #[test]
    fn test_import_blank_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        fs::write(&path, r#"{"id":"1","title":"  ","cards":[]}"#).unwrap();

        assert!(matches!(import_json(&path), Err(AppError::InvalidDeck(_))));
    }
}
