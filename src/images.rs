//! Outcome of asking the user for an image, and how it lands on a card.
//!
//! Only a successful pick changes anything. Cancellation leaves the field as it
//! was; a denial additionally produces a notice for the user.
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImagePick {
    /// URI or inlined data string of the chosen image.
    Picked(String),
    Cancelled,
    /// The image source is unavailable; holds the reason to show.
    Denied(String),
}

impl ImagePick {
    /// Stores a picked image into `slot`. Returns the notice to show, if any.
    pub fn apply_to(self, slot: &mut Option<String>) -> Option<String> {
        match self {
            ImagePick::Picked(uri) => {
                *slot = Some(uri);
                None
            }
            ImagePick::Cancelled => None,
            ImagePick::Denied(reason) => Some(reason),
        }
    }
}

/// Turns a path chosen in a file dialog into a pick result.
pub fn pick_from_path(path: Option<&Path>) -> ImagePick {
    let Some(path) = path else {
        return ImagePick::Cancelled;
    };
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => ImagePick::Picked(format!("file://{}", path.display())),
        Ok(_) => ImagePick::Denied(format!("'{}' is not a file", path.display())),
        Err(e) => ImagePick::Denied(format!("Cannot read '{}': {}", path.display(), e)),
    }
}

/// Opens a native file dialog filtered to common image types.
pub fn pick_image_file() -> ImagePick {
    let path = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
        .pick_file();
    pick_from_path(path.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_picked_changes_slot() {
        let mut slot = Some("file:///old.png".to_string());

        assert_eq!(ImagePick::Cancelled.apply_to(&mut slot), None);
        assert_eq!(slot.as_deref(), Some("file:///old.png"));

        let notice = ImagePick::Denied("Permission required.".into()).apply_to(&mut slot);
        assert_eq!(notice.as_deref(), Some("Permission required."));
        assert_eq!(slot.as_deref(), Some("file:///old.png"));

        ImagePick::Picked("file:///new.png".into()).apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("file:///new.png"));
    }


    #[test]
    fn test_pick_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cat.png");
        std::fs::write(&file, b"png").unwrap();

        assert_eq!(pick_from_path(None), ImagePick::Cancelled);
        assert!(matches!(
            pick_from_path(Some(file.as_path())),
            ImagePick::Picked(uri) if uri.starts_with("file://")
        ));
        assert!(matches!(pick_from_path(Some(dir.path())), ImagePick::Denied(_)));
        assert!(matches!(
            pick_from_path(Some(dir.path().join("missing.png").as_path())),
            ImagePick::Denied(_)
        ));
    }
}
