//! Runtime settings for the desktop binary.
use std::path::PathBuf;

/// Overrides the database location.
pub const DB_ENV: &str = "DOCARD_DB";
/// Set to `1` to skip creating the sample deck on first run.
pub const NO_SAMPLE_ENV: &str = "DOCARD_NO_SAMPLE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub seed_sample_deck: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup(DB_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let seed_sample_deck = lookup(NO_SAMPLE_ENV).as_deref() != Some("1");

        Self {
            db_path,
            seed_sample_deck,
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("docard"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("db.sqlite3")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert!(config.db_path.ends_with("db.sqlite3"));
        assert!(config.seed_sample_deck);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(|key| match key {
            DB_ENV => Some("/tmp/cards.sqlite3".to_string()),
            NO_SAMPLE_ENV => Some("1".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/tmp/cards.sqlite3"));
        assert!(!config.seed_sample_deck);
    }
}
