//! Engine configuration — language selection and voice-data lookup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where distribution packages install the Pico voice data.
pub const SYSTEM_LANG_DIR: &str = "/usr/share/pico/lang/";

/// Languages the stock voice data ships for.
pub const KNOWN_LANGUAGES: [&str; 6] = [
    "en-GB", "en-US", "de-DE", "es-ES", "fr-FR", "it-IT",
];

/// Configuration for creating a [`TtsEngine`](crate::TtsEngine).
///
/// `language` and `lang_dir` are passed through to the engine's own
/// initialization routine; the binding layer does not validate them beyond
/// trying each candidate directory in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// IETF language tag (e.g. `"en-GB"`).
    pub language: String,

    /// Preferred voice-data directory, tried before the system default.
    pub lang_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: "en-GB".to_string(),
            lang_dir: None,
        }
    }
}

impl EngineConfig {
    /// Configuration for the given language with default voice-data lookup.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            lang_dir: None,
        }
    }

    /// Set the preferred voice-data directory.
    #[must_use]
    pub fn with_lang_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lang_dir = Some(dir.into());
        self
    }

    /// Voice-data directories to try, in order: the configured directory
    /// first (if any), then the system default.
    #[must_use]
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(dir) = &self.lang_dir {
            dirs.push(dir.clone());
        }
        let system = PathBuf::from(SYSTEM_LANG_DIR);
        if !dirs.contains(&system) {
            dirs.push(system);
        }
        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_british_english() {
        let config = EngineConfig::default();
        assert_eq!(config.language, "en-GB");
        assert!(KNOWN_LANGUAGES.contains(&config.language.as_str()));
        assert_eq!(config.candidate_dirs(), vec![PathBuf::from(SYSTEM_LANG_DIR)]);
    }

    #[test]
    fn explicit_lang_dir_is_tried_first() {
        let config = EngineConfig::new("de-DE").with_lang_dir("/opt/voices");
        assert_eq!(
            config.candidate_dirs(),
            vec![PathBuf::from("/opt/voices"), PathBuf::from(SYSTEM_LANG_DIR)]
        );
    }

    #[test]
    fn system_dir_is_not_listed_twice() {
        let config = EngineConfig::default().with_lang_dir(SYSTEM_LANG_DIR);
        assert_eq!(config.candidate_dirs(), vec![PathBuf::from(SYSTEM_LANG_DIR)]);
    }
}
