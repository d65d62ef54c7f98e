//! Lexer settings loadable from a TOML file

use crate::lexical::{LexerConfig, WhitespacePolicy};
use crate::tokens::TokenKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid settings: {0}")]
    Parse(String),

    #[error("'{0}' is not a single-character token glyph")]
    UnknownGlyph(char),
}

/// Serializable description of a lexer
///
/// ```toml
/// source_name = "settings.ini"
/// whitespace = "both"
/// single_tokens = "=:,"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexerSettings {
    /// Overrides the name used in locations
    pub source_name: Option<String>,
    pub whitespace: WhitespacePolicy,
    pub single_tokens: String,
}

impl Default for LexerSettings {
    fn default() -> Self {
        Self {
            source_name: None,
            whitespace: WhitespacePolicy::NewlineOnly,
            single_tokens: "=".to_string(),
        }
    }
}

impl LexerSettings {
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn lexer_config(&self) -> Result<LexerConfig, SettingsError> {
        let kinds = self
            .single_tokens
            .chars()
            .map(|c| TokenKind::from_glyph(c).ok_or(SettingsError::UnknownGlyph(c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LexerConfig::new(self.whitespace, kinds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_defaults_describe_ini_lexer() {
        let settings = LexerSettings::from_toml_str("").unwrap();
        assert_eq!(settings, LexerSettings::default());
        assert_eq!(settings.lexer_config().unwrap(), LexerConfig::ini());
    }

    #[test]
    fn test_policy_names() {
        let settings =
            LexerSettings::from_toml_str("whitespace = \"both\"\nsingle_tokens = \"=:\"").unwrap();
        assert_eq!(settings.whitespace, WhitespacePolicy::Separate);
        let config = settings.lexer_config().unwrap();
        assert!(config.is_single_token(':'));
        assert!(!config.is_single_token('.'));
    }

    #[test]
    fn test_unknown_glyph_rejected() {
        let settings = LexerSettings::from_toml_str("single_tokens = \"=@\"").unwrap();
        assert_matches!(settings.lexer_config(), Err(SettingsError::UnknownGlyph('@')));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert_matches!(
            LexerSettings::from_toml_str("colour = \"red\""),
            Err(SettingsError::Parse(_))
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "source_name = \"app.ini\"\nwhitespace = \"none\"").unwrap();

        let settings = LexerSettings::load(file.path()).unwrap();
        assert_eq!(settings.source_name.as_deref(), Some("app.ini"));
        assert_eq!(settings.whitespace, WhitespacePolicy::Suppress);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            LexerSettings::load(&dir.path().join("absent.toml")),
            Err(SettingsError::Io { .. })
        );
    }
}
