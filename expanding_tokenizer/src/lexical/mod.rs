//! Lexical analysis with inline `$` expansion
//!
//! A [`Lexer`] walks a [`Reader`], expands `$` constructs as it meets them and
//! hands out tokens one at a time. Grammar code drives it through the
//! matcher (`tokens_are` / `matches`), which looks ahead through a queue of
//! pending tokens and only consumes on a full match.

pub mod analyzer;
pub mod matcher;

pub use analyzer::{Lexer, LexerMetrics};

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::error::{ExpandError, ExpandResult};
use crate::logging::codes;
use crate::source::Reader;
use crate::tokens::{TokenKind, ALL_GLYPHS};
use crate::variables::VariableResolver;
use crate::{log_error, log_info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Characters that always end a bare word
const RESERVED_BREAKS: &str = "[]$;#'\"";

/// Which whitespace reaches the token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WhitespacePolicy {
    /// All whitespace is skipped
    #[serde(rename = "none")]
    Suppress,
    /// Each `\n` is a NEWLINE token, other whitespace is skipped
    #[default]
    #[serde(rename = "newline")]
    NewlineOnly,
    /// Every whitespace run, newlines included, is one WHITESPACE token
    #[serde(rename = "whitespace")]
    WhitespaceOnly,
    /// NEWLINE per `\n`, WHITESPACE for the runs between them
    #[serde(rename = "both")]
    Separate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerConfig {
    whitespace: WhitespacePolicy,
    single_tokens: BTreeMap<char, TokenKind>,
}

impl LexerConfig {
    /// Kinds without a glyph are ignored
    pub fn new(whitespace: WhitespacePolicy, kinds: impl IntoIterator<Item = TokenKind>) -> Self {
        let single_tokens = kinds
            .into_iter()
            .filter_map(|kind| kind.glyph().map(|glyph| (glyph, kind)))
            .collect();
        Self {
            whitespace,
            single_tokens,
        }
    }

    /// `=` as the only glyph, newlines reported
    pub fn ini() -> Self {
        Self::new(WhitespacePolicy::NewlineOnly, [TokenKind::Eq])
    }

    /// Every glyph as a token, newlines reported
    pub fn full() -> Self {
        Self::new(
            WhitespacePolicy::NewlineOnly,
            ALL_GLYPHS.chars().filter_map(TokenKind::from_glyph),
        )
    }

    pub fn with_whitespace(mut self, whitespace: WhitespacePolicy) -> Self {
        self.whitespace = whitespace;
        self
    }

    pub fn whitespace(&self) -> WhitespacePolicy {
        self.whitespace
    }

    pub fn single_token(&self, c: char) -> Option<TokenKind> {
        self.single_tokens.get(&c).copied()
    }

    pub fn is_single_token(&self, c: char) -> bool {
        self.single_tokens.contains_key(&c)
    }

    /// Whether `c` ends a bare word
    pub fn is_break(&self, c: char) -> bool {
        c.is_whitespace() || RESERVED_BREAKS.contains(c) || self.is_single_token(c)
    }
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self::ini()
    }
}

// ============================================================================
// FILE CONSTRUCTORS
// ============================================================================

/// INI lexer over a file, streamed through a buffered reader
pub fn ini_from_file<V>(path: &Path, variables: V) -> ExpandResult<Lexer<'static>>
where
    V: VariableResolver + 'static,
{
    open_file(path, variables, LexerConfig::ini())
}

/// Lexer with every glyph enabled over a file
pub fn full_from_file<V>(path: &Path, variables: V) -> ExpandResult<Lexer<'static>>
where
    V: VariableResolver + 'static,
{
    open_file(path, variables, LexerConfig::full())
}

/// Open `path` after checking its size; locations are named by the path
pub fn open_file<V>(path: &Path, variables: V, config: LexerConfig) -> ExpandResult<Lexer<'static>>
where
    V: VariableResolver + 'static,
{
    open_named(path, &path.display().to_string(), variables, config)
}

/// Open `path` with locations reported under `source_name`
pub fn open_named<V>(
    path: &Path,
    source_name: &str,
    variables: V,
    config: LexerConfig,
) -> ExpandResult<Lexer<'static>>
where
    V: VariableResolver + 'static,
{
    let size = fs::metadata(path)
        .map_err(|e| ExpandError::io(source_name, &e))?
        .len();
    if size > MAX_FILE_SIZE {
        log_error!(codes::file_processing::FILE_TOO_LARGE, "Source file exceeds size limit",
            "file" => source_name,
            "size" => size,
            "limit" => MAX_FILE_SIZE
        );
        return Err(ExpandError::FileTooLarge {
            source_name: source_name.to_string(),
            size,
        });
    }

    let file = File::open(path).map_err(|e| ExpandError::io(source_name, &e))?;
    let reader = Reader::new(BufReader::new(file), source_name)?;

    log_info!("Opened source file",
        "file" => source_name,
        "size" => size
    );
    Ok(Lexer::new(reader, variables, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{PatternElement, TokenClass};
    use crate::variables::MapVariables;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_presets() {
        let ini = LexerConfig::ini();
        assert_eq!(ini.whitespace(), WhitespacePolicy::NewlineOnly);
        assert_eq!(ini.single_token('='), Some(TokenKind::Eq));
        assert!(!ini.is_single_token('['));

        let full = LexerConfig::full();
        assert!(ALL_GLYPHS.chars().all(|c| full.is_single_token(c)));
        assert_eq!(LexerConfig::default(), ini);
    }

    #[test]
    fn test_non_glyph_kinds_ignored() {
        let config = LexerConfig::new(WhitespacePolicy::Suppress, [TokenKind::Text, TokenKind::Colon]);
        assert_eq!(config.single_token(':'), Some(TokenKind::Colon));
        assert!(!config.is_single_token('='));
    }

    #[test]
    fn test_break_characters() {
        let config = LexerConfig::ini();
        for c in ['[', ']', '$', ';', '#', '\'', '"', '=', ' ', '\n'] {
            assert!(config.is_break(c), "{:?} should break a word", c);
        }
        assert!(!config.is_break(':'));
        assert!(LexerConfig::full().is_break(':'));
    }

    #[test]
    fn test_ini_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[main]\nname = ${{NAME}}\n").unwrap();

        let variables = MapVariables::new().with("NAME", "demo");
        let mut lexer = ini_from_file(file.path(), variables).unwrap();
        let section = lexer.next_token().unwrap();
        assert_eq!(section.kind(), TokenKind::Section);
        assert_eq!(section.location().source_name(), file.path().display().to_string());

        let mut output = Vec::new();
        let pattern: [PatternElement; 4] = [
            TokenClass::Eol.into(),
            TokenClass::Word.into(),
            TokenKind::Eq.into(),
            TokenKind::Text.into(),
        ];
        assert!(lexer.tokens_are(&pattern, &mut output).unwrap());
        assert_eq!(output[3].content(), "demo");
    }

    #[test]
    fn test_full_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a.b:c").unwrap();

        let mut lexer = full_from_file(file.path(), MapVariables::new()).unwrap();
        let kinds: Vec<TokenKind> = (0..6).map(|_| lexer.next_token().unwrap().kind()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Text,
                TokenKind::Dot,
                TokenKind::Text,
                TokenKind::Colon,
                TokenKind::Text,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_open_named() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "x").unwrap();

        let mut lexer =
            open_named(file.path(), "app.ini", MapVariables::new(), LexerConfig::ini()).unwrap();
        assert_eq!(lexer.source_name(), "app.ini");
        assert_eq!(lexer.next_token().unwrap().location(), &crate::utils::Location::new("app.ini", 1, 1));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            ini_from_file(&dir.path().join("absent.ini"), MapVariables::new()),
            Err(ExpandError::FileNotFound { .. })
        );
    }

    #[test]
    fn test_oversized_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        file.as_file().set_len(MAX_FILE_SIZE + 1).unwrap();
        assert_matches!(
            ini_from_file(file.path(), MapVariables::new()),
            Err(ExpandError::FileTooLarge { size, .. }) if size == MAX_FILE_SIZE + 1
        );
    }
}
