//! Failure type shared by the reader, expander, lexer and matcher
//!
//! Every variant carries the location it points at, and maps to a logging
//! code so callers can classify it.

use crate::config::compile_time::{expansion, file_processing, lexical, matcher};
use crate::logging::{codes, Code};
use crate::utils::Location;
use std::fmt;

pub type ExpandResult<T> = Result<T, ExpandError>;

/// What was open when the input ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EofContext {
    DoubleQuote,
    SingleQuote,
    Section,
    Variable,
    DefaultValue,
    Expression,
    EscapeSequence,
}

impl fmt::Display for EofContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DoubleQuote => "double quoted string",
            Self::SingleQuote => "single quoted string",
            Self::Section => "section",
            Self::Variable => "variable",
            Self::DefaultValue => "default value",
            Self::Expression => "expression",
            Self::EscapeSequence => "escape sequence",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpandError {
    #[error("Cannot find variable name at: {location}")]
    MissingVariableName { location: Location },

    #[error("Cannot resolve variable: {name} at: {location}")]
    UnresolvedVariable { name: String, location: Location },

    #[error("Unknown quote: '{quote}' at: {location}")]
    UnknownQuote { quote: String, location: Location },

    #[error("'{text}' is not a duration at: {location}")]
    NotADuration { text: String, location: Location },

    #[error("'{text}' is not a number at: {location}")]
    NotANumber { text: String, location: Location },

    #[error("Unexpected EOF in {context} starting at: {location}")]
    UnexpectedEof {
        context: EofContext,
        location: Location,
    },

    #[error("Unexpected character '{character}', expected {expected} at: {location}")]
    UnexpectedCharacter {
        character: char,
        expected: &'static str,
        location: Location,
    },

    #[error("Unexpected token '{found}', expected {expected} at: {location}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        location: Location,
    },

    #[error("Whitespace is not allowed in section at: {location}")]
    WhitespaceInSection { location: Location },

    #[error("Invalid escape sequence '\\{sequence}' at: {location}")]
    InvalidEscape { sequence: String, location: Location },

    #[error("Division by zero at: {location}")]
    DivisionByZero { location: Location },

    #[error("Arithmetic overflow at: {location}")]
    ArithmeticOverflow { location: Location },

    #[error(
        "Expansion nested deeper than {} levels at: {location}",
        expansion::MAX_EXPANSION_DEPTH
    )]
    NestingTooDeep { location: Location },

    #[error(
        "Token longer than {} characters at: {location}",
        lexical::MAX_TOKEN_LENGTH
    )]
    TokenTooLarge { location: Location },

    #[error(
        "Comment longer than {} characters at: {location}",
        lexical::MAX_COMMENT_LENGTH
    )]
    CommentTooLong { location: Location },

    #[error("Unget beyond buffered input at: {location}")]
    UngetUnderflow { location: Location },

    #[error("OPTIONAL must be followed by a pattern element")]
    DanglingOptional,

    #[error(
        "Pattern needs more than {} tokens of lookahead at: {location}",
        matcher::MAX_PENDING_TOKENS
    )]
    LookaheadExceeded { location: Location },

    #[error("File not found: {source_name}")]
    FileNotFound { source_name: String },

    #[error(
        "File too large: {source_name} is {size} bytes (max {})",
        file_processing::MAX_FILE_SIZE
    )]
    FileTooLarge { source_name: String, size: u64 },

    #[error("Failed to read {source_name}: {message}")]
    Io { source_name: String, message: String },
}

impl ExpandError {
    pub fn unexpected_eof(context: EofContext, location: Location) -> Self {
        Self::UnexpectedEof { context, location }
    }

    pub fn unexpected_character(character: char, expected: &'static str, location: Location) -> Self {
        Self::UnexpectedCharacter {
            character,
            expected,
            location,
        }
    }

    pub fn unexpected_token(found: &str, expected: &'static str, location: Location) -> Self {
        Self::UnexpectedToken {
            found: found.to_string(),
            expected,
            location,
        }
    }

    pub fn io(source_name: &str, error: &std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound {
                source_name: source_name.to_string(),
            };
        }
        Self::Io {
            source_name: source_name.to_string(),
            message: error.to_string(),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::MissingVariableName { .. } => codes::expansion::MISSING_VARIABLE_NAME,
            Self::UnresolvedVariable { .. } => codes::expansion::UNRESOLVED_VARIABLE,
            Self::UnknownQuote { .. } => codes::expansion::UNKNOWN_QUOTE,
            Self::NotADuration { .. } => codes::expansion::NOT_A_DURATION,
            Self::NotANumber { .. } => codes::arithmetic::NOT_A_NUMBER,
            Self::UnexpectedEof { context, .. } => match context {
                EofContext::DoubleQuote | EofContext::SingleQuote | EofContext::Section => {
                    codes::lexical::UNTERMINATED_CONSTRUCT
                }
                _ => codes::expansion::UNEXPECTED_EOF,
            },
            Self::UnexpectedCharacter { .. } => codes::expansion::UNEXPECTED_CHARACTER,
            Self::UnexpectedToken { .. } => codes::arithmetic::UNEXPECTED_TOKEN,
            Self::WhitespaceInSection { .. } => codes::lexical::WHITESPACE_IN_SECTION,
            Self::InvalidEscape { .. } => codes::source::INVALID_ESCAPE,
            Self::DivisionByZero { .. } => codes::arithmetic::DIVISION_BY_ZERO,
            Self::ArithmeticOverflow { .. } => codes::arithmetic::OVERFLOW,
            Self::NestingTooDeep { .. } => codes::expansion::NESTING_TOO_DEEP,
            Self::TokenTooLarge { .. } => codes::lexical::TOKEN_TOO_LARGE,
            Self::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            Self::UngetUnderflow { .. } => codes::source::UNGET_UNDERFLOW,
            Self::DanglingOptional => codes::matcher::DANGLING_OPTIONAL,
            Self::LookaheadExceeded { .. } => codes::matcher::LOOKAHEAD_EXCEEDED,
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::Io { .. } => codes::file_processing::IO_ERROR,
        }
    }

    /// Get location if available
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::MissingVariableName { location }
            | Self::UnresolvedVariable { location, .. }
            | Self::UnknownQuote { location, .. }
            | Self::NotADuration { location, .. }
            | Self::NotANumber { location, .. }
            | Self::UnexpectedEof { location, .. }
            | Self::UnexpectedCharacter { location, .. }
            | Self::UnexpectedToken { location, .. }
            | Self::WhitespaceInSection { location }
            | Self::InvalidEscape { location, .. }
            | Self::DivisionByZero { location }
            | Self::ArithmeticOverflow { location }
            | Self::NestingTooDeep { location }
            | Self::TokenTooLarge { location }
            | Self::CommentTooLong { location }
            | Self::UngetUnderflow { location }
            | Self::LookaheadExceeded { location } => Some(location),
            Self::DanglingOptional
            | Self::FileNotFound { .. }
            | Self::FileTooLarge { .. }
            | Self::Io { .. } => None,
        }
    }

    /// Contract breaches: the parse must not continue
    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_text_and_location() {
        let error = ExpandError::UnresolvedVariable {
            name: "HOME_DIR".to_string(),
            location: Location::new("app.ini", 4, 9),
        };
        assert_eq!(
            error.to_string(),
            "Cannot resolve variable: HOME_DIR at: app.ini:4:9"
        );

        let error = ExpandError::unexpected_eof(EofContext::DefaultValue, Location::new("a", 1, 3));
        assert_eq!(
            error.to_string(),
            "Unexpected EOF in default value starting at: a:1:3"
        );
    }

    #[test]
    fn test_eof_code_depends_on_context() {
        let quote = ExpandError::unexpected_eof(EofContext::DoubleQuote, Location::eof("a"));
        let math = ExpandError::unexpected_eof(EofContext::Expression, Location::eof("a"));
        assert_eq!(quote.error_code(), codes::lexical::UNTERMINATED_CONSTRUCT);
        assert_eq!(math.error_code(), codes::expansion::UNEXPECTED_EOF);
    }

    #[test]
    fn test_contract_breaches_require_halt() {
        let underflow = ExpandError::UngetUnderflow {
            location: Location::new("a", 1, 1),
        };
        assert!(underflow.requires_halt());
        assert_eq!(underflow.severity(), "Critical");
        assert!(ExpandError::DanglingOptional.requires_halt());
        assert!(ExpandError::DanglingOptional.location().is_none());

        let unresolved = ExpandError::MissingVariableName {
            location: Location::new("a", 1, 2),
        };
        assert!(!unresolved.requires_halt());
        assert_eq!(unresolved.location(), Some(&Location::new("a", 1, 2)));
    }

    #[test]
    fn test_io_not_found_is_classified() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = ExpandError::io("a.ini", &missing);
        assert_eq!(error, ExpandError::FileNotFound { source_name: "a.ini".to_string() });
        assert_eq!(error.error_code(), codes::file_processing::FILE_NOT_FOUND);

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert_eq!(
            ExpandError::io("a.ini", &denied).error_code(),
            codes::file_processing::IO_ERROR
        );
    }
}
