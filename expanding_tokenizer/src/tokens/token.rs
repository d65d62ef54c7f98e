use crate::utils::{parse_integer, Location};
use serde::Serialize;
use std::fmt;

/// Every glyph that can be configured as a single-character token
pub const ALL_GLYPHS: &str = "=.,:;(){}[]+-*/%^&<>?!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // === STRUCTURAL GLYPHS ===
    Eq,          // =
    Dot,         // .
    Comma,       // ,
    Colon,       // :
    Semicolon,   // ;
    LeftParen,   // (
    RightParen,  // )
    LeftBrace,   // {
    RightBrace,  // }
    LeftBracket, // [
    RightBracket, // ]
    Add,         // +
    Sub,         // -
    Mul,         // *
    Div,         // /
    Mod,         // %
    Caret,       // ^
    Ampersand,   // &
    Less,        // <
    Greater,     // >
    Question,    // ?
    Bang,        // !

    // === CONTENT ===
    /// Word, quoted string or expansion result
    Text,
    /// Content of a `[...]` header
    Section,

    // === LAYOUT ===
    Newline,
    Whitespace,
    Eof,
}

impl TokenKind {
    pub fn from_glyph(c: char) -> Option<Self> {
        let kind = match c {
            '=' => Self::Eq,
            '.' => Self::Dot,
            ',' => Self::Comma,
            ':' => Self::Colon,
            ';' => Self::Semicolon,
            '(' => Self::LeftParen,
            ')' => Self::RightParen,
            '{' => Self::LeftBrace,
            '}' => Self::RightBrace,
            '[' => Self::LeftBracket,
            ']' => Self::RightBracket,
            '+' => Self::Add,
            '-' => Self::Sub,
            '*' => Self::Mul,
            '/' => Self::Div,
            '%' => Self::Mod,
            '^' => Self::Caret,
            '&' => Self::Ampersand,
            '<' => Self::Less,
            '>' => Self::Greater,
            '?' => Self::Question,
            '!' => Self::Bang,
            _ => return None,
        };
        Some(kind)
    }

    /// The glyph of a structural kind
    pub fn glyph(self) -> Option<char> {
        let c = match self {
            Self::Eq => '=',
            Self::Dot => '.',
            Self::Comma => ',',
            Self::Colon => ':',
            Self::Semicolon => ';',
            Self::LeftParen => '(',
            Self::RightParen => ')',
            Self::LeftBrace => '{',
            Self::RightBrace => '}',
            Self::LeftBracket => '[',
            Self::RightBracket => ']',
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Mod => '%',
            Self::Caret => '^',
            Self::Ampersand => '&',
            Self::Less => '<',
            Self::Greater => '>',
            Self::Question => '?',
            Self::Bang => '!',
            Self::Text | Self::Section | Self::Newline | Self::Whitespace | Self::Eof => {
                return None
            }
        };
        Some(c)
    }

    pub fn is_structural(self) -> bool {
        self.glyph().is_some()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Dot => "DOT",
            Self::Comma => "COMMA",
            Self::Colon => "COLON",
            Self::Semicolon => "SEMICOLON",
            Self::LeftParen => "LEFT_PAREN",
            Self::RightParen => "RIGHT_PAREN",
            Self::LeftBrace => "LEFT_BRACE",
            Self::RightBrace => "RIGHT_BRACE",
            Self::LeftBracket => "LEFT_BRACKET",
            Self::RightBracket => "RIGHT_BRACKET",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Caret => "CARET",
            Self::Ampersand => "AMPERSAND",
            Self::Less => "LESS",
            Self::Greater => "GREATER",
            Self::Question => "QUESTION",
            Self::Bang => "BANG",
            Self::Text => "TEXT",
            Self::Section => "SECTION",
            Self::Newline => "NEWLINE",
            Self::Whitespace => "WHITESPACE",
            Self::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable lexer output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    location: Location,
    kind: TokenKind,
    content: String,
}

impl Token {
    pub fn new(location: Location, kind: TokenKind, content: impl Into<String>) -> Self {
        Self {
            location,
            kind,
            content: content.into(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    pub fn is_a(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// TEXT without embedded whitespace
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Text && !self.content.chars().any(char::is_whitespace)
    }

    /// TEXT holding a signed hex, octal or decimal integer
    pub fn is_number(&self) -> bool {
        self.number_value().is_some()
    }

    pub fn number_value(&self) -> Option<i64> {
        if self.kind != TokenKind::Text {
            return None;
        }
        parse_integer(&self.content)
    }

    /// NEWLINE or EOF
    pub fn is_eol(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::Eof)
    }

    /// NEWLINE or WHITESPACE
    pub fn is_any_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::Whitespace)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Text | TokenKind::Section | TokenKind::Whitespace => {
                write!(f, "{}({:?}) at {}", self.kind, self.content, self.location)
            }
            _ => write!(f, "{} at {}", self.kind, self.location),
        }
    }
}
