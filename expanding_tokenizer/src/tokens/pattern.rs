//! Shapes the matcher compares tokens against

use super::token::{Token, TokenKind};
use std::fmt;

/// A concrete kind or one of the synthetic classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Kind(TokenKind),
    /// TEXT without embedded whitespace
    Word,
    /// TEXT holding an integer literal
    Number,
    /// NEWLINE or EOF
    Eol,
    /// NEWLINE or WHITESPACE
    AnyWhitespace,
    Any,
}

impl TokenClass {
    pub fn matches(self, token: &Token) -> bool {
        match self {
            Self::Kind(kind) => token.is_a(kind),
            Self::Word => token.is_word(),
            Self::Number => token.is_number(),
            Self::Eol => token.is_eol(),
            Self::AnyWhitespace => token.is_any_whitespace(),
            Self::Any => true,
        }
    }
}

impl From<TokenKind> for TokenClass {
    fn from(kind: TokenKind) -> Self {
        Self::Kind(kind)
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => kind.fmt(f),
            Self::Word => f.write_str("WORD"),
            Self::Number => f.write_str("NUMBER"),
            Self::Eol => f.write_str("EOL"),
            Self::AnyWhitespace => f.write_str("ANY_WHITESPACE"),
            Self::Any => f.write_str("ANY"),
        }
    }
}

/// One position of a matcher pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternElement {
    One(TokenClass),
    /// Alternation: any of the classes
    OneOf(Vec<TokenClass>),
    /// Zero or more tokens of the following element, not reported in the output
    Optional,
}

pub const OPTIONAL: PatternElement = PatternElement::Optional;

impl PatternElement {
    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Self::One(class) => class.matches(token),
            Self::OneOf(classes) => classes.iter().any(|class| class.matches(token)),
            Self::Optional => false,
        }
    }
}

impl From<TokenClass> for PatternElement {
    fn from(class: TokenClass) -> Self {
        Self::One(class)
    }
}

impl From<TokenKind> for PatternElement {
    fn from(kind: TokenKind) -> Self {
        Self::One(TokenClass::Kind(kind))
    }
}

pub fn one(class: impl Into<TokenClass>) -> PatternElement {
    PatternElement::One(class.into())
}

pub fn one_of<I, C>(classes: I) -> PatternElement
where
    I: IntoIterator<Item = C>,
    C: Into<TokenClass>,
{
    PatternElement::OneOf(classes.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Location;

    fn token(kind: TokenKind, content: &str) -> Token {
        Token::new(Location::new("<test>", 1, 1), kind, content)
    }

    #[test]
    fn test_class_matching() {
        let word = token(TokenKind::Text, "foo");
        let number = token(TokenKind::Text, "-12");
        let spaced = token(TokenKind::Text, "foo bar");

        assert!(TokenClass::Word.matches(&word));
        assert!(TokenClass::Word.matches(&number));
        assert!(!TokenClass::Word.matches(&spaced));
        assert!(TokenClass::Number.matches(&number));
        assert!(!TokenClass::Number.matches(&word));
        assert!(TokenClass::Kind(TokenKind::Text).matches(&spaced));
        assert!(TokenClass::Any.matches(&token(TokenKind::Bang, "!")));
    }

    #[test]
    fn test_alternation() {
        let element = one_of([TokenKind::Eq, TokenKind::Colon]);
        assert!(element.matches(&token(TokenKind::Colon, ":")));
        assert!(!element.matches(&token(TokenKind::Text, ":")));
        assert!(!OPTIONAL.matches(&token(TokenKind::Text, "x")));
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenClass::AnyWhitespace.to_string(), "ANY_WHITESPACE");
        assert_eq!(TokenClass::from(TokenKind::Section).to_string(), "SECTION");
    }
}
