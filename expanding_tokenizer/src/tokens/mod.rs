//! Token vocabulary shared by the lexer, the matcher and grammar code
//!
//! A [`Token`] stores one concrete [`TokenKind`]. Grammar code describes the
//! shapes it expects with [`TokenClass`], which adds the synthetic classes
//! (`WORD`, `NUMBER`, `EOL`, `ANY_WHITESPACE`, `ANY`) computed from a token's
//! kind and content.

pub mod pattern;
pub mod token;

pub use pattern::{one, one_of, PatternElement, TokenClass, OPTIONAL};
pub use token::{Token, TokenKind, ALL_GLYPHS};
