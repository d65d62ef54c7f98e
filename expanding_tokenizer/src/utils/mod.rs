//! Shared primitive types for the reader, expander and lexer

pub mod location;
pub mod number;

pub use location::{Location, Position};
pub use number::parse_integer;
