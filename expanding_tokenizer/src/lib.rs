//! Variable- and arithmetic-expanding tokenizer for configuration text
//!
//! The lexer resolves `$NAME`, `${NAME:quote,...|default}` and `$(expr)`
//! while it tokenizes, and grammar code consumes the tokens through the
//! matcher. See [`ini::parse_document`] for a complete grammar.

// Internal modules
pub mod config;
pub mod error;
pub mod expansion;
pub mod ini;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod source;
pub mod tokens;
pub mod utils;
pub mod variables;

// Re-export key types for library consumers
pub use error::{EofContext, ExpandError, ExpandResult};
pub use expansion::{Expander, QuoteRegistry};
pub use ini::{parse_document, DocumentError, IniDocument};
pub use lexical::{full_from_file, ini_from_file, Lexer, LexerConfig, WhitespacePolicy};
pub use source::Reader;
pub use tokens::{one, one_of, PatternElement, Token, TokenClass, TokenKind, OPTIONAL};
pub use utils::Location;
pub use variables::{EnvironmentVariables, MapVariables, VariableResolver};
