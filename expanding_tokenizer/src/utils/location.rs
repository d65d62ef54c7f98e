//! Source location tracking
//!
//! Every token and every error carries a `Location` so a failure can point
//! at the exact character in the original input.
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::sync::Arc;

/// A line/column pair, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A named point in the input, or the end of that input.
///
/// The source name is shared, so cloning a location is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    source_name: Arc<str>,
    position: Option<Position>,
}

impl Location {
    pub fn new(source_name: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            source_name: source_name.into(),
            position: Some(Position::new(line, column)),
        }
    }

    /// The terminal location of a source
    pub fn eof(source_name: impl Into<Arc<str>>) -> Self {
        Self {
            source_name: source_name.into(),
            position: None,
        }
    }

    pub(crate) fn at_position(source_name: Arc<str>, position: Option<Position>) -> Self {
        Self {
            source_name,
            position,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn line(&self) -> Option<u32> {
        self.position.map(|p| p.line)
    }

    pub fn column(&self) -> Option<u32> {
        self.position.map(|p| p.column)
    }

    pub fn is_eof(&self) -> bool {
        self.position.is_none()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{}:{}", self.source_name, position),
            None => write!(f, "{}:EOF", self.source_name),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Location", 3)?;
        state.serialize_field("source_name", &*self.source_name)?;
        state.serialize_field("line", &self.line())?;
        state.serialize_field("column", &self.column())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Location::new("app.ini", 2, 5).to_string(), "app.ini:2:5");
        assert_eq!(Location::eof("app.ini").to_string(), "app.ini:EOF");
    }

    #[test]
    fn test_accessors() {
        let location = Location::new("<stdin>", 7, 1);
        assert_eq!(location.source_name(), "<stdin>");
        assert_eq!(location.line(), Some(7));
        assert_eq!(location.column(), Some(1));
        assert!(!location.is_eof());
        assert!(Location::eof("x").line().is_none());
    }

    #[test]
    fn test_clones_share_name() {
        let location = Location::new("shared", 1, 1);
        let copy = location.clone();
        assert!(Arc::ptr_eq(&location.source_name, &copy.source_name));
        assert_eq!(location, copy);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(Location::new("a.ini", 3, 9)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"source_name": "a.ini", "line": 3, "column": 9})
        );
    }
}
