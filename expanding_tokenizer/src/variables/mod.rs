//! Variable name recognition and value lookup
//!
//! The expander never touches the process environment directly: callers hand
//! the lexer a `VariableResolver`.

use crate::error::ExpandResult;
use crate::source::Reader;
use std::collections::HashMap;
use std::env;

/// Characters allowed in a variable name
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Capability consumed by the expander
pub trait VariableResolver {
    /// Consume a `[A-Za-z0-9_]+` name from the reader.
    ///
    /// Leaves the reader just past the name. When the first character is not
    /// a name character nothing is consumed and `None` is returned.
    fn read_name(&self, reader: &mut Reader<'_>) -> ExpandResult<Option<String>> {
        let mut name = String::new();
        while let Some(c) = reader.get()? {
            if !is_name_char(c) {
                reader.unget()?;
                break;
            }
            name.push(c);
        }
        Ok((!name.is_empty()).then_some(name))
    }

    fn lookup(&self, name: &str) -> Option<String>;
}

/// Resolves names against the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentVariables;

impl VariableResolver for EnvironmentVariables {
    fn lookup(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

/// Resolves names against an in-memory table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapVariables {
    values: HashMap<String, String>,
}

impl MapVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment
    pub fn from_environment() -> Self {
        env::vars().collect()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl VariableResolver for MapVariables {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl VariableResolver for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: VariableResolver + ?Sized> VariableResolver for &T {
    fn read_name(&self, reader: &mut Reader<'_>) -> ExpandResult<Option<String>> {
        (**self).read_name(reader)
    }

    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variables() -> MapVariables {
        MapVariables::new().with("_ABC123", "abc").with("DEF", "fed")
    }

    #[test]
    fn test_read_name_at_eof() {
        let mut reader = Reader::from_text("_ABC123", "<test>").unwrap();
        assert_eq!(
            variables().read_name(&mut reader).unwrap().as_deref(),
            Some("_ABC123")
        );
        assert_eq!(reader.get().unwrap(), None);
    }

    #[test]
    fn test_read_name_stops_before_terminator() {
        for (text, next) in [("_ABC123 ", ' '), ("_ABC123\n", '\n'), ("_ABC123}", '}')] {
            let mut reader = Reader::from_text(text, "<test>").unwrap();
            assert_eq!(
                variables().read_name(&mut reader).unwrap().as_deref(),
                Some("_ABC123")
            );
            assert_eq!(reader.get().unwrap(), Some(next));
        }
    }

    #[test]
    fn test_read_name_consumes_nothing_without_name() {
        let mut reader = Reader::from_text("-x", "<test>").unwrap();
        assert_eq!(variables().read_name(&mut reader).unwrap(), None);
        assert_eq!(reader.get().unwrap(), Some('-'));
    }

    #[test]
    fn test_lookup() {
        let variables = variables();
        assert_eq!(variables.lookup("FOO"), None);
        assert_eq!(variables.lookup("_ABC123").as_deref(), Some("abc"));
        assert_eq!((&variables).lookup("DEF").as_deref(), Some("fed"));
    }

    #[test]
    fn test_hash_map_resolver() {
        let map: HashMap<String, String> = [("A".to_string(), "1".to_string())].into();
        assert_eq!(map.lookup("A").as_deref(), Some("1"));
        assert_eq!(map.lookup("B"), None);
    }

    #[test]
    fn test_environment_resolver() {
        if let Some((name, value)) = env::vars().next() {
            assert_eq!(EnvironmentVariables.lookup(&name), Some(value));
        }
        assert_eq!(
            EnvironmentVariables.lookup("EXPANDING_TOKENIZER_SURELY_UNSET_42"),
            None
        );
    }
}
