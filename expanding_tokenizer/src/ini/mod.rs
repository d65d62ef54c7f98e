//! INI documents built on the matcher
//!
//! ```text
//! ; comment
//! top = level
//! [server]
//! host = ${HOST|localhost}
//! port = $(8000 + $OFFSET)
//! ```
//!
//! Keys before the first header belong to the section named `""`. A value is
//! every TEXT token up to the end of the line, joined by single spaces.

use crate::error::ExpandError;
use crate::lexical::{Lexer, WhitespacePolicy};
use crate::logging::{codes, Code};
use crate::tokens::{one, PatternElement, Token, TokenClass, TokenKind, OPTIONAL};
use crate::utils::Location;
use crate::{log_debug, log_success};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("Duplicate key '{key}' in section '{section}' at: {location}")]
    DuplicateKey {
        section: String,
        key: String,
        location: Location,
    },

    #[error("Unexpected {found} at: {location}")]
    UnexpectedInput { found: String, location: Location },

    #[error("Whitespace policy {0:?} does not report line ends")]
    LinesNotReported(WhitespacePolicy),

    #[error(transparent)]
    Expand(#[from] ExpandError),
}

impl DocumentError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::DuplicateKey { .. } => codes::document::DUPLICATE_KEY,
            Self::UnexpectedInput { .. } => codes::document::UNEXPECTED_INPUT,
            Self::LinesNotReported(_) => codes::document::LINES_NOT_REPORTED,
            Self::Expand(error) => error.error_code(),
        }
    }

    fn unexpected(token: &Token) -> Self {
        Self::UnexpectedInput {
            found: token.kind().to_string(),
            location: token.location().clone(),
        }
    }
}

/// Section name to key/value table, both sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IniDocument {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniDocument {
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn insert(&mut self, section: &str, key: Token, value: String) -> Result<(), DocumentError> {
        let entries = self.sections.entry(section.to_string()).or_default();
        if entries.contains_key(key.content()) {
            return Err(DocumentError::DuplicateKey {
                section: section.to_string(),
                key: key.content().to_string(),
                location: key.location().clone(),
            });
        }
        entries.insert(key.into_content(), value);
        Ok(())
    }
}

struct Shapes {
    blank: [PatternElement; 3],
    end: [PatternElement; 3],
    header: [PatternElement; 6],
    key: [PatternElement; 6],
    value: [PatternElement; 3],
    line_end: [PatternElement; 3],
}

impl Shapes {
    fn new() -> Self {
        let whitespace = || one(TokenKind::Whitespace);
        Self {
            blank: [OPTIONAL, whitespace(), one(TokenKind::Newline)],
            end: [OPTIONAL, whitespace(), one(TokenKind::Eof)],
            header: [
                OPTIONAL,
                whitespace(),
                one(TokenKind::Section),
                OPTIONAL,
                whitespace(),
                one(TokenClass::Eol),
            ],
            key: [
                OPTIONAL,
                whitespace(),
                one(TokenClass::Word),
                OPTIONAL,
                whitespace(),
                one(TokenKind::Eq),
            ],
            value: [OPTIONAL, whitespace(), one(TokenKind::Text)],
            line_end: [OPTIONAL, whitespace(), one(TokenClass::Eol)],
        }
    }
}

/// Read the whole input as an INI document
pub fn parse_document(lexer: &mut Lexer<'_>) -> Result<IniDocument, DocumentError> {
    let policy = lexer.config().whitespace();
    if matches!(policy, WhitespacePolicy::Suppress | WhitespacePolicy::WhitespaceOnly) {
        return Err(DocumentError::LinesNotReported(policy));
    }

    let shapes = Shapes::new();
    let mut document = IniDocument::default();
    let mut section = String::new();
    let mut output = Vec::new();

    loop {
        output.clear();

        if lexer.tokens_are(&shapes.blank, &mut output)? {
            continue;
        }
        if lexer.tokens_are(&shapes.end, &mut output)? {
            break;
        }
        if lexer.tokens_are(&shapes.header, &mut output)? {
            section = output[0].content().to_string();
            log_debug!("Section opened", "section" => section.as_str());
            continue;
        }
        if let Some(mut key) = lexer.matches(&shapes.key)? {
            key.truncate(1);
            let value = read_value(lexer, &shapes)?;
            if let Some(key) = key.pop() {
                document.insert(&section, key, value)?;
            }
            continue;
        }

        let token = lexer.peek_token()?;
        return Err(DocumentError::unexpected(token));
    }

    log_success!(codes::success::DOCUMENT_COMPLETE, "Document parsed",
        "source" => lexer.source_name(),
        "sections" => document.sections.len()
    );
    Ok(document)
}

/// TEXT tokens up to the line end, joined by single spaces
fn read_value(lexer: &mut Lexer<'_>, shapes: &Shapes) -> Result<String, DocumentError> {
    let mut parts = Vec::new();
    loop {
        if let Some(mut text) = lexer.matches(&shapes.value)? {
            if let Some(token) = text.pop() {
                parts.push(token.into_content());
            }
            continue;
        }
        if lexer.matches(&shapes.line_end)?.is_some() {
            return Ok(parts.join(" "));
        }
        let token = lexer.peek_token()?;
        return Err(DocumentError::unexpected(token));
    }
}
