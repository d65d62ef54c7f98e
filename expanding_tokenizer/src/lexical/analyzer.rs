//! Token production over a shared reader

use super::{LexerConfig, WhitespacePolicy};
use crate::config::compile_time::lexical::{MAX_COMMENT_LENGTH, MAX_TOKEN_LENGTH};
use crate::config::compile_time::matcher::MAX_PENDING_TOKENS;
use crate::config::runtime::LexicalPreferences;
use crate::error::{EofContext, ExpandError, ExpandResult};
use crate::expansion::{Expander, QuoteRegistry};
use crate::logging::codes;
use crate::source::Reader;
use crate::tokens::{Token, TokenKind};
use crate::utils::Location;
use crate::variables::VariableResolver;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::collections::VecDeque;

/// Counters reported when the lexer first reaches EOF
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LexerMetrics {
    pub total_tokens: usize,
    pub text_tokens: usize,
    pub section_tokens: usize,
    pub structural_tokens: usize,
    pub layout_tokens: usize,
    pub expansions: usize,
    pub comments: usize,
    pub max_token_length: usize,
}

impl LexerMetrics {
    pub(crate) fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token.kind() {
            TokenKind::Text => self.text_tokens += 1,
            TokenKind::Section => self.section_tokens += 1,
            TokenKind::Newline | TokenKind::Whitespace => self.layout_tokens += 1,
            TokenKind::Eof => {}
            _ => self.structural_tokens += 1,
        }
        self.max_token_length = self.max_token_length.max(token.content().chars().count());
    }
}

/// Text accumulated for one token, bounded by `MAX_TOKEN_LENGTH`
struct TokenText {
    text: String,
    chars: usize,
    start: Location,
}

impl TokenText {
    fn new(start: Location) -> Self {
        Self {
            text: String::new(),
            chars: 0,
            start,
        }
    }

    fn push(&mut self, c: char) -> ExpandResult<()> {
        self.chars += 1;
        self.check()?;
        self.text.push(c);
        Ok(())
    }

    fn push_str(&mut self, s: &str) -> ExpandResult<()> {
        self.chars += s.chars().count();
        self.check()?;
        self.text.push_str(s);
        Ok(())
    }

    fn check(&self) -> ExpandResult<()> {
        if self.chars > MAX_TOKEN_LENGTH {
            return Err(ExpandError::TokenTooLarge {
                location: self.start.clone(),
            });
        }
        Ok(())
    }

    fn into_token(self, kind: TokenKind) -> Token {
        Token::new(self.start, kind, self.text)
    }
}

pub struct Lexer<'a> {
    reader: Reader<'a>,
    variables: Box<dyn VariableResolver + 'a>,
    quotes: QuoteRegistry,
    config: LexerConfig,
    pub(super) pending: VecDeque<Token>,
    metrics: LexerMetrics,
    preferences: LexicalPreferences,
    reached_eof: bool,
}

impl<'a> Lexer<'a> {
    pub fn new<V>(reader: Reader<'a>, variables: V, config: LexerConfig) -> Self
    where
        V: VariableResolver + 'a,
    {
        Self {
            reader,
            variables: Box::new(variables),
            quotes: QuoteRegistry::builtin(),
            config,
            pending: VecDeque::new(),
            metrics: LexerMetrics::default(),
            preferences: LexicalPreferences::default(),
            reached_eof: false,
        }
    }

    /// Lexer over in-memory text
    pub fn from_text<V>(
        text: &'a str,
        source_name: &str,
        variables: V,
        config: LexerConfig,
    ) -> ExpandResult<Self>
    where
        V: VariableResolver + 'a,
    {
        Ok(Self::new(Reader::from_text(text, source_name)?, variables, config))
    }

    /// Replace the built-in quote functions
    pub fn with_quotes(mut self, quotes: QuoteRegistry) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_preferences(mut self, preferences: LexicalPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &LexerMetrics {
        &self.metrics
    }

    pub fn source_name(&self) -> &str {
        self.reader.source_name()
    }

    /// Consume one token. At end of input EOF is returned on every call.
    pub fn next_token(&mut self) -> ExpandResult<Token> {
        match self.pending.pop_front() {
            Some(token) => Ok(token),
            None => self.produce(),
        }
    }

    pub fn peek_token(&mut self) -> ExpandResult<&Token> {
        self.pending_at(0)
    }

    pub fn is_eof(&mut self) -> ExpandResult<bool> {
        Ok(self.peek_token()?.is_a(TokenKind::Eof))
    }

    /// The pending token at `index`, producing tokens as needed
    pub(super) fn pending_at(&mut self, index: usize) -> ExpandResult<&Token> {
        while self.pending.len() <= index {
            if self.pending.len() >= MAX_PENDING_TOKENS {
                let error = ExpandError::LookaheadExceeded {
                    location: self.reader.at(),
                };
                self.log_failure(&error);
                return Err(error);
            }
            let token = self.produce()?;
            self.pending.push_back(token);
        }
        Ok(&self.pending[index])
    }

    fn produce(&mut self) -> ExpandResult<Token> {
        match self.read_token() {
            Ok(token) => {
                if token.is_a(TokenKind::Eof) {
                    self.report_eof();
                } else if self.preferences.collect_detailed_metrics {
                    self.metrics.record_token(&token);
                }
                Ok(token)
            }
            Err(error) => {
                self.log_failure(&error);
                Err(error)
            }
        }
    }

    fn log_failure(&self, error: &ExpandError) {
        let message = error.to_string();
        match error.location() {
            Some(location) => log_error!(error.error_code(), &message,
                location = location.clone(),
                "source" => self.reader.source_name(),
                "action" => error.recommended_action()
            ),
            None => log_error!(error.error_code(), &message,
                "source" => self.reader.source_name(),
                "action" => error.recommended_action()
            ),
        }
    }

    fn report_eof(&mut self) {
        if self.reached_eof {
            return;
        }
        self.reached_eof = true;

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization complete",
            "source" => self.reader.source_name(),
            "tokens" => self.metrics.total_tokens,
            "expansions" => self.metrics.expansions,
            "comments" => self.metrics.comments,
            "max_token_length" => self.metrics.max_token_length
        );
    }

    // ========================================================================
    // TOKEN PRODUCTION
    // ========================================================================

    fn read_token(&mut self) -> ExpandResult<Token> {
        loop {
            let at = self.reader.at();
            let c = match self.reader.get()? {
                Some(c) => c,
                None => return Ok(Token::new(at, TokenKind::Eof, "")),
            };

            if c.is_whitespace() {
                match self.read_whitespace(c, at)? {
                    Some(token) => return Ok(token),
                    None => continue,
                }
            }

            match c {
                '#' | ';' => {
                    self.skip_comment(&at)?;
                    continue;
                }
                '$' => {
                    let mut text = TokenText::new(at.clone());
                    text.push_str(&self.expand(&at)?)?;
                    return Ok(text.into_token(TokenKind::Text));
                }
                _ => {}
            }

            if let Some(kind) = self.config.single_token(c) {
                return Ok(Token::new(at, kind, c.to_string()));
            }

            return match c {
                '[' => self.read_section(at),
                '"' => self.read_double_quote(at),
                '\'' => self.read_single_quote(at),
                _ => self.read_word(c, at),
            };
        }
    }

    /// Token for the whitespace starting with `c`, or `None` when the policy
    /// drops it
    fn read_whitespace(&mut self, c: char, at: Location) -> ExpandResult<Option<Token>> {
        match self.config.whitespace() {
            WhitespacePolicy::Suppress => Ok(None),
            WhitespacePolicy::NewlineOnly if c == '\n' => {
                Ok(Some(Token::new(at, TokenKind::Newline, "\n")))
            }
            WhitespacePolicy::NewlineOnly => Ok(None),
            WhitespacePolicy::WhitespaceOnly => {
                let run = self.read_whitespace_run(c, at, char::is_whitespace)?;
                Ok(Some(run))
            }
            WhitespacePolicy::Separate if c == '\n' => {
                Ok(Some(Token::new(at, TokenKind::Newline, "\n")))
            }
            WhitespacePolicy::Separate => {
                let run = self.read_whitespace_run(c, at, |c| c.is_whitespace() && c != '\n')?;
                Ok(Some(run))
            }
        }
    }

    fn read_whitespace_run(
        &mut self,
        first: char,
        at: Location,
        in_run: impl Fn(char) -> bool,
    ) -> ExpandResult<Token> {
        let mut text = TokenText::new(at);
        text.push(first)?;
        while let Some(c) = self.reader.get()? {
            if !in_run(c) {
                self.reader.unget()?;
                break;
            }
            text.push(c)?;
        }
        Ok(text.into_token(TokenKind::Whitespace))
    }

    /// Skip to the end of the line; the newline itself stays in the input
    fn skip_comment(&mut self, at: &Location) -> ExpandResult<()> {
        let mut length = 0;
        while let Some(c) = self.reader.get()? {
            if c == '\n' {
                self.reader.unget()?;
                break;
            }
            length += 1;
            if length > MAX_COMMENT_LENGTH {
                return Err(ExpandError::CommentTooLong {
                    location: at.clone(),
                });
            }
        }
        self.metrics.comments += 1;
        Ok(())
    }

    fn expand(&mut self, at: &Location) -> ExpandResult<String> {
        let expanded =
            Expander::new(&mut self.reader, &*self.variables, &self.quotes).expand(at, true)?;
        self.metrics.expansions += 1;

        if self.preferences.log_expansions {
            log_debug!("Expanded variable",
                "location" => at,
                "value" => expanded.as_str()
            );
        }
        Ok(expanded)
    }

    fn read_section(&mut self, at: Location) -> ExpandResult<Token> {
        let mut text = TokenText::new(at.clone());
        loop {
            let position = self.reader.at();
            match self.reader.get()? {
                Some(']') => return Ok(text.into_token(TokenKind::Section)),
                Some(c) if c.is_whitespace() => {
                    return Err(ExpandError::WhitespaceInSection { location: position })
                }
                Some('$') => text.push_str(&self.expand(&position)?)?,
                Some('\\') => text.push(self.reader.get_quoted()?)?,
                Some(c) => text.push(c)?,
                None => return Err(ExpandError::unexpected_eof(EofContext::Section, at)),
            }
        }
    }

    fn read_double_quote(&mut self, at: Location) -> ExpandResult<Token> {
        let mut text = TokenText::new(at.clone());
        loop {
            let position = self.reader.at();
            match self.reader.get()? {
                Some('"') => return Ok(text.into_token(TokenKind::Text)),
                Some('$') => text.push_str(&self.expand(&position)?)?,
                Some('\\') => text.push(self.reader.get_quoted()?)?,
                Some(c) => text.push(c)?,
                None => return Err(ExpandError::unexpected_eof(EofContext::DoubleQuote, at)),
            }
        }
    }

    /// `''` inside single quotes is a literal quote
    fn read_single_quote(&mut self, at: Location) -> ExpandResult<Token> {
        let mut text = TokenText::new(at.clone());
        loop {
            match self.reader.get()? {
                Some('\'') => match self.reader.get()? {
                    Some('\'') => text.push('\'')?,
                    Some(_) => {
                        self.reader.unget()?;
                        return Ok(text.into_token(TokenKind::Text));
                    }
                    None => return Ok(text.into_token(TokenKind::Text)),
                },
                Some(c) => text.push(c)?,
                None => return Err(ExpandError::unexpected_eof(EofContext::SingleQuote, at)),
            }
        }
    }

    fn read_word(&mut self, first: char, at: Location) -> ExpandResult<Token> {
        let mut text = TokenText::new(at);
        text.push(first)?;
        while let Some(c) = self.reader.get()? {
            if self.config.is_break(c) {
                self.reader.unget()?;
                break;
            }
            text.push(c)?;
        }
        Ok(text.into_token(TokenKind::Text))
    }
}

impl Iterator for Lexer<'_> {
    type Item = ExpandResult<Token>;

    /// Every token up to and including the first EOF; nothing after an error
    fn next(&mut self) -> Option<Self::Item> {
        if self.reached_eof && self.pending.is_empty() {
            return None;
        }
        let result = self.next_token();
        if result.is_err() {
            self.reached_eof = true;
            self.pending.clear();
        }
        Some(result)
    }
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("reader", &self.reader)
            .field("quotes", &self.quotes)
            .field("config", &self.config)
            .field("pending", &self.pending)
            .field("metrics", &self.metrics)
            .finish()
    }
}
