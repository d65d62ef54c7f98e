//! `$` expansion: bare names, braced names with quotes and defaults, and
//! arithmetic expressions
//!
//! An `Expander` is built per expansion site on top of the lexer's reader.
//! With `should_resolve == false` the construct is parsed for syntax only and
//! resolution failures are not reported.

pub mod arithmetic;
pub mod quotes;

pub use arithmetic::{ArithmeticKind, ArithmeticToken, BinaryOperator, Expr};
pub use quotes::{QuoteFn, QuoteRegistry};

use crate::config::compile_time::expansion::MAX_EXPANSION_DEPTH;
use crate::error::{EofContext, ExpandError, ExpandResult};
use crate::source::Reader;
use crate::utils::Location;
use crate::variables::VariableResolver;

pub struct Expander<'r, 'a> {
    reader: &'r mut Reader<'a>,
    variables: &'r dyn VariableResolver,
    quotes: &'r QuoteRegistry,
    depth: u32,
}

impl<'r, 'a> Expander<'r, 'a> {
    pub fn new(
        reader: &'r mut Reader<'a>,
        variables: &'r dyn VariableResolver,
        quotes: &'r QuoteRegistry,
    ) -> Self {
        Self {
            reader,
            variables,
            quotes,
            depth: 0,
        }
    }

    /// Expand the construct following a `$` the caller already consumed.
    ///
    /// `at` is the location of the `$` and is used in errors about the
    /// construct as a whole.
    pub fn expand(&mut self, at: &Location, should_resolve: bool) -> ExpandResult<String> {
        self.descend(at)?;
        let result = self.expand_construct(at, should_resolve);
        self.ascend();
        result
    }

    fn expand_construct(&mut self, at: &Location, should_resolve: bool) -> ExpandResult<String> {
        match self.reader.get()? {
            Some('{') => self.expand_braced(at, should_resolve),
            Some('(') => self.expand_arithmetic(at, should_resolve),
            Some(_) => {
                self.reader.unget()?;
                self.expand_bare(at, should_resolve)
            }
            None => self.expand_bare(at, should_resolve),
        }
    }

    fn descend(&mut self, at: &Location) -> ExpandResult<()> {
        if self.depth >= MAX_EXPANSION_DEPTH {
            return Err(ExpandError::NestingTooDeep {
                location: at.clone(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn lookup_name(&mut self) -> ExpandResult<(Option<String>, Option<String>)> {
        let name = self.variables.read_name(self.reader)?;
        let value = name.as_deref().and_then(|name| self.variables.lookup(name));
        Ok((name, value))
    }

    fn expand_bare(&mut self, at: &Location, should_resolve: bool) -> ExpandResult<String> {
        let (name, value) = self.lookup_name()?;
        if should_resolve {
            require_value(at, name, value)
        } else {
            Ok(value.unwrap_or_default())
        }
    }

    /// `{NAME[:quote[,quote]...][|default]}` with the `{` already consumed
    fn expand_braced(&mut self, at: &Location, should_resolve: bool) -> ExpandResult<String> {
        let registry = self.quotes;
        let (name, value) = self.lookup_name()?;

        let mut quotes: Vec<&QuoteFn> = Vec::new();
        let mut next_at = self.reader.at();
        let mut next = self.reader.get()?;

        if next == Some(':') {
            loop {
                let quote_at = self.reader.at();
                let mut quote = String::new();
                next_at = self.reader.at();
                next = self.reader.get()?;
                while let Some(c) = next.filter(char::is_ascii_alphanumeric) {
                    quote.push(c);
                    next_at = self.reader.at();
                    next = self.reader.get()?;
                }

                if next.is_none() {
                    return Err(ExpandError::unexpected_eof(EofContext::Variable, at.clone()));
                }

                match registry.get(&quote) {
                    Some(quote_fn) => quotes.push(quote_fn),
                    None => {
                        return Err(ExpandError::UnknownQuote {
                            quote,
                            location: quote_at,
                        })
                    }
                }

                if next != Some(',') {
                    break;
                }
            }
        }

        match next {
            Some('|') => {
                let default = self.read_default(should_resolve && value.is_none())?;
                if !should_resolve {
                    return Ok(String::new());
                }
                match value {
                    Some(value) => apply_quotes(value, &quotes, at),
                    None => Ok(default),
                }
            }
            Some('}') => {
                if !should_resolve {
                    return Ok(String::new());
                }
                let value = require_value(at, name, value)?;
                apply_quotes(value, &quotes, at)
            }
            Some(c) => Err(ExpandError::unexpected_character(c, "'}'", next_at)),
            None => Err(ExpandError::unexpected_eof(EofContext::Variable, at.clone())),
        }
    }

    /// Text up to the closing `}` with nested `$` and `\` handled
    fn read_default(&mut self, should_resolve: bool) -> ExpandResult<String> {
        let start = self.reader.at();
        let mut content = String::new();

        loop {
            let position = self.reader.at();
            match self.reader.get()? {
                Some('}') => return Ok(content),
                Some('$') => {
                    let expanded = self.expand(&position, should_resolve)?;
                    content.push_str(&expanded);
                }
                Some('\\') => content.push(self.reader.get_quoted()?),
                Some(c) => content.push(c),
                None => return Err(ExpandError::unexpected_eof(EofContext::DefaultValue, start)),
            }
        }
    }
}

fn require_value(at: &Location, name: Option<String>, value: Option<String>) -> ExpandResult<String> {
    match (name, value) {
        (Some(_), Some(value)) => Ok(value),
        (Some(name), None) => Err(ExpandError::UnresolvedVariable {
            name,
            location: at.clone(),
        }),
        (None, _) => Err(ExpandError::MissingVariableName {
            location: at.clone(),
        }),
    }
}

fn apply_quotes(value: String, quotes: &[&QuoteFn], at: &Location) -> ExpandResult<String> {
    quotes.iter().try_fold(value, |text, quote| quote(&text, at))
}
