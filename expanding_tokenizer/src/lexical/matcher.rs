//! Pattern matching over the lexer's pending-token queue
//!
//! Matching only looks ahead. Tokens leave the queue when the whole pattern
//! matched; a failed attempt leaves the queue exactly as it was.

use super::Lexer;
use crate::error::{ExpandError, ExpandResult};
use crate::tokens::{PatternElement, Token, TokenKind};

impl Lexer<'_> {
    /// Match `pattern` against the upcoming tokens.
    ///
    /// On success the matched tokens, minus those absorbed by `OPTIONAL`, are
    /// appended to `output` and consumed. An `OPTIONAL` element never absorbs
    /// EOF.
    pub fn tokens_are(
        &mut self,
        pattern: &[PatternElement],
        output: &mut Vec<Token>,
    ) -> ExpandResult<bool> {
        validate_pattern(pattern)?;

        let mut index = 0;
        let mut reported = Vec::new();
        let mut optional = false;

        for element in pattern {
            if *element == PatternElement::Optional {
                optional = true;
                continue;
            }

            if optional {
                optional = false;
                loop {
                    let token = self.pending_at(index)?;
                    if token.is_a(TokenKind::Eof) || !element.matches(token) {
                        break;
                    }
                    reported.push(false);
                    index += 1;
                }
                continue;
            }

            if !element.matches(self.pending_at(index)?) {
                return Ok(false);
            }
            reported.push(true);
            index += 1;
        }

        let consumed = self.pending.drain(..index);
        output.extend(
            consumed
                .zip(reported)
                .filter_map(|(token, keep)| keep.then_some(token)),
        );
        Ok(true)
    }

    /// Matched tokens, or `None` when the pattern does not match
    pub fn matches(&mut self, pattern: &[PatternElement]) -> ExpandResult<Option<Vec<Token>>> {
        let mut output = Vec::new();
        Ok(self.tokens_are(pattern, &mut output)?.then_some(output))
    }
}

/// Every `OPTIONAL` must be followed by a plain element
fn validate_pattern(pattern: &[PatternElement]) -> ExpandResult<()> {
    for (position, element) in pattern.iter().enumerate() {
        if *element != PatternElement::Optional {
            continue;
        }
        match pattern.get(position + 1) {
            Some(PatternElement::Optional) | None => return Err(ExpandError::DanglingOptional),
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::matcher::MAX_PENDING_TOKENS;
    use crate::lexical::{LexerConfig, WhitespacePolicy};
    use crate::tokens::{one, one_of, TokenClass, OPTIONAL};
    use crate::variables::MapVariables;
    use assert_matches::assert_matches;

    fn lexer_for(text: &str, whitespace: WhitespacePolicy) -> Lexer<'_> {
        let config = LexerConfig::ini().with_whitespace(whitespace);
        Lexer::from_text(text, "<test>", MapVariables::new().with("ID", "123"), config).unwrap()
    }

    fn contents(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::content).collect()
    }

    const TEXT: TokenClass = TokenClass::Kind(TokenKind::Text);
    const EOF: TokenClass = TokenClass::Kind(TokenKind::Eof);
    const NEWLINE: TokenClass = TokenClass::Kind(TokenKind::Newline);
    const WHITESPACE: TokenClass = TokenClass::Kind(TokenKind::Whitespace);

    fn pattern(classes: &[TokenClass]) -> Vec<PatternElement> {
        classes.iter().copied().map(PatternElement::from).collect()
    }

    #[test]
    fn test_optional_whitespace_not_reported() {
        let mut lexer = lexer_for("  \n   foo bar", WhitespacePolicy::NewlineOnly);
        let mut output = Vec::new();
        let shape = [OPTIONAL, one(TokenClass::AnyWhitespace), one(TEXT)];

        assert!(lexer.tokens_are(&shape, &mut output).unwrap());
        assert_eq!(contents(&output), vec!["foo"]);
        assert!(lexer.tokens_are(&pattern(&[TEXT, EOF]), &mut output).unwrap());
    }

    #[test]
    fn test_optional_with_both_policies() {
        let mut lexer = lexer_for("  \n   foo'bar'", WhitespacePolicy::Separate);
        let shape = [OPTIONAL, one(TokenClass::AnyWhitespace), one(TEXT)];

        assert_eq!(contents(&lexer.matches(&shape).unwrap().unwrap()), vec!["foo"]);
        let tail = [OPTIONAL, one(TokenClass::AnyWhitespace), one(TEXT), one(EOF)];
        let output = lexer.matches(&tail).unwrap().unwrap();
        assert_eq!(contents(&output), vec!["bar", ""]);
    }

    #[test]
    fn test_whitespace_policy_shapes() {
        let mut lexer = lexer_for("  \n   foo bar", WhitespacePolicy::WhitespaceOnly);
        assert!(lexer.matches(&pattern(&[NEWLINE, TEXT])).unwrap().is_none());
        let output = lexer.matches(&pattern(&[WHITESPACE, TEXT])).unwrap().unwrap();
        assert_eq!(output[1].content(), "foo");
        let tail = [OPTIONAL, one(WHITESPACE), one(TEXT), one(EOF)];
        assert!(lexer.matches(&tail).unwrap().is_some());

        let mut lexer = lexer_for("  \n   foo bar", WhitespacePolicy::Separate);
        assert!(lexer.matches(&pattern(&[NEWLINE, TEXT])).unwrap().is_none());
        let output = lexer
            .matches(&pattern(&[WHITESPACE, NEWLINE, WHITESPACE, TEXT]))
            .unwrap()
            .unwrap();
        assert_eq!(output.len(), 4);
        assert_eq!(output[3].content(), "foo");
    }

    #[test]
    fn test_failed_match_leaves_queue_untouched() {
        let mut lexer = lexer_for("foo = \"abc $($ID) def\"\n", WhitespacePolicy::NewlineOnly);

        let wrong = pattern(&[TEXT, TEXT]);
        assert!(lexer.matches(&wrong).unwrap().is_none());
        let queued: Vec<Token> = lexer.pending.iter().cloned().collect();
        assert!(lexer.matches(&wrong).unwrap().is_none());
        assert_eq!(lexer.pending.iter().cloned().collect::<Vec<_>>(), queued);
        assert_eq!(lexer.peek_token().unwrap().content(), "foo");

        let right = pattern(&[
            TokenClass::Word,
            TokenClass::Kind(TokenKind::Eq),
            TEXT,
            NEWLINE,
        ]);
        let output = lexer.matches(&right).unwrap().unwrap();
        assert_eq!(output[2].content(), "abc 123 def");
        assert!(lexer.is_eof().unwrap());
    }

    #[test]
    fn test_eof_match_is_repeatable() {
        let mut lexer = lexer_for("", WhitespacePolicy::NewlineOnly);
        let mut output = Vec::new();
        for _ in 0..3 {
            assert!(lexer.tokens_are(&pattern(&[EOF]), &mut output).unwrap());
        }
        assert_eq!(output.len(), 3);
        assert!(lexer.tokens_are(&pattern(&[TokenClass::Eol]), &mut output).unwrap());
    }

    #[test]
    fn test_optional_never_absorbs_eof() {
        let mut lexer = lexer_for("a", WhitespacePolicy::NewlineOnly);
        let shape = [one(TEXT), OPTIONAL, one(TokenClass::Any), one(EOF)];
        let output = lexer.matches(&shape).unwrap().unwrap();
        assert_eq!(contents(&output), vec!["a", ""]);
    }

    #[test]
    fn test_alternation() {
        let mut lexer = lexer_for("[s]\nk = v", WhitespacePolicy::NewlineOnly);
        let header = [one_of([TokenKind::Section, TokenKind::Text]), one(TokenClass::Eol)];
        assert!(lexer.matches(&header).unwrap().is_some());
        assert!(lexer.matches(&header).unwrap().is_none());
        assert_eq!(lexer.peek_token().unwrap().content(), "k");
    }

    #[test]
    fn test_dangling_optional() {
        let mut lexer = lexer_for("a", WhitespacePolicy::NewlineOnly);
        assert_matches!(lexer.matches(&[one(TEXT), OPTIONAL]), Err(ExpandError::DanglingOptional));
        assert_matches!(
            lexer.matches(&[OPTIONAL, OPTIONAL, one(TEXT)]),
            Err(ExpandError::DanglingOptional)
        );
        assert!(lexer.pending.is_empty());
    }

    #[test]
    fn test_lookahead_limit() {
        let input = "a ".repeat(MAX_PENDING_TOKENS + 1);
        let mut lexer = lexer_for(&input, WhitespacePolicy::NewlineOnly);
        let shape = pattern(&vec![TEXT; MAX_PENDING_TOKENS + 1]);
        assert_matches!(lexer.matches(&shape), Err(ExpandError::LookaheadExceeded { .. }));
    }

    #[test]
    fn test_lexer_errors_propagate() {
        let mut lexer = lexer_for("a $MISSING", WhitespacePolicy::NewlineOnly);
        assert_matches!(
            lexer.matches(&pattern(&[TEXT, TEXT])),
            Err(ExpandError::UnresolvedVariable { .. })
        );
    }
}
