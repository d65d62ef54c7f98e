//! Line-buffered character reader
//!
//! The reader keeps a short window of the most recently read lines so that
//! the lexer can step back one character, even across a line break, without
//! holding the whole input in memory.

use crate::error::{EofContext, ExpandError, ExpandResult};
use crate::utils::{Location, Position};
use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::Arc;

/// Number of lines retained for unget
pub const WINDOW_LINES: usize = 3;

#[derive(Debug)]
struct SourceLine {
    number: u32,
    chars: Vec<char>,
}

pub struct Reader<'a> {
    source: Box<dyn BufRead + 'a>,
    source_name: Arc<str>,
    window: VecDeque<SourceLine>,
    lines_read: u32,
    // Cursor: index into `window` and 0-based column within that line
    line: usize,
    column: usize,
    exhausted: bool,
}

impl<'a> Reader<'a> {
    /// Wrap a buffered source; the first line is read immediately.
    pub fn new<R: BufRead + 'a>(source: R, source_name: &str) -> ExpandResult<Self> {
        let mut reader = Self {
            source: Box::new(source),
            source_name: Arc::from(source_name),
            window: VecDeque::with_capacity(WINDOW_LINES),
            lines_read: 0,
            line: 0,
            column: 0,
            exhausted: false,
        };
        reader.read_line()?;
        Ok(reader)
    }

    /// Read from an in-memory string
    pub fn from_text(text: &'a str, source_name: &str) -> ExpandResult<Self> {
        Self::new(text.as_bytes(), source_name)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Append the next physical line, evicting the oldest beyond the window
    fn read_line(&mut self) -> ExpandResult<()> {
        if self.exhausted {
            return Ok(());
        }

        let mut text = String::new();
        let read = self
            .source
            .read_line(&mut text)
            .map_err(|e| ExpandError::io(&self.source_name, &e))?;

        if read == 0 {
            self.exhausted = true;
            return Ok(());
        }

        while self.window.len() >= WINDOW_LINES {
            self.window.pop_front();
        }
        self.lines_read += 1;
        self.window.push_back(SourceLine {
            number: self.lines_read,
            chars: text.chars().collect(),
        });
        self.line = self.window.len() - 1;
        self.column = 0;
        Ok(())
    }

    /// True once every character has been consumed
    pub fn is_eof(&self) -> bool {
        self.exhausted
            && match self.window.get(self.line) {
                None => true,
                Some(current) => {
                    self.line + 1 == self.window.len() && self.column == current.chars.len()
                }
            }
    }

    /// Next character, or `None` at end of input
    pub fn get(&mut self) -> ExpandResult<Option<char>> {
        if self.is_eof() {
            return Ok(None);
        }

        let current = &self.window[self.line];
        let c = current.chars[self.column];
        self.column += 1;

        if self.column == current.chars.len() {
            if self.line + 1 == self.window.len() {
                self.read_line()?;
            } else {
                self.line += 1;
                self.column = 0;
            }
        }

        Ok(Some(c))
    }

    /// Step back exactly one character.
    ///
    /// Fails when the character is no longer in the window, which means the
    /// caller backtracked further than the reader supports.
    pub fn unget(&mut self) -> ExpandResult<()> {
        if self.column > 0 {
            self.column -= 1;
            return Ok(());
        }

        if self.line == 0 {
            return Err(ExpandError::UngetUnderflow { location: self.at() });
        }

        self.line -= 1;
        self.column = self.window[self.line].chars.len() - 1;
        Ok(())
    }

    /// Location of the character the next `get` returns
    pub fn at(&self) -> Location {
        if self.is_eof() {
            return Location::eof(self.source_name.clone());
        }
        let current = &self.window[self.line];
        Location::at_position(
            self.source_name.clone(),
            Some(Position::new(current.number, self.column as u32 + 1)),
        )
    }

    /// Decode the escape code following a `\` that the caller already consumed.
    ///
    /// `n`, `r`, `t` are control characters, `uXXXX` is a code point in hex,
    /// `[0-3]oo` is a code point in octal, anything else stands for itself.
    pub fn get_quoted(&mut self) -> ExpandResult<char> {
        let start = self.at();
        let c = self.escape_char(&start)?;

        match c {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'u' => {
                let digits = self.escape_digits(4, &start)?;
                decode_code_point(&digits, 16)
                    .ok_or_else(|| invalid_escape(format!("u{}", digits), start))
            }
            '0'..='3' => {
                let digits = format!("{}{}", c, self.escape_digits(2, &start)?);
                decode_code_point(&digits, 8).ok_or_else(|| invalid_escape(digits, start))
            }
            other => Ok(other),
        }
    }

    fn escape_char(&mut self, start: &Location) -> ExpandResult<char> {
        self.get()?
            .ok_or_else(|| ExpandError::unexpected_eof(EofContext::EscapeSequence, start.clone()))
    }

    fn escape_digits(&mut self, count: usize, start: &Location) -> ExpandResult<String> {
        (0..count).map(|_| self.escape_char(start)).collect()
    }
}

fn decode_code_point(digits: &str, radix: u32) -> Option<char> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
}

fn invalid_escape(sequence: String, location: Location) -> ExpandError {
    ExpandError::InvalidEscape { sequence, location }
}

impl std::fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("source_name", &self.source_name)
            .field("at", &self.at().to_string())
            .field("window", &self.window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn text_reader(text: &str) -> Reader<'_> {
        Reader::from_text(text, "<test>").unwrap()
    }

    #[test]
    fn test_get_unget_two_lines() {
        let mut reader = text_reader("One\nTwo\n");
        assert_eq!(reader.at().to_string(), "<test>:1:1");
        assert_eq!(reader.get().unwrap(), Some('O'));
        assert_eq!(reader.get().unwrap(), Some('n'));
        assert_eq!(reader.get().unwrap(), Some('e'));
        reader.unget().unwrap();
        assert_eq!(reader.get().unwrap(), Some('e'));
        assert_eq!(reader.at().to_string(), "<test>:1:4");
        assert_eq!(reader.get().unwrap(), Some('\n'));
        assert_eq!(reader.at().to_string(), "<test>:2:1");

        // Across the line break
        reader.unget().unwrap();
        assert_eq!(reader.at().to_string(), "<test>:1:4");
        assert_eq!(reader.get().unwrap(), Some('\n'));

        assert_eq!(reader.get().unwrap(), Some('T'));
        assert_eq!(reader.get().unwrap(), Some('w'));
        assert_eq!(reader.get().unwrap(), Some('o'));
        assert_eq!(reader.at().to_string(), "<test>:2:4");
        assert_eq!(reader.get().unwrap(), Some('\n'));
        assert_eq!(reader.at().to_string(), "<test>:EOF");
        assert!(reader.is_eof());
    }

    #[test]
    fn test_eof_is_repeatable() {
        let mut reader = text_reader("x");
        assert_eq!(reader.get().unwrap(), Some('x'));
        assert_eq!(reader.get().unwrap(), None);
        assert_eq!(reader.get().unwrap(), None);
        assert!(reader.at().is_eof());

        // Stepping back from EOF yields the last character again
        reader.unget().unwrap();
        assert_eq!(reader.get().unwrap(), Some('x'));
    }

    #[test]
    fn test_empty_input() {
        let mut reader = text_reader("");
        assert!(reader.is_eof());
        assert_eq!(reader.get().unwrap(), None);
        assert_eq!(reader.at().to_string(), "<test>:EOF");
        assert_matches!(reader.unget(), Err(ExpandError::UngetUnderflow { .. }));
    }

    #[test]
    fn test_get_unget_get_round_trip() {
        let text = "ab\ncd\n\nef";
        let mut reader = text_reader(text);
        let mut seen = Vec::new();
        // The very first character has nothing before it
        seen.push(reader.get().unwrap().unwrap());
        while let Some(c) = reader.get().unwrap() {
            reader.unget().unwrap();
            assert_eq!(reader.get().unwrap(), Some(c));
            seen.push(c);
        }
        assert_eq!(seen.into_iter().collect::<String>(), text);
    }

    #[test]
    fn test_too_many_ungets() {
        let mut reader = text_reader("\n\n\n123");
        assert_eq!(reader.get().unwrap(), Some('\n'));
        assert_eq!(reader.get().unwrap(), Some('\n'));
        assert_eq!(reader.get().unwrap(), Some('\n'));
        assert_eq!(reader.get().unwrap(), Some('1'));
        reader.unget().unwrap(); // 1
        reader.unget().unwrap(); // \n of line 3
        reader.unget().unwrap(); // \n of line 2
        let error = reader.unget().unwrap_err();
        assert_matches!(error, ExpandError::UngetUnderflow { .. });
        assert!(error.requires_halt());
    }

    #[test]
    fn test_unget_at_start() {
        let mut reader = text_reader("abc");
        assert_matches!(reader.unget(), Err(ExpandError::UngetUnderflow { .. }));
    }

    #[test]
    fn test_get_quoted() {
        let mut reader = text_reader("\\n\\r\\t\\u0040\\040\\$");
        let mut decoded = String::new();
        while let Some(c) = reader.get().unwrap() {
            assert_eq!(c, '\\');
            decoded.push(reader.get_quoted().unwrap());
        }
        assert_eq!(decoded, "\n\r\t@ $");
    }

    #[test]
    fn test_get_quoted_eof() {
        let mut reader = text_reader("\\");
        reader.get().unwrap();
        assert_matches!(
            reader.get_quoted(),
            Err(ExpandError::UnexpectedEof {
                context: EofContext::EscapeSequence,
                ..
            })
        );

        let mut reader = text_reader("u00");
        assert_matches!(
            reader.get_quoted(),
            Err(ExpandError::UnexpectedEof { .. })
        );
    }

    #[test]
    fn test_get_quoted_invalid_digits() {
        let mut reader = text_reader("u00zz");
        assert_matches!(
            reader.get_quoted(),
            Err(ExpandError::InvalidEscape { sequence, .. }) if sequence == "u00zz"
        );

        let mut reader = text_reader("uD800");
        assert_matches!(reader.get_quoted(), Err(ExpandError::InvalidEscape { .. }));

        let mut reader = text_reader("389");
        assert_matches!(reader.get_quoted(), Err(ExpandError::InvalidEscape { .. }));
    }

    #[test]
    fn test_identity_escape() {
        let mut reader = text_reader("\\9\"");
        assert_eq!(reader.get_quoted().unwrap(), '\\');
        assert_eq!(reader.get_quoted().unwrap(), '9');
        assert_eq!(reader.get_quoted().unwrap(), '"');
    }

    #[test]
    fn test_window_is_bounded() {
        let text: String = (0..50).map(|i| format!("line{}\n", i)).collect();
        let mut reader = text_reader(&text);
        while reader.get().unwrap().is_some() {
            assert!(reader.window.len() <= WINDOW_LINES);
        }
    }

    #[test]
    fn test_io_error_is_reported() {
        let bytes: &[u8] = &[b'o', b'k', b'\n', 0xff, 0xfe, b'\n'];
        let mut reader = Reader::new(bytes, "binary").unwrap();
        assert_eq!(reader.get().unwrap(), Some('o'));
        assert_eq!(reader.get().unwrap(), Some('k'));
        assert_matches!(reader.get(), Err(ExpandError::Io { source_name, .. }) if source_name == "binary");
    }
}
