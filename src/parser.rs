//! Document parser
//!
//! A single-pass, character-level state machine that converts raw document
//! text into a [`Document`]. The scanner tracks the current quote state, a
//! value accumulation buffer, the pending key, the exact source position for
//! diagnostics, and a nesting depth for `$( ... )` spans inside double
//! quotes. Every input either produces a document or fails with a
//! [`SyntaxError`]; there is no partial output.

use smallvec::SmallVec;

use crate::document::Document;
use crate::error::{Position, SyntaxError};

/// Active quoting state of the value scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    /// Unquoted value (or no value content yet)
    None,
    /// Inside `'...'`; raw except for `\'`
    Single,
    /// Inside `"..."`; full escape set and `$( ... )` passthrough
    Double,
    /// Inside `` `...` ``; same escape set as double quotes
    Backtick,
    /// A quote just closed; only whitespace, a trailing comment, or the end
    /// of the line may follow
    JustClosed,
}

/// Document parser over an in-memory string
pub struct DocumentParser<'a> {
    /// Input text being parsed
    input: &'a str,
    /// Current byte position in input
    position: usize,
    /// Current line number (1-based)
    line: usize,
    /// Current column number (1-based)
    column: usize,
    /// Cached current character
    current_char: Option<char>,
    /// Key accumulation buffer; holds the pending key while in value mode
    key: String,
    /// Value accumulation buffer
    buffer: String,
    /// Whether `=` has been seen for the pending key
    in_value: bool,
    /// Current quoting state
    quote: QuoteState,
    /// Open `$( ... )` nesting depth inside double quotes
    subst_depth: usize,
    /// Whether the current line consists only of skipped whitespace so far
    line_blank_whitespace: bool,
}

impl<'a> DocumentParser<'a> {
    /// Creates a parser over the given text
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
            current_char: input.chars().next(),
            key: String::new(),
            buffer: String::new(),
            in_value: false,
            quote: QuoteState::None,
            subst_depth: 0,
            line_blank_whitespace: false,
        }
    }

    /// Returns the current position in the input
    fn current_position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    /// Advances past the current character and returns it
    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char?;
        self.position += ch.len_utf8();
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            _ => {
                self.column += 1;
            }
        }
        self.current_char = self.input[self.position..].chars().next();
        Some(ch)
    }

    /// Consumes a line terminator: `\n` alone or the pair `\r\n`
    fn consume_line_terminator(&mut self) {
        if self.advance() == Some('\r') && self.current_char == Some('\n') {
            self.advance();
        }
    }

    /// Consumes the rest of the line, terminator included, discarding it
    fn skip_to_line_end(&mut self) {
        while let Some(ch) = self.current_char {
            if ch == '\n' || ch == '\r' {
                self.consume_line_terminator();
                return;
            }
            self.advance();
        }
    }

    /// Reads the remainder of the line as comment text, leading whitespace
    /// trimmed, and consumes the line terminator
    fn read_comment_text(&mut self) -> String {
        while matches!(self.current_char, Some(' ') | Some('\t')) {
            self.advance();
        }
        let mut text = String::new();
        while let Some(ch) = self.current_char {
            if ch == '\n' || ch == '\r' {
                self.consume_line_terminator();
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    /// Emits the pending item and resets the scanner to the key region
    fn emit_item(&mut self, doc: &mut Document, value: String) {
        let key = std::mem::take(&mut self.key);
        doc.item(key, value);
        self.buffer.clear();
        self.in_value = false;
        self.quote = QuoteState::None;
        self.subst_depth = 0;
    }

    /// Emits the accumulated unquoted value with its trailing edge trimmed
    fn emit_unquoted(&mut self, doc: &mut Document) {
        let value = self.buffer.trim_end().to_string();
        self.emit_item(doc, value);
    }

    /// Runs the scan to completion
    pub fn parse(mut self) -> Result<Document, SyntaxError> {
        let mut doc = Document::new();

        while let Some(ch) = self.current_char {
            if !self.in_value {
                self.scan_key_char(ch, &mut doc)?;
            } else {
                match self.quote {
                    QuoteState::None => self.scan_unquoted_char(ch, &mut doc),
                    QuoteState::Single => self.scan_single_quoted_char(ch, &mut doc),
                    QuoteState::Double | QuoteState::Backtick => {
                        self.scan_quoted_char(ch, &mut doc)
                    }
                    QuoteState::JustClosed => self.scan_after_quote(ch)?,
                }
            }
        }

        // End of input: flush whatever is still pending.
        if self.in_value {
            match self.quote {
                QuoteState::JustClosed => {}
                QuoteState::None => self.emit_unquoted(&mut doc),
                // Input ended inside a quote; the accumulated content is the value.
                _ => {
                    let value = std::mem::take(&mut self.buffer);
                    self.emit_item(&mut doc, value);
                }
            }
        } else if !self.key.is_empty() {
            // Bare key with no assignment
            let key = std::mem::take(&mut self.key);
            doc.item(key, "");
        } else if self.line_blank_whitespace {
            doc.newline();
        }

        Ok(doc)
    }

    /// Handles one character in the key region (before `=`)
    fn scan_key_char(&mut self, ch: char, doc: &mut Document) -> Result<(), SyntaxError> {
        match ch {
            'a'..='z' | 'A'..='Z' | '_' => {
                self.key.push(ch);
                self.line_blank_whitespace = false;
                self.advance();
            }
            '0'..='9' => {
                // Keys are identifiers; a digit cannot start one.
                if self.key.is_empty() {
                    return Err(SyntaxError::InvalidKeyCharacter {
                        character: ch,
                        position: self.current_position(),
                    });
                }
                self.key.push(ch);
                self.advance();
            }
            '#' if self.key.is_empty() => {
                self.advance();
                let text = self.read_comment_text();
                doc.comment(text);
                self.line_blank_whitespace = false;
            }
            ' ' | '\t' if self.key.is_empty() => {
                self.line_blank_whitespace = true;
                self.advance();
            }
            '\n' | '\r' => {
                self.consume_line_terminator();
                if self.key.is_empty() {
                    doc.newline();
                } else {
                    // Key with no assignment on this line
                    let key = std::mem::take(&mut self.key);
                    doc.item(key, "");
                }
                self.line_blank_whitespace = false;
            }
            '=' => {
                if self.key.is_empty() {
                    return Err(SyntaxError::EmptyKey {
                        position: self.current_position(),
                    });
                }
                self.in_value = true;
                self.buffer.clear();
                self.advance();
            }
            _ => {
                return Err(SyntaxError::InvalidKeyCharacter {
                    character: ch,
                    position: self.current_position(),
                });
            }
        }
        Ok(())
    }

    /// Handles one character of an unquoted value
    fn scan_unquoted_char(&mut self, ch: char, doc: &mut Document) {
        match ch {
            ' ' | '\t' if self.buffer.is_empty() => {
                // Leading whitespace before the value is not accumulated
                self.advance();
            }
            '"' if self.buffer.is_empty() => {
                self.quote = QuoteState::Double;
                self.advance();
            }
            '\'' if self.buffer.is_empty() => {
                self.quote = QuoteState::Single;
                self.advance();
            }
            '`' if self.buffer.is_empty() => {
                self.quote = QuoteState::Backtick;
                self.advance();
            }
            '\n' | '\r' => {
                self.consume_line_terminator();
                self.emit_unquoted(doc);
            }
            '#' => {
                self.emit_unquoted(doc);
                self.skip_to_line_end();
            }
            _ => {
                self.buffer.push(ch);
                self.advance();
            }
        }
    }

    /// Handles one character inside a single-quoted value
    ///
    /// Single quotes are raw: the only recognized escape is `\'` for the
    /// delimiter itself; every other backslash passes through unchanged.
    fn scan_single_quoted_char(&mut self, ch: char, doc: &mut Document) {
        match ch {
            '\\' => {
                self.advance();
                if self.current_char == Some('\'') {
                    self.buffer.push('\'');
                    self.advance();
                } else {
                    self.buffer.push('\\');
                }
            }
            '\'' => {
                self.advance();
                let value = std::mem::take(&mut self.buffer);
                self.emit_item(doc, value);
                self.in_value = true;
                self.quote = QuoteState::JustClosed;
            }
            _ => {
                self.buffer.push(ch);
                self.advance();
            }
        }
    }

    /// Handles one character inside a double- or backtick-quoted value
    fn scan_quoted_char(&mut self, ch: char, doc: &mut Document) {
        // While a $( ... ) span is open the body is copied verbatim,
        // including quote characters; only the nesting depth is tracked.
        if self.subst_depth > 0 {
            match ch {
                '$' if self.peek_next() == Some('(') => {
                    self.buffer.push('$');
                    self.buffer.push('(');
                    self.advance();
                    self.advance();
                    self.subst_depth += 1;
                }
                ')' => {
                    self.buffer.push(')');
                    self.advance();
                    self.subst_depth -= 1;
                }
                _ => {
                    self.buffer.push(ch);
                    self.advance();
                }
            }
            return;
        }

        let close = if self.quote == QuoteState::Double {
            '"'
        } else {
            '`'
        };

        match ch {
            '\\' => {
                self.advance();
                self.scan_escape();
            }
            '$' if self.quote == QuoteState::Double && self.peek_next() == Some('(') => {
                self.buffer.push('$');
                self.buffer.push('(');
                self.advance();
                self.advance();
                self.subst_depth = 1;
            }
            c if c == close => {
                self.advance();
                let value = std::mem::take(&mut self.buffer);
                self.emit_item(doc, value);
                self.in_value = true;
                self.quote = QuoteState::JustClosed;
            }
            _ => {
                // Line terminators are preserved literally; quoted values
                // may span multiple physical lines.
                self.buffer.push(ch);
                self.advance();
            }
        }
    }

    /// Processes the character after a backslash in a double- or
    /// backtick-quoted value
    ///
    /// Unrecognized escapes and truncated hex runs are emitted literally,
    /// backslash included; they are never an error.
    fn scan_escape(&mut self) {
        match self.current_char {
            Some('n') => {
                self.buffer.push('\n');
                self.advance();
            }
            Some('r') => {
                self.buffer.push('\r');
                self.advance();
            }
            Some('t') => {
                self.buffer.push('\t');
                self.advance();
            }
            Some('b') => {
                self.buffer.push('\u{0008}');
                self.advance();
            }
            Some('\\') => {
                self.buffer.push('\\');
                self.advance();
            }
            Some('"') => {
                self.buffer.push('"');
                self.advance();
            }
            Some('\'') => {
                self.buffer.push('\'');
                self.advance();
            }
            Some('`') => {
                self.buffer.push('`');
                self.advance();
            }
            Some(letter @ ('u' | 'U')) => {
                self.advance();
                let want = if letter == 'u' { 4 } else { 8 };
                self.scan_hex_escape(letter, want);
            }
            Some(_) | None => {
                // Unrecognized escape: keep the backslash, the following
                // character is scanned normally on the next iteration.
                self.buffer.push('\\');
            }
        }
    }

    /// Scans a `\uXXXX` or `\UXXXXXXXX` code-point escape
    fn scan_hex_escape(&mut self, letter: char, want: usize) {
        let mut digits: SmallVec<[char; 8]> = SmallVec::new();
        while digits.len() < want {
            match self.current_char {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.advance();
                }
                _ => break,
            }
        }

        if digits.len() == want {
            let hex: String = digits.iter().collect();
            // The run cannot overflow u32: at most 8 hex digits.
            let code = u32::from_str_radix(&hex, 16).unwrap_or(u32::MAX);
            if let Some(decoded) = char::from_u32(code) {
                self.buffer.push(decoded);
                return;
            }
        }

        // Truncated run or invalid code point: emit the sequence literally.
        self.buffer.push('\\');
        self.buffer.push(letter);
        self.buffer.extend(digits);
    }

    /// Handles one character after a closing quote, same line
    fn scan_after_quote(&mut self, ch: char) -> Result<(), SyntaxError> {
        match ch {
            ' ' | '\t' => {
                self.advance();
            }
            '#' => {
                // Inline trailing comment runs to the end of the line
                self.skip_to_line_end();
                self.in_value = false;
                self.quote = QuoteState::None;
            }
            '\n' | '\r' => {
                self.consume_line_terminator();
                self.in_value = false;
                self.quote = QuoteState::None;
            }
            _ => {
                return Err(SyntaxError::TrailingCharacter {
                    character: ch,
                    position: self.current_position(),
                });
            }
        }
        Ok(())
    }

    /// Peeks at the character after the current one without advancing
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next();
        chars.next()
    }
}

/// Parses document text into a [`Document`]
///
/// Convenience wrapper around [`Document::parse`].
pub fn parse(text: &str) -> Result<Document, SyntaxError> {
    Document::parse(text)
}
