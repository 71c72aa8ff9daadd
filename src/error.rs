//! Error types and position tracking for document parsing and expansion
//!
//! Parser errors carry the exact source position of the offending character;
//! expansion errors carry the offending variable name or the user-supplied
//! `:?` message.

use std::fmt;
use thiserror::Error;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Advances the position by one character
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' => {
                // Handle \r\n and standalone \r
                self.column = 1;
            }
            _ => {
                self.column += 1;
            }
        }
        self.offset += c.len_utf8();
    }

    /// Advances the position by multiple characters
    pub fn advance_by(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Main error type for document operations
#[derive(Debug, Error)]
pub enum EnvError {
    /// Document syntax error
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Variable expansion error
    #[error("Expansion error: {0}")]
    Expansion(#[from] ExpansionError),
}

/// Document parsing errors
///
/// All variants are fatal to the current `parse` call; there is no recovery
/// and no partial document is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// An `=` was found with nothing before it
    #[error("Empty key at {position}")]
    EmptyKey { position: Position },

    /// A character that cannot appear in a key
    #[error("Invalid character '{character}' in key at {position}")]
    InvalidKeyCharacter { character: char, position: Position },

    /// Non-whitespace content after a closing quote on the same line
    #[error(
        "Unexpected character '{character}' after quoted value at {position}, \
         use quotes for values with spaces"
    )]
    TrailingCharacter { character: char, position: Position },
}

impl SyntaxError {
    /// Returns the position where the error occurred
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::EmptyKey { position }
            | SyntaxError::InvalidKeyCharacter { position, .. }
            | SyntaxError::TrailingCharacter { position, .. } => *position,
        }
    }

    /// Returns the 1-based source line of the error
    pub fn line(&self) -> usize {
        self.position().line
    }
}

/// Variable expansion errors
///
/// All variants are fatal to the current `expand` call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// Variable name starting with a digit or underscore, or otherwise malformed
    #[error("Invalid variable name '{name}'")]
    InvalidVariableName { name: String },

    /// `${`, `$(` or `%` reference with no closing token before end of input
    #[error("Missing closing token in reference to '{name}'")]
    MissingClosingToken { name: String },

    /// Plain reference to a variable the store does not hold
    #[error("Variable '{name}' is not set")]
    NotSet { name: String },

    /// `${NAME:?message}` with an unset variable
    #[error("{message}")]
    Unset { message: String },

    /// Structurally invalid reference, such as `%%` with no enclosed name
    /// or an unknown `${NAME:x}` operator
    #[error("Malformed variable reference")]
    MalformedReference,
}
