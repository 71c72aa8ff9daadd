//! In-memory document model
//!
//! A parsed document is an ordered sequence of [`Token`]s: comments, blank
//! lines, and key/value items. Order reflects source order exactly so that a
//! document can be re-serialized without losing its shape. Keys are not
//! required to be unique; the flat-map projection applies last-write-wins.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SyntaxError;
use crate::parser::DocumentParser;

/// One parsed unit of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    /// A full-line comment, with the leading `#` and any whitespace
    /// immediately after it stripped
    Comment { text: String },
    /// An explicit blank line in the source
    Newline,
    /// A key/value assignment; the value is fully unescaped and unquoted
    Item { key: String, value: String },
}

impl Token {
    /// Returns a string representation of the token type for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Token::Comment { .. } => "comment",
            Token::Newline => "newline",
            Token::Item { .. } => "item",
        }
    }

    /// Returns true if this token is a key/value item
    pub fn is_item(&self) -> bool {
        matches!(self, Token::Item { .. })
    }
}

/// An ordered, append-only sequence of tokens
///
/// Created empty with [`Document::new`] or from source text with
/// [`Document::parse`]; mutated only through the append operations. The
/// serializer and the flat-map projection never mutate a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    tokens: Vec<Token>,
}

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Parses document text into a `Document`
    ///
    /// The whole operation is atomic: on a syntax error no partial document
    /// is produced.
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        DocumentParser::new(text).parse()
    }

    /// Appends a full-line comment
    pub fn comment(&mut self, text: impl Into<String>) {
        self.tokens.push(Token::Comment { text: text.into() });
    }

    /// Appends an explicit blank line
    pub fn newline(&mut self) {
        self.tokens.push(Token::Newline);
    }

    /// Appends a key/value item
    pub fn item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tokens.push(Token::Item {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Returns the tokens in source order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the document holds no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns an iterator over the tokens in source order
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Projects the document to an ordered key/value map
    ///
    /// Comments and blank lines are dropped. A later item with a duplicate
    /// key overwrites the earlier one, matching environment-file overwrite
    /// semantics; the entry keeps its first insertion position.
    pub fn to_map(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        for token in &self.tokens {
            if let Token::Item { key, value } = token {
                map.insert(key.clone(), value.clone());
            }
        }
        map
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_operations_preserve_order() {
        let mut doc = Document::new();
        doc.comment("database settings");
        doc.item("HOST", "localhost");
        doc.newline();
        doc.item("PORT", "5432");

        assert_eq!(doc.len(), 4);
        assert_eq!(
            doc.tokens()[0],
            Token::Comment {
                text: "database settings".to_string()
            }
        );
        assert_eq!(doc.tokens()[2], Token::Newline);
        assert_eq!(
            doc.tokens()[3],
            Token::Item {
                key: "PORT".to_string(),
                value: "5432".to_string()
            }
        );
    }

    #[test]
    fn test_to_map_last_write_wins() {
        let mut doc = Document::new();
        doc.item("A", "1");
        doc.item("B", "x");
        doc.item("A", "2");

        let map = doc.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("A"), Some(&"2".to_string()));
        assert_eq!(map.get("B"), Some(&"x".to_string()));
    }

    #[test]
    fn test_to_map_drops_comments_and_blanks() {
        let mut doc = Document::new();
        doc.comment("ignored");
        doc.newline();
        doc.item("KEY", "value");

        let map = doc.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("KEY"), Some(&"value".to_string()));
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let mut doc = Document::new();
        doc.item("A", "1");
        doc.item("A", "2");
        doc.item("B", "3");

        assert_eq!(doc.to_map(), doc.to_map());
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
        assert!(doc.to_map().is_empty());
    }

    #[test]
    fn test_token_type_names() {
        assert_eq!(Token::Newline.type_name(), "newline");
        assert_eq!(
            Token::Comment {
                text: String::new()
            }
            .type_name(),
            "comment"
        );
        assert!(
            Token::Item {
                key: "K".to_string(),
                value: String::new()
            }
            .is_item()
        );
    }

    #[test]
    fn test_document_serde_round_trip() {
        let mut doc = Document::new();
        doc.comment("note");
        doc.item("KEY", "value");
        doc.newline();

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
