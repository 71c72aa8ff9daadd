//! Document serializer
//!
//! Converts a [`Document`] or a flat ordered map back into document text,
//! choosing the minimal quoting needed per value: single quotes by default,
//! double quotes when the value itself contains a single quote or a newline.
//!
//! The double-quote fallback escapes embedded `"` characters only. A value
//! containing a literal backslash followed by a recognized escape letter
//! (for example `\n`) will therefore be read back as that escape sequence.
//! This narrower escaping is intentional; downstream consumers depend on it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::{Document, Token};

/// Options controlling serializer output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializeOptions {
    /// Force `\n` line endings regardless of host platform
    pub only_line_feed: bool,
}

impl SerializeOptions {
    /// Returns the line terminator selected by these options
    fn line_terminator(&self) -> &'static str {
        if self.only_line_feed {
            "\n"
        } else if cfg!(windows) {
            "\r\n"
        } else {
            "\n"
        }
    }
}

/// Formats one `KEY=VALUE` entry with minimal quoting
fn format_entry(key: &str, value: &str) -> String {
    if value.contains('\'') || value.contains('\n') {
        format!("{}=\"{}\"", key, value.replace('"', "\\\""))
    } else {
        format!("{}='{}'", key, value)
    }
}

/// Serializes a document back into text
///
/// Comments are re-emitted as `#` plus their stored text, blank-line tokens
/// as bare line separators. Any string value is representable; this never
/// fails.
pub fn serialize_document(document: &Document, options: &SerializeOptions) -> String {
    let lines: Vec<String> = document
        .iter()
        .map(|token| match token {
            Token::Comment { text } => format!("#{}", text),
            Token::Newline => String::new(),
            Token::Item { key, value } => format_entry(key, value),
        })
        .collect();
    lines.join(options.line_terminator())
}

/// Serializes a flat ordered map into document text
pub fn serialize_map(map: &IndexMap<String, String>, options: &SerializeOptions) -> String {
    let lines: Vec<String> = map
        .iter()
        .map(|(key, value)| format_entry(key, value))
        .collect();
    lines.join(options.line_terminator())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn lf() -> SerializeOptions {
        SerializeOptions {
            only_line_feed: true,
        }
    }

    #[test]
    fn test_plain_value_uses_single_quotes() {
        let mut map = IndexMap::new();
        map.insert("KEY".to_string(), "plain".to_string());
        assert_eq!(serialize_map(&map, &lf()), "KEY='plain'");
    }

    #[test]
    fn test_single_quote_in_value_switches_to_double() {
        let mut map = IndexMap::new();
        map.insert("KEY".to_string(), "it's".to_string());
        assert_eq!(serialize_map(&map, &lf()), "KEY=\"it's\"");
    }

    #[test]
    fn test_newline_in_value_switches_to_double() {
        let mut map = IndexMap::new();
        map.insert("KEY".to_string(), "line1\nline2".to_string());
        assert_eq!(serialize_map(&map, &lf()), "KEY=\"line1\nline2\"");
    }

    #[test]
    fn test_double_quotes_escaped_in_double_quoted_output() {
        let mut map = IndexMap::new();
        map.insert("KEY".to_string(), "she said \"hi\"\n".to_string());
        assert_eq!(
            serialize_map(&map, &lf()),
            "KEY=\"she said \\\"hi\\\"\n\""
        );
    }

    #[test]
    fn test_empty_value() {
        let mut map = IndexMap::new();
        map.insert("KEY".to_string(), String::new());
        assert_eq!(serialize_map(&map, &lf()), "KEY=''");
    }

    #[test]
    fn test_map_entries_joined_by_line_feed() {
        let mut map = IndexMap::new();
        map.insert("A".to_string(), "1".to_string());
        map.insert("B".to_string(), "2".to_string());
        assert_eq!(serialize_map(&map, &lf()), "A='1'\nB='2'");
    }

    #[test]
    fn test_document_serialization_preserves_shape() {
        let mut doc = Document::new();
        doc.comment(" header");
        doc.item("A", "1");
        doc.newline();
        doc.item("B", "2");

        assert_eq!(
            serialize_document(&doc, &lf()),
            "# header\nA='1'\n\nB='2'"
        );
    }

    #[test]
    fn test_round_trip_of_simple_document() {
        let mut map = IndexMap::new();
        map.insert("HOST".to_string(), "localhost".to_string());
        map.insert("PORT".to_string(), "5432".to_string());
        map.insert("NAME".to_string(), "app db".to_string());

        let text = serialize_map(&map, &lf());
        let doc = parse(&text).unwrap();
        assert_eq!(doc.to_map(), map);
    }

    #[test]
    fn test_round_trip_of_document_with_comments_and_blanks() {
        let source = "#header\nA='1'\n\nB='two words'";
        let doc = parse(source).unwrap();
        assert_eq!(serialize_document(&doc, &lf()), source);
    }

    #[test]
    fn test_default_options_platform_terminator() {
        let mut map = IndexMap::new();
        map.insert("A".to_string(), "1".to_string());
        map.insert("B".to_string(), "2".to_string());
        let text = serialize_map(&map, &SerializeOptions::default());
        if cfg!(windows) {
            assert_eq!(text, "A='1'\r\nB='2'");
        } else {
            assert_eq!(text, "A='1'\nB='2'");
        }
    }
}
