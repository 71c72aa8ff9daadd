//! # envdoc
//!
//! An order-preserving `.env` document parser, serializer, and shell-style
//! variable expansion engine.
//!
//! ## Overview
//!
//! This crate reads `.env`-style configuration text into a structured,
//! order-preserving [`Document`], writes documents back to text with minimal
//! quoting, and resolves `${VAR}` / `$NAME` / `%NAME%` references against a
//! pluggable [`VariableStore`]. The three engines are independent, pure
//! functions: parse and serialize are dual, expansion operates on plain
//! strings.
//!
//! ## Key Features
//!
//! - **Round-trip fidelity**: comments, blank lines, and entry order survive
//!   a parse/serialize cycle
//! - **Three quoting styles**: single-quoted (raw), double-quoted and
//!   backtick-quoted (full escape set with `\uXXXX` / `\UXXXXXXXX`)
//! - **Command-substitution passthrough**: `$( ... )` spans are recognized
//!   and preserved syntactically, never executed
//! - **Bash-style expansion operators**: `${X:-default}`, `${X:=assign}`,
//!   `${X:?message}`, plus optional Windows `%NAME%` references
//! - **Pluggable variable stores**: in-memory map, process environment, or
//!   an ordered chain of both
//! - **Serde integration**: documents and options serialize to and from JSON
//!
//! ## Basic Usage
//!
//! ```rust
//! use envdoc::Document;
//!
//! let text = "# service settings\nHOST=localhost\nPORT=5432\n";
//! let doc = Document::parse(text)?;
//!
//! let map = doc.to_map();
//! assert_eq!(map.get("HOST"), Some(&"localhost".to_string()));
//! assert_eq!(map.get("PORT"), Some(&"5432".to_string()));
//! # Ok::<(), envdoc::SyntaxError>(())
//! ```
//!
//! ## Serialization
//!
//! ```rust
//! use envdoc::{Document, SerializeOptions, serialize_document};
//!
//! let mut doc = Document::new();
//! doc.comment(" credentials");
//! doc.item("USER", "alice");
//! doc.item("NOTE", "it's fine");
//!
//! let options = SerializeOptions { only_line_feed: true };
//! let text = serialize_document(&doc, &options);
//! assert_eq!(text, "# credentials\nUSER='alice'\nNOTE=\"it's fine\"");
//! ```
//!
//! ## Variable Expansion
//!
//! ```rust
//! use envdoc::{ExpandOptions, MapStore, expand};
//!
//! let mut store = MapStore::new();
//! store.insert("USER", "alice");
//!
//! let options = ExpandOptions::default();
//! let result = expand("${USER}@${HOST:-localhost}", &mut store, &options)?;
//! assert_eq!(result, "alice@localhost");
//! # Ok::<(), envdoc::ExpansionError>(())
//! ```
//!
//! Expansion is strict: a plain reference to an unset variable fails with a
//! descriptive error rather than degrading silently.
//!
//! ```rust
//! use envdoc::{ExpandOptions, ExpansionError, MapStore, expand};
//!
//! let mut store = MapStore::new();
//! let err = expand("${MISSING}", &mut store, &ExpandOptions::default());
//! assert!(matches!(err, Err(ExpansionError::NotSet { .. })));
//! ```
//!
//! ## Error Handling
//!
//! Parser errors carry the exact source position:
//!
//! ```rust
//! use envdoc::{Document, SyntaxError};
//!
//! let err = Document::parse("GOOD=1\n=bad").unwrap_err();
//! assert!(matches!(err, SyntaxError::EmptyKey { .. }));
//! assert_eq!(err.line(), 2);
//! ```

pub mod document;
pub mod error;
pub mod expander;
pub mod parser;
pub mod serializer;

// Re-export main types and functions
pub use document::{Document, Token};
pub use error::{EnvError, ExpansionError, Position, SyntaxError};
pub use expander::{ExpandOptions, expand};
pub use parser::{DocumentParser, parse};
pub use serializer::{SerializeOptions, serialize_document, serialize_map};

// Re-export variable store types
pub use expander::{ChainedStore, EnvironmentStore, MapStore, VariableStore};
