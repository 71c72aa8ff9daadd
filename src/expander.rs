//! Variable expansion engine
//!
//! Scans a single string for `${...}` / `$NAME` (and optionally `%NAME%`)
//! references and substitutes them from a caller-supplied [`VariableStore`].
//! Expansion is strict by default: a plain reference to an unset variable is
//! an error; only the `:-`, `:=`, and `:?` operators tolerate or customize
//! the unset case. Substituted values are inserted as-is and never re-scanned,
//! so variable content cannot inject further references.
//!
//! Command substitution `$( ... )` is recognized syntactically when enabled,
//! but never executed: the enclosed text itself is the expansion value.
//! Running a subprocess is the caller's concern.

use std::iter::Peekable;
use std::str::Chars;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::ExpansionError;

/// Resolves and optionally persists variables for the expansion engine
pub trait VariableStore {
    /// Resolves a variable by name
    fn get(&self, name: &str) -> Option<String>;

    /// Stores a variable; invoked by the `${NAME:=default}` operator
    fn set(&mut self, name: &str, value: &str);
}

/// In-memory, insertion-ordered variable store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapStore {
    variables: IndexMap<String, String>,
}

impl MapStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            variables: IndexMap::new(),
        }
    }

    /// Creates a store from a document's flat-map projection
    pub fn from_document(document: &Document) -> Self {
        Self {
            variables: document.to_map(),
        }
    }

    /// Inserts a variable
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Returns a reference to the underlying map
    pub fn variables(&self) -> &IndexMap<String, String> {
        &self.variables
    }
}

impl From<IndexMap<String, String>> for MapStore {
    fn from(variables: IndexMap<String, String>) -> Self {
        Self { variables }
    }
}

impl VariableStore for MapStore {
    fn get(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }
}

/// Variable store backed by the process environment
pub struct EnvironmentStore;

impl VariableStore for EnvironmentStore {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&mut self, name: &str, value: &str) {
        // SAFETY: mutating the process environment is not synchronized with
        // concurrent reads from other threads; callers sharing this store
        // across threads must serialize access themselves.
        unsafe {
            std::env::set_var(name, value);
        }
    }
}

/// Tries multiple stores in order; writes go to the first store
#[derive(Default)]
pub struct ChainedStore {
    stores: Vec<Box<dyn VariableStore>>,
}

impl ChainedStore {
    /// Creates an empty chain
    pub fn new() -> Self {
        Self { stores: Vec::new() }
    }

    /// Appends a store to the chain
    pub fn add_store(&mut self, store: Box<dyn VariableStore>) {
        self.stores.push(store);
    }

    /// Creates a chain from a vector of stores
    pub fn from_stores(stores: Vec<Box<dyn VariableStore>>) -> Self {
        Self { stores }
    }
}

impl VariableStore for ChainedStore {
    fn get(&self, name: &str) -> Option<String> {
        for store in &self.stores {
            if let Some(value) = store.get(name) {
                return Some(value);
            }
        }
        None
    }

    fn set(&mut self, name: &str, value: &str) {
        if let Some(first) = self.stores.first_mut() {
            first.set(name, value);
        }
    }
}

/// Options controlling which reference forms the engine recognizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandOptions {
    /// Master switch for `$NAME` / `${...}` recognition; when off such
    /// sequences are left verbatim
    pub variable_expansion: bool,
    /// Enables Windows-style `%NAME%` references
    pub windows_expansion: bool,
    /// Enables `$( ... )` recognition and passthrough
    pub command_substitution: bool,
    /// When off, `${NAME:=default}` still yields the default for an unset
    /// name but skips the `set` call
    pub variable_assignment: bool,
    /// When off, `${NAME:?message}` still fails for an unset name but with
    /// the generic not-set message
    pub custom_error_message: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            variable_expansion: true,
            windows_expansion: false,
            command_substitution: false,
            variable_assignment: true,
            custom_error_message: true,
        }
    }
}

/// Expands every recognized reference in `template` against `store`
///
/// Literal text between references is copied through unchanged. The scan
/// position strictly advances; one pass, linear in the template length.
pub fn expand(
    template: &str,
    store: &mut dyn VariableStore,
    options: &ExpandOptions,
) -> Result<String, ExpansionError> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if options.variable_expansion && chars.peek() == Some(&'$') => {
                // \$ is a literal dollar, never the start of a reference
                chars.next();
                result.push('$');
            }
            '$' => match chars.peek().copied() {
                Some('(') if options.command_substitution => {
                    chars.next();
                    let body = scan_substitution_body(&mut chars)?;
                    result.push_str(&body);
                }
                Some('{') if options.variable_expansion => {
                    chars.next();
                    let value = expand_braced(&mut chars, store, options)?;
                    result.push_str(&value);
                }
                Some(c) if options.variable_expansion && c.is_ascii_alphabetic() => {
                    let name = scan_name(&mut chars);
                    match store.get(&name) {
                        Some(value) => result.push_str(&value),
                        None => return Err(ExpansionError::NotSet { name }),
                    }
                }
                Some(c) if options.variable_expansion && (c.is_ascii_digit() || c == '_') => {
                    // Digit- and underscore-led names are reserved
                    let name = scan_name(&mut chars);
                    return Err(ExpansionError::InvalidVariableName { name });
                }
                _ => result.push('$'),
            },
            '%' if options.windows_expansion => {
                let value = expand_windows(&mut chars, store)?;
                result.push_str(&value);
            }
            _ => result.push(ch),
        }
    }

    Ok(result)
}

/// Scans a greedy run of identifier characters
fn scan_name(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

/// Validates the leading character of a reference name
fn check_name(name: &str) -> Result<(), ExpansionError> {
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Ok(()),
        Some(_) => Err(ExpansionError::InvalidVariableName {
            name: name.to_string(),
        }),
        None => Err(ExpansionError::MalformedReference),
    }
}

/// Consumes a `$( ... )` body through its matching close parenthesis
///
/// Nested `$(` spans are tracked; the returned text is the enclosed body
/// verbatim, inner spans kept with their markers.
fn scan_substitution_body(chars: &mut Peekable<Chars>) -> Result<String, ExpansionError> {
    let mut body = String::new();
    let mut depth = 1usize;

    while let Some(ch) = chars.next() {
        match ch {
            '$' if chars.peek() == Some(&'(') => {
                chars.next();
                body.push_str("$(");
                depth += 1;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(body);
                }
                body.push(')');
            }
            _ => body.push(ch),
        }
    }

    Err(ExpansionError::MissingClosingToken { name: body })
}

/// Expands a `${...}` reference; the opening brace is already consumed
fn expand_braced(
    chars: &mut Peekable<Chars>,
    store: &mut dyn VariableStore,
    options: &ExpandOptions,
) -> Result<String, ExpansionError> {
    let name = scan_name(chars);
    check_name(&name)?;

    match chars.next() {
        Some('}') => store
            .get(&name)
            .ok_or(ExpansionError::NotSet { name }),
        Some(':') => {
            let operator = chars
                .next()
                .ok_or_else(|| ExpansionError::MissingClosingToken { name: name.clone() })?;
            if !matches!(operator, '-' | '=' | '?') {
                return Err(ExpansionError::MalformedReference);
            }

            // The word runs literally to the closing brace; it is never
            // itself expanded.
            let mut word = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => word.push(c),
                    None => {
                        return Err(ExpansionError::MissingClosingToken { name });
                    }
                }
            }

            match (operator, store.get(&name)) {
                (_, Some(value)) => Ok(value),
                ('-', None) => Ok(word),
                ('=', None) => {
                    if options.variable_assignment {
                        store.set(&name, &word);
                    }
                    Ok(word)
                }
                ('?', None) => {
                    if options.custom_error_message {
                        Err(ExpansionError::Unset { message: word })
                    } else {
                        Err(ExpansionError::NotSet { name })
                    }
                }
                _ => unreachable!("operator validated above"),
            }
        }
        Some(_) => Err(ExpansionError::MalformedReference),
        None => Err(ExpansionError::MissingClosingToken { name }),
    }
}

/// Expands a `%NAME%` reference; the opening percent is already consumed
fn expand_windows(
    chars: &mut Peekable<Chars>,
    store: &mut dyn VariableStore,
) -> Result<String, ExpansionError> {
    let name = scan_name(chars);
    if name.is_empty() && chars.peek() == Some(&'%') {
        // %% with nothing between
        chars.next();
        return Err(ExpansionError::MalformedReference);
    }
    check_name(&name)?;

    match chars.next() {
        Some('%') => store
            .get(&name)
            .ok_or(ExpansionError::NotSet { name }),
        Some(_) => Err(ExpansionError::MalformedReference),
        None => Err(ExpansionError::MissingClosingToken { name }),
    }
}
