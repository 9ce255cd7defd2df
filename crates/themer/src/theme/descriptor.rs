//! The per-theme descriptor file (`theme.json`).
//!
//! A descriptor is a JSON object. The typed fields below are read out of it,
//! while the complete object is kept verbatim so that unknown keys survive in
//! [`ThemeRecord::config`](super::ThemeRecord::config).
//!
//! Field types are read loosely: numbers and booleans become strings, a lone
//! string stands in for a one-element list, and an author may be given as a
//! plain name. A field that still does not fit is dropped with a warning; only
//! content that is not a JSON object makes the descriptor invalid.
//!
//! ```json
//! {
//!     "name": "Shop",
//!     "slug": "shop",
//!     "parent": "base",
//!     "version": "2.1.0",
//!     "authors": [{ "name": "Ada", "role": "Designer" }],
//!     "screenshots": ["screenshot.png"],
//!     "tags": ["ecommerce"]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tracing::warn;

use crate::error::{Result, ThemeError};

/// One entry of a descriptor's `authors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Typed view of a `theme.json` file.
///
/// Every field is optional; defaults are applied when the descriptor is turned
/// into a [`ThemeRecord`](super::ThemeRecord).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeDescriptor {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub authors: Vec<Author>,
    pub asset_path: Option<String>,
    pub parent: Option<String>,
    pub removable: Option<bool>,
    pub disableable: Option<bool>,
    pub screenshots: Vec<String>,
    pub tags: Vec<String>,
    pub requires: Vec<String>,

    /// The raw descriptor object, including keys not modelled above.
    pub raw: Map<String, Value>,
}

impl ThemeDescriptor {
    /// Parses descriptor content.
    ///
    /// `path` is only used for error reporting and warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::InvalidThemeConfig`] if the content is not JSON or
    /// is not a JSON object.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let invalid = |message: String| ThemeError::InvalidThemeConfig {
            path: path.to_path_buf(),
            message,
        };

        let value: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
        let Value::Object(raw) = value else {
            return Err(invalid("descriptor must be a JSON object".to_string()));
        };

        let fields = Fields { raw: &raw, path };
        Ok(ThemeDescriptor {
            name: fields.string("name"),
            slug: fields.string("slug"),
            description: fields.string("description"),
            version: fields.string("version"),
            author: fields.string("author"),
            authors: fields.authors("authors"),
            asset_path: fields.string("asset_path"),
            parent: fields.string("parent"),
            removable: fields.boolean("removable"),
            disableable: fields.boolean("disableable"),
            screenshots: fields.list("screenshots"),
            tags: fields.list("tags"),
            requires: fields.list("requires"),
            raw,
        })
    }
}

/// Loose accessors over a descriptor object.
struct Fields<'a> {
    raw: &'a Map<String, Value>,
    path: &'a Path,
}

impl Fields<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key).filter(|v| !v.is_null())
    }

    fn ignore(&self, key: &str, expected: &str) {
        warn!(
            path = %self.path.display(),
            field = key,
            expected,
            "ignoring ill-typed descriptor field"
        );
    }

    fn string(&self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        let coerced = scalar(value);
        if coerced.is_none() {
            self.ignore(key, "a string");
        }
        coerced
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            _ => {
                self.ignore(key, "a boolean");
                None
            }
        }
    }

    fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            None => Vec::new(),
            Some(Value::Array(items)) => {
                let list: Vec<String> = items.iter().filter_map(scalar).collect();
                if list.len() != items.len() {
                    self.ignore(key, "a list of strings");
                }
                list
            }
            Some(value) => match scalar(value) {
                Some(single) => vec![single],
                None => {
                    self.ignore(key, "a list of strings");
                    Vec::new()
                }
            },
        }
    }

    fn authors(&self, key: &str) -> Vec<Author> {
        let items = match self.get(key) {
            None => return Vec::new(),
            Some(Value::Array(items)) => items.as_slice(),
            Some(single) => std::slice::from_ref(single),
        };
        let authors: Vec<Author> = items.iter().filter_map(author).collect();
        if authors.len() != items.len() {
            self.ignore(key, "a list of authors");
        }
        authors
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn author(value: &Value) -> Option<Author> {
    match value {
        Value::String(name) => Some(Author {
            name: name.clone(),
            email: None,
            role: None,
        }),
        Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}
