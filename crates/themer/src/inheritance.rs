//! Parent-chain resolution and hierarchy integrity checks.
//!
//! A theme may name a `parent`. Resources are looked up nearest-first along
//! the chain `theme → parent → grandparent → …`, so a child overrides what it
//! inherits.
//!
//! [`chain`] is forgiving: a missing parent ends the chain and a
//! cycle is cut at the first repeated theme. Broken references are reported by
//! [`check_integrity`] instead.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::fs::Filesystem;
use crate::registry::ThemeRegistry;
use crate::theme::ThemeRecord;

/// Computes the ancestors of `theme`, nearest first.
///
/// The walk stops when a theme has no parent, when the parent alias is not
/// registered, or when the parent's slug was already visited. The starting
/// theme is never part of its own chain, and the result is never longer than
/// the number of registered themes.
pub fn chain(registry: &ThemeRegistry, theme: &ThemeRecord) -> Vec<Arc<ThemeRecord>> {
    let mut ancestors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(theme.slug());

    let mut parent_alias = theme.parent();
    while let Some(alias) = parent_alias {
        let Some(parent) = registry.find(alias) else {
            break;
        };
        if !seen.insert(parent.slug()) {
            break;
        }
        ancestors.push(Arc::clone(parent));
        parent_alias = parent.parent();
    }

    ancestors
}

/// Like [`chain`], resolving the starting theme by alias first.
///
/// Returns an empty chain for unknown aliases.
pub fn chain_of(registry: &ThemeRegistry, alias: &str) -> Vec<Arc<ThemeRecord>> {
    registry
        .find(alias)
        .map(|theme| chain(registry, theme))
        .unwrap_or_default()
}

/// How serious an [`IntegrityIssue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found in the theme hierarchy or a theme's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// A theme names a parent that is not registered.
    MissingParent { theme: String, parent: String },
    /// Following parents leads back to a theme already on the path.
    CircularDependency { path: Vec<String> },
    /// A declared screenshot file does not exist in the theme directory.
    MissingScreenshot { theme: String, screenshot: String },
    /// Neither `author` nor `authors` is set.
    MissingAuthor { theme: String },
}

impl IntegrityIssue {
    pub fn severity(&self) -> Severity {
        match self {
            IntegrityIssue::MissingAuthor { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::MissingParent { theme, parent } => {
                write!(f, "Theme [{}] requires missing parent theme [{}]", theme, parent)
            }
            IntegrityIssue::CircularDependency { path } => {
                write!(f, "Circular dependency detected: {}", path.join(" -> "))
            }
            IntegrityIssue::MissingScreenshot { theme, screenshot } => {
                write!(
                    f,
                    "Theme [{}] references missing screenshot [{}]",
                    theme, screenshot
                )
            }
            IntegrityIssue::MissingAuthor { theme } => {
                write!(f, "Theme [{}] has no author defined", theme)
            }
        }
    }
}

/// Result of [`check_integrity`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    /// True if no issue of [`Severity::Error`] was found.
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &IntegrityIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &IntegrityIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Warning)
    }
}

/// Checks every registered theme for broken parents, cycles and metadata gaps.
pub fn check_integrity(registry: &ThemeRegistry, fs: &dyn Filesystem) -> IntegrityReport {
    let mut issues = Vec::new();

    for theme in registry.all() {
        if let Some(parent) = theme.parent() {
            if !registry.contains(parent) {
                issues.push(IntegrityIssue::MissingParent {
                    theme: theme.name().to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        if let Some(path) = find_cycle(registry, theme) {
            issues.push(IntegrityIssue::CircularDependency { path });
        }

        for screenshot in theme.screenshots() {
            if !fs.exists(&theme.path().join(screenshot)) {
                issues.push(IntegrityIssue::MissingScreenshot {
                    theme: theme.name().to_string(),
                    screenshot: screenshot.clone(),
                });
            }
        }

        let has_author = theme.author().is_some_and(|a| !a.is_empty()) || !theme.authors().is_empty();
        if !has_author {
            issues.push(IntegrityIssue::MissingAuthor {
                theme: theme.name().to_string(),
            });
        }
    }

    IntegrityReport { issues }
}

/// Returns the name path of the first cycle reachable from `theme`, if any.
fn find_cycle(registry: &ThemeRegistry, theme: &ThemeRecord) -> Option<Vec<String>> {
    let mut path = vec![theme.name().to_string()];
    let mut slugs = vec![theme.slug().to_string()];
    let mut current = theme;

    while let Some(alias) = current.parent() {
        let parent = registry.find(alias)?;
        path.push(parent.name().to_string());
        if slugs.iter().any(|s| s == parent.slug()) {
            return Some(path);
        }
        slugs.push(parent.slug().to_string());
        current = parent;
    }

    None
}
