//! The theme registry: the in-process source of truth for known themes.
//!
//! Every theme is reachable through three aliases:
//!
//! | Alias | Example |
//! |-------|---------|
//! | display name | `"Dark Mode"` |
//! | slug | `"dark-mode"` |
//! | directory basename | `"dark"` |
//!
//! Each alias kind has its own index, all pointing at the same shared
//! [`ThemeRecord`], so [`ThemeRegistry::find`] hands back the identical `Arc`
//! whichever alias is used.
//!
//! # Alias Resolution
//!
//! When one string is an alias of several themes (a theme named `"shop"` and a
//! different theme whose slug is `"shop"`), lookups resolve in this order:
//!
//! 1. slug
//! 2. display name
//! 3. directory basename
//!
//! # Registration vs. Discovery
//!
//! [`ThemeRegistry::register`] never rejects a record: a record with an
//! already-registered name replaces the old one. Slug uniqueness is enforced by
//! discovery (see [`crate::discovery`]), which validates a whole scan before
//! registering anything.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::theme::ThemeRecord;

/// Registry of discovered themes, indexed by name, slug and directory.
#[derive(Debug, Default, Clone)]
pub struct ThemeRegistry {
    /// Canonical index, in registration order. One entry per theme.
    by_name: IndexMap<String, Arc<ThemeRecord>>,
    by_slug: HashMap<String, Arc<ThemeRecord>>,
    by_dir: HashMap<String, Arc<ThemeRecord>>,
}

impl ThemeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a theme under its name, slug and directory basename.
    ///
    /// Existing entries for any of those aliases are overwritten. If a theme
    /// with the same name was registered before, its slug and directory
    /// aliases are dropped so the old record is no longer reachable.
    ///
    /// Returns the shared handle stored in the registry.
    pub fn register(&mut self, theme: impl Into<Arc<ThemeRecord>>) -> Arc<ThemeRecord> {
        let theme = theme.into();

        if let Some(previous) = self.by_name.get(theme.name()).cloned() {
            self.by_slug.retain(|_, t| !Arc::ptr_eq(t, &previous));
            self.by_dir.retain(|_, t| !Arc::ptr_eq(t, &previous));
        }

        self.by_name
            .insert(theme.name().to_string(), Arc::clone(&theme));
        self.by_slug
            .insert(theme.slug().to_string(), Arc::clone(&theme));
        if let Some(dir) = theme.directory_name() {
            self.by_dir.insert(dir.to_string(), Arc::clone(&theme));
        }

        theme
    }

    /// Looks up a theme by slug, name or directory basename.
    pub fn find(&self, alias: &str) -> Option<&Arc<ThemeRecord>> {
        self.by_slug
            .get(alias)
            .or_else(|| self.by_name.get(alias))
            .or_else(|| self.by_dir.get(alias))
    }

    /// Like [`find`](Self::find), returning an owned handle.
    pub fn get(&self, alias: &str) -> Option<Arc<ThemeRecord>> {
        self.find(alias).cloned()
    }

    /// True if any alias kind knows `alias`.
    pub fn contains(&self, alias: &str) -> bool {
        self.find(alias).is_some()
    }

    /// True if a theme with exactly this slug is registered.
    pub fn contains_slug(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    /// All themes, de-duplicated by name, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<ThemeRecord>> {
        self.by_name.values()
    }

    /// Display names of all themes, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|s| s.as_str())
    }

    /// Number of distinct themes.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Removes every theme.
    pub fn reset(&mut self) {
        self.by_name.clear();
        self.by_slug.clear();
        self.by_dir.clear();
    }
}
