//! Search-path composition for an active theme.
//!
//! Given the active theme and its inheritance chain, [`ResourceResolver`]
//! computes, nearest-first, where every resource kind is looked up:
//!
//! | Kind | Per theme | Registered as |
//! |------|-----------|---------------|
//! | views | `resources/views` | `theme::` namespace + global locations |
//! | auto-namespaces | configured subpath, if present | `{alias}::` namespace |
//! | anonymous components | `resources/views/components`, if present | `theme-components::` |
//! | translations | `resources/lang`, else `lang` | `{lowercased name}::`, `theme::` for the active theme |
//! | component classes | `app/Livewire` + `resources/views/livewire` | `{lowercased name}::` |
//!
//! The active theme's own views directory is always included; ancestors only
//! contribute views when their `has_views` flag is set.
//!
//! Computation and registration are separate steps: [`ResourceResolver::resolve`]
//! returns a plain [`ResolvedResources`] value, and [`ResolvedResources::apply`]
//! pushes it into a [`Host`].

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::fs::Filesystem;
use crate::host::{ComponentNamespace, Host, ServiceContainer};
use crate::theme::ThemeRecord;
use crate::util::studly;

/// Shared namespace for the active theme's views and translations.
pub const THEME_NAMESPACE: &str = "theme";

/// Namespace for anonymous template components found under view paths.
pub const COMPONENTS_NAMESPACE: &str = "theme-components";

/// Everything activation registers with the host, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedResources {
    /// View directories, nearest-first.
    pub views: Vec<PathBuf>,
    /// Auto-namespace alias → existing directories, nearest-first.
    pub auto_namespaces: IndexMap<String, Vec<PathBuf>>,
    /// `components` directories found under `views`.
    pub component_views: Vec<PathBuf>,
    /// `(namespace, language directory)`, nearest-first.
    pub translations: Vec<(String, PathBuf)>,
    /// The active theme's language directory, registered under [`THEME_NAMESPACE`].
    pub shared_translations: Option<PathBuf>,
    /// Component namespaces; the active theme's entries come last.
    pub component_namespaces: Vec<ComponentNamespace>,
}

impl ResolvedResources {
    /// Registers every path with the host's collaborators.
    pub fn apply<H: Host + ?Sized>(&self, host: &mut H) {
        let views = host.views();
        views.add_namespace(THEME_NAMESPACE, &self.views);
        // Prepending in reverse leaves the nearest theme at the front.
        for path in self.views.iter().rev() {
            views.prepend_location(path);
        }
        for (alias, paths) in &self.auto_namespaces {
            views.add_namespace(alias, paths);
            for path in paths {
                views.add_anonymous_component_path(path, alias);
            }
        }
        if !self.component_views.is_empty() {
            views.add_namespace(COMPONENTS_NAMESPACE, &self.component_views);
        }

        let translator = host.translator();
        for (namespace, path) in &self.translations {
            translator.add_namespace(namespace, path);
            translator.add_json_path(path);
        }
        if let Some(path) = &self.shared_translations {
            translator.add_namespace(THEME_NAMESPACE, path);
        }

        let components = host.components();
        for namespace in &self.component_namespaces {
            components.add_namespace(namespace.clone());
        }
    }
}

/// Computes per-theme search paths, memoizing directory probes.
#[derive(Debug, Default)]
pub struct ResourceResolver {
    auto_namespaces: IndexMap<String, String>,
    dir_exists: RefCell<HashMap<PathBuf, bool>>,
    loaded_providers: HashSet<PathBuf>,
    registered_providers: HashSet<String>,
}

impl ResourceResolver {
    pub fn new(auto_namespaces: IndexMap<String, String>) -> Self {
        Self {
            auto_namespaces,
            ..Self::default()
        }
    }

    pub fn auto_namespaces(&self) -> &IndexMap<String, String> {
        &self.auto_namespaces
    }

    /// Forgets memoized directory probes and provider bookkeeping.
    pub fn reset(&mut self) {
        self.dir_exists.borrow_mut().clear();
        self.loaded_providers.clear();
        self.registered_providers.clear();
    }

    fn is_dir(&self, fs: &dyn Filesystem, path: &Path) -> bool {
        if let Some(&known) = self.dir_exists.borrow().get(path) {
            return known;
        }
        let exists = fs.is_dir(path);
        self.dir_exists
            .borrow_mut()
            .insert(path.to_path_buf(), exists);
        exists
    }

    /// View directories for `active`, nearest-first.
    pub fn view_paths(&self, active: &ThemeRecord, chain: &[Arc<ThemeRecord>]) -> Vec<PathBuf> {
        std::iter::once(active.views_path())
            .chain(
                chain
                    .iter()
                    .filter(|t| t.has_views())
                    .map(|t| t.views_path()),
            )
            .collect()
    }

    /// Existing auto-namespace directories across `[active] + chain`.
    pub fn auto_namespace_paths(
        &self,
        fs: &dyn Filesystem,
        active: &ThemeRecord,
        chain: &[Arc<ThemeRecord>],
    ) -> IndexMap<String, Vec<PathBuf>> {
        let mut resolved = IndexMap::new();
        for (alias, relative) in &self.auto_namespaces {
            let paths: Vec<PathBuf> = themes(active, chain)
                .map(|t| t.path().join(relative))
                .filter(|p| self.is_dir(fs, p))
                .collect();
            if !paths.is_empty() {
                resolved.insert(alias.clone(), paths);
            }
        }
        resolved
    }

    /// `(namespace, language directory)` for every theme with translations.
    pub fn translation_paths(
        &self,
        fs: &dyn Filesystem,
        active: &ThemeRecord,
        chain: &[Arc<ThemeRecord>],
    ) -> Vec<(String, PathBuf)> {
        themes(active, chain)
            .filter(|t| t.has_translations())
            .filter_map(|t| {
                self.lang_path(fs, t)
                    .map(|path| (t.namespace_alias(), path))
            })
            .collect()
    }

    fn lang_path(&self, fs: &dyn Filesystem, theme: &ThemeRecord) -> Option<PathBuf> {
        [
            theme.path().join("resources").join("lang"),
            theme.path().join("lang"),
        ]
        .into_iter()
        .find(|p| self.is_dir(fs, p))
    }

    /// Component namespaces: ancestors farthest-first, then the active theme,
    /// then each auto-namespace once per theme that has its directory, again
    /// farthest-first, so the nearest registration is the last one made.
    pub fn component_namespaces(
        &self,
        fs: &dyn Filesystem,
        active: &ThemeRecord,
        chain: &[Arc<ThemeRecord>],
    ) -> Vec<ComponentNamespace> {
        let mut namespaces: Vec<ComponentNamespace> = chain
            .iter()
            .rev()
            .map(|t| theme_component_namespace(t))
            .collect();
        namespaces.push(theme_component_namespace(active));

        let nearest_first: Vec<&ThemeRecord> = themes(active, chain).collect();
        for (alias, relative) in &self.auto_namespaces {
            let studly_alias = studly(alias);
            for owner in nearest_first.iter().rev() {
                let view_path = owner.path().join(relative);
                if !self.is_dir(fs, &view_path) {
                    continue;
                }
                namespaces.push(ComponentNamespace {
                    name: alias.clone(),
                    view_path,
                    class_namespace: Some(format!(
                        "{}\\{}",
                        owner.component_class_namespace(),
                        studly_alias
                    )),
                    class_path: Some(owner.component_class_path().join(&studly_alias)),
                });
            }
        }

        namespaces
    }

    /// Computes everything activation of `active` registers.
    pub fn resolve(
        &self,
        fs: &dyn Filesystem,
        active: &ThemeRecord,
        chain: &[Arc<ThemeRecord>],
    ) -> ResolvedResources {
        let views = self.view_paths(active, chain);
        let component_views = views
            .iter()
            .map(|v| v.join("components"))
            .filter(|p| self.is_dir(fs, p))
            .collect();
        let shared_translations = if active.has_translations() {
            self.lang_path(fs, active)
        } else {
            None
        };

        ResolvedResources {
            auto_namespaces: self.auto_namespace_paths(fs, active, chain),
            component_views,
            translations: self.translation_paths(fs, active, chain),
            shared_translations,
            component_namespaces: self.component_namespaces(fs, active, chain),
            views,
        }
    }

    /// Loads the theme's provider file once and registers its provider class.
    ///
    /// `Theme\{Studly}\ThemeServiceProvider` is preferred over a bare
    /// `ThemeServiceProvider`. Returns the registered class, if any.
    pub fn bootstrap_provider(
        &mut self,
        container: &mut dyn ServiceContainer,
        theme: &ThemeRecord,
    ) -> Option<String> {
        if !theme.has_provider() {
            return None;
        }

        let file = theme.provider_path();
        if self.loaded_providers.insert(file.clone()) {
            container.load_provider_file(&file);
        }

        let candidates = [
            format!("Theme\\{}\\ThemeServiceProvider", theme.studly_name()),
            "ThemeServiceProvider".to_string(),
        ];
        let class = candidates.into_iter().find(|c| container.class_exists(c))?;

        if self.registered_providers.insert(class.clone()) {
            debug!(theme = theme.name(), provider = %class, "registering theme provider");
            container.register_provider(&class);
        }
        Some(class)
    }
}

/// `[active] + chain`, nearest-first.
fn themes<'t>(
    active: &'t ThemeRecord,
    chain: &'t [Arc<ThemeRecord>],
) -> impl Iterator<Item = &'t ThemeRecord> {
    std::iter::once(active).chain(chain.iter().map(|t| t.as_ref()))
}

/// The namespace exposing a theme's own component classes and views.
pub fn theme_component_namespace(theme: &ThemeRecord) -> ComponentNamespace {
    ComponentNamespace {
        name: theme.namespace_alias(),
        view_path: theme.component_view_path(),
        class_namespace: Some(theme.component_class_namespace()),
        class_path: Some(theme.component_class_path()),
    }
}
