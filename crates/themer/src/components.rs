//! Missing-component fallback.
//!
//! When the host's component factory cannot resolve a name it forwards the
//! lookup here. The resolver works as a chain of responsibility:
//!
//! 1. strip a leading `alias::` and map it to search contexts
//!    (`pages::` → `pages.`, `layouts::` → `layouts.`, `theme::` → no prefix,
//!    unnamespaced → all three in turn)
//! 2. probe `{theme}::{context}{name}` for the active theme, then each ancestor
//! 3. probe the host application's own page and layout directories under
//!    internal aliases, registered lazily on first use
//!
//! An alias that names a registered theme is left to the factory itself. A
//! lookup that re-enters with a name already being resolved returns `None`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::fs::Filesystem;
use crate::host::{ComponentNamespace, ComponentRegistrar, MissingComponentHandler};
use crate::registry::ThemeRegistry;
use crate::resources::THEME_NAMESPACE;

/// Internal alias for the application's page components.
pub const APP_PAGES_ALIAS: &str = "__themer_app_pages";

/// Internal alias for the application's layouts.
pub const APP_LAYOUTS_ALIAS: &str = "__themer_app_layouts";

const UNNAMESPACED_CONTEXTS: &[&str] = &["", "pages.", "layouts."];

/// State that outlives a single lookup.
#[derive(Debug, Default)]
pub struct FallbackState {
    installed: bool,
    in_progress: HashSet<String>,
    app_namespaces: HashMap<&'static str, bool>,
}

impl FallbackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables missing-component forwarding on the host, once.
    ///
    /// Returns true if this call installed it.
    pub fn install(&mut self, components: &mut dyn ComponentRegistrar) -> bool {
        if self.installed {
            return false;
        }
        components.enable_missing_component_fallback();
        self.installed = true;
        true
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Forgets cached app-directory probes.
    pub fn clear_cache(&mut self) {
        self.app_namespaces.clear();
    }
}

/// One resolution pass over the active theme and its ancestors.
pub struct ComponentResolver<'a> {
    state: &'a mut FallbackState,
    registry: &'a ThemeRegistry,
    fs: &'a dyn Filesystem,
    /// Component namespaces of `[active] + chain`, nearest-first.
    probe_order: Vec<String>,
    app_resources: &'a Path,
}

impl<'a> ComponentResolver<'a> {
    pub fn new(
        state: &'a mut FallbackState,
        registry: &'a ThemeRegistry,
        fs: &'a dyn Filesystem,
        probe_order: Vec<String>,
        app_resources: &'a Path,
    ) -> Self {
        Self {
            state,
            registry,
            fs,
            probe_order,
            app_resources,
        }
    }

    fn is_theme_alias(&self, alias: &str) -> bool {
        self.registry.contains(alias) || self.probe_order.iter().any(|t| t == alias)
    }

    fn lookup(&mut self, name: &str, components: &mut dyn ComponentRegistrar) -> Option<String> {
        let (alias, bare) = match name.split_once("::") {
            Some((alias, bare)) => (Some(alias), bare),
            None => (None, name),
        };

        if alias.is_some_and(|a| self.is_theme_alias(a)) {
            return None;
        }

        let contexts: &[&str] = match alias {
            None => UNNAMESPACED_CONTEXTS,
            Some("pages") => &["pages."],
            Some("layouts") => &["layouts."],
            Some(THEME_NAMESPACE) => &[""],
            Some(_) => return None,
        };

        // Every context of a theme is tried before its parent is consulted.
        let probe_order = self.probe_order.clone();
        for theme in &probe_order {
            for context in contexts {
                let target = format!("{}::{}{}", theme, context, bare);
                if let Some(class) = components.resolve_class(&target, self) {
                    debug!(component = name, %target, "resolved themed component");
                    return Some(class);
                }
            }
        }

        let app_aliases: &[&'static str] = match alias {
            None => &[APP_PAGES_ALIAS, APP_LAYOUTS_ALIAS],
            Some("pages") => &[APP_PAGES_ALIAS],
            Some("layouts") => &[APP_LAYOUTS_ALIAS],
            Some(_) => &[],
        };
        for &app_alias in app_aliases {
            if !self.ensure_app_namespace(components, app_alias) {
                continue;
            }
            let target = format!("{}::{}", app_alias, bare);
            if let Some(class) = components.resolve_class(&target, self) {
                debug!(component = name, %target, "resolved application component");
                return Some(class);
            }
        }

        None
    }

    fn app_dir(&self, alias: &str) -> PathBuf {
        let views = self.app_resources.join("views");
        if alias == APP_PAGES_ALIAS {
            views.join("livewire").join("pages")
        } else {
            views.join("layouts")
        }
    }

    /// Registers an app fallback namespace on first use. Both outcomes are cached.
    fn ensure_app_namespace(
        &mut self,
        components: &mut dyn ComponentRegistrar,
        alias: &'static str,
    ) -> bool {
        if let Some(&known) = self.state.app_namespaces.get(alias) {
            return known;
        }

        let dir = self.app_dir(alias);
        let exists = self.fs.is_dir(&dir);
        if exists {
            components.add_namespace(ComponentNamespace {
                name: alias.to_string(),
                view_path: dir,
                class_namespace: None,
                class_path: None,
            });
        }
        self.state.app_namespaces.insert(alias, exists);
        exists
    }
}

impl MissingComponentHandler for ComponentResolver<'_> {
    fn resolve_missing(
        &mut self,
        name: &str,
        components: &mut dyn ComponentRegistrar,
    ) -> Option<String> {
        if !self.state.in_progress.insert(name.to_string()) {
            debug!(component = name, "component lookup already in progress");
            return None;
        }
        let resolved = self.lookup(name, components);
        self.state.in_progress.remove(name);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFilesystem;
    use crate::host::RecordedComponents;
    use crate::theme::ThemeRecord;
    use tempfile::TempDir;

    fn registry() -> ThemeRegistry {
        let mut registry = ThemeRegistry::new();
        registry.register(ThemeRecord::builder("child", "/t/child").parent("base").build());
        registry.register(ThemeRecord::builder("base", "/t/base").build());
        registry
    }

    fn probe() -> Vec<String> {
        vec!["child".into(), "base".into()]
    }

    #[test]
    fn test_unnamespaced_probes_every_context_nearest_first() {
        let registry = registry();
        let mut state = FallbackState::new();
        let mut components = RecordedComponents::default();
        components.define("base::pages.checkout", "Theme\\Base\\Livewire\\Pages\\Checkout");

        let mut resolver =
            ComponentResolver::new(&mut state, &registry, &LocalFilesystem, probe(), Path::new("/none"));
        let class = resolver.resolve_missing("checkout", &mut components);

        assert_eq!(class.as_deref(), Some("Theme\\Base\\Livewire\\Pages\\Checkout"));
        assert_eq!(
            components.attempts,
            vec![
                "child::checkout",
                "child::pages.checkout",
                "child::layouts.checkout",
                "base::checkout",
                "base::pages.checkout",
            ]
        );
    }

    #[test]
    fn test_active_theme_context_beats_parent_bare_name() {
        let registry = registry();
        let mut state = FallbackState::new();
        let mut components = RecordedComponents::default();
        components.define("child::pages.checkout", "Child\\Checkout");
        components.define("base::checkout", "Base\\Checkout");

        let mut resolver =
            ComponentResolver::new(&mut state, &registry, &LocalFilesystem, probe(), Path::new("/none"));

        assert_eq!(
            resolver.resolve_missing("checkout", &mut components).as_deref(),
            Some("Child\\Checkout")
        );
    }

    #[test]
    fn test_namespaced_alias_maps_to_context() {
        let registry = registry();
        let mut state = FallbackState::new();
        let mut components = RecordedComponents::default();
        components.define("child::layouts.app", "Child\\App");

        let mut resolver =
            ComponentResolver::new(&mut state, &registry, &LocalFilesystem, probe(), Path::new("/none"));

        assert_eq!(
            resolver.resolve_missing("layouts::app", &mut components).as_deref(),
            Some("Child\\App")
        );
        assert_eq!(resolver.resolve_missing("theme::app", &mut components), None);
        assert_eq!(resolver.resolve_missing("vendor::app", &mut components), None);
    }

    #[test]
    fn test_theme_alias_is_left_to_the_factory() {
        let registry = registry();
        let mut state = FallbackState::new();
        let mut components = RecordedComponents::default();

        let mut resolver =
            ComponentResolver::new(&mut state, &registry, &LocalFilesystem, probe(), Path::new("/none"));
        assert_eq!(resolver.resolve_missing("base::cart", &mut components), None);
        assert!(components.attempts.is_empty());
    }

    /// Forwards every unresolved target back to the handler under the same name.
    #[derive(Default)]
    struct Echoing {
        depth: usize,
    }

    impl ComponentRegistrar for Echoing {
        fn add_namespace(&mut self, _namespace: ComponentNamespace) {}

        fn resolve_class(
            &mut self,
            _target: &str,
            missing: &mut dyn MissingComponentHandler,
        ) -> Option<String> {
            self.depth += 1;
            missing.resolve_missing("ghost", self)
        }

        fn enable_missing_component_fallback(&mut self) {}

        fn set_generator_target(
            &mut self,
            target: Option<crate::host::GeneratorTarget>,
        ) -> Option<crate::host::GeneratorTarget> {
            target
        }
    }

    #[test]
    fn test_reentrant_lookup_returns_none() {
        let registry = registry();
        let mut state = FallbackState::new();
        let mut components = Echoing::default();

        let mut resolver =
            ComponentResolver::new(&mut state, &registry, &LocalFilesystem, probe(), Path::new("/none"));
        assert_eq!(resolver.resolve_missing("ghost", &mut components), None);

        // Three contexts times two themes, each re-entry cut off immediately.
        assert_eq!(components.depth, 6);
        assert!(state.in_progress.is_empty());
    }

    #[test]
    fn test_app_fallback_registered_lazily_and_cached() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("views/livewire/pages")).unwrap();

        let registry = registry();
        let mut state = FallbackState::new();
        let mut components = RecordedComponents::default();
        components.define("__themer_app_pages::home", "App\\Livewire\\Pages\\Home");

        let mut resolver =
            ComponentResolver::new(&mut state, &registry, &LocalFilesystem, probe(), tmp.path());
        assert_eq!(
            resolver.resolve_missing("pages::home", &mut components).as_deref(),
            Some("App\\Livewire\\Pages\\Home")
        );
        assert_eq!(resolver.resolve_missing("missing", &mut components), None);
        assert_eq!(resolver.resolve_missing("other", &mut components), None);

        assert_eq!(components.namespace_names(), vec![APP_PAGES_ALIAS]);
        assert_eq!(state.app_namespaces.get(APP_LAYOUTS_ALIAS), Some(&false));
    }

    #[test]
    fn test_install_once() {
        let mut state = FallbackState::new();
        let mut components = RecordedComponents::default();
        assert!(state.install(&mut components));
        assert!(!state.install(&mut components));
        assert_eq!(components.fallback_enabled, 1);
    }
}
