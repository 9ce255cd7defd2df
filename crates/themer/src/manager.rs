//! The active-theme controller.
//!
//! [`ThemeManager`] owns the registry, the active theme and the host it
//! registers search paths with. Activation is all-or-nothing from the caller's
//! point of view: the alias is resolved before anything changes, and every
//! step after the swap is infallible or best-effort.
//!
//! # Example
//!
//! ```rust
//! use themer::{RecordingHost, ThemeManager, ThemeRecord, ThemerConfig};
//!
//! let mut manager = ThemeManager::new(ThemerConfig::default(), RecordingHost::new());
//! manager.register(ThemeRecord::builder("Base", "/srv/themes/base").has_views(true).build());
//! manager.register(ThemeRecord::builder("Dark", "/srv/themes/dark").parent("base").build());
//!
//! manager.set("dark").unwrap();
//! assert!(manager.is_active("Dark"));
//! assert_eq!(manager.active_view_paths().len(), 2);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assets::{self, AssetPublisher, PublishOutcome};
use crate::cache::ThemeCache;
use crate::components::{ComponentResolver, FallbackState};
use crate::config::ThemerConfig;
use crate::discovery::{self, ScanReport, ThemeSource};
use crate::error::{Result, ThemeError};
use crate::events::{ThemeEvent, ThemeListeners};
use crate::fs::{Filesystem, LocalFilesystem};
use crate::host::{GeneratorTarget, Host};
use crate::inheritance::{self, IntegrityReport};
use crate::registry::ThemeRegistry;
use crate::resources::{theme_component_namespace, ResourceResolver};
use crate::theme::ThemeRecord;

/// Owns the registry and the active theme for one host.
pub struct ThemeManager<H: Host> {
    config: ThemerConfig,
    registry: ThemeRegistry,
    active: Option<Arc<ThemeRecord>>,
    host: H,
    fs: Box<dyn Filesystem>,
    listeners: ThemeListeners,
    resources: ResourceResolver,
    fallback: FallbackState,
}

impl<H: Host> ThemeManager<H> {
    /// Creates a manager working on the local disk.
    pub fn new(config: ThemerConfig, host: H) -> Self {
        Self::with_filesystem(config, host, LocalFilesystem)
    }

    pub fn with_filesystem(config: ThemerConfig, host: H, fs: impl Filesystem + 'static) -> Self {
        let resources = ResourceResolver::new(config.auto_namespaces.clone());
        Self {
            config,
            registry: ThemeRegistry::new(),
            active: None,
            host,
            fs: Box::new(fs),
            listeners: ThemeListeners::new(),
            resources,
            fallback: FallbackState::new(),
        }
    }

    pub fn config(&self) -> &ThemerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn listeners_mut(&mut self) -> &mut ThemeListeners {
        &mut self.listeners
    }

    // Registry

    pub fn register(&mut self, theme: impl Into<Arc<ThemeRecord>>) -> Arc<ThemeRecord> {
        self.registry.register(theme)
    }

    pub fn find(&self, alias: &str) -> Option<Arc<ThemeRecord>> {
        self.registry.get(alias)
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<ThemeRecord>> {
        self.registry.all()
    }

    /// Ancestors of the theme known as `alias`, nearest-first.
    pub fn chain(&self, alias: &str) -> Vec<Arc<ThemeRecord>> {
        inheritance::chain_of(&self.registry, alias)
    }

    /// Clears the registry, the active theme and memoized probes.
    ///
    /// The host keeps whatever was registered with it, including the
    /// missing-component fallback.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.active = None;
        self.resources.reset();
        self.fallback.clear_cache();
    }

    // Discovery

    /// Populates the registry from the cache or a fresh scan.
    pub fn scan(&mut self) -> Result<ScanReport> {
        discovery::discover(&mut self.registry, self.fs.as_ref(), &self.config)
    }

    /// Scans theme directories, ignoring the cache.
    pub fn scan_fresh(&mut self) -> Result<ScanReport> {
        discovery::scan_into(
            &mut self.registry,
            self.fs.as_ref(),
            &self.config.discovery.filename,
            &ThemeSource::from_config(&self.config),
        )
    }

    /// Rescans the theme directories and writes the cache. Returns the theme count.
    pub fn build_cache(&self) -> Result<usize> {
        let themes = ThemeCache::new(&self.config.cache_path, self.fs.as_ref()).build(
            &self.config.discovery.filename,
            &ThemeSource::from_config(&self.config),
        )?;
        Ok(themes.len())
    }

    /// Deletes the cache. Returns whether one existed.
    pub fn clear_cache(&self) -> Result<bool> {
        ThemeCache::new(&self.config.cache_path, self.fs.as_ref()).clear()
    }

    /// Discovers themes and activates the configured theme, if registered.
    pub fn boot(&mut self) -> Result<ScanReport> {
        let report = self.scan()?;

        let wanted = self.config.active.clone();
        if !wanted.is_empty() {
            match self.set(&wanted) {
                Ok(_) => {}
                Err(ThemeError::ThemeNotFound { name }) => {
                    warn!(theme = %name, "configured theme is not registered, booting without one");
                }
                Err(other) => return Err(other),
            }
        }

        Ok(report)
    }

    pub fn check_integrity(&self) -> IntegrityReport {
        inheritance::check_integrity(&self.registry, self.fs.as_ref())
    }

    // Activation

    /// Activates the theme known as `alias`.
    ///
    /// # Errors
    ///
    /// [`ThemeError::ThemeNotFound`] if no theme answers to `alias`. Nothing is
    /// changed and no event is emitted in that case.
    pub fn set(&mut self, alias: &str) -> Result<Arc<ThemeRecord>> {
        let theme = self
            .registry
            .get(alias)
            .ok_or_else(|| ThemeError::not_found(alias))?;

        self.listeners.emit(&ThemeEvent::Activating {
            requested: alias.to_string(),
        });

        self.active = Some(Arc::clone(&theme));
        self.register_resources(&theme);

        if self.config.assets.publish_on_activate {
            if let Err(error) = self.publisher().publish(&theme) {
                warn!(theme = theme.name(), %error, "failed to publish theme assets");
            }
        }

        info!(theme = theme.name(), slug = theme.slug(), "activated theme");
        self.listeners.emit(&ThemeEvent::Activated {
            theme: Arc::clone(&theme),
        });
        Ok(theme)
    }

    fn register_resources(&mut self, theme: &Arc<ThemeRecord>) {
        let chain = inheritance::chain(&self.registry, theme);
        let resolved = self.resources.resolve(self.fs.as_ref(), theme, &chain);
        debug!(theme = theme.name(), views = ?resolved.views, "registering theme resources");

        resolved.apply(&mut self.host);
        self.resources
            .bootstrap_provider(self.host.container(), theme);
        self.fallback.install(self.host.components());
    }

    /// Runs `f` with `alias` active, then reactivates the previous theme.
    ///
    /// The previous theme is restored even if `f` panics. When no theme was
    /// active before, whatever `f` leaves active stays active.
    pub fn for_theme<T>(&mut self, alias: &str, f: impl FnOnce(&mut Self) -> T) -> Result<T> {
        let original = self.active.clone();
        self.set(alias)?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(self)));

        if let Some(original) = original {
            if let Err(error) = self.set(original.slug()) {
                warn!(theme = original.name(), %error, "could not restore previous theme");
            }
        }

        match outcome {
            Ok(value) => Ok(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    pub fn active(&self) -> Option<&Arc<ThemeRecord>> {
        self.active.as_ref()
    }

    /// True if the active theme's name or slug is `alias`.
    pub fn is_active(&self, alias: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|t| t.name() == alias || t.slug() == alias)
    }

    /// View directories of the active theme, nearest-first.
    pub fn active_view_paths(&self) -> Vec<PathBuf> {
        match &self.active {
            Some(theme) => {
                let chain = inheritance::chain(&self.registry, theme);
                self.resources.view_paths(theme, &chain)
            }
            None => Vec::new(),
        }
    }

    // Components

    /// Resolves a component name through the host and the theme fallback.
    pub fn resolve_component(&mut self, name: &str) -> Option<String> {
        let probe_order = match &self.active {
            Some(theme) => std::iter::once(Arc::clone(theme))
                .chain(inheritance::chain(&self.registry, theme))
                .map(|t| t.namespace_alias())
                .collect(),
            None => Vec::new(),
        };

        let mut resolver = ComponentResolver::new(
            &mut self.fallback,
            &self.registry,
            self.fs.as_ref(),
            probe_order,
            &self.config.app_resources_path,
        );
        self.host.components().resolve_class(name, &mut resolver)
    }

    /// Points component generation at the theme known as `alias` while `f` runs.
    ///
    /// The theme's component directories are created when missing. The
    /// previous generator target is restored afterwards, even if `f` panics.
    ///
    /// # Errors
    ///
    /// [`ThemeError::ThemeNotFound`] for unknown aliases, [`ThemeError::Io`]
    /// if a directory cannot be created.
    pub fn use_theme_generator<T>(
        &mut self,
        alias: &str,
        f: impl FnOnce(&mut Self) -> T,
    ) -> Result<T> {
        let theme = self
            .registry
            .get(alias)
            .ok_or_else(|| ThemeError::not_found(alias))?;

        for dir in [theme.component_class_path(), theme.component_view_path()] {
            if !self.fs.is_dir(&dir) {
                self.fs
                    .create_dir_all(&dir)
                    .map_err(|e| ThemeError::io(&dir, e))?;
            }
        }

        let components = self.host.components();
        components.add_namespace(theme_component_namespace(&theme));
        let previous = components.set_generator_target(Some(GeneratorTarget {
            class_namespace: theme.component_class_namespace(),
            class_path: theme.component_class_path(),
            view_path: theme.component_view_path(),
        }));
        debug!(theme = theme.name(), "generator target switched to theme");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(self)));
        self.host.components().set_generator_target(previous);

        match outcome {
            Ok(value) => Ok(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Prefixes `component` with the namespace of the theme known as `alias`.
    ///
    /// Path separators become dots and an existing prefix for the same theme is
    /// not doubled: `("shop", "cart/item")` → `shop::cart.item`.
    pub fn qualify_component_name(&self, alias: &str, component: &str) -> Result<String> {
        let theme = self
            .registry
            .find(alias)
            .ok_or_else(|| ThemeError::not_found(alias))?;
        let namespace = theme.namespace_alias();

        let prefix = format!("{}::", namespace);
        let bare = component.strip_prefix(&prefix).unwrap_or(component);
        let dotted = bare.replace("::", ".").replace('/', ".");

        Ok(format!("{}{}", prefix, dotted.trim_matches('.')))
    }

    // Assets

    fn publisher(&self) -> AssetPublisher<'_> {
        AssetPublisher::new(self.fs.as_ref(), &self.config.assets)
    }

    /// Publishes the assets of the theme known as `alias`.
    pub fn publish_assets(&self, alias: &str) -> Result<PublishOutcome> {
        let theme = self
            .registry
            .find(alias)
            .ok_or_else(|| ThemeError::not_found(alias))?;
        self.publisher().publish(theme)
    }

    /// Publishes every registered theme; one failure does not stop the rest.
    pub fn publish_all_assets(&self) -> Vec<(Arc<ThemeRecord>, Result<PublishOutcome>)> {
        self.publisher().publish_all(self.registry.all())
    }

    /// Public URL of `path` within the active theme's assets.
    pub fn asset_url(&self, path: &str) -> String {
        assets::asset_url(self.active.as_deref(), path)
    }
}

impl<H: Host + std::fmt::Debug> std::fmt::Debug for ThemeManager<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeManager")
            .field("themes", &self.registry.len())
            .field("active", &self.active.as_ref().map(|t| t.slug()))
            .field("host", &self.host)
            .field("listeners", &self.listeners)
            .finish()
    }
}
