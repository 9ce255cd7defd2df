use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::descriptor::{Author, ThemeDescriptor};
use crate::util::{slugify, studly};

/// Version assumed when a descriptor does not declare one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Public asset prefix used when a theme does not declare `asset_path`.
pub const DEFAULT_ASSET_PREFIX: &str = "themes";

/// Capability flags derived from a theme directory's layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// `resources/views` exists.
    pub has_views: bool,
    /// `resources/lang` or `lang` exists.
    pub has_translations: bool,
    /// `ThemeServiceProvider` source file exists at the theme root.
    pub has_provider: bool,
    /// `app/Livewire` or `resources/views/livewire` exists.
    pub has_livewire: bool,
}

/// Immutable description of one discovered theme.
///
/// Records are created once, by discovery or by loading the cache, and are
/// shared between registry aliases behind an `Arc`. Changing a theme means
/// re-discovering it.
///
/// Use [`ThemeRecord::builder`] to construct one; the builder applies the
/// defaults for slug, asset path, version and policy flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeRecord {
    name: String,
    slug: String,
    path: PathBuf,
    asset_path: String,
    #[serde(default)]
    parent: Option<String>,
    version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    authors: Vec<Author>,
    #[serde(flatten)]
    capabilities: Capabilities,
    removable: bool,
    disableable: bool,
    #[serde(default)]
    screenshots: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    config: Map<String, Value>,
}

impl ThemeRecord {
    /// Starts building a record for the theme `name` rooted at `path`.
    pub fn builder(name: impl Into<String>, path: impl Into<PathBuf>) -> ThemeRecordBuilder {
        ThemeRecordBuilder::new(name, path)
    }

    /// Builds a record from a parsed descriptor.
    ///
    /// `fallback_name` is used when the descriptor has no `name` (the
    /// directory basename for themes-root discovery, the module name for
    /// module themes).
    pub fn from_descriptor(
        descriptor: ThemeDescriptor,
        path: impl Into<PathBuf>,
        fallback_name: &str,
        capabilities: Capabilities,
    ) -> Self {
        let name = descriptor
            .name
            .unwrap_or_else(|| fallback_name.to_string());

        let mut builder = ThemeRecordBuilder::new(name, path)
            .capabilities(capabilities)
            .authors(descriptor.authors)
            .screenshots(descriptor.screenshots)
            .tags(descriptor.tags)
            .requires(descriptor.requires)
            .config(descriptor.raw);

        if let Some(slug) = descriptor.slug {
            builder = builder.slug(slug);
        }
        if let Some(asset_path) = descriptor.asset_path {
            builder = builder.asset_path(asset_path);
        }
        if let Some(parent) = descriptor.parent {
            builder = builder.parent(parent);
        }
        if let Some(version) = descriptor.version {
            builder = builder.version(version);
        }
        if let Some(description) = descriptor.description {
            builder = builder.description(description);
        }
        if let Some(author) = descriptor.author {
            builder = builder.author(author);
        }
        if let Some(removable) = descriptor.removable {
            builder = builder.removable(removable);
        }
        if let Some(disableable) = descriptor.disableable {
            builder = builder.disableable(disableable);
        }

        builder.build()
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unique, normalized identifier.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Absolute theme directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Public asset prefix, e.g. `themes/shop`.
    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// Alias of the parent theme, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn has_views(&self) -> bool {
        self.capabilities.has_views
    }

    pub fn has_translations(&self) -> bool {
        self.capabilities.has_translations
    }

    pub fn has_provider(&self) -> bool {
        self.capabilities.has_provider
    }

    pub fn has_livewire(&self) -> bool {
        self.capabilities.has_livewire
    }

    /// Whether management tooling may delete this theme.
    pub fn removable(&self) -> bool {
        self.removable
    }

    /// Whether management tooling may deactivate this theme.
    pub fn disableable(&self) -> bool {
        self.disableable
    }

    pub fn screenshots(&self) -> &[String] {
        &self.screenshots
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Modules this theme declares it depends on.
    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    /// The raw descriptor map, a superset of the typed fields.
    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Basename of the theme directory, one of the registry aliases.
    pub fn directory_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Lowercased display name, used as the translation and component namespace.
    pub fn namespace_alias(&self) -> String {
        self.name.to_lowercase()
    }

    /// StudlyCase display name, used in conventional class names.
    pub fn studly_name(&self) -> String {
        studly(&self.name)
    }

    /// `{path}/resources/views`
    pub fn views_path(&self) -> PathBuf {
        self.path.join("resources").join("views")
    }

    /// `{path}/app/Livewire`
    pub fn component_class_path(&self) -> PathBuf {
        self.path.join("app").join("Livewire")
    }

    /// `{path}/resources/views/livewire`
    pub fn component_view_path(&self) -> PathBuf {
        self.views_path().join("livewire")
    }

    /// Class namespace for this theme's components, `Theme\{Studly}\Livewire`.
    pub fn component_class_namespace(&self) -> String {
        format!("Theme\\{}\\Livewire", self.studly_name())
    }

    /// `{path}/ThemeServiceProvider.php`
    pub fn provider_path(&self) -> PathBuf {
        self.path.join(PROVIDER_FILE)
    }
}

/// File name of a theme's service provider.
pub const PROVIDER_FILE: &str = "ThemeServiceProvider.php";

/// Builder for [`ThemeRecord`] that applies the defaults explicitly.
#[derive(Debug, Clone)]
pub struct ThemeRecordBuilder {
    name: String,
    path: PathBuf,
    slug: Option<String>,
    asset_path: Option<String>,
    parent: Option<String>,
    version: Option<String>,
    description: Option<String>,
    author: Option<String>,
    authors: Vec<Author>,
    capabilities: Capabilities,
    removable: bool,
    disableable: bool,
    screenshots: Vec<String>,
    tags: Vec<String>,
    requires: Vec<String>,
    config: Map<String, Value>,
}

impl ThemeRecordBuilder {
    fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            slug: None,
            asset_path: None,
            parent: None,
            version: None,
            description: None,
            author: None,
            authors: Vec::new(),
            capabilities: Capabilities::default(),
            removable: true,
            disableable: true,
            screenshots: Vec::new(),
            tags: Vec::new(),
            requires: Vec::new(),
            config: Map::new(),
        }
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn asset_path(mut self, asset_path: impl Into<String>) -> Self {
        self.asset_path = Some(asset_path.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn authors(mut self, authors: Vec<Author>) -> Self {
        self.authors = authors;
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn has_views(mut self, yes: bool) -> Self {
        self.capabilities.has_views = yes;
        self
    }

    pub fn has_translations(mut self, yes: bool) -> Self {
        self.capabilities.has_translations = yes;
        self
    }

    pub fn has_provider(mut self, yes: bool) -> Self {
        self.capabilities.has_provider = yes;
        self
    }

    pub fn has_livewire(mut self, yes: bool) -> Self {
        self.capabilities.has_livewire = yes;
        self
    }

    pub fn removable(mut self, removable: bool) -> Self {
        self.removable = removable;
        self
    }

    pub fn disableable(mut self, disableable: bool) -> Self {
        self.disableable = disableable;
        self
    }

    pub fn screenshots(mut self, screenshots: Vec<String>) -> Self {
        self.screenshots = screenshots;
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn requires(mut self, requires: Vec<String>) -> Self {
        self.requires = requires;
        self
    }

    pub fn config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// Finalizes the record.
    ///
    /// Defaults: the slug is normalized from the name, the asset path is
    /// `themes/{slug}`, the version is [`DEFAULT_VERSION`]. Empty strings
    /// count as absent for slug and asset path.
    pub fn build(self) -> ThemeRecord {
        let slug = match self.slug {
            Some(slug) if !slug.is_empty() => slug,
            _ => slugify(&self.name),
        };
        let asset_path = match self.asset_path {
            Some(asset_path) if !asset_path.is_empty() => asset_path,
            _ => format!("{}/{}", DEFAULT_ASSET_PREFIX, slug),
        };

        ThemeRecord {
            name: self.name,
            slug,
            path: self.path,
            asset_path,
            parent: self.parent.filter(|p| !p.is_empty()),
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            description: self.description,
            author: self.author,
            authors: self.authors,
            capabilities: self.capabilities,
            removable: self.removable,
            disableable: self.disableable,
            screenshots: self.screenshots,
            tags: self.tags,
            requires: self.requires,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let theme = ThemeRecord::builder("Dark Mode", "/themes/dark").build();

        assert_eq!(theme.slug(), "dark-mode");
        assert_eq!(theme.asset_path(), "themes/dark-mode");
        assert_eq!(theme.version(), DEFAULT_VERSION);
        assert!(theme.parent().is_none());
        assert!(theme.removable());
        assert!(theme.disableable());
        assert_eq!(theme.capabilities(), Capabilities::default());
    }

    #[test]
    fn test_builder_explicit_values() {
        let theme = ThemeRecord::builder("Shop", "/themes/shop")
            .slug("storefront")
            .asset_path("static/shop")
            .parent("base")
            .version("3.0.0")
            .has_views(true)
            .removable(false)
            .build();

        assert_eq!(theme.slug(), "storefront");
        assert_eq!(theme.asset_path(), "static/shop");
        assert_eq!(theme.parent(), Some("base"));
        assert!(theme.has_views());
        assert!(!theme.has_translations());
        assert!(!theme.removable());
    }

    #[test]
    fn test_empty_strings_fall_back_to_defaults() {
        let theme = ThemeRecord::builder("Shop", "/themes/shop")
            .slug("")
            .asset_path("")
            .parent("")
            .build();

        assert_eq!(theme.slug(), "shop");
        assert_eq!(theme.asset_path(), "themes/shop");
        assert!(theme.parent().is_none());
    }

    #[test]
    fn test_derived_paths_and_names() {
        let theme = ThemeRecord::builder("Dark Mode", "/themes/dark").build();

        assert_eq!(theme.directory_name(), Some("dark"));
        assert_eq!(theme.namespace_alias(), "dark mode");
        assert_eq!(theme.studly_name(), "DarkMode");
        assert_eq!(
            theme.views_path(),
            PathBuf::from("/themes/dark/resources/views")
        );
        assert_eq!(
            theme.component_view_path(),
            PathBuf::from("/themes/dark/resources/views/livewire")
        );
        assert_eq!(theme.component_class_namespace(), "Theme\\DarkMode\\Livewire");
        assert_eq!(
            theme.provider_path(),
            PathBuf::from("/themes/dark/ThemeServiceProvider.php")
        );
    }

    #[test]
    fn test_from_descriptor_uses_fallback_name() {
        let descriptor = ThemeDescriptor::default();
        let theme =
            ThemeRecord::from_descriptor(descriptor, "/themes/plain", "plain", Capabilities::default());

        assert_eq!(theme.name(), "plain");
        assert_eq!(theme.slug(), "plain");
    }

    #[test]
    fn test_serde_round_trip_keeps_every_field() {
        let mut config = Map::new();
        config.insert("palette".into(), Value::String("warm".into()));

        let theme = ThemeRecord::builder("Shop", "/themes/shop")
            .parent("base")
            .author("Ada")
            .authors(vec![Author {
                name: "Ada".into(),
                email: None,
                role: Some("Lead".into()),
            }])
            .has_views(true)
            .has_livewire(true)
            .disableable(false)
            .screenshots(vec!["shot.png".into()])
            .tags(vec!["store".into()])
            .config(config)
            .build();

        let json = serde_json::to_string(&theme).unwrap();
        let back: ThemeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, theme);
    }
}
