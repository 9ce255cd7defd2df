//! Themer configuration.
//!
//! Every field has a default, so an empty document is a valid configuration.
//! Configuration can be written in YAML or JSON:
//!
//! ```yaml
//! themes_path: themes
//! active: shop
//! assets:
//!   path: themes
//!   symlink: false
//! auto_namespaces:
//!   layouts: resources/views/layouts
//!   pages: resources/views/livewire/pages
//! ```
//!
//! Two environment variables override file values when
//! [`ThemerConfig::with_env_overrides`] is applied:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `THEME` | `active` |
//! | `THEMER_SYMLINK` | `assets.symlink` (`1/true/yes/on` or `0/false/no/off`) |

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThemeError};

/// Environment variable overriding [`ThemerConfig::active`].
pub const ENV_ACTIVE_THEME: &str = "THEME";

/// Environment variable overriding [`AssetConfig::symlink`].
pub const ENV_SYMLINK: &str = "THEMER_SYMLINK";

/// Recognized configuration file extensions.
pub const CONFIG_EXTENSIONS: &[&str] = &[".yaml", ".yml", ".json"];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemerConfig {
    /// Directory whose immediate subdirectories are themes.
    pub themes_path: PathBuf,
    /// Additional theme roots, scanned after `themes_path`.
    pub extra_paths: Vec<PathBuf>,
    /// Modules that may ship a theme under `resources/theme`.
    pub modules: Vec<ModuleTheme>,
    /// Theme activated at boot. Empty disables boot activation.
    pub active: String,
    pub assets: AssetConfig,
    pub discovery: DiscoveryConfig,
    /// Short namespace → theme-relative directory.
    pub auto_namespaces: IndexMap<String, String>,
    /// Location of the discovery cache artifact.
    pub cache_path: PathBuf,
    /// Host application resources root, probed by the component fallback.
    pub app_resources_path: PathBuf,
}

impl Default for ThemerConfig {
    fn default() -> Self {
        let mut auto_namespaces = IndexMap::new();
        auto_namespaces.insert("layouts".to_string(), "resources/views/layouts".to_string());
        auto_namespaces.insert(
            "pages".to_string(),
            "resources/views/livewire/pages".to_string(),
        );

        Self {
            themes_path: PathBuf::from("themes"),
            extra_paths: Vec::new(),
            modules: Vec::new(),
            active: "default".to_string(),
            assets: AssetConfig::default(),
            discovery: DiscoveryConfig::default(),
            auto_namespaces,
            cache_path: PathBuf::from("bootstrap/cache/themes.json"),
            app_resources_path: PathBuf::from("resources"),
        }
    }
}

/// Asset publishing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Public URL prefix; assets land in `{public_root}/{path}/{slug}`.
    pub path: String,
    pub public_root: PathBuf,
    pub publish_on_activate: bool,
    /// Symlink assets instead of copying them.
    pub symlink: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            path: "themes".to_string(),
            public_root: PathBuf::from("public"),
            publish_on_activate: true,
            symlink: true,
        }
    }
}

/// Discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Descriptor file name looked up in each theme directory.
    pub filename: String,
    /// Load from the cache artifact when present. `false` forces fresh scans.
    pub use_cache: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            filename: "theme.json".to_string(),
            use_cache: true,
        }
    }
}

/// A module that may contain a theme at `{path}/resources/theme`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTheme {
    pub name: String,
    pub path: PathBuf,
}

impl ThemerConfig {
    /// Parses YAML configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ThemeError::Config {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Parses JSON configuration.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ThemeError::Config {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Reads a configuration file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// [`ThemeError::Io`] if the file cannot be read, [`ThemeError::Config`]
    /// if it cannot be parsed or has an unrecognized extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ThemeError::io(path, e))?;
        let name = path.to_string_lossy();

        let parsed = if name.ends_with(".json") {
            Self::from_json(&content)
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            Self::from_yaml(&content)
        } else {
            return Err(ThemeError::Config {
                path: path.to_path_buf(),
                message: format!(
                    "unrecognized extension, expected one of {}",
                    CONFIG_EXTENSIONS.join(", ")
                ),
            });
        };

        parsed.map_err(|e| match e {
            ThemeError::Config { message, .. } => ThemeError::Config {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Applies `THEME` and `THEMER_SYMLINK` from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(active) = std::env::var(ENV_ACTIVE_THEME) {
            self.active = active;
        }
        if let Some(symlink) = std::env::var(ENV_SYMLINK).ok().as_deref().and_then(parse_flag) {
            self.assets.symlink = symlink;
        }
        self
    }

    /// Anchors every relative path at `base`.
    pub fn with_base_path(mut self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let anchor = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        anchor(&mut self.themes_path);
        self.extra_paths.iter_mut().for_each(anchor);
        self.modules.iter_mut().for_each(|m| anchor(&mut m.path));
        anchor(&mut self.assets.public_root);
        anchor(&mut self.cache_path);
        anchor(&mut self.app_resources_path);
        self
    }

    /// All theme roots in scan order.
    pub fn theme_roots(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.themes_path.as_path()).chain(self.extra_paths.iter().map(|p| p.as_path()))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = ThemerConfig::default();
        assert_eq!(config.themes_path, PathBuf::from("themes"));
        assert_eq!(config.active, "default");
        assert!(config.assets.symlink);
        assert!(config.assets.publish_on_activate);
        assert_eq!(config.discovery.filename, "theme.json");
        let keys: Vec<&str> = config.auto_namespaces.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["layouts", "pages"]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ThemerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ThemerConfig::default());
    }

    #[test]
    fn test_yaml_partial_override() {
        let config = ThemerConfig::from_yaml(
            r#"
            active: shop
            assets:
              symlink: false
            auto_namespaces:
              partials: resources/views/partials
            "#,
        )
        .unwrap();

        assert_eq!(config.active, "shop");
        assert!(!config.assets.symlink);
        assert_eq!(config.assets.path, "themes");
        assert_eq!(config.auto_namespaces.len(), 1);
        assert_eq!(config.auto_namespaces["partials"], "resources/views/partials");
    }

    #[test]
    fn test_json_modules() {
        let config = ThemerConfig::from_json(
            r#"{"modules": [{"name": "Blog", "path": "modules/Blog"}]}"#,
        )
        .unwrap();
        assert_eq!(config.modules[0].name, "Blog");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ThemerConfig::from_yaml("active: [unclosed").unwrap_err();
        assert!(matches!(err, ThemeError::Config { .. }));
        assert!(err
            .to_string()
            .starts_with("Failed to parse themer configuration: "));
    }

    #[test]
    fn test_from_path_by_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let yaml = tmp.path().join("themer.yaml");
        std::fs::write(&yaml, "active: dark").unwrap();
        let toml = tmp.path().join("themer.toml");
        std::fs::write(&toml, "active = 'dark'").unwrap();

        assert_eq!(ThemerConfig::from_path(&yaml).unwrap().active, "dark");
        assert!(matches!(
            ThemerConfig::from_path(&toml),
            Err(ThemeError::Config { .. })
        ));
        assert!(matches!(
            ThemerConfig::from_path(tmp.path().join("missing.yaml")),
            Err(ThemeError::Io { .. })
        ));
    }

    #[test]
    fn test_with_base_path_anchors_relative_only() {
        let mut config = ThemerConfig::default();
        config.extra_paths.push(PathBuf::from("/abs/themes"));
        let config = config.with_base_path("/srv/app");

        assert_eq!(config.themes_path, PathBuf::from("/srv/app/themes"));
        assert_eq!(config.extra_paths[0], PathBuf::from("/abs/themes"));
        assert_eq!(
            config.cache_path,
            PathBuf::from("/srv/app/bootstrap/cache/themes.json")
        );
        let roots: Vec<&Path> = config.theme_roots().collect();
        assert_eq!(roots.len(), 2);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var(ENV_ACTIVE_THEME, "branded");
        std::env::set_var(ENV_SYMLINK, "off");
        let config = ThemerConfig::default().with_env_overrides();
        std::env::remove_var(ENV_ACTIVE_THEME);
        std::env::remove_var(ENV_SYMLINK);

        assert_eq!(config.active, "branded");
        assert!(!config.assets.symlink);
    }

    #[test]
    #[serial]
    fn test_env_overrides_ignore_garbage_flag() {
        std::env::remove_var(ENV_ACTIVE_THEME);
        std::env::set_var(ENV_SYMLINK, "maybe");
        let config = ThemerConfig::default().with_env_overrides();
        std::env::remove_var(ENV_SYMLINK);

        assert_eq!(config.active, "default");
        assert!(config.assets.symlink);
    }
}
