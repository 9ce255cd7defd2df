//! Theme discovery: walking theme roots or loading the discovery cache.
//!
//! # Sources
//!
//! - [`ThemeSource::Root`]: every immediate subdirectory of the root that
//!   contains a descriptor (`theme.json` by default) is a theme. The theme
//!   name defaults to the directory basename.
//! - [`ThemeSource::Module`]: a module may ship one theme at
//!   `{module}/resources/theme`. Its name defaults to the module name.
//!
//! # Failure Policy
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | root missing | source ignored |
//! | directory without descriptor | directory ignored |
//! | descriptor unreadable or not a JSON object | theme skipped, recorded in [`ScanReport::skipped`] |
//! | two themes with the same slug | whole scan aborted with [`ThemeError::SlugCollision`] |
//!
//! A scan builds and validates the complete batch before touching the
//! registry, so a slug collision registers nothing from that batch.
//!
//! # Cache
//!
//! [`discover`] first tries the cache artifact (see [`crate::cache`]) unless
//! the configuration disables it. A cache that fails to decode is logged and
//! replaced by a fresh scan of the same sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::ThemeCache;
use crate::config::ThemerConfig;
use crate::error::{Result, ThemeError};
use crate::fs::Filesystem;
use crate::registry::ThemeRegistry;
use crate::theme::{Capabilities, ThemeDescriptor, ThemeRecord, PROVIDER_FILE};

/// Directory inside a module that holds its theme.
pub const MODULE_THEME_DIR: &str = "resources/theme";

/// Where themes are discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSource {
    /// A directory whose immediate subdirectories are themes.
    Root(PathBuf),
    /// A module that may contain a theme under [`MODULE_THEME_DIR`].
    Module { name: String, path: PathBuf },
}

impl ThemeSource {
    /// Sources described by a configuration, in scan order.
    pub fn from_config(config: &ThemerConfig) -> Vec<ThemeSource> {
        config
            .theme_roots()
            .map(|root| ThemeSource::Root(root.to_path_buf()))
            .chain(config.modules.iter().map(|m| ThemeSource::Module {
                name: m.name.clone(),
                path: m.path.clone(),
            }))
            .collect()
    }
}

/// A theme directory that was passed over during a scan.
#[derive(Debug)]
pub struct SkippedTheme {
    pub directory: PathBuf,
    pub error: ThemeError,
}

/// Outcome of a discovery pass.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Themes registered by this pass, in scan order.
    pub registered: Vec<Arc<ThemeRecord>>,
    /// Directories skipped because of local failures.
    pub skipped: Vec<SkippedTheme>,
    /// True if the themes came from the cache artifact.
    pub from_cache: bool,
}

/// Reads theme directories into [`ThemeRecord`]s.
pub struct ThemeScanner<'a> {
    fs: &'a dyn Filesystem,
    filename: String,
}

impl<'a> ThemeScanner<'a> {
    pub fn new(fs: &'a dyn Filesystem, filename: impl Into<String>) -> Self {
        Self {
            fs,
            filename: filename.into(),
        }
    }

    /// Derives capability flags from the directory layout.
    pub fn detect_capabilities(&self, dir: &Path) -> Capabilities {
        let views = dir.join("resources").join("views");
        Capabilities {
            has_views: self.fs.is_dir(&views),
            has_translations: self.fs.is_dir(&dir.join("resources").join("lang"))
                || self.fs.is_dir(&dir.join("lang")),
            has_provider: self.fs.is_file(&dir.join(PROVIDER_FILE)),
            has_livewire: self.fs.is_dir(&dir.join("app").join("Livewire"))
                || self.fs.is_dir(&views.join("livewire")),
        }
    }

    /// Reads the theme in `dir`.
    ///
    /// Returns `Ok(None)` when the directory has no descriptor.
    ///
    /// # Errors
    ///
    /// [`ThemeError::Io`] if the descriptor cannot be read,
    /// [`ThemeError::InvalidThemeConfig`] if it cannot be parsed.
    pub fn read_theme(&self, dir: &Path, fallback_name: &str) -> Result<Option<ThemeRecord>> {
        let descriptor_path = dir.join(&self.filename);
        if !self.fs.is_file(&descriptor_path) {
            return Ok(None);
        }

        let content = self
            .fs
            .read_to_string(&descriptor_path)
            .map_err(|e| ThemeError::io(&descriptor_path, e))?;
        let descriptor = ThemeDescriptor::parse(&content, &descriptor_path)?;
        let capabilities = self.detect_capabilities(dir);

        Ok(Some(ThemeRecord::from_descriptor(
            descriptor,
            dir,
            fallback_name,
            capabilities,
        )))
    }

    /// Scans every source and returns the validated batch.
    ///
    /// # Errors
    ///
    /// [`ThemeError::SlugCollision`] if two themes in the batch share a slug.
    pub fn scan(&self, sources: &[ThemeSource]) -> Result<(Vec<ThemeRecord>, Vec<SkippedTheme>)> {
        let mut themes: Vec<ThemeRecord> = Vec::new();
        let mut skipped = Vec::new();
        let mut slugs: HashMap<String, usize> = HashMap::new();

        for (dir, fallback_name) in self.candidate_dirs(sources, &mut skipped) {
            let theme = match self.read_theme(&dir, &fallback_name) {
                Ok(Some(theme)) => theme,
                Ok(None) => continue,
                Err(error) => {
                    warn!(directory = %dir.display(), %error, "skipping theme");
                    skipped.push(SkippedTheme {
                        directory: dir,
                        error,
                    });
                    continue;
                }
            };

            if let Some(&index) = slugs.get(theme.slug()) {
                return Err(ThemeError::SlugCollision {
                    slug: theme.slug().to_string(),
                    existing: themes[index].name().to_string(),
                    conflicting: theme.name().to_string(),
                });
            }

            debug!(theme = theme.name(), slug = theme.slug(), "discovered theme");
            slugs.insert(theme.slug().to_string(), themes.len());
            themes.push(theme);
        }

        Ok((themes, skipped))
    }

    /// Expands sources into `(theme directory, fallback name)` pairs.
    fn candidate_dirs(
        &self,
        sources: &[ThemeSource],
        skipped: &mut Vec<SkippedTheme>,
    ) -> Vec<(PathBuf, String)> {
        let mut candidates = Vec::new();

        for source in sources {
            match source {
                ThemeSource::Root(root) => {
                    if !self.fs.is_dir(root) {
                        debug!(root = %root.display(), "theme root does not exist");
                        continue;
                    }
                    match self.fs.list_dirs(root) {
                        Ok(dirs) => candidates.extend(dirs.into_iter().map(|dir| {
                            let name = dir
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_default();
                            (dir, name)
                        })),
                        Err(e) => {
                            warn!(root = %root.display(), error = %e, "cannot list theme root");
                            skipped.push(SkippedTheme {
                                directory: root.clone(),
                                error: ThemeError::io(root, e),
                            });
                        }
                    }
                }
                ThemeSource::Module { name, path } => {
                    candidates.push((path.join(MODULE_THEME_DIR), name.clone()));
                }
            }
        }

        candidates
    }
}

/// Scans `sources` and registers the batch into `registry`.
///
/// Nothing is registered if the scan fails.
pub fn scan_into(
    registry: &mut ThemeRegistry,
    fs: &dyn Filesystem,
    filename: &str,
    sources: &[ThemeSource],
) -> Result<ScanReport> {
    let (themes, skipped) = ThemeScanner::new(fs, filename).scan(sources)?;
    let registered = themes.into_iter().map(|t| registry.register(t)).collect();

    Ok(ScanReport {
        registered,
        skipped,
        from_cache: false,
    })
}

/// Populates `registry` from the cache artifact or a fresh scan.
pub fn discover(
    registry: &mut ThemeRegistry,
    fs: &dyn Filesystem,
    config: &ThemerConfig,
) -> Result<ScanReport> {
    if config.discovery.use_cache {
        let cache = ThemeCache::new(&config.cache_path, fs);
        if cache.exists() {
            match cache.load() {
                Ok(themes) => {
                    info!(path = %config.cache_path.display(), count = themes.len(), "loaded themes from cache");
                    let registered = themes.into_iter().map(|t| registry.register(t)).collect();
                    return Ok(ScanReport {
                        registered,
                        skipped: Vec::new(),
                        from_cache: true,
                    });
                }
                Err(error) => {
                    warn!(%error, "theme cache unusable, scanning instead");
                }
            }
        }
    }

    let report = scan_into(
        registry,
        fs,
        &config.discovery.filename,
        &ThemeSource::from_config(config),
    )?;
    info!(
        count = report.registered.len(),
        skipped = report.skipped.len(),
        "scanned theme directories"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFilesystem;
    use std::fs;
    use tempfile::TempDir;

    fn write_theme(root: &Path, dir: &str, json: &str) -> PathBuf {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("theme.json"), json).unwrap();
        path
    }

    fn scan(root: &Path) -> Result<(Vec<ThemeRecord>, Vec<SkippedTheme>)> {
        ThemeScanner::new(&LocalFilesystem, "theme.json")
            .scan(&[ThemeSource::Root(root.to_path_buf())])
    }

    #[test]
    fn test_scan_reads_descriptors_in_directory_order() {
        let tmp = TempDir::new().unwrap();
        write_theme(tmp.path(), "b-theme", r#"{"name": "Beta"}"#);
        write_theme(tmp.path(), "a-theme", r#"{"name": "Alpha", "parent": "beta"}"#);

        let (themes, skipped) = scan(tmp.path()).unwrap();
        let names: Vec<&str> = themes.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(themes[0].parent(), Some("beta"));
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_directory_without_descriptor_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("not-a-theme")).unwrap();
        write_theme(tmp.path(), "real", r#"{"name": "Real"}"#);

        let (themes, skipped) = scan(tmp.path()).unwrap();
        assert_eq!(themes.len(), 1);
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_malformed_descriptor_skips_only_that_theme() {
        let tmp = TempDir::new().unwrap();
        write_theme(tmp.path(), "broken", r#"{"name": "#);
        write_theme(tmp.path(), "list", r#"[1, 2]"#);
        write_theme(tmp.path(), "good", r#"{"name": "Good"}"#);

        let (themes, skipped) = scan(tmp.path()).unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].name(), "Good");
        assert_eq!(skipped.len(), 2);
        assert!(skipped
            .iter()
            .all(|s| matches!(s.error, ThemeError::InvalidThemeConfig { .. })));
    }

    #[test]
    fn test_name_defaults_to_directory_and_slug_to_name() {
        let tmp = TempDir::new().unwrap();
        write_theme(tmp.path(), "Night Sky", r#"{}"#);

        let (themes, _) = scan(tmp.path()).unwrap();
        assert_eq!(themes[0].name(), "Night Sky");
        assert_eq!(themes[0].slug(), "night-sky");
        assert_eq!(themes[0].version(), "1.0.0");
    }

    #[test]
    fn test_capabilities_detected() {
        let tmp = TempDir::new().unwrap();
        let dir = write_theme(tmp.path(), "full", r#"{"name": "Full"}"#);
        fs::create_dir_all(dir.join("resources/views/livewire")).unwrap();
        fs::create_dir_all(dir.join("lang")).unwrap();
        fs::write(dir.join("ThemeServiceProvider.php"), "<?php").unwrap();
        write_theme(tmp.path(), "bare", r#"{"name": "Bare"}"#);

        let (themes, _) = scan(tmp.path()).unwrap();
        let bare = themes.iter().find(|t| t.name() == "Bare").unwrap();
        let full = themes.iter().find(|t| t.name() == "Full").unwrap();

        assert_eq!(bare.capabilities(), Capabilities::default());
        assert_eq!(
            full.capabilities(),
            Capabilities {
                has_views: true,
                has_translations: true,
                has_provider: true,
                has_livewire: true,
            }
        );
    }

    #[test]
    fn test_slug_collision_aborts_and_registers_nothing() {
        let tmp = TempDir::new().unwrap();
        write_theme(tmp.path(), "one", r#"{"name": "Shop"}"#);
        write_theme(tmp.path(), "two", r#"{"name": "Shop Two", "slug": "shop"}"#);
        write_theme(tmp.path(), "zzz", r#"{"name": "Other"}"#);

        let mut registry = ThemeRegistry::new();
        let err = scan_into(
            &mut registry,
            &LocalFilesystem,
            "theme.json",
            &[ThemeSource::Root(tmp.path().to_path_buf())],
        )
        .unwrap_err();

        match err {
            ThemeError::SlugCollision {
                slug,
                existing,
                conflicting,
            } => {
                assert_eq!(slug, "shop");
                assert_eq!(existing, "Shop");
                assert_eq!(conflicting, "Shop Two");
            }
            other => panic!("expected slug collision, got {:?}", other),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_root_is_not_an_error() {
        let (themes, skipped) = scan(Path::new("/definitely/not/here")).unwrap();
        assert!(themes.is_empty());
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_module_theme_uses_module_name() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("modules/Blog");
        let theme_dir = module.join(MODULE_THEME_DIR);
        fs::create_dir_all(&theme_dir).unwrap();
        fs::write(theme_dir.join("theme.json"), r#"{"parent": "default"}"#).unwrap();

        let (themes, _) = ThemeScanner::new(&LocalFilesystem, "theme.json")
            .scan(&[ThemeSource::Module {
                name: "Blog".into(),
                path: module.clone(),
            }])
            .unwrap();

        assert_eq!(themes[0].name(), "Blog");
        assert_eq!(themes[0].path(), theme_dir.as_path());
    }

    #[test]
    fn test_custom_descriptor_filename() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("custom");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("skin.json"), r#"{"name": "Custom"}"#).unwrap();

        let (themes, _) = ThemeScanner::new(&LocalFilesystem, "skin.json")
            .scan(&[ThemeSource::Root(tmp.path().to_path_buf())])
            .unwrap();
        assert_eq!(themes.len(), 1);
    }
}
