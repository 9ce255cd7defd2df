//! Publishing theme assets into the public web root.
//!
//! A theme's assets live in `resources/assets`, or `assets` at the theme root.
//! Publishing makes them reachable at `{public_root}/{prefix}/{slug}`:
//!
//! - [`PublishMode::Symlink`]: a directory symlink to the source. Publishing
//!   again while the link already points at the source does nothing.
//! - [`PublishMode::Copy`]: a recursive copy over the destination. Used when
//!   symlinks are disabled in the configuration or unsupported by the platform.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AssetConfig;
use crate::error::{Result, ThemeError};
use crate::fs::Filesystem;
use crate::theme::ThemeRecord;

/// How assets reach the public root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    Symlink,
    Copy,
}

/// What a publish call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The theme has no asset directory.
    NoAssets,
    /// The destination already links to the source; nothing was touched.
    AlreadyLinked,
    Linked,
    Copied,
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PublishOutcome::NoAssets => "no assets",
            PublishOutcome::AlreadyLinked => "already linked",
            PublishOutcome::Linked => "linked",
            PublishOutcome::Copied => "copied",
        };
        f.write_str(text)
    }
}

/// Synchronizes theme asset directories into the public root.
pub struct AssetPublisher<'a> {
    fs: &'a dyn Filesystem,
    public_root: PathBuf,
    prefix: String,
    symlink: bool,
}

impl<'a> AssetPublisher<'a> {
    pub fn new(fs: &'a dyn Filesystem, config: &AssetConfig) -> Self {
        Self {
            fs,
            public_root: config.public_root.clone(),
            prefix: config.path.clone(),
            symlink: config.symlink,
        }
    }

    /// The mode publishing will use on this filesystem.
    pub fn mode(&self) -> PublishMode {
        if self.symlink && self.fs.supports_symlinks() {
            PublishMode::Symlink
        } else {
            PublishMode::Copy
        }
    }

    /// The theme's asset directory, if it has one.
    pub fn source_dir(&self, theme: &ThemeRecord) -> Option<PathBuf> {
        [
            theme.path().join("resources").join("assets"),
            theme.path().join("assets"),
        ]
        .into_iter()
        .find(|p| self.fs.is_dir(p))
    }

    /// `{public_root}/{prefix}/{slug}`
    pub fn destination(&self, theme: &ThemeRecord) -> PathBuf {
        self.public_root.join(&self.prefix).join(theme.slug())
    }

    /// Publishes one theme's assets.
    pub fn publish(&self, theme: &ThemeRecord) -> Result<PublishOutcome> {
        let Some(source) = self.source_dir(theme) else {
            debug!(theme = theme.name(), "no assets to publish");
            return Ok(PublishOutcome::NoAssets);
        };
        let destination = self.destination(theme);

        match self.mode() {
            PublishMode::Symlink => {
                if self.links_to(&destination, &source) {
                    return Ok(PublishOutcome::AlreadyLinked);
                }
                self.prepare(&destination)?;
                self.fs
                    .symlink_dir(&source, &destination)
                    .map_err(|e| ThemeError::io(&destination, e))?;
                info!(theme = theme.name(), destination = %destination.display(), "linked theme assets");
                Ok(PublishOutcome::Linked)
            }
            PublishMode::Copy => {
                // Copying through a stale link would write into its target.
                if self.fs.is_symlink(&destination) {
                    self.prepare(&destination)?;
                } else if let Some(parent) = destination.parent() {
                    self.fs
                        .create_dir_all(parent)
                        .map_err(|e| ThemeError::io(parent, e))?;
                }
                self.fs
                    .copy_dir(&source, &destination)
                    .map_err(|e| ThemeError::io(&destination, e))?;
                info!(theme = theme.name(), destination = %destination.display(), "copied theme assets");
                Ok(PublishOutcome::Copied)
            }
        }
    }

    /// Publishes every theme, isolating failures per theme.
    pub fn publish_all<'t>(
        &self,
        themes: impl IntoIterator<Item = &'t Arc<ThemeRecord>>,
    ) -> Vec<(Arc<ThemeRecord>, Result<PublishOutcome>)> {
        themes
            .into_iter()
            .map(|theme| {
                let outcome = self.publish(theme);
                if let Err(error) = &outcome {
                    warn!(theme = theme.name(), %error, "failed to publish theme assets");
                }
                (Arc::clone(theme), outcome)
            })
            .collect()
    }

    fn links_to(&self, link: &Path, source: &Path) -> bool {
        self.fs.is_symlink(link) && self.fs.read_link(link).is_ok_and(|target| target == source)
    }

    /// Clears whatever occupies `destination` and creates its parent.
    fn prepare(&self, destination: &Path) -> Result<()> {
        let removed = if self.fs.is_symlink(destination) || self.fs.is_file(destination) {
            self.fs.remove_file(destination)
        } else if self.fs.is_dir(destination) {
            self.fs.remove_dir_all(destination)
        } else {
            Ok(())
        };
        removed.map_err(|e| ThemeError::io(destination, e))?;

        if let Some(parent) = destination.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| ThemeError::io(parent, e))?;
        }
        Ok(())
    }
}

/// Public URL of `path` inside the active theme's assets.
///
/// Without an active theme the path is returned unchanged.
pub fn asset_url(active: Option<&ThemeRecord>, path: &str) -> String {
    let path = path.trim_start_matches('/');
    match active {
        Some(theme) => format!("{}/{}", theme.asset_path().trim_end_matches('/'), path),
        None => path.to_string(),
    }
}
