//! Error types for theme discovery and activation.
//!
//! [`ThemeError`] covers every failure the core can surface. Which of them are
//! fatal depends on where they occur:
//!
//! - [`ThemeError::ThemeNotFound`] is always returned to the caller of
//!   activation or generator setup.
//! - [`ThemeError::InvalidThemeConfig`] is local to one theme directory. A scan
//!   records it in its report and carries on with the sibling directories.
//! - [`ThemeError::SlugCollision`] aborts the whole discovery pass.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ThemeError>;

/// Error type for theme registry, discovery, cache and publishing operations.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// No registered theme answers to the requested name, slug or directory.
    #[error("Theme [{name}] not found.")]
    ThemeNotFound {
        /// The alias that was requested.
        name: String,
    },

    /// A descriptor exists but cannot be used as a theme definition.
    #[error("The configuration for theme at {} is invalid: {message}", path.display())]
    InvalidThemeConfig {
        /// Path of the offending descriptor file.
        path: PathBuf,
        /// Parser or validation message.
        message: String,
    },

    /// Two themes discovered in the same pass resolve to the same slug.
    #[error(
        "Theme slug '{slug}' is already in use by theme '{existing}' (conflicting theme '{conflicting}'). Each theme must have a unique slug."
    )]
    SlugCollision {
        /// The colliding slug.
        slug: String,
        /// Name of the theme that claimed the slug first.
        existing: String,
        /// Name of the theme that tried to claim it again.
        conflicting: String,
    },

    /// The discovery cache could not be read or decoded.
    #[error("Failed to load theme cache {}: {message}", path.display())]
    Cache {
        /// Location of the cache artifact.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// A configuration file could not be parsed.
    #[error("Failed to parse themer configuration{}: {message}", config_location(path))]
    Config {
        /// Location of the configuration file; empty when parsed from a string.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Filesystem failure while reading descriptors, writing the cache or publishing assets.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl ThemeError {
    /// Creates a [`ThemeError::ThemeNotFound`] for the given alias.
    pub fn not_found(name: impl Into<String>) -> Self {
        ThemeError::ThemeNotFound { name: name.into() }
    }

    /// Wraps an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ThemeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that should abort a discovery pass.
    pub fn is_fatal_for_scan(&self) -> bool {
        matches!(self, ThemeError::SlugCollision { .. })
    }
}

fn config_location(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        String::new()
    } else {
        format!(" {}", path.display())
    }
}
