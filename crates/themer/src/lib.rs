//! # Themer - Theme Registry and Resolution Engine
//!
//! Themer discovers theme packages on disk, tracks an active theme with
//! parent-child inheritance, and composes the search paths a web framework
//! needs to render themed views, translations, components and assets. It
//! resolves names and builds path lists; rendering, bundling and the
//! filesystem itself belong to the host.
//!
//! ## Core Concepts
//!
//! - [`ThemeRecord`]: immutable metadata of one theme, built from its `theme.json`
//! - [`ThemeRegistry`]: every known theme, reachable by name, slug or directory
//! - [`inheritance`]: parent chains, nearest-first, and integrity checks
//! - [`ThemeManager`]: activation, scoped switches, component fallback, boot
//! - [`Host`]: the framework collaborators paths are registered with
//! - [`AssetPublisher`]: symlink-or-copy of theme assets into the public root
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use themer::{RecordingHost, ThemeManager, ThemerConfig};
//!
//! let config = ThemerConfig::from_path("config/themer.yaml")?
//!     .with_env_overrides()
//!     .with_base_path("/srv/app");
//!
//! let mut manager = ThemeManager::new(config, RecordingHost::new());
//! let report = manager.boot()?;
//! for skipped in &report.skipped {
//!     eprintln!("skipped {}: {}", skipped.directory.display(), skipped.error);
//! }
//!
//! if let Some(theme) = manager.active() {
//!     println!("active theme: {}", theme.name());
//! }
//! # Ok::<(), themer::ThemeError>(())
//! ```
//!
//! ## Theme Layout
//!
//! ```text
//! themes/dark/
//! ├── theme.json                  {"name": "Dark", "parent": "default"}
//! ├── ThemeServiceProvider.php    optional provider
//! ├── app/Livewire/               component classes
//! ├── lang/ or resources/lang/    translations
//! └── resources/
//!     ├── assets/                 published to public/themes/dark
//!     └── views/
//!         ├── components/
//!         ├── layouts/
//!         └── livewire/pages/
//! ```
//!
//! ## Scoped Switching
//!
//! ```rust
//! use themer::{RecordingHost, ThemeManager, ThemeRecord, ThemerConfig};
//!
//! let mut manager = ThemeManager::new(ThemerConfig::default(), RecordingHost::new());
//! manager.register(ThemeRecord::builder("Default", "/srv/themes/default").build());
//! manager.register(ThemeRecord::builder("Mail", "/srv/themes/mail").build());
//! manager.set("default")?;
//!
//! let rendered_with = manager.for_theme("mail", |m| m.active().map(|t| t.slug().to_string()))?;
//! assert_eq!(rendered_with.as_deref(), Some("mail"));
//! assert!(manager.is_active("default"));
//! # Ok::<(), themer::ThemeError>(())
//! ```

pub mod assets;
pub mod cache;
pub mod components;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod fs;
pub mod host;
pub mod inheritance;
pub mod manager;
pub mod registry;
pub mod resources;
pub mod theme;
pub mod util;

// Theme metadata
pub use theme::{Author, Capabilities, ThemeDescriptor, ThemeRecord, ThemeRecordBuilder};

// Registry and discovery
pub use cache::ThemeCache;
pub use discovery::{ScanReport, SkippedTheme, ThemeScanner, ThemeSource};
pub use registry::ThemeRegistry;

// Inheritance
pub use inheritance::{check_integrity, IntegrityIssue, IntegrityReport, Severity};

// Activation
pub use events::{ThemeEvent, ThemeListeners};
pub use manager::ThemeManager;

// Resolution and host integration
pub use components::{ComponentResolver, FallbackState};
pub use host::{
    ComponentNamespace, ComponentRegistrar, GeneratorTarget, Host, MissingComponentHandler,
    RecordingHost, ServiceContainer, TranslationRegistrar, ViewRegistrar,
};
pub use resources::{ResolvedResources, ResourceResolver};

// Assets
pub use assets::{asset_url, AssetPublisher, PublishMode, PublishOutcome};

// Configuration, errors, filesystem
pub use config::ThemerConfig;
pub use error::{Result, ThemeError};
pub use fs::{Filesystem, LocalFilesystem};
