//! Theme metadata: the descriptor file and the immutable record built from it.
//!
//! - [`ThemeDescriptor`]: what a theme directory declares in its `theme.json`
//! - [`ThemeRecord`]: what the registry stores, descriptor fields plus
//!   capabilities detected on disk, with defaults applied
//!
//! ```rust
//! use themer::ThemeRecord;
//!
//! let theme = ThemeRecord::builder("Dark Mode", "/srv/app/themes/dark")
//!     .parent("default")
//!     .has_views(true)
//!     .build();
//!
//! assert_eq!(theme.slug(), "dark-mode");
//! assert_eq!(theme.asset_path(), "themes/dark-mode");
//! ```

mod descriptor;
mod record;

pub use descriptor::{Author, ThemeDescriptor};
pub use record::{
    Capabilities, ThemeRecord, ThemeRecordBuilder, DEFAULT_ASSET_PREFIX, DEFAULT_VERSION,
    PROVIDER_FILE,
};
