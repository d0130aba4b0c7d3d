//! Latest WordPress version lookup and staleness evaluation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────┐
//! │ LatestVersion   │────▶│  Staleness  │◀──── declared version (parser)
//! │ Source (fetch)  │     │  (compare)  │
//! └─────────────────┘     └─────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    WordPress    │
//! │  stable-check   │
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`source`]: Trait for fetching the latest version from a remote source
//! - [`wordpress`]: api.wordpress.org stable-check implementation
//! - [`staleness`]: Prefix comparison between declared and latest versions
//! - [`error`]: Error types for fetch operations

pub mod error;
pub mod source;
pub mod staleness;
pub mod wordpress;

pub use error::FetchError;
pub use source::LatestVersionSource;
pub use staleness::{Staleness, evaluate, is_stale};
pub use wordpress::WordPressVersionSource;
