//! Plugin readme parsing
//!
//! # Modules
//!
//! - [`readme`]: Extracts the "Tested up to" version from a plugin readme
//! - [`error`]: Parse error type

pub mod error;
pub mod readme;

pub use error::ParseError;
pub use readme::{ReadmeParser, TESTED_UP_TO_LABEL};
