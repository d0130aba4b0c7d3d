//! Shared test utilities

pub mod github;

pub use github::{FakeGitHub, FixedSource, readme_with};
