//! Staleness check between a declared and the latest version
//!
//! Comparison is a plain string prefix match. A declared "6.4" covers a
//! latest "6.4.2", and "6" covers every 6.x release. Nothing is parsed or
//! padded, so "6.10" does not cover "6.1".

/// Result of comparing a declared version against the latest one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// The latest version starts with the declared version
    Current,
    /// The declared version lags the latest version
    Stale,
}

/// Returns true when `latest` does not start with `declared`
pub fn is_stale(declared: &str, latest: &str) -> bool {
    !latest.starts_with(declared)
}

/// Compare a declared version against the latest version
pub fn evaluate(declared: &str, latest: &str) -> Staleness {
    if is_stale(declared, latest) {
        Staleness::Stale
    } else {
        Staleness::Current
    }
}
