//! Plugin readme parser
//!
//! WordPress plugin readmes declare the newest WordPress release they were
//! tested against in a header line:
//!
//! ```text
//! === My Plugin ===
//! Requires at least: 5.0
//! Tested up to: 6.4
//! Stable tag: 1.2.0
//! ```
//!
//! Only the first `Tested up to:` line counts. If that line is broken the
//! readme is rejected even when a later line would parse.

use regex::Regex;

use crate::parser::error::ParseError;

/// Label that starts the declared version line (case-sensitive)
pub const TESTED_UP_TO_LABEL: &str = "Tested up to:";

/// Parser for the "Tested up to" header of a plugin readme
pub struct ReadmeParser {
    /// Runs of characters that are neither whitespace nor a colon
    token_re: Regex,
}

impl ReadmeParser {
    pub fn new() -> Self {
        Self {
            token_re: Regex::new(r"[^:\s]+").unwrap(),
        }
    }

    /// Extract the declared version from the readme content.
    ///
    /// The version is the last token after the label, so trailing notes
    /// like `Tested up to: WordPress 6.4` still yield `6.4`.
    pub fn parse(&self, content: &str) -> Result<String, ParseError> {
        let (line_num, line) = content
            .lines()
            .enumerate()
            .find(|(_, line)| line.starts_with(TESTED_UP_TO_LABEL))
            .ok_or(ParseError::MissingLabel)?;

        let rest = &line[TESTED_UP_TO_LABEL.len()..];

        self.token_re
            .find_iter(rest)
            .last()
            .map(|m| m.as_str().to_string())
            .ok_or(ParseError::EmptyVersion { line: line_num + 1 })
    }
}

impl Default for ReadmeParser {
    fn default() -> Self {
        Self::new()
    }
}
