/// Error type for readme parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No line starts with the "Tested up to:" label
    #[error("no \"Tested up to:\" line found")]
    MissingLabel,

    /// The label line carries no version after the label
    #[error("\"Tested up to:\" line on line {line} has no version")]
    EmptyVersion { line: usize },
}
