//! Error types returned by the engines and the facade.
use thiserror::Error;

/// Error type for mdsafe operations.
///
/// The type is `Clone` so that a failed construction of a shared default
/// engine can be memoized and handed to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkdownError {
  /// An engine could not be built from the resolved options.
  #[error("Invalid engine option `{option}`: {reason}")]
  Configuration {
    option: &'static str,
    reason: String,
  },

  /// An engine rejected its input or failed while producing output.
  #[error("Conversion failed: {0}")]
  Conversion(String),
}

/// Result type for mdsafe operations.
pub type Result<T> = std::result::Result<T, MarkdownError>;
