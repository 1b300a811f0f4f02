//! Error type shared by the library and the command line driver.

/// Result type of this crate, defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A character was looked up in a fixed alphabet that does not contain it.
  #[error("unknown symbol {0:?} for a fixed alphabet")]
  UnknownSymbol(char),

  /// Rejected input, e.g. a negative `k` or an empty pattern.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// A line of an input file could not be interpreted.
  #[error("line {line}: {reason}")]
  Parse { line: usize, reason: String },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}
