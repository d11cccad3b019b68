//! Error types for the gleaner library.
//!
//! Two layers live here:
//!
//! - [`GleanerError`], the crate-wide error with a [`Result`] alias. Only
//!   [`GleanerError::Configuration`] is fatal to a run.
//! - Tagged per-item failures ([`SearchError`], [`FetchFailed`], [`MergeSkipped`]). These are
//!   returned as values from the per-item operations and branched on by the caller; they never stop
//!   a run.
//!
//! # Examples
//!
//! ```
//! use gleaner::{config::Settings, error::GleanerError};
//!
//! let settings = Settings::default().with_keyword_groups(["laugh humor", " "]);
//! match settings.validate() {
//!   Err(GleanerError::Configuration(msg)) => println!("Cannot start: {msg}"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(groups) => println!("{} groups", groups.len()),
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Error type alias used for the [`gleaner`](crate) crate.
pub type Result<T> = core::result::Result<T, GleanerError>;

/// Errors that can occur when working with the gleaner library.
#[derive(Error, Debug)]
pub enum GleanerError {
  /// The run cannot start with the given settings.
  ///
  /// This occurs when:
  /// - A keyword group is empty
  /// - No groups, or more than five groups, were given
  /// - The citation threshold is zero
  #[error("Invalid configuration: {0}")]
  Configuration(String),

  /// A network request failed.
  ///
  /// This can occur when:
  /// - The network is unavailable
  /// - The server is unreachable
  /// - The request times out
  /// - TLS errors occur
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A remote API answered, but not with something usable.
  ///
  /// The string carries the status line or a description of what was missing.
  #[error("API error: {0}")]
  ApiError(String),

  /// A downloaded artifact is not the document it claims to be.
  #[error("Invalid artifact: {0}")]
  InvalidArtifact(String),

  /// The retrieval mechanism reported success but left nothing usable behind.
  #[error("No artifact was written to {}", .0.display())]
  MissingArtifact(PathBuf),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// PDF parsing and writing errors from the lopdf library.
  ///
  /// Common error cases include:
  /// - Malformed or corrupted PDF files
  /// - Missing required PDF objects or references
  /// - Encrypted PDF files
  #[error(transparent)]
  Lopdf(#[from] lopdf::Error),

  /// A settings file could not be decoded.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// Settings could not be encoded.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// A JSON response could not be decoded.
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

/// Searching one combination failed; that combination contributes no candidates.
#[derive(Error, Debug)]
#[error("Error with query \"{query}\": {reason}")]
pub struct SearchError {
  /// The joined query that was sent.
  pub query:  String,
  /// What went wrong.
  #[source]
  pub reason: GleanerError,
}

/// Retrieving the artifact for one identifier failed; the candidate is left out of the merge.
#[derive(Error, Debug)]
#[error("Failed to download {identifier}: {reason}")]
pub struct FetchFailed {
  /// Identifier of the candidate.
  pub identifier: String,
  /// What went wrong.
  #[source]
  pub reason:     GleanerError,
}

/// One retrieved file could not be concatenated; the merge continues without it.
#[derive(Error, Debug)]
#[error("Skipped {} while merging: {reason}", path.display())]
pub struct MergeSkipped {
  /// The file that was left out.
  pub path:   PathBuf,
  /// What went wrong.
  #[source]
  pub reason: GleanerError,
}
