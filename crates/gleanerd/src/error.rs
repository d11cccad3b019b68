//! Error types for the gleaner command line shell.

use thiserror::Error;

use super::*;

/// Error type alias used for the gleaner binary.
pub type Result<T> = core::result::Result<T, GleanerdError>;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum GleanerdError {
  /// An error raised by the gleaner library.
  #[error(transparent)]
  Gleaner(#[from] GleanerError),

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A prompt could not be shown or answered.
  #[error(transparent)]
  Dialog(#[from] dialoguer::Error),

  /// None of the given files could be merged.
  #[error("None of the {0} input files could be merged")]
  NothingMerged(usize),
}
