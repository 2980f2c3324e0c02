//! CLI error types.

use thiserror::Error;
use votevault_store::StoreError;

/// Errors surfaced by the `votevault` command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Record store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A `--category` or `--choice` value could not be parsed
    #[error("malformed argument {argument:?}: {reason}")]
    MalformedArgument {
        /// Raw argument as given
        argument: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Ballot names a category the registry does not have
    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    /// Ballot names a candidate not registered in its category
    #[error("unknown candidate {candidate:?} in category {category:?}")]
    UnknownCandidate {
        /// Category the choice was made in
        category: String,
        /// Unregistered candidate name
        candidate: String,
    },

    /// Ballot picks more than one candidate in a category
    #[error("more than one choice for category {0:?}")]
    DuplicateChoice(String),

    /// No PIN was supplied
    #[error("empty PIN")]
    EmptyPin,

    /// PIN entry at the terminal was abandoned
    #[error("PIN entry cancelled")]
    PinEntryCancelled,

    /// Terminal or directory I/O failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl CliError {
    /// Returns true if the error came from user input rather than stored
    /// state, so retrying with corrected arguments can succeed.
    pub fn is_usage_error(&self) -> bool {
        match self {
            Self::MalformedArgument { .. } => true,
            Self::UnknownCategory(_) => true,
            Self::UnknownCandidate { .. } => true,
            Self::DuplicateChoice(_) => true,
            Self::EmptyPin => true,
            Self::Store(StoreError::PinMismatch) => true,

            Self::Store(_) => false,
            Self::PinEntryCancelled => false,
            Self::Io(_) => false,
        }
    }
}
