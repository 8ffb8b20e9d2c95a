//! Errors raised while building the wall.

use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] for wall operations.
pub type WallResult<T> = Result<T, WallError>;

/// Errors that can occur while loading, fetching, or writing the wall.
///
/// Everything except [`WallError::RepositoryFetchFailed`] aborts the run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WallError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", .path.display())]
    ConfigNotFound {
        /// Where the configuration was expected.
        path: PathBuf,
    },

    /// The configuration could not be read into the expected shape.
    #[error("malformed configuration in {origin}: {reason}")]
    ConfigMalformed {
        /// Where the configuration came from.
        origin: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No usable access credential was found in the environment.
    #[error("missing credential: {reason}")]
    MissingCredential {
        /// Why the credential could not be resolved.
        reason: String,
    },

    /// Workflows of a single repository could not be fetched.
    #[error("failed to fetch workflows for {repository}: {reason}")]
    RepositoryFetchFailed {
        /// The repository as `owner/name`.
        repository: String,
        /// What went wrong.
        reason: String,
    },

    /// The rendered wall could not be written.
    #[error("failed to write the wall to {}: {source}", .path.display())]
    RenderWriteFailed {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl WallError {
    /// Creates a [`WallError::RepositoryFetchFailed`] for `owner/repo`.
    pub fn fetch_failed<R>(owner: &str, repo: &str, reason: R) -> Self
    where
        R: ToString,
    {
        Self::RepositoryFetchFailed {
            repository: format!("{owner}/{repo}"),
            reason: reason.to_string(),
        }
    }
}
