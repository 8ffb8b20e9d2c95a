//! Data models of GitHub Actions workflows and the provider they are fetched from.

#![cfg(feature = "client")]

use std::fmt::Display;

use async_trait::async_trait;
use serde::Deserialize;

use crate::WallResult;

pub mod github;

#[cfg(test)]
pub(crate) mod fake;

/// The state of a workflow, as reported by the provider.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum WorkflowState {
    /// The workflow runs on its triggers.
    Active,
    /// The workflow was disabled, manually or by the provider.
    Disabled,
    /// Any other state, such as `deleted`.
    Unknown,
}

impl WorkflowState {
    /// The lower-case name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for WorkflowState {
    fn from(state: &str) -> Self {
        match state {
            "active" => Self::Active,
            state if state.starts_with("disabled") => Self::Disabled,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for WorkflowState {
    fn from(state: String) -> Self {
        Self::from(state.as_str())
    }
}

impl Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a workflow from GitHub REST API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRecord {
    /// The display name of the workflow.
    pub name: String,
    /// The path of the workflow file, e.g. `.github/workflows/ci.yml`.
    pub path: String,
    /// The current state.
    pub state: WorkflowState,
    /// The status image of the workflow, if the provider reports one.
    #[serde(default)]
    pub badge_url: Option<String>,
}

impl WorkflowRecord {
    /// The final segment of [`Self::path`], which identifies the workflow in browsable URLs.
    pub fn workflow_id(&self) -> &str {
        self.path
            .rsplit_once('/')
            .map_or(self.path.as_str(), |(_, file)| file)
    }
}

impl Display for WorkflowRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.path, self.state)
    }
}

/// Represents a repository from GitHub REST API, reduced to what the wall needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryInfo {
    /// The repository as `owner/name`.
    pub full_name: String,
    /// `public`, `private` or `internal`. Older API versions omit it.
    #[serde(default)]
    pub visibility: Option<String>,
    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
}

impl RepositoryInfo {
    /// The visibility of the repository, falling back to [`Self::private`] when the provider does not report one.
    pub fn visibility(&self) -> &str {
        match &self.visibility {
            Some(visibility) => visibility.as_str(),
            None if self.private => "private",
            None => "public",
        }
    }

    /// Whether anonymous viewers can reach the repository, and therefore its badges.
    pub fn is_public(&self) -> bool {
        self.visibility() == "public"
    }
}

/// A source of workflow metadata.
///
/// Implemented by [`github::GitHubProvider`]. Substitute another implementation to run the pipeline against fixed data.
#[async_trait]
pub trait WorkflowProvider: Send + Sync {
    /// Looks up a repository.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::RepositoryFetchFailed`](crate::WallError::RepositoryFetchFailed) if the repository cannot be looked up.
    async fn repository(&self, owner: &str, repo: &str) -> WallResult<RepositoryInfo>;

    /// Lists every workflow defined in a repository.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::RepositoryFetchFailed`](crate::WallError::RepositoryFetchFailed) if the listing fails.
    async fn workflows(&self, owner: &str, repo: &str) -> WallResult<Vec<WorkflowRecord>>;

    /// Looks up a single workflow by its file name, returning [`None`] if the repository does not define it.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::RepositoryFetchFailed`](crate::WallError::RepositoryFetchFailed) if the lookup fails.
    async fn workflow(
        &self,
        owner: &str,
        repo: &str,
        file: &str,
    ) -> WallResult<Option<WorkflowRecord>>;
}
