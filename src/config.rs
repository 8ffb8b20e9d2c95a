//! Loads the grouped repository list and the provider credential.
//!
//! The configuration is a JSON object. `organization` names the owner of every repository, and every other key is a
//! group of repositories, kept in file order:
//!
//! ```json
//! {
//!     "organization": "acme",
//!     "Backend": [{ "name": "api" }, { "name": "worker", "workflows": ["CI", "Release"] }],
//!     "Frontend": [{ "name": "web", "workflows": ["all"] }]
//! }
//! ```
//!
//! `workflows` is optional and defaults to every workflow.

use std::{
    collections::BTreeSet,
    fmt::Display,
    io,
    path::PathBuf,
};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{WallError, WallResult};

/// Where [`ConfigStore::default`] reads the configuration from, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/repos.json";

const ORGANIZATION_KEY: &str = "organization";
const ALL_WORKFLOWS: &str = "all";

/// Which workflows of a repository end up on the wall.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowFilter {
    /// Every workflow.
    #[default]
    All,
    /// Only workflows with one of these names.
    Named(BTreeSet<String>),
}

impl WorkflowFilter {
    /// Creates a filter from workflow names. A name of `all` selects every workflow.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.contains(ALL_WORKFLOWS) {
            Self::All
        } else {
            Self::Named(names)
        }
    }

    /// Whether a workflow with this name passes the filter.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(names) => names.contains(name),
        }
    }
}

/// A configured repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRepoSpec")]
pub struct RepoSpec {
    /// The repository name, without the owner.
    pub name: String,
    /// Which of its workflows to show.
    pub workflow_filter: WorkflowFilter,
}

impl RepoSpec {
    /// Creates a spec that shows every workflow of the repository.
    pub fn new<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            workflow_filter: WorkflowFilter::All,
        }
    }

    /// Replaces the workflow filter.
    #[must_use]
    pub fn with_filter(mut self, workflow_filter: WorkflowFilter) -> Self {
        self.workflow_filter = workflow_filter;
        self
    }
}

#[derive(Deserialize)]
struct RawRepoSpec {
    name: String,
    #[serde(default)]
    workflows: Option<Vec<String>>,
}

impl From<RawRepoSpec> for RepoSpec {
    fn from(raw: RawRepoSpec) -> Self {
        Self {
            name: raw.name,
            workflow_filter: raw
                .workflows
                .map_or(WorkflowFilter::All, WorkflowFilter::from_names),
        }
    }
}

/// A named bucket of repositories, used for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoGroup {
    /// The group name, used as a heading.
    pub name: String,
    /// The repositories, in configuration order.
    pub repositories: Vec<RepoSpec>,
}

/// The loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// The owner of every configured repository.
    pub organization: String,
    /// The groups, in configuration order. Names are unique.
    pub groups: Vec<RepoGroup>,
}

impl Configuration {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::ConfigMalformed`] if the text is not a JSON object, `organization` is missing, empty, or
    /// not a string, or a group is not a list of repositories.
    pub fn parse(text: &str) -> WallResult<Self> {
        Self::parse_from(text, "configuration")
    }

    fn parse_from<O>(text: &str, origin: O) -> WallResult<Self>
    where
        O: Display,
    {
        let malformed = |reason: String| WallError::ConfigMalformed {
            origin: origin.to_string(),
            reason,
        };

        let root: Map<String, Value> =
            serde_json::from_str(text).map_err(|err| malformed(err.to_string()))?;

        let organization = match root.get(ORGANIZATION_KEY) {
            Some(Value::String(organization)) if organization.trim().is_empty() => {
                return Err(malformed(format!("`{ORGANIZATION_KEY}` is empty")));
            }
            Some(Value::String(organization)) => organization.trim().to_owned(),
            Some(_) => return Err(malformed(format!("`{ORGANIZATION_KEY}` is not a string"))),
            None => return Err(malformed(format!("missing `{ORGANIZATION_KEY}` key"))),
        };

        let groups = root
            .into_iter()
            .filter(|(key, _)| key != ORGANIZATION_KEY)
            .map(|(name, value)| match serde_json::from_value::<Vec<RepoSpec>>(value) {
                Ok(repositories) => Ok(RepoGroup { name, repositories }),
                Err(err) => Err(malformed(format!("group `{name}`: {err}"))),
            })
            .collect::<WallResult<Vec<_>>>()?;

        Ok(Self {
            organization,
            groups,
        })
    }

    /// The number of configured repositories across all groups.
    pub fn repository_count(&self) -> usize {
        self.groups.iter().map(|group| group.repositories.len()).sum()
    }
}

/// Loads the [`Configuration`] and resolves the credential.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigStore {
    /// Creates a store that reads the configuration from `path`.
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    /// Reads and parses the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::ConfigNotFound`] if the file does not exist, and [`WallError::ConfigMalformed`] if it
    /// cannot be read or parsed.
    pub fn load(&self) -> WallResult<Configuration> {
        debug!("loading configuration from {}…", self.path.display());

        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(WallError::ConfigNotFound {
                    path: self.path.clone(),
                });
            }
            Err(err) => {
                return Err(WallError::ConfigMalformed {
                    origin: self.path.display().to_string(),
                    reason: format!("failed to read: {err}"),
                });
            }
        };

        let configuration = Configuration::parse_from(&text, self.path.display())?;
        debug!(
            "loaded {} repositories in {} groups",
            configuration.repository_count(),
            configuration.groups.len()
        );
        Ok(configuration)
    }

    /// Resolves the access credential from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::MissingCredential`] if the variable is unset or blank.
    #[cfg(feature = "env_github_token")]
    pub fn get_credential(&self) -> WallResult<String> {
        crate::env::github_token().map_err(|err| WallError::MissingCredential {
            reason: err.to_string(),
        })
    }
}
