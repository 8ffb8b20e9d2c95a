//! Fetches the workflows of a repository with a configurable retrieval policy.

#![cfg(feature = "client")]

use reqwest::Url;
use tracing::{debug, warn};

use crate::{
    state::{State, unwrap},
    static_lazy_lock,
    workflow::{RepositoryInfo, WorkflowProvider, WorkflowRecord},
};

static_lazy_lock! {
    GITHUB_URL: Url = Url::parse("https://github.com/").expect("invalid GitHub URL");
}

/// The workflow files looked up by [`RetrievalPolicy::probe_default`].
pub const DEFAULT_PROBE_FILES: [&str; 3] = ["ci.yml", "build.yml", "test.yml"];

/// How the workflows of a repository are retrieved.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RetrievalPolicy {
    /// Asks the provider for every workflow defined in the repository.
    #[default]
    EnumerateAll,
    /// Looks up each of the given workflow file names individually, skipping any that is not found.
    ProbeFixed(Vec<String>),
}

impl RetrievalPolicy {
    /// Probes the conventional [`DEFAULT_PROBE_FILES`].
    pub fn probe_default() -> Self {
        Self::ProbeFixed(DEFAULT_PROBE_FILES.map(String::from).to_vec())
    }
}

/// Builds a GitHub URL from path segments, percent-encoding each of them.
fn github_url(segments: &[&str]) -> String {
    let mut url = GITHUB_URL.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.into()
}

/// Builds the browsable URL of a workflow from its file name.
pub fn workflow_link(owner: &str, repo: &str, workflow_id: &str) -> String {
    github_url(&[owner, repo, "actions", "workflows", workflow_id])
}

/// Builds the status image URL of a workflow from its file name.
pub fn badge_url(owner: &str, repo: &str, workflow_id: &str) -> String {
    github_url(&[owner, repo, "actions", "workflows", workflow_id, "badge.svg"])
}

/// Describes why the badges of a repository may be unreachable, or returns [`None`] if it is public.
pub fn visibility_advisory(repository: &RepositoryInfo) -> Option<String> {
    (!repository.is_public()).then(|| {
        format!(
            "repository {} is not public (visibility: {}), its badges may be unreachable for anonymous viewers",
            repository.full_name,
            repository.visibility()
        )
    })
}

/// Retrieves workflow records from a [`WorkflowProvider`].
#[derive(Debug)]
pub struct RemoteWorkflowClient<P> {
    provider: P,
    policy: RetrievalPolicy,
}

impl<P> RemoteWorkflowClient<P>
where
    P: WorkflowProvider,
{
    /// Creates a client that uses [`RetrievalPolicy::EnumerateAll`].
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            policy: RetrievalPolicy::default(),
        }
    }

    /// Replaces the retrieval policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetrievalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Lists the workflows of `owner/repo`.
    ///
    /// Warns if the repository is not public, since its badges may not be visible to anonymous viewers.
    /// Returns [`State::Failed`] if the repository or its workflows cannot be fetched.
    pub async fn list_workflows(&self, owner: &str, repo: &str) -> State<Vec<WorkflowRecord>> {
        let repository = unwrap!(self.provider.repository(owner, repo).await);
        if let Some(advisory) = visibility_advisory(&repository) {
            warn!("{advisory}");
        }

        let records = match &self.policy {
            RetrievalPolicy::EnumerateAll => unwrap!(self.provider.workflows(owner, repo).await),
            RetrievalPolicy::ProbeFixed(files) => self.probe(owner, repo, files).await,
        };
        for record in &records {
            debug!("found workflow {record} in {owner}/{repo}");
        }

        State::Success(records)
    }

    async fn probe(&self, owner: &str, repo: &str, files: &[String]) -> Vec<WorkflowRecord> {
        let mut records = Vec::with_capacity(files.len());
        for file in files {
            match self.provider.workflow(owner, repo, file).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!("no workflow {file} in {owner}/{repo}, skipping"),
                Err(err) => warn!("{err}, skipping {file}"),
            }
        }
        records
    }
}
