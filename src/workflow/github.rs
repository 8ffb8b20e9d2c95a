//! Workflows from GitHub REST API.

use std::{error::Error as _, time::Duration};

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, header};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    WallError, WallResult,
    env::REQUEST_TIMEOUT,
    workflow::{RepositoryInfo, WorkflowProvider, WorkflowRecord},
};

/// The default base URL of GitHub REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("badge-wall/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: usize = 100;

/// Represents a page of workflows from GitHub REST API.
#[derive(Debug, Deserialize)]
struct Workflows {
    total_count: usize,
    workflows: Vec<WorkflowRecord>,
}

/// Fetches repositories and workflows from GitHub REST API with a bearer token.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

impl GitHubProvider {
    /// Creates a provider for a GitHub-compatible API, such as [`GITHUB_API_URL`] or a GitHub Enterprise Server.
    ///
    /// Requests time out after [`REQUEST_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`WallError::Client`] if the HTTP client cannot be built.
    pub fn with_api_url(token: String, api_url: &str) -> WallResult<Self> {
        Self::with_timeout(token, api_url, *REQUEST_TIMEOUT)
    }

    /// Like [`Self::with_api_url`], with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::Client`] if the HTTP client cannot be built.
    pub fn with_timeout(token: String, api_url: &str, timeout: Duration) -> WallResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(WallError::Client)?;

        Ok(Self {
            client,
            token,
            api_url: api_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Builds a request for GitHub REST API.
    fn request_builder(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Sends a request and parses the response, mapping 404 to [`None`].
    async fn fetch<T>(&self, owner: &str, repo: &str, url: &str) -> WallResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        debug!("requesting {url}…");

        let response = match self.request_builder(url).send().await {
            Ok(response) => response,
            Err(err) => return Err(WallError::fetch_failed(owner, repo, describe(&err))),
        };

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("nothing found at {url}");
                Ok(None)
            }
            status if !status.is_success() => {
                let reason = match status.canonical_reason() {
                    Some(reason) => format!("{} {reason} from {url}", status.as_u16()),
                    None => format!("{} from {url}", status.as_u16()),
                };
                Err(WallError::fetch_failed(owner, repo, reason))
            }
            _ => match response.json::<T>().await {
                Ok(value) => Ok(Some(value)),
                Err(err) => Err(WallError::fetch_failed(
                    owner,
                    repo,
                    format!("failed to parse data from {url}: {}", describe(&err)),
                )),
            },
        }
    }
}

/// Describes a transport error, including its source if any.
fn describe(err: &reqwest::Error) -> String {
    let kind = match err {
        _ if err.is_timeout() => "request timed out",
        _ if err.is_connect() => "connection failed",
        _ => "request failed",
    };

    match err.source() {
        Some(source) => format!("{kind}: {err}: {source}"),
        None => format!("{kind}: {err}"),
    }
}

#[async_trait]
impl WorkflowProvider for GitHubProvider {
    async fn repository(&self, owner: &str, repo: &str) -> WallResult<RepositoryInfo> {
        let url = format!("{}/repos/{owner}/{repo}", self.api_url);

        self.fetch::<RepositoryInfo>(owner, repo, &url)
            .await?
            .ok_or_else(|| WallError::fetch_failed(owner, repo, "repository not found"))
    }

    async fn workflows(&self, owner: &str, repo: &str) -> WallResult<Vec<WorkflowRecord>> {
        info!("fetching workflows for {owner}/{repo}…");

        let mut records = Vec::new();
        for page in 1_u32.. {
            let url = format!(
                "{}/repos/{owner}/{repo}/actions/workflows?per_page={PER_PAGE}&page={page}",
                self.api_url
            );
            let Some(batch) = self.fetch::<Workflows>(owner, repo, &url).await? else {
                return Err(WallError::fetch_failed(owner, repo, "repository not found"));
            };

            let received = batch.workflows.len();
            records.extend(batch.workflows);
            if received < PER_PAGE || records.len() >= batch.total_count {
                break;
            }
        }

        match records.len() {
            1 => info!("fetched 1 workflow for {owner}/{repo}"),
            count => info!("fetched {count} workflows for {owner}/{repo}"),
        }
        Ok(records)
    }

    async fn workflow(
        &self,
        owner: &str,
        repo: &str,
        file: &str,
    ) -> WallResult<Option<WorkflowRecord>> {
        let url = format!(
            "{}/repos/{owner}/{repo}/actions/workflows/{file}",
            self.api_url
        );
        self.fetch::<WorkflowRecord>(owner, repo, &url).await
    }
}
