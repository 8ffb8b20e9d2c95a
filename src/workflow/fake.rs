use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    WallError, WallResult,
    workflow::{RepositoryInfo, WorkflowProvider, WorkflowRecord, WorkflowState},
};

#[derive(Debug, Default)]
struct FakeRepository {
    visibility: &'static str,
    records: Vec<WorkflowRecord>,
    fails: bool,
    failing_files: HashSet<String>,
    delay: Duration,
}

/// Serves fixed repositories keyed by `owner/name`. Unknown repositories fail like a 404 would.
#[derive(Debug, Default)]
pub(crate) struct FakeProvider {
    repositories: HashMap<String, FakeRepository>,
}

impl FakeProvider {
    pub(crate) fn with_repo(mut self, full_name: &str, records: Vec<WorkflowRecord>) -> Self {
        self.repositories.insert(
            full_name.to_owned(),
            FakeRepository {
                visibility: "public",
                records,
                ..FakeRepository::default()
            },
        );
        self
    }

    pub(crate) fn with_private_repo(
        mut self,
        full_name: &str,
        records: Vec<WorkflowRecord>,
    ) -> Self {
        self = self.with_repo(full_name, records);
        if let Some(repository) = self.repositories.get_mut(full_name) {
            repository.visibility = "private";
        }
        self
    }

    pub(crate) fn with_failure(mut self, full_name: &str) -> Self {
        self.repositories.insert(
            full_name.to_owned(),
            FakeRepository {
                visibility: "public",
                fails: true,
                ..FakeRepository::default()
            },
        );
        self
    }

    pub(crate) fn with_delay(mut self, full_name: &str, millis: u64) -> Self {
        if let Some(repository) = self.repositories.get_mut(full_name) {
            repository.delay = Duration::from_millis(millis);
        }
        self
    }

    pub(crate) fn with_failing_file(mut self, full_name: &str, file: &str) -> Self {
        if let Some(repository) = self.repositories.get_mut(full_name) {
            repository.failing_files.insert(file.to_owned());
        }
        self
    }

    async fn get(&self, owner: &str, repo: &str) -> WallResult<&FakeRepository> {
        let Some(repository) = self.repositories.get(&format!("{owner}/{repo}")) else {
            return Err(WallError::fetch_failed(owner, repo, "404 Not Found"));
        };
        tokio::time::sleep(repository.delay).await;
        if repository.fails {
            return Err(WallError::fetch_failed(owner, repo, "request timed out"));
        }
        Ok(repository)
    }
}

#[async_trait]
impl WorkflowProvider for FakeProvider {
    async fn repository(&self, owner: &str, repo: &str) -> WallResult<RepositoryInfo> {
        let repository = self.get(owner, repo).await?;
        Ok(RepositoryInfo {
            full_name: format!("{owner}/{repo}"),
            visibility: Some(repository.visibility.to_owned()),
            private: repository.visibility == "private",
        })
    }

    async fn workflows(&self, owner: &str, repo: &str) -> WallResult<Vec<WorkflowRecord>> {
        Ok(self.get(owner, repo).await?.records.clone())
    }

    async fn workflow(
        &self,
        owner: &str,
        repo: &str,
        file: &str,
    ) -> WallResult<Option<WorkflowRecord>> {
        let repository = self.get(owner, repo).await?;
        if repository.failing_files.contains(file) {
            return Err(WallError::fetch_failed(owner, repo, "502 Bad Gateway"));
        }
        Ok(repository
            .records
            .iter()
            .find(|record| record.workflow_id() == file)
            .cloned())
    }
}

/// An active workflow at `.github/workflows/{file}` without a provider badge URL.
pub(crate) fn record(name: &str, file: &str) -> WorkflowRecord {
    WorkflowRecord {
        name: name.to_owned(),
        path: format!(".github/workflows/{file}"),
        state: WorkflowState::Active,
        badge_url: None,
    }
}
