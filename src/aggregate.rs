//! Groups the workflows of every configured repository into a [`GroupedBadgeWall`].

#![cfg(feature = "client")]

use futures::{StreamExt as _, future, stream};
use tracing::{debug, info};

use crate::{
    client::{RemoteWorkflowClient, badge_url, workflow_link},
    config::{Configuration, RepoSpec},
    workflow::{WorkflowProvider, WorkflowRecord},
};

/// How many repositories are fetched at once by default.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// A render-ready workflow status badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// The status image.
    pub url: String,
    /// The browsable workflow page.
    pub link: String,
    /// The workflow name.
    pub name: String,
    /// The workflow state, if known.
    pub state: Option<String>,
}

impl Badge {
    /// Projects a workflow record of `owner/repo` into a badge.
    pub fn from_record(owner: &str, repo: &str, record: WorkflowRecord) -> Self {
        let workflow_id = record.workflow_id().to_owned();
        let link = workflow_link(owner, repo, &workflow_id);
        let url = record
            .badge_url
            .unwrap_or_else(|| badge_url(owner, repo, &workflow_id));

        Self {
            url,
            link,
            name: record.name,
            state: Some(record.state.as_str().to_owned()),
        }
    }
}

/// The badges of a repository. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoBadges {
    repo: String,
    badges: Vec<Badge>,
}

impl RepoBadges {
    /// Creates a record, or returns [`None`] if there are no badges.
    pub fn new<S>(repo: S, badges: Vec<Badge>) -> Option<Self>
    where
        S: Into<String>,
    {
        if badges.is_empty() {
            None
        } else {
            Some(Self {
                repo: repo.into(),
                badges,
            })
        }
    }

    /// The repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The badges, in fetch order.
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }
}

/// A group of repositories with badges. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeGroup {
    name: String,
    repositories: Vec<RepoBadges>,
}

impl BadgeGroup {
    /// Creates a group, or returns [`None`] if there are no repositories.
    pub fn new<S>(name: S, repositories: Vec<RepoBadges>) -> Option<Self>
    where
        S: Into<String>,
    {
        if repositories.is_empty() {
            None
        } else {
            Some(Self {
                name: name.into(),
                repositories,
            })
        }
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The repositories, in configuration order.
    pub fn repositories(&self) -> &[RepoBadges] {
        &self.repositories
    }
}

/// Every group with at least one badge, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupedBadgeWall {
    groups: Vec<BadgeGroup>,
}

impl GroupedBadgeWall {
    /// The groups, in configuration order.
    pub fn groups(&self) -> &[BadgeGroup] {
        &self.groups
    }

    /// Whether no repository has any badge.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The total number of badges.
    pub fn badge_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(BadgeGroup::repositories)
            .map(|repo| repo.badges.len())
            .sum()
    }
}

impl FromIterator<BadgeGroup> for GroupedBadgeWall {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = BadgeGroup>,
    {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

/// Keeps the records passing the filter of `spec` and projects them into badges, in fetch order.
pub fn badges_for(owner: &str, spec: &RepoSpec, records: Vec<WorkflowRecord>) -> Vec<Badge> {
    records
        .into_iter()
        .filter(|record| spec.workflow_filter.matches(&record.name))
        .map(|record| Badge::from_record(owner, &spec.name, record))
        .collect()
}

/// Builds a [`GroupedBadgeWall`] from a [`Configuration`].
///
/// Repositories that fail to fetch or have no matching workflows are omitted, and so are groups left empty.
#[derive(Debug)]
pub struct BadgeAggregator<P> {
    client: RemoteWorkflowClient<P>,
    concurrency: usize,
}

impl<P> BadgeAggregator<P>
where
    P: WorkflowProvider,
{
    /// Creates an aggregator fetching [`DEFAULT_CONCURRENCY`] repositories at once.
    pub fn new(client: RemoteWorkflowClient<P>) -> Self {
        Self {
            client,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets how many repositories are fetched at once. `1` fetches them one by one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetches every configured repository and groups the badges.
    ///
    /// Groups and repositories keep their configuration order regardless of which fetch completes first.
    pub async fn build(&self, config: &Configuration) -> GroupedBadgeWall {
        let mut groups = Vec::with_capacity(config.groups.len());

        for group in &config.groups {
            info!("processing {} repositories…", group.name);

            let repositories: Vec<RepoBadges> = stream::iter(&group.repositories)
                .map(|spec| self.repository_badges(&config.organization, spec))
                .buffered(self.concurrency)
                .filter_map(future::ready)
                .collect()
                .await;

            match BadgeGroup::new(group.name.as_str(), repositories) {
                Some(badge_group) => groups.push(badge_group),
                None => debug!("no badges in group {}, omitting", group.name),
            }
        }

        let wall: GroupedBadgeWall = groups.into_iter().collect();
        info!(
            "collected {} badges in {} groups",
            wall.badge_count(),
            wall.groups.len()
        );
        wall
    }

    /// Fetches a single repository and projects its matching workflows into badges.
    pub async fn repository_badges(&self, owner: &str, spec: &RepoSpec) -> Option<RepoBadges> {
        let records = self
            .client
            .list_workflows(owner, &spec.name)
            .await
            .unwrap_or_log();

        let badges = badges_for(owner, spec, records);
        if badges.is_empty() {
            debug!("no matching workflows in {owner}/{}, omitting", spec.name);
        }
        RepoBadges::new(spec.name.as_str(), badges)
    }
}
