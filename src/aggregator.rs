//! Orchestrates the GitHub calls behind one year-in-review summary.
//!
//! Call order: profile, repositories, commits for up to
//! `MAX_COMMIT_REPOS` active repositories (concurrently), then the PR and
//! issue searches (concurrently). The profile and repository calls are
//! fatal; commit and search failures are logged and contribute nothing.
//!
//! The deadline is fatal only while the profile and repositories are in
//! flight. Past that point, whatever has not finished in time counts as a
//! failed secondary lookup.

use crate::config::{AuthToken, DEFAULT_REQUEST_DEADLINE, MAX_COMMIT_REPOS};
use crate::error::{FetchError, WrapError};
use crate::github::{Actor, GithubApi, IssueRecord, RepositorySnapshot, SearchKind};
use crate::stats::{self, RawActivity, StatsSummary};
use crate::window::ActivityWindow;
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};

/// Request checks that precede any other validation or network call.
///
/// Returns the trimmed username and the credential to use.
pub fn check_request<'a>(
    username: &'a str,
    credentials: Option<&'a AuthToken>,
) -> Result<(&'a str, &'a AuthToken), WrapError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(WrapError::MissingUsername);
    }
    let token = credentials.ok_or(WrapError::Unauthenticated)?;
    Ok((username, token))
}

#[derive(Clone)]
pub struct StatsAggregator {
    api: Arc<dyn GithubApi>,
    deadline: Duration,
}

impl StatsAggregator {
    pub fn new(api: Arc<dyn GithubApi>) -> Self {
        Self {
            api,
            deadline: DEFAULT_REQUEST_DEADLINE,
        }
    }

    /// Overall time budget for one `aggregate` call
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Build the summary for `username` over calendar `year`.
    ///
    /// Username and credential checks run before any network call.
    pub async fn aggregate(
        &self,
        username: &str,
        year: i32,
        credentials: Option<&AuthToken>,
    ) -> Result<StatsSummary, WrapError> {
        let (username, token) = check_request(username, credentials)?;
        let window =
            ActivityWindow::for_year(year).ok_or_else(|| WrapError::InvalidYear(year.to_string()))?;

        info!("Aggregating {year} activity for {username}");

        let deadline = Instant::now() + self.deadline;
        let (actor, repos) = timeout_at(deadline, self.fetch_required(token, username))
            .await
            .map_err(|_| WrapError::DeadlineExceeded(self.deadline))??;

        Ok(self
            .collect_secondary(username, &window, token, deadline, actor, repos)
            .await)
    }

    /// Profile and repository list. Any failure here aborts the aggregation.
    async fn fetch_required(
        &self,
        token: &AuthToken,
        username: &str,
    ) -> Result<(Actor, Vec<RepositorySnapshot>), WrapError> {
        let actor = self
            .api
            .user(token, username)
            .await
            .map_err(|e| match e {
                FetchError::NotFound(_) => WrapError::ActorNotFound(username.to_string()),
                other => WrapError::Provider(other),
            })?;

        let repos = self
            .api
            .repositories(token, username)
            .await
            .map_err(WrapError::Provider)?;

        Ok((actor, repos))
    }

    /// Commits and searches, best effort until `deadline`.
    async fn collect_secondary(
        &self,
        username: &str,
        window: &ActivityWindow,
        token: &AuthToken,
        deadline: Instant,
        actor: Actor,
        repos: Vec<RepositorySnapshot>,
    ) -> StatsSummary {
        let fetched = repos.len();
        let active_repos = stats::filter_active(repos, window);
        debug!(
            "{} of {fetched} repositories pushed in {}",
            active_repos.len(),
            window.year()
        );

        // join_all yields results in input order, not completion order
        let lookups = active_repos.iter().take(MAX_COMMIT_REPOS).map(|repo| async move {
            let lookup = self.api.commits(token, &repo.full_name, username, window);
            let result = match timeout_at(deadline, lookup).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::TimedOut(repo.full_name.clone())),
            };
            (repo.full_name.as_str(), result)
        });
        let commits = stats::merge_commit_results(join_all(lookups).await);

        let (pull_requests, issues) = futures::join!(
            self.search(token, username, SearchKind::PullRequest, window, deadline),
            self.search(token, username, SearchKind::Issue, window, deadline),
        );

        stats::summarize(
            window.year(),
            actor,
            RawActivity {
                active_repos,
                commits,
                pull_requests,
                issues,
            },
        )
    }

    /// Search that degrades to an empty list on failure or timeout.
    async fn search(
        &self,
        token: &AuthToken,
        username: &str,
        kind: SearchKind,
        window: &ActivityWindow,
        deadline: Instant,
    ) -> Vec<IssueRecord> {
        let lookup = self.api.search_issues(token, username, kind, window);
        let result = match timeout_at(deadline, lookup).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::TimedOut(format!("{kind:?} search"))),
        };
        match result {
            Ok(items) => items,
            Err(e) => {
                warn!("Error searching {kind:?} items for {username}: {e}");
                Vec::new()
            }
        }
    }
}
