//! GitHub REST client and the provider payloads GitWrap reads.
//!
//! Only the fields the aggregation needs are deserialized; everything else
//! in the provider's JSON is ignored.

use crate::config::{ACCEPT_HEADER, AuthToken, PER_PAGE, USER_AGENT};
use crate::error::FetchError;
use crate::window::ActivityWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Profile of the user being reviewed (`GET /users/{username}`)
#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    pub login: String,
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub public_repos: u64,
}

/// One entry of `GET /users/{username}/repos`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySnapshot {
    pub name: String,
    /// `owner/repo`, used to address the commits endpoint
    pub full_name: String,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    /// `null` for repositories that never received a push
    pub pushed_at: Option<DateTime<Utc>>,
}

/// One entry of `GET /repos/{owner}/{repo}/commits`. Only counted.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRecord {
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// The issue search reports pull-request merge info under `pull_request`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestMarker {
    pub merged_at: Option<DateTime<Utc>>,
}

/// One item of `GET /search/issues`, either an issue or a pull request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueRecord {
    #[serde(default)]
    pub state: IssueState,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pull_request: Option<PullRequestMarker>,
}

/// Pull requests come back from the same search endpoint as issues.
pub type PullRequestRecord = IssueRecord;

impl IssueRecord {
    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }

    /// Closed and carrying a merge timestamp. A PR closed without merging is not merged.
    pub fn is_merged(&self) -> bool {
        let merged_at = self
            .merged_at
            .or_else(|| self.pull_request.as_ref().and_then(|pr| pr.merged_at));
        self.is_closed() && merged_at.is_some()
    }
}

/// Search response envelope. A missing `items` field reads as empty.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<IssueRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    PullRequest,
    Issue,
}

impl SearchKind {
    fn qualifier(self) -> &'static str {
        match self {
            SearchKind::PullRequest => "pr",
            SearchKind::Issue => "issue",
        }
    }

    /// Full search query, e.g. `author:octocat type:pr created:2025-01-01..2025-12-31`
    pub fn query(self, username: &str, window: &ActivityWindow) -> String {
        format!(
            "author:{username} type:{} created:{}",
            self.qualifier(),
            window.created_range()
        )
    }
}

/// The GitHub capability the aggregator depends on.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn user(&self, token: &AuthToken, username: &str) -> Result<Actor, FetchError>;

    /// First page of the user's repositories, most recently updated first.
    async fn repositories(
        &self,
        token: &AuthToken,
        username: &str,
    ) -> Result<Vec<RepositorySnapshot>, FetchError>;

    /// First page of commits in `full_name` authored by `author` within `window`.
    async fn commits(
        &self,
        token: &AuthToken,
        full_name: &str,
        author: &str,
        window: &ActivityWindow,
    ) -> Result<Vec<CommitRecord>, FetchError>;

    /// First page of issue-search results created by `username` within `window`.
    async fn search_issues(
        &self,
        token: &AuthToken,
        username: &str,
        kind: SearchKind,
        window: &ActivityWindow,
    ) -> Result<Vec<IssueRecord>, FetchError>;
}

/// reqwest-backed GitHub REST client
#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    base_url: Url,
}

impl GithubClient {
    /// Create a client for `base_url` with a per-call `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Base URL extended with already-unescaped path segments.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Authenticated GET. 404 maps to `NotFound`, any other non-2xx to `Status`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AuthToken,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let target = url.to_string();
        debug!("GET {target} {query:?}");

        let response = self
            .http
            .get(url)
            .bearer_auth(token.expose())
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(target));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: target,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse {
                url: target,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn user(&self, token: &AuthToken, username: &str) -> Result<Actor, FetchError> {
        let url = self.endpoint(["users", username])?;
        self.get_json(token, url, &[]).await
    }

    async fn repositories(
        &self,
        token: &AuthToken,
        username: &str,
    ) -> Result<Vec<RepositorySnapshot>, FetchError> {
        let url = self.endpoint(["users", username, "repos"])?;
        let query = [
            ("sort", "updated".to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        self.get_json(token, url, &query).await
    }

    async fn commits(
        &self,
        token: &AuthToken,
        full_name: &str,
        author: &str,
        window: &ActivityWindow,
    ) -> Result<Vec<CommitRecord>, FetchError> {
        let segments = std::iter::once("repos")
            .chain(full_name.split('/'))
            .chain(std::iter::once("commits"));
        let url = self.endpoint(segments)?;
        let query = [
            ("since", window.since_param()),
            ("until", window.until_param()),
            ("author", author.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        self.get_json(token, url, &query).await
    }

    async fn search_issues(
        &self,
        token: &AuthToken,
        username: &str,
        kind: SearchKind,
        window: &ActivityWindow,
    ) -> Result<Vec<IssueRecord>, FetchError> {
        let url = self.endpoint(["search", "issues"])?;
        let query = [
            ("q", kind.query(username, window)),
            ("per_page", PER_PAGE.to_string()),
        ];
        let response: SearchResponse = self.get_json(token, url, &query).await?;
        Ok(response.items)
    }
}
