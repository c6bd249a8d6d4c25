//! Reduction of fetched GitHub data into the year-in-review summary.
//!
//! Everything here is pure: the aggregator does the I/O and hands the
//! raw collections over.

use crate::config::TOP_N;
use crate::error::FetchError;
use crate::github::{Actor, CommitRecord, IssueRecord, PullRequestRecord, RepositorySnapshot};
use crate::window::ActivityWindow;
use log::warn;
use serde::Serialize;

/// Profile fields echoed on the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub login: String,
    /// Display name, or the login when the profile has none
    pub name: String,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
}

impl From<Actor> for UserSummary {
    fn from(actor: Actor) -> Self {
        let name = actor
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| actor.login.clone());
        Self {
            login: actor.login,
            name,
            avatar_url: actor.avatar_url,
            bio: actor.bio,
            followers: actor.followers,
            following: actor.following,
            public_repos: actor.public_repos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopRepo {
    pub name: String,
    pub stars: u64,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    /// Lower bound: failed per-repository lookups contribute nothing
    pub total_commits: u64,
    #[serde(rename = "totalPRs")]
    pub total_prs: u64,
    #[serde(rename = "mergedPRs")]
    pub merged_prs: u64,
    pub total_issues: u64,
    pub closed_issues: u64,
    pub repos_active: u64,
    pub top_languages: Vec<String>,
    pub top_repos: Vec<TopRepo>,
}

/// The aggregation result, built once and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub year: i32,
    pub user: UserSummary,
    pub stats: ActivityStats,
}

/// Everything fetched for one aggregation
#[derive(Debug, Default)]
pub struct RawActivity {
    /// Repositories already filtered to the window, in provider order
    pub active_repos: Vec<RepositorySnapshot>,
    pub commits: Vec<CommitRecord>,
    pub pull_requests: Vec<PullRequestRecord>,
    pub issues: Vec<IssueRecord>,
}

/// Keep repositories pushed within `window`, preserving order.
pub fn filter_active(repos: Vec<RepositorySnapshot>, window: &ActivityWindow) -> Vec<RepositorySnapshot> {
    repos
        .into_iter()
        .filter(|repo| repo.pushed_at.is_some_and(|at| window.contains(at)))
        .collect()
}

/// Best-effort fold over per-repository commit lookups.
///
/// Failures are logged and skipped; the merged list keeps the order of
/// `results`.
pub fn merge_commit_results<'a>(
    results: impl IntoIterator<Item = (&'a str, Result<Vec<CommitRecord>, FetchError>)>,
) -> Vec<CommitRecord> {
    let mut merged = Vec::new();
    for (full_name, result) in results {
        match result {
            Ok(commits) => merged.extend(commits),
            Err(e) => warn!("Error fetching commits for {full_name}: {e}"),
        }
    }
    merged
}

/// Languages ranked by how many repositories use them.
///
/// Ties keep first-seen order.
pub fn top_languages(repos: &[RepositorySnapshot], limit: usize) -> Vec<String> {
    let mut tally: Vec<(&str, u64)> = Vec::new();
    for language in repos.iter().filter_map(|r| r.language.as_deref()) {
        if language.is_empty() {
            continue;
        }
        match tally.iter_mut().find(|(name, _)| *name == language) {
            Some((_, count)) => *count += 1,
            None => tally.push((language, 1)),
        }
    }

    // stable sort keeps insertion order among equal counts
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Most-starred repositories, descending. Equal star counts keep provider order.
pub fn top_repositories(repos: &[RepositorySnapshot], limit: usize) -> Vec<TopRepo> {
    let mut ranked: Vec<&RepositorySnapshot> = repos.iter().collect();
    ranked.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    ranked
        .into_iter()
        .take(limit)
        .map(|repo| TopRepo {
            name: repo.name.clone(),
            stars: repo.stargazers_count,
            language: repo.language.clone(),
        })
        .collect()
}

/// Reduce the fetched collections into the summary.
pub fn summarize(year: i32, actor: Actor, raw: RawActivity) -> StatsSummary {
    let merged_prs = raw.pull_requests.iter().filter(|pr| pr.is_merged()).count();
    let closed_issues = raw.issues.iter().filter(|issue| issue.is_closed()).count();

    let stats = ActivityStats {
        total_commits: raw.commits.len() as u64,
        total_prs: raw.pull_requests.len() as u64,
        merged_prs: merged_prs as u64,
        total_issues: raw.issues.len() as u64,
        closed_issues: closed_issues as u64,
        repos_active: raw.active_repos.len() as u64,
        top_languages: top_languages(&raw.active_repos, TOP_N),
        top_repos: top_repositories(&raw.active_repos, TOP_N),
    };

    StatsSummary {
        year,
        user: UserSummary::from(actor),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{IssueState, PullRequestMarker};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn repo(name: &str, language: Option<&str>, stars: u64) -> RepositorySnapshot {
        RepositorySnapshot {
            name: name.to_string(),
            full_name: format!("octo/{name}"),
            language: language.map(str::to_string),
            stargazers_count: stars,
            pushed_at: Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
        }
    }

    fn actor() -> Actor {
        Actor {
            login: "Octo".to_string(),
            name: None,
            avatar_url: "https://avatars.example/octo".to_string(),
            bio: Some("hi".to_string()),
            followers: 3,
            following: 4,
            public_repos: 5,
        }
    }

    #[test]
    fn test_top_languages_tie_break() {
        let repos = vec![
            repo("a", Some("Go"), 0),
            repo("b", Some("Go"), 0),
            repo("c", Some("Rust"), 0),
            repo("d", Some("TS"), 0),
            repo("e", Some("TS"), 0),
            repo("f", Some("TS"), 0),
        ];
        assert_eq!(top_languages(&repos, 5), vec!["TS", "Go", "Rust"]);
    }

    #[test]
    fn test_top_languages_limit_and_nulls() {
        let repos = vec![
            repo("a", Some("A"), 0),
            repo("b", None, 0),
            repo("c", Some("B"), 0),
            repo("d", Some("C"), 0),
            repo("e", Some("D"), 0),
            repo("f", Some("E"), 0),
            repo("g", Some("F"), 0),
            repo("h", Some("F"), 0),
        ];
        let langs = top_languages(&repos, 5);
        assert_eq!(langs, vec!["F", "A", "B", "C", "D"]);
    }

    #[test]
    fn test_top_repositories() {
        let repos = vec![
            repo("low", Some("Go"), 1),
            repo("zero", None, 0),
            repo("high", Some("Rust"), 50),
            repo("mid", Some("Go"), 10),
        ];
        let top = top_repositories(&repos, 5);
        let names: Vec<&str> = top.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low", "zero"]);
        assert_eq!(top[3].language, None);
    }

    #[test]
    fn test_top_repositories_stable_on_ties() {
        let repos: Vec<_> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|n| repo(n, None, 7))
            .collect();
        let names: Vec<String> = top_repositories(&repos, 5).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_filter_active() {
        let window = ActivityWindow::for_year(2025).unwrap();
        let mut old = repo("old", None, 0);
        old.pushed_at = Some(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap());
        let mut never = repo("never", None, 0);
        never.pushed_at = None;
        let mut first = repo("first", None, 0);
        first.pushed_at = Some(window.start());
        let mut last = repo("last", None, 0);
        last.pushed_at = Some(window.end());

        let active = filter_active(vec![last, old, never, first], &window);
        let names: Vec<&str> = active.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["last", "first"]);
    }

    #[test]
    fn test_merge_commit_results_skips_failures() {
        let commit = || CommitRecord { sha: "abc".to_string() };
        let results = vec![
            ("octo/a", Ok(vec![commit(), commit()])),
            ("octo/b", Err(FetchError::NotFound("octo/b".to_string()))),
            ("octo/c", Ok(vec![commit()])),
        ];
        assert_eq!(merge_commit_results(results).len(), 3);
    }

    #[test]
    fn test_summarize() {
        let closed = |merged: bool| IssueRecord {
            state: IssueState::Closed,
            merged_at: None,
            pull_request: Some(PullRequestMarker {
                merged_at: merged.then(|| Utc.with_ymd_and_hms(2025, 2, 2, 0, 0, 0).unwrap()),
            }),
        };
        let open = IssueRecord {
            state: IssueState::Open,
            ..IssueRecord::default()
        };

        let raw = RawActivity {
            active_repos: vec![repo("a", Some("Rust"), 2), repo("b", Some("Rust"), 9)],
            commits: vec![CommitRecord { sha: "1".to_string() }; 4],
            pull_requests: vec![closed(true), closed(false), open.clone()],
            issues: vec![closed(false), open],
        };

        let summary = summarize(2025, actor(), raw);
        assert_eq!(summary.user.login, "Octo");
        assert_eq!(summary.user.name, "Octo");
        assert_eq!(
            summary.stats,
            ActivityStats {
                total_commits: 4,
                total_prs: 3,
                merged_prs: 1,
                total_issues: 2,
                closed_issues: 1,
                repos_active: 2,
                top_languages: vec!["Rust".to_string()],
                top_repos: vec![
                    TopRepo { name: "b".to_string(), stars: 9, language: Some("Rust".to_string()) },
                    TopRepo { name: "a".to_string(), stars: 2, language: Some("Rust".to_string()) },
                ],
            }
        );
        assert!(summary.stats.merged_prs <= summary.stats.total_prs);
        assert!(summary.stats.closed_issues <= summary.stats.total_issues);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = summarize(2025, actor(), RawActivity::default());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["user"]["name"], "Octo");
        assert_eq!(json["user"]["public_repos"], 5);
        assert_eq!(json["stats"]["totalPRs"], 0);
        assert_eq!(json["stats"]["mergedPRs"], 0);
        assert_eq!(json["stats"]["reposActive"], 0);
        assert!(json["stats"]["topLanguages"].as_array().unwrap().is_empty());
    }
}
