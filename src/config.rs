//! Configuration and constants for the service and CLI.

use chrono::{Datelike, Utc};
use clap::Args;
use std::fmt;
use std::time::Duration;

/// Default GitHub REST endpoint
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Client identifier sent as `User-Agent` on every call
pub const USER_AGENT: &str = "GitWrap";

/// Pins the REST API version
pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Page size for every list/search call. Only the first page is read.
pub const PER_PAGE: u32 = 100;

/// At most this many active repositories get a commit lookup
pub const MAX_COMMIT_REPOS: usize = 10;

/// Length of the top-languages and top-repositories lists
pub const TOP_N: usize = 5;

pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(30);

/// A GitHub credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Returns `None` for blank input.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Pick the credential to use: the configured service token wins over the
/// environment fallback.
pub fn resolve_token(service: Option<&str>, fallback: Option<&str>) -> Option<AuthToken> {
    service
        .and_then(AuthToken::new)
        .or_else(|| fallback.and_then(AuthToken::new))
}

/// GitHub connection options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GithubArgs {
    /// GitHub token configured for this service
    #[arg(long = "github-token", env = "GITWRAP_GITHUB_TOKEN", hide_env_values = true)]
    pub service_token: Option<String>,

    /// Fallback personal access token
    #[arg(long, env = "GITHUB_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub fallback_token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITWRAP_API_BASE", default_value = GITHUB_API_BASE)]
    pub api_base: String,

    /// Timeout for a single GitHub call, in seconds
    #[arg(long, default_value = "10")]
    pub call_timeout_secs: u64,

    /// Deadline for a whole aggregation, in seconds
    #[arg(long, default_value = "30")]
    pub deadline_secs: u64,

    /// Year to report on when a request does not name one (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
}

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base: String,
    pub token: Option<AuthToken>,
    pub call_timeout: Duration,
    pub request_deadline: Duration,
    pub default_year: i32,
}

impl From<GithubArgs> for Settings {
    fn from(args: GithubArgs) -> Self {
        Self {
            token: resolve_token(args.service_token.as_deref(), args.fallback_token.as_deref()),
            api_base: args.api_base,
            call_timeout: Duration::from_secs(args.call_timeout_secs.max(1)),
            request_deadline: Duration::from_secs(args.deadline_secs.max(1)),
            default_year: args.year.unwrap_or_else(|| Utc::now().year()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_token_wins() {
        let token = resolve_token(Some("svc"), Some("env")).unwrap();
        assert_eq!(token.expose(), "svc");
    }

    #[test]
    fn test_blank_service_token_falls_back() {
        let token = resolve_token(Some("  "), Some("env")).unwrap();
        assert_eq!(token.expose(), "env");
        assert!(resolve_token(None, None).is_none());
        assert!(resolve_token(Some(""), Some("")).is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = AuthToken::new("ghp_secret").unwrap();
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
    }

    #[test]
    fn test_settings_from_args() {
        let args = GithubArgs {
            service_token: None,
            fallback_token: Some("pat".to_string()),
            api_base: "http://localhost:9000".to_string(),
            call_timeout_secs: 0,
            deadline_secs: 5,
            year: Some(2024),
        };
        let settings = Settings::from(args);
        assert_eq!(settings.token.as_ref().map(AuthToken::expose), Some("pat"));
        assert_eq!(settings.call_timeout, Duration::from_secs(1));
        assert_eq!(settings.request_deadline, Duration::from_secs(5));
        assert_eq!(settings.default_year, 2024);
    }
}
