//! GitWrap
//!
//! Year-in-review statistics for a GitHub user: profile, active
//! repositories, commits, pull requests and issues for one calendar year,
//! reduced into a summary and rendered as a shareable SVG card.
//!
//! The `gitwrap` binary serves the summary over HTTP (`gitwrap serve`) or
//! prints it once from the command line (`gitwrap stats`, `gitwrap card`).

pub mod aggregator;
pub mod config;
pub mod error;
pub mod github;
pub mod server;
pub mod stats;
pub mod svg;
pub mod window;

pub use aggregator::StatsAggregator;
pub use config::{AuthToken, GithubArgs, Settings};
pub use error::{FetchError, WrapError};
pub use github::{GithubApi, GithubClient};
pub use stats::StatsSummary;
