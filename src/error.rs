//! Error types for the whole crate.
//!
//! `FetchError` describes the failure of one outbound GitHub call.
//! `WrapError` is what an aggregation request can fail with; the server
//! maps each variant onto an HTTP status and a fixed public message.

use std::time::Duration;
use thiserror::Error;

/// Errors from a single GitHub REST call
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("GitHub API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("timed out waiting for {0}")]
    TimedOut(String),
}

/// Errors surfaced by an aggregation request
#[derive(Error, Debug)]
pub enum WrapError {
    #[error("Username is required")]
    MissingUsername,

    #[error("GitHub token not configured")]
    Unauthenticated,

    #[error("invalid year: {0}")]
    InvalidYear(String),

    #[error("GitHub user not found: {0}")]
    ActorNotFound(String),

    #[error("GitHub API error")]
    Provider(#[source] FetchError),

    #[error("aggregation did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}
