//! HTTP surface: `GET /api/github` (summary JSON) and `GET /api/card` (SVG).

use crate::aggregator::{self, StatsAggregator};
use crate::config::AuthToken;
use crate::error::WrapError;
use crate::stats::StatsSummary;
use crate::svg::{self, Theme};
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::error::Error as _;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<StatsAggregator>,
    token: Option<AuthToken>,
    default_year: i32,
}

impl AppState {
    pub fn new(aggregator: StatsAggregator, token: Option<AuthToken>, default_year: i32) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            token,
            default_year,
        }
    }

    async fn summarize(&self, query: &StatsQuery) -> Result<StatsSummary, WrapError> {
        let username = query.username.as_deref().unwrap_or_default();
        aggregator::check_request(username, self.token.as_ref())?;
        let year = match query.year.as_deref().map(str::trim) {
            None | Some("") => self.default_year,
            Some(raw) => raw
                .parse()
                .map_err(|_| WrapError::InvalidYear(raw.to_string()))?,
        };
        self.aggregator
            .aggregate(username, year, self.token.as_ref())
            .await
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub username: Option<String>,
    pub year: Option<String>,
    pub theme: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/github", get(github_stats))
        .route("/api/card", get(card))
        .with_state(state)
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{addr}");
    }
    axum::serve(listener, router(state)).await
}

async fn github_stats(State(state): State<AppState>, Query(query): Query<StatsQuery>) -> Response {
    match state.summarize(&query).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => error_response(e),
    }
}

async fn card(State(state): State<AppState>, Query(query): Query<StatsQuery>) -> Response {
    let username = query.username.as_deref().unwrap_or_default();
    if let Err(e) = aggregator::check_request(username, state.token.as_ref()) {
        return error_response(e);
    }

    let theme = match query.theme.as_deref() {
        None => Theme::default(),
        Some(raw) => match raw.parse::<Theme>() {
            Ok(theme) => theme,
            Err(message) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response();
            }
        },
    };

    match state.summarize(&query).await {
        Ok(summary) => {
            let filename = format!(
                "inline; filename=\"gitwrap-{}-{}.svg\"",
                summary.user.login, summary.year
            );
            (
                [
                    (header::CONTENT_TYPE, "image/svg+xml".to_string()),
                    (header::CONTENT_DISPOSITION, filename),
                ],
                svg::generate_svg(&summary, theme),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Status code and public message for an aggregation failure
pub fn error_status(err: &WrapError) -> (StatusCode, &'static str) {
    match err {
        WrapError::MissingUsername => (StatusCode::BAD_REQUEST, "Username is required"),
        WrapError::InvalidYear(_) => (StatusCode::BAD_REQUEST, "Invalid year"),
        WrapError::ActorNotFound(_) => (StatusCode::NOT_FOUND, "User not found"),
        WrapError::Unauthenticated => (StatusCode::INTERNAL_SERVER_ERROR, "GitHub token not configured"),
        WrapError::Provider(_) | WrapError::DeadlineExceeded(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch GitHub data")
        }
    }
}

fn error_response(err: WrapError) -> Response {
    let (status, message) = error_status(&err);
    if status.is_server_error() {
        match err.source() {
            Some(source) => error!("Error fetching GitHub data: {err}: {source}"),
            None => error!("Error fetching GitHub data: {err}"),
        }
    }
    (status, Json(json!({ "error": message }))).into_response()
}
