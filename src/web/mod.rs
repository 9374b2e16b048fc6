//! HTTP surface of the dashboard
//!
//! `GET /` serves the page, the `POST` routes take form-encoded bodies and answer JSON.

mod error;
mod handlers;

use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::GithubInsight;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub insight: Arc<GithubInsight>,
}

pub fn router(insight: GithubInsight) -> Router {
    let state = AppState {
        insight: Arc::new(insight),
    };
    Router::new()
        .route("/", get(index))
        .route("/get_repo_info", post(handlers::get_repo_info))
        .route("/search_commits", post(handlers::search_commits))
        .route("/get_issues_stats", post(handlers::get_issues_stats))
        .route("/get_commit_frequency", post(handlers::get_commit_frequency))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
