//! Form-posted dashboard queries

use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use log::{debug, info};
use repo_insight::api::{Error, RepoRef};
use repo_insight::frequency::FrequencyHistogram;
use repo_insight::reference::parse_repo_url;
use repo_insight::shaper::{CommitRecord, LabelStats, RepoSummary};
use repo_insight::FrequencyQuery;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RepoForm {
    pub repo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchCommitsForm {
    pub repo_url: Option<String>,
    pub search_phrase: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommitFrequencyForm {
    pub repo_url: Option<String>,
    pub group_by: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommitsResponse {
    pub commits: Vec<CommitRecord>,
}

fn repo_ref(repo_url: Option<&str>) -> Result<RepoRef, Error> {
    let repo_url = repo_url
        .filter(|repo_url| !repo_url.trim().is_empty())
        .ok_or(Error::MissingInput("Repository URL"))?;
    parse_repo_url(repo_url)
}

/// A body that is not a readable form carries no fields, same as an empty form.
fn form_fields<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    form.map(|Form(form)| form).unwrap_or_else(|rejection| {
        debug!("Reading request as an empty form: {}", rejection);
        T::default()
    })
}

pub async fn get_repo_info(
    State(state): State<AppState>,
    form: Result<Form<RepoForm>, FormRejection>,
) -> Result<Json<RepoSummary>, ApiError> {
    let form = form_fields(form);
    let repo = repo_ref(form.repo_url.as_deref())?;
    info!("Repository info for {}", repo);
    Ok(Json(state.insight.summary(&repo).await?))
}

pub async fn search_commits(
    State(state): State<AppState>,
    form: Result<Form<SearchCommitsForm>, FormRejection>,
) -> Result<Json<CommitsResponse>, ApiError> {
    let form = form_fields(form);
    let repo = repo_ref(form.repo_url.as_deref())?;
    info!("Commits of {} matching {:?}", repo, form.search_phrase);
    let commits = state.insight.commits(&repo, form.search_phrase.as_deref()).await?;
    Ok(Json(CommitsResponse { commits }))
}

pub async fn get_issues_stats(
    State(state): State<AppState>,
    form: Result<Form<RepoForm>, FormRejection>,
) -> Result<Json<LabelStats>, ApiError> {
    let form = form_fields(form);
    let repo = repo_ref(form.repo_url.as_deref())?;
    info!("Issue labels of {}", repo);
    Ok(Json(state.insight.label_stats(&repo).await?))
}

pub async fn get_commit_frequency(
    State(state): State<AppState>,
    form: Result<Form<CommitFrequencyForm>, FormRejection>,
) -> Result<Json<FrequencyHistogram>, ApiError> {
    let form = form_fields(form);
    let repo = repo_ref(form.repo_url.as_deref())?;
    let query = FrequencyQuery {
        group_by: form.group_by,
        date_from: form.date_from,
        date_to: form.date_to,
    };
    info!("Commit frequency of {} for {:?}", repo, query);
    Ok(Json(state.insight.commit_frequency(&repo, &query).await?))
}
