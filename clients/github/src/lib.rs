//! GitHub REST API implementation of [`repo_insight::api::Client`].

mod builder;
mod payload;

pub use builder::{GithubClientBuilder, DEFAULT_GITHUB_URL, DEFAULT_USER_AGENT};

use anyhow::Context;
use async_trait::async_trait;
use log::{debug, error, warn};
use repo_insight::api::{Client, Commit, Error, Issue, IssueState, RepoRef, Repository, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// GitHub returns at most this many items per page.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const FIRST_PAGE_NUMBER: u32 = 1;
const UNKNOWN_ERROR: &str = "Unknown error";

pub struct GithubClient {
    client: reqwest::Client,
    github_url: String,
}

impl GithubClient {
    /// Single GET attempt. 200 yields the decoded body, 404 the upstream message,
    /// anything else (including transport failures) `UpstreamUnavailable`.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let request_url = format!("{}{}", self.github_url, path);
        debug!("GET {} {:?}", request_url, query);
        let response = self
            .client
            .get(&request_url)
            .query(query)
            .send()
            .await
            .map_err(|err| {
                error!("Request to {} failed: {}", request_url, err);
                Error::UpstreamUnavailable
            })?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    match response.status() {
        StatusCode::OK => {
            let url = response.url().to_string();
            Ok(response
                .json::<T>()
                .await
                .with_context(|| format!("Unexpected response from {}", url))?)
        }
        StatusCode::NOT_FOUND => {
            let message = response
                .json::<payload::ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            Err(Error::UpstreamNotFound(message))
        }
        status => {
            warn!("{} answered with status {}", response.url(), status);
            Err(Error::UpstreamUnavailable)
        }
    }
}

fn repo_path(repo: &RepoRef) -> String {
    format!("/repos/{}/{}", repo.owner, repo.name)
}

#[async_trait]
impl Client<{ MAX_PAGE_SIZE }, { FIRST_PAGE_NUMBER }> for GithubClient {
    async fn repository(&self, repo: &RepoRef) -> Result<Repository> {
        let repo = self.get::<payload::Repo>(&repo_path(repo), &[]).await?;
        Ok(repo.into())
    }

    async fn commits(&self, repo: &RepoRef, page: u32, per_page: u32) -> Result<Vec<Commit>> {
        let path = format!("{}/commits", repo_path(repo));
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        let commits = self.get::<Vec<payload::Commit>>(&path, &query).await?;
        Ok(commits.into_iter().map(Commit::from).collect())
    }

    async fn search_commits(&self, repo: &RepoRef, phrase: &str, per_page: u32) -> Result<Vec<Commit>> {
        let query = [
            ("q", format!("repo:{} {}", repo, phrase)),
            ("per_page", per_page.to_string()),
        ];
        let found = self.get::<payload::SearchCommits>("/search/commits", &query).await?;
        Ok(found.items.into_iter().map(Commit::from).collect())
    }

    async fn issues(&self, repo: &RepoRef, state: IssueState, page: u32, per_page: u32) -> Result<Vec<Issue>> {
        let path = format!("{}/issues", repo_path(repo));
        let query = [
            ("state", state.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let issues = self.get::<Vec<payload::Issue>>(&path, &query).await?;
        Ok(issues.into_iter().map(Issue::from).collect())
    }
}
