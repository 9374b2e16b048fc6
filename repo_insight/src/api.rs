use async_trait::async_trait;
use derive_more::Constructor;
use std::fmt::Display;
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumIter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} is required")]
    MissingInput(&'static str),
    #[error("Invalid repository URL: {0}")]
    MalformedReference(String),
    #[error("{0}")]
    UpstreamNotFound(String),
    #[error("Failed to fetch data")]
    UpstreamUnavailable,
    #[error("missing field `{0}` in upstream response")]
    MissingField(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Repository coordinates on the hosting provider.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository as reported upstream. Missing fields are kept as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repository {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stargazers_count: Option<u64>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Commit {
    pub sha: Option<String>,
    pub message: Option<String>,
    pub author_name: Option<String>,
    pub author_date: Option<String>,
    pub committer_date: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Constructor)]
pub struct Issue {
    /// Label names in upstream order.
    pub labels: Vec<String>,
    /// Set when the record is a pull request listed by the issues endpoint.
    pub pull_request: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, StrumDisplay, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// Read access to a source-control hosting provider.
///
/// `MAX_PAGE_SIZE` is the largest `per_page` the provider honours and
/// `FIRST_PAGE_NUMBER` the index of its first page.
#[async_trait]
pub trait Client<const MAX_PAGE_SIZE: u32, const FIRST_PAGE_NUMBER: u32>: Send + Sync {
    async fn repository(&self, repo: &RepoRef) -> Result<Repository>;

    async fn commits(&self, repo: &RepoRef, page: u32, per_page: u32) -> Result<Vec<Commit>>;

    async fn search_commits(&self, repo: &RepoRef, phrase: &str, per_page: u32) -> Result<Vec<Commit>>;

    async fn issues(&self, repo: &RepoRef, state: IssueState, page: u32, per_page: u32) -> Result<Vec<Issue>>;
}
