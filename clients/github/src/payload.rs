use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize, Debug)]
pub struct Repo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stargazers_count: Option<u64>,
    pub html_url: Option<String>,
}

impl From<Repo> for repo_insight::api::Repository {
    fn from(repo: Repo) -> Self {
        repo_insight::api::Repository {
            name: repo.name,
            description: repo.description,
            stargazers_count: repo.stargazers_count,
            html_url: repo.html_url,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SearchCommits {
    #[serde(default)]
    pub items: Vec<Commit>,
}

#[derive(Deserialize, Debug)]
pub struct Commit {
    pub sha: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub commit: CommitDetails,
}

#[derive(Deserialize, Debug, Default)]
pub struct CommitDetails {
    pub message: Option<String>,
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
}

#[derive(Deserialize, Debug)]
pub struct Signature {
    pub name: Option<String>,
    pub date: Option<String>,
}

impl From<Commit> for repo_insight::api::Commit {
    fn from(commit: Commit) -> Self {
        let CommitDetails {
            message,
            author,
            committer,
        } = commit.commit;
        let (author_name, author_date) = author.map(|author| (author.name, author.date)).unwrap_or_default();
        repo_insight::api::Commit {
            sha: commit.sha,
            message,
            author_name,
            author_date,
            committer_date: committer.and_then(|committer| committer.date),
            html_url: commit.html_url,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Issue {
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Set whenever the key is present, whatever its value.
    #[serde(default, deserialize_with = "present")]
    pub pull_request: bool,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer).map(|_| true)
}

#[derive(Deserialize, Debug)]
pub struct Label {
    pub name: String,
}

impl From<Issue> for repo_insight::api::Issue {
    fn from(issue: Issue) -> Self {
        repo_insight::api::Issue {
            labels: issue.labels.into_iter().map(|label| label.name).collect(),
            pull_request: issue.pull_request,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub message: Option<String>,
}
