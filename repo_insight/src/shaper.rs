//! Reshaping of raw upstream records into the structures served to the browser.

use crate::api::{Commit, Error, Issue, IssueState, Repository, Result};
use chrono::DateTime;
use serde::Serialize;
use std::collections::BTreeMap;

pub const NO_DESCRIPTION: &str = "no description";
pub const UNKNOWN_AUTHOR: &str = "unknown";
pub const NO_LABEL: &str = "no label";
/// Upper bound on the number of commits returned by a single commit listing.
pub const MAX_COMMITS: usize = 100;

const SHORT_SHA_LEN: usize = 7;
const COMMIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub description: String,
    pub stars: u64,
    pub url: String,
}

impl TryFrom<Repository> for RepoSummary {
    type Error = Error;

    fn try_from(repo: Repository) -> Result<Self> {
        Ok(RepoSummary {
            name: repo.name.ok_or(Error::MissingField("name"))?,
            description: repo.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            stars: repo.stargazers_count.ok_or(Error::MissingField("stargazers_count"))?,
            url: repo.html_url.ok_or(Error::MissingField("html_url"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub date: String,
    pub url: String,
}

impl From<Commit> for CommitRecord {
    fn from(commit: Commit) -> Self {
        let sha = commit.sha.unwrap_or_default();
        CommitRecord {
            sha: sha.chars().take(SHORT_SHA_LEN).collect(),
            message: commit.message.unwrap_or_default(),
            author: commit.author_name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            date: commit.author_date.as_deref().map(display_date).unwrap_or_default(),
            url: commit.html_url.unwrap_or_default(),
        }
    }
}

/// Formats an upstream timestamp in the offset it was recorded in.
/// Unparsable input yields an empty string.
fn display_date(date: &str) -> String {
    DateTime::parse_from_rfc3339(date)
        .map(|date| date.format(COMMIT_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Maps at most `MAX_COMMITS` raw commits to `CommitRecord`s, keeping upstream order.
pub fn format_commits(commits: Vec<Commit>) -> Vec<CommitRecord> {
    commits.into_iter().take(MAX_COMMITS).map(CommitRecord::from).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub open: u32,
    pub closed: u32,
}

impl LabelCount {
    fn increment(&mut self, state: IssueState) {
        match state {
            IssueState::Open => self.open += 1,
            IssueState::Closed => self.closed += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelStats {
    pub labels: BTreeMap<String, LabelCount>,
}

impl LabelStats {
    /// Counts every true issue of `issues` once, under its first label.
    /// Pull requests are skipped.
    pub fn add_issues(&mut self, state: IssueState, issues: Vec<Issue>) {
        for issue in issues.into_iter().filter(|issue| !issue.pull_request) {
            let label = issue.labels.into_iter().next().unwrap_or_else(|| NO_LABEL.to_string());
            self.labels.entry(label).or_default().increment(state);
        }
    }

    pub fn total(&self, state: IssueState) -> u32 {
        self.labels
            .values()
            .map(|count| match state {
                IssueState::Open => count.open,
                IssueState::Closed => count.closed,
            })
            .sum()
    }
}

#[test]
fn summary_defaults_description() {
    let repo = Repository {
        name: Some("widgets".into()),
        description: None,
        stargazers_count: Some(42),
        html_url: Some("https://github.com/acme/widgets".into()),
    };
    let summary = RepoSummary::try_from(repo).unwrap();
    assert_eq!(summary.description, NO_DESCRIPTION);
    assert_eq!(summary.stars, 42);
}

#[test]
fn summary_requires_stars() {
    let repo = Repository {
        name: Some("widgets".into()),
        html_url: Some("https://github.com/acme/widgets".into()),
        ..Default::default()
    };
    let err = RepoSummary::try_from(repo).unwrap_err();
    assert!(matches!(err, Error::MissingField("stargazers_count")));
}

#[test]
fn commit_record_defaults() {
    let record = CommitRecord::from(Commit {
        sha: Some("0123456789abcdef".into()),
        author_date: Some("2024-01-15T10:00:00+02:00".into()),
        ..Default::default()
    });
    assert_eq!(record.sha, "0123456");
    assert_eq!(record.author, UNKNOWN_AUTHOR);
    assert_eq!(record.date, "2024-01-15 10:00:00");
    assert_eq!(record.message, "");
}

#[test]
fn commit_record_bad_date_is_blank() {
    let record = CommitRecord::from(Commit {
        author_date: Some("last tuesday".into()),
        ..Default::default()
    });
    assert_eq!(record.date, "");
}

#[test]
fn format_commits_truncates() {
    let commits = (0..150)
        .map(|i| Commit {
            sha: Some(format!("{:040}", i)),
            ..Default::default()
        })
        .collect();
    let records = format_commits(commits);
    assert_eq!(records.len(), MAX_COMMITS);
    assert_eq!(records[0].sha, "0000000");
}

#[test]
fn label_stats_first_label_only() {
    let mut stats = LabelStats::default();
    stats.add_issues(
        IssueState::Open,
        vec![
            Issue::new(vec!["bug".into(), "ui".into()], false),
            Issue::new(vec!["bug".into()], true),
        ],
    );
    stats.add_issues(IssueState::Closed, vec![Issue::new(vec![], false)]);

    let mut expected = BTreeMap::new();
    expected.insert("bug".to_string(), LabelCount { open: 1, closed: 0 });
    expected.insert(NO_LABEL.to_string(), LabelCount { open: 0, closed: 1 });
    assert_eq!(stats.labels, expected);
    assert_eq!(stats.total(IssueState::Open), 1);
    assert_eq!(stats.total(IssueState::Closed), 1);
}
