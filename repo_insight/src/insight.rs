use crate::api::{Client, IssueState, RepoRef, Result};
use crate::frequency::{DateRange, FrequencyCounter, FrequencyHistogram, Granularity};
use crate::shaper::{format_commits, CommitRecord, LabelStats, RepoSummary};
use chrono::Utc;
use derive_more::Constructor;
use log::{debug, warn};
use strum::IntoEnumIterator;

/// Parameters of a commit frequency query.
#[derive(Debug, Clone, Default)]
pub struct FrequencyQuery {
    pub group_by: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Runs the repository queries against a hosting provider `CLIENT`.
/// Holds no per-request state.
pub struct RepoInsight<const MAX_PAGE_SIZE: u32, const FIRST_PAGE_NUMBER: u32, CLIENT>
where
    CLIENT: 'static + Client<MAX_PAGE_SIZE, FIRST_PAGE_NUMBER>,
{
    client: CLIENT,
    max_commit_pages: Option<u32>,
}

impl<const MAX_PAGE_SIZE: u32, const FIRST_PAGE_NUMBER: u32, CLIENT> RepoInsight<MAX_PAGE_SIZE, FIRST_PAGE_NUMBER, CLIENT>
where
    CLIENT: 'static + Client<MAX_PAGE_SIZE, FIRST_PAGE_NUMBER>,
{
    pub fn new(client: CLIENT) -> Self {
        RepoInsight {
            client,
            max_commit_pages: None,
        }
    }

    /// Caps the commit history walk of `commit_frequency`. `None` walks until an empty page.
    pub fn with_max_commit_pages(mut self, max_commit_pages: Option<u32>) -> Self {
        self.max_commit_pages = max_commit_pages;
        self
    }

    pub async fn summary(&self, repo: &RepoRef) -> Result<RepoSummary> {
        let repository = self.client.repository(repo).await?;
        RepoSummary::try_from(repository)
    }

    /// Latest commits, or the commits matching `phrase` when one is given.
    pub async fn commits(&self, repo: &RepoRef, phrase: Option<&str>) -> Result<Vec<CommitRecord>> {
        let commits = match phrase.filter(|phrase| !phrase.is_empty()) {
            Some(phrase) => self.client.search_commits(repo, phrase, MAX_PAGE_SIZE).await?,
            None => self.client.commits(repo, FIRST_PAGE_NUMBER, MAX_PAGE_SIZE).await?,
        };
        debug!("Received {} commits for {}", commits.len(), repo);
        Ok(format_commits(commits))
    }

    /// Issue counts per first label and state. Reads only the first page of each state.
    pub async fn label_stats(&self, repo: &RepoRef) -> Result<LabelStats> {
        let mut stats = LabelStats::default();
        for state in IssueState::iter() {
            let issues = self.client.issues(repo, state, FIRST_PAGE_NUMBER, MAX_PAGE_SIZE).await?;
            debug!("Received {} {} issues for {}", issues.len(), state, repo);
            stats.add_issues(state, issues);
        }
        Ok(stats)
    }

    pub async fn commit_frequency(&self, repo: &RepoRef, query: &FrequencyQuery) -> Result<FrequencyHistogram> {
        let granularity = Granularity::parse_or_default(query.group_by.as_deref());
        let range = DateRange::resolve(
            non_empty(query.date_from.as_deref()),
            non_empty(query.date_to.as_deref()),
            Utc::now(),
        );
        let mut counter = FrequencyCounter::new(range, granularity);
        let mut paginator = Paginator::starting_at(FIRST_PAGE_NUMBER, self.max_commit_pages);
        while let Some(page) = paginator.next_page() {
            let commits = self.client.commits(repo, page, MAX_PAGE_SIZE).await?;
            debug!("Received {} commits from page {} of {}", commits.len(), page, repo);
            if commits.is_empty() {
                return Ok(counter.finish());
            }
            counter.add_commits(&commits);
        }
        warn!(
            "Stopped reading commits of {} after {} pages, histogram is partial",
            repo,
            paginator.pages_read()
        );
        Ok(counter.finish())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Hands out page numbers until the optional ceiling is reached.
#[derive(Constructor)]
struct Paginator {
    first_page_no: u32,
    page_no: u32,
    max_pages: Option<u32>,
}

impl Paginator {
    fn starting_at(first_page_no: u32, max_pages: Option<u32>) -> Self {
        Paginator::new(first_page_no, first_page_no, max_pages)
    }

    fn next_page(&mut self) -> Option<u32> {
        match self.max_pages {
            Some(max_pages) if self.pages_read() >= max_pages => None,
            _ => {
                let page_no = self.page_no;
                self.page_no += 1;
                Some(page_no)
            }
        }
    }

    fn pages_read(&self) -> u32 {
        self.page_no - self.first_page_no
    }
}
