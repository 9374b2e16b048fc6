use crate::api::{Error, RepoRef, Result};
use std::str::FromStr;
use url::{ParseError, Url};

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(repo_url: &str) -> Result<Self> {
        parse_repo_url(repo_url)
    }
}

/// Extracts `(owner, name)` from the first two non-empty path segments of `repo_url`.
///
/// Anything after the second segment (`tree/main`, query, fragment) is ignored.
/// Input without a scheme is read as an `https` URL.
pub fn parse_repo_url(repo_url: &str) -> Result<RepoRef> {
    let repo_url = repo_url.trim();
    let url = match Url::parse(repo_url) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", repo_url))
            .map_err(|_| Error::MalformedReference(repo_url.to_string()))?,
        Err(_) => return Err(Error::MalformedReference(repo_url.to_string())),
    };
    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty());
    match (segments.next(), segments.next()) {
        (Some(owner), Some(name)) => Ok(RepoRef::new(owner.to_string(), name.to_string())),
        _ => Err(Error::MalformedReference(repo_url.to_string())),
    }
}
