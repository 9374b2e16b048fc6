//! Repository insight
//!
//! # Overview
//!
//! Answers the questions a repository dashboard asks about a project hosted on a source-control provider:
//! what it is (name, description, stars), what changed recently (latest or matching commits),
//! how its issues are labelled (open and closed issue counts per first label)
//! and how often it is committed to (commit counts per day, ISO week, month or year).
//!
//! Repositories are addressed by their web URL, see [`reference::parse_repo_url`].
//! The provider is reached through the [`api::Client`] trait, so the shaping and aggregation in this crate
//! never see HTTP. Every query is a fresh sequence of upstream calls; nothing is cached between queries.

pub mod api;
pub mod reference;

#[cfg(feature = "insight")]
pub mod frequency;
#[cfg(feature = "insight")]
mod insight;
#[cfg(feature = "insight")]
pub mod shaper;

#[cfg(feature = "insight")]
pub use insight::{FrequencyQuery, RepoInsight};
