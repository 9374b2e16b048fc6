use anyhow::Context;
use github_client::{GithubClient, GithubClientBuilder, FIRST_PAGE_NUMBER, MAX_PAGE_SIZE};
use log::info;
use repo_insight::api::Result;
use repo_insight::RepoInsight;
use std::time::Duration;

mod args;
mod web;

pub use args::Args;
pub use web::router;

pub type GithubInsight = RepoInsight<{ MAX_PAGE_SIZE }, { FIRST_PAGE_NUMBER }, GithubClient>;

pub fn insight(args: &Args) -> Result<GithubInsight> {
    let client = GithubClientBuilder::default()
        .with_github_url(&args.api_url)
        .with_timeout(args.request_timeout.map(Duration::from_secs))
        .try_with_user_agent(&args.user_agent)?
        .build()?;
    Ok(RepoInsight::new(client).with_max_commit_pages(args.max_commit_pages))
}

pub async fn serve(args: Args) -> Result<()> {
    let app = router(insight(&args)?);
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    info!("Serving on http://{} against {}", args.listen, args.api_url);
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
