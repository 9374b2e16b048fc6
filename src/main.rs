use clap::Parser;
use repo_insight::api::Error;
use repo_insight_app::Args;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    repo_insight_app::serve(args).await
}
