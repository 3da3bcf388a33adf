use anyhow::Result;
use clap::Parser;
use cp_mentor::{init_tracing, AppState, Config, RecommendationRequest};
use tracing::info;

/// Prints weak-topic recommendations for one Codeforces handle as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    handle: String,

    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long)]
    per_topic: Option<i64>,

    #[arg(short, long)]
    force_refresh: bool,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn build_request(args: &Args) -> RecommendationRequest {
    let request = RecommendationRequest::new(args.handle.clone())
        .with_force_refresh(args.force_refresh);
    match args.per_topic {
        Some(per_topic) => request.with_per_topic(per_topic),
        None => request,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing().await;

    let config = Config::load_or_default(&args.config)?;
    info!("Using dataset at {}", config.dataset.dir.display());

    let state = AppState::new(config).await?;

    let request = build_request(&args);
    let response = state
        .recommendation_service
        .get_recommendations(&request)
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
