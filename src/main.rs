use anyhow::Result;
use clap::Parser;
use cp_mentor::{api::create_router, init_tracing, AppState, Config};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "CP Mentor recommendation server", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing().await;

    let config = Config::load_or_default(&args.config)?;
    info!("Starting CP Mentor server with config: {:?}", config.server);

    let addr = config.server.socket_addr();
    let state = AppState::new(config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
