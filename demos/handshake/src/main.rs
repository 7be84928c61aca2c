//! Port discovery between simulated frames.
//!
//! Sets up the usual layout, a host page with a sidebar, a notebook and some
//! guest frames, then has every frame find the ones it talks to:
//! - sidebar -> host
//! - guest -> host, guest -> sidebar (brokered by the host)
//! - notebook -> sidebar (brokered by the host)
//!
//! Run:
//!   cargo run -p framelink-demo-handshake -- --guests 3
//!   cargo run -p framelink-demo-handshake -- --config framelink.toml

mod config;
mod frames;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Run port discovery between simulated frames")]
struct Args {
    /// TOML configuration file.
    #[arg(long, env = "FRAMELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Number of guest frames.
    #[arg(long, default_value_t = 2)]
    guests: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("handshake=info".parse()?))
        .init();

    let args = Args::parse();
    let config = config::Config::load(args.config.as_deref())?;

    tracing::info!(
        host = %config.host_origin,
        apps = %config.provider.apps_origin,
        guests = args.guests,
        "starting frames"
    );

    frames::run(config, args.guests).await
}
