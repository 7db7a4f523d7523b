mod observer;
mod replay;

use std::path::PathBuf;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::info;

use moonfeed_engine::config::parse_positive;
use moonfeed_engine::{FeedConfig, FeedView};
use moonfeed_types::ViewerContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moonfeed=debug".into()),
        )
        .init();

    // Config
    let config = FeedConfig::from_env()?;
    let width: u32 = match std::env::var("MOONFEED_VIEWPORT_WIDTH") {
        Ok(v) => parse_positive("MOONFEED_VIEWPORT_WIDTH", &v)?,
        Err(_) => 640,
    };
    let height: u32 = match std::env::var("MOONFEED_VIEWPORT_HEIGHT") {
        Ok(v) => parse_positive("MOONFEED_VIEWPORT_HEIGHT", &v)?,
        Err(_) => 480,
    };
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MOONFEED_REPLAY_PATH").ok())
        .map(PathBuf::from)
        .context("usage: moonfeed-replay <events.jsonl> (or set MOONFEED_REPLAY_PATH)")?;

    info!(
        "Replaying {} ({}x{}, row estimate {}px, follow {:?})",
        path.display(),
        width,
        height,
        config.default_row_height,
        config.follow
    );

    let mut feed = FeedView::new(&config, ViewerContext::default());
    feed.set_viewport(width, height);

    // Reader task -> single feed loop
    let (tx, rx) = mpsc::channel(256);
    let reader = tokio::spawn(replay::read_events(path, tx));

    let (feed, summary) = replay::run_feed(feed, rx).await;
    let sent = reader.await??;

    info!(
        "Replay done: {} events parsed, {} handled, {} render passes, {} activations; {} of {} messages visible, peak {} rows rendered",
        sent,
        summary.events,
        summary.passes,
        summary.activations,
        feed.visible_len(),
        feed.stream_len(),
        feed.renderer().peak_rendered()
    );

    Ok(())
}
