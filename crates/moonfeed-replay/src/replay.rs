use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use moonfeed_engine::{FeedView, RowState};
use moonfeed_types::FeedEvent;

use crate::observer::estimate_height;

/// Read newline-delimited JSON events from `path` and forward them.
/// Lines that do not parse are logged and skipped.
pub async fn read_events(path: PathBuf, tx: mpsc::Sender<FeedEvent>) -> Result<usize> {
    let file = File::open(&path)
        .await
        .with_context(|| format!("opening replay file {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut line_no = 0usize;
    let mut sent = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<FeedEvent>(line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    break;
                }
                sent += 1;
            }
            Err(e) => {
                let preview: String = line.chars().take(200).collect();
                warn!("line {}: bad event: {} -- raw: {}", line_no, e, preview);
            }
        }
    }

    Ok(sent)
}

/// Totals reported when the stream ends.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub events: usize,
    pub passes: usize,
    pub activations: usize,
}

/// The single UI loop: owns the feed and handles one event at a time.
pub async fn run_feed(mut feed: FeedView, mut rx: mpsc::Receiver<FeedEvent>) -> (FeedView, ReplaySummary) {
    let mut summary = ReplaySummary::default();

    while let Some(event) = rx.recv().await {
        summary.events += 1;
        debug!("event {}", event.name());

        match event {
            FeedEvent::MessageCreate(msg) => {
                if feed.append(msg).is_none() {
                    continue;
                }
            }
            FeedEvent::ContextUpdate(ctx) => feed.set_context(ctx),
            FeedEvent::Resize { width, height } => feed.set_viewport(width, height),
            FeedEvent::Scroll { offset } => feed.scroll_to(offset),
            FeedEvent::Activate { row } => {
                match feed.activate(row) {
                    Some(target) => {
                        summary.activations += 1;
                        info!(
                            "Activated {} on row {} (message {})",
                            target.sender_name, target.row, target.message_id
                        );
                    }
                    None => debug!("Row {} has no activation target", row),
                }
                continue;
            }
        }

        render_and_measure(&mut feed);
        summary.passes += 1;
    }

    (feed, summary)
}

/// One render pass followed by the layout observer reporting heights of rows
/// it has not measured yet.
fn render_and_measure(feed: &mut FeedView) {
    let pass = feed.render();
    let width = feed.renderer().viewport().width;

    for row in &pass.rows {
        debug!("row {} [{}] {}", row.row, row.author.label(), row.body.to_markup());
        if row.state == RowState::PendingFirstMeasure {
            feed.record_height(row.row, estimate_height(row, width));
        }
    }

    info!(
        "rows {:?} of {} (rendered {:?}, scroll {} / {})",
        pass.window.visible,
        feed.visible_len(),
        pass.window.rendered,
        pass.window.scroll_offset,
        pass.window.total_height
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonfeed_engine::FeedConfig;
    use moonfeed_types::{Channel, Message, Sender, ViewerContext};

    #[tokio::test]
    async fn feed_loop_processes_events_in_order() {
        let feed = FeedView::new(&FeedConfig::default(), ViewerContext::default());
        let (tx, rx) = mpsc::channel(16);

        tx.send(FeedEvent::Resize { width: 320, height: 200 }).await.unwrap();
        tx.send(FeedEvent::MessageCreate(Message::new(
            Channel::Public,
            Sender::User("ana".into()),
            "hello",
        )))
        .await
        .unwrap();
        tx.send(FeedEvent::MessageCreate(Message::new(
            Channel::Afterlife,
            Sender::User("ghost".into()),
            "boo",
        )))
        .await
        .unwrap();
        tx.send(FeedEvent::Activate { row: 0 }).await.unwrap();
        drop(tx);

        let (feed, summary) = run_feed(feed, rx).await;
        assert_eq!(summary.events, 4);
        assert_eq!(summary.passes, 2);
        assert_eq!(summary.activations, 1);
        assert_eq!(feed.stream_len(), 2);
        assert_eq!(feed.visible_len(), 1);
        assert_eq!(feed.renderer().row_state(0), RowState::Measured);
    }

    #[tokio::test]
    async fn reader_skips_bad_lines() {
        let path = std::env::temp_dir().join(format!("moonfeed_replay_{}.jsonl", std::process::id()));
        std::fs::write(
            &path,
            "# comment\n\
             {\"type\":\"Resize\",\"data\":{\"width\":320,\"height\":200}}\n\
             not json\n\
             \n\
             {\"type\":\"MessageCreate\",\"data\":{\"channel\":0,\"sender_name\":\"ana\",\"body\":\"hi\"}}\n",
        )
        .unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let sent = read_events(path.clone(), tx).await.unwrap();
        assert_eq!(sent, 2);
        assert!(matches!(rx.recv().await, Some(FeedEvent::Resize { .. })));
        assert!(matches!(rx.recv().await, Some(FeedEvent::MessageCreate(_))));
        assert!(rx.recv().await.is_none());

        let _ = std::fs::remove_file(path);
    }
}
