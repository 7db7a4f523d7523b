use serde::{Deserialize, Serialize};

use crate::models::{Message, ViewerContext};

/// Events consumed by a feed view, as delivered by the client shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FeedEvent {
    /// A new message arrived on the live stream
    MessageCreate(Message),

    /// The game-state layer recomputed the viewer context
    /// (role reveal, death, day/night flip, game end)
    ContextUpdate(ViewerContext),

    /// The feed container was resized
    Resize { width: u32, height: u32 },

    /// The user scrolled the feed to an absolute offset
    Scroll { offset: u64 },

    /// The user activated the display name on a rendered row
    Activate { row: usize },
}

impl FeedEvent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageCreate(_) => "message_create",
            Self::ContextUpdate(_) => "context_update",
            Self::Resize { .. } => "resize",
            Self::Scroll { .. } => "scroll",
            Self::Activate { .. } => "activate",
        }
    }
}
