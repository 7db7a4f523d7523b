use chrono::{DateTime, Utc};
use tracing::{debug, info, trace};
use uuid::Uuid;

use moonfeed_content::{Annotated, Highlighter, Sanitizer};
use moonfeed_types::{Message, MessageKind, ViewerContext};

use crate::config::FeedConfig;
use crate::measure::RowState;
use crate::redaction::{DisplayName, display_name};
use crate::visibility::{filter_visible, is_visible};
use crate::window::{Viewport, Window, WindowedRenderer};

/// How a rendered row's author should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
    System,
    /// Sanitized sender name; activatable.
    Named(String),
    /// Placeholder hiding the sender; not activatable.
    Anonymous(&'static str),
}

impl Author {
    pub fn label(&self) -> &str {
        match self {
            Self::System => crate::redaction::SYSTEM_LABEL,
            Self::Named(name) => name,
            Self::Anonymous(placeholder) => placeholder,
        }
    }
}

/// One materialized row, ready for the render layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    /// Position in the filtered feed.
    pub row: usize,
    pub message_id: Uuid,
    pub kind: MessageKind,
    pub author: Author,
    pub body: Annotated,
    pub style_class: Option<String>,
    pub created_at: DateTime<Utc>,
    pub state: RowState,
    /// Top edge of the row within the scrollable content.
    pub top: u64,
}

/// Output of [`FeedView::render`].
#[derive(Debug, Clone)]
pub struct RenderPass {
    pub window: Window,
    pub rows: Vec<RenderedRow>,
}

/// Target of a click on a row's display name, forwarded to whoever handles
/// mentions or profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderActivation {
    pub row: usize,
    pub message_id: Uuid,
    pub sender_name: String,
}

/// A mounted feed: the full message stream, the rows the current viewer may
/// see, and the per-instance render state. Create one on mount, drop it on
/// unmount; nothing here is shared between viewers.
#[derive(Debug)]
pub struct FeedView {
    stream: Vec<Message>,
    /// Indices into `stream` of the visible messages, in arrival order.
    rows: Vec<usize>,
    ctx: ViewerContext,
    sanitizer: Sanitizer,
    highlighter: Highlighter,
    renderer: WindowedRenderer,
}

impl FeedView {
    pub fn new(config: &FeedConfig, ctx: ViewerContext) -> Self {
        Self {
            stream: Vec::new(),
            rows: Vec::new(),
            highlighter: Highlighter::new(&ctx.viewer_name),
            ctx,
            sanitizer: Sanitizer::new(config.max_body_bytes),
            renderer: WindowedRenderer::new(config.default_row_height, config.follow),
        }
    }

    pub fn context(&self) -> &ViewerContext {
        &self.ctx
    }

    /// Messages received so far, visible or not.
    pub fn stream_len(&self) -> usize {
        self.stream.len()
    }

    /// Rows the current viewer can see.
    pub fn visible_len(&self) -> usize {
        self.rows.len()
    }

    pub fn renderer(&self) -> &WindowedRenderer {
        &self.renderer
    }

    /// Message shown at `row`, if any.
    pub fn message_at(&self, row: usize) -> Option<&Message> {
        self.rows.get(row).and_then(|&idx| self.stream.get(idx))
    }

    /// Append an incoming message. Only the new message is checked against
    /// the viewer context. Returns its row when it is visible.
    pub fn append(&mut self, msg: Message) -> Option<usize> {
        let visible = is_visible(&msg, &self.ctx);
        trace!(
            "Message {} on channel {} visible={}",
            msg.id,
            msg.channel.number(),
            visible
        );
        self.stream.push(msg);
        if !visible {
            return None;
        }
        let row = self.rows.len();
        self.rows.push(self.stream.len() - 1);
        self.renderer.push_row();
        Some(row)
    }

    /// Swap in a new viewer context and re-filter the whole history.
    ///
    /// Row indices change meaning, so all measurements are dropped. A rename
    /// alone only rebuilds the mention matcher.
    pub fn set_context(&mut self, ctx: ViewerContext) {
        if ctx == self.ctx {
            return;
        }
        if ctx.viewer_name != self.ctx.viewer_name {
            self.highlighter = Highlighter::new(&ctx.viewer_name);
            let renamed_only = ViewerContext {
                viewer_name: ctx.viewer_name.clone(),
                ..self.ctx.clone()
            } == ctx;
            if renamed_only {
                debug!("Viewer renamed to '{}'", ctx.viewer_name);
                self.ctx = ctx;
                return;
            }
        }
        self.ctx = ctx;
        self.rows = filter_visible(&self.stream, &self.ctx);
        self.renderer.reset_rows(self.rows.len());
        info!(
            "Viewer context changed (role={:?} alive={} night={} game_over={}): {} of {} messages visible",
            self.ctx.viewer_role,
            self.ctx.is_alive,
            self.ctx.is_night_phase,
            self.ctx.is_game_over,
            self.rows.len(),
            self.stream.len()
        );
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if self.renderer.set_viewport(Viewport { width, height }) {
            debug!("Feed viewport resized to {}x{}", width, height);
        }
    }

    pub fn scroll_to(&mut self, offset: u64) {
        self.renderer.scroll_to(offset);
    }

    /// Report the laid-out height of a rendered row.
    pub fn record_height(&mut self, row: usize, height: u32) -> bool {
        self.renderer.record_height(row, height)
    }

    /// Compute the window and build the rows inside it.
    pub fn render(&mut self) -> RenderPass {
        let window = self.renderer.window();
        let rows = window
            .rendered
            .clone()
            .filter_map(|row| self.build_row(row))
            .collect();
        RenderPass { window, rows }
    }

    /// Sanitize → resolve the display name → highlight, for one row.
    pub fn build_row(&self, row: usize) -> Option<RenderedRow> {
        let msg = self.message_at(row)?;

        let clean_body = self.sanitizer.sanitize(&msg.body);
        let author = match display_name(msg, &self.ctx) {
            DisplayName::System => Author::System,
            DisplayName::Sender(name) => Author::Named(self.sanitizer.sanitize(name)),
            DisplayName::Redacted(placeholder) => Author::Anonymous(placeholder),
        };
        let mut body = self.highlighter.highlight(&clean_body);
        if let Some(icon) = &msg.icon {
            body.prepend_icon(icon.clone());
        }

        Some(RenderedRow {
            row,
            message_id: msg.id,
            kind: msg.kind,
            author,
            body,
            style_class: msg.style_class.clone(),
            created_at: msg.created_at,
            state: self.renderer.row_state(row),
            top: self.renderer.row_top(row),
        })
    }

    /// Resolve a click on the display name of `row`. System rows and
    /// anonymized rows have no activation target.
    pub fn activate(&self, row: usize) -> Option<SenderActivation> {
        let rendered = self.build_row(row)?;
        match rendered.author {
            Author::Named(sender_name) if !sender_name.is_empty() => Some(SenderActivation {
                row,
                message_id: rendered.message_id,
                sender_name,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonfeed_content::Segment;
    use moonfeed_types::{Channel, Role, Sender};

    use crate::redaction::AFTERLIFE_PLACEHOLDER;

    fn config() -> FeedConfig {
        FeedConfig {
            default_row_height: 20,
            ..Default::default()
        }
    }

    fn user(channel: Channel, name: &str, body: &str) -> Message {
        Message::new(channel, Sender::User(name.into()), body)
    }

    fn villager(name: &str) -> ViewerContext {
        ViewerContext {
            viewer_role: Role::Villager,
            is_alive: true,
            viewer_name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_append_filters_only_new_message() {
        let mut feed = FeedView::new(&config(), villager("bob"));
        assert_eq!(feed.append(user(Channel::Public, "ana", "hi")), Some(0));
        assert_eq!(feed.append(user(Channel::Afterlife, "ghost", "boo")), None);
        assert_eq!(feed.append(user(Channel::Public, "cid", "yo")), Some(1));
        assert_eq!(feed.stream_len(), 3);
        assert_eq!(feed.visible_len(), 2);
        assert_eq!(feed.message_at(1).map(|m| m.body.as_str()), Some("yo"));
    }

    #[test]
    fn test_context_change_refilters_history() {
        let mut feed = FeedView::new(&config(), villager("bob"));
        feed.set_viewport(300, 100);
        for channel in [0u8, 2, 3, 0, 1] {
            feed.append(user(Channel::from(channel), "x", "m"));
        }
        assert_eq!(feed.visible_len(), 2);
        feed.record_height(0, 50);

        let mut dead = villager("bob");
        dead.is_alive = false;
        feed.set_context(dead);
        assert_eq!(feed.visible_len(), 3);
        assert_eq!(feed.renderer().row_state(0), RowState::PendingFirstMeasure);

        let over = ViewerContext {
            is_game_over: true,
            ..villager("bob")
        };
        feed.set_context(over);
        assert_eq!(feed.visible_len(), 5);
    }

    #[test]
    fn test_row_pipeline_sanitizes_then_highlights() {
        let mut feed = FeedView::new(&config(), villager("Bob"));
        feed.set_viewport(300, 200);
        let mut msg = user(Channel::Public, "<i>ana</i>", "<script>x()</script>hey <b>bob</b>!");
        msg.icon = Some("crown".into());
        msg.kind = MessageKind::LeaderBanner;
        feed.append(msg);

        let pass = feed.render();
        assert_eq!(pass.rows.len(), 1);
        let row = &pass.rows[0];
        assert_eq!(row.author, Author::Named("ana".into()));
        assert_eq!(row.kind, MessageKind::LeaderBanner);
        assert_eq!(
            row.body.segments(),
            &[
                Segment::Icon("crown".into()),
                Segment::Text("hey ".into()),
                Segment::Mention("Bob".into()),
                Segment::Text("!".into()),
            ]
        );
        assert_eq!(row.state, RowState::PendingFirstMeasure);
    }

    #[test]
    fn test_medium_sees_anonymous_afterlife() {
        let medium = ViewerContext {
            viewer_role: Role::Medium,
            is_alive: true,
            is_night_phase: true,
            ..Default::default()
        };
        let mut feed = FeedView::new(&config(), medium);
        feed.set_viewport(300, 200);
        feed.append(user(Channel::Afterlife, "ghost", "I was the seer"));
        let pass = feed.render();
        assert_eq!(pass.rows[0].author, Author::Anonymous(AFTERLIFE_PLACEHOLDER));
        assert_eq!(pass.rows[0].author.label(), "(Anonymous)");
        assert_eq!(feed.activate(0), None);
    }

    #[test]
    fn test_activation_targets() {
        let mut feed = FeedView::new(&config(), villager("bob"));
        let id = {
            let msg = user(Channel::Public, "ana", "hi");
            let id = msg.id;
            feed.append(msg);
            id
        };
        feed.append(Message::new(Channel::Public, Sender::System, "Day breaks."));

        assert_eq!(
            feed.activate(0),
            Some(SenderActivation {
                row: 0,
                message_id: id,
                sender_name: "ana".into(),
            })
        );
        assert_eq!(feed.activate(1), None);
        assert_eq!(feed.activate(7), None);
    }

    #[test]
    fn test_renamed_viewer_rebuilds_highlighter() {
        let mut feed = FeedView::new(&config(), villager("ana"));
        feed.set_viewport(300, 200);
        feed.append(user(Channel::Public, "x", "ana and bob"));
        assert_eq!(feed.render().rows[0].body.mention_count(), 1);

        feed.set_context(villager("bob"));
        let row = feed.build_row(0).unwrap();
        assert_eq!(row.body.to_markup(), "ana and <mark>bob</mark>");
    }

    #[test]
    fn test_rename_keeps_measurements() {
        let mut feed = FeedView::new(&config(), villager("ana"));
        feed.set_viewport(300, 200);
        feed.append(user(Channel::Public, "x", "hi bob"));
        feed.append(user(Channel::Afterlife, "ghost", "boo"));
        feed.record_height(0, 50);

        feed.set_context(villager("bob"));
        assert_eq!(feed.context().viewer_name, "bob");
        assert_eq!(feed.visible_len(), 1);
        assert_eq!(feed.renderer().row_state(0), RowState::Measured);
        assert_eq!(feed.renderer().total_height(), 50);
        assert_eq!(feed.build_row(0).unwrap().body.mention_count(), 1);

        // Any other change still refilters and drops measurements.
        let mut dead = villager("bob");
        dead.is_alive = false;
        feed.set_context(dead);
        assert_eq!(feed.visible_len(), 2);
        assert_eq!(feed.renderer().row_state(0), RowState::PendingFirstMeasure);
    }
}
