//! Channel-scoped live feed engine.
//!
//! A [`FeedView`] holds the append-only message stream of one mounted feed,
//! filters it for the current viewer ([`visibility`]), resolves anonymized
//! sender names ([`redaction`]), and materializes only the rows around the
//! viewport ([`window`]) using measured row heights ([`measure`], [`layout`]).

pub mod config;
pub mod feed;
pub mod layout;
pub mod measure;
pub mod redaction;
pub mod visibility;
pub mod window;

pub use config::{ConfigError, FeedConfig, FollowPolicy};
pub use feed::{Author, FeedView, RenderPass, RenderedRow, SenderActivation};
pub use measure::{RowMeasurementCache, RowState};
pub use redaction::{DisplayName, display_name};
pub use visibility::{filter_visible, is_visible};
pub use window::{OVERSCAN, Viewport, Window, WindowedRenderer, compute_window};
