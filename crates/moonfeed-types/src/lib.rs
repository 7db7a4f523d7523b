/// Shared data model of the moonfeed engine: messages as they arrive from the
/// game server, the viewer context they are filtered against, and the events
/// a feed view consumes.

pub mod events;
pub mod models;

pub use events::FeedEvent;
pub use models::{Channel, Message, MessageKind, Role, Sender, ViewerContext};
