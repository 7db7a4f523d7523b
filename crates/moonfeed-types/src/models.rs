use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Channels --

/// Broadcast scope of a message. The numbering is fixed by the producing
/// game server and is not self-describing on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Channel {
    Public,
    Spectator,
    Afterlife,
    Infected,
    KinA,
    KinB,
    /// Any number the engine does not know about. Kept verbatim so it can be
    /// re-serialized, but only ever visible once the game is over.
    Unknown(u8),
}

impl Channel {
    pub fn number(self) -> u8 {
        match self {
            Self::Public => 0,
            Self::Spectator => 1,
            Self::Afterlife => 2,
            Self::Infected => 3,
            Self::KinA => 4,
            Self::KinB => 5,
            Self::Unknown(n) => n,
        }
    }
}

impl From<u8> for Channel {
    fn from(n: u8) -> Self {
        match n {
            0 => Self::Public,
            1 => Self::Spectator,
            2 => Self::Afterlife,
            3 => Self::Infected,
            4 => Self::KinA,
            5 => Self::KinB,
            other => Self::Unknown(other),
        }
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.number()
    }
}

// -- Roles --

/// In-game role of the viewer. `None` means no role at all (pure spectator
/// or a viewer whose role has not been dealt yet).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    None,
    Villager,
    Werewolf,
    BigBadWolf,
    WhiteWolf,
    InfectFather,
    Medium,
    Sister,
    Brother,
    Seer,
    Witch,
    Hunter,
    /// Role names the engine does not recognise. Grants nothing.
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

// -- Messages --

/// Author of a message: a player-visible display name, or the system /
/// moderation sentinel (sent as `null` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Sender {
    User(String),
    System,
}

impl Sender {
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl From<Option<String>> for Sender {
    fn from(name: Option<String>) -> Self {
        match name {
            Some(name) => Self::User(name),
            None => Self::System,
        }
    }
}

impl From<Sender> for Option<String> {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User(name) => Some(name),
            Sender::System => None,
        }
    }
}

/// Template a message is rendered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Standard,
    LeaderBanner,
    PersonalBanner,
    SiteBanner,
}

impl MessageKind {
    /// Collapse the producer's independent template flags into one kind.
    /// Site banners win over leader banners, which win over personal ones.
    pub fn from_flags(is_leader: bool, is_personal: bool, is_site: bool) -> Self {
        match (is_site, is_leader, is_personal) {
            (true, _, _) => Self::SiteBanner,
            (false, true, _) => Self::LeaderBanner,
            (false, false, true) => Self::PersonalBanner,
            (false, false, false) => Self::Standard,
        }
    }
}

/// One entry of the live feed. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireMessage", into = "WireMessage")]
pub struct Message {
    pub id: Uuid,
    pub channel: Channel,
    pub sender: Sender,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub style_class: Option<String>,
    pub icon: Option<String>,
    pub kind: MessageKind,
}

impl Message {
    /// Plain player message on `channel`, stamped now.
    pub fn new(channel: Channel, sender: Sender, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            sender,
            body: body.into(),
            created_at: Utc::now(),
            style_class: None,
            icon: None,
            kind: MessageKind::Standard,
        }
    }
}

/// Message as produced by the game server, with the template encoded as
/// three independent flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    channel: u8,
    #[serde(default)]
    sender_name: Option<String>,
    #[serde(default)]
    body: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default)]
    is_leader_message: bool,
    #[serde(default)]
    is_personal_message: bool,
    #[serde(default)]
    is_system_banner: bool,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Self {
            id: wire.id,
            channel: Channel::from(wire.channel),
            sender: Sender::from(wire.sender_name),
            body: wire.body,
            created_at: wire.created_at,
            style_class: wire.style_class,
            icon: wire.icon,
            kind: MessageKind::from_flags(
                wire.is_leader_message,
                wire.is_personal_message,
                wire.is_system_banner,
            ),
        }
    }
}

impl From<Message> for WireMessage {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            channel: msg.channel.number(),
            sender_name: msg.sender.into(),
            body: msg.body,
            created_at: msg.created_at,
            style_class: msg.style_class,
            icon: msg.icon,
            is_leader_message: msg.kind == MessageKind::LeaderBanner,
            is_personal_message: msg.kind == MessageKind::PersonalBanner,
            is_system_banner: msg.kind == MessageKind::SiteBanner,
        }
    }
}

// -- Viewer --

/// Facts about the current viewer that visibility and redaction depend on.
///
/// Every field defaults to the most restrictive value, so a partially filled
/// snapshot from the game-state layer shows fewer channels, never more.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerContext {
    pub viewer_role: Role,
    pub is_alive: bool,
    pub is_spectator: bool,
    pub is_infected: bool,
    pub is_night_phase: bool,
    pub is_game_over: bool,
    pub viewer_name: String,
}

impl ViewerContext {
    /// A viewer taking part in the game: dealt a role and not spectating.
    pub fn is_player(&self) -> bool {
        !self.viewer_role.is_none() && !self.is_spectator
    }
}
