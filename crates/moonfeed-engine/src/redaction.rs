use moonfeed_types::{Channel, Message, Role, Sender, ViewerContext};

use crate::visibility::NIGHT_LISTENER;

/// Name shown for a message's author. Exactly one variant per
/// (message, viewer) pair, so a redacted row can never also carry the
/// sender's real name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayName<'a> {
    /// System or moderation message.
    System,
    /// The author's own display name.
    Sender(&'a str),
    /// Placeholder hiding the author.
    Redacted(&'static str),
}

impl DisplayName<'_> {
    pub fn is_redacted(&self) -> bool {
        matches!(self, Self::Redacted(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::System => SYSTEM_LABEL,
            Self::Sender(name) => name,
            Self::Redacted(placeholder) => placeholder,
        }
    }
}

pub const SYSTEM_LABEL: &str = "System";
pub const AFTERLIFE_PLACEHOLDER: &str = "(Anonymous)";
pub const KIN_PLACEHOLDER: &str = "(Kin)";

#[derive(Debug, Clone, Copy)]
pub struct RedactionRule {
    pub channel: Channel,
    pub viewer_role: Role,
    pub at_night: bool,
    pub placeholder: &'static str,
}

pub static REDACTIONS: &[RedactionRule] = &[
    RedactionRule {
        channel: Channel::Afterlife,
        viewer_role: NIGHT_LISTENER,
        at_night: true,
        placeholder: AFTERLIFE_PLACEHOLDER,
    },
    RedactionRule {
        channel: Channel::KinA,
        viewer_role: NIGHT_LISTENER,
        at_night: true,
        placeholder: KIN_PLACEHOLDER,
    },
    RedactionRule {
        channel: Channel::KinB,
        viewer_role: NIGHT_LISTENER,
        at_night: true,
        placeholder: KIN_PLACEHOLDER,
    },
];

impl RedactionRule {
    fn applies(&self, msg: &Message, ctx: &ViewerContext) -> bool {
        self.channel == msg.channel
            && self.viewer_role == ctx.viewer_role
            && (!self.at_night || ctx.is_night_phase)
    }
}

/// Resolve the name displayed for `msg`'s author as seen by `ctx`.
///
/// A passive listener keeps hearing the channel but not who is speaking.
/// A dead listener is a regular member of the afterlife and sees names, as
/// does everyone once the game is over.
pub fn display_name<'a>(msg: &'a Message, ctx: &ViewerContext) -> DisplayName<'a> {
    let name = match &msg.sender {
        Sender::System => return DisplayName::System,
        Sender::User(name) => name.as_str(),
    };
    if ctx.is_game_over || !ctx.is_alive {
        return DisplayName::Sender(name);
    }
    match REDACTIONS.iter().find(|rule| rule.applies(msg, ctx)) {
        Some(rule) => DisplayName::Redacted(rule.placeholder),
        None => DisplayName::Sender(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(channel: Channel) -> Message {
        Message::new(channel, Sender::User("Marguerite".into()), "...")
    }

    fn medium(night: bool) -> ViewerContext {
        ViewerContext {
            viewer_role: Role::Medium,
            is_alive: true,
            is_night_phase: night,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_is_sender_name() {
        let m = msg(Channel::Public);
        assert_eq!(display_name(&m, &medium(true)), DisplayName::Sender("Marguerite"));
        assert_eq!(display_name(&m, &ViewerContext::default()), DisplayName::Sender("Marguerite"));
    }

    #[test]
    fn test_afterlife_anonymous_for_medium_at_night() {
        let m = msg(Channel::Afterlife);
        let name = display_name(&m, &medium(true));
        assert_eq!(name, DisplayName::Redacted(AFTERLIFE_PLACEHOLDER));
        assert_eq!(name.as_str(), "(Anonymous)");
        assert_eq!(display_name(&m, &medium(false)), DisplayName::Sender("Marguerite"));
    }

    #[test]
    fn test_kin_channels_use_their_own_placeholder() {
        for channel in [Channel::KinA, Channel::KinB] {
            let m = msg(channel);
            assert_eq!(display_name(&m, &medium(true)), DisplayName::Redacted(KIN_PLACEHOLDER));
        }
        assert_ne!(AFTERLIFE_PLACEHOLDER, KIN_PLACEHOLDER);
    }

    #[test]
    fn test_dead_medium_sees_names() {
        let mut ctx = medium(true);
        ctx.is_alive = false;
        assert_eq!(display_name(&msg(Channel::Afterlife), &ctx), DisplayName::Sender("Marguerite"));
    }

    #[test]
    fn test_game_over_lifts_redaction() {
        let mut ctx = medium(true);
        ctx.is_game_over = true;
        assert_eq!(display_name(&msg(Channel::Afterlife), &ctx), DisplayName::Sender("Marguerite"));
    }

    #[test]
    fn test_system_never_redacted() {
        let m = Message::new(Channel::Afterlife, Sender::System, "A soul departs.");
        assert_eq!(display_name(&m, &medium(true)), DisplayName::System);
        assert_eq!(DisplayName::System.as_str(), SYSTEM_LABEL);
    }

    #[test]
    fn test_other_roles_see_names() {
        let ctx = ViewerContext {
            viewer_role: Role::Sister,
            is_alive: true,
            is_night_phase: true,
            ..Default::default()
        };
        assert_eq!(display_name(&msg(Channel::KinA), &ctx), DisplayName::Sender("Marguerite"));
    }
}
