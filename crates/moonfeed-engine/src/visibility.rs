/// Per-viewer visibility of feed messages.
///
/// All channel rules live in [`RULES`]; [`is_visible`] is the only evaluator.
/// Adding a channel means adding a row to the table.

use moonfeed_types::{Channel, Message, Role, ViewerContext};

/// Roles that sit in the infected channel from the start of the game.
pub const PACK_ROLES: &[Role] = &[
    Role::Werewolf,
    Role::BigBadWolf,
    Role::WhiteWolf,
    Role::InfectFather,
];

/// The living role allowed to listen to the afterlife at night.
pub const NIGHT_LISTENER: Role = Role::Medium;

/// One way of being allowed to read a channel.
#[derive(Debug, Clone, Copy)]
pub enum Grant {
    /// Everyone, spectators included.
    Everyone,
    /// Spectators only.
    Spectators,
    /// Players who have died.
    DeadPlayers,
    /// Players holding one of these roles, at any time.
    Roles(&'static [Role]),
    /// Players holding one of these roles, during the night phase only.
    RolesAtNight(&'static [Role]),
    /// Non-spectators flagged as infected, whatever their role.
    Infected,
}

impl Grant {
    fn allows(self, ctx: &ViewerContext) -> bool {
        match self {
            Self::Everyone => true,
            Self::Spectators => ctx.is_spectator,
            // Everything below is closed to spectators until the game is over.
            Self::Infected => !ctx.is_spectator && ctx.is_infected,
            Self::DeadPlayers => ctx.is_player() && !ctx.is_alive,
            Self::Roles(roles) => ctx.is_player() && roles.contains(&ctx.viewer_role),
            Self::RolesAtNight(roles) => {
                ctx.is_player() && ctx.is_night_phase && roles.contains(&ctx.viewer_role)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VisibilityRule {
    pub channel: Channel,
    /// The channel is visible when any grant allows it.
    pub grants: &'static [Grant],
}

pub static RULES: &[VisibilityRule] = &[
    VisibilityRule {
        channel: Channel::Public,
        grants: &[Grant::Everyone],
    },
    VisibilityRule {
        channel: Channel::Spectator,
        grants: &[Grant::Spectators],
    },
    VisibilityRule {
        channel: Channel::Afterlife,
        grants: &[Grant::DeadPlayers, Grant::RolesAtNight(&[NIGHT_LISTENER])],
    },
    VisibilityRule {
        channel: Channel::Infected,
        grants: &[Grant::Roles(PACK_ROLES), Grant::Infected],
    },
    VisibilityRule {
        channel: Channel::KinA,
        grants: &[Grant::RolesAtNight(&[Role::Sister])],
    },
    VisibilityRule {
        channel: Channel::KinB,
        grants: &[Grant::RolesAtNight(&[Role::Brother])],
    },
];

pub fn rule_for(channel: Channel) -> Option<&'static VisibilityRule> {
    RULES.iter().find(|rule| rule.channel == channel)
}

/// Whether `ctx` may see `msg`. Pure; call again whenever the context changes.
pub fn is_visible(msg: &Message, ctx: &ViewerContext) -> bool {
    if ctx.is_game_over || msg.sender.is_system() {
        return true;
    }
    // Unknown channels have no rule and stay hidden until game over.
    rule_for(msg.channel).is_some_and(|rule| rule.grants.iter().any(|grant| grant.allows(ctx)))
}

/// Indices of the messages in `stream` that `ctx` may see, in stream order.
pub fn filter_visible(stream: &[Message], ctx: &ViewerContext) -> Vec<usize> {
    stream
        .iter()
        .enumerate()
        .filter(|(_, msg)| is_visible(msg, ctx))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonfeed_types::Sender;

    fn msg(channel: u8) -> Message {
        Message::new(Channel::from(channel), Sender::User("someone".into()), "text")
    }

    fn stream(channels: &[u8]) -> Vec<Message> {
        channels.iter().map(|&c| msg(c)).collect()
    }

    fn player(role: Role) -> ViewerContext {
        ViewerContext {
            viewer_role: role,
            is_alive: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_alive_no_role_at_night_sees_public_only() {
        let ctx = ViewerContext {
            is_alive: true,
            is_night_phase: true,
            ..Default::default()
        };
        assert_eq!(filter_visible(&stream(&[0, 2, 3, 0, 1]), &ctx), vec![0, 3]);
    }

    #[test]
    fn test_dead_player_by_day_sees_afterlife() {
        let ctx = ViewerContext {
            viewer_role: Role::Villager,
            is_alive: false,
            ..Default::default()
        };
        assert_eq!(filter_visible(&stream(&[0, 2, 3, 0, 1]), &ctx), vec![0, 1, 3]);
    }

    #[test]
    fn test_game_over_sees_everything() {
        let ctx = ViewerContext {
            is_game_over: true,
            ..Default::default()
        };
        assert_eq!(filter_visible(&stream(&[0, 2, 3, 0, 1]), &ctx), vec![0, 1, 2, 3, 4]);
        assert!(is_visible(&msg(99), &ctx));
    }

    #[test]
    fn test_spectator_channel() {
        let spectator = ViewerContext {
            is_spectator: true,
            ..Default::default()
        };
        assert!(is_visible(&msg(1), &spectator));
        assert!(!is_visible(&msg(1), &player(Role::Villager)));
    }

    #[test]
    fn test_spectator_never_sees_restricted_channels() {
        let spectator = ViewerContext {
            viewer_role: Role::Werewolf,
            is_spectator: true,
            is_infected: true,
            is_night_phase: true,
            ..Default::default()
        };
        for channel in [2, 3, 4, 5, 9] {
            assert!(!is_visible(&msg(channel), &spectator), "channel {}", channel);
        }
    }

    #[test]
    fn test_medium_listens_to_afterlife_at_night_only() {
        let mut ctx = player(Role::Medium);
        assert!(!is_visible(&msg(2), &ctx));
        ctx.is_night_phase = true;
        assert!(is_visible(&msg(2), &ctx));
        assert!(!is_visible(&msg(2), &player(Role::Seer)));
    }

    #[test]
    fn test_infected_channel() {
        for role in PACK_ROLES {
            assert!(is_visible(&msg(3), &player(*role)));
        }
        let mut villager = player(Role::Villager);
        assert!(!is_visible(&msg(3), &villager));
        villager.is_infected = true;
        assert!(is_visible(&msg(3), &villager));
    }

    #[test]
    fn test_infected_flag_grants_without_role() {
        let ctx = ViewerContext {
            is_alive: true,
            is_infected: true,
            ..Default::default()
        };
        assert!(is_visible(&msg(3), &ctx));
        assert!(!is_visible(&msg(2), &ctx));

        let spectator = ViewerContext {
            is_spectator: true,
            ..ctx
        };
        assert!(!is_visible(&msg(3), &spectator));
    }

    #[test]
    fn test_kin_channels_need_role_and_night() {
        let mut sister = player(Role::Sister);
        let mut brother = player(Role::Brother);
        assert!(!is_visible(&msg(4), &sister));
        sister.is_night_phase = true;
        brother.is_night_phase = true;
        assert!(is_visible(&msg(4), &sister));
        assert!(!is_visible(&msg(5), &sister));
        assert!(is_visible(&msg(5), &brother));
        assert!(!is_visible(&msg(4), &brother));
    }

    #[test]
    fn test_system_messages_always_visible() {
        let system = Message::new(Channel::KinA, Sender::System, "The sisters wake up.");
        assert!(is_visible(&system, &ViewerContext::default()));
    }

    #[test]
    fn test_unknown_channel_hidden_until_game_over() {
        let mut ctx = player(Role::Werewolf);
        ctx.is_night_phase = true;
        ctx.is_infected = true;
        assert!(!is_visible(&msg(6), &ctx));
        assert!(!is_visible(&msg(255), &ctx));
    }

    #[test]
    fn test_same_history_changes_with_context() {
        let history = stream(&[0, 2, 4]);
        let mut ctx = player(Role::Sister);
        ctx.is_night_phase = true;
        assert_eq!(filter_visible(&history, &ctx), vec![0, 2]);
        ctx.is_night_phase = false;
        ctx.is_alive = false;
        assert_eq!(filter_visible(&history, &ctx), vec![0, 1]);
    }

    #[test]
    fn test_every_known_channel_has_exactly_one_rule() {
        for n in 0..=5u8 {
            let channel = Channel::from(n);
            assert_eq!(RULES.iter().filter(|r| r.channel == channel).count(), 1);
        }
    }
}
