use std::str::FromStr;

use moonfeed_content::DEFAULT_MAX_BODY_BYTES;
use thiserror::Error;

/// Default row height estimate before a row's first layout, in pixels.
pub const DEFAULT_ROW_HEIGHT: u32 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be 'always' or 'bottom', got '{value}'")]
    InvalidFollowPolicy { var: &'static str, value: String },
}

/// When a growing feed scrolls itself to the newest row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FollowPolicy {
    /// Every append scrolls to the last row, even if the user scrolled up.
    #[default]
    Always,
    /// Appends scroll to the last row only while the view sits at the bottom.
    WhenAtBottom,
}

impl FromStr for FollowPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "bottom" | "when_at_bottom" => Ok(Self::WhenAtBottom),
            _ => Err(ConfigError::InvalidFollowPolicy {
                var: "MOONFEED_FOLLOW",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub default_row_height: u32,
    pub follow: FollowPolicy,
    pub max_body_bytes: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_row_height: DEFAULT_ROW_HEIGHT,
            follow: FollowPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl FeedConfig {
    /// Read `MOONFEED_*` variables from the process environment, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`FeedConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_row_height = match lookup("MOONFEED_DEFAULT_ROW_HEIGHT") {
            Some(value) => parse_positive("MOONFEED_DEFAULT_ROW_HEIGHT", &value)?,
            None => defaults.default_row_height,
        };
        let follow = match lookup("MOONFEED_FOLLOW") {
            Some(value) => value.parse()?,
            None => defaults.follow,
        };
        let max_body_bytes = match lookup("MOONFEED_MAX_BODY_BYTES") {
            Some(value) => parse_positive("MOONFEED_MAX_BODY_BYTES", &value)?,
            None => defaults.max_body_bytes,
        };

        Ok(Self {
            default_row_height,
            follow,
            max_body_bytes,
        })
    }
}

/// Parse a strictly positive integer setting.
pub fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    match value.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}
