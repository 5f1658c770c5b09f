use thiserror::Error;

use super::Command;

/// Why a navigation request could not produce a stream.
///
/// Every variant is terminal for the request; the voice layer turns it into
/// speech with [`NavigationError::user_message`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("account lookup failed: {0}")]
    AccountUnavailable(String),

    #[error("could not load followed channels: {0}")]
    FollowsUnavailable(String),

    #[error("no followed channels are live")]
    NoLiveChannels,

    #[error("channel {0} is not live")]
    ChannelNotLive(String),

    #[error("no history to {command}")]
    NoHistory { command: Command },

    #[error("no playable rendition: {0}")]
    NoPlayableRendition(String),
}

impl NavigationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountUnavailable(_) => "ACCOUNT_UNAVAILABLE",
            Self::FollowsUnavailable(_) => "FOLLOWS_UNAVAILABLE",
            Self::NoLiveChannels => "NO_LIVE_CHANNELS",
            Self::ChannelNotLive(_) => "CHANNEL_NOT_LIVE",
            Self::NoHistory { .. } => "NO_HISTORY",
            Self::NoPlayableRendition(_) => "NO_PLAYABLE_RENDITION",
        }
    }

    /// Speech for the user. `platform` is the platform's display name.
    pub fn user_message(&self, platform: &str) -> String {
        match self {
            Self::AccountUnavailable(_) => {
                format!("Sorry, I could not find your {platform} account.")
            }
            Self::FollowsUnavailable(_) => {
                format!("Sorry, I could not load the channels you follow on {platform}.")
            }
            Self::NoLiveChannels => {
                "None of the channels you follow are live right now.".to_string()
            }
            Self::ChannelNotLive(_) => "That channel is not live right now.".to_string(),
            Self::NoHistory {
                command: Command::Previous,
            } => "There are no previous live streams.".to_string(),
            Self::NoHistory { .. } => "There is no recent stream to resume.".to_string(),
            Self::NoPlayableRendition(_) => {
                "Sorry, I could not find a playable stream for that channel.".to_string()
            }
        }
    }
}
