pub mod client;
mod default;
pub mod error;
pub mod hls;
pub mod platforms;

pub use default::{DEFAULT_TIMEOUT, default_client};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::media::{Channel, PlatformUser, Rendition};
use error::ProviderError;

/// Streaming platforms with an adapter in this crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Mixer,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::Mixer => "mixer",
        }
    }

    /// Name used when talking to the user.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitch => "Twitch",
            Platform::Mixer => "Mixer",
        }
    }
}

/// Capabilities the navigation engine needs from a platform.
///
/// Implementations only talk to the platform; they never touch the
/// playback history.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    fn platform(&self) -> Platform;

    /// Resolves the account that owns `access_token`.
    async fn current_user(&self, access_token: &str) -> Result<PlatformUser, ProviderError>;

    /// The user's followed channels that are live right now, in platform order
    /// and without repeated ids.
    async fn live_channels(
        &self,
        access_token: &str,
        user: &PlatformUser,
    ) -> Result<Vec<Channel>, ProviderError>;

    /// The rendition set of `channel`'s current broadcast.
    async fn renditions(&self, channel: &Channel) -> Result<Vec<Rendition>, ProviderError>;
}
