use serde::Deserialize;

use crate::media::{Channel, PlatformUser};

#[derive(Debug, Deserialize)]
pub struct MixerUser {
    pub id: u64,
    pub username: String,
}

impl From<MixerUser> for PlatformUser {
    fn from(user: MixerUser) -> Self {
        Self {
            id: user.id.to_string(),
            login: user.username.clone(),
            display_name: user.username,
        }
    }
}

/// A channel as returned by `/users/{id}/follows`.
///
/// Mixer calls the broadcast title `name` and the channel's login `token`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixerChannel {
    pub id: u64,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub name: String,
    pub token: String,
    #[serde(default)]
    pub viewers_current: Option<u64>,
}

impl From<MixerChannel> for Channel {
    fn from(channel: MixerChannel) -> Self {
        Self {
            id: channel.id.to_string(),
            login: channel.token.clone(),
            display_name: channel.token,
            title: channel.name,
            online: channel.online,
            viewer_count: channel.viewers_current,
            thumbnail_url: None,
        }
    }
}
