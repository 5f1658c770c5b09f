use serde::Deserialize;

use crate::media::{Channel, PlatformUser};

/// Cursor returned by paginated Helix endpoints.
#[derive(Debug, Deserialize, Default)]
pub struct Pagination {
    pub cursor: Option<String>,
}

/// Envelope shared by Helix list endpoints.
#[derive(Debug, Deserialize)]
pub struct HelixResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> HelixResponse<T> {
    pub fn next_cursor(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.cursor.as_deref())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct HelixUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

impl From<HelixUser> for PlatformUser {
    fn from(user: HelixUser) -> Self {
        Self {
            id: user.id,
            login: user.login,
            display_name: user.display_name,
        }
    }
}

/// A follow relationship from `/helix/channels/followed`.
#[derive(Debug, Deserialize)]
pub struct FollowedChannel {
    pub broadcaster_id: String,
}

/// A live broadcast from `/helix/streams`.
#[derive(Debug, Deserialize)]
pub struct HelixStream {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(rename = "type", default)]
    pub stream_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewer_count: Option<u64>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl From<HelixStream> for Channel {
    fn from(stream: HelixStream) -> Self {
        Self {
            online: stream.stream_type == "live",
            id: stream.user_id,
            login: stream.user_login,
            display_name: stream.user_name,
            title: stream.title,
            viewer_count: stream.viewer_count,
            thumbnail_url: stream.thumbnail_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaybackAccessTokenResponse {
    pub data: Option<PlaybackAccessTokenData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackAccessTokenData {
    pub stream_playback_access_token: Option<PlaybackAccessToken>,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackAccessToken {
    pub value: String,
    pub signature: String,
}
