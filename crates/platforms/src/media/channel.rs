use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The account an access token belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlatformUser {
    // Stable platform identifier, used to key the user's history
    pub id: String,
    pub login: String,
    pub display_name: String,
}

/// A followed channel as reported by a platform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Channel {
    // Identifier stored in the recency history
    pub id: String,
    // Name used to address the channel's HLS endpoint
    pub login: String,
    pub display_name: String,
    // Current broadcast title
    pub title: String,
    pub online: bool,
    // Display-only metadata, passed through untouched
    pub viewer_count: Option<u64>,
    pub thumbnail_url: Option<String>,
}

impl Channel {
    pub fn new(
        id: impl Into<String>,
        login: impl Into<String>,
        display_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            login: login.into(),
            display_name: display_name.into(),
            title: title.into(),
            online: true,
            viewer_count: None,
            thumbnail_url: None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.display_name, self.id, self.title)
    }
}

/// Drops repeated channel ids, keeping the first occurrence and the original order.
pub fn dedup_channels(channels: Vec<Channel>) -> Vec<Channel> {
    let mut seen = HashSet::with_capacity(channels.len());
    channels
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}
