use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::models::{
    FollowedChannel, HelixResponse, HelixStream, HelixUser, PlaybackAccessToken,
    PlaybackAccessTokenResponse,
};
use crate::media::{Channel, PlatformUser, Rendition, dedup_channels};
use crate::provider::client::ApiClient;
use crate::provider::error::ProviderError;
use crate::provider::hls::renditions_from_playlist;
use crate::provider::{Platform, StreamProvider};

/// Endpoints and credentials for the Twitch adapter.
#[derive(Debug, Clone)]
pub struct TwitchConfig {
    /// Application client id sent to Helix.
    pub client_id: String,
    pub helix_url: String,
    pub gql_url: String,
    pub usher_url: String,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            helix_url: Twitch::HELIX_URL.to_string(),
            gql_url: Twitch::GQL_URL.to_string(),
            usher_url: Twitch::USHER_URL.to_string(),
        }
    }
}

pub struct Twitch {
    helix: ApiClient,
    gql: ApiClient,
    usher: ApiClient,
}

impl Twitch {
    const HELIX_URL: &str = "https://api.twitch.tv/helix";
    const GQL_URL: &str = "https://gql.twitch.tv/gql";
    const USHER_URL: &str = "https://usher.ttvnw.net";
    // client id of the web player, required by the playback token query
    const GQL_CLIENT_ID: &str = "kimne78kx3ncx6brgo4mv6wki5h1ko";
    // Helix caps repeated user_id parameters at 100 per request
    const MAX_IDS_PER_REQUEST: usize = 100;
    const MAX_FOLLOW_PAGES: usize = 20;

    pub fn new(client: Client, config: TwitchConfig) -> Self {
        let mut helix = ApiClient::new("Twitch", config.helix_url, client.clone());
        helix.add_header_str("Client-Id", &config.client_id);

        let mut gql = ApiClient::new("Twitch", config.gql_url, client.clone());
        gql.add_header_str("Client-Id", Self::GQL_CLIENT_ID);

        let usher = ApiClient::new("Twitch", config.usher_url, client);

        Self { helix, gql, usher }
    }

    /// Loads a user by id, or the token's owner when `id` is `None`.
    pub async fn get_user(
        &self,
        access_token: &str,
        id: Option<&str>,
    ) -> Result<PlatformUser, ProviderError> {
        let mut request = self.helix.get("/users").bearer_auth(access_token);
        if let Some(id) = id {
            request = request.query(&[("id", id)]);
        }

        let response: HelixResponse<HelixUser> = self.helix.send_json(request).await?;
        response
            .data
            .into_iter()
            .next()
            .map(PlatformUser::from)
            .ok_or_else(|| ProviderError::NotFound(format!("twitch user {}", id.unwrap_or("(self)"))))
    }

    /// Ids of every broadcaster `user` follows, following pagination cursors.
    pub async fn followed_ids(
        &self,
        access_token: &str,
        user: &PlatformUser,
    ) -> Result<Vec<String>, ProviderError> {
        let mut ids = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..Self::MAX_FOLLOW_PAGES {
            let mut query = vec![("user_id", user.id.as_str()), ("first", "100")];
            if let Some(after) = cursor.as_deref() {
                query.push(("after", after));
            }

            let request = self
                .helix
                .get("/channels/followed")
                .bearer_auth(access_token)
                .query(&query);
            let response: HelixResponse<FollowedChannel> = self.helix.send_json(request).await?;

            cursor = response.next_cursor().map(ToOwned::to_owned);
            ids.extend(response.data.into_iter().map(|f| f.broadcaster_id));

            if cursor.is_none() {
                break;
            }
        }

        if cursor.is_some() {
            warn!(
                user = %user.id,
                pages = Self::MAX_FOLLOW_PAGES,
                "Follow list truncated at {} channels",
                ids.len()
            );
        }

        debug!(user = %user.id, "Found {} follows", ids.len());
        Ok(ids)
    }

    /// Live streams among `user_ids`, in the order Helix returns them.
    pub async fn live_streams(
        &self,
        access_token: &str,
        user_ids: &[String],
    ) -> Result<Vec<Channel>, ProviderError> {
        let mut channels = Vec::new();

        for batch in user_ids.chunks(Self::MAX_IDS_PER_REQUEST) {
            let mut query: Vec<(&str, &str)> = vec![("type", "live"), ("first", "100")];
            query.extend(batch.iter().map(|id| ("user_id", id.as_str())));

            let request = self
                .helix
                .get("/streams")
                .bearer_auth(access_token)
                .query(&query);
            let response: HelixResponse<HelixStream> = self.helix.send_json(request).await?;

            channels.extend(
                response
                    .data
                    .into_iter()
                    .map(Channel::from)
                    .filter(|c| c.online),
            );
        }

        debug!("Get live streams response({})", channels.len());
        Ok(channels)
    }

    fn build_persisted_query_request(
        &self,
        operation_name: &str,
        sha256_hash: &str,
        variables: serde_json::Value,
    ) -> serde_json::Value {
        serde_json::json!({
            "operationName": operation_name,
            "extensions": {
                "persistedQuery": {
                    "version": 1,
                    "sha256Hash": sha256_hash,
                }
            },
            "variables": variables,
        })
    }

    async fn playback_access_token(
        &self,
        login: &str,
    ) -> Result<PlaybackAccessToken, ProviderError> {
        let body = self.build_persisted_query_request(
            "PlaybackAccessToken",
            "ed230aa1e33e07eebb8928504583da78a5173989fadfb1ac94be06a04f3cdbe9",
            serde_json::json!({
                "isLive": true,
                "login": login,
                "isVod": false,
                "vodID": "",
                "playerType": "site",
                "isClip": false,
                "clipID": "",
                "platform": "site",
            }),
        );

        let request = self.gql.post("").json(&body);
        let response: PlaybackAccessTokenResponse = self.gql.send_json(request).await?;

        response
            .data
            .and_then(|d| d.stream_playback_access_token)
            .ok_or_else(|| {
                ProviderError::ValidationError(
                    "Could not find streamPlaybackAccessToken".to_string(),
                )
            })
    }

    /// Manifest URL for `login`, signed with a playback token.
    pub fn manifest_url(
        &self,
        login: &str,
        token: &PlaybackAccessToken,
    ) -> Result<String, ProviderError> {
        let epoch_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            .to_string();

        let base = self.usher.url(&format!("/api/channel/hls/{login}.m3u8"));
        let url = Url::parse_with_params(
            &base,
            &[
                ("player", "twitchweb"),
                ("p", epoch_seconds.as_str()),
                ("allow_source", "true"),
                ("allow_audio_only", "true"),
                ("type", "any"),
                ("token", token.value.as_str()),
                ("sig", token.signature.as_str()),
            ],
        )
        .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

        Ok(url.to_string())
    }
}

#[async_trait]
impl StreamProvider for Twitch {
    fn platform(&self) -> Platform {
        Platform::Twitch
    }

    async fn current_user(&self, access_token: &str) -> Result<PlatformUser, ProviderError> {
        self.get_user(access_token, None).await
    }

    async fn live_channels(
        &self,
        access_token: &str,
        user: &PlatformUser,
    ) -> Result<Vec<Channel>, ProviderError> {
        let follows = self.followed_ids(access_token, user).await?;
        if follows.is_empty() {
            return Ok(Vec::new());
        }
        let live = self.live_streams(access_token, &follows).await?;
        Ok(dedup_channels(live))
    }

    async fn renditions(&self, channel: &Channel) -> Result<Vec<Rendition>, ProviderError> {
        let token = self.playback_access_token(&channel.login).await?;
        let manifest_url = self.manifest_url(&channel.login, &token)?;
        debug!(channel = %channel.login, "Get Stream URL Request: {}", manifest_url);

        let body = self.usher.send_bytes(self.usher.get(&manifest_url)).await?;
        renditions_from_playlist(&body, &manifest_url)
    }
}
