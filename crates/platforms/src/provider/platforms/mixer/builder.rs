use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::models::{MixerChannel, MixerUser};
use crate::media::{Channel, PlatformUser, Rendition, dedup_channels};
use crate::provider::client::ApiClient;
use crate::provider::error::ProviderError;
use crate::provider::hls::renditions_from_playlist;
use crate::provider::{Platform, StreamProvider};

#[derive(Debug, Clone)]
pub struct MixerConfig {
    pub base_url: String,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            base_url: Mixer::BASE_URL.to_string(),
        }
    }
}

pub struct Mixer {
    api: ApiClient,
}

impl Mixer {
    const BASE_URL: &str = "https://mixer.com/api/v1";

    pub fn new(client: Client, config: MixerConfig) -> Self {
        let mut api = ApiClient::new("Mixer", config.base_url, client);
        api.add_header_typed(reqwest::header::ACCEPT, "application/json");
        Self { api }
    }

    /// Followed channels of `user`; offline channels are dropped when `online_only`.
    ///
    /// Channels come back ordered by ascending channel id so repeated calls
    /// walk them in the same order.
    pub async fn followed_channels(
        &self,
        user: &PlatformUser,
        online_only: bool,
    ) -> Result<Vec<Channel>, ProviderError> {
        let request = self.api.get(&format!("/users/{}/follows", user.id));
        let mut channels: Vec<MixerChannel> = self.api.send_json(request).await?;

        channels.retain(|c| !online_only || c.online);
        channels.sort_by_key(|c| c.id);

        debug!("Found {} live streams", channels.len());
        Ok(channels.into_iter().map(Channel::from).collect())
    }

    pub fn manifest_url(&self, channel: &Channel) -> String {
        self.api.url(&format!(
            "/channels/{}/manifest.m3u8?showAudioOnly=2",
            channel.id
        ))
    }
}

#[async_trait]
impl StreamProvider for Mixer {
    fn platform(&self) -> Platform {
        Platform::Mixer
    }

    async fn current_user(&self, access_token: &str) -> Result<PlatformUser, ProviderError> {
        let request = self.api.get("/users/current").bearer_auth(access_token);
        let user: MixerUser = self.api.send_json(request).await?;
        Ok(user.into())
    }

    async fn live_channels(
        &self,
        _access_token: &str,
        user: &PlatformUser,
    ) -> Result<Vec<Channel>, ProviderError> {
        let channels = self.followed_channels(user, true).await?;
        Ok(dedup_channels(channels))
    }

    async fn renditions(&self, channel: &Channel) -> Result<Vec<Rendition>, ProviderError> {
        let manifest_url = self.manifest_url(channel);
        debug!(channel = %channel.login, "Requesting stream manifest with url: {}", manifest_url);

        let body = self.api.send_bytes(self.api.get(&manifest_url)).await?;
        renditions_from_playlist(&body, &manifest_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::get};
    use tokio::net::TcpListener;

    fn test_client() -> Client {
        crate::provider::default_client(crate::provider::DEFAULT_TIMEOUT).unwrap()
    }

    async fn spawn_fake_mixer() -> MixerConfig {
        let app = Router::new()
            .route(
                "/api/v1/users/current",
                get(|| async { Json(serde_json::json!({"id": 7, "username": "listener"})) }),
            )
            .route(
                "/api/v1/users/{id}/follows",
                get(|| async {
                    Json(serde_json::json!([
                        {"id": 30, "online": true, "name": "late", "token": "thirty"},
                        {"id": 10, "online": false, "name": "offline", "token": "ten"},
                        {"id": 20, "online": true, "name": "early", "token": "twenty"}
                    ]))
                }),
            )
            .route(
                "/api/v1/channels/{id}/manifest.m3u8",
                get(|| async {
                    "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=128000,VIDEO=\"audio_only\"\naudio/index.m3u8\n"
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MixerConfig {
            base_url: format!("http://{addr}/api/v1"),
        }
    }

    #[tokio::test]
    async fn test_live_channels_sorted_by_id() {
        let mixer = Mixer::new(test_client(), spawn_fake_mixer().await);

        let user = mixer.current_user("token").await.unwrap();
        assert_eq!(user.id, "7");

        let live = mixer.live_channels("token", &user).await.unwrap();
        let ids: Vec<&str> = live.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["20", "30"]);
    }

    #[tokio::test]
    async fn test_renditions_resolve_relative_uri() {
        let config = spawn_fake_mixer().await;
        let base = config.base_url.clone();
        let mixer = Mixer::new(test_client(), config);

        let channel = Channel::new("20", "twenty", "twenty", "early");
        let renditions = mixer.renditions(&channel).await.unwrap();

        assert_eq!(renditions.len(), 1);
        assert_eq!(renditions[0].quality, "audio_only");
        assert_eq!(renditions[0].uri, format!("{base}/channels/20/audio/index.m3u8"));
    }
}
