//! Navigation through a user's live followed channels.
//!
//! A [`Navigator`] turns a [`Command`] into a concrete [`Stream`]. It asks the
//! platform for the live set, picks a channel using the user's
//! [`HistoryStore`], picks a rendition with the [`VariantSelector`] and
//! records the selection as the new history head.

mod error;
pub mod selector;

pub use error::NavigationError;
pub use selector::{
    DEFAULT_VIDEO_QUALITY, SelectionReason, StreamQuality, VariantSelectionConfig, VariantSelector,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use stream_platforms::{Channel, Platform, Rendition, StreamProvider, dedup_channels};
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::history::HistoryStore;
use crate::{Error, Result};

/// A navigation command from the voice layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Play,
    Next,
    Previous,
    Resume,
}

/// What Previous does when the history holds a single entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum PreviousPolicy {
    /// The single entry is the current stream, so there is nothing to go back to.
    #[default]
    Exhaust,
    /// Replay the single entry if it is still live.
    ReplaySingle,
}

#[derive(Debug, Clone, Default)]
pub struct NavigatorConfig {
    pub previous_policy: PreviousPolicy,
    pub selection: VariantSelectionConfig,
}

/// The outcome of a successful navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stream {
    pub channel: Channel,
    pub rendition: Rendition,
}

impl Stream {
    pub fn channel_id(&self) -> &str {
        &self.channel.id
    }

    pub fn title(&self) -> &str {
        &self.channel.title
    }

    pub fn is_audio_only(&self) -> bool {
        self.rendition.is_audio_only()
    }
}

/// Platform-independent navigation engine.
pub struct Navigator {
    provider: Arc<dyn StreamProvider>,
    history: HistoryStore,
    selector: VariantSelector,
    previous_policy: PreviousPolicy,
}

impl Navigator {
    /// Pairs a provider with the history of the same platform.
    pub fn new(
        provider: Arc<dyn StreamProvider>,
        history: HistoryStore,
        config: NavigatorConfig,
    ) -> Result<Self> {
        if provider.platform() != history.platform() {
            return Err(Error::config(format!(
                "history store for {} cannot serve a {} provider",
                history.platform(),
                provider.platform()
            )));
        }

        Ok(Self {
            provider,
            history,
            selector: VariantSelector::with_config(config.selection),
            previous_policy: config.previous_policy,
        })
    }

    pub fn platform(&self) -> Platform {
        self.provider.platform()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn selector(&self) -> &VariantSelector {
        &self.selector
    }

    /// Runs `command` end to end for the owner of `access_token`.
    pub async fn navigate(
        &self,
        access_token: &str,
        command: Command,
        quality: StreamQuality,
    ) -> std::result::Result<Stream, NavigationError> {
        let start = Instant::now();
        let platform = self.platform();

        let user = self
            .provider
            .current_user(access_token)
            .await
            .map_err(|e| {
                warn!(%platform, error = %e, "Failed to resolve account");
                NavigationError::AccountUnavailable(e.to_string())
            })?;

        let live = self
            .provider
            .live_channels(access_token, &user)
            .await
            .map_err(|e| {
                warn!(%platform, user_id = %user.id, error = %e, "Failed to load live channels");
                NavigationError::FollowsUnavailable(e.to_string())
            })?;
        let live = dedup_channels(live);

        let index = self.select(&user.id, command, &live).await?;
        let channel = &live[index];

        let renditions = self.provider.renditions(channel).await.map_err(|e| {
            warn!(%platform, channel_id = %channel.id, error = %e, "Failed to load renditions");
            NavigationError::NoPlayableRendition(e.to_string())
        })?;

        let requested = self.selector.requested_token(quality);
        let rendition = self.selector.select(&renditions, requested)?.clone();

        self.history.push(&user.id, &channel.id).await;

        info!(
            %platform,
            %command,
            user_id = %user.id,
            channel_id = %channel.id,
            quality = %rendition.quality,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Navigation complete"
        );

        Ok(Stream {
            channel: channel.clone(),
            rendition,
        })
    }

    /// Picks the index into `live` that `command` should play.
    ///
    /// Previous pops (and prunes) history as it walks; every other command
    /// only reads it. `live` must not repeat ids.
    pub async fn select(
        &self,
        user_id: &str,
        command: Command,
        live: &[Channel],
    ) -> std::result::Result<usize, NavigationError> {
        if live.is_empty() {
            return Err(NavigationError::NoLiveChannels);
        }

        match command {
            Command::Play => Ok(0),
            Command::Next => match self.history.peek_head(user_id).await {
                None => Ok(0),
                Some(head) => {
                    let current = position(live, &head)
                        .ok_or(NavigationError::ChannelNotLive(head))?;
                    Ok((current + 1) % live.len())
                }
            },
            Command::Resume => {
                let head = self
                    .history
                    .peek_head(user_id)
                    .await
                    .ok_or(NavigationError::NoHistory { command })?;
                position(live, &head).ok_or(NavigationError::ChannelNotLive(head))
            }
            Command::Previous => self.select_previous(user_id, live).await,
        }
    }

    async fn select_previous(
        &self,
        user_id: &str,
        live: &[Channel],
    ) -> std::result::Result<usize, NavigationError> {
        let exhausted = NavigationError::NoHistory {
            command: Command::Previous,
        };

        let history = self.history.list(user_id).await;
        if history.len() <= 1 {
            return match (self.previous_policy, history.first()) {
                (PreviousPolicy::ReplaySingle, Some(only)) => {
                    position(live, only).ok_or(exhausted)
                }
                _ => Err(exhausted),
            };
        }

        let mut candidate = self.history.pop_head(user_id).await;
        while let Some(id) = candidate {
            if let Some(index) = position(live, &id) {
                debug!(user_id, channel_id = %id, "Found previous live channel");
                return Ok(index);
            }
            debug!(user_id, channel_id = %id, "Pruning offline channel from history");
            self.history.remove(user_id, &id).await;
            candidate = self.history.peek_head(user_id).await;
        }

        Err(exhausted)
    }
}

fn position(live: &[Channel], id: &str) -> Option<usize> {
    live.iter().position(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryConfig, MemoryHistoryBackend};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use stream_platforms::{PlatformUser, ProviderError};

    /// Provider with a fixed live set that can be swapped between calls.
    struct FakeProvider {
        platform: Platform,
        live: Mutex<Vec<Channel>>,
        renditions: Vec<Rendition>,
    }

    impl FakeProvider {
        fn new(ids: &[&str]) -> Self {
            Self {
                platform: Platform::Twitch,
                live: Mutex::new(channels(ids)),
                renditions: vec![
                    Rendition::new("1080p60", "https://cdn/1080"),
                    Rendition::new("720p60", "https://cdn/720"),
                    Rendition::new("audio_only", "https://cdn/audio"),
                ],
            }
        }

        fn set_live(&self, ids: &[&str]) {
            *self.live.lock().unwrap() = channels(ids);
        }
    }

    fn channels(ids: &[&str]) -> Vec<Channel> {
        ids.iter()
            .map(|id| Channel::new(*id, id.to_lowercase(), *id, format!("{id} live")))
            .collect()
    }

    #[async_trait]
    impl StreamProvider for FakeProvider {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn current_user(
            &self,
            access_token: &str,
        ) -> std::result::Result<PlatformUser, ProviderError> {
            if access_token == "bad" {
                return Err(ProviderError::Status {
                    status: 401,
                    url: "https://api/users".into(),
                });
            }
            Ok(PlatformUser {
                id: "user-1".into(),
                login: "viewer".into(),
                display_name: "Viewer".into(),
            })
        }

        async fn live_channels(
            &self,
            _access_token: &str,
            _user: &PlatformUser,
        ) -> std::result::Result<Vec<Channel>, ProviderError> {
            Ok(self.live.lock().unwrap().clone())
        }

        async fn renditions(
            &self,
            channel: &Channel,
        ) -> std::result::Result<Vec<Rendition>, ProviderError> {
            if channel.id == "EMPTY" {
                return Ok(Vec::new());
            }
            Ok(self.renditions.clone())
        }
    }

    fn navigator(provider: Arc<FakeProvider>, policy: PreviousPolicy) -> Navigator {
        let history = HistoryStore::new(
            Arc::new(MemoryHistoryBackend::new()),
            Platform::Twitch,
            HistoryConfig::default(),
        );
        Navigator::new(
            provider,
            history,
            NavigatorConfig {
                previous_policy: policy,
                ..Default::default()
            },
        )
        .unwrap()
    }

    async fn play(nav: &Navigator, command: Command) -> std::result::Result<String, NavigationError> {
        nav.navigate("token", command, StreamQuality::AudioOnly)
            .await
            .map(|s| s.channel.id)
    }

    #[tokio::test]
    async fn test_play_ignores_history() {
        let provider = Arc::new(FakeProvider::new(&["X", "Y", "Z"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);
        nav.history().push("user-1", "Z").await;

        assert_eq!(play(&nav, Command::Play).await.unwrap(), "X");
        assert_eq!(nav.history().list("user-1").await, vec!["X", "Z"]);
    }

    #[tokio::test]
    async fn test_next_advances_and_wraps() {
        let provider = Arc::new(FakeProvider::new(&["X", "Y", "Z"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);

        assert_eq!(play(&nav, Command::Next).await.unwrap(), "X");
        assert_eq!(play(&nav, Command::Next).await.unwrap(), "Y");
        assert_eq!(play(&nav, Command::Next).await.unwrap(), "Z");
        assert_eq!(play(&nav, Command::Next).await.unwrap(), "X");
    }

    #[tokio::test]
    async fn test_next_with_empty_history_matches_play() {
        let provider = Arc::new(FakeProvider::new(&["X", "Y"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);
        let live = channels(&["X", "Y"]);

        let next = nav.select("fresh", Command::Next, &live).await.unwrap();
        let play = nav.select("fresh", Command::Play, &live).await.unwrap();
        assert_eq!(next, play);
        assert_eq!(next, 0);
    }

    #[tokio::test]
    async fn test_next_from_offline_head_fails() {
        let provider = Arc::new(FakeProvider::new(&["X", "Y"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);
        nav.history().push("user-1", "GONE").await;

        let err = play(&nav, Command::Next).await.unwrap_err();
        assert_eq!(err, NavigationError::ChannelNotLive("GONE".into()));
        assert_eq!(nav.history().list("user-1").await, vec!["GONE"]);
    }

    #[tokio::test]
    async fn test_resume_replays_head() {
        let provider = Arc::new(FakeProvider::new(&["X", "Y", "Z"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);
        nav.history().push("user-1", "X").await;
        nav.history().push("user-1", "Y").await;

        assert_eq!(play(&nav, Command::Resume).await.unwrap(), "Y");
        assert_eq!(nav.history().list("user-1").await, vec!["Y", "X"]);
    }

    #[tokio::test]
    async fn test_resume_without_history() {
        let provider = Arc::new(FakeProvider::new(&["X"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);

        let err = play(&nav, Command::Resume).await.unwrap_err();
        assert_eq!(
            err,
            NavigationError::NoHistory {
                command: Command::Resume
            }
        );
    }

    #[tokio::test]
    async fn test_previous_goes_back() {
        let provider = Arc::new(FakeProvider::new(&["X", "Y", "Z"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);

        play(&nav, Command::Next).await.unwrap();
        play(&nav, Command::Next).await.unwrap();
        assert_eq!(nav.history().list("user-1").await, vec!["Y", "X"]);

        assert_eq!(play(&nav, Command::Previous).await.unwrap(), "X");
        assert_eq!(nav.history().list("user-1").await, vec!["X"]);
    }

    #[tokio::test]
    async fn test_previous_on_single_entry_is_exhausted() {
        let provider = Arc::new(FakeProvider::new(&["A", "B"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);
        nav.history().push("user-1", "A").await;

        for _ in 0..3 {
            let err = play(&nav, Command::Previous).await.unwrap_err();
            assert_eq!(
                err,
                NavigationError::NoHistory {
                    command: Command::Previous
                }
            );
        }
        assert_eq!(nav.history().list("user-1").await, vec!["A"]);
    }

    #[tokio::test]
    async fn test_previous_replay_single_policy() {
        let provider = Arc::new(FakeProvider::new(&["A", "B"]));
        let nav = navigator(provider, PreviousPolicy::ReplaySingle);
        nav.history().push("user-1", "B").await;

        assert_eq!(play(&nav, Command::Previous).await.unwrap(), "B");
        assert_eq!(nav.history().list("user-1").await, vec!["B"]);
    }

    #[tokio::test]
    async fn test_previous_replay_single_offline_entry() {
        let provider = Arc::new(FakeProvider::new(&["A", "B"]));
        let nav = navigator(provider, PreviousPolicy::ReplaySingle);
        nav.history().push("user-1", "GONE").await;

        let err = play(&nav, Command::Previous).await.unwrap_err();
        assert_eq!(
            err,
            NavigationError::NoHistory {
                command: Command::Previous
            }
        );
        assert_eq!(nav.history().list("user-1").await, vec!["GONE"]);
    }

    #[tokio::test]
    async fn test_previous_prunes_offline_entries() {
        let provider = Arc::new(FakeProvider::new(&["A", "B", "C", "D"]));
        let nav = navigator(provider.clone(), PreviousPolicy::Exhaust);
        for id in ["A", "B", "C", "D"] {
            nav.history().push("user-1", id).await;
        }
        provider.set_live(&["A", "D"]);

        assert_eq!(play(&nav, Command::Previous).await.unwrap(), "A");
        assert_eq!(nav.history().list("user-1").await, vec!["A"]);
    }

    #[tokio::test]
    async fn test_previous_exhausts_when_nothing_live() {
        let provider = Arc::new(FakeProvider::new(&["A", "B", "C"]));
        let nav = navigator(provider.clone(), PreviousPolicy::Exhaust);
        for id in ["A", "B", "C"] {
            nav.history().push("user-1", id).await;
        }
        provider.set_live(&["C"]);

        let err = play(&nav, Command::Previous).await.unwrap_err();
        assert_eq!(err.code(), "NO_HISTORY");
        assert!(nav.history().list("user-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_no_live_channels() {
        let provider = Arc::new(FakeProvider::new(&[]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);

        for command in [Command::Play, Command::Next, Command::Previous, Command::Resume] {
            assert_eq!(
                play(&nav, command).await.unwrap_err(),
                NavigationError::NoLiveChannels
            );
        }
    }

    #[tokio::test]
    async fn test_duplicate_live_ids_are_collapsed() {
        let provider = Arc::new(FakeProvider::new(&["X", "Y", "X", "Z"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);
        nav.history().push("user-1", "X").await;

        assert_eq!(play(&nav, Command::Next).await.unwrap(), "Y");
    }

    #[tokio::test]
    async fn test_account_failure() {
        let provider = Arc::new(FakeProvider::new(&["X"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);

        let err = nav
            .navigate("bad", Command::Play, StreamQuality::Video)
            .await
            .unwrap_err();
        assert!(matches!(err, NavigationError::AccountUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_renditions_do_not_touch_history() {
        let provider = Arc::new(FakeProvider::new(&["EMPTY", "X"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);

        let err = play(&nav, Command::Play).await.unwrap_err();
        assert!(matches!(err, NavigationError::NoPlayableRendition(_)));
        assert!(nav.history().list("user-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_quality_selection() {
        let provider = Arc::new(FakeProvider::new(&["X"]));
        let nav = navigator(provider, PreviousPolicy::Exhaust);

        let video = nav
            .navigate("token", Command::Play, StreamQuality::Video)
            .await
            .unwrap();
        assert_eq!(video.rendition.uri, "https://cdn/720");
        assert!(!video.is_audio_only());

        let audio = nav
            .navigate("token", Command::Play, StreamQuality::AudioOnly)
            .await
            .unwrap();
        assert!(audio.is_audio_only());
    }

    #[test]
    fn test_mismatched_platform_rejected() {
        let provider = Arc::new(FakeProvider::new(&["X"]));
        let history = HistoryStore::new(
            Arc::new(MemoryHistoryBackend::new()),
            Platform::Mixer,
            HistoryConfig::default(),
        );
        assert!(Navigator::new(provider, history, NavigatorConfig::default()).is_err());
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!("NEXT".parse::<Command>().unwrap(), Command::Next);
        assert_eq!(Command::Previous.to_string(), "previous");
        assert_eq!(
            "replay-single".parse::<PreviousPolicy>().unwrap(),
            PreviousPolicy::ReplaySingle
        );
    }
}
