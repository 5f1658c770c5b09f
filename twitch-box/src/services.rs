//! Wires configuration into history backends, navigators and skills.

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use stream_platforms::provider::platforms::mixer::{Mixer, MixerConfig};
use stream_platforms::provider::platforms::twitch::{Twitch, TwitchConfig};
use stream_platforms::{StreamProvider, default_client};
use tracing::{info, warn};

use crate::Result;
use crate::config::{AppConfig, HistoryBackendKind};
use crate::database;
use crate::history::{HistoryBackend, HistoryStore, MemoryHistoryBackend, SqliteHistoryBackend};
use crate::navigator::Navigator;
use crate::skill::SkillHandler;

/// Route name of the Twitch skill.
pub const TWITCH_SKILL: &str = "twitch-box";
/// Route name of the Mixer skill.
pub const MIXER_SKILL: &str = "mixer-box";

/// Opens the configured history backend. The SQLite backend is migrated
/// and purged of expired lists before use.
pub async fn build_history_backend(config: &AppConfig) -> Result<Arc<dyn HistoryBackend>> {
    match config.history_backend {
        HistoryBackendKind::Memory => {
            info!("Using in-memory history backend");
            Ok(Arc::new(MemoryHistoryBackend::new()))
        }
        HistoryBackendKind::Sqlite => {
            let pool = database::init_pool(&config.database_url).await?;
            database::run_migrations(&pool).await?;

            let backend = SqliteHistoryBackend::new(pool);
            let purged = backend.purge_expired().await?;
            if purged > 0 {
                info!(purged, "Purged expired history lists");
            }
            Ok(Arc::new(backend))
        }
    }
}

/// One navigator per provider, all sharing `backend`.
pub fn build_skill(
    name: &str,
    provider: Arc<dyn StreamProvider>,
    backend: Arc<dyn HistoryBackend>,
    config: &AppConfig,
) -> Result<(String, Arc<SkillHandler>)> {
    let history = HistoryStore::new(backend, provider.platform(), config.history.clone());
    let navigator = Navigator::new(provider, history, config.navigator.clone())?;
    Ok((name.to_string(), Arc::new(SkillHandler::new(Arc::new(navigator)))))
}

/// Builds every skill the configuration allows.
pub fn build_skills(
    config: &AppConfig,
    client: Client,
    backend: Arc<dyn HistoryBackend>,
) -> Result<HashMap<String, Arc<SkillHandler>>> {
    let mut skills = HashMap::new();

    match &config.twitch_client_id {
        Some(client_id) => {
            let twitch = Twitch::new(
                client.clone(),
                TwitchConfig {
                    client_id: client_id.clone(),
                    ..Default::default()
                },
            );
            let (name, skill) = build_skill(TWITCH_SKILL, Arc::new(twitch), backend.clone(), config)?;
            skills.insert(name, skill);
        }
        None => warn!("TWITCH_API_CLIENT_ID is not set, the Twitch skill is disabled"),
    }

    let mixer = Mixer::new(client, MixerConfig::default());
    let (name, skill) = build_skill(MIXER_SKILL, Arc::new(mixer), backend, config)?;
    skills.insert(name, skill);

    Ok(skills)
}

/// Shared HTTP client for every provider.
pub fn build_http_client(config: &AppConfig) -> Result<Client> {
    Ok(default_client(config.http_timeout)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_skills_without_twitch_id() {
        let config = AppConfig {
            history_backend: HistoryBackendKind::Memory,
            ..Default::default()
        };
        let backend = build_history_backend(&config).await.unwrap();
        let skills = build_skills(&config, build_http_client(&config).unwrap(), backend).unwrap();

        assert!(skills.contains_key(MIXER_SKILL));
        assert!(!skills.contains_key(TWITCH_SKILL));
    }

    #[tokio::test]
    async fn test_build_skills_with_twitch_id() {
        let config = AppConfig {
            history_backend: HistoryBackendKind::Memory,
            twitch_client_id: Some("client".into()),
            ..Default::default()
        };
        let backend = build_history_backend(&config).await.unwrap();
        let skills = build_skills(&config, build_http_client(&config).unwrap(), backend).unwrap();

        let twitch = skills.get(TWITCH_SKILL).unwrap();
        assert_eq!(
            twitch.navigator().history().list_key("7"),
            "twitch_recent_streams:7"
        );
        let mixer = skills.get(MIXER_SKILL).unwrap();
        assert_eq!(
            mixer.navigator().history().list_key("7"),
            "mixer_recent_streams:7"
        );
    }

    #[tokio::test]
    async fn test_sqlite_backend_is_migrated() {
        let config = AppConfig {
            database_url: "sqlite::memory:".into(),
            ..Default::default()
        };
        let backend = build_history_backend(&config).await.unwrap();
        assert!(backend.range("twitch_recent_streams:1").await.unwrap().is_empty());
    }
}
