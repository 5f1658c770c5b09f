//! Process configuration from environment variables.
//!
//! Supported env vars:
//! - `API_BIND_ADDRESS` (default "0.0.0.0") and `PORT` (default 8080)
//! - `API_ENABLE_CORS` ("true" or "false", default false)
//! - `DATABASE_URL` (default "sqlite:twitch-box.db?mode=rwc")
//! - `HISTORY_BACKEND` ("sqlite" or "memory")
//! - `HISTORY_TTL_SECS` (default 86400) and `HISTORY_TIMEOUT_MS` (default 500)
//! - `PREVIOUS_POLICY` ("exhaust" or "replay-single")
//! - `VIDEO_QUALITY` (default "720p")
//! - `TWITCH_API_CLIENT_ID`, `ALEXA_APP_ID`
//! - `HTTP_TIMEOUT_SECS` (default 30)

use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};

use crate::api::ApiServerConfig;
use crate::history::{HistoryConfig, MAX_HISTORY_TTL};
use crate::navigator::{NavigatorConfig, PreviousPolicy};
use crate::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:twitch-box.db?mode=rwc";

/// Where history lists are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HistoryBackendKind {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiServerConfig,
    pub database_url: String,
    pub history_backend: HistoryBackendKind,
    pub history: HistoryConfig,
    pub navigator: NavigatorConfig,
    /// Helix client id; the Twitch skill is disabled without it
    pub twitch_client_id: Option<String>,
    pub skill_app_id: Option<String>,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiServerConfig::default(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            history_backend: HistoryBackendKind::default(),
            history: HistoryConfig::default(),
            navigator: NavigatorConfig::default(),
            twitch_client_id: None,
            skill_app_id: None,
            http_timeout: stream_platforms::provider::DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(bind_address) = get("API_BIND_ADDRESS") {
            config.api.bind_address = bind_address;
        }
        if let Some(port) = get("PORT") {
            config.api.port = parse("PORT", &port)?;
        }
        if let Some(cors) = get("API_ENABLE_CORS") {
            config.api.enable_cors = parse("API_ENABLE_CORS", &cors.to_ascii_lowercase())?;
        }
        if let Some(url) = get("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(kind) = get("HISTORY_BACKEND") {
            config.history_backend = parse("HISTORY_BACKEND", &kind)?;
        }
        if let Some(secs) = get("HISTORY_TTL_SECS") {
            let secs: u64 = parse("HISTORY_TTL_SECS", &secs)?;
            if secs == 0 || secs > MAX_HISTORY_TTL.as_secs() {
                return Err(Error::config(format!(
                    "HISTORY_TTL_SECS must be between 1 and {}",
                    MAX_HISTORY_TTL.as_secs()
                )));
            }
            config.history.ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = get("HISTORY_TIMEOUT_MS") {
            let ms: u64 = parse("HISTORY_TIMEOUT_MS", &ms)?;
            if ms == 0 {
                return Err(Error::config("HISTORY_TIMEOUT_MS must be greater than 0"));
            }
            config.history.operation_timeout = Duration::from_millis(ms);
        }
        if let Some(policy) = get("PREVIOUS_POLICY") {
            config.navigator.previous_policy = parse::<PreviousPolicy>("PREVIOUS_POLICY", &policy)?;
        }
        if let Some(quality) = get("VIDEO_QUALITY") {
            config.navigator.selection.video_quality = quality;
        }
        config.twitch_client_id = get("TWITCH_API_CLIENT_ID");
        config.skill_app_id = get("ALEXA_APP_ID");
        if let Some(secs) = get("HTTP_TIMEOUT_SECS") {
            let secs: u64 = parse("HTTP_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(Error::config("HTTP_TIMEOUT_SECS must be greater than 0"));
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::config(format!("Invalid {key} '{value}': {e}")))
}
