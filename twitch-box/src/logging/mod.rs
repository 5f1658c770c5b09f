//! Logging setup.
//!
//! The filter comes from `RUST_LOG` when set. Otherwise the
//! `TWITCH_BOX_LOG_LEVEL` variable (`FATAL`, `ERROR`, `WARNING`, `INFO`,
//! `DEBUG`, `ALL`) picks the level for this service's crates, defaulting to
//! `WARNING`. Timestamps use the local timezone.

use chrono::Local;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable holding the legacy level name.
pub const LOG_LEVEL_ENV: &str = "TWITCH_BOX_LOG_LEVEL";

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "twitch_box=warn,stream_platforms=warn,tower_http=warn,sqlx=warn";

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Maps a legacy level name to a tracing level. Unknown names give `None`.
pub fn parse_legacy_level(name: &str) -> Option<Level> {
    match name.trim().to_ascii_uppercase().as_str() {
        // tracing has no level above error
        "FATAL" | "ERROR" => Some(Level::ERROR),
        "WARNING" | "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "ALL" | "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

/// Filter directive for a legacy level name, falling back to the default.
pub fn legacy_filter_directive(name: Option<&str>) -> String {
    match name.and_then(parse_legacy_level) {
        Some(level) => {
            let level = level.as_str().to_ascii_lowercase();
            format!("twitch_box={level},stream_platforms={level},tower_http={level},sqlx=warn")
        }
        None => DEFAULT_LOG_FILTER.to_string(),
    }
}

/// Install the global subscriber.
pub fn init_logging() -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let legacy = std::env::var(LOG_LEVEL_ENV).ok();
        EnvFilter::new(legacy_filter_directive(legacy.as_deref()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(true).with_timer(LocalTimer))
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    Ok(())
}
