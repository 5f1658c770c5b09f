//! Variant selector for choosing the rendition to play.
//!
//! Preference order, first match wins:
//! 1. the first rendition whose quality label starts with the requested token
//! 2. the audio-only rendition
//! 3. the last rendition in manifest order

use serde::{Deserialize, Serialize};
use stream_platforms::{AUDIO_ONLY, Rendition};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use super::NavigationError;

/// Default video quality prefix requested by video-capable devices.
pub const DEFAULT_VIDEO_QUALITY: &str = "720p";

/// What the requesting device can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StreamQuality {
    AudioOnly,
    Video,
}

/// Configuration for variant selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantSelectionConfig {
    /// Prefix requested for [`StreamQuality::Video`], e.g. "720p" matches "720p60".
    pub video_quality: String,
    /// Label of the audio-only rendition.
    pub audio_only_label: String,
}

impl Default for VariantSelectionConfig {
    fn default() -> Self {
        Self {
            video_quality: DEFAULT_VIDEO_QUALITY.to_string(),
            audio_only_label: AUDIO_ONLY.to_string(),
        }
    }
}

/// Which rule picked the rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SelectionReason {
    Exact,
    AudioFallback,
    LastAvailable,
}

/// Picks one rendition out of a rendition set.
#[derive(Debug, Clone, Default)]
pub struct VariantSelector {
    config: VariantSelectionConfig,
}

impl VariantSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: VariantSelectionConfig) -> Self {
        Self { config }
    }

    /// Token to request for a device of the given capability.
    pub fn requested_token(&self, quality: StreamQuality) -> &str {
        match quality {
            StreamQuality::AudioOnly => &self.config.audio_only_label,
            StreamQuality::Video => &self.config.video_quality,
        }
    }

    /// Select a rendition for `requested`.
    pub fn select<'a>(
        &self,
        renditions: &'a [Rendition],
        requested: &str,
    ) -> Result<&'a Rendition, NavigationError> {
        let (rendition, reason) = self.select_with_reason(renditions, requested)?;
        match reason {
            SelectionReason::LastAvailable => warn!(
                requested,
                quality = %rendition.quality,
                "No matching or audio-only rendition, using last available"
            ),
            _ => debug!(requested, quality = %rendition.quality, %reason, "Selected rendition"),
        }
        Ok(rendition)
    }

    /// Like [`select`](Self::select), also reporting which rule matched.
    pub fn select_with_reason<'a>(
        &self,
        renditions: &'a [Rendition],
        requested: &str,
    ) -> Result<(&'a Rendition, SelectionReason), NavigationError> {
        if let Some(r) = renditions.iter().find(|r| r.quality.starts_with(requested)) {
            return Ok((r, SelectionReason::Exact));
        }

        if let Some(r) = renditions
            .iter()
            .find(|r| r.quality == self.config.audio_only_label)
        {
            return Ok((r, SelectionReason::AudioFallback));
        }

        renditions
            .last()
            .map(|r| (r, SelectionReason::LastAvailable))
            .ok_or_else(|| NavigationError::NoPlayableRendition("zero variants found".to_string()))
    }
}
