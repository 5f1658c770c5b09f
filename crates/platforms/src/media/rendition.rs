use serde::{Deserialize, Serialize};
use std::fmt;

/// Label Twitch (and the voice layer) use for the audio-only rendition.
pub const AUDIO_ONLY: &str = "audio_only";

/// One playable encoding of a live stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    // Quality label, e.g. "720p60", "audio_only", "chunked"
    pub quality: String,
    // Playable URI of the media playlist
    pub uri: String,
    // Peak bandwidth in bits per second
    pub bandwidth: u64,
    // "WIDTHxHEIGHT" when the manifest advertises it
    pub resolution: Option<String>,
}

impl Rendition {
    pub fn new(quality: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            quality: quality.into(),
            uri: uri.into(),
            bandwidth: 0,
            resolution: None,
        }
    }

    pub fn is_audio_only(&self) -> bool {
        self.quality == AUDIO_ONLY
    }
}

impl fmt::Display for Rendition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resolution {
            Some(resolution) => write!(f, "{} ({}, {} bps)", self.quality, resolution, self.bandwidth),
            None => write!(f, "{} ({} bps)", self.quality, self.bandwidth),
        }
    }
}
