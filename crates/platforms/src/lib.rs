//! Platform adapters that resolve a user's live followed channels and the
//! HLS renditions of a chosen channel.
//!
//! Every adapter implements [`provider::StreamProvider`], so callers can drive
//! Twitch and Mixer through the same navigation logic.

pub mod media;
pub mod provider;

pub use media::{AUDIO_ONLY, Channel, PlatformUser, Rendition, dedup_channels};
pub use provider::error::ProviderError;
pub use provider::{Platform, StreamProvider, default_client};
