pub mod channel;
pub mod rendition;

pub use channel::{Channel, PlatformUser, dedup_channels};
pub use rendition::{AUDIO_ONLY, Rendition};
