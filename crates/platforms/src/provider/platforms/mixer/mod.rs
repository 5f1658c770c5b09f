mod builder;
mod models;

pub use builder::{Mixer, MixerConfig};
