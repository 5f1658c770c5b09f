mod builder;
mod models;

pub use builder::{Twitch, TwitchConfig};
