//! twitch-box library crate.
//!
//! Voice-skill back end for navigating a user's live followed channels.
//! Exposed as a library for integration testing.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod history;
pub mod logging;
pub mod navigator;
pub mod services;
pub mod skill;

pub use error::{Error, Result};
