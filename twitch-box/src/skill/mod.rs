//! Voice-skill envelope: request/response models and intent handling.

pub mod handler;
pub mod models;

pub use handler::{SkillAction, SkillHandler, route};
pub use models::{Directive, SkillRequest, SkillResponse};
