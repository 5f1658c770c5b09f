pub mod mixer;
pub mod twitch;
