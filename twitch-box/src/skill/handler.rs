//! Maps skill requests to navigation and back to speech and directives.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::models::{
    Directive, LAUNCH_REQUEST, SESSION_ENDED_REQUEST, SkillRequest, SkillResponse,
};
use crate::navigator::{Command, Navigator, Stream, StreamQuality};

pub const START_AUDIO_STREAM: &str = "StartAudioStream";
pub const START_VIDEO_STREAM: &str = "StartVideoStream";
pub const NEXT_INTENT: &str = "AMAZON.NextIntent";
pub const PREVIOUS_INTENT: &str = "AMAZON.PreviousIntent";
pub const RESUME_INTENT: &str = "AMAZON.ResumeIntent";
pub const PAUSE_INTENT: &str = "AMAZON.PauseIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";

/// What a request asks the skill to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillAction {
    Welcome,
    Navigate(Command),
    Pause,
    Stop,
    SessionEnded,
    Unknown,
}

/// Decides the action for a request from its type and intent name.
pub fn route(request: &SkillRequest) -> SkillAction {
    match request.request_type() {
        LAUNCH_REQUEST => return SkillAction::Welcome,
        SESSION_ENDED_REQUEST => return SkillAction::SessionEnded,
        _ => {}
    }

    match request.intent_name() {
        START_AUDIO_STREAM | START_VIDEO_STREAM => SkillAction::Navigate(Command::Play),
        NEXT_INTENT => SkillAction::Navigate(Command::Next),
        PREVIOUS_INTENT => SkillAction::Navigate(Command::Previous),
        RESUME_INTENT => SkillAction::Navigate(Command::Resume),
        PAUSE_INTENT => SkillAction::Pause,
        STOP_INTENT | CANCEL_INTENT => SkillAction::Stop,
        _ => SkillAction::Unknown,
    }
}

/// One voice skill, bound to the navigator of its platform.
pub struct SkillHandler {
    navigator: Arc<Navigator>,
}

impl SkillHandler {
    pub fn new(navigator: Arc<Navigator>) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub async fn handle(&self, request: &SkillRequest) -> SkillResponse {
        let start = Instant::now();
        let action = route(request);
        info!(
            request_type = request.request_type(),
            intent = request.intent_name(),
            ?action,
            "Handling skill request"
        );

        let response = match action {
            SkillAction::Welcome => self.welcome(),
            SkillAction::Navigate(command) => self.navigate(request, command).await,
            SkillAction::Pause => SkillResponse::new()
                .speech("Stopping the stream.")
                .directive(Directive::AudioStop),
            SkillAction::Stop | SkillAction::SessionEnded => SkillResponse::new(),
            SkillAction::Unknown => {
                SkillResponse::new().speech("Sorry, I did not understand your request.")
            }
        };

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Skill handler execution time"
        );
        response
    }

    fn platform_name(&self) -> &'static str {
        self.navigator.platform().display_name()
    }

    fn welcome(&self) -> SkillResponse {
        SkillResponse::new()
            .speech("Welcome, would you like to start playing one of your followed streams?")
            .reprompt(format!(
                "Should I start playing a {} stream?",
                self.platform_name()
            ))
            .end_session(false)
    }

    async fn navigate(&self, request: &SkillRequest, command: Command) -> SkillResponse {
        let Some(access_token) = request.access_token() else {
            return SkillResponse::new()
                .speech(format!(
                    "Sorry, it looks like your {} account needs to be linked in the Alexa app.",
                    self.platform_name()
                ))
                .link_account_card();
        };

        let quality = if request.supports_video() {
            StreamQuality::Video
        } else {
            StreamQuality::AudioOnly
        };
        debug!(%command, %quality, "Navigating");

        match self.navigator.navigate(access_token, command, quality).await {
            Ok(stream) => stream_response(&stream),
            Err(e) => {
                info!(%command, code = e.code(), error = %e, "Navigation failed");
                SkillResponse::new().speech(e.user_message(self.platform_name()))
            }
        }
    }
}

fn stream_response(stream: &Stream) -> SkillResponse {
    let response = SkillResponse::new().speech(format!(
        "Starting stream for {}",
        stream.channel.display_name
    ));

    if stream.is_audio_only() {
        response.directive(Directive::audio_play(
            stream.channel_id(),
            &stream.rendition.uri,
        ))
    } else {
        response.directive(Directive::video_launch(
            &stream.rendition.uri,
            stream.title(),
            &stream.channel.display_name,
        ))
    }
}
