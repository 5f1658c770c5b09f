//! Wire models for the voice-skill request/response envelope.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const RESPONSE_VERSION: &str = "1.0";

/// Request type of a skill launch without an intent.
pub const LAUNCH_REQUEST: &str = "LaunchRequest";
pub const INTENT_REQUEST: &str = "IntentRequest";
pub const SESSION_ENDED_REQUEST: &str = "SessionEndedRequest";

/// Incoming skill request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillRequest {
    pub version: String,
    pub session: Option<Session>,
    pub context: Option<Context>,
    pub request: RequestBody,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub new: bool,
    pub session_id: String,
    pub application: Application,
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub user_id: String,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Context {
    #[serde(rename = "System")]
    pub system: SystemContext,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemContext {
    pub application: Option<Application>,
    pub user: Option<User>,
    pub device: Device,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    pub device_id: String,
    /// Interface name to its (opaque) capabilities.
    pub supported_interfaces: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestBody {
    #[serde(rename = "type")]
    pub request_type: String,
    pub request_id: String,
    pub timestamp: String,
    pub locale: String,
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Intent {
    pub name: String,
}

impl SkillRequest {
    pub fn request_type(&self) -> &str {
        &self.request.request_type
    }

    pub fn intent_name(&self) -> &str {
        self.request
            .intent
            .as_ref()
            .map(|i| i.name.as_str())
            .unwrap_or_default()
    }

    /// Linked-account token from the session, else from the device context.
    pub fn access_token(&self) -> Option<&str> {
        let from_session = self
            .session
            .as_ref()
            .and_then(|s| s.user.access_token.as_deref());
        let from_context = || {
            self.context
                .as_ref()
                .and_then(|c| c.system.user.as_ref())
                .and_then(|u| u.access_token.as_deref())
        };
        from_session
            .or_else(from_context)
            .filter(|token| !token.is_empty())
    }

    pub fn application_id(&self) -> Option<&str> {
        let from_session = self
            .session
            .as_ref()
            .map(|s| s.application.application_id.as_str());
        let from_context = || {
            self.context
                .as_ref()
                .and_then(|c| c.system.application.as_ref())
                .map(|a| a.application_id.as_str())
        };
        from_session
            .filter(|id| !id.is_empty())
            .or_else(from_context)
            .filter(|id| !id.is_empty())
    }

    pub fn supports_video(&self) -> bool {
        self.context.as_ref().is_some_and(|c| {
            let interfaces = &c.system.device.supported_interfaces;
            interfaces.contains_key("VideoApp") || interfaces.contains_key("VideoPlayer")
        })
    }
}

/// Outgoing skill response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillResponse {
    pub version: String,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: String,
    pub text: String,
}

impl OutputSpeech {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            speech_type: "PlainText".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Card {
    LinkAccount,
}

/// Device directives, tagged by their `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Directive {
    #[serde(rename = "AudioPlayer.Play")]
    AudioPlay(AudioPlayDirective),
    #[serde(rename = "AudioPlayer.Stop")]
    AudioStop,
    #[serde(rename = "VideoApp.Launch")]
    VideoLaunch(VideoLaunchDirective),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioPlayDirective {
    pub play_behavior: String,
    pub audio_item: AudioItem,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioItem {
    pub stream: AudioStream,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioStream {
    pub token: String,
    pub url: String,
    pub offset_in_milliseconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoLaunchDirective {
    pub video_item: VideoItem,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoItem {
    pub source: String,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub subtitle: String,
}

impl Directive {
    /// Replace whatever is playing with `url`.
    pub fn audio_play(token: impl Into<String>, url: impl Into<String>) -> Self {
        Self::AudioPlay(AudioPlayDirective {
            play_behavior: "REPLACE_ALL".to_string(),
            audio_item: AudioItem {
                stream: AudioStream {
                    token: token.into(),
                    url: url.into(),
                    offset_in_milliseconds: 0,
                },
            },
        })
    }

    pub fn video_launch(
        url: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
    ) -> Self {
        Self::VideoLaunch(VideoLaunchDirective {
            video_item: VideoItem {
                source: url.into(),
                metadata: VideoMetadata {
                    title: title.into(),
                    subtitle: subtitle.into(),
                },
            },
        })
    }
}

impl Default for SkillResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillResponse {
    /// An empty response that ends the session.
    pub fn new() -> Self {
        Self {
            version: RESPONSE_VERSION.to_string(),
            response: ResponseBody {
                should_end_session: Some(true),
                ..Default::default()
            },
        }
    }

    pub fn speech(mut self, text: impl Into<String>) -> Self {
        self.response.output_speech = Some(OutputSpeech::plain(text));
        self
    }

    pub fn reprompt(mut self, text: impl Into<String>) -> Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::plain(text),
        });
        self
    }

    pub fn link_account_card(mut self) -> Self {
        self.response.card = Some(Card::LinkAccount);
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.response.directives.push(directive);
        self
    }

    pub fn end_session(mut self, end: bool) -> Self {
        self.response.should_end_session = Some(end);
        self
    }

    pub fn speech_text(&self) -> Option<&str> {
        self.response.output_speech.as_ref().map(|s| s.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_intent_request() {
        let body = json!({
            "version": "1.0",
            "session": {
                "new": true,
                "sessionId": "s-1",
                "application": { "applicationId": "amzn1.ask.skill.1" },
                "user": { "userId": "u-1", "accessToken": "tok" }
            },
            "context": {
                "System": {
                    "device": {
                        "deviceId": "d-1",
                        "supportedInterfaces": { "AudioPlayer": {}, "VideoApp": {} }
                    }
                }
            },
            "request": {
                "type": "IntentRequest",
                "requestId": "r-1",
                "intent": { "name": "AMAZON.NextIntent", "slots": {} }
            }
        });

        let request: SkillRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.request_type(), INTENT_REQUEST);
        assert_eq!(request.intent_name(), "AMAZON.NextIntent");
        assert_eq!(request.access_token(), Some("tok"));
        assert_eq!(request.application_id(), Some("amzn1.ask.skill.1"));
        assert!(request.supports_video());
    }

    #[test]
    fn test_token_falls_back_to_context() {
        let body = json!({
            "context": { "System": { "user": { "userId": "u", "accessToken": "ctx" } } },
            "request": { "type": "IntentRequest" }
        });
        let request: SkillRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.access_token(), Some("ctx"));
        assert!(!request.supports_video());
        assert_eq!(request.intent_name(), "");
    }

    #[test]
    fn test_directive_wire_shape() {
        let response = SkillResponse::new()
            .speech("Starting stream for Foo")
            .directive(Directive::audio_play("42", "https://cdn/audio.m3u8"));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["response"]["outputSpeech"]["type"], "PlainText");
        let directive = &value["response"]["directives"][0];
        assert_eq!(directive["type"], "AudioPlayer.Play");
        assert_eq!(directive["playBehavior"], "REPLACE_ALL");
        assert_eq!(directive["audioItem"]["stream"]["token"], "42");
        assert_eq!(directive["audioItem"]["stream"]["offsetInMilliseconds"], 0);

        let stop = serde_json::to_value(Directive::AudioStop).unwrap();
        assert_eq!(stop, json!({ "type": "AudioPlayer.Stop" }));

        let video = serde_json::to_value(Directive::video_launch("u", "t", "s")).unwrap();
        assert_eq!(video["type"], "VideoApp.Launch");
        assert_eq!(video["videoItem"]["metadata"]["subtitle"], "s");
    }

    #[test]
    fn test_link_account_card() {
        let value = serde_json::to_value(SkillResponse::new().link_account_card()).unwrap();
        assert_eq!(value["response"]["card"], json!({ "type": "LinkAccount" }));
        assert!(value["response"].get("directives").is_none());
    }
}
