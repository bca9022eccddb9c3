//! The story service client.
//!
//! One turn is two sequential calls: the narrative first, then an
//! illustration for the narrative's image prompt. Either failing fails the
//! turn; nothing is retried or cached.

use base64::Engine;
use log::{debug, info, warn};
use outpost_logic::payload::{parse_scene_payload, ScenePayload};
use outpost_logic::story::{Scene, ServiceError, StoryBackend};
use serde_json::Value;

use crate::config::{ConfigError, StoryConfig};
use crate::prompt::{image_request, story_prompt, story_request, IMAGE_MIME_TYPE};
use crate::transport::{HttpTransport, Transport};

pub struct StoryClient<T = HttpTransport> {
    config: StoryConfig,
    transport: T,
}

impl StoryClient<HttpTransport> {
    pub fn new(config: StoryConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> StoryClient<T> {
    pub fn with_transport(config: StoryConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Ask for the next narrative step and validate it.
    pub fn request_payload(&self, history: &str, choice: &str) -> Result<ScenePayload, ServiceError> {
        let prompt = story_prompt(history, choice);
        debug!(
            "story request: {} chars of history, opening={}",
            history.len(),
            history.trim().is_empty()
        );
        let response = self.transport.post_json(
            &self.config.text_url(),
            &self.config.api_key,
            &story_request(&prompt),
        )?;
        let text = candidate_text(&response)?;
        parse_scene_payload(&text).map_err(|e| {
            warn!("rejected scene payload: {}", e);
            ServiceError::from(e)
        })
    }

    /// Generate the illustration for `image_prompt` as a data URI.
    pub fn request_image(&self, image_prompt: &str) -> Result<String, ServiceError> {
        let response = self.transport.post_json(
            &self.config.image_url(),
            &self.config.api_key,
            &image_request(image_prompt),
        )?;
        first_image_data_uri(&response)
    }
}

impl<T: Transport> StoryBackend for StoryClient<T> {
    fn fetch_next_scene(&self, history: &str, choice: &str) -> Result<Scene, ServiceError> {
        let payload = self.request_payload(history, choice)?;
        let image_url = self.request_image(&payload.image_prompt)?;
        info!(
            "scene received: {} choices, game_over={}",
            payload.choices.len(),
            payload.game_over
        );
        Ok(Scene { payload, image_url })
    }
}

/// Concatenated text parts of the first candidate.
fn candidate_text(response: &Value) -> Result<String, ServiceError> {
    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::MalformedResponse("response has no candidate content".into()))?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        return Err(ServiceError::MalformedResponse(
            "candidate content has no text".into(),
        ));
    }
    Ok(text)
}

fn first_image_data_uri(response: &Value) -> Result<String, ServiceError> {
    let encoded = response
        .get("predictions")
        .and_then(Value::as_array)
        .and_then(|predictions| predictions.first())
        .and_then(|p| p.get("bytesBase64Encoded"))
        .and_then(Value::as_str)
        .filter(|b| !b.is_empty())
        .ok_or(ServiceError::NoImage)?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ServiceError::MalformedResponse(format!("image is not base64: {}", e)))?;
    Ok(format!("data:{};base64,{}", IMAGE_MIME_TYPE, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{INTRO_PROMPT, IMAGE_STYLE_SUFFIX};
    use outpost_logic::habitat::PartType;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct RecordingTransport {
        replies: RefCell<VecDeque<Result<Value, ServiceError>>>,
        requests: RefCell<Vec<(String, Value)>>,
    }

    impl RecordingTransport {
        fn replying(replies: Vec<Result<Value, ServiceError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for RecordingTransport {
        fn post_json(&self, url: &str, _api_key: &str, body: &Value) -> Result<Value, ServiceError> {
            self.requests
                .borrow_mut()
                .push((url.to_string(), body.clone()));
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::Network("no reply queued".into())))
        }
    }

    const SCENE_JSON: &str = r#"{
        "story": "Red dust hisses against the cracked viewport.",
        "imagePrompt": "a toppled lander in a dust storm",
        "choices": ["Patch the hull", "Find the radio"],
        "newItem": "Power Cell",
        "gameOver": false,
        "habitatUpdate": {
            "partType": "CYLINDER",
            "position": {"x": 0, "y": 0, "z": 0},
            "rotation": {"x": 0, "y": 0, "z": 0},
            "scale": {"x": 1, "y": 1, "z": 1}
        }
    }"#;

    fn text_reply(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    fn image_reply() -> Value {
        json!({ "predictions": [{ "bytesBase64Encoded": "aGVsbG8=", "mimeType": "image/jpeg" }] })
    }

    fn client(replies: Vec<Result<Value, ServiceError>>) -> StoryClient<RecordingTransport> {
        StoryClient::with_transport(
            StoryConfig::new("test-key"),
            RecordingTransport::replying(replies),
        )
    }

    #[test]
    fn test_opening_turn_uses_intro_then_image() {
        let client = client(vec![Ok(text_reply(SCENE_JSON)), Ok(image_reply())]);
        let scene = client.fetch_next_scene("", "").unwrap();

        let requests = client.transport.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].0.ends_with(":generateContent"));
        assert_eq!(requests[0].1["contents"][0]["parts"][0]["text"], INTRO_PROMPT);
        assert!(requests[1].0.ends_with(":predict"));
        assert_eq!(
            requests[1].1["instances"][0]["prompt"],
            format!("a toppled lander in a dust storm{}", IMAGE_STYLE_SUFFIX)
        );

        assert_eq!(scene.image_url, "data:image/jpeg;base64,aGVsbG8=");
        assert_eq!(scene.payload.item(), Some("Power Cell"));
        assert_eq!(
            scene.payload.habitat_update.map(|u| u.part_type),
            Some(PartType::Cylinder)
        );
    }

    #[test]
    fn test_continuation_sends_history_and_choice() {
        let client = client(vec![Ok(text_reply(SCENE_JSON)), Ok(image_reply())]);
        client
            .fetch_next_scene("The hatch groans open.", "Step outside")
            .unwrap();
        let requests = client.transport.requests.borrow();
        let prompt = requests[0].1["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(prompt.contains("The hatch groans open."));
        assert!(prompt.contains("Step outside"));
    }

    #[test]
    fn test_fenced_output_is_accepted() {
        let fenced = format!("```json\n{}\n```", SCENE_JSON);
        let client = client(vec![Ok(text_reply(&fenced)), Ok(image_reply())]);
        let scene = client.fetch_next_scene("", "").unwrap();
        assert_eq!(scene.payload, parse_scene_payload(SCENE_JSON).unwrap());
    }

    #[test]
    fn test_split_text_parts_are_joined() {
        let (head, tail) = SCENE_JSON.split_at(40);
        let reply = json!({ "candidates": [{ "content": { "parts": [
            { "text": head }, { "text": tail }
        ] } }] });
        let client = client(vec![Ok(reply), Ok(image_reply())]);
        assert!(client.fetch_next_scene("", "").is_ok());
    }

    #[test]
    fn test_text_failure_skips_image_request() {
        let client = client(vec![Err(ServiceError::Network("refused".into()))]);
        let err = client.fetch_next_scene("", "").unwrap_err();
        assert_eq!(err, ServiceError::Network("refused".into()));
        assert_eq!(client.transport.requests.borrow().len(), 1);
    }

    #[test]
    fn test_invalid_payload_is_rejected() {
        let client = client(vec![Ok(text_reply("{\"story\": \"only this\"}"))]);
        let err = client.fetch_next_scene("", "").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(_)));
        assert_eq!(client.transport.requests.borrow().len(), 1);
    }

    #[test]
    fn test_missing_candidates_is_malformed() {
        let client = client(vec![Ok(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))]);
        let err = client.fetch_next_scene("", "").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_predictions_is_no_image() {
        let empty = client(vec![
            Ok(text_reply(SCENE_JSON)),
            Ok(json!({ "predictions": [] })),
        ]);
        assert_eq!(empty.fetch_next_scene("", "").unwrap_err(), ServiceError::NoImage);

        let missing = client(vec![Ok(text_reply(SCENE_JSON)), Ok(json!({}))]);
        assert_eq!(missing.fetch_next_scene("", "").unwrap_err(), ServiceError::NoImage);
    }

    #[test]
    fn test_non_base64_image_is_malformed() {
        let client = client(vec![
            Ok(text_reply(SCENE_JSON)),
            Ok(json!({ "predictions": [{ "bytesBase64Encoded": "not base64!" }] })),
        ]);
        assert!(matches!(
            client.fetch_next_scene("", "").unwrap_err(),
            ServiceError::MalformedResponse(_)
        ));
    }
}
