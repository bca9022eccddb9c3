//! Structured scene payloads returned by the story backend.
//!
//! The backend answers with JSON text that is only *supposed* to follow the
//! response schema. Parsing fails closed: every field is required, types must
//! match, and the result is validated before a [`ScenePayload`] exists.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::habitat::HabitatPartDescriptor;

/// Fewest choices a non-terminal scene may offer.
pub const MIN_CHOICES: usize = 2;
/// Most choices any scene may offer.
pub const MAX_CHOICES: usize = 4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("payload is not valid scene JSON: {0}")]
    Json(String),
    #[error("payload has an empty story")]
    EmptyStory,
    #[error("expected 2-4 choices, got {0}")]
    ChoiceCount(usize),
    #[error("habitat update names an unrecognized part type")]
    UnknownPartType,
    #[error("habitat update has a non-finite {0}")]
    NonFinite(&'static str),
}

/// A validated scene payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePayload {
    pub story: String,
    pub image_prompt: String,
    pub choices: Vec<String>,
    /// Empty when the scene grants nothing.
    pub new_item: String,
    pub game_over: bool,
    pub habitat_update: Option<HabitatPartDescriptor>,
}

/// Wire shape. `habitatUpdate` must be present even when null.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScenePayload {
    story: String,
    image_prompt: String,
    choices: Vec<String>,
    new_item: String,
    game_over: bool,
    #[serde(deserialize_with = "Option::deserialize")]
    habitat_update: Option<HabitatPartDescriptor>,
}

impl ScenePayload {
    /// The granted item, if any.
    pub fn item(&self) -> Option<&str> {
        let item = self.new_item.trim();
        (!item.is_empty()).then_some(item)
    }

    fn validate(raw: RawScenePayload) -> Result<Self, PayloadError> {
        if raw.story.trim().is_empty() {
            return Err(PayloadError::EmptyStory);
        }
        let n = raw.choices.len();
        let count_ok = if raw.game_over {
            n <= MAX_CHOICES
        } else {
            (MIN_CHOICES..=MAX_CHOICES).contains(&n)
        };
        if !count_ok {
            return Err(PayloadError::ChoiceCount(n));
        }
        if let Some(update) = &raw.habitat_update {
            if !update.part_type.is_buildable() {
                return Err(PayloadError::UnknownPartType);
            }
            for (name, v) in [
                ("position", update.position),
                ("rotation", update.rotation),
                ("scale", update.scale),
            ] {
                if !v.is_finite() {
                    return Err(PayloadError::NonFinite(name));
                }
            }
        }
        Ok(Self {
            story: raw.story,
            image_prompt: raw.image_prompt,
            choices: raw.choices,
            new_item: raw.new_item,
            game_over: raw.game_over,
            habitat_update: raw.habitat_update,
        })
    }
}

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse and validate backend output into a [`ScenePayload`].
pub fn parse_scene_payload(text: &str) -> Result<ScenePayload, PayloadError> {
    let json = strip_code_fences(text);
    let raw: RawScenePayload =
        serde_json::from_str(json).map_err(|e| PayloadError::Json(e.to_string()))?;
    ScenePayload::validate(raw)
}
