//! The seam between the game and the story backend.
//!
//! [`StoryBackend`] is implemented by the network client in `outpost-story`
//! and by scripted backends in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::payload::{PayloadError, ScenePayload};

/// A validated payload plus its illustration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub payload: ScenePayload,
    /// `data:image/jpeg;base64,...`
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("story backend unreachable: {0}")]
    Network(String),
    #[error("story backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    InvalidPayload(#[from] PayloadError),
    #[error("image generation returned no images")]
    NoImage,
}

/// Produces the next scene of the story.
///
/// An empty `history` means the game is just starting; `choice` is then
/// ignored. Implementations make no retries.
pub trait StoryBackend: Send {
    fn fetch_next_scene(&self, history: &str, choice: &str) -> Result<Scene, ServiceError>;
}
