//! State management for the Outpost client.
//!
//! Contains resource types, events and Bevy components used throughout the client.

use std::path::PathBuf;

use bevy::prelude::*;
use outpost_logic::game::Game;
use outpost_logic::habitat::HabitatSnapshot;

// ============================================================================
// RESOURCES
// ============================================================================

#[derive(Resource)]
pub struct ClientConfig {
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub export_path: PathBuf,
    pub journal_path: PathBuf,
    /// Open a saved journal for review instead of starting a new game.
    pub review_journal: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            text_model: None,
            image_model: None,
            export_path: PathBuf::from("habitat.stl"),
            journal_path: PathBuf::from("outpost_journal.json"),
            review_journal: None,
        }
    }
}

impl ClientConfig {
    pub fn from_args() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let args: Vec<String> = args.into_iter().collect();
        let mut config = Self::default();
        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match (args[i].as_str(), value) {
                ("--text-model", Some(v)) => {
                    config.text_model = Some(v);
                    i += 2;
                }
                ("--image-model", Some(v)) => {
                    config.image_model = Some(v);
                    i += 2;
                }
                ("--export" | "-o", Some(v)) => {
                    config.export_path = PathBuf::from(v);
                    i += 2;
                }
                ("--journal", Some(v)) => {
                    config.journal_path = PathBuf::from(v);
                    i += 2;
                }
                ("--review", Some(v)) => {
                    config.review_journal = Some(PathBuf::from(v));
                    i += 2;
                }
                _ => i += 1,
            }
        }
        config
    }
}

/// The one game being played.
#[derive(Resource)]
pub struct GameSession(pub Game);

/// Latest habitat published by the game for the renderer.
#[derive(Resource, Default)]
pub struct PublishedHabitat(pub HabitatSnapshot);

#[derive(Resource, Default)]
pub struct ViewState {
    /// Habitat version currently on screen; `None` forces the first rebuild.
    pub rendered_version: Option<u64>,
}

#[derive(Resource)]
pub struct OrbitState {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.8,
            pitch: 0.45,
            distance: 5.0,
        }
    }
}

#[derive(Resource, Default)]
pub struct UiState {
    pub toasts: Vec<Toast>,
    pub scene_image: Option<Handle<Image>>,
    /// Choice text of the request in flight, shown while loading.
    pub pending_choice: Option<String>,
}

impl UiState {
    pub fn toast(&mut self, message: impl Into<String>, color: Color, timer: f32) {
        self.toasts.push(Toast {
            message: message.into(),
            color,
            timer,
        });
    }
}

pub struct Toast {
    pub message: String,
    pub color: Color,
    pub timer: f32,
}

// ============================================================================
// EVENTS
// ============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Start,
    Choose(usize),
    ExportHabitat,
    SaveJournal,
}

// ============================================================================
// BEVY COMPONENTS
// ============================================================================

/// A rendered habitat part. Everything carrying this is replaced on rebuild.
#[derive(Component)]
pub struct HabitatMesh {
    pub part_id: String,
}

#[derive(Component)]
pub struct PlayerCamera;

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct StoryText;

#[derive(Component)]
pub struct SceneImage;

#[derive(Component)]
pub struct ChoiceButton(pub usize);

#[derive(Component)]
pub struct ChoiceLabel(pub usize);

#[derive(Component)]
pub struct StartButton;

#[derive(Component)]
pub struct ExportButton;

#[derive(Component)]
pub struct InventoryText;

#[derive(Component)]
pub struct LogText;

#[derive(Component)]
pub struct ToastContainer;
