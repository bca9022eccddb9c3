//! Outpost Client - Bevy front end for the Mars survival story
//!
//! Story panel on the left, the growing habitat in 3D on the right. Story
//! turns are fetched on a background worker; everything else runs in the
//! main schedule.

mod camera;
mod export;
mod input;
mod networking;
mod rendering;
mod state;
mod ui;

use std::path::Path;

use bevy::prelude::*;
use outpost_logic::game::Game;
use outpost_logic::journal::{JournalError, SessionSnapshot};
use outpost_story::{ConfigError, StoryClient, StoryConfig};
use thiserror::Error;

use crate::state::{ClientConfig, GameSession, PlayerAction, PublishedHabitat, UiState, ViewState};

#[derive(Debug, Error)]
enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not read journal {path}: {source}")]
    Journal {
        path: String,
        source: std::io::Error,
    },
    #[error("journal is not valid: {0}")]
    JournalFormat(#[from] serde_json::Error),
    #[error("journal cannot be reopened: {0}")]
    JournalContent(#[from] JournalError),
    #[error("could not start story worker: {0}")]
    Worker(std::io::Error),
}

fn load_journal(path: &Path) -> Result<Game, LaunchError> {
    let text = std::fs::read_to_string(path).map_err(|source| LaunchError::Journal {
        path: path.display().to_string(),
        source,
    })?;
    Ok(SessionSnapshot::from_json(&text)?.into_archived_game()?)
}

fn story_worker(config: &ClientConfig) -> Result<networking::StoryWorker, LaunchError> {
    let mut story_config = StoryConfig::from_env()?;
    if let Some(model) = &config.text_model {
        story_config = story_config.with_text_model(model.as_str());
    }
    if let Some(model) = &config.image_model {
        story_config = story_config.with_image_model(model.as_str());
    }
    let client = StoryClient::new(story_config)?;
    networking::spawn_story_worker(Box::new(client)).map_err(LaunchError::Worker)
}

fn main() {
    let config = ClientConfig::from_args();

    // Credentials are checked before any window opens.
    let launch = match &config.review_journal {
        Some(path) => load_journal(path).map(|game| (game, None)),
        None => story_worker(&config).map(|worker| (Game::new(), Some(worker))),
    };
    let (game, worker) = match launch {
        Ok(launch) => launch,
        Err(e) => {
            eprintln!("outpost: {}", e);
            std::process::exit(1);
        }
    };

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Outpost - Mars Survival".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: bevy::window::PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .add_event::<PlayerAction>()
    .insert_resource(ClearColor(Color::srgb(0.78, 0.55, 0.4)))
    .insert_resource(PublishedHabitat(game.habitat_snapshot()))
    .insert_resource(GameSession(game))
    .insert_resource(config)
    .insert_resource(ViewState::default())
    .insert_resource(UiState::default())
    .add_systems(
        Startup,
        (
            camera::setup_camera,
            ui::setup_ui,
            rendering::init_part_library,
        ),
    )
    .add_systems(
        Update,
        (
            input::player_input,
            ui::button_actions,
            networking::dispatch_player_actions,
            networking::poll_story_responses,
            rendering::sync_habitat,
            export::export_habitat,
            export::save_journal,
        )
            .chain(),
    )
    .add_systems(
        Update,
        (
            camera::fit_viewport,
            camera::orbit_camera,
            ui::render_status,
            ui::render_story,
            ui::render_choices,
            ui::render_start_button,
            ui::render_scene_image,
            ui::render_inventory,
            ui::render_log,
            ui::tick_toasts,
            ui::render_toasts,
        ),
    );

    if let Some(worker) = worker {
        app.insert_resource(worker);
    }
    app.run();
}
