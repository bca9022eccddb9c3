//! Story backend plumbing for the Outpost client.
//!
//! Backend calls block for seconds, so they run on a dedicated worker thread.
//! The main schedule hands it one [`TurnRequest`] at a time and polls for the
//! reply each frame; the game itself is only ever touched on the main thread.

use std::thread::{self, JoinHandle};

use base64::Engine;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use outpost_logic::game::{GameState, TurnRequest};
use outpost_logic::story::{Scene, ServiceError, StoryBackend};
use thiserror::Error;

use crate::state::{GameSession, PlayerAction, PublishedHabitat, UiState};

/// Decoded scene illustration, ready to become a texture.
#[derive(Debug, Clone)]
pub struct Illustration {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum IllustrationError {
    #[error("not a base64 data URI")]
    NotDataUri,
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("undecodable image: {0}")]
    Image(#[from] image::ImageError),
}

pub struct StoryReply {
    pub result: Result<Scene, ServiceError>,
    /// `None` when the scene failed or its image could not be decoded.
    pub illustration: Option<Illustration>,
}

#[derive(Resource)]
pub struct StoryWorker {
    requests: Sender<TurnRequest>,
    replies: Receiver<StoryReply>,
    _thread: JoinHandle<()>,
}

impl StoryWorker {
    pub fn submit(&self, request: TurnRequest) -> Result<(), ServiceError> {
        self.requests.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => ServiceError::Network("story worker is busy".into()),
            TrySendError::Disconnected(_) => ServiceError::Network("story worker stopped".into()),
        })
    }

    pub fn try_reply(&self) -> Result<StoryReply, TryRecvError> {
        self.replies.try_recv()
    }
}

/// Start the worker thread. It owns `backend` and exits once the
/// [`StoryWorker`] is dropped.
pub fn spawn_story_worker(backend: Box<dyn StoryBackend>) -> std::io::Result<StoryWorker> {
    let (request_tx, request_rx) = bounded::<TurnRequest>(1);
    let (reply_tx, reply_rx) = bounded::<StoryReply>(1);

    let handle = thread::Builder::new()
        .name("story-worker".into())
        .spawn(move || {
            for request in request_rx.iter() {
                info!(
                    "Requesting {} scene...",
                    if request.is_opening() { "opening" } else { "next" }
                );
                let result = backend.fetch_next_scene(&request.history, &request.choice);
                let illustration = result.as_ref().ok().and_then(|scene| {
                    decode_illustration(&scene.image_url)
                        .map_err(|e| warn!("Scene image dropped: {}", e))
                        .ok()
                });
                if reply_tx.send(StoryReply { result, illustration }).is_err() {
                    break;
                }
            }
            debug!("Story worker exiting");
        })?;

    Ok(StoryWorker {
        requests: request_tx,
        replies: reply_rx,
        _thread: handle,
    })
}

/// Decode a `data:<mime>;base64,<payload>` URI into RGBA pixels.
pub fn decode_illustration(data_uri: &str) -> Result<Illustration, IllustrationError> {
    let encoded = data_uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or(IllustrationError::NotDataUri)?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    Ok(Illustration {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

fn illustration_image(illustration: Illustration) -> Image {
    Image::new(
        Extent3d {
            width: illustration.width,
            height: illustration.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        illustration.rgba,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

/// Turn start/choose actions into story requests.
pub fn dispatch_player_actions(
    mut actions: EventReader<PlayerAction>,
    mut session: ResMut<GameSession>,
    worker: Option<Res<StoryWorker>>,
    mut ui: ResMut<UiState>,
) {
    for action in actions.read() {
        let request = match action {
            PlayerAction::Start => session.0.start(),
            PlayerAction::Choose(index) => session.0.choose(*index),
            PlayerAction::ExportHabitat | PlayerAction::SaveJournal => continue,
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                debug!("Ignored {:?}: {}", action, e);
                continue;
            }
        };

        ui.pending_choice = (!request.choice.is_empty()).then(|| request.choice.clone());
        let sent = match worker.as_deref() {
            Some(worker) => worker.submit(request),
            None => Err(ServiceError::Network("no story backend configured".into())),
        };
        if let Err(e) = sent {
            error!("Could not send story request: {}", e);
            if let Err(e) = session.0.fail(&e) {
                warn!("{}", e);
            }
        }
    }
}

/// Apply finished turns to the game and republish the habitat.
pub fn poll_story_responses(
    worker: Option<Res<StoryWorker>>,
    mut session: ResMut<GameSession>,
    mut published: ResMut<PublishedHabitat>,
    mut ui: ResMut<UiState>,
    mut images: ResMut<Assets<Image>>,
) {
    let Some(worker) = worker else { return };

    loop {
        let reply = match worker.try_reply() {
            Ok(reply) => reply,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                if session.0.state() == GameState::Loading {
                    error!("Story worker stopped while a request was in flight");
                    let lost = ServiceError::Network("story worker stopped".into());
                    if let Err(e) = session.0.fail(&lost) {
                        warn!("{}", e);
                    }
                }
                break;
            }
        };

        ui.pending_choice = None;
        match reply.result {
            Ok(scene) => match session.0.apply_scene(scene) {
                Ok(outcome) => {
                    ui.scene_image = reply.illustration.map(|i| images.add(illustration_image(i)));
                    if let Some(item) = outcome.new_item {
                        ui.toast(format!("Found: {}", item), Color::srgb(0.6, 1.0, 0.6), 4.0);
                    }
                    if outcome.new_part.is_some() {
                        ui.toast("Habitat expanded", Color::srgb(0.6, 0.8, 1.0), 3.0);
                    }
                    if outcome.game_over {
                        info!("Story ended after {} entries", session.0.story_log().len());
                    }
                }
                Err(e) => warn!("Dropped scene: {}", e),
            },
            Err(e) => {
                error!("Story request failed: {}", e);
                if let Err(e) = session.0.fail(&e) {
                    warn!("{}", e);
                }
            }
        }

        let snapshot = session.0.habitat_snapshot();
        if snapshot.version != published.0.version {
            published.0 = snapshot;
        }
    }
}
