//! Turn state machine.
//!
//! ```text
//! Start --start()--> Loading --apply_scene()--> Playing --choose()--> Loading
//!                       |                          ^                     |
//!                       |                          +---------------------+
//!                       |                       apply_scene() with game over --> GameOver
//!                       +--fail()--> Error  (terminal)
//! ```
//!
//! The game owns the story log, the inventory and the habitat. Only one
//! story request may be outstanding: `start` and `choose` hand out a
//! [`TurnRequest`] and move to `Loading`, and nothing else can be requested
//! until that turn is resolved with [`Game::apply_scene`] or [`Game::fail`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::habitat::{HabitatModel, HabitatSnapshot};
use crate::story::{Scene, ServiceError, StoryBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Start,
    Loading,
    Playing,
    GameOver,
    Error,
}

impl GameState {
    pub fn label(self) -> &'static str {
        match self {
            GameState::Start => "Awaiting launch",
            GameState::Loading => "Receiving transmission...",
            GameState::Playing => "Surviving",
            GameState::GameOver => "Mission ended",
            GameState::Error => "Signal lost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("cannot {action} while in state {from:?}")]
    InvalidTransition { from: GameState, action: &'static str },
    #[error("a story request is already in flight")]
    RequestInFlight,
    #[error("choice {0} is not on offer")]
    ChoiceOutOfRange(usize),
    #[error("story log ids leave no room for new entries")]
    EntryIdsExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryLogEntry {
    pub id: u64,
    pub text: String,
}

/// What the story backend should be asked next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub history: String,
    pub choice: String,
}

impl TurnRequest {
    /// True for the first turn, which uses the introductory scenario.
    pub fn is_opening(&self) -> bool {
        self.history.trim().is_empty()
    }
}

/// Changes made by one applied scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub entry_id: u64,
    pub new_part: Option<String>,
    pub new_item: Option<String>,
    pub game_over: bool,
}

#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    story_log: Vec<StoryLogEntry>,
    inventory: Vec<String>,
    habitat: HabitatModel,
    current_scene: Option<Scene>,
    error: Option<String>,
    next_entry_id: u64,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            state: GameState::Start,
            story_log: Vec::new(),
            inventory: Vec::new(),
            habitat: HabitatModel::new(),
            current_scene: None,
            error: None,
            next_entry_id: 1,
        }
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a finished game for review. Nothing can be requested from it.
    pub fn archived(
        story_log: Vec<StoryLogEntry>,
        inventory: Vec<String>,
        habitat: HabitatModel,
    ) -> Result<Self, GameError> {
        let next_entry_id = story_log
            .iter()
            .map(|e| e.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(GameError::EntryIdsExhausted)?;
        Ok(Self {
            state: GameState::GameOver,
            story_log,
            inventory,
            habitat,
            current_scene: None,
            error: None,
            next_entry_id,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Chronological, oldest first.
    pub fn story_log(&self) -> &[StoryLogEntry] {
        &self.story_log
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    pub fn habitat(&self) -> &HabitatModel {
        &self.habitat
    }

    pub fn habitat_snapshot(&self) -> HabitatSnapshot {
        self.habitat.snapshot()
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current_scene.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// All past narrative joined into one prompt-ready block.
    pub fn history(&self) -> String {
        self.story_log
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Choices the player may pick right now. Empty unless playing, even if
    /// a final scene listed some.
    pub fn visible_choices(&self) -> &[String] {
        match (self.state, &self.current_scene) {
            (GameState::Playing, Some(scene)) => &scene.payload.choices,
            _ => &[],
        }
    }

    fn refuse(&self, action: &'static str) -> GameError {
        match self.state {
            GameState::Loading => GameError::RequestInFlight,
            from => GameError::InvalidTransition { from, action },
        }
    }

    pub fn start(&mut self) -> Result<TurnRequest, GameError> {
        if self.state != GameState::Start {
            return Err(self.refuse("start"));
        }
        self.state = GameState::Loading;
        Ok(TurnRequest {
            history: String::new(),
            choice: String::new(),
        })
    }

    pub fn choose(&mut self, index: usize) -> Result<TurnRequest, GameError> {
        if self.state != GameState::Playing {
            return Err(self.refuse("choose"));
        }
        let choice = self
            .visible_choices()
            .get(index)
            .cloned()
            .ok_or(GameError::ChoiceOutOfRange(index))?;
        let history = self.history();
        self.state = GameState::Loading;
        Ok(TurnRequest { history, choice })
    }

    /// Merge a successful response into the game.
    pub fn apply_scene(&mut self, scene: Scene) -> Result<TurnOutcome, GameError> {
        if self.state != GameState::Loading {
            return Err(GameError::InvalidTransition {
                from: self.state,
                action: "apply a scene",
            });
        }

        let entry_id = self.next_entry_id;
        self.next_entry_id += 1;
        self.story_log.push(StoryLogEntry {
            id: entry_id,
            text: scene.payload.story.clone(),
        });

        let new_item = scene.payload.item().map(str::to_owned);
        if let Some(item) = &new_item {
            self.inventory.push(item.clone());
        }

        let new_part = scene
            .payload
            .habitat_update
            .clone()
            .map(|descriptor| self.habitat.add_part(descriptor).id);

        let game_over = scene.payload.game_over;
        self.state = if game_over {
            GameState::GameOver
        } else {
            GameState::Playing
        };
        self.current_scene = Some(scene);

        Ok(TurnOutcome {
            entry_id,
            new_part,
            new_item,
            game_over,
        })
    }

    /// Record a failed request. The game cannot continue afterwards.
    pub fn fail(&mut self, error: &ServiceError) -> Result<(), GameError> {
        if self.state != GameState::Loading {
            return Err(GameError::InvalidTransition {
                from: self.state,
                action: "fail a request",
            });
        }
        self.state = GameState::Error;
        self.error = Some(error.to_string());
        Ok(())
    }

    /// Resolve `request` synchronously against `backend`.
    pub fn run_turn<B: StoryBackend + ?Sized>(
        &mut self,
        backend: &B,
        request: &TurnRequest,
    ) -> Result<Option<TurnOutcome>, GameError> {
        match backend.fetch_next_scene(&request.history, &request.choice) {
            Ok(scene) => self.apply_scene(scene).map(Some),
            Err(e) => self.fail(&e).map(|_| None),
        }
    }
}
