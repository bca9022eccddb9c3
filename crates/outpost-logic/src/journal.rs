//! Expedition journal: a JSON record of a session.
//!
//! Saved on demand from the client and reopened for review. A reopened
//! journal becomes an archived [`Game`] that can be looked at but not played.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{Game, GameError, GameState, StoryLogEntry};
use crate::habitat::{HabitatError, HabitatModel, HabitatPart};

/// A journal that parsed but cannot be reopened.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("bad habitat: {0}")]
    Habitat(#[from] HabitatError),
    #[error("bad story log: {0}")]
    Game(#[from] GameError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: GameState,
    pub story_log: Vec<StoryLogEntry>,
    pub inventory: Vec<String>,
    pub habitat: Vec<HabitatPart>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub fn capture(game: &Game) -> Self {
        Self {
            state: game.state(),
            story_log: game.story_log().to_vec(),
            inventory: game.inventory().to_vec(),
            habitat: game.habitat().parts().to_vec(),
            error: game.error().map(str::to_owned),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Turn the journal back into a read-only game.
    pub fn into_archived_game(self) -> Result<Game, JournalError> {
        let habitat = HabitatModel::from_parts(self.habitat)?;
        Ok(Game::archived(self.story_log, self.inventory, habitat)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habitat::{HabitatPartDescriptor, PartType, Vec3};
    use crate::payload::ScenePayload;
    use crate::story::Scene;

    fn played_game() -> Game {
        let mut game = Game::new();
        game.start().unwrap();
        game.apply_scene(Scene {
            payload: ScenePayload {
                story: "The lander lies on its side.".into(),
                image_prompt: "wreck".into(),
                choices: vec!["Salvage".into(), "Scout".into()],
                new_item: "Power Cell".into(),
                game_over: false,
                habitat_update: Some(HabitatPartDescriptor {
                    part_type: PartType::Cylinder,
                    position: Vec3::ZERO,
                    rotation: Vec3::ZERO,
                    scale: Vec3::ONE,
                }),
            },
            image_url: String::new(),
        })
        .unwrap();
        game
    }

    #[test]
    fn test_capture_and_reload() {
        let game = played_game();
        let json = SessionSnapshot::capture(&game).to_json_pretty().unwrap();
        let snapshot = SessionSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.state, GameState::Playing);
        assert_eq!(snapshot.inventory, vec!["Power Cell".to_string()]);

        let archived = snapshot.into_archived_game().unwrap();
        assert_eq!(archived.state(), GameState::GameOver);
        assert_eq!(archived.story_log(), game.story_log());
        assert_eq!(archived.habitat().parts(), game.habitat().parts());
        assert!(archived.visible_choices().is_empty());
    }

    #[test]
    fn test_unknown_parts_survive_reload() {
        let json = r#"{
            "state": "GameOver",
            "storyLog": [{"id": 1, "text": "Built."}],
            "inventory": [],
            "habitat": [
                {"id": "part-0", "partType": "CYLINDER",
                 "position": {"x": 0, "y": 0, "z": 0},
                 "rotation": {"x": 0, "y": 0, "z": 0},
                 "scale": {"x": 1, "y": 1, "z": 1}},
                {"id": "part-1", "partType": "SOLAR_ARRAY",
                 "position": {"x": 1, "y": 0, "z": 0},
                 "rotation": {"x": 0, "y": 0, "z": 0},
                 "scale": {"x": 1, "y": 1, "z": 1}}
            ]
        }"#;
        let game = SessionSnapshot::from_json(json)
            .unwrap()
            .into_archived_game()
            .unwrap();
        assert_eq!(game.habitat().len(), 2);
        assert_eq!(game.habitat().parts()[1].part_type, PartType::Unknown);
    }

    fn journal_with(part_id: &str, entry_id: u64) -> String {
        format!(
            r#"{{
            "state": "GameOver",
            "storyLog": [{{"id": {entry_id}, "text": "Built."}}],
            "inventory": [],
            "habitat": [
                {{"id": "{part_id}", "partType": "CYLINDER",
                 "position": {{"x": 0, "y": 0, "z": 0}},
                 "rotation": {{"x": 0, "y": 0, "z": 0}},
                 "scale": {{"x": 1, "y": 1, "z": 1}}}}
            ]
        }}"#
        )
    }

    #[test]
    fn test_exhausted_part_ids_are_rejected() {
        let json = journal_with(&format!("part-{}", u64::MAX), 1);
        let err = SessionSnapshot::from_json(&json)
            .unwrap()
            .into_archived_game()
            .unwrap_err();
        assert!(matches!(err, JournalError::Habitat(HabitatError::IdsExhausted)));
    }

    #[test]
    fn test_exhausted_log_ids_are_rejected() {
        let json = journal_with("part-0", u64::MAX);
        let err = SessionSnapshot::from_json(&json)
            .unwrap()
            .into_archived_game()
            .unwrap_err();
        assert!(matches!(err, JournalError::Game(GameError::EntryIdsExhausted)));
    }

    #[test]
    fn test_largest_usable_ids_still_load() {
        let json = journal_with(&format!("part-{}", u64::MAX - 1), u64::MAX - 1);
        let game = SessionSnapshot::from_json(&json)
            .unwrap()
            .into_archived_game()
            .unwrap();
        assert_eq!(game.story_log()[0].id, u64::MAX - 1);
    }
}
