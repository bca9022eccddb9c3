//! Integration tests for whole turns through a scripted story backend.
//!
//! Exercises: start → scene → choice → scene → game over / error,
//! with the habitat, STL export and journal checked along the way.
//!
//! Pure logic only: no network and no rendering.

use std::cell::RefCell;
use std::collections::VecDeque;

use outpost_logic::game::{Game, GameState};
use outpost_logic::geometry::{habitat_triangles, part_geometry};
use outpost_logic::habitat::{HabitatPartDescriptor, PartType, Vec3};
use outpost_logic::journal::SessionSnapshot;
use outpost_logic::payload::parse_scene_payload;
use outpost_logic::stl;
use outpost_logic::story::{Scene, ServiceError, StoryBackend};

// ── Helpers ────────────────────────────────────────────────────────────

/// Replays queued responses and records every call.
#[derive(Default)]
struct ScriptedBackend {
    responses: RefCell<VecDeque<Result<Scene, ServiceError>>>,
    calls: RefCell<Vec<(String, String)>>,
}

impl ScriptedBackend {
    fn with(responses: Vec<Result<Scene, ServiceError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl StoryBackend for ScriptedBackend {
    fn fetch_next_scene(&self, history: &str, choice: &str) -> Result<Scene, ServiceError> {
        self.calls
            .borrow_mut()
            .push((history.to_string(), choice.to_string()));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Network("script exhausted".into())))
    }
}

fn scene_from_json(json: &str) -> Scene {
    Scene {
        payload: parse_scene_payload(json).expect("fixture payload is valid"),
        image_url: "data:image/jpeg;base64,/9j/".into(),
    }
}

fn opening_scene() -> Scene {
    scene_from_json(
        r#"{
            "story": "Your lander hit the dunes hard. The hull still holds air.",
            "imagePrompt": "crashed cylindrical lander in red desert",
            "choices": ["Check the oxygen", "Open the hatch", "Call for help"],
            "newItem": "",
            "gameOver": false,
            "habitatUpdate": {
                "partType": "CYLINDER",
                "position": {"x": 0, "y": 0, "z": 0},
                "rotation": {"x": 0, "y": 0, "z": 0},
                "scale": {"x": 1, "y": 1, "z": 1}
            }
        }"#,
    )
}

fn scene(story: &str, item: &str, game_over: bool, part: Option<PartType>) -> Scene {
    let mut scene = opening_scene();
    scene.payload.story = story.into();
    scene.payload.new_item = item.into();
    scene.payload.game_over = game_over;
    scene.payload.habitat_update = part.map(|part_type| HabitatPartDescriptor {
        part_type,
        position: Vec3::new(1.0, 0.0, 0.0),
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    });
    scene
}

// ── Turn flow ──────────────────────────────────────────────────────────

#[test]
fn opening_turn_issues_one_intro_request() {
    let backend = ScriptedBackend::with(vec![Ok(opening_scene())]);
    let mut game = Game::new();
    assert_eq!(game.state(), GameState::Start);

    let request = game.start().unwrap();
    let outcome = game.run_turn(&backend, &request).unwrap().unwrap();

    let calls = backend.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (String::new(), String::new()));
    assert_eq!(game.state(), GameState::Playing);
    assert_eq!(game.story_log().len(), 1);
    assert!(game.habitat().len() <= 1);
    assert_eq!(outcome.new_part.as_deref(), Some("part-0"));
}

#[test]
fn lander_renders_as_single_unit_cylinder() {
    let backend = ScriptedBackend::with(vec![Ok(opening_scene())]);
    let mut game = Game::new();
    let request = game.start().unwrap();
    game.run_turn(&backend, &request).unwrap();

    let parts = game.habitat().parts();
    assert_eq!(parts.len(), 1);
    let lander = &parts[0];
    assert_eq!(lander.part_type, PartType::Cylinder);
    assert_eq!(lander.position, Vec3::ZERO);
    assert_eq!(lander.rotation, Vec3::ZERO);
    assert_eq!(lander.scale, Vec3::ONE);

    // World triangles equal the untransformed cylinder.
    let local: Vec<_> = part_geometry(PartType::Cylinder)
        .unwrap()
        .triangles()
        .collect();
    assert_eq!(habitat_triangles(parts), local);
}

#[test]
fn choice_turn_sends_history_and_choice_text() {
    let backend = ScriptedBackend::with(vec![
        Ok(opening_scene()),
        Ok(scene("You seal the breach.", "Sealant", false, Some(PartType::Airlock))),
    ]);
    let mut game = Game::new();
    let request = game.start().unwrap();
    game.run_turn(&backend, &request).unwrap();

    let request = game.choose(1).unwrap();
    assert_eq!(game.state(), GameState::Loading);
    game.run_turn(&backend, &request).unwrap();

    let calls = backend.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].0.contains("lander hit the dunes"));
    assert_eq!(calls[1].1, "Open the hatch");
    assert_eq!(game.inventory(), ["Sealant"]);
    assert_eq!(game.habitat().len(), 2);
    assert_eq!(game.story_log()[1].id, 2);
}

#[test]
fn final_scene_hides_listed_choices() {
    let backend = ScriptedBackend::with(vec![
        Ok(opening_scene()),
        Ok(scene("Rescue arrives at dawn.", "", true, None)),
    ]);
    let mut game = Game::new();
    let request = game.start().unwrap();
    game.run_turn(&backend, &request).unwrap();
    let request = game.choose(2).unwrap();
    game.run_turn(&backend, &request).unwrap();

    assert_eq!(game.state(), GameState::GameOver);
    assert_eq!(game.current_scene().unwrap().payload.choices.len(), 3);
    assert!(game.visible_choices().is_empty());
    assert!(game.choose(0).is_err());
}

#[test]
fn network_failure_while_loading_is_terminal() {
    let backend = ScriptedBackend::with(vec![
        Ok(opening_scene()),
        Err(ServiceError::Network("connection reset".into())),
    ]);
    let mut game = Game::new();
    let request = game.start().unwrap();
    game.run_turn(&backend, &request).unwrap();
    let log_before = game.story_log().to_vec();
    let parts_before = game.habitat().len();

    let request = game.choose(0).unwrap();
    let outcome = game.run_turn(&backend, &request).unwrap();

    assert!(outcome.is_none());
    assert_eq!(game.state(), GameState::Error);
    assert_eq!(game.story_log(), log_before.as_slice());
    assert_eq!(game.habitat().len(), parts_before);
    assert!(game.inventory().is_empty());
    assert!(game.start().is_err());
}

#[test]
fn opening_failure_leaves_game_empty() {
    let backend = ScriptedBackend::with(vec![Err(ServiceError::NoImage)]);
    let mut game = Game::new();
    let request = game.start().unwrap();
    game.run_turn(&backend, &request).unwrap();

    assert_eq!(game.state(), GameState::Error);
    assert!(game.story_log().is_empty());
    assert!(game.habitat().is_empty());
    assert!(game.current_scene().is_none());
}

// ── Export and journal ────────────────────────────────────────────────

#[test]
fn stl_export_tracks_habitat_growth() {
    let backend = ScriptedBackend::with(vec![
        Ok(opening_scene()),
        Ok(scene("A dome rises.", "", false, Some(PartType::Dome))),
    ]);
    let mut game = Game::new();
    let request = game.start().unwrap();
    game.run_turn(&backend, &request).unwrap();
    let first = stl::export_parts(game.habitat().parts());

    let request = game.choose(0).unwrap();
    game.run_turn(&backend, &request).unwrap();
    let second = stl::export_parts(game.habitat().parts());

    let dome = part_geometry(PartType::Dome).unwrap().triangle_count() as u32;
    assert_eq!(
        stl::triangle_count(&second).unwrap(),
        stl::triangle_count(&first).unwrap() + dome
    );
}

#[test]
fn journal_round_trip_preserves_build() {
    let backend = ScriptedBackend::with(vec![
        Ok(opening_scene()),
        Ok(scene("A tube links the modules.", "Wrench", false, Some(PartType::Tube))),
    ]);
    let mut game = Game::new();
    let request = game.start().unwrap();
    game.run_turn(&backend, &request).unwrap();
    let request = game.choose(0).unwrap();
    game.run_turn(&backend, &request).unwrap();

    let json = SessionSnapshot::capture(&game).to_json_pretty().unwrap();
    let archived = SessionSnapshot::from_json(&json)
        .unwrap()
        .into_archived_game()
        .unwrap();
    assert_eq!(archived.habitat().parts(), game.habitat().parts());
    assert_eq!(archived.inventory(), game.inventory());
    assert_eq!(archived.history(), game.history());
}
