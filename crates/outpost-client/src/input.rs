//! Keyboard input for the Outpost client.
//!
//! Enter starts, 1-4 pick a choice, X exports the habitat, Ctrl+S saves the journal.

use bevy::prelude::*;

use crate::state::PlayerAction;

const CHOICE_KEYS: [(KeyCode, KeyCode); 4] = [
    (KeyCode::Digit1, KeyCode::Numpad1),
    (KeyCode::Digit2, KeyCode::Numpad2),
    (KeyCode::Digit3, KeyCode::Numpad3),
    (KeyCode::Digit4, KeyCode::Numpad4),
];

/// Actions triggered by this frame's key presses.
pub fn key_actions(keyboard: &ButtonInput<KeyCode>) -> Vec<PlayerAction> {
    let mut actions = Vec::new();
    let ctrl = keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);

    if keyboard.any_just_pressed([KeyCode::Enter, KeyCode::NumpadEnter]) {
        actions.push(PlayerAction::Start);
    }
    for (index, (digit, numpad)) in CHOICE_KEYS.iter().enumerate() {
        if keyboard.any_just_pressed([*digit, *numpad]) {
            actions.push(PlayerAction::Choose(index));
        }
    }
    if keyboard.just_pressed(KeyCode::KeyX) {
        actions.push(PlayerAction::ExportHabitat);
    }
    if ctrl && keyboard.just_pressed(KeyCode::KeyS) {
        actions.push(PlayerAction::SaveJournal);
    }
    actions
}

pub fn player_input(keyboard: Res<ButtonInput<KeyCode>>, mut actions: EventWriter<PlayerAction>) {
    for action in key_actions(&keyboard) {
        actions.send(action);
    }
}
