//! UI rendering for the Outpost client.
//!
//! The story panel on the left (status, illustration, narrative, choices,
//! inventory, log) and toast notifications over the habitat view.

use bevy::prelude::*;
use outpost_logic::game::{Game, GameState};

use crate::camera::PANEL_FRACTION;
use crate::state::{
    ChoiceButton, ChoiceLabel, ExportButton, GameSession, InventoryText, LogText, PlayerAction,
    SceneImage, StartButton, StatusText, StoryText, ToastContainer, UiState,
};

const PANEL_BG: Color = Color::srgb(0.08, 0.06, 0.06);
const BUTTON_BG: Color = Color::srgb(0.28, 0.14, 0.1);
const BUTTON_HOVER: Color = Color::srgb(0.42, 0.2, 0.12);
const BUTTON_PRESSED: Color = Color::srgb(0.6, 0.3, 0.15);
const TEXT_DIM: Color = Color::srgb(0.7, 0.65, 0.6);

/// Choice buttons spawned up front; unused ones stay hidden.
const CHOICE_SLOTS: usize = 4;
const LOG_LINES: usize = 6;

fn button_node() -> Node {
    Node {
        width: Val::Percent(100.0),
        padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)),
        margin: UiRect::top(Val::Px(4.0)),
        ..default()
    }
}

fn label(text: &str, size: f32, color: Color) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

pub fn setup_ui(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                width: Val::Percent(PANEL_FRACTION * 100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(14.0)),
                row_gap: Val::Px(8.0),
                overflow: Overflow::clip(),
                ..default()
            },
            BackgroundColor(PANEL_BG),
        ))
        .with_children(|panel| {
            panel.spawn((
                label("", 13.0, Color::srgb(1.0, 0.75, 0.4)),
                StatusText,
            ));

            panel.spawn((
                ImageNode::default(),
                Node {
                    width: Val::Percent(100.0),
                    aspect_ratio: Some(16.0 / 9.0),
                    display: Display::None,
                    ..default()
                },
                SceneImage,
            ));

            panel.spawn((label("", 15.0, Color::WHITE), StoryText));

            for slot in 0..CHOICE_SLOTS {
                panel
                    .spawn((
                        Button,
                        Node {
                            display: Display::None,
                            ..button_node()
                        },
                        BackgroundColor(BUTTON_BG),
                        ChoiceButton(slot),
                    ))
                    .with_children(|button| {
                        button.spawn((label("", 14.0, Color::WHITE), ChoiceLabel(slot)));
                    });
            }

            panel
                .spawn((Button, button_node(), BackgroundColor(BUTTON_BG), StartButton))
                .with_children(|button| {
                    button.spawn(label("Begin transmission [Enter]", 14.0, Color::WHITE));
                });

            panel
                .spawn((Button, button_node(), BackgroundColor(BUTTON_BG), ExportButton))
                .with_children(|button| {
                    button.spawn(label("Export habitat STL [X]", 13.0, TEXT_DIM));
                });

            panel.spawn((label("", 13.0, Color::srgb(0.8, 1.0, 0.8)), InventoryText));
            panel.spawn((label("", 12.0, TEXT_DIM), LogText));
        });

    // Toasts (top-right, over the habitat view)
    commands.spawn((
        label("", 14.0, Color::srgb(1.0, 0.9, 0.3)),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(14.0),
            top: Val::Px(14.0),
            max_width: Val::Px(360.0),
            ..default()
        },
        ToastContainer,
    ));
}

fn set_text(text: &mut Mut<Text>, value: String) {
    if text.0 != value {
        text.0 = value;
    }
}

/// State label, prefixed with the turn number once the story has begun.
pub fn status_line(game: &Game, pending_choice: Option<&str>) -> String {
    let line = match (game.state(), game.error(), pending_choice) {
        (GameState::Error, Some(error), _) => format!("{}: {}", game.state().label(), error),
        (GameState::Loading, _, Some(choice)) => {
            format!("{}\n> {}", game.state().label(), choice)
        }
        (state, _, _) => state.label().to_string(),
    };
    match game.story_log().len() {
        0 => line,
        turns => format!("Turn {} | {}", turns, line),
    }
}

pub fn inventory_line(items: &[String]) -> String {
    if items.is_empty() {
        "Inventory: empty".to_string()
    } else {
        format!("Inventory: {}", items.join(", "))
    }
}

/// Most recent entries first.
pub fn log_lines(game: &Game, limit: usize) -> String {
    game.story_log()
        .iter()
        .rev()
        .take(limit)
        .map(|entry| {
            let first_line = entry.text.lines().next().unwrap_or_default();
            format!("#{} {}", entry.id, first_line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_status(
    session: Res<GameSession>,
    ui: Res<UiState>,
    mut status_q: Query<&mut Text, With<StatusText>>,
) {
    let Ok(mut text) = status_q.get_single_mut() else {
        return;
    };
    set_text(&mut text, status_line(&session.0, ui.pending_choice.as_deref()));
}

pub fn render_story(session: Res<GameSession>, mut story_q: Query<&mut Text, With<StoryText>>) {
    let Ok(mut text) = story_q.get_single_mut() else {
        return;
    };
    let game = &session.0;
    let story = match game.current_scene() {
        Some(scene) => scene.payload.story.clone(),
        // Reopened journals have no current scene, only the log.
        None => match game.story_log().last() {
            Some(entry) => entry.text.clone(),
            None if game.state() == GameState::Start => {
                "Your lander is falling toward Mars. Begin when ready.".to_string()
            }
            None => String::new(),
        },
    };
    set_text(&mut text, story);
}

pub fn render_choices(
    session: Res<GameSession>,
    mut buttons: Query<(&ChoiceButton, &mut Node)>,
    mut labels: Query<(&ChoiceLabel, &mut Text)>,
) {
    let choices = session.0.visible_choices();
    for (button, mut node) in buttons.iter_mut() {
        let display = if button.0 < choices.len() {
            Display::Flex
        } else {
            Display::None
        };
        if node.display != display {
            node.display = display;
        }
    }
    for (slot, mut text) in labels.iter_mut() {
        if let Some(choice) = choices.get(slot.0) {
            set_text(&mut text, format!("{}. {}", slot.0 + 1, choice));
        }
    }
}

pub fn render_start_button(
    session: Res<GameSession>,
    mut start_q: Query<&mut Node, With<StartButton>>,
) {
    let Ok(mut node) = start_q.get_single_mut() else {
        return;
    };
    let display = if session.0.state() == GameState::Start {
        Display::Flex
    } else {
        Display::None
    };
    if node.display != display {
        node.display = display;
    }
}

pub fn render_scene_image(
    ui: Res<UiState>,
    mut image_q: Query<(&mut ImageNode, &mut Node), With<SceneImage>>,
) {
    if !ui.is_changed() {
        return;
    }
    let Ok((mut image, mut node)) = image_q.get_single_mut() else {
        return;
    };
    match &ui.scene_image {
        Some(handle) => {
            if image.image != *handle {
                image.image = handle.clone();
            }
            node.display = Display::Flex;
        }
        None => node.display = Display::None,
    }
}

pub fn render_inventory(
    session: Res<GameSession>,
    mut inventory_q: Query<&mut Text, With<InventoryText>>,
) {
    let Ok(mut text) = inventory_q.get_single_mut() else {
        return;
    };
    set_text(&mut text, inventory_line(session.0.inventory()));
}

pub fn render_log(session: Res<GameSession>, mut log_q: Query<&mut Text, With<LogText>>) {
    let Ok(mut text) = log_q.get_single_mut() else {
        return;
    };
    set_text(&mut text, log_lines(&session.0, LOG_LINES));
}

pub fn render_toasts(
    ui: Res<UiState>,
    mut toast_q: Query<(&mut Text, &mut TextColor), With<ToastContainer>>,
) {
    let Ok((mut text, mut color)) = toast_q.get_single_mut() else {
        return;
    };
    let messages: Vec<&str> = ui.toasts.iter().map(|t| t.message.as_str()).collect();
    set_text(&mut text, messages.join("\n"));
    if let Some(latest) = ui.toasts.last() {
        if color.0 != latest.color {
            color.0 = latest.color;
        }
    }
}

pub fn tick_toasts(time: Res<Time>, mut ui: ResMut<UiState>) {
    if ui.toasts.is_empty() {
        return;
    }
    let dt = time.delta_secs();
    for toast in ui.toasts.iter_mut() {
        toast.timer -= dt;
    }
    ui.toasts.retain(|t| t.timer > 0.0);
}

#[allow(clippy::type_complexity)]
pub fn button_actions(
    mut buttons: Query<
        (
            &Interaction,
            &mut BackgroundColor,
            Option<&ChoiceButton>,
            Has<StartButton>,
            Has<ExportButton>,
        ),
        (Changed<Interaction>, With<Button>),
    >,
    mut actions: EventWriter<PlayerAction>,
) {
    for (interaction, mut bg, choice, is_start, is_export) in buttons.iter_mut() {
        match interaction {
            Interaction::Pressed => {
                bg.0 = BUTTON_PRESSED;
                let action = match (choice, is_start, is_export) {
                    (Some(choice), _, _) => PlayerAction::Choose(choice.0),
                    (None, true, _) => PlayerAction::Start,
                    (None, false, true) => PlayerAction::ExportHabitat,
                    (None, false, false) => continue,
                };
                actions.send(action);
            }
            Interaction::Hovered => bg.0 = BUTTON_HOVER,
            Interaction::None => bg.0 = BUTTON_BG,
        }
    }
}
