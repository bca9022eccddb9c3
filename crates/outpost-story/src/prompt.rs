//! Prompt text and request bodies for the story and image backends.

use outpost_logic::habitat::PartType;
use outpost_logic::payload::{MAX_CHOICES, MIN_CHOICES};
use serde_json::{json, Value};

pub const SYSTEM_INSTRUCTION: &str = "\
You are the narrator of a survival story set on Mars. The player is a lone \
astronaut stranded after a crash landing, and every scene they survive moves \
them closer to a working outpost. Write in second person, present tense, one \
or two short paragraphs per scene.

Each scene offers between 2 and 4 concrete actions. When the player finds or \
builds something they can carry, name it in newItem; otherwise newItem is an \
empty string. Set gameOver to true only when the story has truly ended, in \
rescue or in death.

When a scene adds a structure to the outpost, describe it in habitatUpdate; \
otherwise habitatUpdate must be null. Parts are CYLINDER (habitation module), \
DOME (greenhouse or observatory), TUBE (connecting corridor) or AIRLOCK. \
Units are meters at a 1:4 scale, y is up and the ground is at y = 0. Place \
new parts touching existing ones, rotations are radians.";

pub const INTRO_PROMPT: &str = "\
Begin the story. The player's lander has just crash-landed on the Martian \
surface during a dust storm; the rest of the crew did not survive. The wreck \
of the lander is the first part of the outpost: include a habitatUpdate that \
places a CYLINDER at position (0, 0, 0) with rotation (0, 0, 0) and scale \
(1, 1, 1).";

pub const IMAGE_STYLE_SUFFIX: &str = ", cinematic sci-fi concept art, dramatic lighting, \
Martian landscape, highly detailed, 16:9 widescreen";

pub const IMAGE_ASPECT_RATIO: &str = "16:9";
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// The user prompt for a turn. An empty history starts the story.
pub fn story_prompt(history: &str, choice: &str) -> String {
    if history.trim().is_empty() {
        return INTRO_PROMPT.to_string();
    }
    format!(
        "The story so far:\n\n{}\n\nThe player chooses: \"{}\"\n\n\
         Continue the story from that action.",
        history.trim(),
        choice.trim()
    )
}

fn vec3_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "x": { "type": "NUMBER" },
            "y": { "type": "NUMBER" },
            "z": { "type": "NUMBER" }
        },
        "required": ["x", "y", "z"]
    })
}

/// Structured-output schema the story backend must follow.
pub fn scene_schema() -> Value {
    let part_types: Vec<&str> = PartType::BUILDABLE.iter().map(|t| t.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "story": { "type": "STRING" },
            "imagePrompt": { "type": "STRING" },
            "choices": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": MIN_CHOICES,
                "maxItems": MAX_CHOICES
            },
            "newItem": { "type": "STRING" },
            "gameOver": { "type": "BOOLEAN" },
            "habitatUpdate": {
                "type": "OBJECT",
                "nullable": true,
                "properties": {
                    "partType": { "type": "STRING", "enum": part_types },
                    "position": vec3_schema(),
                    "rotation": vec3_schema(),
                    "scale": vec3_schema()
                },
                "required": ["partType", "position", "rotation", "scale"]
            }
        },
        "required": ["story", "imagePrompt", "choices", "newItem", "gameOver", "habitatUpdate"]
    })
}

pub fn story_request(prompt: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": scene_schema()
        }
    })
}

pub fn image_request(image_prompt: &str) -> Value {
    json!({
        "instances": [{ "prompt": format!("{}{}", image_prompt.trim(), IMAGE_STYLE_SUFFIX) }],
        "parameters": {
            "sampleCount": 1,
            "aspectRatio": IMAGE_ASPECT_RATIO,
            "outputMimeType": IMAGE_MIME_TYPE
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_uses_intro() {
        assert_eq!(story_prompt("", "ignored"), INTRO_PROMPT);
        assert_eq!(story_prompt("  \n", ""), INTRO_PROMPT);
    }

    #[test]
    fn test_continuation_embeds_history_and_choice() {
        let prompt = story_prompt("The storm passes.", "Climb the ridge");
        assert!(prompt.contains("The storm passes."));
        assert!(prompt.contains("\"Climb the ridge\""));
        assert!(!prompt.contains(INTRO_PROMPT));
    }

    #[test]
    fn test_schema_lists_buildable_parts_only() {
        let schema = scene_schema();
        let parts = &schema["properties"]["habitatUpdate"]["properties"]["partType"]["enum"];
        assert_eq!(parts, &json!(["CYLINDER", "DOME", "TUBE", "AIRLOCK"]));
        assert_eq!(schema["properties"]["habitatUpdate"]["nullable"], true);
        assert_eq!(schema["required"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_story_request_asks_for_json() {
        let body = story_request("hello");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_image_request_has_fixed_parameters() {
        let body = image_request("a dome at dusk ");
        assert_eq!(
            body["instances"][0]["prompt"],
            format!("a dome at dusk{}", IMAGE_STYLE_SUFFIX)
        );
        assert_eq!(body["parameters"]["sampleCount"], 1);
        assert_eq!(body["parameters"]["aspectRatio"], "16:9");
        assert_eq!(body["parameters"]["outputMimeType"], "image/jpeg");
    }
}
