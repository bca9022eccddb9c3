//! Story and scene-image backend client for Outpost.
//!
//! [`StoryClient`] implements [`outpost_logic::story::StoryBackend`] over a
//! Gemini-style REST API: structured JSON output for the narrative and a
//! separate image-generation call for the illustration.
//!
//! ```no_run
//! use outpost_logic::story::StoryBackend;
//! use outpost_story::{StoryClient, StoryConfig};
//!
//! let client = StoryClient::new(StoryConfig::from_env()?)?;
//! let opening = client.fetch_next_scene("", "")?;
//! println!("{}", opening.payload.story);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod prompt;
pub mod transport;

pub use client::StoryClient;
pub use config::{ConfigError, StoryConfig};
pub use transport::{HttpTransport, Transport};
