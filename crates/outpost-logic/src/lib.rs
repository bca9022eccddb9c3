//! Pure game logic for Outpost.
//!
//! Everything here is independent of the engine and the network: functions
//! take plain data and return results, so the whole turn loop can be driven
//! and tested headless.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`game`] | Turn state machine, story log, inventory |
//! | [`geometry`] | Triangle meshes per part type, part transforms |
//! | [`habitat`] | Append-only habitat model and part types |
//! | [`journal`] | JSON session snapshots for save and review |
//! | [`payload`] | Fail-closed parsing of structured scene payloads |
//! | [`stl`] | Binary STL encoding of the habitat |
//! | [`story`] | `StoryBackend` trait, `Scene`, `ServiceError` |

pub mod game;
pub mod geometry;
pub mod habitat;
pub mod journal;
pub mod payload;
pub mod stl;
pub mod story;
