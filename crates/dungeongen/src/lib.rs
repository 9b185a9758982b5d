//! Procedural dungeon layouts.
//!
//! A layout is built in stages: rooms are placed by disc sampling, linked into
//! a connected graph, given role and content flags, and joined by corridors
//! routed around the rooms. [`generator::Generator`] runs the whole pipeline
//! and wraps the result in a serializable report.

pub mod config;
pub mod content;
pub mod generator;
pub mod guidelines;
pub mod layout;

pub use content::{ContentError, ContentSource, JsonFileSource, RoomContent, RoomContents};
pub use generator::{
    GenerateError, Generation, GenerationConfig, GenerationOptions, GenerationReport, Generator,
    generate_layout,
};
pub use guidelines::{Difficulty, Guidelines, LayoutType};
pub use layout::DungeonLayout;
