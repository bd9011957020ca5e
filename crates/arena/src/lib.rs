//! Maze snake arena simulation library.

pub mod ai;
pub mod collision;
pub mod config;
pub mod entity;
pub mod game;
pub mod locomotion;
pub mod maze;
pub mod phase;
pub mod scheduler;
pub mod trail;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use game::{ArenaSnapshot, GameState, Notification, SetupError, TickReport};
pub use maze::Maze;
pub use phase::ArenaPhase;
