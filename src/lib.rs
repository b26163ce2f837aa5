//! Gridfall — a minimal real-time grid survival game for the terminal.
//!
//! Core modules:
//! - `entities`: pure data (player, enemies, screens, per-tick input)
//! - `engine`: spawn policy, pursuit AI, attack and damage resolution, and
//!   the screen state machine
//!
//! Rendering and terminal plumbing live in the binary (`main.rs`,
//! `display.rs`); the library stays free of I/O so the whole game core is
//! reachable from integration tests with a fake clock and a seeded RNG.

pub mod engine;
pub mod entities;
