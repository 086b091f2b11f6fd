//! # Daylapse Library
//!
//! Internal library for the `daylapse` binary.
//!
//! This library exists to enable testing of the run pipeline and to keep the
//! CLI dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: [`Daylapse`] runs one window over every configured camera
//! - **Window**: `geo` computes dawn and dusk for the configured coordinates
//! - **Frames**: `frames` turns the window into partition keys, locates
//!   candidate files and filters them
//! - **Output**: `playlist` writes the concat manifest, `encoder` runs the
//!   external video encoder
//! - **Configuration**: `config` for TOML settings with environment overrides
//! - **Infrastructure**: logging, run lock, clock and error types

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod daylapse;
pub mod encoder;
pub mod error;
pub mod frames;
pub mod geo;
pub mod io;
pub mod playlist;
pub mod time_source;

pub use daylapse::{CameraOutcome, Daylapse, RunSummary, SkipReason};
