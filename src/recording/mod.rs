//! Recording files on disk.
//!
//! This module provides functionality to:
//! - Load and save `.json` pulse recordings
//! - Resolve a recording given by bare name against the recordings directory
//!
//! ## File Format
//!
//! ```text
//! {
//!   "gpio_in": 4,                         input pin used at capture (optional)
//!   "pulse_us": [9000, 4500, 560, ...]    mark, space, mark, ... in µs
//! }
//! ```

pub mod file_format;
pub mod manager;

pub use file_format::{load_recording, save_recording};
pub use manager::{resolve_recording_path, RECORDING_EXTENSION};
