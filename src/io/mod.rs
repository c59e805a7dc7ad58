//! Configuration loading and patch name tokens

pub mod config;
pub mod patch_name;

pub use config::{FexConfig, load_config};
pub use patch_name::{PatchName, find_patch_pairs, time_difference_seconds};
