// src/config/mod.rs

//! Configuration loading and validation for dlbot.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the validated `AppConfig` (`model.rs`).
//! - Load a config file from disk and merge CLI/env overrides (`loader.rs`).
//! - Validate basic invariants like token presence (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{AppConfig, BotSection, ConfigOverrides, EngineSection, ProgressSection, RawConfigFile};
pub use validate::validate_config;
