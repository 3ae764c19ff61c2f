//! Configuration module for Neko Judge.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each provider
//! call, `AppPaths` for cross-platform data directories, and TOML persistence
//! via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, ImageConfig, JudgeConfig, ProviderKind, TranscriptionConfig, UiConfig,
};
