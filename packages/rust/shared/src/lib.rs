//! Shared types, error model, and configuration for Inkpress.
//!
//! This crate is the foundation depended on by all other Inkpress crates.
//! It provides:
//! - [`InkpressError`] — the unified error type
//! - Domain types ([`TopicRow`], [`PostInput`], [`BlogPost`], [`PostStatus`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OpenRouterConfig, SheetsConfig, WordPressConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_env_secret,
    validate_api_key,
};
pub use error::{GenerationError, InkpressError, PublishError, Result};
pub use types::{
    BlogPost, META_DESCRIPTION_PREFIX, PostInput, PostStatus, PromptSpec, RawCompletion, TopicRow,
};
