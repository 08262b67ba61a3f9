//! Prompt construction and the OpenRouter generation client.
//!
//! [`build_prompt`] is pure and deterministic; [`GenerationClient`] performs
//! exactly one chat-completions call per invocation with no retry layer.

mod client;
mod prompt;

pub use client::GenerationClient;
pub use prompt::build_prompt;
