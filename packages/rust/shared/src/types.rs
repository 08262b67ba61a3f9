//! Core domain types for the Inkpress pipeline.
//!
//! Lifecycle: [`TopicRow`] → [`PromptSpec`] → [`RawCompletion`] → [`BlogPost`]
//! → sinks. Each stage's output is immutable input to the next.

use serde::{Deserialize, Serialize};

/// Line prefix the model is instructed to open its response with; the
/// assembler strips it back out. Shared contract between prompt construction
/// and assembly.
pub const META_DESCRIPTION_PREFIX: &str = "META_DESCRIPTION:";

// ---------------------------------------------------------------------------
// TopicRow
// ---------------------------------------------------------------------------

/// One topic row read from the spreadsheet. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRow {
    /// 1-based row index within the sheet's data range.
    pub index: u32,
    /// Primary SEO keywords the generated body must focus on.
    pub primary_keywords: Vec<String>,
    /// Auxiliary keywords to weave in.
    pub auxiliary_keywords: Vec<String>,
    /// Working title for the post.
    pub title: String,
}

// ---------------------------------------------------------------------------
// PostInput
// ---------------------------------------------------------------------------

/// Input to the pipeline: either a spreadsheet row or a free-form title.
///
/// Both paths feed the same prompt builder; there is no duplicated
/// custom-topic logic downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostInput {
    /// Seeded from a spreadsheet row.
    FromRow(TopicRow),
    /// Seeded from a user-supplied title.
    FromTitle(String),
}

impl PostInput {
    /// The working title for this input.
    pub fn title(&self) -> &str {
        match self {
            Self::FromRow(row) => &row.title,
            Self::FromTitle(title) => title,
        }
    }

    /// The originating row, when the input came from the sheet.
    pub fn row(&self) -> Option<&TopicRow> {
        match self {
            Self::FromRow(row) => Some(row),
            Self::FromTitle(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PromptSpec
// ---------------------------------------------------------------------------

/// A fully built generation prompt. Derived deterministically from a
/// [`PostInput`] plus an injected model identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    /// System instructions for the model.
    pub system: String,
    /// The user prompt containing topic and keyword requirements.
    pub user: String,
    /// Model identifier, e.g. `openai/gpt-4o-mini`.
    pub model: String,
}

// ---------------------------------------------------------------------------
// RawCompletion
// ---------------------------------------------------------------------------

/// Raw model output, produced once per generation call and discarded after
/// assembly.
#[derive(Debug, Clone)]
pub struct RawCompletion {
    /// The generated text, trimmed.
    pub text: String,
    /// Model that produced it (as reported by the endpoint).
    pub model: String,
    /// Prompt tokens consumed, when reported.
    pub tokens_in: Option<u64>,
    /// Completion tokens produced, when reported.
    pub tokens_out: Option<u64>,
}

// ---------------------------------------------------------------------------
// BlogPost
// ---------------------------------------------------------------------------

/// A fully formed post, ready for both sinks.
///
/// Invariant: title, body, and slug are non-empty — assembly fails rather
/// than producing a partial post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    /// Display title.
    pub title: String,
    /// Markdown body (without the title heading or meta-description line).
    pub body: String,
    /// URL-safe slug derived from the title.
    pub slug: String,
    /// SEO meta description (≤160 chars).
    pub meta_description: String,
    /// Originating topic row, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<TopicRow>,
}

// ---------------------------------------------------------------------------
// PostStatus
// ---------------------------------------------------------------------------

/// Publication status sent to the CMS.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Saved on the remote side but not visible.
    #[default]
    Draft,
    /// Publicly visible immediately.
    Publish,
    /// Visible to logged-in editors only.
    Private,
}

impl PostStatus {
    /// The wire value WordPress expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
            Self::Private => "private",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
