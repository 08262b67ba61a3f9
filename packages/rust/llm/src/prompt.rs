//! Deterministic prompt construction for blog generation.
//!
//! Pure functions only — no network or disk access. The same input always
//! yields the same [`PromptSpec`] for a given model id.

use inkpress_shared::{META_DESCRIPTION_PREFIX, PostInput, PromptSpec};

/// Fixed system instructions for every generation call.
const SYSTEM_INSTRUCTIONS: &str = "You are an experienced blog writer producing \
SEO-friendly long-form articles in markdown. Follow the formatting requirements \
in the user prompt exactly.";

/// Build the generation prompt for a topic row or a free-form title.
///
/// Primary and auxiliary keywords are embedded in the instructions so the
/// generated body stays keyword-relevant; a custom title doubles as its own
/// primary keyword.
pub fn build_prompt(input: &PostInput, model: &str) -> PromptSpec {
    let title = input.title();

    let (primary, auxiliary) = match input.row() {
        Some(row) => (
            row.primary_keywords.join(", "),
            row.auxiliary_keywords.join(", "),
        ),
        None => (title.to_string(), String::new()),
    };

    let user = format!(
        "Write an engaging, comprehensive blog post about \"{title}\".\n\
         \n\
         Primary keywords to focus on: {primary}\n\
         Auxiliary keywords to include: {auxiliary}\n\
         \n\
         Requirements:\n\
         - FIRST: write a compelling meta description (150-160 characters) that \
         includes the primary keywords\n\
         - Format the meta description as: {META_DESCRIPTION_PREFIX} [your description here]\n\
         - Then write the blog post in markdown format\n\
         - Include a compelling title with a # header\n\
         - Add an engaging introduction\n\
         - Create 3-5 main sections with ## headers\n\
         - Include practical tips, examples, or insights\n\
         - Add a strong conclusion\n\
         - Use bullet points and numbered lists where appropriate\n\
         - Make it SEO-friendly but natural and engaging\n\
         - Aim for 800-1200 words\n\
         \n\
         IMPORTANT: start your response with the meta description line, then a \
         blank line, then the blog post."
    );

    PromptSpec {
        system: SYSTEM_INSTRUCTIONS.to_string(),
        user,
        model: model.to_string(),
    }
}
