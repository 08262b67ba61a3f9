//! Shaping raw model output into a structured, validated post.

use tracing::{debug, instrument};

use inkpress_shared::{
    BlogPost, InkpressError, META_DESCRIPTION_PREFIX, PostInput, RawCompletion, Result,
};

/// Maximum slug length in characters.
const MAX_SLUG_LEN: usize = 50;

/// Maximum meta description length in characters.
const MAX_META_LEN: usize = 160;

/// Assemble a [`BlogPost`] from raw completion text.
///
/// Fails with an assembly error when the completion is empty, no usable title
/// can be derived, or the body is nothing but prompt artifacts. A post is
/// fully formed or not at all — no partial output reaches a sink.
#[instrument(skip_all, fields(title = %input.title()))]
pub fn assemble(raw: &RawCompletion, input: &PostInput) -> Result<BlogPost> {
    let text = raw.text.trim();
    if text.is_empty() {
        return Err(InkpressError::assembly("completion text is empty"));
    }

    let (meta_description, content) = extract_meta_description(text);
    let (title, body) = extract_title(content, input)?;

    let body = body.trim().to_string();
    if body.is_empty() {
        return Err(InkpressError::assembly("completion has no body text"));
    }
    if body.contains(META_DESCRIPTION_PREFIX) {
        return Err(InkpressError::assembly(
            "completion contains unresolved prompt artifacts",
        ));
    }

    let slug = derive_slug(&title);
    if slug.is_empty() {
        return Err(InkpressError::assembly(format!(
            "cannot derive a slug from title {title:?}"
        )));
    }

    let meta_description =
        meta_description.unwrap_or_else(|| fallback_meta_description(&body));

    debug!(slug = %slug, body_len = body.len(), "post assembled");

    Ok(BlogPost {
        title,
        body,
        slug,
        meta_description,
        source: input.row().cloned(),
    })
}

/// Derive a URL-safe slug from a title.
///
/// Idempotent: slugging an already-slugged title yields the same slug, and
/// titles differing only in case or punctuation collapse to one slug.
pub fn derive_slug(title: &str) -> String {
    let full = slug::slugify(title);
    if full.len() <= MAX_SLUG_LEN {
        return full;
    }
    // Cut at a hyphen boundary where possible
    let cut = &full[..MAX_SLUG_LEN];
    cut.trim_end_matches('-').to_string()
}

/// Split a leading `META_DESCRIPTION:` line off the completion, if present.
fn extract_meta_description(text: &str) -> (Option<String>, &str) {
    let Some(rest) = text.strip_prefix(META_DESCRIPTION_PREFIX) else {
        return (None, text);
    };

    match rest.split_once('\n') {
        Some((meta, content)) => (Some(meta.trim().to_string()), content),
        // The whole completion was a single meta line; leave the body empty
        // so validation rejects it.
        None => (Some(rest.trim().to_string()), ""),
    }
}

/// Extract the title from the first `# ` heading, falling back to the topic
/// title. Returns the title and the body with the heading line removed.
fn extract_title<'a>(content: &'a str, input: &PostInput) -> Result<(String, &'a str)> {
    let trimmed = content.trim_start();

    if let Some(rest) = trimmed.strip_prefix("# ") {
        let (heading, body) = rest.split_once('\n').unwrap_or((rest, ""));
        let heading = heading.trim();
        if !heading.is_empty() {
            return Ok((heading.to_string(), body));
        }
    }

    let fallback = input.title().trim();
    if fallback.is_empty() {
        return Err(InkpressError::assembly(
            "completion has no title heading and the topic title is empty",
        ));
    }
    Ok((fallback.to_string(), content))
}

/// Build a meta description from the first non-heading paragraph, capped at
/// 160 characters.
fn fallback_meta_description(body: &str) -> String {
    let first_paragraph = body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or_default();

    if first_paragraph.chars().count() <= MAX_META_LEN {
        return first_paragraph.to_string();
    }
    let cut: String = first_paragraph.chars().take(MAX_META_LEN - 3).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_shared::TopicRow;

    fn completion(text: &str) -> RawCompletion {
        RawCompletion {
            text: text.into(),
            model: "test-model".into(),
            tokens_in: None,
            tokens_out: None,
        }
    }

    fn row_input() -> PostInput {
        PostInput::FromRow(TopicRow {
            index: 1,
            primary_keywords: vec!["AI".into()],
            auxiliary_keywords: vec!["2025".into()],
            title: "AI Trends".into(),
        })
    }

    #[test]
    fn assembles_titled_completion() {
        let raw = completion("# AI Trends\n\nBody text.");
        let post = assemble(&raw, &row_input()).expect("assemble");
        assert_eq!(post.title, "AI Trends");
        assert_eq!(post.slug, "ai-trends");
        assert_eq!(post.body, "Body text.");
        assert_eq!(post.source.as_ref().map(|r| r.index), Some(1));
    }

    #[test]
    fn strips_meta_description_line() {
        let raw = completion(
            "META_DESCRIPTION: Learn the AI trends shaping 2025.\n\n# AI Trends\n\nBody text.",
        );
        let post = assemble(&raw, &row_input()).expect("assemble");
        assert_eq!(post.meta_description, "Learn the AI trends shaping 2025.");
        assert_eq!(post.title, "AI Trends");
        assert_eq!(post.body, "Body text.");
        assert!(!post.body.contains("META_DESCRIPTION"));
    }

    #[test]
    fn falls_back_to_topic_title() {
        let raw = completion("An article body without any heading at all.");
        let post = assemble(&raw, &row_input()).expect("assemble");
        assert_eq!(post.title, "AI Trends");
        assert_eq!(post.body, "An article body without any heading at all.");
    }

    #[test]
    fn fallback_meta_from_first_paragraph() {
        let raw = completion("# AI Trends\n\nShort intro paragraph.\n\nMore text.");
        let post = assemble(&raw, &row_input()).expect("assemble");
        assert_eq!(post.meta_description, "Short intro paragraph.");
    }

    #[test]
    fn fallback_meta_is_capped() {
        let long = "word ".repeat(60);
        let raw = completion(&format!("# AI Trends\n\n{long}"));
        let post = assemble(&raw, &row_input()).expect("assemble");
        assert!(post.meta_description.chars().count() <= 160);
        assert!(post.meta_description.ends_with("..."));
    }

    #[test]
    fn empty_completion_fails() {
        let err = assemble(&completion("   \n  "), &row_input()).unwrap_err();
        assert!(matches!(err, InkpressError::Assembly { .. }));
    }

    #[test]
    fn meta_only_completion_fails() {
        let err = assemble(
            &completion("META_DESCRIPTION: A description with no post."),
            &row_input(),
        )
        .unwrap_err();
        assert!(matches!(err, InkpressError::Assembly { .. }));
    }

    #[test]
    fn unresolved_artifact_in_body_fails() {
        let raw = completion("# Title\n\nMETA_DESCRIPTION: [your description here]\n\nBody.");
        let err = assemble(&raw, &row_input()).unwrap_err();
        assert!(err.to_string().contains("prompt artifacts"));
    }

    #[test]
    fn missing_title_everywhere_fails() {
        let raw = completion("Body without heading.");
        let err = assemble(&raw, &PostInput::FromTitle("   ".into())).unwrap_err();
        assert!(matches!(err, InkpressError::Assembly { .. }));
    }

    #[test]
    fn slug_is_idempotent_and_case_insensitive() {
        assert_eq!(derive_slug("AI Trends 2025"), "ai-trends-2025");
        assert_eq!(derive_slug("ai-trends-2025"), "ai-trends-2025");
        assert_eq!(derive_slug("AI Trends, 2025!"), "ai-trends-2025");
        assert_eq!(derive_slug(&derive_slug("Écrire en Rust")), derive_slug("Écrire en Rust"));
    }

    #[test]
    fn slug_is_capped_at_hyphen_boundary() {
        let long = "a very long title that keeps going well past the slug length limit";
        let s = derive_slug(long);
        assert!(s.len() <= 50);
        assert!(!s.ends_with('-'));
    }

    #[test]
    fn punctuation_only_title_fails() {
        let raw = completion("# !!!\n\nBody.");
        // Heading is non-empty but slugs to nothing; fallback is not consulted
        let err = assemble(&raw, &PostInput::FromTitle("...".into())).unwrap_err();
        assert!(matches!(err, InkpressError::Assembly { .. }));
    }
}
