//! Markdown→HTML rendering for the publish payload.
//!
//! WordPress receives rendered HTML, not markdown, matching what its editor
//! would store.

use comrak::{Options, markdown_to_html};

/// Render a markdown body to HTML.
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    markdown_to_html(markdown, &options).trim().to_string()
}
