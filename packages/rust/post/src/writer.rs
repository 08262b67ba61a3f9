//! Markdown file sink.
//!
//! One file per post, named by slug, with YAML front matter followed by the
//! title heading and the body verbatim.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, instrument};

use inkpress_shared::{BlogPost, InkpressError, Result};

/// Write the post as `{slug}.md` inside `dir`, creating the directory if
/// absent. An existing file with the same slug is overwritten.
#[instrument(skip_all, fields(slug = %post.slug))]
pub fn write_markdown(post: &BlogPost, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| InkpressError::io(dir, e))?;

    let path = dir.join(format!("{}.md", post.slug));
    let content = render_markdown(post);

    std::fs::write(&path, &content).map_err(|e| InkpressError::io(&path, e))?;

    info!(path = %path.display(), bytes = content.len(), "markdown written");
    Ok(path)
}

/// Deterministic markdown rendering: front matter, `# title`, body.
fn render_markdown(post: &BlogPost) -> String {
    let mut front = String::from("---\n");
    front.push_str(&format!("title: \"{}\"\n", escape_yaml(&post.title)));
    front.push_str(&format!(
        "meta_description: \"{}\"\n",
        escape_yaml(&post.meta_description)
    ));
    front.push_str(&format!("date: {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S")));
    if let Some(row) = &post.source {
        front.push_str(&format!(
            "primary_keywords: \"{}\"\n",
            escape_yaml(&row.primary_keywords.join(", "))
        ));
        front.push_str(&format!(
            "auxiliary_keywords: \"{}\"\n",
            escape_yaml(&row.auxiliary_keywords.join(", "))
        ));
        front.push_str(&format!("source_row: {}\n", row.index));
    }
    front.push_str(&format!(
        "generated_by: \"Inkpress v{}\"\n",
        env!("CARGO_PKG_VERSION")
    ));
    front.push_str("---\n");

    format!("{front}\n# {}\n\n{}\n", post.title, post.body)
}

/// Escape double quotes and backslashes for a quoted YAML scalar.
fn escape_yaml(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
