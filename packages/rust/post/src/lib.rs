//! Post assembly, markdown file output, and HTML rendering.
//!
//! [`assemble`] is the one place in the pipeline with real decision logic:
//! title fallback, meta-description extraction, slug derivation, and
//! validation that the model output is usable. The file sink and the
//! markdown→HTML rendering for publishing live alongside it so both sinks
//! consume the same [`BlogPost`](inkpress_shared::BlogPost) shape.

mod assemble;
mod html;
mod writer;

pub use assemble::{assemble, derive_slug};
pub use html::render_html;
pub use writer::write_markdown;
