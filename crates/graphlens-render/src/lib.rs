//! Renderer plugins for GraphLens

pub mod bird;
pub mod layout;
pub mod svg;
pub mod tree;


use std::sync::Arc;

use graphlens_core::Capabilities;

pub use bird::{BirdRenderer, BIRD_EMPTY_MARKUP, OVERVIEW_HEIGHT, OVERVIEW_WIDTH};
pub use layout::Layout;
pub use svg::{BlockRenderer, SimpleRenderer};
pub use tree::TreeRenderer;

/// Markup returned for a graph with no nodes.
pub const EMPTY_MARKUP: &str = r#"<div class="viz-empty">No data</div>"#;

/// Register `simple`, `block`, `tree` and the `bird` / `bird-block` overviews.
pub fn register_renderers(caps: &mut Capabilities) -> anyhow::Result<()> {
    caps.renderers.register("simple", Arc::new(SimpleRenderer))?;
    caps.renderers.register("block", Arc::new(BlockRenderer))?;
    caps.renderers.register("tree", Arc::new(TreeRenderer))?;
    caps.renderers.register("bird", Arc::new(BirdRenderer::dots()))?;
    caps.renderers.register("bird-block", Arc::new(BirdRenderer::blocks()))?;
    Ok(())
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
