//! Neighbour tree: a nested HTML list with one entry per node

use std::fmt::Write;

use anyhow::Result;
use graphlens_core::{Graph, RenderContext, Renderer};

use crate::{escape, EMPTY_MARKUP};

/// Lists every node with its neighbours (both directions) nested beneath it.
///
/// Ignores width, height and placement hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeRenderer;

impl Renderer for TreeRenderer {
    fn render(&self, graph: &Graph, _width: u32, _height: u32, _ctx: &RenderContext) -> Result<String> {
        if graph.is_empty() {
            return Ok(EMPTY_MARKUP.to_string());
        }
        let mut out = String::from(r#"<ul class="component-tree tree-root">"#);
        for node in graph.nodes() {
            let neighbors = graph.neighbors(&node.id);
            write!(
                out,
                r#"<li data-node-id="{}" class="parent"><span class="tree-label" title="{}">{}</span>"#,
                escape(&node.id),
                escape(&tooltip(node)),
                escape(&node.name)
            )?;
            if !neighbors.is_empty() {
                out.push_str(r#"<ul class="nested">"#);
                for neighbor in neighbors {
                    write!(
                        out,
                        r#"<li data-node-id="{}"><span class="tree-label">{}</span></li>"#,
                        escape(&neighbor.id),
                        escape(&neighbor.name)
                    )?;
                }
                out.push_str("</ul>");
            }
            out.push_str("</li>");
        }
        out.push_str("</ul>");
        Ok(out)
    }
}

fn tooltip(node: &graphlens_core::Node) -> String {
    if node.attributes.is_empty() {
        return "(no attributes)".to_string();
    }
    node.attributes
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
