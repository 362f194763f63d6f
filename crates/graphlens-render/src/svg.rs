//! SVG renderers: circle nodes (`simple`) and attribute blocks (`block`)

use std::fmt::Write;

use anyhow::Result;
use graphlens_core::{Graph, Node, RenderContext, Renderer};

use crate::layout::{view_box, Layout};
use crate::{escape, EMPTY_MARKUP};

const NODE_RADIUS: f64 = 16.0;
const ARROW_PAD: f64 = 6.0;
const BLOCK_WIDTH: f64 = 120.0;
const LINE_HEIGHT: f64 = 16.0;

const DEFS: &str = r##"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M0,0 L10,5 L0,10 Z" fill="#888"></path></marker><style>.edges line { stroke:#888; stroke-width:1.2; } .edges line.directed { marker-end:url(#arrow); } .nodes text { font-size:11px; font-family: ui-sans-serif, system-ui, sans-serif; pointer-events:none; } .nodes circle, .nodes .block-rect { fill:#e6f0ff; stroke:#333; } .nodes .node-title { font-weight:bold; }</style></defs>"##;

/// Circle per node, line per edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

/// Rectangle per node listing its attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRenderer;

impl Renderer for SimpleRenderer {
    fn render(&self, graph: &Graph, width: u32, height: u32, ctx: &RenderContext) -> Result<String> {
        render_svg(graph, width, height, ctx, NODE_RADIUS + ARROW_PAD, |out, node| {
            write!(
                out,
                r#"<circle r="{NODE_RADIUS}"></circle><text text-anchor="middle" dy="4">{}</text>"#,
                escape(&node.name)
            )?;
            Ok(())
        })
    }
}

impl Renderer for BlockRenderer {
    fn render(&self, graph: &Graph, width: u32, height: u32, ctx: &RenderContext) -> Result<String> {
        render_svg(graph, width, height, ctx, 0.0, |out, node| {
            let lines = node.attributes.len() + 1;
            let block_height = 20.0 + lines as f64 * LINE_HEIGHT;
            let top = -block_height / 2.0;
            write!(
                out,
                r#"<rect class="block-rect" width="{BLOCK_WIDTH}" height="{block_height:.2}" x="{:.2}" y="{top:.2}" rx="5" ry="5"></rect>"#,
                -BLOCK_WIDTH / 2.0
            )?;
            write!(
                out,
                r#"<text class="node-title" text-anchor="middle" y="{:.2}">{}</text>"#,
                top + LINE_HEIGHT,
                escape(&node.name)
            )?;
            out.push_str(r#"<text class="attributes" text-anchor="middle">"#);
            for (i, (key, value)) in node.attributes.iter().enumerate() {
                write!(
                    out,
                    r#"<tspan x="0" y="{:.2}">{}: {}</tspan>"#,
                    top + LINE_HEIGHT * (i as f64 + 2.0),
                    escape(key),
                    escape(&value.to_string())
                )?;
            }
            out.push_str("</text>");
            Ok(())
        })
    }
}

/// Shared SVG skeleton. `trim` shortens each edge at both ends so arrows stop
/// at the node outline; `node_body` writes the shape inside each node group.
fn render_svg(
    graph: &Graph,
    width: u32,
    height: u32,
    ctx: &RenderContext,
    trim: f64,
    node_body: impl Fn(&mut String, &Node) -> Result<()>,
) -> Result<String> {
    if graph.is_empty() {
        return Ok(EMPTY_MARKUP.to_string());
    }
    let layout = Layout::circular(graph, width, height, ctx);
    let mut out = String::new();

    write!(
        out,
        r#"<svg class="gv-svg" xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{}" role="img" aria-label="Graph">"#,
        view_box(width, height, ctx)
    )?;
    out.push_str(DEFS);
    out.push_str(r#"<g class="viewport"><g class="edges">"#);
    for edge in graph.edges() {
        let (Some(from), Some(to)) = (layout.get(&edge.source), layout.get(&edge.target)) else {
            continue;
        };
        let (x1, y1, x2, y2) = shorten(from, to, trim);
        let class = if graph.directed() || edge.directed { "directed" } else { "" };
        write!(
            out,
            r#"<line class="{class}" data-id="{}" data-from="{}" data-to="{}" data-type="{}" x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}"></line>"#,
            escape(&edge.id),
            escape(&edge.source),
            escape(&edge.target),
            escape(&edge.kind)
        )?;
    }
    out.push_str(r#"</g><g class="nodes">"#);
    for node in graph.nodes() {
        let Some((x, y)) = layout.get(&node.id) else {
            continue;
        };
        let attrs = serde_json::to_string(&node.attributes)?;
        write!(
            out,
            r#"<g class="node" data-id="{}" data-name="{}" data-attrs="{}" transform="translate({x:.2},{y:.2})">"#,
            escape(&node.id),
            escape(&node.name),
            escape(&attrs)
        )?;
        node_body(&mut out, node)?;
        out.push_str("</g>");
    }
    out.push_str("</g></g></svg>");

    tracing::debug!(
        "Rendered SVG with {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(out)
}

/// Pull both endpoints of a segment towards each other by `off`.
fn shorten(from: (f64, f64), to: (f64, f64), off: f64) -> (f64, f64, f64, f64) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= 2.0 * off || len == 0.0 {
        return (from.0, from.1, to.0, to.1);
    }
    let (ux, uy) = (dx / len, dy / len);
    (
        from.0 + ux * off,
        from.1 + uy * off,
        to.0 - ux * off,
        to.1 - uy * off,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten() {
        let (x1, y1, x2, y2) = shorten((0.0, 0.0), (100.0, 0.0), 10.0);
        assert_eq!((x1, y1, x2, y2), (10.0, 0.0, 90.0, 0.0));
        // too short to trim
        assert_eq!(shorten((0.0, 0.0), (5.0, 0.0), 10.0), (0.0, 0.0, 5.0, 0.0));
    }
}
