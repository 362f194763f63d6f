//! Bird's-eye overview: the whole graph scaled into a small canvas

use std::fmt::Write;

use anyhow::Result;
use graphlens_core::{AttrValue, Graph, Node, RenderContext, Renderer};

use crate::escape;
use crate::layout::Layout;

/// Markup returned for a graph with no nodes.
pub const BIRD_EMPTY_MARKUP: &str = r#"<div class="bird-empty">No data</div>"#;

/// Canvas size used when the overview sits next to the main view.
pub const OVERVIEW_WIDTH: u32 = 220;
pub const OVERVIEW_HEIGHT: u32 = 160;

const MARGIN: f64 = 10.0;
const DOT_RADIUS: f64 = 3.0;
const BLOCK_SIZE: f64 = 16.0;

const DOT_STYLE: &str = "<style>.bird-edges line { stroke:#aaa; stroke-width:0.8; } .bird-nodes circle { fill:#e6f0ff; stroke:#333; } .bird-viewport { fill:none; stroke:red; stroke-width:1; stroke-dasharray:3 2; }</style>";
const BLOCK_STYLE: &str = "<style>.bird-edges line { stroke:#888; stroke-width:1.2; } .bird-nodes .block-rect { fill:#e6f0ff; stroke:#333; } .bird-nodes text { font-size:8px; font-family: sans-serif; pointer-events:none; } .bird-viewport { fill:none; stroke:red; stroke-width:1; stroke-dasharray:3 2; }</style>";

/// Overview renderer, drawing nodes as dots or as small labelled blocks.
///
/// Each node is placed at its `context.positions` entry, else at its numeric
/// `x`/`y` attributes, else at its circular placement. The bounding box of
/// those points is scaled to fit the canvas, and `context.viewport` is drawn
/// as a rectangle in the same scaled space.
#[derive(Debug, Clone, Copy, Default)]
pub struct BirdRenderer {
    blocks: bool,
}

impl BirdRenderer {
    pub fn dots() -> Self {
        BirdRenderer { blocks: false }
    }

    pub fn blocks() -> Self {
        BirdRenderer { blocks: true }
    }
}

/// Maps graph coordinates into the overview canvas.
struct Scale {
    min: (f64, f64),
    factor: f64,
    offset: (f64, f64),
}

impl Scale {
    fn fit(points: &[(f64, f64)], width: f64, height: f64) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let span_x = if max_x > min_x { max_x - min_x } else { 1.0 };
        let span_y = if max_y > min_y { max_y - min_y } else { 1.0 };
        let factor = ((width - 2.0 * MARGIN) / span_x).min((height - 2.0 * MARGIN) / span_y);
        Scale {
            min: (min_x, min_y),
            factor,
            offset: ((width - span_x * factor) / 2.0, (height - span_y * factor) / 2.0),
        }
    }

    fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            (x - self.min.0) * self.factor + self.offset.0,
            (y - self.min.1) * self.factor + self.offset.1,
        )
    }
}

fn numeric(value: Option<&AttrValue>) -> Option<f64> {
    match value? {
        AttrValue::Int(v) => Some(*v as f64),
        AttrValue::Float(v) => Some(*v),
        AttrValue::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn source_point(node: &Node, ctx: &RenderContext, layout: &Layout) -> (f64, f64) {
    if let Some(pos) = ctx.position(&node.id) {
        return pos;
    }
    match (numeric(node.attr("x")), numeric(node.attr("y"))) {
        (Some(x), Some(y)) => (x, y),
        _ => layout.get(&node.id).unwrap_or_default(),
    }
}

impl Renderer for BirdRenderer {
    fn render(&self, graph: &Graph, width: u32, height: u32, ctx: &RenderContext) -> Result<String> {
        if graph.is_empty() {
            return Ok(BIRD_EMPTY_MARKUP.to_string());
        }
        let (w, h) = (f64::from(width), f64::from(height));
        let layout = Layout::circular(graph, width, height, ctx);
        let points: Vec<(f64, f64)> = graph
            .nodes()
            .map(|n| source_point(n, ctx, &layout))
            .collect();
        let scale = Scale::fit(&points, w, h);
        let placed: indexmap::IndexMap<&str, (f64, f64)> = graph
            .nodes()
            .zip(&points)
            .map(|(n, &p)| (n.id.as_str(), scale.apply(p)))
            .collect();

        let mut out = String::new();
        write!(
            out,
            r#"<svg class="bird-svg" xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;
        out.push_str(if self.blocks { BLOCK_STYLE } else { DOT_STYLE });

        out.push_str(r#"<g class="bird-edges">"#);
        for edge in graph.edges() {
            let (Some(&(x1, y1)), Some(&(x2, y2))) =
                (placed.get(edge.source.as_str()), placed.get(edge.target.as_str()))
            else {
                continue;
            };
            write!(out, r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}"></line>"#)?;
        }
        out.push_str(r#"</g><g class="bird-nodes">"#);
        for node in graph.nodes() {
            let Some(&(x, y)) = placed.get(node.id.as_str()) else {
                continue;
            };
            if self.blocks {
                write!(
                    out,
                    r#"<g class="block-node" data-id="{}" transform="translate({x:.1},{y:.1})"><rect class="block-rect" width="{BLOCK_SIZE}" height="{BLOCK_SIZE}" x="{half}" y="{half}"></rect><text text-anchor="middle" dy=".35em">{}</text></g>"#,
                    escape(&node.id),
                    escape(&node.name),
                    half = -BLOCK_SIZE / 2.0
                )?;
            } else {
                write!(
                    out,
                    r#"<circle cx="{x:.1}" cy="{y:.1}" r="{DOT_RADIUS}" data-id="{}"></circle>"#,
                    escape(&node.id)
                )?;
            }
        }
        out.push_str("</g>");

        if let Some(viewport) = ctx.viewport {
            let (vx, vy) = scale.apply((viewport.x, viewport.y));
            let (vw, vh) = (viewport.width * scale.factor, viewport.height * scale.factor);
            let vx = vx.min(w - MARGIN - vw).max(MARGIN);
            let vy = vy.min(h - MARGIN - vh).max(MARGIN);
            write!(
                out,
                r#"<rect class="bird-viewport" x="{vx:.1}" y="{vy:.1}" width="{vw:.1}" height="{vh:.1}"></rect>"#
            )?;
        }
        out.push_str("</svg>");

        tracing::debug!("Rendered overview of {} nodes", graph.node_count());
        Ok(out)
    }
}
