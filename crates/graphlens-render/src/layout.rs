//! Deterministic node placement

use std::f64::consts::PI;

use graphlens_core::{Graph, RenderContext};
use indexmap::IndexMap;

/// Space kept free between the placement circle and the canvas edge.
pub const MARGIN: f64 = 40.0;

/// Node positions in canvas coordinates, in graph node order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    positions: IndexMap<String, (f64, f64)>,
}

impl Layout {
    /// Place nodes evenly on a circle centred in the canvas, starting at
    /// twelve o'clock, then apply any overrides from `ctx.positions`.
    pub fn circular(graph: &Graph, width: u32, height: u32, ctx: &RenderContext) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let (cx, cy) = (w / 2.0, h / 2.0);
        let radius = (w.min(h) / 2.0 - MARGIN).max(0.0);
        let n = graph.node_count();

        let positions = graph
            .nodes()
            .enumerate()
            .map(|(i, node)| {
                let placed = if n == 1 {
                    (cx, cy)
                } else {
                    let angle = 2.0 * PI * i as f64 / n as f64 - PI / 2.0;
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                };
                let pos = ctx.position(&node.id).unwrap_or(placed);
                (node.id.clone(), pos)
            })
            .collect();
        Layout { positions }
    }

    pub fn get(&self, id: &str) -> Option<(f64, f64)> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// `viewBox` attribute value: the context viewport, or the whole canvas.
pub fn view_box(width: u32, height: u32, ctx: &RenderContext) -> String {
    match ctx.viewport {
        Some(v) => format!("{:.2} {:.2} {:.2} {:.2}", v.x, v.y, v.width, v.height),
        None => format!("0 0 {width} {height}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphlens_core::{Node, Viewport};

    fn graph(n: usize) -> Graph {
        let nodes = (0..n).map(|i| Node::new(format!("n{i}"), format!("N{i}")));
        Graph::from_parts(false, nodes, vec![]).unwrap()
    }

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_single_node_is_centred() {
        let layout = Layout::circular(&graph(1), 200, 100, &RenderContext::default());
        assert!(close(layout.get("n0").unwrap(), (100.0, 50.0)));
    }

    #[test]
    fn test_circle_starts_at_top() {
        let layout = Layout::circular(&graph(4), 200, 200, &RenderContext::default());
        // radius = 100 - MARGIN
        assert!(close(layout.get("n0").unwrap(), (100.0, 40.0)));
        assert!(close(layout.get("n1").unwrap(), (160.0, 100.0)));
        assert!(close(layout.get("n2").unwrap(), (100.0, 160.0)));
        assert_eq!(layout.len(), 4);
    }

    #[test]
    fn test_positions_override_placement() {
        let mut ctx = RenderContext::default();
        ctx.positions.insert("n1".to_string(), [5.0, 7.0]);
        let layout = Layout::circular(&graph(3), 300, 300, &ctx);
        assert_eq!(layout.get("n1"), Some((5.0, 7.0)));
        assert_ne!(layout.get("n0"), Some((5.0, 7.0)));
    }

    #[test]
    fn test_view_box() {
        let mut ctx = RenderContext::default();
        assert_eq!(view_box(900, 600, &ctx), "0 0 900 600");
        ctx.viewport = Some(Viewport { x: 10.0, y: 20.0, width: 300.0, height: 150.5 });
        assert_eq!(view_box(900, 600, &ctx), "10.00 20.00 300.00 150.50");
    }
}
