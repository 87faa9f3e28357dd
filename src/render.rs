use crate::config::RenderConfig;
use crate::ir::{FlowchartGraph, Node, NodeKind, Orientation, Position};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Renders a positioned graph. Nodes without a position are left out, and
/// so is every edge touching one of them or a missing node.
pub fn render_svg(
    graph: &FlowchartGraph,
    orientation: Orientation,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let (width, height) = canvas_size(graph, config);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<defs><marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"10\" refX=\"9\" refY=\"3\" orient=\"auto\"><polygon points=\"0 0, 10 3, 0 6\" fill=\"{}\"/></marker></defs>",
        theme.line_color
    ));

    for edge in graph.edges.iter().filter(|edge| edge.is_traversable()) {
        let Some(from) = positioned(graph, &edge.from) else {
            continue;
        };
        let Some(to) = positioned(graph, &edge.to) else {
            continue;
        };
        let (x1, y1, x2, y2) = edge_anchors(from, to, orientation, config);
        svg.push_str(&format!(
            "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{}\" stroke-width=\"2\" marker-end=\"url(#arrowhead)\"/>",
            theme.line_color
        ));
        if let Some(label) = edge.label.as_deref().filter(|label| !label.is_empty()) {
            let mid_x = (x1 + x2) / 2.0;
            let mid_y = (y1 + y2) / 2.0;
            svg.push_str(&format!(
                "<text x=\"{mid_x:.2}\" y=\"{mid_y:.2}\" fill=\"{}\" font-family=\"{}\" font-size=\"{}\">{}</text>",
                theme.edge_label_color,
                theme.font_family,
                theme.label_font_size,
                escape_xml(label)
            ));
        }
    }

    for node in &graph.nodes {
        let Some(position) = node.position else {
            continue;
        };
        svg.push_str(&node_shape_svg(node.kind, position, theme, config));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            position.x,
            position.y + 5.0,
            theme.font_family,
            theme.font_size,
            theme.text_color,
            escape_xml(&truncate_label(&node.text, config.max_label_chars))
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn positioned<'a>(graph: &'a FlowchartGraph, id: &str) -> Option<(&'a Node, Position)> {
    let node = graph.node(id)?;
    Some((node, node.position?))
}

fn half_extents(kind: NodeKind, config: &RenderConfig) -> (f32, f32) {
    match kind {
        NodeKind::Decision => (config.decision_half_width, config.decision_half_height),
        _ => (config.node_width / 2.0, config.node_height / 2.0),
    }
}

/// Edges leave the trailing side of the source box and enter the leading
/// side of the target box, relative to the direction levels advance in.
fn edge_anchors(
    (from_node, from): (&Node, Position),
    (to_node, to): (&Node, Position),
    orientation: Orientation,
    config: &RenderConfig,
) -> (f32, f32, f32, f32) {
    let (from_hw, from_hh) = half_extents(from_node.kind, config);
    let (to_hw, to_hh) = half_extents(to_node.kind, config);
    match orientation {
        Orientation::Horizontal => (from.x + from_hw, from.y, to.x - to_hw, to.y),
        Orientation::Vertical => (from.x, from.y + from_hh, to.x, to.y - to_hh),
    }
}

fn node_shape_svg(kind: NodeKind, at: Position, theme: &Theme, config: &RenderConfig) -> String {
    let Position { x, y } = at;
    match kind {
        NodeKind::Decision => {
            let hw = config.decision_half_width;
            let hh = config.decision_half_height;
            format!(
                "<polygon points=\"{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
                x,
                y - hh,
                x + hw,
                y,
                x,
                y + hh,
                x - hw,
                y,
                theme.node_fill,
                theme.node_stroke
            )
        }
        _ => format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            x - config.node_width / 2.0,
            y - config.node_height / 2.0,
            config.node_width,
            config.node_height,
            config.node_radius,
            theme.node_fill,
            theme.node_stroke
        ),
    }
}

fn canvas_size(graph: &FlowchartGraph, config: &RenderConfig) -> (f32, f32) {
    let mut width = config.min_width;
    let mut height = config.min_height;
    for node in &graph.nodes {
        let Some(position) = node.position else {
            continue;
        };
        let (hw, hh) = half_extents(node.kind, config);
        width = width.max(position.x + hw + config.padding);
        height = height.max(position.y + hh + config.padding);
    }
    (width.ceil(), height.ceil())
}

fn truncate_label(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Writes rendered output (SVG or JSON) to `output`, or stdout if `None`.
pub fn write_output(contents: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
        }
        None => {
            print!("{}", contents);
        }
    }
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
