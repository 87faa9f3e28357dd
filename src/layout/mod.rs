//! Hierarchical auto-layout for flowchart graphs.
//!
//! Nodes are grouped into levels by a breadth-first walk from the graph's
//! roots, then placed on a grid: the level picks the coordinate along the
//! orientation axis and the node's discovery index within its level picks
//! the cross-axis coordinate.

mod adjacency;
mod error;
mod ranking;

pub use error::LayoutError;

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::config::{AxisSpacing, LayoutConfig};
use crate::ir::{FlowchartGraph, Node, Orientation, Position};
use adjacency::Adjacency;
use ranking::assign_levels;

/// Positions computed for a graph, parallel to `graph.nodes`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub orientation: Orientation,
    pub positions: Vec<Position>,
    /// Level of each node, `None` for nodes the traversal never reached
    /// and for every node of a fallback layout.
    pub levels: Vec<Option<usize>>,
    /// Set when the hierarchical pass failed and the sequential layout was
    /// used instead.
    pub fallback: Option<LayoutError>,
}

impl LayoutPlan {
    pub fn apply(&self, graph: &mut FlowchartGraph) {
        for (node, position) in graph.nodes.iter_mut().zip(&self.positions) {
            node.position = Some(*position);
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Lays out `graph` with the default spacing.
pub fn layout(graph: FlowchartGraph, orientation: Orientation) -> FlowchartGraph {
    layout_with_config(graph, orientation, &LayoutConfig::default())
}

/// Fills in a position for every node. Edges, ids and node order are left
/// untouched; an empty graph comes back as it went in.
pub fn layout_with_config(
    mut graph: FlowchartGraph,
    orientation: Orientation,
    config: &LayoutConfig,
) -> FlowchartGraph {
    if graph.nodes.is_empty() {
        return graph;
    }
    let plan = plan_layout(&graph, orientation, config);
    plan.apply(&mut graph);
    graph
}

/// Computes positions without touching the graph.
pub fn plan_layout(
    graph: &FlowchartGraph,
    orientation: Orientation,
    config: &LayoutConfig,
) -> LayoutPlan {
    match hierarchical_layout(graph, orientation, config) {
        Ok((positions, levels)) => LayoutPlan {
            orientation,
            positions,
            levels,
            fallback: None,
        },
        Err(err) => {
            warn!(error:% = err, orientation:?; "hierarchical layout failed, using sequential layout");
            let defaults = LayoutConfig::default();
            let spacing = if err.invalidates_spacing() {
                defaults.spacing(orientation)
            } else {
                config.spacing(orientation)
            };
            LayoutPlan {
                orientation,
                positions: sequential_positions(graph.nodes.len(), orientation, spacing),
                levels: vec![None; graph.nodes.len()],
                fallback: Some(err),
            }
        }
    }
}

fn hierarchical_layout(
    graph: &FlowchartGraph,
    orientation: Orientation,
    config: &LayoutConfig,
) -> Result<(Vec<Position>, Vec<Option<usize>>), LayoutError> {
    let spacing = config.spacing(orientation);
    if let Some(name) = spacing.first_non_finite() {
        return Err(LayoutError::InvalidSpacing(name));
    }
    if !config.disconnected.is_finite() {
        return Err(LayoutError::InvalidSpacing("disconnected"));
    }
    validate_ids(&graph.nodes)?;

    let adjacency = Adjacency::build(&graph.nodes, &graph.edges);
    let roots = adjacency.roots(&graph.nodes);
    debug!(
        nodes = graph.nodes.len(),
        edges = adjacency.traversed_edges(),
        roots = roots.len();
        "assigning levels"
    );
    let levels = assign_levels(&adjacency, roots);

    let mut placed: HashMap<&str, Position> = HashMap::with_capacity(levels.level_of.len());
    for (level, bucket) in levels.buckets.iter().enumerate() {
        for (index, id) in bucket.iter().enumerate() {
            let position = level_position(spacing, orientation, level, index, bucket.len());
            if !position.is_finite() {
                return Err(LayoutError::NonFiniteCoordinate((*id).to_string()));
            }
            placed.insert(*id, position);
        }
    }

    let disconnected = graph.nodes.len() - placed.len();
    if disconnected > 0 {
        debug!(disconnected; "parking unreached nodes");
    }

    let positions = graph
        .nodes
        .iter()
        .map(|node| {
            placed
                .get(node.id.as_str())
                .copied()
                .unwrap_or(config.disconnected)
        })
        .collect();
    let node_levels = graph
        .nodes
        .iter()
        .map(|node| levels.get(&node.id))
        .collect();
    Ok((positions, node_levels))
}

fn validate_ids(nodes: &[Node]) -> Result<(), LayoutError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        if node.id.is_empty() {
            return Err(LayoutError::EmptyNodeId { index });
        }
        if !seen.insert(node.id.as_str()) {
            return Err(LayoutError::DuplicateNodeId(node.id.clone()));
        }
    }
    Ok(())
}

/// Grid slot for the `index`-th of `count` nodes on `level`. A node alone on
/// its level is centred on the cross axis.
fn level_position(
    spacing: &AxisSpacing,
    orientation: Orientation,
    level: usize,
    index: usize,
    count: usize,
) -> Position {
    let main = spacing.level_offset + level as f32 * spacing.level_spacing;
    let cross = if count == 1 {
        spacing.center
    } else {
        spacing.cross_offset + index as f32 * spacing.cross_spacing
    };
    match orientation {
        Orientation::Horizontal => Position::new(main, cross),
        Orientation::Vertical => Position::new(cross, main),
    }
}

/// One node per level, in sequence order, ignoring edges.
fn sequential_positions(count: usize, orientation: Orientation, spacing: &AxisSpacing) -> Vec<Position> {
    (0..count)
        .map(|i| level_position(spacing, orientation, i, 0, 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Edge, NodeKind};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> FlowchartGraph {
        let mut graph = FlowchartGraph::new();
        for id in ids {
            graph.push_node(id, &format!("Step {id}"), NodeKind::Process);
        }
        for (from, to) in edges {
            graph.push_edge(from, to, None);
        }
        graph
    }

    fn pos(graph: &FlowchartGraph, id: &str) -> (f32, f32) {
        let position = graph
            .node(id)
            .and_then(|node| node.position)
            .expect("node positioned");
        (position.x, position.y)
    }

    #[test]
    fn empty_graph_is_unchanged() {
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let out = layout(FlowchartGraph::new(), orientation);
            assert_eq!(out, FlowchartGraph::new());
        }
    }

    #[test]
    fn horizontal_chain() {
        let g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
        let out = layout(g, Orientation::Horizontal);
        assert_eq!(pos(&out, "A"), (150.0, 250.0));
        assert_eq!(pos(&out, "B"), (450.0, 250.0));
        assert_eq!(pos(&out, "C"), (750.0, 250.0));
        assert_eq!(pos(&out, "D"), (1050.0, 250.0));
    }

    #[test]
    fn vertical_chain() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let out = layout(g, Orientation::Vertical);
        assert_eq!(pos(&out, "A"), (400.0, 100.0));
        assert_eq!(pos(&out, "B"), (400.0, 250.0));
        assert_eq!(pos(&out, "C"), (400.0, 400.0));
    }

    #[test]
    fn branching_fan_out() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("A", "C")]);
        let out = layout(g.clone(), Orientation::Horizontal);
        assert_eq!(pos(&out, "A"), (150.0, 250.0));
        assert_eq!(pos(&out, "B"), (450.0, 150.0));
        assert_eq!(pos(&out, "C"), (450.0, 350.0));

        let out = layout(g, Orientation::Vertical);
        assert_eq!(pos(&out, "B"), (200.0, 250.0));
        assert_eq!(pos(&out, "C"), (450.0, 250.0));
    }

    #[test]
    fn two_node_cycle_roots_at_first_node() {
        let g = graph(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let plan = plan_layout(&g, Orientation::Horizontal, &LayoutConfig::default());
        assert!(!plan.is_fallback());
        assert_eq!(plan.levels, vec![Some(0), Some(1)]);
        assert_eq!(plan.positions[0], Position::new(150.0, 250.0));
        assert_eq!(plan.positions[1], Position::new(450.0, 250.0));
    }

    #[test]
    fn edgeless_node_is_a_root() {
        let g = graph(&["A", "B", "C"], &[("A", "B")]);
        let out = layout(g, Orientation::Horizontal);
        assert_eq!(pos(&out, "A"), (150.0, 150.0));
        assert_eq!(pos(&out, "C"), (150.0, 350.0));
        assert_eq!(pos(&out, "B"), (450.0, 250.0));
    }

    #[test]
    fn self_looped_node_is_parked() {
        // "L" has an incoming edge from itself, so it is not a root and no
        // root reaches it.
        let g = graph(&["A", "B", "L"], &[("A", "B"), ("L", "L")]);
        let plan = plan_layout(&g, Orientation::Horizontal, &LayoutConfig::default());
        assert_eq!(plan.levels, vec![Some(0), Some(1), None]);
        assert_eq!(plan.positions[0], Position::new(150.0, 250.0));
        assert_eq!(plan.positions[2], Position::new(250.0, 100.0));
    }

    #[test]
    fn isolated_cycle_behind_cyclic_root_is_parked() {
        // Every node has an incoming edge, so only "A" seeds the walk; the
        // C/D cycle is never reached.
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "A"), ("C", "D"), ("D", "C")],
        );
        let plan = plan_layout(&g, Orientation::Vertical, &LayoutConfig::default());
        assert_eq!(plan.levels, vec![Some(0), Some(1), None, None]);
        assert_eq!(plan.positions[2], Position::new(250.0, 100.0));
        assert_eq!(plan.positions[3], Position::new(250.0, 100.0));
    }

    #[test]
    fn self_loop_and_duplicate_edges_are_harmless() {
        let g = graph(
            &["A", "B", "C"],
            &[("A", "A"), ("A", "B"), ("A", "B"), ("A", "C")],
        );
        let out = layout(g, Orientation::Horizontal);
        assert_eq!(pos(&out, "A"), (150.0, 250.0));
        assert_eq!(pos(&out, "B"), (450.0, 150.0));
        assert_eq!(pos(&out, "C"), (450.0, 350.0));
    }

    #[test]
    fn dangling_edges_are_ignored() {
        let mut g = graph(&["A", "B"], &[("A", "B")]);
        g.edges.push(Edge::new("ghost", "A"));
        g.edges.push(Edge::new("B", "nowhere"));
        let edges = g.edges.clone();
        let out = layout(g, Orientation::Horizontal);
        assert_eq!(pos(&out, "A"), (150.0, 250.0));
        assert_eq!(pos(&out, "B"), (450.0, 250.0));
        assert_eq!(out.edges, edges);
    }

    #[test]
    fn edges_without_two_endpoints_are_ignored() {
        let json = r#"{
            "nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
            "edges": [["A"], [], ["C", "A", "loop", "extra"], [null, "B"], ["A", "B", null]]
        }"#;
        let g: FlowchartGraph = serde_json::from_str(json).unwrap();
        let edges = g.edges.clone();
        let plan = plan_layout(&g, Orientation::Vertical, &LayoutConfig::default());
        assert!(!plan.is_fallback());
        assert_eq!(plan.levels, vec![Some(1), Some(2), Some(0)]);

        let out = layout(g, Orientation::Vertical);
        assert_eq!(pos(&out, "C"), (400.0, 100.0));
        assert_eq!(pos(&out, "A"), (400.0, 250.0));
        assert_eq!(pos(&out, "B"), (400.0, 400.0));
        assert_eq!(out.edges, edges);
    }

    #[test]
    fn duplicate_ids_use_sequential_layout() {
        let g = graph(&["A", "B", "A"], &[("A", "B")]);
        let plan = plan_layout(&g, Orientation::Horizontal, &LayoutConfig::default());
        assert_eq!(plan.fallback, Some(LayoutError::DuplicateNodeId("A".to_string())));
        assert_eq!(
            plan.positions,
            vec![
                Position::new(150.0, 250.0),
                Position::new(450.0, 250.0),
                Position::new(750.0, 250.0),
            ]
        );

        let out = layout(g, Orientation::Vertical);
        let ys: Vec<f32> = out.nodes.iter().map(|n| n.position.unwrap().y).collect();
        assert_eq!(ys, vec![100.0, 250.0, 400.0]);
        assert!(out.nodes.iter().all(|n| n.position.unwrap().x == 400.0));
    }

    #[test]
    fn empty_id_uses_sequential_layout() {
        let g = graph(&["A", ""], &[]);
        let plan = plan_layout(&g, Orientation::Horizontal, &LayoutConfig::default());
        assert_eq!(plan.fallback, Some(LayoutError::EmptyNodeId { index: 1 }));
        assert_eq!(plan.levels, vec![None, None]);
    }

    #[test]
    fn invalid_spacing_falls_back_to_default_spacing() {
        let mut config = LayoutConfig::default();
        config.horizontal.level_spacing = f32::INFINITY;
        let g = graph(&["A", "B"], &[("A", "B")]);
        let plan = plan_layout(&g, Orientation::Horizontal, &config);
        assert_eq!(plan.fallback, Some(LayoutError::InvalidSpacing("levelSpacing")));
        assert_eq!(
            plan.positions,
            vec![Position::new(150.0, 250.0), Position::new(450.0, 250.0)]
        );
    }

    #[test]
    fn custom_spacing_is_honoured() {
        let mut config = LayoutConfig::default();
        config.vertical.level_spacing = 10.0;
        config.vertical.level_offset = 0.0;
        config.vertical.center = 0.0;
        let g = graph(&["A", "B"], &[("A", "B")]);
        let out = layout_with_config(g, Orientation::Vertical, &config);
        assert_eq!(pos(&out, "A"), (0.0, 0.0));
        assert_eq!(pos(&out, "B"), (0.0, 10.0));
    }

    #[test]
    fn stale_positions_are_overwritten() {
        let mut g = graph(&["A", "B"], &[("A", "B")]);
        g.nodes[1].position = Some(Position::new(-1.0, -1.0));
        let out = layout(g, Orientation::Horizontal);
        assert_eq!(pos(&out, "B"), (450.0, 250.0));
    }
}
