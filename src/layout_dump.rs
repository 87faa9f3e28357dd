use crate::ir::{FlowchartGraph, NodeKind, Orientation};
use crate::layout::LayoutPlan;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub orientation: Orientation,
    pub fallback: Option<String>,
    pub level_count: usize,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: NodeKind,
    pub level: Option<usize>,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    /// Both endpoints are named and exist, so the edge took part in level
    /// assignment.
    pub traversed: bool,
}

impl LayoutDump {
    pub fn from_plan(plan: &LayoutPlan, graph: &FlowchartGraph) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .zip(plan.positions.iter().zip(&plan.levels))
            .map(|(node, (position, level))| NodeDump {
                id: node.id.clone(),
                kind: node.kind,
                level: *level,
                x: position.x,
                y: position.y,
            })
            .collect();

        let known: HashSet<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
        let edges = graph
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                label: edge.label.clone(),
                traversed: edge.is_traversable()
                    && known.contains(edge.from.as_str())
                    && known.contains(edge.to.as_str()),
            })
            .collect();

        let level_count = plan
            .levels
            .iter()
            .flatten()
            .max()
            .map_or(0, |deepest| deepest + 1);

        LayoutDump {
            orientation: plan.orientation,
            fallback: plan.fallback.as_ref().map(ToString::to_string),
            level_count,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, plan: &LayoutPlan, graph: &FlowchartGraph) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_plan(plan, graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
