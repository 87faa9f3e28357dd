use std::collections::{HashMap, HashSet};

use crate::ir::{Edge, Node};

/// Successor lists and in-degrees over the edges whose endpoints both exist.
/// Edges that do not name two endpoints are skipped the same way.
///
/// Successor lists keep edge order and keep duplicates, so a node reached
/// through two parallel edges shows up twice in the next wave.
pub(crate) struct Adjacency<'a> {
    successors: HashMap<&'a str, Vec<&'a str>>,
    in_degree: HashMap<&'a str, usize>,
    traversed: usize,
}

impl<'a> Adjacency<'a> {
    pub(crate) fn build(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
        let known: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let mut successors: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut in_degree: HashMap<&'a str, usize> =
            nodes.iter().map(|node| (node.id.as_str(), 0)).collect();
        let mut traversed = 0usize;

        for edge in edges {
            if !edge.is_traversable()
                || !known.contains(edge.from.as_str())
                || !known.contains(edge.to.as_str())
            {
                continue;
            }
            successors
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
            *in_degree.entry(edge.to.as_str()).or_insert(0) += 1;
            traversed += 1;
        }

        Self {
            successors,
            in_degree,
            traversed,
        }
    }

    pub(crate) fn successors(&self, id: &str) -> &[&'a str] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn in_degree(&self, id: &str) -> usize {
        self.in_degree.get(id).copied().unwrap_or(0)
    }

    /// Number of edges that survived the endpoint check.
    pub(crate) fn traversed_edges(&self) -> usize {
        self.traversed
    }

    /// Zero in-degree nodes in sequence order. When every node has an
    /// incoming edge the first node seeds the traversal on its own.
    pub(crate) fn roots(&self, nodes: &'a [Node]) -> Vec<&'a str> {
        let roots: Vec<&'a str> = nodes
            .iter()
            .map(|node| node.id.as_str())
            .filter(|id| self.in_degree(id) == 0)
            .collect();
        if !roots.is_empty() {
            return roots;
        }
        nodes.first().map(|node| vec![node.id.as_str()]).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .map(|id| Node::new(*id, *id, NodeKind::Process))
            .collect()
    }

    #[test]
    fn skips_dangling_edges() {
        let nodes = nodes(&["a", "b"]);
        let edges = vec![Edge::new("a", "b"), Edge::new("a", "ghost"), Edge::new("ghost", "b")];
        let adjacency = Adjacency::build(&nodes, &edges);
        assert_eq!(adjacency.successors("a"), &["b"]);
        assert_eq!(adjacency.in_degree("b"), 1);
        assert_eq!(adjacency.traversed_edges(), 1);
        assert!(adjacency.successors("ghost").is_empty());
    }

    #[test]
    fn keeps_duplicates_and_self_loops() {
        let nodes = nodes(&["a", "b"]);
        let edges = vec![Edge::new("a", "b"), Edge::new("a", "b"), Edge::new("b", "b")];
        let adjacency = Adjacency::build(&nodes, &edges);
        assert_eq!(adjacency.successors("a"), &["b", "b"]);
        assert_eq!(adjacency.successors("b"), &["b"]);
        assert_eq!(adjacency.in_degree("b"), 3);
        assert_eq!(adjacency.roots(&nodes), vec!["a"]);
    }

    #[test]
    fn roots_follow_sequence_order() {
        let nodes = nodes(&["c", "a", "b"]);
        let edges = vec![Edge::new("a", "b")];
        let adjacency = Adjacency::build(&nodes, &edges);
        assert_eq!(adjacency.roots(&nodes), vec!["c", "a"]);
    }

    #[test]
    fn cyclic_graph_falls_back_to_first_node() {
        let nodes = nodes(&["b", "a"]);
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "a")];
        let adjacency = Adjacency::build(&nodes, &edges);
        assert_eq!(adjacency.roots(&nodes), vec!["b"]);
    }
}
