use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Levels advance left to right.
    #[default]
    Horizontal,
    /// Levels advance top to bottom.
    Vertical,
}

impl Orientation {
    /// Every token other than `horizontal` selects the vertical layout.
    pub fn from_token(token: &str) -> Self {
        match token {
            "horizontal" => Self::Horizontal,
            _ => Self::Vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    End,
    Decision,
    Io,
    /// Also stands in for any type name not listed above.
    #[default]
    #[serde(other)]
    Process,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Node {
    pub fn new(id: impl Into<String>, text: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            position: None,
        }
    }
}

/// A directed connection between two node ids.
///
/// On the wire an edge is a JSON array, `[from, to]` or `[from, to, label]`.
/// Endpoints are not checked against the node list here; the layout engine
/// skips edges whose endpoints are missing.
///
/// Arrays of any other shape still parse. Element 0 and 1 are read as the
/// endpoints and element 2 as the label when they are strings, and the
/// array itself is kept so the edge serializes back exactly as it came in.
/// An edge without two string endpoints is never traversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    wire: Option<Vec<Value>>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
            wire: None,
        }
    }

    pub fn labeled(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(from, to)
        }
    }

    /// Whether the edge names two endpoints and may take part in layout.
    pub fn is_traversable(&self) -> bool {
        match &self.wire {
            None => true,
            Some(wire) => matches!(wire.as_slice(), [Value::String(_), Value::String(_), ..]),
        }
    }

    fn from_wire(wire: Vec<Value>) -> Self {
        let text = |idx: usize| wire.get(idx).and_then(Value::as_str).map(str::to_string);
        let from = text(0);
        let to = text(1);
        let label = text(2);
        let canonical = match wire.as_slice() {
            [Value::String(_), Value::String(_)] => true,
            [Value::String(_), Value::String(_), Value::String(_)] => true,
            _ => false,
        };
        Self {
            from: from.unwrap_or_default(),
            to: to.unwrap_or_default(),
            label,
            wire: (!canonical).then_some(wire),
        }
    }
}

impl Serialize for Edge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(wire) = &self.wire {
            return wire.serialize(serializer);
        }
        match &self.label {
            Some(label) => (&self.from, &self.to, label).serialize(serializer),
            None => (&self.from, &self.to).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Edge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Value>::deserialize(deserializer).map(Edge::from_wire)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowchartGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowchartGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph a producer emits when it could not extract anything:
    /// `Start -> End`, or `Start -> content -> End` when some text survived.
    pub fn minimal(content: Option<&str>) -> Self {
        let mut graph = Self::new();
        graph.push_node("1", "Start", NodeKind::Start);
        match content.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => {
                graph.push_node("2", text, NodeKind::Process);
                graph.push_node("3", "End", NodeKind::End);
                graph.edges.push(Edge::new("1", "2"));
                graph.edges.push(Edge::new("2", "3"));
            }
            None => {
                graph.push_node("2", "End", NodeKind::End);
                graph.edges.push(Edge::new("1", "2"));
            }
        }
        graph
    }

    pub fn push_node(&mut self, id: &str, text: &str, kind: NodeKind) {
        self.nodes.push(Node::new(id, text, kind));
    }

    pub fn push_edge(&mut self, from: &str, to: &str, label: Option<&str>) {
        self.edges.push(match label {
            Some(label) => Edge::labeled(from, to, label),
            None => Edge::new(from, to),
        });
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn is_positioned(&self) -> bool {
        self.nodes.iter().all(|node| node.position.is_some())
    }

    pub fn clear_positions(&mut self) {
        for node in &mut self.nodes {
            node.position = None;
        }
    }
}
