use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub mod error;
pub mod kind;

pub use error::{Error, Result};
pub use kind::{ContainerKind, PrimitiveKind, ValueKind, classify, render_primitive};

/// Path-derived node identifier, stable across rebuilds of the same document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Reserved id of the top-level node.
    pub const ROOT: &'static str = "root";

    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Object,
    Array,
}

impl From<ContainerKind> for NodeKind {
    fn from(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Object => NodeKind::Object,
            ContainerKind::Array => NodeKind::Array,
        }
    }
}

/// Graph-wide edge drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeStyle {
    /// Smooth step edges.
    #[default]
    Default,
    CustomStepped,
}

impl fmt::Display for EdgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeStyle::Default => f.write_str("default"),
            EdgeStyle::CustomStepped => f.write_str("custom-stepped"),
        }
    }
}

/// Where a child sits inside its container: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKey {
    Key(String),
    Index(usize),
}

impl PropertyKey {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PropertyKey::Key(key) => Some(key),
            PropertyKey::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PropertyKey::Key(_) => None,
            PropertyKey::Index(index) => Some(*index),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Key(key) => f.write_str(key),
            PropertyKey::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A primitive child inlined into its container's node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProperty {
    pub key: PropertyKey,
    pub value_type: PrimitiveKind,
    pub rendered_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Classification of the value behind this node. For a scalar document
    /// the root carries the scalar's primitive kind.
    pub value_kind: ValueKind,
    /// Key (or `[index]`) the container sits under; `None` for the root.
    pub label: Option<String>,
    pub properties: Vec<NodeProperty>,
    pub child_container_refs: Vec<NodeId>,
    pub estimated_height: f32,
    pub estimated_width: f32,
    /// Lookup-only back reference to the owning node.
    pub parent_id: Option<NodeId>,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub key: PropertyKey,
    pub edge_style: EdgeStyle,
}

/// Nodes and containment edges of one JSON document.
///
/// Graphs are values: every edit produces a new one. `node_count` is always
/// derived from `nodes` and deserialization re-checks every invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphParts")]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    node_count: usize,
}

#[derive(Deserialize)]
struct GraphParts {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl TryFrom<GraphParts> for Graph {
    type Error = Error;

    fn try_from(parts: GraphParts) -> Result<Self> {
        Graph::from_parts(parts.nodes, parts.edges)
    }
}

impl Graph {
    /// Assemble a graph, checking that it is a well-formed containment tree.
    pub fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Result<Self> {
        validate(&nodes, &edges)?;
        Ok(Self::from_parts_unchecked(nodes, edges))
    }

    /// Assemble a graph whose invariants hold by construction. Nothing is
    /// checked; parts from outside the builder go through `from_parts`.
    pub fn from_parts_unchecked(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let node_count = nodes.len();
        Self {
            nodes,
            edges,
            node_count,
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The root node. Only `None` for a graph assembled unchecked from no
    /// nodes; built and validated graphs always lead with the root.
    pub fn root(&self) -> Option<&GraphNode> {
        self.nodes.first()
    }

    /// Linear lookup. Use `GraphModel` for repeated lookups.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    pub fn into_parts(self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        (self.nodes, self.edges)
    }
}

fn validate(nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<()> {
    let Some(root) = nodes.first() else {
        return Err(Error::invalid_input("graph has no nodes"));
    };
    if root.kind != NodeKind::Root || root.parent_id.is_some() {
        return Err(Error::invalid_input(format!(
            "first node {} is not a parentless root",
            root.id
        )));
    }

    let mut by_id: HashMap<&str, &GraphNode> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if by_id.insert(node.id.as_str(), node).is_some() {
            return Err(Error::invalid_input(format!("duplicate node id {}", node.id)));
        }
        if node.kind == NodeKind::Root && !std::ptr::eq(node, root) {
            return Err(Error::invalid_input(format!(
                "node {} is a second root",
                node.id
            )));
        }
    }

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut targets: HashSet<&str> = HashSet::with_capacity(edges.len());
    for edge in edges {
        let source = by_id.get(edge.source_id.as_str()).ok_or_else(|| {
            Error::invalid_input(format!(
                "edge {} references missing source {}",
                edge.id, edge.source_id
            ))
        })?;
        let target = by_id.get(edge.target_id.as_str()).ok_or_else(|| {
            Error::invalid_input(format!(
                "edge {} references missing target {}",
                edge.id, edge.target_id
            ))
        })?;
        if target.parent_id.as_ref() != Some(&source.id) {
            return Err(Error::invalid_input(format!(
                "edge {} does not match the parent of {}",
                edge.id, target.id
            )));
        }
        if !targets.insert(edge.target_id.as_str()) {
            return Err(Error::invalid_input(format!(
                "node {} has more than one incoming edge",
                edge.target_id
            )));
        }
        children
            .entry(edge.source_id.as_str())
            .or_default()
            .push(edge.target_id.as_str());
    }

    // Every node must hang off the root exactly once.
    let mut seen: HashSet<&str> = HashSet::with_capacity(nodes.len());
    let mut stack = vec![root.id.as_str()];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            return Err(Error::invalid_input(format!("cycle through node {id}")));
        }
        if let Some(kids) = children.get(id) {
            stack.extend(kids.iter().copied());
        }
    }
    if seen.len() != nodes.len() {
        return Err(Error::invalid_input(format!(
            "{} nodes are not reachable from the root",
            nodes.len() - seen.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: NodeKind, parent: Option<&str>) -> GraphNode {
        GraphNode {
            id: NodeId::from(id),
            kind,
            value_kind: ValueKind::Container(ContainerKind::Object),
            label: None,
            properties: Vec::new(),
            child_container_refs: Vec::new(),
            estimated_height: 0.0,
            estimated_width: 0.0,
            parent_id: parent.map(NodeId::from),
            depth: usize::from(parent.is_some()),
        }
    }

    fn edge(source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            id: format!("edge-{target}"),
            source_id: NodeId::from(source),
            target_id: NodeId::from(target),
            key: PropertyKey::Key("k".to_string()),
            edge_style: EdgeStyle::Default,
        }
    }

    #[test]
    fn test_from_parts_counts_nodes() {
        let graph = Graph::from_parts(
            vec![
                node("root", NodeKind::Root, None),
                node("root-k", NodeKind::Object, Some("root")),
            ],
            vec![edge("root", "root-k")],
        )
        .unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.root().unwrap().id.is_root());
        assert!(graph.node("root-k").is_some());
    }

    #[test]
    fn test_unchecked_empty_graph_has_no_root() {
        let graph = Graph::from_parts_unchecked(Vec::new(), Vec::new());
        assert!(graph.root().is_none());
        assert_eq!(graph.node_count(), 0);
        assert!(Graph::from_parts(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_rejects_dangling_edge() {
        let err = Graph::from_parts(
            vec![node("root", NodeKind::Root, None)],
            vec![edge("root", "root-missing")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_duplicate_ids_and_orphans() {
        let dup = Graph::from_parts(
            vec![
                node("root", NodeKind::Root, None),
                node("root", NodeKind::Object, Some("root")),
            ],
            vec![],
        );
        assert!(dup.is_err());

        let orphan = Graph::from_parts(
            vec![
                node("root", NodeKind::Root, None),
                node("root-a", NodeKind::Object, Some("root")),
            ],
            vec![],
        );
        assert!(orphan.is_err());

        assert!(Graph::from_parts(vec![], vec![]).is_err());
    }

    #[test]
    fn test_deserialize_recomputes_node_count() {
        let graph = Graph::from_parts(vec![node("root", NodeKind::Root, None)], vec![]).unwrap();
        let mut json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["node_count"], 1);
        json["node_count"] = serde_json::json!(99);

        let back: Graph = serde_json::from_value(json).unwrap();
        assert_eq!(back.node_count(), 1);
        assert_eq!(back, graph);
    }

    #[test]
    fn test_deserialize_rejects_broken_graph() {
        let json = serde_json::json!({
            "nodes": [],
            "edges": [],
            "node_count": 0
        });
        assert!(serde_json::from_value::<Graph>(json).is_err());
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&EdgeStyle::CustomStepped).unwrap(),
            "\"custom-stepped\""
        );
        assert_eq!(
            serde_json::to_string(&PropertyKey::Index(2)).unwrap(),
            "{\"index\":2}"
        );
        assert_eq!(
            serde_json::to_string(&PropertyKey::Key("a".into())).unwrap(),
            "{\"key\":\"a\"}"
        );
        assert_eq!(NodeId::root().to_string(), "root");
    }
}
