use jsonflow_core::{Graph, GraphEdge, GraphNode, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub property_count: usize,
    pub max_depth: usize,
}

/// Read-only lookup view over a built [`Graph`].
///
/// The graph itself stays a plain value; the model only adds an id index so
/// UI code can resolve parents, children and subtrees without linear scans.
#[derive(Debug)]
pub struct GraphModel<'g> {
    graph: &'g Graph,
    node_map: HashMap<&'g str, NodeIndex>,
    incoming: HashMap<&'g str, &'g GraphEdge>,
}

impl<'g> GraphModel<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let node_map = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.as_str(), NodeIndex(idx)))
            .collect();
        let incoming = graph
            .edges()
            .iter()
            .map(|edge| (edge.target_id.as_str(), edge))
            .collect();
        Self {
            graph,
            node_map,
            incoming,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn get_node(&self, id: &str) -> Option<&'g GraphNode> {
        self.index_of(id).map(|idx| &self.graph.nodes()[idx.0])
    }

    pub fn parent(&self, id: &str) -> Option<&'g GraphNode> {
        self.get_node(id)?
            .parent_id
            .as_ref()
            .and_then(|parent| self.get_node(parent.as_str()))
    }

    /// The edge leading into `id`; `None` for the root or unknown ids.
    pub fn incoming_edge(&self, id: &str) -> Option<&'g GraphEdge> {
        self.incoming.get(id).copied()
    }

    /// Direct container children in source order.
    pub fn children(&self, id: &str) -> Vec<&'g GraphNode> {
        self.get_node(id)
            .map(|node| {
                node.child_container_refs
                    .iter()
                    .filter_map(|child| self.get_node(child.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids from the root down to `id`, inclusive. Used to reveal a search
    /// match inside collapsed ancestors.
    pub fn ancestors(&self, id: &str) -> Vec<&'g NodeId> {
        let mut path = Vec::new();
        let mut current = self.get_node(id);
        while let Some(node) = current {
            path.push(&node.id);
            current = node
                .parent_id
                .as_ref()
                .and_then(|parent| self.get_node(parent.as_str()));
        }
        path.reverse();
        path
    }

    /// Every descendant of `id` in pre-order, excluding `id` itself. These
    /// are the nodes hidden when `id` is collapsed.
    pub fn descendants(&self, id: &str) -> Vec<&'g NodeId> {
        let mut out = Vec::new();
        let Some(start) = self.get_node(id) else {
            return out;
        };
        let mut stack: Vec<&'g NodeId> = start.child_container_refs.iter().rev().collect();
        while let Some(child) = stack.pop() {
            out.push(child);
            if let Some(node) = self.get_node(child.as_str()) {
                stack.extend(node.child_container_refs.iter().rev());
            }
        }
        out
    }

    pub fn stats(&self) -> GraphStats {
        let nodes = self.graph.nodes();
        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            property_count: nodes.iter().map(|n| n.properties.len()).sum(),
            max_depth: nodes.iter().map(|n| n.depth).max().unwrap_or(0),
        }
    }
}

impl Index<NodeIndex> for GraphModel<'_> {
    type Output = GraphNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.graph.nodes()[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use jsonflow_core::PropertyKey;
    use serde_json::json;

    fn sample() -> Graph {
        build(&json!({
            "name": "demo",
            "owner": {"login": "octo", "links": {"home": "/"}},
            "tags": [{"id": 1}, {"id": 2}],
            "empty": {}
        }))
    }

    #[test]
    fn test_lookup_and_parent() {
        let graph = sample();
        let model = GraphModel::new(&graph);
        let links = model.get_node("root-owner-links").unwrap();
        assert_eq!(links.label.as_deref(), Some("links"));
        assert_eq!(model.parent("root-owner-links").unwrap().id.as_str(), "root-owner");
        assert!(model.parent("root").is_none());
        assert!(model.get_node("root-nope").is_none());
        assert_eq!(model[model.index_of("root").unwrap()].id, NodeId::root());
    }

    #[test]
    fn test_children_in_source_order() {
        let graph = sample();
        let model = GraphModel::new(&graph);
        let children: Vec<&str> = model
            .children("root")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(children, vec!["root-owner", "root-tags", "root-empty"]);
        assert!(model.children("root-empty").is_empty());
    }

    #[test]
    fn test_incoming_edge() {
        let graph = sample();
        let model = GraphModel::new(&graph);
        let edge = model.incoming_edge("root-tags-1").unwrap();
        assert_eq!(edge.source_id.as_str(), "root-tags");
        assert_eq!(edge.key, PropertyKey::Index(1));
        assert!(model.incoming_edge("root").is_none());
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let graph = sample();
        let model = GraphModel::new(&graph);
        let path: Vec<&str> = model
            .ancestors("root-owner-links")
            .iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(path, vec!["root", "root-owner", "root-owner-links"]);

        let hidden: Vec<&str> = model
            .descendants("root-tags")
            .iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(hidden, vec!["root-tags-0", "root-tags-1"]);
        assert_eq!(model.descendants("root").len(), graph.node_count() - 1);
        assert!(model.descendants("root-empty").is_empty());
    }

    #[test]
    fn test_stats() {
        let graph = sample();
        let stats = GraphModel::new(&graph).stats();
        assert_eq!(stats.node_count, 7);
        assert_eq!(stats.edge_count, 6);
        // name, login, home, id, id
        assert_eq!(stats.property_count, 5);
        assert_eq!(stats.max_depth, 2);
    }
}
