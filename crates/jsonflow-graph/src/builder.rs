use crate::layout::LayoutHints;
use crate::path::{child_id, edge_id, node_label};
use jsonflow_core::{
    EdgeStyle, Graph, GraphEdge, GraphNode, NodeId, NodeKind, NodeProperty, PropertyKey,
    ValueKind, classify, render_primitive,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings applied uniformly to a whole graph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub edge_style: EdgeStyle,
    pub hints: LayoutHints,
}

impl BuilderConfig {
    pub fn with_edge_style(edge_style: EdgeStyle) -> Self {
        Self {
            edge_style,
            ..Self::default()
        }
    }
}

/// A container waiting to be turned into a node.
struct Frame<'v> {
    value: &'v Value,
    id: NodeId,
    parent_id: Option<NodeId>,
    key: Option<PropertyKey>,
    depth: usize,
}

/// Compiles a JSON document into a containment graph.
///
/// Every object and array becomes one node; primitive children are grouped
/// into their container's `properties` and never become nodes. There is no
/// splitting of large containers: one node per container, whatever its size.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: BuilderConfig,
}

impl GraphBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Depth-first, pre-order walk. A node is complete (properties, child
    /// refs, hints) before any of its descendants are emitted. The walk uses
    /// an explicit stack, so nesting depth is bounded by memory only.
    pub fn build(&self, root: &Value) -> Graph {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut stack = vec![Frame {
            value: root,
            id: NodeId::root(),
            parent_id: None,
            key: None,
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            let first_child = stack.len();
            let node = self.convert(frame, &mut stack, &mut edges);
            nodes.push(node);
            // Children were queued in source order; pop them first-to-last.
            stack[first_child..].reverse();
        }

        tracing::debug!(
            "Built graph with {} nodes and {} edges",
            nodes.len(),
            edges.len()
        );
        Graph::from_parts_unchecked(nodes, edges)
    }

    fn convert<'v>(
        &self,
        frame: Frame<'v>,
        stack: &mut Vec<Frame<'v>>,
        edges: &mut Vec<GraphEdge>,
    ) -> GraphNode {
        let Frame {
            value,
            id,
            parent_id,
            key,
            depth,
        } = frame;

        let mut properties = Vec::new();
        let mut child_container_refs = Vec::new();

        let mut visit = |child_key: PropertyKey, child: &'v Value| match classify(child) {
            ValueKind::Primitive(value_type) => properties.push(NodeProperty {
                key: child_key,
                value_type,
                rendered_value: render_primitive(child).unwrap_or_default(),
            }),
            ValueKind::Container(_) => {
                let target = child_id(&id, &child_key);
                child_container_refs.push(target.clone());
                stack.push(Frame {
                    value: child,
                    id: target,
                    parent_id: Some(id.clone()),
                    key: Some(child_key),
                    depth: depth + 1,
                });
            }
        };

        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    visit(PropertyKey::Key(k.clone()), v);
                }
            }
            Value::Array(items) => {
                for (i, v) in items.iter().enumerate() {
                    visit(PropertyKey::Index(i), v);
                }
            }
            // A scalar document: wrap it as a one-property pseudo-object.
            scalar => visit(PropertyKey::Key(String::new()), scalar),
        }

        let value_kind = classify(value);
        let kind = match (&parent_id, value) {
            (None, _) => NodeKind::Root,
            (Some(_), Value::Array(_)) => NodeKind::Array,
            (Some(_), _) => NodeKind::Object,
        };

        if let (Some(source_id), Some(edge_key)) = (&parent_id, &key) {
            edges.push(GraphEdge {
                id: edge_id(&id),
                source_id: source_id.clone(),
                target_id: id.clone(),
                key: edge_key.clone(),
                edge_style: self.config.edge_style,
            });
        }

        let mut node = GraphNode {
            id,
            kind,
            value_kind,
            label: key.as_ref().map(node_label),
            properties,
            child_container_refs,
            estimated_height: 0.0,
            estimated_width: 0.0,
            parent_id,
            depth,
        };
        self.config.hints.apply(&mut node);
        node
    }
}

/// Build with the default configuration.
pub fn build(root: &Value) -> Graph {
    GraphBuilder::default().build(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonflow_core::{ContainerKind, PrimitiveKind};
    use serde_json::json;

    fn ids(graph: &Graph) -> Vec<&str> {
        graph.nodes().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_grouping_example() {
        let graph = build(&json!({"x": 1, "y": {"z": 2}}));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(ids(&graph), vec!["root", "root-y"]);

        let root = graph.root().unwrap();
        assert_eq!(root.kind, NodeKind::Root);
        assert_eq!(root.properties.len(), 1);
        assert_eq!(root.properties[0].key, PropertyKey::Key("x".into()));
        assert_eq!(root.properties[0].rendered_value, "1");
        assert_eq!(root.child_container_refs, vec![NodeId::from("root-y")]);

        assert_eq!(graph.edge_count(), 1);
        let edge = &graph.edges()[0];
        assert_eq!(edge.source_id.as_str(), "root");
        assert_eq!(edge.target_id.as_str(), "root-y");
        assert_eq!(edge.key, PropertyKey::Key("y".into()));
        assert_eq!(edge.edge_style, EdgeStyle::Default);

        let y = &graph.nodes()[1];
        assert_eq!(y.kind, NodeKind::Object);
        assert_eq!(y.label.as_deref(), Some("y"));
        assert_eq!(y.parent_id, Some(NodeId::root()));
        assert_eq!(y.depth, 1);
    }

    #[test]
    fn test_array_indices() {
        let graph = build(&json!([10, 20, {"k": 1}]));
        let root = graph.root().unwrap();
        assert_eq!(root.value_kind, ValueKind::Container(ContainerKind::Array));
        assert_eq!(
            root.properties
                .iter()
                .map(|p| (p.key.clone(), p.rendered_value.as_str()))
                .collect::<Vec<_>>(),
            vec![(PropertyKey::Index(0), "10"), (PropertyKey::Index(1), "20")]
        );
        assert_eq!(root.child_container_refs.len(), 1);
        assert_eq!(graph.edges()[0].key, PropertyKey::Index(2));
        assert_eq!(graph.nodes()[1].label.as_deref(), Some("[2]"));
    }

    #[test]
    fn test_order_preserved() {
        let value: Value = serde_json::from_str(r#"{"b": 2, "a": 1, "c": {}, "0": {}}"#).unwrap();
        let graph = build(&value);
        let keys: Vec<String> = graph
            .root()
            .unwrap()
            .properties
            .iter()
            .map(|p| p.key.to_string())
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(ids(&graph), vec!["root", "root-c", "root-0"]);
    }

    #[test]
    fn test_scalar_root_is_wrapped() {
        for value in [json!("hello"), json!(3.5), json!(true), Value::Null] {
            let graph = build(&value);
            assert_eq!(graph.node_count(), 1);
            assert_eq!(graph.edge_count(), 0);
            let root = graph.root().unwrap();
            assert_eq!(root.kind, NodeKind::Root);
            assert!(root.value_kind.is_primitive());
            assert_eq!(root.properties.len(), 1);
            assert_eq!(root.properties[0].key, PropertyKey::Key(String::new()));
        }
        let graph = build(&json!("hello"));
        assert_eq!(graph.root().unwrap().properties[0].rendered_value, "hello");
        assert_eq!(graph.root().unwrap().properties[0].value_type, PrimitiveKind::String);
    }

    #[test]
    fn test_empty_containers_are_kept() {
        let graph = build(&json!({"obj": {}, "arr": []}));
        assert_eq!(graph.node_count(), 3);
        for node in &graph.nodes()[1..] {
            assert!(node.properties.is_empty());
            assert!(node.child_container_refs.is_empty());
        }
        assert_eq!(graph.nodes()[2].kind, NodeKind::Array);

        assert_eq!(build(&json!({})).node_count(), 1);
        assert_eq!(build(&json!([])).node_count(), 1);
    }

    #[test]
    fn test_pre_order_traversal() {
        let graph = build(&json!({
            "a": {"a1": {"deep": true}},
            "b": [{"b0": 1}, [2]]
        }));
        assert_eq!(
            ids(&graph),
            vec!["root", "root-a", "root-a-a1", "root-b", "root-b-0", "root-b-1"]
        );
        let targets: Vec<&str> = graph.edges().iter().map(|e| e.target_id.as_str()).collect();
        assert_eq!(targets, &ids(&graph)[1..]);
    }

    #[test]
    fn test_custom_edge_style_applies_to_all_edges() {
        let builder = GraphBuilder::new(BuilderConfig::with_edge_style(EdgeStyle::CustomStepped));
        let graph = builder.build(&json!({"a": {}, "b": [[]]}));
        assert_eq!(graph.edge_count(), 3);
        assert!(
            graph
                .edges()
                .iter()
                .all(|e| e.edge_style == EdgeStyle::CustomStepped)
        );
    }

    #[test]
    fn test_rendered_values() {
        let graph = build(&json!({"s": "say \"hi\"", "n": 1.25, "b": false, "z": null}));
        let rendered: Vec<(&str, PrimitiveKind)> = graph
            .root()
            .unwrap()
            .properties
            .iter()
            .map(|p| (p.rendered_value.as_str(), p.value_type))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("say \"hi\"", PrimitiveKind::String),
                ("1.25", PrimitiveKind::Number),
                ("false", PrimitiveKind::Boolean),
                ("null", PrimitiveKind::Null),
            ]
        );
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut value = json!({"leaf": 1});
        for _ in 0..2_000 {
            value = Value::Array(vec![value]);
        }
        let graph = build(&value);
        assert_eq!(graph.node_count(), 2_001);
        assert_eq!(graph.nodes().last().map(|n| n.depth), Some(2_000));
        // serde_json drops nested values recursively; unwind it by hand.
        let mut value = value;
        while let Value::Array(mut items) = value {
            value = items.pop().unwrap_or(Value::Null);
        }
    }

    #[test]
    fn test_hints_are_filled() {
        let graph = build(&json!({"a": 1, "b": 2}));
        let root = graph.root().unwrap();
        assert_eq!(root.estimated_height, LayoutHints::default().estimate_height(root));
        assert!(root.estimated_width > 0.0);
    }
}
