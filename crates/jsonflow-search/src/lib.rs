use jsonflow_core::{Graph, NodeId};
use nucleo_matcher::chars::to_lower_case;
use nucleo_matcher::{Config, Matcher, Utf32Str, Utf32String};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Highlight state of one node for the current query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHighlight {
    pub node_matches: bool,
    pub matching_property_indices: BTreeSet<usize>,
}

/// Per-node match state for one query. Only nodes with a match are stored;
/// every other node reads as "not highlighted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHighlightState {
    query: String,
    highlights: BTreeMap<NodeId, NodeHighlight>,
    /// Matching nodes in graph order, for next/previous navigation.
    matched_nodes: Vec<NodeId>,
}

impl SearchHighlightState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_empty(&self) -> bool {
        self.matched_nodes.is_empty()
    }

    pub fn match_count(&self) -> usize {
        self.matched_nodes.len()
    }

    pub fn matched_nodes(&self) -> &[NodeId] {
        &self.matched_nodes
    }

    pub fn get(&self, id: &str) -> Option<&NodeHighlight> {
        self.highlights.get(id)
    }

    pub fn node_matches(&self, id: &str) -> bool {
        self.get(id).is_some_and(|h| h.node_matches)
    }

    pub fn property_matches(&self, id: &str, property_index: usize) -> bool {
        self.get(id)
            .is_some_and(|h| h.matching_property_indices.contains(&property_index))
    }

    /// Position of `id` among the matches, for "3 of 7" style counters.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.matched_nodes.iter().position(|n| n.as_str() == id)
    }
}

/// Case-folds `text` one char at a time. Unlike `Utf32String::from`, this
/// keeps every char, so combining marks stay searchable.
fn fold(text: &str) -> Utf32String {
    let folded: Vec<char> = text.chars().map(to_lower_case).collect();
    if folded.iter().all(char::is_ascii) {
        Utf32String::Ascii(folded.into_iter().collect::<String>().into_boxed_str())
    } else {
        Utf32String::Unicode(folded.into_boxed_slice())
    }
}

/// Literal substring test over folded text.
fn contains(matcher: &mut Matcher, haystack: Utf32Str<'_>, needle: Utf32Str<'_>) -> bool {
    match (haystack, needle) {
        (Utf32Str::Ascii(_), Utf32Str::Ascii(_)) => {
            matcher.substring_match(haystack, needle).is_some()
        }
        (Utf32Str::Ascii(_), Utf32Str::Unicode(_)) => false,
        (Utf32Str::Unicode(chars), Utf32Str::Ascii(bytes)) => chars
            .windows(bytes.len())
            .any(|window| window.iter().zip(bytes).all(|(&c, &b)| c == char::from(b))),
        (Utf32Str::Unicode(chars), Utf32Str::Unicode(needle)) => {
            chars.windows(needle.len()).any(|window| window == needle)
        }
    }
}

struct PropertyText {
    /// Object key; array indices are not searchable text.
    key: Option<Utf32String>,
    value: Utf32String,
}

struct NodeText {
    id: NodeId,
    label: Option<Utf32String>,
    properties: Vec<PropertyText>,
}

/// Case-insensitive substring search over a built graph.
///
/// Texts are converted once when the index is created, so the same index can
/// answer every keystroke for one graph. Searching never touches the graph.
pub struct SearchIndex {
    matcher: Matcher,
    nodes: Vec<NodeText>,
}

impl SearchIndex {
    pub fn new(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeText {
                id: node.id.clone(),
                label: node.label.as_deref().map(fold),
                properties: node
                    .properties
                    .iter()
                    .map(|prop| PropertyText {
                        key: prop
                            .key
                            .as_key()
                            .filter(|key| !key.is_empty())
                            .map(fold),
                        value: fold(&prop.rendered_value),
                    })
                    .collect(),
            })
            .collect();

        // Texts and queries are folded up front, so the matcher only ever
        // sees exact comparisons.
        let mut config = Config::DEFAULT;
        config.ignore_case = false;
        config.normalize = false;

        Self {
            matcher: Matcher::new(config),
            nodes,
        }
    }

    pub fn search(&mut self, query: &str) -> SearchHighlightState {
        let query = query.trim();
        if query.is_empty() {
            return SearchHighlightState::empty();
        }

        let needle = fold(query);
        let needle = needle.slice(..);

        let mut highlights = BTreeMap::new();
        let mut matched_nodes = Vec::new();
        for node in &self.nodes {
            let label_matches = node
                .label
                .as_ref()
                .is_some_and(|label| contains(&mut self.matcher, label.slice(..), needle));

            let mut matching_property_indices = BTreeSet::new();
            for (idx, prop) in node.properties.iter().enumerate() {
                let key_matches = prop
                    .key
                    .as_ref()
                    .is_some_and(|key| contains(&mut self.matcher, key.slice(..), needle));
                if key_matches || contains(&mut self.matcher, prop.value.slice(..), needle) {
                    matching_property_indices.insert(idx);
                }
            }

            if label_matches || !matching_property_indices.is_empty() {
                matched_nodes.push(node.id.clone());
                highlights.insert(
                    node.id.clone(),
                    NodeHighlight {
                        node_matches: true,
                        matching_property_indices,
                    },
                );
            }
        }

        tracing::debug!(
            "Search for {:?} matched {} of {} nodes",
            query,
            matched_nodes.len(),
            self.nodes.len()
        );

        SearchHighlightState {
            query: query.to_string(),
            highlights,
            matched_nodes,
        }
    }
}

/// One-shot search: index `graph` and run `query` against it.
pub fn search(graph: &Graph, query: &str) -> SearchHighlightState {
    SearchIndex::new(graph).search(query)
}
