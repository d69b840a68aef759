use jsonflow_core::{GraphNode, PropertyKey};
use serde::{Deserialize, Serialize};

/// Content-derived size hints handed to the external layout engine.
///
/// Height depends only on how many property rows a node has, so editing a
/// value never moves its neighbours. Width follows the longest row, with
/// values clamped so a single huge string cannot blow the node up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutHints {
    /// Height of one property row
    pub row_height: f32,
    /// Header/footer allowance added to every node, top and bottom
    pub node_padding: f32,
    /// Average glyph advance used for width estimates
    pub char_width: f32,
    pub min_width: f32,
    pub max_width: f32,
    /// Characters of a value that count toward width
    pub max_value_chars: usize,
}

impl LayoutHints {
    pub const DEFAULT_ROW_HEIGHT: f32 = 24.0;
    pub const DEFAULT_NODE_PADDING: f32 = 10.0;
    pub const DEFAULT_CHAR_WIDTH: f32 = 8.0;
    pub const DEFAULT_MIN_WIDTH: f32 = 80.0;
    pub const DEFAULT_MAX_WIDTH: f32 = 400.0;
    pub const DEFAULT_MAX_VALUE_CHARS: usize = 48;

    pub fn estimate_height(&self, node: &GraphNode) -> f32 {
        // Empty containers still draw one (blank) row.
        let rows = node.properties.len().max(1);
        self.node_padding * 2.0 + rows as f32 * self.row_height
    }

    pub fn estimate_width(&self, node: &GraphNode) -> f32 {
        let label_chars = node
            .label
            .as_deref()
            .map(|label| label.chars().count())
            .unwrap_or(0);
        let widest_row = node
            .properties
            .iter()
            .map(|prop| {
                let value_chars = prop
                    .rendered_value
                    .chars()
                    .count()
                    .min(self.max_value_chars);
                // Rows read `key: value` or `index: value`.
                let key_chars = match &prop.key {
                    PropertyKey::Key(key) if key.is_empty() => None,
                    PropertyKey::Key(key) => Some(key.chars().count()),
                    PropertyKey::Index(index) => {
                        Some(index.checked_ilog10().map_or(1, |digits| digits as usize + 1))
                    }
                };
                key_chars.map_or(value_chars, |key_chars| key_chars + 2 + value_chars)
            })
            .max()
            .unwrap_or(0);

        let chars = label_chars.max(widest_row) as f32;
        (chars * self.char_width + self.node_padding * 2.0).clamp(self.min_width, self.max_width)
    }

    /// Fill in both hints on `node`.
    pub fn apply(&self, node: &mut GraphNode) {
        node.estimated_height = self.estimate_height(node);
        node.estimated_width = self.estimate_width(node);
    }
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            row_height: Self::DEFAULT_ROW_HEIGHT,
            node_padding: Self::DEFAULT_NODE_PADDING,
            char_width: Self::DEFAULT_CHAR_WIDTH,
            min_width: Self::DEFAULT_MIN_WIDTH,
            max_width: Self::DEFAULT_MAX_WIDTH,
            max_value_chars: Self::DEFAULT_MAX_VALUE_CHARS,
        }
    }
}

/// Height hint with the default metrics.
pub fn estimate_height(node: &GraphNode) -> f32 {
    LayoutHints::default().estimate_height(node)
}

/// Width hint with the default metrics.
pub fn estimate_width(node: &GraphNode) -> f32 {
    LayoutHints::default().estimate_width(node)
}
