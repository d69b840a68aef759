//! Path-derived identifiers.
//!
//! A node id is the root id followed by one segment per traversal step,
//! joined with [`SEPARATOR`]. Object keys are percent-encoded so the
//! separator (and whitespace) never shows up inside a segment, which keeps
//! ids unique per path and safe to use as DOM ids.

use jsonflow_core::{NodeId, PropertyKey};
use std::fmt::Write;

pub const SEPARATOR: char = '-';

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'~')
}

/// Percent-encode every byte outside `[A-Za-z0-9_.~]`.
pub fn encode_segment(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for &byte in key.as_bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            // Writing into a String cannot fail.
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

pub fn segment(key: &PropertyKey) -> String {
    match key {
        PropertyKey::Key(key) => encode_segment(key),
        PropertyKey::Index(index) => index.to_string(),
    }
}

pub fn child_id(parent: &NodeId, key: &PropertyKey) -> NodeId {
    let segment = segment(key);
    let mut id = String::with_capacity(parent.as_str().len() + 1 + segment.len());
    id.push_str(parent.as_str());
    id.push(SEPARATOR);
    id.push_str(&segment);
    NodeId(id)
}

/// Each node has at most one incoming edge, so the target names the edge.
pub fn edge_id(target: &NodeId) -> String {
    format!("edge{SEPARATOR}{target}")
}

/// Display label for a container reached through `key`.
pub fn node_label(key: &PropertyKey) -> String {
    match key {
        PropertyKey::Key(key) => key.clone(),
        PropertyKey::Index(index) => format!("[{index}]"),
    }
}
