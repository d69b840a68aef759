use crossbeam_channel::Receiver;
use jsonflow_core::{EdgeStyle, Error, Graph, Result};
use jsonflow_events::{Event, EventBus};
use jsonflow_graph::GraphBuilder;
use jsonflow_search::{SearchHighlightState, SearchIndex};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

pub mod settings;

pub use settings::{FlowSettings, InvalidInputPolicy};

/// Parse document text, enforcing the caller's size limit first.
pub fn parse_document(text: &str, max_input_bytes: usize) -> Result<Value> {
    if text.len() > max_input_bytes {
        return Err(Error::InputTooLarge {
            size: text.len(),
            limit: max_input_bytes,
        });
    }
    Ok(serde_json::from_str(text)?)
}

struct FlowState {
    settings: FlowSettings,
    /// Last document that parsed; rebuilt from when the edge style changes.
    document: Option<Arc<Value>>,
    graph: Option<Arc<Graph>>,
    search_index: Option<SearchIndex>,
    query: String,
    highlight: Arc<SearchHighlightState>,
}

impl FlowState {
    fn run_search(&mut self) -> Arc<SearchHighlightState> {
        let state = match self.search_index.as_mut() {
            Some(index) => index.search(&self.query),
            None => SearchHighlightState::empty(),
        };
        self.highlight = Arc::new(state);
        self.highlight.clone()
    }
}

/// Single owner of the derived visualization state.
///
/// Graph and highlight state are immutable values behind `Arc`s. Writers swap
/// in a complete replacement under the lock, so readers holding an old `Arc`
/// keep a consistent graph and never see a half-built one.
///
/// Writers hold `writer` for the whole read-build-commit cycle, so they apply
/// one at a time and a rebuild always starts from the latest committed
/// document and settings. Readers only take `state` and are never blocked by
/// a build in progress.
#[derive(Clone)]
pub struct FlowController {
    state: Arc<Mutex<FlowState>>,
    writer: Arc<Mutex<()>>,
    bus: EventBus,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new(FlowSettings::default())
    }
}

impl FlowController {
    pub fn new(settings: FlowSettings) -> Self {
        Self::with_bus(settings, EventBus::new())
    }

    pub fn with_bus(settings: FlowSettings, bus: EventBus) -> Self {
        Self {
            state: Arc::new(Mutex::new(FlowState {
                settings,
                document: None,
                graph: None,
                search_index: None,
                query: String::new(),
                highlight: Arc::new(SearchHighlightState::empty()),
            })),
            writer: Arc::new(Mutex::new(())),
            bus,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn events(&self) -> Receiver<Event> {
        self.bus.receiver()
    }

    pub fn settings(&self) -> FlowSettings {
        self.state.lock().settings.clone()
    }

    pub fn graph(&self) -> Option<Arc<Graph>> {
        self.state.lock().graph.clone()
    }

    pub fn highlight(&self) -> Arc<SearchHighlightState> {
        self.state.lock().highlight.clone()
    }

    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    /// Parse editor text and, if valid, replace the graph.
    ///
    /// Invalid or oversized text never produces a graph; the current one is
    /// kept or dropped according to the invalid-input policy.
    pub fn set_text(&self, text: &str) -> Result<Arc<Graph>> {
        let _writer = self.writer.lock();
        let limit = self.state.lock().settings.max_input_bytes;
        match parse_document(text, limit) {
            Ok(value) => Ok(self.commit(value)),
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    /// Replace the graph with one built from an already parsed document.
    pub fn set_value(&self, value: Value) -> Arc<Graph> {
        let _writer = self.writer.lock();
        self.commit(value)
    }

    /// Build from `value` and swap the result in. Callers hold `writer`.
    fn commit(&self, value: Value) -> Arc<Graph> {
        let config = self.state.lock().settings.builder_config();
        let started = Instant::now();
        let graph = Arc::new(GraphBuilder::new(config).build(&value));
        let index = SearchIndex::new(&graph);
        let duration_ms = started.elapsed().as_millis() as u64;

        let mut state = self.state.lock();
        state.document = Some(Arc::new(value));
        state.graph = Some(graph.clone());
        state.search_index = Some(index);
        tracing::info!(
            "Graph replaced: {} nodes, {} edges in {}ms",
            graph.node_count(),
            graph.edge_count(),
            duration_ms
        );
        self.bus.publish(Event::GraphReplaced {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            duration_ms,
        });

        if state.query.trim().is_empty() {
            state.highlight = Arc::new(SearchHighlightState::empty());
        } else if state.settings.search_on_rebuild {
            let highlight = state.run_search();
            self.bus.publish(Event::SearchComplete {
                query: highlight.query().to_string(),
                result_count: highlight.match_count(),
            });
        } else {
            // Old highlights may name ids that no longer exist.
            state.highlight = Arc::new(SearchHighlightState::empty());
            self.bus.publish(Event::SearchCleared);
        }
        graph
    }

    /// Recompute highlights for `query` against the current graph.
    pub fn set_query(&self, query: &str) -> Arc<SearchHighlightState> {
        let mut state = self.state.lock();
        state.query = query.to_string();
        self.bus.publish(Event::SearchQuery {
            query: query.to_string(),
        });

        let highlight = state.run_search();
        if query.trim().is_empty() {
            self.bus.publish(Event::SearchCleared);
        } else {
            self.bus.publish(Event::SearchComplete {
                query: highlight.query().to_string(),
                result_count: highlight.match_count(),
            });
        }
        highlight
    }

    /// Switch the graph-wide edge style, rebuilding the current document.
    pub fn set_edge_style(&self, style: EdgeStyle) -> Option<Arc<Graph>> {
        let _writer = self.writer.lock();
        let document = {
            let mut state = self.state.lock();
            if state.settings.edge_style == style {
                return state.graph.clone();
            }
            state.settings.edge_style = style;
            state.document.clone()
        };
        self.bus.publish(Event::EdgeStyleChanged { style });
        document.map(|doc| self.commit(Value::clone(&doc)))
    }

    fn reject(&self, err: &Error) {
        let mut state = self.state.lock();
        match err {
            Error::InputTooLarge { size, limit } => {
                tracing::warn!("Rejected input of {} bytes (limit {})", size, limit);
                self.bus.publish(Event::InputRejected {
                    size: *size,
                    limit: *limit,
                });
            }
            Error::Syntax {
                line,
                column,
                message,
            } => {
                tracing::warn!("Document does not parse: {}", err);
                self.bus.publish(Event::ParseFailed {
                    line: *line,
                    column: *column,
                    message: message.clone(),
                });
            }
            Error::InvalidInput(_) => tracing::warn!("{}", err),
        }

        match state.settings.invalid_input_policy {
            InvalidInputPolicy::Retain => {
                if let Some(graph) = &state.graph {
                    self.bus.publish(Event::GraphRetained {
                        node_count: graph.node_count(),
                    });
                }
            }
            InvalidInputPolicy::Clear => {
                if state.graph.is_some() {
                    state.document = None;
                    state.graph = None;
                    state.search_index = None;
                    state.highlight = Arc::new(SearchHighlightState::empty());
                    self.bus.publish(Event::GraphCleared);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_limits_size() {
        let err = parse_document("[1,2,3]", 3).unwrap_err();
        assert_eq!(err, Error::InputTooLarge { size: 7, limit: 3 });
        assert!(parse_document("[1,2,3]", 7).is_ok());
    }

    #[test]
    fn test_parse_document_reports_position() {
        let err = parse_document("{\n  \"a\": tru\n}", 1024).unwrap_err();
        match err {
            Error::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("Expected Syntax error, got {other:?}"),
        }
    }
}
