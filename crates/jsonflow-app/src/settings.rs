use anyhow::{Context, Result};
use jsonflow_core::EdgeStyle;
use jsonflow_graph::{BuilderConfig, LayoutHints};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What happens to the current graph when the editor text stops parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidInputPolicy {
    /// Keep showing the last valid graph.
    #[default]
    Retain,
    /// Drop the graph until the text parses again.
    Clear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    pub edge_style: EdgeStyle,
    pub invalid_input_policy: InvalidInputPolicy,
    /// Documents larger than this are rejected before parsing.
    pub max_input_bytes: usize,
    /// Re-run the active query whenever the graph is rebuilt.
    pub search_on_rebuild: bool,
    pub layout: LayoutHints,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            edge_style: EdgeStyle::Default,
            invalid_input_policy: InvalidInputPolicy::Retain,
            max_input_bytes: 8 * 1024 * 1024,
            search_on_rebuild: true,
            layout: LayoutHints::default(),
        }
    }
}

impl FlowSettings {
    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            edge_style: self.edge_style,
            hints: self.layout,
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jsonflow").join("settings.json"))
    }

    /// Load from the user config directory, falling back to defaults.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    tracing::info!("Settings loaded successfully: {:?}", settings);
                    settings
                }
                Err(e) => {
                    tracing::error!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path().context("No config directory on this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
