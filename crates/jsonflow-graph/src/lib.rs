pub mod builder;
pub mod layout;
pub mod model;
pub mod path;

pub use builder::{BuilderConfig, GraphBuilder, build};
pub use layout::{LayoutHints, estimate_height, estimate_width};
pub use model::{GraphModel, GraphStats, NodeIndex};
