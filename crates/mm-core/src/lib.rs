pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod model;
pub mod viewport;

pub use config::EditorConfig;
pub use error::MapError;
pub use geometry::{Bounds, Point, Size};
pub use id::{LinkId, NodeId};
pub use layout::{Direction, node_bounds, node_size};
pub use model::*;
pub use viewport::{ScreenSize, Viewport, fit_to_bounds};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::stable_graph::{EdgeIndex, NodeIndex};
