#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod scheduler;
pub mod text_metrics;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ViewportConfig};
pub use engine::Fishbone;
pub use error::FishboneError;
pub use ir::{Category, Cause, Diagram, Priority, Rect, Side};
pub use layout::{
    EstimatedMeasurer, FishboneLayout, FontMeasurer, LabelMeasurer, LabelMetrics, compute_layout,
};
pub use render::render_svg;
pub use theme::Theme;
pub use viewport::Viewport;
