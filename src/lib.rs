#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::{Args, run};
pub use config::{AxisSpacing, Config, LayoutConfig, RenderConfig, load_config};
pub use ir::{Edge, FlowchartGraph, Node, NodeKind, Orientation, Position};
pub use layout::{LayoutError, LayoutPlan, layout, layout_with_config, plan_layout};
pub use render::render_svg;
pub use theme::Theme;
