use crate::ir::{Orientation, Position};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spacing constants for one orientation.
///
/// "Level axis" is the axis levels advance along (x for horizontal, y for
/// vertical); "cross axis" is the other one, along which nodes sharing a level
/// are spread out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSpacing {
    pub level_spacing: f32,
    pub cross_spacing: f32,
    pub cross_offset: f32,
    pub level_offset: f32,
    /// Cross-axis coordinate of a node that is alone on its level.
    pub center: f32,
}

impl AxisSpacing {
    pub const HORIZONTAL: Self = Self {
        level_spacing: 300.0,
        cross_spacing: 200.0,
        cross_offset: 150.0,
        level_offset: 150.0,
        center: 250.0,
    };

    pub const VERTICAL: Self = Self {
        level_spacing: 150.0,
        cross_spacing: 250.0,
        cross_offset: 200.0,
        level_offset: 100.0,
        center: 400.0,
    };

    /// Name of the first constant that is NaN or infinite.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("levelSpacing", self.level_spacing),
            ("crossSpacing", self.cross_spacing),
            ("crossOffset", self.cross_offset),
            ("levelOffset", self.level_offset),
            ("center", self.center),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub horizontal: AxisSpacing,
    pub vertical: AxisSpacing,
    /// Shared position of every node the traversal never reaches.
    pub disconnected: Position,
}

impl LayoutConfig {
    pub fn spacing(&self, orientation: Orientation) -> &AxisSpacing {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal: AxisSpacing::HORIZONTAL,
            vertical: AxisSpacing::VERTICAL,
            disconnected: Position::new(250.0, 100.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub padding: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub node_width: f32,
    pub node_height: f32,
    pub node_radius: f32,
    pub decision_half_width: f32,
    pub decision_half_height: f32,
    pub max_label_chars: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            min_width: 800.0,
            min_height: 600.0,
            node_width: 120.0,
            node_height: 60.0,
            node_radius: 10.0,
            decision_half_width: 60.0,
            decision_half_height: 40.0,
            max_label_chars: 20,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AxisSpacingFile {
    level_spacing: Option<f32>,
    cross_spacing: Option<f32>,
    cross_offset: Option<f32>,
    level_offset: Option<f32>,
    center: Option<f32>,
}

impl AxisSpacingFile {
    fn apply(self, spacing: &mut AxisSpacing) {
        if let Some(v) = self.level_spacing {
            spacing.level_spacing = v;
        }
        if let Some(v) = self.cross_spacing {
            spacing.cross_spacing = v;
        }
        if let Some(v) = self.cross_offset {
            spacing.cross_offset = v;
        }
        if let Some(v) = self.level_offset {
            spacing.level_offset = v;
        }
        if let Some(v) = self.center {
            spacing.center = v;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    padding: Option<f32>,
    min_width: Option<f32>,
    min_height: Option<f32>,
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_radius: Option<f32>,
    decision_half_width: Option<f32>,
    decision_half_height: Option<f32>,
    max_label_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    label_font_size: Option<f32>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    edge_label_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionFile {
    x: Option<f32>,
    y: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    horizontal: Option<AxisSpacingFile>,
    vertical: Option<AxisSpacingFile>,
    disconnected: Option<PositionFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => anyhow::bail!("unknown theme `{other}`"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.label_font_size {
            config.theme.label_font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.edge_label_color {
            config.theme.edge_label_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(horizontal) = parsed.horizontal {
        horizontal.apply(&mut config.layout.horizontal);
    }
    if let Some(vertical) = parsed.vertical {
        vertical.apply(&mut config.layout.vertical);
    }
    if let Some(disconnected) = parsed.disconnected {
        if let Some(x) = disconnected.x {
            config.layout.disconnected.x = x;
        }
        if let Some(y) = disconnected.y {
            config.layout.disconnected.y = y;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
        if let Some(v) = render.min_width {
            config.render.min_width = v;
        }
        if let Some(v) = render.min_height {
            config.render.min_height = v;
        }
        if let Some(v) = render.node_width {
            config.render.node_width = v;
        }
        if let Some(v) = render.node_height {
            config.render.node_height = v;
        }
        if let Some(v) = render.node_radius {
            config.render.node_radius = v;
        }
        if let Some(v) = render.decision_half_width {
            config.render.decision_half_width = v;
        }
        if let Some(v) = render.decision_half_height {
            config.render.decision_half_height = v;
        }
        if let Some(v) = render.max_label_chars {
            config.render.max_label_chars = v;
        }
    }

    Ok(config)
}
