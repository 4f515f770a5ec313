use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoneAngleMode {
    /// Every bone leaves the spine at `bone_angle_deg`. This is the
    /// rendered contract.
    #[default]
    Fixed,
    /// Bone steepens with the category's stacked label height, bounded to
    /// [min_bone_angle_deg, max_bone_angle_deg].
    Adaptive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub spine_start_x: f32,
    /// Label boxes are laid out at a fixed width; a live measurer may
    /// override per-label height but not this column width.
    pub fixed_cause_width: f32,
    pub horizontal_column_gap: f32,
    pub base_bone_length: f32,
    pub bone_angle_mode: BoneAngleMode,
    pub bone_angle_deg: f32,
    pub min_bone_angle_deg: f32,
    pub max_bone_angle_deg: f32,
    pub label_line_height: f32,
    pub max_label_lines: usize,
    pub label_padding_y: f32,
    pub approx_char_width: f32,
    pub min_chars_per_line: usize,
    pub label_base_offset: f32,
    pub nominal_label_height: f32,
    pub min_gap: f32,
    pub connector_shelf: f32,
    pub connector_gap: f32,
    pub connector_elbow_inset: f32,
    pub bone_clearance_margin: f32,
    pub pack_margin: f32,
    pub level_padding: f32,
    pub spine_start_y_offset: f32,
    pub problem_statement_width: f32,
    pub problem_statement_gap: f32,
    pub min_canvas_height: f32,
    pub canvas_side_margin: f32,
}

impl LayoutConfig {
    /// Bones stretch by one label slot per extra cause so anchors keep
    /// their spacing.
    pub fn anti_collision_step(&self) -> f32 {
        self.nominal_label_height + self.min_gap
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spine_start_x: 80.0,
            fixed_cause_width: 240.0,
            horizontal_column_gap: 40.0,
            base_bone_length: 80.0,
            bone_angle_mode: BoneAngleMode::Fixed,
            bone_angle_deg: 45.0,
            min_bone_angle_deg: 35.0,
            max_bone_angle_deg: 70.0,
            label_line_height: 14.0,
            max_label_lines: 3,
            label_padding_y: 12.0,
            approx_char_width: 7.0,
            min_chars_per_line: 10,
            label_base_offset: 24.0,
            nominal_label_height: 20.0,
            min_gap: 8.0,
            connector_shelf: 10.0,
            connector_gap: 8.0,
            connector_elbow_inset: 30.0,
            bone_clearance_margin: 24.0,
            pack_margin: 6.0,
            level_padding: 15.0,
            spine_start_y_offset: 40.0,
            problem_statement_width: 200.0,
            problem_statement_gap: 50.0,
            min_canvas_height: 360.0,
            canvas_side_margin: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub wheel_in_factor: f32,
    pub wheel_out_factor: f32,
    pub min_width_divisor: f32,
    pub max_width_multiplier: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_in_factor: 0.85,
            zoom_out_factor: 1.15,
            wheel_in_factor: 0.9,
            wheel_out_factor: 1.1,
            min_width_divisor: 6.0,
            max_width_multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    spine_start_x: Option<f32>,
    fixed_cause_width: Option<f32>,
    horizontal_column_gap: Option<f32>,
    base_bone_length: Option<f32>,
    bone_angle_mode: Option<BoneAngleMode>,
    bone_angle_deg: Option<f32>,
    min_bone_angle_deg: Option<f32>,
    max_bone_angle_deg: Option<f32>,
    label_line_height: Option<f32>,
    max_label_lines: Option<usize>,
    label_padding_y: Option<f32>,
    approx_char_width: Option<f32>,
    label_base_offset: Option<f32>,
    min_gap: Option<f32>,
    connector_shelf: Option<f32>,
    connector_gap: Option<f32>,
    bone_clearance_margin: Option<f32>,
    pack_margin: Option<f32>,
    level_padding: Option<f32>,
    spine_start_y_offset: Option<f32>,
    min_canvas_height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    name: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    spine_color: Option<String>,
    connector_color: Option<String>,
    text_color: Option<String>,
    category_colors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ViewportConfigFile {
    zoom_in_factor: Option<f32>,
    zoom_out_factor: Option<f32>,
    wheel_in_factor: Option<f32>,
    wheel_out_factor: Option<f32>,
    min_width_divisor: Option<f32>,
    max_width_multiplier: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<ThemeFile>,
    layout: Option<LayoutConfigFile>,
    viewport: Option<ViewportConfigFile>,
}

/// Loads a JSON5 config file (comments and trailing commas allowed) and
/// overlays it on the defaults. `None` yields the default config.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;

    if let Some(theme) = parsed.theme {
        if let Some(name) = theme.name.as_deref() {
            if name == "monochrome" {
                config.theme = Theme::monochrome();
            } else if name == "default" || name == "light" {
                config.theme = Theme::default_light();
            }
        }
        if let Some(v) = theme.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = theme.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = theme.background {
            config.theme.background = v.clone();
            config.render.background = v;
        }
        if let Some(v) = theme.spine_color {
            config.theme.spine_color = v;
        }
        if let Some(v) = theme.connector_color {
            config.theme.connector_color = v;
        }
        if let Some(v) = theme.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = theme.category_colors
            && !v.is_empty()
        {
            config.theme.category_colors = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.spine_start_x {
            target.spine_start_x = v;
        }
        if let Some(v) = layout.fixed_cause_width {
            target.fixed_cause_width = v;
        }
        if let Some(v) = layout.horizontal_column_gap {
            target.horizontal_column_gap = v;
        }
        if let Some(v) = layout.base_bone_length {
            target.base_bone_length = v;
        }
        if let Some(v) = layout.bone_angle_mode {
            target.bone_angle_mode = v;
        }
        if let Some(v) = layout.bone_angle_deg {
            target.bone_angle_deg = v;
        }
        if let Some(v) = layout.min_bone_angle_deg {
            target.min_bone_angle_deg = v;
        }
        if let Some(v) = layout.max_bone_angle_deg {
            target.max_bone_angle_deg = v;
        }
        if let Some(v) = layout.label_line_height {
            target.label_line_height = v;
        }
        if let Some(v) = layout.max_label_lines {
            target.max_label_lines = v;
        }
        if let Some(v) = layout.label_padding_y {
            target.label_padding_y = v;
        }
        if let Some(v) = layout.approx_char_width {
            target.approx_char_width = v;
        }
        if let Some(v) = layout.label_base_offset {
            target.label_base_offset = v;
        }
        if let Some(v) = layout.min_gap {
            target.min_gap = v;
        }
        if let Some(v) = layout.connector_shelf {
            target.connector_shelf = v;
        }
        if let Some(v) = layout.connector_gap {
            target.connector_gap = v;
        }
        if let Some(v) = layout.bone_clearance_margin {
            target.bone_clearance_margin = v;
        }
        if let Some(v) = layout.pack_margin {
            target.pack_margin = v;
        }
        if let Some(v) = layout.level_padding {
            target.level_padding = v;
        }
        if let Some(v) = layout.spine_start_y_offset {
            target.spine_start_y_offset = v;
        }
        if let Some(v) = layout.min_canvas_height {
            target.min_canvas_height = v;
        }
    }

    if let Some(viewport) = parsed.viewport {
        let target = &mut config.viewport;
        if let Some(v) = viewport.zoom_in_factor {
            target.zoom_in_factor = v;
        }
        if let Some(v) = viewport.zoom_out_factor {
            target.zoom_out_factor = v;
        }
        if let Some(v) = viewport.wheel_in_factor {
            target.wheel_in_factor = v;
        }
        if let Some(v) = viewport.wheel_out_factor {
            target.wheel_out_factor = v;
        }
        if let Some(v) = viewport.min_width_divisor {
            target.min_width_divisor = v;
        }
        if let Some(v) = viewport.max_width_multiplier {
            target.max_width_multiplier = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_matches_reference_constants() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.fixed_cause_width, 240.0);
        assert_eq!(layout.base_bone_length, 80.0);
        assert_eq!(layout.bone_angle_deg, 45.0);
        assert_eq!(layout.anti_collision_step(), 28.0);
    }

    #[test]
    fn config_file_overlays_defaults() {
        let file = tempfile_path("fishbone-config-overlay.json5");
        let mut handle = std::fs::File::create(&file.0).unwrap();
        // json5: comments are accepted
        write!(
            handle,
            "{{ layout: {{ boneAngleDeg: 60, minGap: 12 }}, theme: {{ name: 'monochrome' }} }}"
        )
        .unwrap();
        drop(handle);

        let config = load_config(Some(file.0.as_path())).unwrap();
        assert_eq!(config.layout.bone_angle_deg, 60.0);
        assert_eq!(config.layout.min_gap, 12.0);
        assert_eq!(config.theme.spine_color, "#000000");
        // untouched values stay at defaults
        assert_eq!(config.layout.fixed_cause_width, 240.0);
        file.cleanup();
    }

    struct TempFile(std::path::PathBuf);

    impl TempFile {
        fn cleanup(self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn tempfile_path(name: &str) -> TempFile {
        TempFile(std::env::temp_dir().join(name))
    }
}
