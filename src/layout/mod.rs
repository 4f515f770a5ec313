pub mod bones;
pub mod collision;
pub mod connectors;
pub mod stacking;
pub mod text;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::error::FishboneError;
use crate::ir::{Diagram, Rect, Side};

pub use bones::BoneLayout;
pub use text::wrap_label;

/// Extra room past a side's deepest label before the canvas margin.
const SIDE_TAIL: f32 = 16.0;
/// Breathing room between the two side depths in the total height.
const TOTAL_TAIL: f32 = 20.0;
const PROBLEM_BOX_INSET: f32 = 20.0;
const CANVAS_RIGHT_PADDING: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelMetrics {
    pub width: f32,
    pub height: f32,
}

/// Injected text-measurement capability. A `None` result means "not yet
/// measurable"; the layout pass defers rather than guessing.
pub trait LabelMeasurer {
    fn measure(&mut self, text: &str, max_width: f32) -> Option<LabelMetrics>;
}

/// Pure per-character estimator. Deterministic, host-independent, and the
/// default for layout: line count from text length over a fixed per-line
/// character budget, clamped to the collapsed line limit.
#[derive(Debug, Clone)]
pub struct EstimatedMeasurer {
    approx_char_width: f32,
    min_chars_per_line: usize,
    max_label_lines: usize,
    label_line_height: f32,
    label_padding_y: f32,
}

impl EstimatedMeasurer {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            approx_char_width: config.approx_char_width,
            min_chars_per_line: config.min_chars_per_line,
            max_label_lines: config.max_label_lines,
            label_line_height: config.label_line_height,
            label_padding_y: config.label_padding_y,
        }
    }

    fn chars_per_line(&self, max_width: f32) -> usize {
        text::chars_per_line(max_width, self.approx_char_width, self.min_chars_per_line)
    }
}

impl LabelMeasurer for EstimatedMeasurer {
    fn measure(&mut self, text: &str, max_width: f32) -> Option<LabelMetrics> {
        let cpl = self.chars_per_line(max_width);
        let lines = text::clamped_line_count(text, cpl, self.max_label_lines);
        Some(LabelMetrics {
            width: max_width,
            height: lines as f32 * self.label_line_height + self.label_padding_y,
        })
    }
}

/// Measures with the system font via `text_metrics`, falling back to the
/// estimator when no face resolves. Character budgets come from the actual
/// average glyph width instead of the fixed approximation.
#[derive(Debug, Clone)]
pub struct FontMeasurer {
    font_family: String,
    font_size: f32,
    fallback: EstimatedMeasurer,
}

impl FontMeasurer {
    pub fn new(font_family: &str, font_size: f32, config: &LayoutConfig) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size,
            fallback: EstimatedMeasurer::new(config),
        }
    }
}

impl LabelMeasurer for FontMeasurer {
    fn measure(&mut self, text: &str, max_width: f32) -> Option<LabelMetrics> {
        let avg = crate::text_metrics::average_char_width(&self.font_family, self.font_size);
        match avg {
            Some(avg) if avg > 0.0 => {
                let cpl = text::chars_per_line(max_width, avg, self.fallback.min_chars_per_line);
                let lines = text::clamped_line_count(text, cpl, self.fallback.max_label_lines);
                Some(LabelMetrics {
                    width: max_width,
                    height: lines as f32 * self.fallback.label_line_height
                        + self.fallback.label_padding_y,
                })
            }
            _ => self.fallback.measure(text, max_width),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpineLayout {
    pub start_x: f32,
    pub end_x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProblemBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectorLayout {
    pub cause_id: String,
    pub path: String,
}

/// The pure output contract consumers render from. Identical diagram state
/// and identical measured label heights produce byte-identical output.
#[derive(Debug, Clone, Serialize)]
pub struct FishboneLayout {
    pub spine: SpineLayout,
    pub problem_box: ProblemBox,
    pub bones: Vec<BoneLayout>,
    pub causes: BTreeMap<String, Rect>,
    pub connectors: Vec<ConnectorLayout>,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

/// Runs the full pipeline: measure, canvas metrics, bone placement, level
/// stacking, two-pass collision resolution, connector routing. Re-run in
/// full after every mutation; there is no incremental path.
pub fn compute_layout(
    diagram: &Diagram,
    config: &LayoutConfig,
    measurer: &mut dyn LabelMeasurer,
) -> Result<FishboneLayout, FishboneError> {
    let heights = measure_all(diagram, config, measurer)?;

    let (top_depth, bottom_depth) = side_depths(diagram, config, &heights);
    let canvas_height = config
        .min_canvas_height
        .max(top_depth + bottom_depth + TOTAL_TAIL);
    let spine_y = canvas_height / 2.0;

    let bones = bones::compute_bones(diagram, config, spine_y, &heights);
    let last_end_x = bones
        .last()
        .map(|bone| bone.end.0)
        .unwrap_or(config.spine_start_x);
    let spine_end_x = last_end_x + config.problem_statement_gap;
    let problem_box = ProblemBox {
        x: spine_end_x + PROBLEM_BOX_INSET,
        y: spine_y - 40.0,
        width: config.problem_statement_width,
        height: 80.0,
    };
    let canvas_width = problem_box.x + config.problem_statement_width + CANVAS_RIGHT_PADDING;

    let candidates = stacking::stack_levels(diagram, config, spine_y, &heights);
    let centers = collision::resolve(diagram, config, &bones, spine_y, &heights, &candidates);

    let mut causes: BTreeMap<String, Rect> = BTreeMap::new();
    let mut connectors = Vec::new();
    for (i, category) in diagram.categories.iter().enumerate() {
        let bone = &bones[i];
        for (j, cause) in category.causes.iter().enumerate() {
            let (ax, ay) = bone.anchors[j];
            let height = heights[i][j];
            let width = config.fixed_cause_width;
            let center = centers
                .get(&cause.id)
                .copied()
                .unwrap_or(spine_y);
            let rect = Rect {
                x: ax - (width + config.connector_shelf + config.connector_gap),
                y: center - height / 2.0,
                width,
                height,
            };
            connectors.push(ConnectorLayout {
                cause_id: cause.id.clone(),
                path: connectors::route(ax, ay, &rect, config),
            });
            causes.insert(cause.id.clone(), rect);
        }
    }

    Ok(FishboneLayout {
        spine: SpineLayout {
            start_x: config.spine_start_x,
            end_x: spine_end_x,
            y: spine_y,
        },
        problem_box,
        bones,
        causes,
        connectors,
        canvas_width,
        canvas_height,
    })
}

fn measure_all(
    diagram: &Diagram,
    config: &LayoutConfig,
    measurer: &mut dyn LabelMeasurer,
) -> Result<Vec<Vec<f32>>, FishboneError> {
    let mut heights = Vec::with_capacity(diagram.categories.len());
    for category in &diagram.categories {
        let mut row = Vec::with_capacity(category.causes.len());
        for cause in &category.causes {
            let metrics = measurer
                .measure(&cause.text, config.fixed_cause_width)
                .ok_or_else(|| FishboneError::MeasurementPending {
                    cause_id: cause.id.clone(),
                })?;
            row.push(metrics.height);
        }
        heights.push(row);
    }
    Ok(heights)
}

/// Deepest stacked label run on each side of the spine, margins included.
/// Canvas height and spine position are pure functions of these depths.
fn side_depths(diagram: &Diagram, config: &LayoutConfig, heights: &[Vec<f32>]) -> (f32, f32) {
    let depth_of = |side: Side| -> f32 {
        let mut max_depth = config.label_base_offset;
        for (i, category) in diagram.categories.iter().enumerate() {
            if Side::of_index(i) != side {
                continue;
            }
            let mut sum = 0.0;
            for (j, _) in category.causes.iter().enumerate() {
                sum += heights[i][j];
                if j > 0 {
                    sum += config.min_gap;
                }
            }
            max_depth = max_depth.max(config.label_base_offset + sum + SIDE_TAIL);
        }
        max_depth + config.canvas_side_margin
    };
    (depth_of(Side::Top), depth_of(Side::Bottom))
}
