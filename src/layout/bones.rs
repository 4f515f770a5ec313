//! Bone placement: category bones leave the spine in columns of two
//! (top/bottom pairs share an X), stretch with cause count, and carry the
//! anchor points causes connect to.

use serde::Serialize;

use crate::config::{BoneAngleMode, LayoutConfig};
use crate::ir::{Diagram, Side};

/// Content height where the adaptive angle ramp starts, and its span.
const ADAPTIVE_RAMP_START: f32 = 120.0;
const ADAPTIVE_RAMP_SPAN: f32 = 240.0;

/// Anchors are spread over the middle span of the bone, never at its tips.
const ANCHOR_SPAN_START: f32 = 0.1;
const ANCHOR_SPAN: f32 = 0.8;

const TITLE_OFFSET_Y: f32 = 20.0;

#[derive(Debug, Clone, Serialize)]
pub struct BoneLayout {
    pub category_id: String,
    pub index: usize,
    pub side: Side,
    pub color: String,
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub length: f32,
    /// Signed: negative above the spine.
    pub angle_deg: f32,
    /// One anchor per cause, in cause order.
    pub anchors: Vec<(f32, f32)>,
    pub title_pos: (f32, f32),
}

impl BoneLayout {
    /// Y of the bone line at `x`, extrapolated beyond the bone's extent.
    pub fn y_at_x(&self, x: f32) -> f32 {
        let (x1, y1) = self.start;
        let (x2, y2) = self.end;
        if x2 == x1 {
            return y2;
        }
        let t = (x - x1) / (x2 - x1);
        y1 + t * (y2 - y1)
    }

    /// Y of the bone line at `x` clamped into the bone's X extent.
    pub fn y_at_x_clamped(&self, x: f32) -> f32 {
        let min_x = self.start.0.min(self.end.0);
        let max_x = self.start.0.max(self.end.0);
        self.y_at_x(x.clamp(min_x, max_x))
    }
}

/// Length grows by one anti-collision step per extra cause; a category
/// with no causes still reserves the base length.
pub fn bone_length(cause_count: usize, config: &LayoutConfig) -> f32 {
    let base = config.base_bone_length;
    if cause_count > 1 {
        base + (cause_count - 1) as f32 * config.anti_collision_step()
    } else {
        base
    }
}

fn angle_magnitude(stacked_height: f32, config: &LayoutConfig) -> f32 {
    match config.bone_angle_mode {
        BoneAngleMode::Fixed => config.bone_angle_deg,
        BoneAngleMode::Adaptive => {
            let t = ((stacked_height - ADAPTIVE_RAMP_START) / ADAPTIVE_RAMP_SPAN).clamp(0.0, 1.0);
            let angle =
                config.bone_angle_deg + (config.max_bone_angle_deg - config.bone_angle_deg) * t;
            angle.clamp(config.min_bone_angle_deg, config.max_bone_angle_deg)
        }
    }
}

fn stacked_height(heights: &[f32], config: &LayoutConfig) -> f32 {
    let mut sum = 0.0;
    for (j, h) in heights.iter().enumerate() {
        sum += h;
        if j > 0 {
            sum += config.min_gap;
        }
    }
    sum
}

/// Anchor fraction along the bone for cause `j` of `n`. A lone cause sits
/// at the midpoint.
pub fn anchor_fraction(j: usize, n: usize) -> f32 {
    if n <= 1 {
        0.5
    } else {
        ANCHOR_SPAN_START + ANCHOR_SPAN * (j as f32 / (n - 1) as f32)
    }
}

pub fn compute_bones(
    diagram: &Diagram,
    config: &LayoutConfig,
    spine_y: f32,
    heights: &[Vec<f32>],
) -> Vec<BoneLayout> {
    let mut bones = Vec::with_capacity(diagram.categories.len());
    let mut prev_column_end = config.spine_start_x;

    let mut i = 0;
    while i < diagram.categories.len() {
        let bone_x = prev_column_end + config.fixed_cause_width + config.horizontal_column_gap;
        let mut column_advance = 0.0f32;

        for index in [i, i + 1] {
            let Some(category) = diagram.categories.get(index) else {
                continue;
            };
            let side = Side::of_index(index);
            let length = bone_length(category.causes.len(), config);
            let magnitude = angle_magnitude(stacked_height(&heights[index], config), config);
            let angle_deg = magnitude * side.direction();
            let angle_rad = angle_deg.to_radians();
            let end = (
                bone_x + angle_rad.cos() * length,
                spine_y + angle_rad.sin() * length,
            );
            column_advance = column_advance.max(magnitude.to_radians().cos() * length);

            let n = category.causes.len();
            let mut anchors = Vec::with_capacity(n);
            for j in 0..n {
                let frac = anchor_fraction(j, n);
                let ax = bone_x + (end.0 - bone_x) * frac;
                let mut ay = spine_y + (end.1 - spine_y) * frac;
                // keep anchors strictly off the spine
                if side.is_top() {
                    ay = ay.min(spine_y - 1.0);
                } else {
                    ay = ay.max(spine_y + 1.0);
                }
                anchors.push((ax, ay));
            }

            bones.push(BoneLayout {
                category_id: category.id.clone(),
                index,
                side,
                color: category.color.clone(),
                start: (bone_x, spine_y),
                end,
                length,
                angle_deg,
                anchors,
                title_pos: (end.0, end.1 + TITLE_OFFSET_Y * side.direction()),
            });
        }

        prev_column_end = bone_x + column_advance;
        i += 2;
    }

    bones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Priority;

    fn diagram_with_causes(counts: &[usize]) -> (Diagram, Vec<Vec<f32>>) {
        let palette = vec!["#3b82f6".to_string()];
        let mut diagram = Diagram::new();
        let mut heights = Vec::new();
        for (idx, count) in counts.iter().enumerate() {
            let id = diagram.add_category(&format!("cat{idx}"), &palette);
            for j in 0..*count {
                diagram.add_cause(&id, &format!("cause {j}"), Priority::Medium);
            }
            heights.push(vec![26.0; *count]);
        }
        (diagram, heights)
    }

    #[test]
    fn length_grows_with_cause_count() {
        let config = LayoutConfig::default();
        assert_eq!(bone_length(0, &config), 80.0);
        assert_eq!(bone_length(1, &config), 80.0);
        assert_eq!(bone_length(2, &config), 80.0 + 28.0);
        assert_eq!(bone_length(5, &config), 80.0 + 4.0 * 28.0);
    }

    #[test]
    fn paired_categories_share_bone_x() {
        let config = LayoutConfig::default();
        let (diagram, heights) = diagram_with_causes(&[2, 1, 0]);
        let bones = compute_bones(&diagram, &config, 300.0, &heights);
        assert_eq!(bones[0].start.0, bones[1].start.0);
        assert!(bones[2].start.0 > bones[0].start.0);
    }

    #[test]
    fn columns_advance_by_width_gap_and_projection() {
        let config = LayoutConfig::default();
        let (diagram, heights) = diagram_with_causes(&[0, 0, 0]);
        let bones = compute_bones(&diagram, &config, 300.0, &heights);
        let first_x = config.spine_start_x + config.fixed_cause_width + config.horizontal_column_gap;
        assert_eq!(bones[0].start.0, first_x);
        let projected = 45.0f32.to_radians().cos() * 80.0;
        let second_x = first_x + projected + config.fixed_cause_width + config.horizontal_column_gap;
        assert!((bones[2].start.0 - second_x).abs() < 1e-3);
    }

    #[test]
    fn top_bones_point_up_and_bottom_bones_down() {
        let config = LayoutConfig::default();
        let (diagram, heights) = diagram_with_causes(&[1, 1]);
        let bones = compute_bones(&diagram, &config, 300.0, &heights);
        assert!(bones[0].end.1 < 300.0);
        assert!(bones[1].end.1 > 300.0);
        assert_eq!(bones[0].angle_deg, -45.0);
        assert_eq!(bones[1].angle_deg, 45.0);
    }

    #[test]
    fn anchor_fractions_span_the_middle_of_the_bone() {
        assert_eq!(anchor_fraction(0, 1), 0.5);
        assert_eq!(anchor_fraction(0, 2), 0.1);
        assert!((anchor_fraction(1, 2) - 0.9).abs() < 1e-6);
        assert!((anchor_fraction(1, 3) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn anchors_stay_off_the_spine() {
        let config = LayoutConfig::default();
        let (diagram, heights) = diagram_with_causes(&[3, 3]);
        let bones = compute_bones(&diagram, &config, 300.0, &heights);
        for bone in &bones {
            for (_, ay) in &bone.anchors {
                if bone.side.is_top() {
                    assert!(*ay <= 300.0 - 1.0);
                } else {
                    assert!(*ay >= 300.0 + 1.0);
                }
            }
        }
    }

    #[test]
    fn adaptive_angle_stays_in_bounds() {
        let mut config = LayoutConfig::default();
        config.bone_angle_mode = BoneAngleMode::Adaptive;
        let (diagram, _) = diagram_with_causes(&[8]);
        // dense stacks ramp the angle up, bounded by the configured max
        let heights = vec![vec![60.0; 8]];
        let bones = compute_bones(&diagram, &config, 400.0, &heights);
        let magnitude = bones[0].angle_deg.abs();
        assert!(magnitude >= config.bone_angle_deg);
        assert!(magnitude <= config.max_bone_angle_deg);
    }

    #[test]
    fn y_at_x_interpolates_along_the_bone() {
        let config = LayoutConfig::default();
        let (diagram, heights) = diagram_with_causes(&[1]);
        let bones = compute_bones(&diagram, &config, 300.0, &heights);
        let bone = &bones[0];
        let mid_x = (bone.start.0 + bone.end.0) / 2.0;
        let mid_y = (bone.start.1 + bone.end.1) / 2.0;
        assert!((bone.y_at_x(mid_x) - mid_y).abs() < 1e-3);
        // clamped sampling never leaves the segment
        assert_eq!(bone.y_at_x_clamped(bone.start.0 - 500.0), bone.start.1);
        assert_eq!(bone.y_at_x_clamped(bone.end.0 + 500.0), bone.end.1);
    }
}
