//! Collision resolution. Two passes, applied in order after stacking:
//!
//! 1. Bone avoidance: every label's span is checked against the Y-extent
//!    of every bone; the label center is clamped so the box plus a safety
//!    margin never crosses the limiting bone on its side.
//! 2. Outward packing: per side, labels are re-sorted by proximity to the
//!    spine and walked outward, pushing each one past its inward neighbor.
//!
//! Both passes are global; there is no incremental update.

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::ir::{Diagram, Side};

use super::bones::BoneLayout;

struct Item {
    cause_id: String,
    center: f32,
    height: f32,
}

pub fn resolve(
    diagram: &Diagram,
    config: &LayoutConfig,
    bones: &[BoneLayout],
    spine_y: f32,
    heights: &[Vec<f32>],
    candidates: &[Vec<f32>],
) -> BTreeMap<String, f32> {
    let mut top: Vec<Item> = Vec::new();
    let mut bottom: Vec<Item> = Vec::new();

    for (i, category) in diagram.categories.iter().enumerate() {
        let bone = &bones[i];
        let side = Side::of_index(i);
        for (j, cause) in category.causes.iter().enumerate() {
            let (ax, _) = bone.anchors[j];
            let height = heights[i][j];
            let width = config.fixed_cause_width;
            let left = ax - (config.connector_shelf + width);
            let right = ax - config.connector_gap;

            let limit = bone_limit(bones, left, right, side);
            let mut center = candidates[i][j];
            if side.is_top() {
                center = center.min(limit - config.bone_clearance_margin - height / 2.0);
            } else {
                center = center.max(limit + config.bone_clearance_margin + height / 2.0);
            }

            let item = Item {
                cause_id: cause.id.clone(),
                center,
                height,
            };
            if center < spine_y {
                top.push(item);
            } else {
                bottom.push(item);
            }
        }
    }

    pack_outward(&mut top, Side::Top, config.pack_margin);
    pack_outward(&mut bottom, Side::Bottom, config.pack_margin);

    let mut centers = BTreeMap::new();
    for item in top.into_iter().chain(bottom) {
        centers.insert(item.cause_id, item.center);
    }
    centers
}

/// The limiting bone Y over a horizontal span: every bone is sampled at
/// the span's (clamped) endpoints; the top side takes the minimum, the
/// bottom the maximum.
fn bone_limit(bones: &[BoneLayout], left: f32, right: f32, side: Side) -> f32 {
    let mut limit = if side.is_top() {
        f32::INFINITY
    } else {
        f32::NEG_INFINITY
    };
    for bone in bones {
        let at_left = bone.y_at_x_clamped(left);
        let at_right = bone.y_at_x_clamped(right);
        let candidate = if side.is_top() {
            at_left.min(at_right)
        } else {
            at_left.max(at_right)
        };
        if side.is_top() {
            limit = limit.min(candidate);
        } else {
            limit = limit.max(candidate);
        }
    }
    limit
}

/// Packs one side from the spine outward: sort by proximity to the spine,
/// then push each label past its inward neighbor when their boxes would
/// come closer than the margin.
fn pack_outward(items: &mut [Item], side: Side, margin: f32) {
    if side.is_top() {
        items.sort_by(|a, b| b.center.total_cmp(&a.center));
    } else {
        items.sort_by(|a, b| a.center.total_cmp(&b.center));
    }
    for k in 1..items.len() {
        let prev_center = items[k - 1].center;
        let prev_half = items[k - 1].height / 2.0;
        let cur = &mut items[k];
        if side.is_top() {
            let allowed_bottom = prev_center - prev_half - margin;
            if cur.center + cur.height / 2.0 > allowed_bottom {
                cur.center = allowed_bottom - cur.height / 2.0;
            }
        } else {
            let allowed_top = prev_center + prev_half + margin;
            if cur.center - cur.height / 2.0 < allowed_top {
                cur.center = allowed_top + cur.height / 2.0;
            }
        }
    }
}
