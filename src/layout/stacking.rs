//! Level-based label stacking. Each side of the spine carries one shared
//! set of level slots keyed by cause index, so the nth cause of every
//! category on that side aligns to the same horizontal band. Slot height
//! is the tallest nth label on the side; shorter labels align to the band
//! edge nearer the spine and leave slack at the outward edge.

use crate::config::LayoutConfig;
use crate::ir::{Diagram, Side};

/// Candidate vertical centers per category per cause, before collision
/// resolution.
pub fn stack_levels(
    diagram: &Diagram,
    config: &LayoutConfig,
    spine_y: f32,
    heights: &[Vec<f32>],
) -> Vec<Vec<f32>> {
    let top_slots = slot_heights(diagram, heights, Side::Top);
    let bottom_slots = slot_heights(diagram, heights, Side::Bottom);
    let top_edges = top_level_edges(&top_slots, spine_y, config);
    let bottom_edges = bottom_level_edges(&bottom_slots, spine_y, config);

    diagram
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let side = Side::of_index(i);
            let edges = if side.is_top() { &top_edges } else { &bottom_edges };
            category
                .causes
                .iter()
                .enumerate()
                .map(|(j, _)| edges[j] + heights[i][j] / 2.0)
                .collect()
        })
        .collect()
}

fn slot_heights(diagram: &Diagram, heights: &[Vec<f32>], side: Side) -> Vec<f32> {
    let mut slots: Vec<f32> = Vec::new();
    for (i, category) in diagram.categories.iter().enumerate() {
        if Side::of_index(i) != side {
            continue;
        }
        for (j, _) in category.causes.iter().enumerate() {
            let h = heights[i][j];
            if j >= slots.len() {
                slots.resize(j + 1, 0.0);
            }
            slots[j] = slots[j].max(h);
        }
    }
    slots
}

/// Top-side bands stack upward: the cursor starts one offset above the
/// spine and each band's top edge lands a slot height further out.
fn top_level_edges(slots: &[f32], spine_y: f32, config: &LayoutConfig) -> Vec<f32> {
    let mut cursor = spine_y - config.spine_start_y_offset;
    slots
        .iter()
        .map(|h| {
            let edge = cursor - h;
            cursor -= h + config.level_padding;
            edge
        })
        .collect()
}

fn bottom_level_edges(slots: &[f32], spine_y: f32, config: &LayoutConfig) -> Vec<f32> {
    let mut cursor = spine_y + config.spine_start_y_offset;
    slots
        .iter()
        .map(|h| {
            let edge = cursor;
            cursor += h + config.level_padding;
            edge
        })
        .collect()
}
