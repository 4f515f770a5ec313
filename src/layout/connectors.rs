//! Orthogonal connector routing: a three-segment H/V/H path from the
//! cause's anchor on its bone to the near edge of its label box. The
//! vertical riser sits a fixed inset left of the anchor so connectors
//! never cross their bone at arbitrary angles.

use crate::config::LayoutConfig;
use crate::ir::Rect;

pub fn route(anchor_x: f32, anchor_y: f32, label: &Rect, config: &LayoutConfig) -> String {
    let elbow_x = anchor_x - config.connector_elbow_inset;
    format!(
        "M {:.2} {:.2} H {:.2} V {:.2} H {:.2}",
        anchor_x,
        anchor_y,
        elbow_x,
        label.center_y(),
        label.right()
    )
}
