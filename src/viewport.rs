//! Pan/zoom view rectangle over the fixed-size canvas. Pure coordinate
//! transform: nothing here feeds back into layout, so layout tests never
//! depend on viewport state.

use crate::config::ViewportConfig;

#[derive(Debug, Clone, Copy)]
struct PanState {
    start_screen: (f32, f32),
    start_view: (f32, f32),
}

#[derive(Debug, Clone)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    canvas_width: f32,
    canvas_height: f32,
    config: ViewportConfig,
    pan: Option<PanState>,
}

impl Viewport {
    pub fn new(canvas_width: f32, canvas_height: f32, config: ViewportConfig) -> Self {
        let mut viewport = Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            canvas_width,
            canvas_height,
            config,
            pan: None,
        };
        viewport.reset();
        viewport
    }

    /// Adopts new canvas bounds after a re-layout. An untouched (full
    /// canvas) view follows the new bounds; a panned/zoomed one is left
    /// where the user put it.
    pub fn set_canvas(&mut self, canvas_width: f32, canvas_height: f32) {
        let untouched = self.x == 0.0
            && self.y == 0.0
            && self.width == self.canvas_width
            && self.height == self.canvas_height;
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        if untouched || self.width == 0.0 || self.height == 0.0 {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.width = self.canvas_width;
        self.height = self.canvas_height;
    }

    /// Scales the view rectangle by `factor`, re-centered on `anchor`
    /// (view-space) or the viewport center. Width is clamped to
    /// [canvas/6, canvas*1.5]; height follows by aspect ratio.
    pub fn zoom(&mut self, factor: f32, anchor: Option<(f32, f32)>) {
        if self.canvas_width <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
            return;
        }
        let min_w = self.canvas_width / self.config.min_width_divisor;
        let max_w = self.canvas_width * self.config.max_width_multiplier;
        let aspect = self.canvas_height / self.canvas_width;
        let (cx, cy) = anchor.unwrap_or((self.x + self.width / 2.0, self.y + self.height / 2.0));
        let new_w = (self.width * factor).clamp(min_w, max_w);
        let new_h = (self.height * factor).clamp(min_w * aspect, max_w * aspect);
        self.x = cx - (cx - self.x) * (new_w / self.width);
        self.y = cy - (cy - self.y) * (new_h / self.height);
        self.width = new_w;
        self.height = new_h;
    }

    pub fn zoom_in(&mut self) {
        self.zoom(self.config.zoom_in_factor, None);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(self.config.zoom_out_factor, None);
    }

    /// Wheel zoom anchored at the cursor. `cursor` and `screen` are in
    /// screen pixels; a negative delta zooms in.
    pub fn wheel(&mut self, delta_y: f32, cursor: (f32, f32), screen: (f32, f32)) {
        if screen.0 <= 0.0 || screen.1 <= 0.0 {
            return;
        }
        let anchor = (
            cursor.0 / screen.0 * self.width + self.x,
            cursor.1 / screen.1 * self.height + self.y,
        );
        let factor = if delta_y < 0.0 {
            self.config.wheel_in_factor
        } else {
            self.config.wheel_out_factor
        };
        self.zoom(factor, Some(anchor));
    }

    pub fn begin_pan(&mut self, screen_point: (f32, f32)) {
        self.pan = Some(PanState {
            start_screen: screen_point,
            start_view: (self.x, self.y),
        });
    }

    /// Drag update: screen pixel deltas convert to view units through the
    /// current scale ratio.
    pub fn pan_to(&mut self, screen_point: (f32, f32), screen: (f32, f32)) {
        let Some(pan) = self.pan else {
            return;
        };
        if screen.0 <= 0.0 || screen.1 <= 0.0 {
            return;
        }
        let dx = (screen_point.0 - pan.start_screen.0) / screen.0 * self.width;
        let dy = (screen_point.1 - pan.start_screen.1) / screen.1 * self.height;
        self.x = pan.start_view.0 - dx;
        self.y = pan.start_view.1 - dy;
    }

    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// The SVG `viewBox` attribute value for the current view.
    pub fn view_box(&self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}
