use serde::{Deserialize, Serialize};

use crate::ir::Priority;

const CATEGORY_COLORS: [&str; 10] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#ec4899", "#14b8a6",
    "#f97316", "#8b5cf6",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub spine_color: String,
    pub connector_color: String,
    pub label_fill: String,
    pub label_border: String,
    pub text_color: String,
    pub category_colors: Vec<String>,
    pub critical_color: String,
    pub high_color: String,
    pub medium_color: String,
    pub low_color: String,
}

impl Theme {
    pub fn default_light() -> Self {
        Self {
            font_family: "Inter, system-ui, sans-serif".to_string(),
            font_size: 10.0,
            background: "#FFFFFF".to_string(),
            spine_color: "#111827".to_string(),
            connector_color: "#6b7280".to_string(),
            label_fill: "#ffffff".to_string(),
            label_border: "#E5E7EB".to_string(),
            text_color: "#111827".to_string(),
            category_colors: CATEGORY_COLORS.iter().map(|c| c.to_string()).collect(),
            critical_color: "#dc2626".to_string(),
            high_color: "#ea580c".to_string(),
            medium_color: "#ca8a04".to_string(),
            low_color: "#16a34a".to_string(),
        }
    }

    /// Darker strokes and a single-hue bone palette, for print-friendly
    /// exports.
    pub fn monochrome() -> Self {
        Self {
            font_family: "Inter, system-ui, sans-serif".to_string(),
            font_size: 10.0,
            background: "#FFFFFF".to_string(),
            spine_color: "#000000".to_string(),
            connector_color: "#4b5563".to_string(),
            label_fill: "#ffffff".to_string(),
            label_border: "#9ca3af".to_string(),
            text_color: "#000000".to_string(),
            category_colors: vec!["#374151".to_string()],
            critical_color: "#111827".to_string(),
            high_color: "#374151".to_string(),
            medium_color: "#6b7280".to_string(),
            low_color: "#9ca3af".to_string(),
        }
    }

    pub fn priority_color(&self, priority: Priority) -> &str {
        match priority {
            Priority::Critical => &self.critical_color,
            Priority::High => &self.high_color,
            Priority::Medium => &self.medium_color,
            Priority::Low => &self.low_color,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_light()
    }
}
