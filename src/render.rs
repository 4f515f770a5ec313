use std::path::Path;

use anyhow::Result;

use crate::config::LayoutConfig;
use crate::ir::Diagram;
use crate::layout::{self, FishboneLayout};
use crate::theme::Theme;
use crate::viewport::Viewport;

const SPINE_STROKE_WIDTH: f32 = 4.0;
const BONE_STROKE_WIDTH: f32 = 2.5;
const CONNECTOR_STROKE_WIDTH: f32 = 1.5;
const PRIORITY_BAR_WIDTH: f32 = 4.0;
const LABEL_CORNER_RADIUS: f32 = 8.0;
const LABEL_PADDING_X: f32 = 6.0;
const LABEL_PADDING_Y: f32 = 6.0;

/// Emits the diagram as a standalone SVG document. A viewport, when given,
/// only changes the `viewBox`; geometry is untouched.
pub fn render_svg(
    layout: &FishboneLayout,
    diagram: &Diagram,
    theme: &Theme,
    config: &LayoutConfig,
    viewport: Option<&Viewport>,
) -> String {
    let width = layout.canvas_width;
    let height = layout.canvas_height;
    let view_box = viewport
        .map(|vp| vp.view_box())
        .unwrap_or_else(|| format!("0 0 {width} {height}"));

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{view_box}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    // main spine
    svg.push_str(&format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>",
        layout.spine.start_x,
        layout.spine.y,
        layout.spine.end_x,
        layout.spine.y,
        theme.spine_color,
        SPINE_STROKE_WIDTH
    ));

    // problem statement above the spine's head
    let problem = if diagram.problem_statement.is_empty() {
        "Add Problem Statement"
    } else {
        diagram.problem_statement.as_str()
    };
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" fill=\"{}\" font-family=\"{}\" font-size=\"18\" font-weight=\"800\" text-anchor=\"middle\">{}</text>",
        layout.problem_box.x + layout.problem_box.width / 2.0,
        layout.spine.y - 10.0,
        theme.text_color,
        theme.font_family,
        escape_xml(problem)
    ));

    for bone in &layout.bones {
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>",
            bone.start.0,
            bone.start.1,
            bone.end.0,
            bone.end.1,
            bone.color,
            BONE_STROKE_WIDTH
        ));
        let title = diagram
            .category(&bone.category_id)
            .map(|cat| cat.title.as_str())
            .unwrap_or("");
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" fill=\"{}\" font-family=\"{}\" font-size=\"12\" font-weight=\"700\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
            bone.title_pos.0,
            bone.title_pos.1,
            theme.text_color,
            theme.font_family,
            escape_xml(title)
        ));
    }

    for connector in &layout.connectors {
        svg.push_str(&format!(
            "<path d=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\" stroke-linecap=\"round\" fill=\"none\"/>",
            connector.path, theme.connector_color, CONNECTOR_STROKE_WIDTH
        ));
    }

    // labels are drawn last so connectors route underneath them
    let chars_per_line = layout::text::chars_per_line(
        config.fixed_cause_width - LABEL_PADDING_X * 2.0 - PRIORITY_BAR_WIDTH,
        config.approx_char_width,
        config.min_chars_per_line,
    );
    for category in &diagram.categories {
        for cause in &category.causes {
            let Some(rect) = layout.causes.get(&cause.id) else {
                continue;
            };
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{}\" fill=\"{}\" stroke=\"{}\"/>",
                rect.x, rect.y, rect.width, rect.height, LABEL_CORNER_RADIUS, theme.label_fill, theme.label_border
            ));
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{}\" height=\"{:.2}\" fill=\"{}\"/>",
                rect.x,
                rect.y,
                PRIORITY_BAR_WIDTH,
                rect.height,
                theme.priority_color(cause.priority)
            ));
            // line budget comes from the measured box, so text never
            // overflows a label laid out from a different estimate
            let line_budget = (((rect.height - config.label_padding_y) / config.label_line_height)
                .floor() as usize)
                .max(1);
            let mut lines = layout::wrap_label(&cause.text, chars_per_line, line_budget);
            if layout::text::needs_clamp(&cause.text, chars_per_line, line_budget)
                && let Some(last) = lines.last_mut()
            {
                last.push('…');
            }
            for (idx, line) in lines.iter().enumerate() {
                svg.push_str(&format!(
                    "<text x=\"{:.2}\" y=\"{:.2}\" fill=\"{}\" font-family=\"{}\" font-size=\"{}\">{}</text>",
                    rect.x + PRIORITY_BAR_WIDTH + LABEL_PADDING_X,
                    rect.y + LABEL_PADDING_Y + config.label_line_height * (idx as f32 + 1.0) - 3.0,
                    theme.text_color,
                    theme.font_family,
                    theme.font_size,
                    escape_xml(line)
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, fallback_size: (f32, f32)) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(fallback_size.0, fallback_size.1)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewportConfig;
    use crate::ir::Priority;
    use crate::layout::{EstimatedMeasurer, compute_layout};

    fn sample() -> (Diagram, FishboneLayout, Theme, LayoutConfig) {
        let theme = Theme::default_light();
        let config = LayoutConfig::default();
        let mut diagram = Diagram::new();
        let cat = diagram.add_category("Methods", &theme.category_colors);
        diagram.add_cause(&cat, "No standard procedure", Priority::Critical);
        let mut measurer = EstimatedMeasurer::new(&config);
        let layout = compute_layout(&diagram, &config, &mut measurer).unwrap();
        (diagram, layout, theme, config)
    }

    #[test]
    fn render_produces_valid_svg_with_content() {
        let (diagram, layout, theme, config) = sample();
        let svg = render_svg(&layout, &diagram, &theme, &config, None);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Methods"));
        assert!(svg.contains("No standard procedure"));
        // critical priority bar color
        assert!(svg.contains(&theme.critical_color));
    }

    #[test]
    fn viewport_changes_only_the_view_box() {
        let (diagram, layout, theme, config) = sample();
        let plain = render_svg(&layout, &diagram, &theme, &config, None);
        let mut viewport = Viewport::new(
            layout.canvas_width,
            layout.canvas_height,
            ViewportConfig::default(),
        );
        viewport.zoom_in();
        let zoomed = render_svg(&layout, &diagram, &theme, &config, Some(&viewport));
        assert_ne!(plain, zoomed);
        let strip = |s: &str| s.split_once('>').map(|(_, rest)| rest.to_string());
        assert_eq!(strip(&plain), strip(&zoomed));
    }

    #[test]
    fn empty_problem_statement_renders_placeholder() {
        let theme = Theme::default_light();
        let config = LayoutConfig::default();
        let diagram = Diagram::new();
        let mut measurer = EstimatedMeasurer::new(&config);
        let layout = compute_layout(&diagram, &config, &mut measurer).unwrap();
        let svg = render_svg(&layout, &diagram, &theme, &config, None);
        assert!(svg.contains("Add Problem Statement"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let theme = Theme::default_light();
        let config = LayoutConfig::default();
        let mut diagram = Diagram::new();
        let cat = diagram.add_category("R&D <lab>", &theme.category_colors);
        diagram.add_cause(&cat, "a < b", Priority::Low);
        let mut measurer = EstimatedMeasurer::new(&config);
        let layout = compute_layout(&diagram, &config, &mut measurer).unwrap();
        let svg = render_svg(&layout, &diagram, &theme, &config, None);
        assert!(svg.contains("R&amp;D &lt;lab&gt;"));
        assert!(svg.contains("a &lt; b"));
    }
}
