use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::ir::Diagram;
use crate::layout::FishboneLayout;

/// Flat JSON view of a computed layout, for debugging and diffing runs.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub spine_y: f32,
    pub spine_start_x: f32,
    pub spine_end_x: f32,
    pub bones: Vec<BoneDump>,
    pub causes: Vec<CauseDump>,
}

#[derive(Debug, Serialize)]
pub struct BoneDump {
    pub category_id: String,
    pub title: String,
    pub side: String,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub length: f32,
    pub angle_deg: f32,
}

#[derive(Debug, Serialize)]
pub struct CauseDump {
    pub id: String,
    pub text: String,
    pub priority: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub connector: Option<String>,
}

impl LayoutDump {
    pub fn from_layout(layout: &FishboneLayout, diagram: &Diagram) -> Self {
        let bones = layout
            .bones
            .iter()
            .map(|bone| BoneDump {
                category_id: bone.category_id.clone(),
                title: diagram
                    .category(&bone.category_id)
                    .map(|cat| cat.title.clone())
                    .unwrap_or_default(),
                side: format!("{:?}", bone.side),
                start: [bone.start.0, bone.start.1],
                end: [bone.end.0, bone.end.1],
                length: bone.length,
                angle_deg: bone.angle_deg,
            })
            .collect();

        let mut causes = Vec::new();
        for category in &diagram.categories {
            for cause in &category.causes {
                let Some(rect) = layout.causes.get(&cause.id) else {
                    continue;
                };
                let connector = layout
                    .connectors
                    .iter()
                    .find(|connector| connector.cause_id == cause.id)
                    .map(|connector| connector.path.clone());
                causes.push(CauseDump {
                    id: cause.id.clone(),
                    text: cause.text.clone(),
                    priority: format!("{:?}", cause.priority),
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    connector,
                });
            }
        }

        LayoutDump {
            canvas_width: layout.canvas_width,
            canvas_height: layout.canvas_height,
            spine_y: layout.spine.y,
            spine_start_x: layout.spine.start_x,
            spine_end_x: layout.spine.end_x,
            bones,
            causes,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &FishboneLayout,
    diagram: &Diagram,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, diagram);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
