use std::path::Path;

use fishbone_rs_renderer::{
    Diagram, EstimatedMeasurer, Fishbone, LayoutConfig, Priority, Theme, compute_layout,
    render_svg,
};

fn fixture_path(rel: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel)
}

fn load_fixture(rel: &str) -> Diagram {
    let input = std::fs::read_to_string(fixture_path(rel)).expect("fixture read failed");
    Diagram::from_json(&input).expect("fixture parse failed")
}

fn layout_fixture(rel: &str) -> (Diagram, fishbone_rs_renderer::FishboneLayout) {
    let config = LayoutConfig::default();
    let diagram = load_fixture(rel);
    let mut measurer = EstimatedMeasurer::new(&config);
    let layout = compute_layout(&diagram, &config, &mut measurer).expect("layout failed");
    (diagram, layout)
}

// Keep this list explicit so new fixtures must be added intentionally.
const FIXTURES: [&str; 5] = [
    "basic.json",
    "dense.json",
    "empty.json",
    "long_labels.json",
    "single_category.json",
];

#[test]
fn render_all_fixtures() {
    let theme = Theme::default_light();
    let config = LayoutConfig::default();
    for rel in FIXTURES {
        assert!(fixture_path(rel).exists(), "fixture missing: {rel}");
        let (diagram, layout) = layout_fixture(rel);
        let svg = render_svg(&layout, &diagram, &theme, &config, None);
        assert!(svg.contains("<svg"), "{rel}: missing <svg tag");
        assert!(svg.contains("</svg>"), "{rel}: missing </svg tag");
    }
}

#[test]
fn same_side_labels_never_overlap() {
    for rel in FIXTURES {
        let (_, layout) = layout_fixture(rel);
        let spine_y = layout.spine.y;
        let mut top: Vec<(f32, f32)> = Vec::new();
        let mut bottom: Vec<(f32, f32)> = Vec::new();
        for rect in layout.causes.values() {
            let span = (rect.y, rect.bottom());
            if rect.center_y() < spine_y {
                top.push(span);
            } else {
                bottom.push(span);
            }
        }
        for side in [&mut top, &mut bottom] {
            side.sort_by(|a, b| a.0.total_cmp(&b.0));
            for pair in side.windows(2) {
                assert!(
                    pair[1].0 >= pair[0].1 - 1e-3,
                    "{rel}: labels overlap: {pair:?}"
                );
            }
        }
    }
}

#[test]
fn labels_never_cross_a_bone_within_their_span() {
    for rel in FIXTURES {
        let (_, layout) = layout_fixture(rel);
        for (cause_id, rect) in &layout.causes {
            for bone in &layout.bones {
                let bone_min_x = bone.start.0.min(bone.end.0);
                let bone_max_x = bone.start.0.max(bone.end.0);
                let left = rect.x.max(bone_min_x);
                let right = rect.right().min(bone_max_x);
                if left >= right {
                    continue;
                }
                // the bone is a straight segment: its Y range over the
                // overlap is bounded by the endpoint samples
                let y_a = bone.y_at_x(left);
                let y_b = bone.y_at_x(right);
                let (bone_lo, bone_hi) = (y_a.min(y_b), y_a.max(y_b));
                let crosses = bone_hi > rect.y + 1e-3 && bone_lo < rect.bottom() - 1e-3;
                assert!(
                    !crosses,
                    "{rel}: bone {} crosses label {cause_id}: bone [{bone_lo}, {bone_hi}] vs label [{}, {}]",
                    bone.category_id,
                    rect.y,
                    rect.bottom()
                );
            }
        }
    }
}

#[test]
fn layout_is_byte_identical_across_runs() {
    for rel in FIXTURES {
        let config = LayoutConfig::default();
        let diagram = load_fixture(rel);
        let mut measurer = EstimatedMeasurer::new(&config);
        let first = compute_layout(&diagram, &config, &mut measurer).unwrap();
        let second = compute_layout(&diagram, &config, &mut measurer).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap(),
            "{rel}: layout not deterministic"
        );
    }
}

#[test]
fn adding_a_cause_never_shrinks_the_canvas() {
    let config = LayoutConfig::default();
    let base = load_fixture("basic.json");
    let mut measurer = EstimatedMeasurer::new(&config);
    let before = compute_layout(&base, &config, &mut measurer).unwrap();

    for category in &base.categories {
        let mut grown = base.clone();
        grown
            .add_cause(&category.id, "an additional contributing cause", Priority::Medium)
            .unwrap();
        let after = compute_layout(&grown, &config, &mut measurer).unwrap();
        assert!(
            after.canvas_height >= before.canvas_height,
            "canvas height shrank when growing {}",
            category.title
        );
    }

    // widening: the column's bone only stretches when its longest member
    // grows, so add to the category with the most causes in its column
    let widest = base
        .categories
        .iter()
        .max_by_key(|cat| cat.causes.len())
        .unwrap();
    let mut grown = base.clone();
    grown
        .add_cause(&widest.id, "one more", Priority::Low)
        .unwrap();
    let after = compute_layout(&grown, &config, &mut measurer).unwrap();
    assert!(after.canvas_width >= before.canvas_width);
}

#[test]
fn methods_and_materials_scenario() {
    let config = LayoutConfig::default();
    let (diagram, layout) = layout_fixture("basic.json");

    // "Methods" (2 causes) stretches by one step; "Materials" stays at base
    let methods = &layout.bones[0];
    let materials = &layout.bones[1];
    assert_eq!(methods.length, 80.0 + 28.0);
    assert_eq!(materials.length, 80.0);

    // index parity decides the side
    assert!(methods.side.is_top());
    assert!(!materials.side.is_top());
    assert!(methods.end.1 < layout.spine.y);
    assert!(materials.end.1 > layout.spine.y);

    // the two Methods causes are stacked with at least the minimum gap
    let a = &layout.causes[&diagram.categories[0].causes[0].id];
    let b = &layout.causes[&diagram.categories[0].causes[1].id];
    let separation = (a.center_y() - b.center_y()).abs();
    assert!(
        separation >= a.height / 2.0 + config.min_gap + b.height / 2.0,
        "stacked centers too close: {separation}"
    );
}

#[test]
fn zero_cause_diagram_uses_minimum_canvas_and_no_connectors() {
    let config = LayoutConfig::default();
    let (_, layout) = layout_fixture("single_category.json");
    assert_eq!(layout.canvas_height, config.min_canvas_height);
    assert!(layout.connectors.is_empty());
    // the empty category still reserves its base bone length
    assert_eq!(layout.bones[0].length, config.base_bone_length);
}

#[test]
fn deleting_the_only_cause_reverts_bone_length() {
    let theme = Theme::default_light();
    let mut engine = Fishbone::new(LayoutConfig::default(), &theme);
    let cat = engine.add_category("Machines");
    let cause = engine
        .add_cause(&cat, "bearing wear on the main drive", Priority::High)
        .unwrap();
    engine.layout_pass();
    let with_cause = engine.layout().unwrap();
    assert_eq!(with_cause.bones[0].length, 80.0);
    assert!(with_cause.causes.contains_key(&cause));

    engine.delete_cause(&cat, &cause);
    engine.layout_pass();
    let without = engine.layout().unwrap();
    assert_eq!(without.bones[0].length, 80.0);
    assert!(!without.causes.contains_key(&cause));

    // two causes stretch the bone; dropping back to one reverts it
    let c1 = engine.add_cause(&cat, "first", Priority::Low).unwrap();
    engine.add_cause(&cat, "second", Priority::Low).unwrap();
    assert_eq!(engine.layout_pass().unwrap().bones[0].length, 108.0);
    engine.delete_cause(&cat, &c1);
    assert_eq!(engine.layout_pass().unwrap().bones[0].length, 80.0);
}

#[test]
fn export_import_round_trip_is_equivalent() {
    let theme = Theme::default_light();
    let mut engine = Fishbone::new(LayoutConfig::default(), &theme);
    engine.set_problem_statement("Low first-pass yield");
    let cat = engine.add_category("Measurements");
    engine.add_cause(&cat, "gauge not calibrated", Priority::Critical);
    engine.add_cause(&cat, "sampling plan too sparse", Priority::Medium);
    // run a pass so exported causes carry layout caches
    engine.layout_pass();
    let exported = engine.to_json().unwrap();

    let mut other = Fishbone::new(LayoutConfig::default(), &theme);
    other.import_json(&exported).unwrap();
    let a = engine.diagram();
    let b = other.diagram();
    assert_eq!(a.problem_statement, b.problem_statement);
    assert_eq!(a.categories.len(), b.categories.len());
    for (ca, cb) in a.categories.iter().zip(&b.categories) {
        assert_eq!(ca.title, cb.title);
        assert_eq!(ca.causes.len(), cb.causes.len());
        for (xa, xb) in ca.causes.iter().zip(&cb.causes) {
            assert_eq!(xa.text, xb.text);
            assert_eq!(xa.priority, xb.priority);
        }
    }
    // caches are recomputed, not trusted: the re-imported diagram lays out
    let relaid = other.layout_pass().unwrap();
    assert_eq!(relaid.causes.len(), a.cause_count());
}

#[test]
fn cause_rects_stay_inside_the_canvas() {
    for rel in FIXTURES {
        let (_, layout) = layout_fixture(rel);
        for (cause_id, rect) in &layout.causes {
            assert!(rect.x >= 0.0, "{rel}: {cause_id} spills left");
            assert!(
                rect.right() <= layout.canvas_width + 1e-3,
                "{rel}: {cause_id} spills right"
            );
        }
    }
}
