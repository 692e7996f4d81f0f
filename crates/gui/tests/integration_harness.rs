//! Integration tests for the headless viewer harness.
//!
//! Load -> fit -> edges -> parameters -> form edits, end to end against in-memory assets.

use approx::assert_relative_eq;
use glam::Vec3;

use model_viewer_lib::fixtures::{box_glb, multi_primitive_glb, params_json, two_box_glb};
use model_viewer_lib::form::Applied;
use model_viewer_lib::harness::TestHarness;
use model_viewer_lib::state::FetchError;
use shared::Color;

#[test]
fn test_load_recenters_model() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([2.0, 4.0, 6.0], [10.0, 20.0, 30.0]));
    h.add_params("box", &params_json(100.0, 100.0, 100.0, None));

    assert!(h.load("box").model.is_ok());
    let t = h.model_translation().unwrap();
    assert_relative_eq!(t.x, -10.0, epsilon = 1e-4);
    assert_relative_eq!(t.y, -20.0, epsilon = 1e-4);
    assert_relative_eq!(t.z, -30.0, epsilon = 1e-4);
}

#[test]
fn test_camera_framing_distance() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([100.0, 100.0, 100.0], [0.0; 3]));
    h.load("box");

    let camera = &h.state.context.camera;
    let expected_z = 50.0 / 22.5_f32.to_radians().tan() * 1.5;
    assert_relative_eq!(camera.position.x, 0.0, epsilon = 1e-2);
    assert_relative_eq!(camera.position.y, 60.0, epsilon = 1e-2);
    assert_relative_eq!(camera.position.z, expected_z, epsilon = 1e-2);
    assert_eq!(h.state.context.controls.target, Vec3::ZERO);
}

#[test]
fn test_second_model_replaces_first() {
    let mut h = TestHarness::new();
    h.add_model("a", two_box_glb());
    h.add_model("b", box_glb([1.0; 3], [0.0; 3]));

    let a = h.load("a").model.unwrap();
    assert_eq!(h.overlay_count(), 2);
    let old_overlays = h.state.context.edge_overlays().to_vec();

    let b = h.load("b").model.unwrap();
    assert_eq!(h.overlay_count(), h.mesh_count());
    assert_eq!(h.overlay_count(), 1);
    assert!(!h.state.context.scene.contains(a));
    assert!(h.state.context.scene.contains(b));
    for id in old_overlays {
        assert!(!h.state.context.scene.contains(id));
    }
}

#[test]
fn test_parameters_scale_model() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.add_params("box", &params_json(50.0, 80.0, 120.0, None));
    h.load("box");

    assert_eq!(h.model_scale(), Some(Vec3::new(0.5, 0.8, 1.2)));
}

#[test]
fn test_missing_color_uses_default() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.add_params("box", &params_json(100.0, 100.0, 100.0, None));
    h.load("box");

    let default = Color::from_u32(0x00aaff);
    assert_eq!(h.state.parameters.as_ref().and_then(|p| p.color()), Some(default));
    assert_eq!(h.mesh_colors(), vec![default]);
    assert_eq!(h.form_keys().last().map(String::as_str), Some("kleur"));
}

#[test]
fn test_numeric_edit_rescales_one_axis() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.add_params("box", &params_json(50.0, 80.0, 120.0, None));
    h.load("box");

    assert_eq!(h.edit_number("Hoogte", "75"), Applied::Rescaled);
    assert_eq!(h.parameter("Hoogte"), Some(75.0));
    assert_eq!(h.parameter("breedte"), Some(50.0));
    assert_eq!(h.parameter("Lengte"), Some(120.0));
    assert_eq!(h.model_scale(), Some(Vec3::new(0.5, 0.75, 1.2)));
}

#[test]
fn test_unparsable_edit_keeps_scale() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.add_params("box", &params_json(50.0, 80.0, 120.0, None));
    h.load("box");

    assert_eq!(h.edit_number("breedte", "12,5cm"), Applied::Ignored);
    assert_eq!(h.parameter("breedte"), Some(50.0));
    assert_eq!(h.model_scale(), Some(Vec3::new(0.5, 0.8, 1.2)));
}

#[test]
fn test_color_edit_recolors_meshes_only() {
    let mut h = TestHarness::new();
    h.add_model("pair", two_box_glb());
    h.add_params("pair", &params_json(100.0, 100.0, 100.0, Some("#112233")));
    h.load("pair");
    assert_eq!(h.mesh_colors(), vec![Color::rgb(0x11, 0x22, 0x33); 2]);

    let green = Color::rgb(0, 0xff, 0);
    assert_eq!(h.edit_color(green), Applied::Recolored);
    assert_eq!(h.mesh_colors(), vec![green; 2]);
    assert_eq!(h.state.parameters.as_ref().and_then(|p| p.color()), Some(green));

    h.run_frames(1);
    let frame = h.renderer.last.as_ref().unwrap();
    assert!(frame.lines.iter().all(|l| l.color == Color::BLACK));
}

#[test]
fn test_missing_parameter_file_leaves_model_unscaled() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));

    let report = h.load("box");
    assert!(report.model.is_ok());
    assert!(matches!(report.parameters, Some(Err(FetchError::Load(_)))));
    assert!(h.has_model());
    assert_eq!(h.model_scale(), Some(Vec3::ONE));
    assert!(h.form_keys().is_empty());
}

#[test]
fn test_invalid_parameter_json_leaves_model_unscaled() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.add_params("box", "{\"breedte\": 50,");

    let report = h.load("box");
    assert!(matches!(report.parameters, Some(Err(FetchError::Parse(_)))));
    assert!(h.has_model());
    assert_eq!(h.model_scale(), Some(Vec3::ONE));
    assert!(h.form_keys().is_empty());
}

#[test]
fn test_null_or_empty_color_gets_default() {
    for kleur in ["null", "\"\""] {
        let mut h = TestHarness::new();
        h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
        h.add_params(
            "box",
            &format!(r#"{{"breedte": 50, "Hoogte": 80, "Lengte": 120, "kleur": {kleur}}}"#),
        );

        assert!(matches!(h.load("box").parameters, Some(Ok(()))));
        assert_eq!(h.form_keys(), vec!["breedte", "Hoogte", "Lengte", "kleur"]);
        assert_eq!(h.model_scale(), Some(Vec3::new(0.5, 0.8, 1.2)));
        assert_eq!(h.mesh_colors(), vec![Color::from_u32(0x00aaff)]);
    }
}

#[test]
fn test_extra_text_field_keeps_form_and_scale() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.add_params(
        "box",
        r##"{"naam": "doos", "breedte": 50, "Hoogte": 80, "Lengte": 120, "kleur": "#112233"}"##,
    );

    assert!(matches!(h.load("box").parameters, Some(Ok(()))));
    assert_eq!(h.form_keys(), vec!["breedte", "Hoogte", "Lengte", "kleur"]);
    assert_eq!(h.model_scale(), Some(Vec3::new(0.5, 0.8, 1.2)));
    assert_eq!(h.mesh_colors(), vec![Color::rgb(0x11, 0x22, 0x33)]);
}

#[test]
fn test_reload_without_params_clears_form() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.add_params("box", &params_json(50.0, 80.0, 120.0, None));
    h.load("box");
    assert_eq!(h.form_keys().len(), 4);

    h.remove_params("box");
    h.load("box");
    assert!(h.form_keys().is_empty());
    assert!(h.state.parameters.is_none());
}

#[test]
fn test_box_has_twelve_edges() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([3.0, 1.0, 2.0], [0.0; 3]));
    h.load("box");

    assert_eq!(h.overlay_count(), 1);
    assert_eq!(h.edge_segment_count(), 12);
}

#[test]
fn test_multi_primitive_mesh_gets_overlay_per_part() {
    let mut h = TestHarness::new();
    h.add_model("assembly", multi_primitive_glb());
    h.load("assembly");

    assert_eq!(h.mesh_count(), 2);
    assert_eq!(h.overlay_count(), 2);
    assert_eq!(h.edge_segment_count(), 24);
}

#[test]
fn test_frame_loop_stops_on_signal() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.load("box");

    assert_eq!(h.run_frames(5), 5);
    assert_eq!(h.renderer.frames, 5);

    h.frame_loop.stop_signal().raise();
    assert_eq!(h.run_frames(5), 0);
    assert_eq!(h.renderer.frames, 5);
}

#[test]
fn test_rendered_frame_contains_model_and_edges() {
    let mut h = TestHarness::new();
    h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
    h.load("box");
    h.run_frames(1);

    let frame = h.renderer.last.as_ref().unwrap();
    assert_eq!(frame.background, Color::WHITE);
    assert_eq!(frame.meshes.len(), 1);
    assert_eq!(frame.segment_count(), 12);
}
