//! Headless test harness: the viewer state driven end to end without a window.
//!
//! Assets come from an in-memory source; fetches run on the same spawner
//! the app uses, and frames are rendered into a [`RenderCapture`].

use glam::Vec3;
use shared::{Color, ModelPaths};

use crate::context::Viewport;
use crate::form::{Applied, FormChange};
use crate::frame_loop::{FixedTicks, FrameLoop};
use crate::loader::{AssetSource, LoadError, MemorySource, Spawner};
use crate::render::RenderCapture;
use crate::scene::{NodeId, NodeKind};
use crate::state::{FetchError, ViewerState};

/// Outcome of loading one model and its parameters
#[derive(Debug)]
pub struct LoadReport {
    pub model: Result<NodeId, LoadError>,
    /// `None` when the model itself failed and parameters were not fetched
    pub parameters: Option<Result<(), FetchError>>,
}

pub struct TestHarness {
    pub state: ViewerState,
    pub renderer: RenderCapture,
    pub frame_loop: FrameLoop,
    files: MemorySource,
    source: AssetSource,
    spawner: Spawner,
}

impl TestHarness {
    /// Create a harness with an empty asset store and an 800x600 viewport
    pub fn new() -> Self {
        let files = MemorySource::new();
        let source = AssetSource::Memory(files.clone());
        Self {
            state: ViewerState::new(Viewport::new(800.0, 600.0), ModelPaths::default()),
            renderer: RenderCapture::default(),
            frame_loop: FrameLoop::new(),
            files,
            source,
            // Runtime creation only fails when the OS refuses threads
            spawner: Spawner::new().unwrap_or_else(|e| panic!("cannot start fetch runtime: {e}")),
        }
    }

    // ── Asset store ───────────────────────────────────────────

    pub fn add_model(&mut self, name: &str, glb: Vec<u8>) {
        self.files.insert(ModelPaths::new(name).asset(), glb);
    }

    pub fn add_params(&mut self, name: &str, json: &str) {
        self.files.insert(ModelPaths::new(name).parameters(), json.as_bytes().to_vec());
    }

    pub fn remove_params(&mut self, name: &str) {
        self.files.remove(&ModelPaths::new(name).parameters());
    }

    // ── Loading ───────────────────────────────────────────────

    /// Fetch and install model `name`, then its parameters, as the app would
    pub fn load(&mut self, name: &str) -> LoadReport {
        let paths = ModelPaths::new(name);
        self.state.begin_load(paths.clone());

        let asset = self.spawner.fetch(&self.source, &paths.asset()).wait();
        let model = self.state.on_model_loaded(asset);
        if model.is_err() {
            return LoadReport {
                model,
                parameters: None,
            };
        }

        let params = self.spawner.fetch(&self.source, &paths.parameters()).wait();
        let parameters = Some(self.state.on_parameters_loaded(params));
        LoadReport { model, parameters }
    }

    // ── Form edits ────────────────────────────────────────────

    pub fn edit_number(&mut self, key: &str, text: &str) -> Applied {
        self.state.apply_form_change(FormChange::Number {
            key: key.to_string(),
            text: text.to_string(),
        })
    }

    pub fn edit_color(&mut self, color: Color) -> Applied {
        self.state.apply_form_change(FormChange::Color {
            key: shared::COLOR_KEY.to_string(),
            color,
        })
    }

    // ── Frames ────────────────────────────────────────────────

    /// Render `count` frames; returns how many were rendered
    pub fn run_frames(&mut self, count: u64) -> u64 {
        self.frame_loop.run(
            &mut self.state.context,
            &mut FixedTicks::new(count, 1.0 / 60.0),
            &mut self.renderer,
        )
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn has_model(&self) -> bool {
        self.state.context.model().is_some()
    }

    pub fn model_scale(&self) -> Option<Vec3> {
        self.state.context.model().map(|m| m.transform.scale)
    }

    pub fn model_translation(&self) -> Option<Vec3> {
        self.state.context.model().map(|m| m.transform.translation)
    }

    pub fn mesh_count(&self) -> usize {
        self.state.context.model().map_or(0, |m| m.mesh_count())
    }

    pub fn overlay_count(&self) -> usize {
        self.state.context.edge_overlays().len()
    }

    /// Total line segments across all overlays of the current model
    pub fn edge_segment_count(&self) -> usize {
        let Some(model) = self.state.context.model() else {
            return 0;
        };
        let mut segments = 0;
        model.traverse(&mut |node| {
            if let NodeKind::LineSegments(lines) = &node.kind {
                segments += lines.geometry.segment_count();
            }
        });
        segments
    }

    /// Material colors of every mesh in the model, in traversal order
    pub fn mesh_colors(&self) -> Vec<Color> {
        let mut colors = Vec::new();
        if let Some(model) = self.state.context.model() {
            model.traverse(&mut |node| {
                if let Some(mesh) = node.as_mesh() {
                    colors.push(mesh.material.color);
                }
            });
        }
        colors
    }

    pub fn form_keys(&self) -> Vec<String> {
        self.state.form.inputs().iter().map(|i| i.key.clone()).collect()
    }

    pub fn parameter(&self, key: &str) -> Option<f64> {
        self.state.parameters.as_ref()?.number(key)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{box_glb, params_json};

    #[test]
    fn test_new_harness_empty() {
        let h = TestHarness::new();
        assert!(!h.has_model());
        assert_eq!(h.overlay_count(), 0);
        assert!(h.form_keys().is_empty());
    }

    #[test]
    fn test_missing_model_reports_not_found() {
        let mut h = TestHarness::new();
        let report = h.load("ghost");
        assert!(matches!(report.model, Err(LoadError::NotFound(_))));
        assert!(report.parameters.is_none());
        assert!(!h.has_model());
    }

    #[test]
    fn test_load_with_params() {
        let mut h = TestHarness::new();
        h.add_model("box", box_glb([100.0; 3], [0.0; 3]));
        h.add_params("box", &params_json(50.0, 80.0, 120.0, Some("#ff0000")));

        let report = h.load("box");
        assert!(report.model.is_ok());
        assert!(matches!(report.parameters, Some(Ok(()))));
        assert_eq!(h.form_keys(), vec!["breedte", "Hoogte", "Lengte", "kleur"]);
        assert_eq!(h.mesh_colors(), vec![Color::rgb(0xff, 0, 0)]);
    }

    #[test]
    fn test_frames_clear_material_updates() {
        let mut h = TestHarness::new();
        h.add_model("box", box_glb([1.0; 3], [0.0; 3]));
        h.add_params("box", &params_json(100.0, 100.0, 100.0, None));
        h.load("box");

        assert_eq!(h.run_frames(1), 1);
        assert_eq!(h.state.context.scene.clear_material_updates(), 0);
    }
}
