//! Main application module

mod styles;

use eframe::egui;

use model_viewer_lib::context::Viewport;
use model_viewer_lib::loader::{AssetSource, PendingFetch, Spawner};
use model_viewer_lib::settings::ViewerSettings;
use model_viewer_lib::state::{Status, ViewerState};
use shared::ModelPaths;

use crate::ui::{form_panel, status_bar};
use crate::viewport::ViewportPanel;

/// Main application
pub struct ViewerApp {
    state: ViewerState,
    viewport: ViewportPanel,
    source: AssetSource,
    spawner: Option<Spawner>,
    pending_model: Option<PendingFetch>,
    pending_params: Option<PendingFetch>,
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: ViewerSettings, source: AssetSource) -> Self {
        styles::configure_styles(&cc.egui_ctx);

        let mut viewport = ViewportPanel::new();

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let [width, height] = settings.window_size;
        let mut state = ViewerState::new(
            Viewport::new(width, height),
            ModelPaths::new(settings.model.clone()),
        );
        state.context.controls.damping_factor = settings.damping_factor;

        let spawner = match Spawner::new() {
            Ok(spawner) => Some(spawner),
            Err(e) => {
                tracing::error!("Failed to start fetch runtime: {e}");
                None
            }
        };

        tracing::info!("Serving assets from {}", source.describe());

        let mut app = Self {
            state,
            viewport,
            source,
            spawner,
            pending_model: None,
            pending_params: None,
        };
        app.load_model(ModelPaths::new(settings.model));
        app
    }

    /// Start fetching a model; its parameters follow once it is installed
    fn load_model(&mut self, paths: ModelPaths) {
        let Some(spawner) = &self.spawner else {
            self.state.status = Status::Failed("fetch runtime unavailable".into());
            return;
        };
        self.pending_params = None;
        self.pending_model = Some(spawner.fetch(&self.source, &paths.asset()));
        self.state.begin_load(paths);
    }

    /// Hand finished fetches to the state, once per frame
    fn poll_fetches(&mut self) {
        if let Some(result) = self.pending_model.as_ref().and_then(PendingFetch::poll) {
            self.pending_model = None;
            if self.state.on_model_loaded(result).is_ok() {
                if let Some(spawner) = &self.spawner {
                    let path = self.state.paths().parameters();
                    self.pending_params = Some(spawner.fetch(&self.source, &path));
                }
            }
        }

        if let Some(result) = self.pending_params.as_ref().and_then(PendingFetch::poll) {
            self.pending_params = None;
            // Failures are logged by the state; the model stays as loaded
            let _ = self.state.on_parameters_loaded(result);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_fetches();

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state);
            });

        // ── Left panel: parameter inputs ─────────────────────
        egui::SidePanel::left("inputs")
            .default_width(220.0)
            .width_range(160.0..=400.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| {
                form_panel::show(ui, &mut self.state);
            });

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });

        // Damping and pending fetches need a steady frame stream
        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        self.viewport.stop_signal().raise();
        if let Some(gl) = gl {
            self.viewport.destroy_gl(gl);
        }
        tracing::info!("Viewer closed");
    }
}
