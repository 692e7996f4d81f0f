//! 3D viewport panel with OpenGL rendering

mod gl_renderer;
mod renderer;

use std::sync::{Arc, Mutex};

use egui::Ui;

use model_viewer_lib::frame_loop::{FrameLoop, StopSignal};
use model_viewer_lib::render::{RenderCapture, RenderList};
use model_viewer_lib::state::ViewerState;
use gl_renderer::GlRenderer;

/// Scroll distance (points) treated as one wheel notch
const SCROLL_STEP: f32 = 50.0;

/// 3D viewport panel with OpenGL rendering
pub struct ViewportPanel {
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    frame_loop: FrameLoop,
    capture: RenderCapture,
    last_size: Option<egui::Vec2>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            gl_renderer: None,
            frame_loop: FrameLoop::new(),
            capture: RenderCapture::default(),
            last_size: None,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        let renderer = GlRenderer::new(gl);
        self.gl_renderer = Some(Arc::new(Mutex::new(renderer)));
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.frame_loop.stop_signal()
    }

    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut ViewerState) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        // ── Resize ──────────────────────────────────────────────
        if self.last_size != Some(rect.size()) {
            self.last_size = Some(rect.size());
            state.context.resize(rect.width(), rect.height());
        }

        // ── Orbit controls ──────────────────────────────────────
        let controls = &mut state.context.controls;
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            controls.rotate_by_pixels(delta.x, delta.y, rect.height());
        }
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            controls.pan_by_pixels(delta.x, delta.y, rect.height(), &state.context.camera);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                controls.dolly(scroll / SCROLL_STEP);
            }
        }

        // ── Frame ───────────────────────────────────────────────
        if !self.frame_loop.tick(&mut state.context, &mut self.capture) {
            return;
        }
        let Some(list) = self.capture.last.take() else {
            return;
        };

        if ui.is_rect_visible(rect) {
            self.render_gl(ui, rect, list);
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect, list: RenderList) {
        let Some(gl_renderer) = &self.gl_renderer else {
            // Fallback: software wireframe rendering
            renderer::paint_viewport(ui, rect, &list);
            return;
        };

        let renderer_clone = gl_renderer.clone();
        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();
                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer_clone.lock() {
                    r.sync(gl, &list);
                    r.paint(gl, &list, viewport);
                }
            })),
        };
        ui.painter().add(callback);
    }
}
