use egui::Ui;

use model_viewer_lib::state::{Status, ViewerState};

pub fn show(ui: &mut Ui, state: &ViewerState) {
    ui.horizontal(|ui| {
        match &state.status {
            Status::Failed(_) => {
                ui.colored_label(egui::Color32::from_rgb(200, 40, 40), state.status.to_string());
            }
            Status::Loading(_) => {
                ui.spinner();
                ui.label(state.status.to_string());
            }
            Status::Idle | Status::Ready(_) => {
                ui.weak(state.status.to_string());
            }
        }

        if let Some(model) = state.context.model() {
            ui.separator();
            ui.weak(format!(
                "{} meshes, {} edge overlays",
                model.mesh_count(),
                state.context.edge_overlays().len()
            ));
        }

        // Right-aligned version
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("model-viewer v", env!("CARGO_PKG_VERSION")));
        });
    });
}
