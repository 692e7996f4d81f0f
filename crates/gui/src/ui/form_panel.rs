//! Parameter inputs panel
//!
//! One row per parameter: a text field for numbers, a color button for the color.

use egui::{TextEdit, Ui};
use shared::Color;

use model_viewer_lib::form::{FormChange, InputKind};
use model_viewer_lib::state::ViewerState;

pub fn show(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Parameters");
    ui.separator();

    if state.form.is_empty() {
        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            ui.weak("No parameters loaded");
        });
        return;
    }

    // Collect edits first, apply after the widgets release the form
    let mut changes: Vec<FormChange> = Vec::new();

    egui::Grid::new("parameter_inputs")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            for input in state.form.inputs_mut() {
                ui.label(input.key.as_str());
                match input.kind {
                    InputKind::Number => {
                        let response = ui.add(
                            TextEdit::singleline(&mut input.text)
                                .desired_width(100.0)
                                .font(egui::TextStyle::Body),
                        );
                        if response.changed() {
                            changes.push(FormChange::Number {
                                key: input.key.clone(),
                                text: input.text.clone(),
                            });
                        }
                    }
                    InputKind::Color => {
                        let mut rgb = input.color.to_array();
                        if ui.color_edit_button_srgb(&mut rgb).changed() {
                            changes.push(FormChange::Color {
                                key: input.key.clone(),
                                color: Color::from_array(rgb),
                            });
                        }
                    }
                }
                ui.end_row();
            }
        });

    for change in changes {
        state.apply_form_change(change);
    }
}
