//! Wireframe fallback for the viewport when no GL context is available

use egui::{Color32, Pos2, Rect, Stroke, Ui};
use glam::{Mat4, Vec3, Vec4};
use shared::Color;

use model_viewer_lib::render::RenderList;

/// Paint edge overlays with egui's painter
pub fn paint_viewport(ui: &Ui, rect: Rect, list: &RenderList) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, color32(list.background));

    for draw in &list.lines {
        let mvp = list.view_projection * draw.world;
        let stroke = Stroke::new(1.0, color32(draw.color));
        for (a, b) in draw.geometry.segments() {
            if let (Some(a), Some(b)) = (project(&mvp, a, rect), project(&mvp, b, rect)) {
                painter.line_segment([a, b], stroke);
            }
        }
    }
}

/// Clip-space projection to screen; `None` behind the camera
fn project(mvp: &Mat4, p: Vec3, rect: Rect) -> Option<Pos2> {
    let clip = *mvp * Vec4::new(p.x, p.y, p.z, 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Pos2::new(
        rect.left() + (ndc.x + 1.0) * 0.5 * rect.width(),
        rect.top() + (1.0 - ndc.y) * 0.5 * rect.height(),
    ))
}

fn color32(c: Color) -> Color32 {
    let [r, g, b] = c.to_array();
    Color32::from_rgb(r, g, b)
}
