//! Apply parameter values to the loaded model

use shared::{Color, Parameters, ScaleAxis};

use crate::context::SceneContext;

/// Scale the model from the width/height/length parameters.
///
/// Each present key sets one axis to `value / 100`; a missing key leaves
/// that axis as it is. Values are applied without range checks.
pub fn apply_scale(ctx: &mut SceneContext, params: &Parameters) -> bool {
    let Some(model) = ctx.model_mut() else {
        return false;
    };
    let mut scale = model.transform.scale;
    for axis in ScaleAxis::ALL {
        if let Some(factor) = params.scale_factor(axis) {
            scale[axis.index()] = factor as f32;
        }
    }
    model.transform.scale = scale;
    tracing::debug!("Model scale set to {scale:?}");
    true
}

/// Recolor every mesh in the model; edge overlays keep their own material
pub fn apply_color(ctx: &mut SceneContext, color: Color) -> usize {
    let Some(model) = ctx.model_mut() else {
        return 0;
    };
    let mut recolored = 0;
    model.visit_meshes_mut(&mut |node| {
        if let Some(mesh) = node.as_mesh_mut() {
            mesh.material.color = color;
            mesh.material.needs_update = true;
            recolored += 1;
        }
    });
    tracing::debug!("Recolored {recolored} meshes to {color}");
    recolored
}
