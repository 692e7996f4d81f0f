//! Frame a freshly loaded model: recenter it and back the camera off to see all of it.

use glam::{Mat4, Vec3};

use super::camera::{OrbitControls, PerspectiveCamera};
use crate::scene::{Aabb, Node};

/// Extra distance on top of the exact fit
pub const FIT_MARGIN: f32 = 1.5;

/// Camera height as a fraction of the largest model extent
pub const FIT_ELEVATION: f32 = 0.6;

/// What the fitter measured and where it put the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub bounds: Aabb,
    pub max_dim: f32,
    pub distance: f32,
}

/// Distance at which an object of extent `max_dim` fills the vertical FOV, times [`FIT_MARGIN`]
pub fn fit_distance(max_dim: f32, fov_radians: f32) -> f32 {
    (max_dim / 2.0 / (fov_radians / 2.0).tan()).abs() * FIT_MARGIN
}

/// Recenter `model` at the origin and reposition the camera.
///
/// Heuristic: the camera sits on +Z at [`fit_distance`] and is raised by
/// `max_dim * 0.6`; very flat or wide models are not guaranteed to fit the
/// aspect ratio. Returns `None` and changes nothing if the model has no geometry.
pub fn fit_to_model(
    model: &mut Node,
    camera: &mut PerspectiveCamera,
    controls: &mut OrbitControls,
) -> Option<Framing> {
    let bounds = model.world_bounding_box(Mat4::IDENTITY)?;
    let center = bounds.center();
    model.transform.translation -= center;

    let max_dim = bounds.max_dim();
    let distance = fit_distance(max_dim, camera.fov_radians());

    camera.position = Vec3::new(0.0, max_dim * FIT_ELEVATION, distance);
    camera.look_at(Vec3::ZERO);
    controls.target = Vec3::ZERO;
    controls.update(camera);

    tracing::info!(
        "Framed model: size={:?} center={:?} camera_z={:.2}",
        bounds.size(),
        center,
        distance
    );

    Some(Framing {
        bounds,
        max_dim,
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_distance_for_45_degrees() {
        let d = fit_distance(100.0, 45.0_f32.to_radians());
        let expected = 50.0 / 22.5_f32.to_radians().tan() * 1.5;
        assert_relative_eq!(d, expected, max_relative = 1e-6);
    }

    #[test]
    fn test_fit_distance_zero_extent() {
        assert_eq!(fit_distance(0.0, 45.0_f32.to_radians()), 0.0);
    }
}
