use glam::{Mat4, Vec3, Vec4};

/// Perspective camera looking from `position` towards a point
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Vertical field of view (degrees)
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub up: Vec3,
    look_target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            up: Vec3::Y,
            look_target: Vec3::NEG_Z,
        }
    }

    /// Vertical field of view (radians)
    pub fn fov_radians(&self) -> f32 {
        self.fov.to_radians()
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.look_target = target;
    }

    pub fn look_target(&self) -> Vec3 {
        self.look_target
    }

    /// Viewing direction (unit length, or zero when degenerate)
    pub fn forward(&self) -> Vec3 {
        (self.look_target - self.position).normalize_or_zero()
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_target, self.up)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_radians(), self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to normalized screen coords (0..1, y down)
    pub fn project(&self, point: Vec3) -> Option<[f32; 2]> {
        let p = self.view_projection() * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        Some([(ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5])
    }
}

const EPS: f32 = 1e-6;

/// Orbit controller: rotates, pans and dollies the camera around `target`.
///
/// Input handlers only accumulate deltas; [`OrbitControls::update`] applies
/// them, easing out over several frames when damping is enabled.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    /// Horizontal orbit (radians)
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    /// Vertical orbit (radians)
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Orbit from a pointer drag in pixels over a viewport of `height` pixels
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, height: f32) {
        if height <= 0.0 {
            return;
        }
        let tau = std::f32::consts::TAU;
        self.rotate_left(tau * dx / height * self.rotate_speed);
        self.rotate_up(tau * dy / height * self.rotate_speed);
    }

    /// Pan from a pointer drag in pixels, keeping the grabbed point under the cursor
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, height: f32, camera: &PerspectiveCamera) {
        if height <= 0.0 {
            return;
        }
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov_radians() / 2.0).tan();
        let view = camera.view_matrix().inverse();
        let right = view.x_axis.truncate();
        let up = view.y_axis.truncate();
        let sx = 2.0 * dx * target_distance / height * self.pan_speed;
        let sy = 2.0 * dy * target_distance / height * self.pan_speed;
        self.pan_offset += -right * sx + up * sy;
    }

    /// Zoom from a scroll amount (positive = towards the target)
    pub fn dolly(&mut self, scroll: f32) {
        if scroll == 0.0 {
            return;
        }
        let factor = 0.95_f32.powf(self.zoom_speed * scroll.abs());
        if scroll > 0.0 {
            self.scale *= factor;
        } else {
            self.scale /= factor;
        }
    }

    /// Whether accumulated motion is still being applied
    pub fn is_moving(&self) -> bool {
        self.delta_theta.abs() > EPS
            || self.delta_phi.abs() > EPS
            || self.pan_offset.length_squared() > EPS
            || (self.scale - 1.0).abs() > EPS
    }

    /// Apply pending motion to the camera; returns `true` if the camera moved
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.position;
        let offset = camera.position - self.target;

        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > EPS {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };

        let step = if self.enable_damping { self.damping_factor } else { 1.0 };
        theta += self.delta_theta * step;
        phi += self.delta_phi * step;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, std::f32::consts::PI - EPS);

        self.target += self.pan_offset * step;

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (camera.position - before).length_squared() > EPS
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera_at(p: Vec3) -> PerspectiveCamera {
        let mut c = PerspectiveCamera::new(45.0, 1.5, 0.1, 1000.0);
        c.position = p;
        c.look_at(Vec3::ZERO);
        c
    }

    #[test]
    fn test_update_without_input_keeps_position() {
        let mut cam = camera_at(Vec3::new(0.0, 150.0, 300.0));
        let mut controls = OrbitControls::new();
        controls.enable_damping = true;
        let moved = controls.update(&mut cam);
        assert!(!moved);
        assert_relative_eq!(cam.position.y, 150.0, epsilon = 1e-3);
        assert_relative_eq!(cam.position.z, 300.0, epsilon = 1e-3);
        assert_eq!(cam.look_target(), Vec3::ZERO);
    }

    #[test]
    fn test_rotation_keeps_distance() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new();
        controls.rotate_left(std::f32::consts::FRAC_PI_2);
        controls.update(&mut cam);
        assert_relative_eq!(cam.position.length(), 10.0, epsilon = 1e-4);
        assert_relative_eq!(cam.position.x, -10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_damping_eases_out() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new();
        controls.enable_damping = true;
        controls.rotate_left(1.0);

        assert!(controls.update(&mut cam));
        let first = cam.position;
        assert!(controls.is_moving());

        // A single damped step applies only a fraction of the rotation
        let angle = first.x.atan2(first.z).abs();
        assert_relative_eq!(angle, 0.05, epsilon = 1e-4);

        for _ in 0..500 {
            controls.update(&mut cam);
        }
        assert!(!controls.is_moving());
        let total = cam.position.x.atan2(cam.position.z).abs();
        assert_relative_eq!(total, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_dolly_in_reduces_distance() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new();
        controls.dolly(1.0);
        controls.update(&mut cam);
        assert!(cam.position.length() < 10.0);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new();
        controls.pan_by_pixels(100.0, 0.0, 500.0, &cam);
        controls.update(&mut cam);
        assert!(controls.target.x < 0.0);
        assert_relative_eq!(controls.target.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_project_center() {
        let cam = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let p = cam.project(Vec3::ZERO).unwrap();
        assert_relative_eq!(p[0], 0.5, epsilon = 1e-5);
        assert_relative_eq!(p[1], 0.5, epsilon = 1e-5);
    }
}
