//! Flattened, backend-neutral view of a scene for one frame

use std::sync::Arc;

use glam::{Mat4, Vec3};
use shared::Color;

use crate::frame_loop::SceneRenderer;
use crate::scene::{Geometry, Light, LineGeometry, NodeKind, Scene};
use crate::viewport::camera::PerspectiveCamera;

#[derive(Debug, Clone)]
pub struct MeshDraw {
    pub geometry: Arc<Geometry>,
    pub world: Mat4,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct LineDraw {
    pub geometry: Arc<LineGeometry>,
    pub world: Mat4,
    pub color: Color,
}

/// Light parameters in the form the mesh shader consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub sky: [f32; 3],
    pub ground: [f32; 3],
    pub hemisphere_intensity: f32,
    /// Unit vector pointing at the sky
    pub hemisphere_up: Vec3,
    pub sun: [f32; 3],
    pub sun_intensity: f32,
    /// Unit vector pointing towards the directional light
    pub to_sun: Vec3,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            sky: [1.0; 3],
            ground: [0.0; 3],
            hemisphere_intensity: 0.0,
            hemisphere_up: Vec3::Y,
            sun: [1.0; 3],
            sun_intensity: 0.0,
            to_sun: Vec3::Y,
        }
    }
}

/// Everything a backend needs to draw one frame
#[derive(Debug, Clone)]
pub struct RenderList {
    pub background: Color,
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub meshes: Vec<MeshDraw>,
    pub lines: Vec<LineDraw>,
    pub lights: LightRig,
}

impl RenderList {
    pub fn collect(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut list = Self {
            background: scene.background,
            view_projection: camera.view_projection(),
            camera_position: camera.position,
            meshes: Vec::new(),
            lines: Vec::new(),
            lights: LightRig::default(),
        };

        scene.root().traverse_world(Mat4::IDENTITY, &mut |node, world| match &node.kind {
            NodeKind::Mesh(mesh) => list.meshes.push(MeshDraw {
                geometry: mesh.geometry.clone(),
                world,
                color: mesh.material.color,
            }),
            NodeKind::LineSegments(lines) => list.lines.push(LineDraw {
                geometry: lines.geometry.clone(),
                world,
                color: lines.material.color,
            }),
            NodeKind::Light(Light::Hemisphere {
                sky,
                ground,
                intensity,
            }) => {
                list.lights.sky = sky.to_rgb_f32();
                list.lights.ground = ground.to_rgb_f32();
                list.lights.hemisphere_intensity = *intensity;
                list.lights.hemisphere_up = world.w_axis.truncate().try_normalize().unwrap_or(Vec3::Y);
            }
            NodeKind::Light(Light::Directional { color, intensity }) => {
                list.lights.sun = color.to_rgb_f32();
                list.lights.sun_intensity = *intensity;
                list.lights.to_sun = world.w_axis.truncate().try_normalize().unwrap_or(Vec3::Y);
            }
            NodeKind::Group | NodeKind::Camera(_) => {}
        });

        list
    }

    pub fn segment_count(&self) -> usize {
        self.lines.iter().map(|l| l.geometry.segment_count()).sum()
    }
}

/// Renderer that only records what it was asked to draw
#[derive(Debug, Default)]
pub struct RenderCapture {
    pub frames: u64,
    pub last: Option<RenderList>,
}

impl SceneRenderer for RenderCapture {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        self.frames += 1;
        self.last = Some(RenderList::collect(scene, camera));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{SceneContext, Viewport};
    use crate::scene::Node;

    #[test]
    fn test_collect_lights_and_background() {
        let ctx = SceneContext::new(Viewport::new(800.0, 600.0));
        let list = RenderList::collect(&ctx.scene, &ctx.camera);
        assert_eq!(list.background, Color::WHITE);
        assert_eq!(list.lights.hemisphere_intensity, 1.0);
        assert_eq!(list.lights.sun_intensity, 0.8);
        assert_eq!(list.lights.hemisphere_up, Vec3::Y);
        assert!((list.lights.to_sun - Vec3::new(0.0, 200.0, 100.0).normalize()).length() < 1e-6);
        assert!(list.meshes.is_empty());
    }

    #[test]
    fn test_collect_meshes_and_edges() {
        let mut ctx = SceneContext::new(Viewport::new(800.0, 600.0));
        let geometry = Arc::new(Geometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            Vec::new(),
            None,
        ));
        ctx.install_model(Node::mesh("tri", geometry, Color::rgb(1, 2, 3)));
        ctx.decorate_edges();

        let list = RenderList::collect(&ctx.scene, &ctx.camera);
        assert_eq!(list.meshes.len(), 1);
        assert_eq!(list.meshes[0].color, Color::rgb(1, 2, 3));
        assert_eq!(list.lines.len(), 1);
        assert_eq!(list.lines[0].color, Color::BLACK);
        assert_eq!(list.segment_count(), 3);
    }
}
