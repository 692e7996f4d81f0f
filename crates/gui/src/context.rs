//! Scene context: scene graph, camera, orbit controls and the current model

use glam::Vec3;
use shared::Color;

use crate::scene::{Light, Node, NodeId, NodeKind, Scene, Transform};
use crate::viewport::camera::{OrbitControls, PerspectiveCamera};
use crate::viewport::edges::decorate_edges;
use crate::viewport::fit::{fit_to_model, Framing};

pub const CAMERA_FOV: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 150.0, 300.0);
pub const DAMPING_FACTOR: f32 = 0.05;

/// Output surface size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Everything the render loop draws, plus the loaded model bookkeeping
pub struct SceneContext {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    viewport: Viewport,
    model: Option<NodeId>,
    edge_overlays: Vec<NodeId>,
}

impl SceneContext {
    pub fn new(viewport: Viewport) -> Self {
        let mut scene = Scene::new();
        scene.background = Color::WHITE;

        let mut camera = PerspectiveCamera::new(CAMERA_FOV, viewport.aspect(), CAMERA_NEAR, CAMERA_FAR);
        camera.position = CAMERA_START;
        camera.look_at(Vec3::ZERO);

        let mut controls = OrbitControls::new();
        controls.enable_damping = true;
        controls.damping_factor = DAMPING_FACTOR;

        scene.add(
            Node::new(
                "hemisphere_light",
                NodeKind::Light(Light::Hemisphere {
                    sky: Color::from_u32(0xffffff),
                    ground: Color::from_u32(0x444444),
                    intensity: 1.0,
                }),
            )
            .with_transform(Transform::from_translation(Vec3::new(0.0, 200.0, 0.0))),
        );
        scene.add(
            Node::new(
                "directional_light",
                NodeKind::Light(Light::Directional {
                    color: Color::from_u32(0xffffff),
                    intensity: 0.8,
                }),
            )
            .with_transform(Transform::from_translation(Vec3::new(0.0, 200.0, 100.0))),
        );

        Self {
            scene,
            camera,
            controls,
            viewport,
            model: None,
            edge_overlays: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Follow a change of the output size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.camera.aspect = self.viewport.aspect();
        tracing::debug!("Viewport resized to {width}x{height}");
    }

    pub fn model_id(&self) -> Option<NodeId> {
        self.model
    }

    pub fn model(&self) -> Option<&Node> {
        self.scene.find(self.model?)
    }

    pub fn model_mut(&mut self) -> Option<&mut Node> {
        self.scene.find_mut(self.model?)
    }

    /// Overlay nodes created for the current model
    pub fn edge_overlays(&self) -> &[NodeId] {
        &self.edge_overlays
    }

    /// Remove the current model together with its edge overlays
    pub fn remove_model(&mut self) -> Option<Node> {
        let id = self.model.take()?;
        for overlay in self.edge_overlays.drain(..) {
            self.scene.remove(overlay);
        }
        self.scene.remove(id)
    }

    /// Replace any current model with `model`
    pub fn install_model(&mut self, model: Node) -> NodeId {
        if let Some(old) = self.remove_model() {
            tracing::info!("Removed previous model '{}'", old.name);
        }
        let id = self.scene.add(model);
        self.model = Some(id);
        id
    }

    /// Recenter the model and frame it with the camera
    pub fn fit_camera(&mut self) -> Option<Framing> {
        let id = self.model?;
        let model = self.scene.find_mut(id)?;
        fit_to_model(model, &mut self.camera, &mut self.controls)
    }

    /// Attach edge overlays to every mesh of the model; returns the overlay count
    pub fn decorate_edges(&mut self) -> usize {
        let Some(id) = self.model else { return 0 };
        let Some(model) = self.scene.find_mut(id) else { return 0 };
        let created = decorate_edges(model);
        self.edge_overlays.extend(created);
        self.edge_overlays.len()
    }
}
