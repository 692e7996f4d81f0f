//! Scene graph: a tree of group, mesh, line, light and camera nodes

mod geometry;
mod node;

pub use geometry::{Aabb, Geometry, GeometryId, LineGeometry};
pub use node::{
    CameraNode, Light, LineMaterial, LineSegments, Mesh, MeshMaterial, Node, NodeId, NodeKind,
    Transform,
};

use shared::Color;

/// Root of everything that gets drawn
pub struct Scene {
    pub background: Color,
    root: Node,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            background: Color::WHITE,
            root: Node::group("scene"),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Add a top-level node
    pub fn add(&mut self, node: Node) -> NodeId {
        self.root.add_child(node)
    }

    /// Remove a node from wherever it sits in the tree
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.root.detach(id)
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.root.contains(id)
    }

    /// Clear `needs_update` on every mesh material; returns how many were set
    pub fn clear_material_updates(&mut self) -> usize {
        let mut cleared = 0;
        self.root.visit_meshes_mut(&mut |node| {
            if let Some(mesh) = node.as_mesh_mut() {
                if mesh.material.needs_update {
                    mesh.material.needs_update = false;
                    cleared += 1;
                }
            }
        });
        cleared
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
