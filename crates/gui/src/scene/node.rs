use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use shared::Color;

use super::geometry::{Aabb, Geometry, LineGeometry};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Local translation / rotation / scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Surface material of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshMaterial {
    pub color: Color,
    /// Set when the material changed and has not been drawn since
    pub needs_update: bool,
}

impl MeshMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            needs_update: false,
        }
    }
}

/// Solid line material
#[derive(Debug, Clone, PartialEq)]
pub struct LineMaterial {
    pub color: Color,
    pub linewidth: f32,
}

impl Default for LineMaterial {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            linewidth: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: MeshMaterial,
}

#[derive(Debug, Clone)]
pub struct LineSegments {
    pub geometry: Arc<LineGeometry>,
    pub material: LineMaterial,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Sky/ground gradient light; direction comes from the node position
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
    /// Parallel light shining from the node position towards the origin
    Directional { color: Color, intensity: f32 },
}

/// Camera embedded in an asset (kept for the hierarchy, not used for viewing)
#[derive(Debug, Clone, PartialEq)]
pub struct CameraNode {
    pub yfov: f32,
    pub znear: f32,
    pub zfar: Option<f32>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
    LineSegments(LineSegments),
    Light(Light),
    Camera(CameraNode),
}

/// A scene-graph node owning its children
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            transform: Transform::IDENTITY,
            kind,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Arc<Geometry>, color: Color) -> Self {
        Self::new(
            name,
            NodeKind::Mesh(Mesh {
                geometry,
                material: MeshMaterial::new(color),
            }),
        )
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn add_child(&mut self, child: Node) -> NodeId {
        let id = child.id;
        self.children.push(child);
        id
    }

    /// Remove a node anywhere below this one
    pub fn detach(&mut self, id: NodeId) -> Option<Node> {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            return Some(self.children.remove(pos));
        }
        self.children.iter_mut().find_map(|c| c.detach(id))
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Depth-first, parent before children
    pub fn traverse<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    pub fn traverse_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }

    /// Depth-first walk passing each node's world matrix
    pub fn traverse_world<'a>(&'a self, parent: Mat4, f: &mut impl FnMut(&'a Node, Mat4)) {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.traverse_world(world, f);
        }
    }

    /// Visit every mesh node mutably
    pub fn visit_meshes_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        self.traverse_mut(&mut |node| {
            if node.is_mesh() {
                f(node);
            }
        });
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |node| {
            if node.is_mesh() {
                count += 1;
            }
        });
        count
    }

    /// World-space bounds of all mesh geometry below this node
    pub fn world_bounding_box(&self, parent: Mat4) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        self.traverse_world(parent, &mut |node, world| {
            let Some(mesh) = node.as_mesh() else { return };
            let Some(local) = mesh.geometry.bounding_box() else { return };
            let aabb = local.transformed(&world);
            bounds = Some(match bounds {
                Some(b) => b.union(&aabb),
                None => aabb,
            });
        });
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Arc<Geometry> {
        Arc::new(Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Vec::new(), None))
    }

    #[test]
    fn test_detach_nested() {
        let mut root = Node::group("root");
        let mut a = Node::group("a");
        let leaf_id = a.add_child(Node::group("leaf"));
        root.add_child(a);

        assert!(root.contains(leaf_id));
        let leaf = root.detach(leaf_id).unwrap();
        assert_eq!(leaf.name, "leaf");
        assert!(!root.contains(leaf_id));
        assert!(root.detach(leaf_id).is_none());
    }

    #[test]
    fn test_mesh_count_and_visit() {
        let mut root = Node::group("root");
        root.add_child(Node::mesh("m1", tri(), Color::WHITE));
        let mut g = Node::group("g");
        g.add_child(Node::mesh("m2", tri(), Color::WHITE));
        g.add_child(Node::new(
            "sun",
            NodeKind::Light(Light::Directional {
                color: Color::WHITE,
                intensity: 1.0,
            }),
        ));
        root.add_child(g);

        assert_eq!(root.mesh_count(), 2);
        let mut names = Vec::new();
        root.visit_meshes_mut(&mut |n| names.push(n.name.clone()));
        assert_eq!(names, vec!["m1", "m2"]);
    }

    #[test]
    fn test_world_bounds_follow_parent_transform() {
        let mut root = Node::group("root")
            .with_transform(Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        root.add_child(Node::mesh("m", tri(), Color::WHITE));

        let aabb = root.world_bounding_box(Mat4::IDENTITY).unwrap();
        assert_eq!(aabb.min, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(6.0, 1.0, 0.0));
    }

    #[test]
    fn test_empty_group_has_no_bounds() {
        assert!(Node::group("empty").world_bounding_box(Mat4::IDENTITY).is_none());
    }
}
