//! Triangle and line geometry plus axis-aligned bounds

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Mat4, Vec3};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an immutable geometry buffer (used as the GPU upload key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        Self(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Triangle geometry: positions, per-vertex normals, optional index list
#[derive(Debug, Clone)]
pub struct Geometry {
    id: GeometryId,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Option<Vec<u32>>,
}

impl Geometry {
    /// Build a geometry; vertex normals are computed when `normals` does not match `positions`
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Option<Vec<u32>>) -> Self {
        let mut geometry = Self {
            id: GeometryId::next(),
            positions,
            normals,
            indices,
        };
        if geometry.normals.len() != geometry.positions.len() {
            geometry.compute_vertex_normals();
        }
        geometry
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(idx) => idx.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Vertex indices of each triangle, for indexed and non-indexed geometry alike
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| match &self.indices {
            Some(idx) => [idx[t * 3], idx[t * 3 + 1], idx[t * 3 + 2]],
            None => {
                let base = (t * 3) as u32;
                [base, base + 1, base + 2]
            }
        })
    }

    /// Local-space bounds; `None` for an empty geometry
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Interleaved `[pos.xyz, normal.xyz]` vertex stream for upload
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.positions.len() * 6);
        for (p, n) in self.positions.iter().zip(&self.normals) {
            out.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
        out
    }

    fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        let tris: Vec<[u32; 3]> = self.triangles().collect();
        for [a, b, c] in tris {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals.into_iter().map(Vec3::normalize_or_zero).collect();
    }
}

/// Line-segment geometry: consecutive position pairs form one segment
#[derive(Debug, Clone)]
pub struct LineGeometry {
    id: GeometryId,
    positions: Vec<Vec3>,
}

impl LineGeometry {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            id: GeometryId::next(),
            positions,
        }
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn segment_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.positions.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// Flat `[x, y, z]` stream for upload
    pub fn flattened(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.expand_to(p);
        }
        Some(aabb)
    }

    pub fn expand_to(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three extents
    pub fn max_dim(&self) -> f32 {
        self.size().max_element()
    }

    /// Bounds of the 8 transformed corners
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let mut out = Aabb::new(m.transform_point3(corners[0]), m.transform_point3(corners[0]));
        for c in &corners[1..] {
            out.expand_to(m.transform_point3(*c));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_center_and_size() {
        let aabb = Aabb::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 4.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.size(), Vec3::new(4.0, 4.0, 2.0));
        assert_eq!(aabb.max_dim(), 4.0);
    }

    #[test]
    fn test_aabb_transformed_by_translation_and_scale() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 1.0),
            glam::Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );
        let t = aabb.transformed(&m);
        assert_eq!(t.min, Vec3::new(8.0, -1.0, -1.0));
        assert_eq!(t.max, Vec3::new(12.0, 1.0, 1.0));
    }

    #[test]
    fn test_computed_normals_face_outward() {
        let g = Geometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            Vec::new(),
            None,
        );
        assert_eq!(g.normals().len(), 3);
        for n in g.normals() {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_geometry_ids_unique() {
        let a = LineGeometry::new(Vec::new());
        let b = LineGeometry::new(Vec::new());
        assert_ne!(a.id(), b.id());
    }
}
