//! Edge extraction for mesh overlays
//!
//! Keeps boundary edges and creases whose adjacent faces meet at more than
//! [`EDGE_THRESHOLD_DEGREES`]. Vertices are merged by quantized position so
//! split-normal meshes (one vertex per face corner) still share edges.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;

use crate::scene::{Geometry, LineGeometry, LineMaterial, LineSegments, Node, NodeId, NodeKind};

/// Dihedral angle above which an edge between two faces is drawn
pub const EDGE_THRESHOLD_DEGREES: f32 = 1.0;

/// Decimal places kept when merging vertex positions
const PRECISION_POINTS: i32 = 4;

type QuantizedPos = (i64, i64, i64);

fn quantize_position(pos: Vec3) -> QuantizedPos {
    let scale = 10f32.powi(PRECISION_POINTS);
    (
        (pos.x * scale).round() as i64,
        (pos.y * scale).round() as i64,
        (pos.z * scale).round() as i64,
    )
}

/// Half-edge waiting for its twin
struct OpenEdge {
    start: Vec3,
    end: Vec3,
    normal: Vec3,
}

/// Build the overlay line geometry for a triangle mesh
pub fn edges_geometry(geometry: &Geometry, threshold_degrees: f32) -> LineGeometry {
    let threshold_dot = threshold_degrees.to_radians().cos();
    let positions = geometry.positions();

    // Directed edge -> open half-edge; `None` once matched with its reverse
    let mut edge_map: HashMap<(QuantizedPos, QuantizedPos), Option<OpenEdge>> = HashMap::new();
    let mut order: Vec<(QuantizedPos, QuantizedPos)> = Vec::new();
    let mut out: Vec<Vec3> = Vec::new();

    for [i0, i1, i2] in geometry.triangles() {
        let (Some(&a), Some(&b), Some(&c)) = (
            positions.get(i0 as usize),
            positions.get(i1 as usize),
            positions.get(i2 as usize),
        ) else {
            continue;
        };

        let verts = [a, b, c];
        let hashes = [quantize_position(a), quantize_position(b), quantize_position(c)];

        // Degenerate triangle
        if hashes[0] == hashes[1] || hashes[1] == hashes[2] || hashes[2] == hashes[0] {
            continue;
        }

        let normal = (b - a).cross(c - a).normalize_or_zero();

        for j in 0..3 {
            let next = (j + 1) % 3;
            let key = (hashes[j], hashes[next]);
            let reverse = (hashes[next], hashes[j]);

            if let Some(slot) = edge_map.get_mut(&reverse) {
                if let Some(open) = slot.take() {
                    if normal.dot(open.normal) <= threshold_dot {
                        out.push(verts[j]);
                        out.push(verts[next]);
                    }
                    continue;
                }
            }

            if !edge_map.contains_key(&key) {
                edge_map.insert(
                    key,
                    Some(OpenEdge {
                        start: verts[j],
                        end: verts[next],
                        normal,
                    }),
                );
                order.push(key);
            }
        }
    }

    // Unmatched half-edges are boundaries
    for key in order {
        if let Some(Some(open)) = edge_map.remove(&key) {
            out.push(open.start);
            out.push(open.end);
        }
    }

    LineGeometry::new(out)
}

/// Attach a black edge overlay under every mesh of `model`.
///
/// Returns the ids of the created overlay nodes in traversal order.
pub fn decorate_edges(model: &mut Node) -> Vec<NodeId> {
    let mut overlays = Vec::new();
    model.visit_meshes_mut(&mut |node| {
        let Some(mesh) = node.as_mesh() else { return };
        let lines = edges_geometry(&mesh.geometry, EDGE_THRESHOLD_DEGREES);
        tracing::debug!(
            "Edges for '{}': {} segments from {} triangles",
            node.name,
            lines.segment_count(),
            mesh.geometry.triangle_count()
        );
        let overlay = Node::new(
            format!("{}_edges", node.name),
            NodeKind::LineSegments(LineSegments {
                geometry: Arc::new(lines),
                material: LineMaterial::default(),
            }),
        );
        overlays.push(node.add_child(overlay));
    });
    overlays
}
