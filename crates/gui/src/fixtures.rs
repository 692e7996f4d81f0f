//! Factory functions for test data: synthetic GLB assets and parameter files.

use serde_json::{json, Value};

/// Corners of the unit cube, index = x + 2y + 4z
const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// Outward-facing (counter-clockwise) triangles of the cube
const CUBE_INDICES: [u32; 36] = [
    0, 2, 3, 0, 3, 1, // -Z
    4, 5, 7, 4, 7, 6, // +Z
    0, 4, 6, 0, 6, 2, // -X
    1, 3, 7, 1, 7, 5, // +X
    0, 1, 5, 0, 5, 4, // -Y
    2, 6, 7, 2, 7, 3, // +Y
];

/// Triangle list for the GLB builder
#[derive(Debug, Clone)]
pub struct PrimitiveData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub color: [f32; 3],
}

/// Axis-aligned box of `size` centered at `center`
pub fn box_primitive(size: [f32; 3], center: [f32; 3]) -> PrimitiveData {
    let positions = CUBE_CORNERS
        .iter()
        .map(|c| {
            [
                center[0] + (c[0] - 0.5) * size[0],
                center[1] + (c[1] - 0.5) * size[1],
                center[2] + (c[2] - 0.5) * size[2],
            ]
        })
        .collect();
    PrimitiveData {
        positions,
        indices: CUBE_INDICES.to_vec(),
        color: [0.8, 0.8, 0.8],
    }
}

/// Minimal binary glTF writer: one node per mesh, all data in one buffer
#[derive(Debug, Default)]
pub struct GlbBuilder {
    meshes: Vec<(String, Vec<PrimitiveData>)>,
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(mut self, name: &str, primitives: Vec<PrimitiveData>) -> Self {
        self.meshes.push((name.to_string(), primitives));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bin: Vec<u8> = Vec::new();
        let mut views: Vec<Value> = Vec::new();
        let mut accessors: Vec<Value> = Vec::new();
        let mut materials: Vec<Value> = Vec::new();
        let mut meshes: Vec<Value> = Vec::new();
        let mut nodes: Vec<Value> = Vec::new();

        for (mesh_index, (name, primitives)) in self.meshes.iter().enumerate() {
            let mut prims = Vec::new();
            for prim in primitives {
                let (min, max) = bounds(&prim.positions);

                let offset = bin.len();
                for p in &prim.positions {
                    for c in p {
                        bin.extend_from_slice(&c.to_le_bytes());
                    }
                }
                views.push(json!({
                    "buffer": 0,
                    "byteOffset": offset,
                    "byteLength": bin.len() - offset,
                    "target": 34962
                }));
                accessors.push(json!({
                    "bufferView": views.len() - 1,
                    "componentType": 5126,
                    "count": prim.positions.len(),
                    "type": "VEC3",
                    "min": min,
                    "max": max
                }));
                let position_accessor = accessors.len() - 1;

                let offset = bin.len();
                for i in &prim.indices {
                    bin.extend_from_slice(&i.to_le_bytes());
                }
                views.push(json!({
                    "buffer": 0,
                    "byteOffset": offset,
                    "byteLength": bin.len() - offset,
                    "target": 34963
                }));
                accessors.push(json!({
                    "bufferView": views.len() - 1,
                    "componentType": 5125,
                    "count": prim.indices.len(),
                    "type": "SCALAR"
                }));
                let index_accessor = accessors.len() - 1;

                materials.push(json!({
                    "pbrMetallicRoughness": {
                        "baseColorFactor": [prim.color[0], prim.color[1], prim.color[2], 1.0]
                    }
                }));

                prims.push(json!({
                    "attributes": { "POSITION": position_accessor },
                    "indices": index_accessor,
                    "material": materials.len() - 1,
                    "mode": 4
                }));
            }
            meshes.push(json!({ "name": name, "primitives": prims }));
            nodes.push(json!({ "name": name, "mesh": mesh_index }));
        }

        let root = json!({
            "asset": { "version": "2.0", "generator": "model-viewer fixtures" },
            "scene": 0,
            "scenes": [{ "nodes": (0..nodes.len()).collect::<Vec<_>>() }],
            "nodes": nodes,
            "meshes": meshes,
            "materials": materials,
            "accessors": accessors,
            "bufferViews": views,
            "buffers": [{ "byteLength": bin.len() }]
        });

        assemble_glb(root.to_string().into_bytes(), bin)
    }
}

fn bounds(points: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in points {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    (min, max)
}

/// 12-byte header, then a space-padded JSON chunk and a zero-padded BIN chunk
fn assemble_glb(mut json: Vec<u8>, mut bin: Vec<u8>) -> Vec<u8> {
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);

    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

// ── Ready-made assets ───────────────────────────────────────────

/// Single box mesh
pub fn box_glb(size: [f32; 3], center: [f32; 3]) -> Vec<u8> {
    GlbBuilder::new()
        .mesh("Box", vec![box_primitive(size, center)])
        .build()
}

/// Two separate box meshes side by side
pub fn two_box_glb() -> Vec<u8> {
    GlbBuilder::new()
        .mesh("Left", vec![box_primitive([1.0; 3], [-2.0, 0.0, 0.0])])
        .mesh("Right", vec![box_primitive([1.0; 3], [2.0, 0.0, 0.0])])
        .build()
}

/// One mesh with two primitives (decodes to a group with two meshes)
pub fn multi_primitive_glb() -> Vec<u8> {
    GlbBuilder::new()
        .mesh(
            "Assembly",
            vec![
                box_primitive([1.0; 3], [0.0, 0.0, 0.0]),
                box_primitive([1.0; 3], [0.0, 3.0, 0.0]),
            ],
        )
        .build()
}

/// Parameter file with all three scale keys and an optional color
pub fn params_json(breedte: f64, hoogte: f64, lengte: f64, kleur: Option<&str>) -> String {
    let mut value = json!({
        "breedte": breedte,
        "Hoogte": hoogte,
        "Lengte": lengte,
    });
    if let (Some(color), Some(map)) = (kleur, value.as_object_mut()) {
        map.insert("kleur".to_string(), Value::String(color.to_string()));
    }
    value.to_string()
}
