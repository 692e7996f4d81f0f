//! Asset fetching and glTF decoding
//!
//! Fetches run as background tasks (a tokio runtime natively,
//! `spawn_local` in the browser). Each task reports back over an mpsc
//! channel that the UI thread polls once per frame.

use std::collections::HashMap;
use std::future::Future;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};

use glam::{Quat, Vec3};
use shared::Color;
use thiserror::Error;

use crate::scene::{CameraNode, Geometry, Node, NodeKind, Transform};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request for {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("asset contains no scene")]
    NoScene,

    #[error("mesh '{0}' has a primitive without positions")]
    MissingPositions(String),

    #[error("fetch was dropped before completing")]
    Cancelled,
}

// ── Decoding ─────────────────────────────────────────────────

/// Decode a binary glTF into a node tree rooted at a group named `name`.
///
/// Uses the default scene, or the first scene when none is marked default.
pub fn decode_glb(bytes: &[u8], name: &str) -> Result<Node, LoadError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::NoScene)?;

    let mut root = Node::group(name);
    for node in scene.nodes() {
        root.add_child(convert_node(&node, &buffers)?);
    }
    tracing::info!(
        "Decoded '{name}': {} top-level nodes, {} meshes",
        root.children().len(),
        root.mesh_count()
    );
    Ok(root)
}

fn convert_node(node: &gltf::Node<'_>, buffers: &[gltf::buffer::Data]) -> Result<Node, LoadError> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let mut out = if let Some(mesh) = node.mesh() {
        convert_mesh(&name, &mesh, buffers)?
    } else if let Some(camera) = node.camera() {
        match camera.projection() {
            gltf::camera::Projection::Perspective(p) => Node::new(
                name,
                NodeKind::Camera(CameraNode {
                    yfov: p.yfov(),
                    znear: p.znear(),
                    zfar: p.zfar(),
                }),
            ),
            gltf::camera::Projection::Orthographic(_) => Node::group(name),
        }
    } else {
        Node::group(name)
    };

    let (translation, rotation, scale) = node.transform().decomposed();
    out.transform = Transform {
        translation: Vec3::from(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from(scale),
    };

    for child in node.children() {
        out.add_child(convert_node(&child, buffers)?);
    }
    Ok(out)
}

/// One mesh node per triangle primitive; several primitives become a group
fn convert_mesh(
    name: &str,
    mesh: &gltf::Mesh<'_>,
    buffers: &[gltf::buffer::Data],
) -> Result<Node, LoadError> {
    let mut parts = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::warn!("Skipping {:?} primitive in mesh '{name}'", primitive.mode());
            continue;
        }
        let reader = primitive.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| LoadError::MissingPositions(name.to_string()))?
            .map(Vec3::from)
            .collect();
        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|n| n.map(Vec3::from).collect())
            .unwrap_or_default();
        let indices = reader.read_indices().map(|i| i.into_u32().collect());

        let [r, g, b, _a] = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();
        let color = Color::from_rgb_f32([r, g, b]);

        parts.push((Arc::new(Geometry::new(positions, normals, indices)), color));
    }

    if parts.len() == 1 {
        let (geometry, color) = parts.remove(0);
        return Ok(Node::mesh(name, geometry, color));
    }
    let mut group = Node::group(name);
    for (i, (geometry, color)) in parts.into_iter().enumerate() {
        group.add_child(Node::mesh(format!("{name}_{i}"), geometry, color));
    }
    Ok(group)
}

// ── Sources ──────────────────────────────────────────────────

/// HTTP asset root (the static server, or the page origin in a browser)
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| LoadError::Http {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(LoadError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| LoadError::Http {
            path: path.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

/// In-memory files keyed by relative path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), bytes.into());
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    fn get(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }
}

/// Where model files come from
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// Directory containing `models/`
    #[cfg(not(target_arch = "wasm32"))]
    Dir(PathBuf),
    Http(HttpSource),
    Memory(MemorySource),
}

impl AssetSource {
    pub async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            AssetSource::Dir(root) => {
                let full = root.join(path);
                tokio::fs::read(&full).await.map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        LoadError::NotFound(full.display().to_string())
                    } else {
                        LoadError::Io {
                            path: full.display().to_string(),
                            source,
                        }
                    }
                })
            }
            AssetSource::Http(http) => http.fetch(path).await,
            AssetSource::Memory(memory) => memory.get(path),
        }
    }

    /// Human-readable root, for logs and the status bar
    pub fn describe(&self) -> String {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            AssetSource::Dir(root) => root.display().to_string(),
            AssetSource::Http(http) => http.base.clone(),
            AssetSource::Memory(_) => "memory".to_string(),
        }
    }
}

// ── Background fetches ───────────────────────────────────────

pub type FetchResult = Result<Vec<u8>, LoadError>;

/// Result slot of a fetch running in the background.
///
/// Dropping it discards the result when it arrives.
pub struct PendingFetch {
    path: String,
    rx: Receiver<FetchResult>,
}

impl PendingFetch {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Non-blocking check; `Some` exactly once the fetch has finished
    pub fn poll(&self) -> Option<FetchResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Cancelled)),
        }
    }

    /// Block until the fetch finishes
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait(self) -> FetchResult {
        self.rx.recv().unwrap_or(Err(LoadError::Cancelled))
    }
}

/// Runs fetch tasks off the UI thread
pub struct Spawner {
    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Runtime,
}

impl Spawner {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("asset-fetch")
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Start fetching `path` from `source`
    pub fn fetch(&self, source: &AssetSource, path: &str) -> PendingFetch {
        let (tx, rx) = mpsc::channel();
        let source = source.clone();
        let task_path = path.to_string();
        self.spawn(async move {
            let result = source.fetch(&task_path).await;
            if let Err(e) = &result {
                tracing::debug!("Fetch of {task_path} failed: {e}");
            }
            // Receiver gone means the result is no longer wanted
            let _ = tx.send(result);
        });
        PendingFetch {
            path: path.to_string(),
            rx,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(task);
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + 'static,
    {
        wasm_bindgen_futures::spawn_local(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{box_glb, two_box_glb};

    #[test]
    fn test_decode_box() {
        let node = decode_glb(&box_glb([2.0, 4.0, 6.0], [0.0; 3]), "box").unwrap();
        assert_eq!(node.name, "box");
        assert_eq!(node.mesh_count(), 1);
        let bounds = node.world_bounding_box(glam::Mat4::IDENTITY).unwrap();
        assert_eq!(bounds.size(), Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_decode_two_meshes() {
        let node = decode_glb(&two_box_glb(), "pair").unwrap();
        assert_eq!(node.mesh_count(), 2);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_glb(b"definitely not glTF", "x").unwrap_err();
        assert!(matches!(err, LoadError::Gltf(_)));
    }

    #[test]
    fn test_http_url_joining() {
        let http = HttpSource::new("http://localhost:3001/");
        assert_eq!(
            http.url("models/box/box.glb"),
            "http://localhost:3001/models/box/box.glb"
        );
    }

    #[test]
    fn test_memory_fetch_through_spawner() {
        let memory = MemorySource::new();
        memory.insert("models/box/box.glb", vec![1, 2, 3]);
        let source = AssetSource::Memory(memory);
        let spawner = Spawner::new().unwrap();

        let found = spawner.fetch(&source, "models/box/box.glb").wait().unwrap();
        assert_eq!(found, vec![1, 2, 3]);

        let missing = spawner.fetch(&source, "models/box/box_params.json").wait();
        assert!(matches!(missing, Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_dir_source_reads_files() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("models/box")).unwrap();
        std::fs::write(root.path().join("models/box/box.glb"), b"glb").unwrap();

        let spawner = Spawner::new().unwrap();
        let source = AssetSource::Dir(root.path().to_path_buf());
        assert_eq!(spawner.fetch(&source, "models/box/box.glb").wait().unwrap(), b"glb");
        assert!(matches!(
            spawner.fetch(&source, "models/none/none.glb").wait(),
            Err(LoadError::NotFound(_))
        ));
    }
}
