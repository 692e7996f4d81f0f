// Library crate: scene, loading, parameters and the frame loop, all testable
// without a window. The eframe app, widgets and GL renderer live in the binary.

pub mod context;
pub mod fixtures;
pub mod form;
pub mod frame_loop;
#[cfg(not(target_arch = "wasm32"))]
pub mod harness;
pub mod loader;
pub mod render;
pub mod scene;
pub mod settings;
pub mod state;
pub mod update;

/// Camera, framing and edge extraction. Input handling and GL drawing stay in the binary.
pub mod viewport {
    pub mod camera;
    pub mod edges;
    pub mod fit;
}
