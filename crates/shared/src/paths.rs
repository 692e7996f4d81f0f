//! Per-model resource layout: `models/<name>/<name>.glb` + `models/<name>/<name>_params.json`

use serde::{Deserialize, Serialize};

/// Directory that holds one subdirectory per model
pub const MODELS_DIR: &str = "models";

/// Model loaded when nothing else is configured
pub const DEFAULT_MODEL: &str = "box";

/// Relative resource paths of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPaths {
    pub name: String,
}

impl ModelPaths {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn directory(&self) -> String {
        format!("{MODELS_DIR}/{}", self.name)
    }

    /// Binary glTF asset
    pub fn asset(&self) -> String {
        format!("{}/{}", self.directory(), self.asset_file_name())
    }

    /// Parameter JSON sitting next to the asset
    pub fn parameters(&self) -> String {
        format!("{}/{}", self.directory(), self.parameters_file_name())
    }

    pub fn asset_file_name(&self) -> String {
        format!("{}.glb", self.name)
    }

    pub fn parameters_file_name(&self) -> String {
        format!("{}_params.json", self.name)
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let p = ModelPaths::default();
        assert_eq!(p.asset(), "models/box/box.glb");
        assert_eq!(p.parameters(), "models/box/box_params.json");
    }

    #[test]
    fn test_file_names() {
        let p = ModelPaths::new("chair");
        assert_eq!(p.directory(), "models/chair");
        assert_eq!(p.asset_file_name(), "chair.glb");
        assert_eq!(p.parameters_file_name(), "chair_params.json");
    }
}
