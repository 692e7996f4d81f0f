//! Viewer state shared by the app and the headless harness
//!
//! Owns the scene context, the parameter object and the form. Fetch
//! results are handed in as they arrive; nothing here does I/O.

use std::fmt;

use shared::{ModelPaths, ParameterError, Parameters};
use thiserror::Error;

use crate::context::{SceneContext, Viewport};
use crate::form::{Applied, FormChange, ParameterForm};
use crate::loader::{decode_glb, FetchResult, LoadError};
use crate::scene::NodeId;
use crate::update::{apply_color, apply_scale};

/// Why the parameter object could not be set up
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParameterError),
}

/// One-line status shown under the viewport
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading(String),
    Ready(String),
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "Idle"),
            Status::Loading(what) => write!(f, "Loading {what}…"),
            Status::Ready(msg) => write!(f, "{msg}"),
            Status::Failed(msg) => write!(f, "Error: {msg}"),
        }
    }
}

pub struct ViewerState {
    pub context: SceneContext,
    pub parameters: Option<Parameters>,
    pub form: ParameterForm,
    pub status: Status,
    paths: ModelPaths,
}

impl ViewerState {
    pub fn new(viewport: Viewport, paths: ModelPaths) -> Self {
        Self {
            context: SceneContext::new(viewport),
            parameters: None,
            form: ParameterForm::new(),
            status: Status::Idle,
            paths,
        }
    }

    pub fn paths(&self) -> &ModelPaths {
        &self.paths
    }

    /// Switch to another model; the caller starts the asset fetch
    pub fn begin_load(&mut self, paths: ModelPaths) {
        tracing::info!("Loading model '{}'", paths.name);
        self.status = Status::Loading(paths.asset());
        self.paths = paths;
    }

    /// Install a fetched asset: replace the old model, frame it and outline its edges.
    ///
    /// On failure the previous scene is left as it was.
    pub fn on_model_loaded(&mut self, result: FetchResult) -> Result<NodeId, LoadError> {
        let node = match result.and_then(|bytes| decode_glb(&bytes, &self.paths.name)) {
            Ok(node) => node,
            Err(e) => {
                tracing::error!("Failed to load {}: {e}", self.paths.asset());
                self.status = Status::Failed(e.to_string());
                return Err(e);
            }
        };

        let id = self.context.install_model(node);
        self.parameters = None;
        self.form.clear();

        self.context.fit_camera();
        let overlays = self.context.decorate_edges();
        tracing::info!(
            "Model '{}' ready with {overlays} edge overlays",
            self.paths.name
        );
        self.status = Status::Ready(format!("Loaded {}", self.paths.name));
        Ok(id)
    }

    /// Parse the parameter file, build the form and apply scale then color once.
    ///
    /// On failure the model stays as loaded and no form is built.
    pub fn on_parameters_loaded(&mut self, result: FetchResult) -> Result<(), FetchError> {
        let parsed = result
            .map_err(FetchError::from)
            .and_then(|bytes| Parameters::from_slice(&bytes).map_err(FetchError::from));

        let mut params = match parsed {
            Ok(params) => params,
            Err(e) => {
                tracing::error!("Failed to load {}: {e}", self.paths.parameters());
                self.parameters = None;
                self.form.clear();
                return Err(e);
            }
        };

        if params.ensure_color() {
            tracing::info!("No color parameter, using default");
        }
        self.form.rebuild(&params);
        apply_scale(&mut self.context, &params);
        if let Some(color) = params.color() {
            apply_color(&mut self.context, color);
        }
        self.parameters = Some(params);
        Ok(())
    }

    /// Route a form edit to the parameters and the model
    pub fn apply_form_change(&mut self, change: FormChange) -> Applied {
        let Some(params) = self.parameters.as_mut() else {
            return Applied::Ignored;
        };
        self.form.apply(change, params, &mut self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{box_glb, params_json};

    fn state() -> ViewerState {
        ViewerState::new(Viewport::new(800.0, 600.0), ModelPaths::default())
    }

    #[test]
    fn test_failed_model_load_keeps_scene() {
        let mut s = state();
        assert!(s.on_model_loaded(Ok(box_glb([1.0; 3], [0.0; 3]))).is_ok());
        let before = s.context.model_id();

        let err = s.on_model_loaded(Err(LoadError::NotFound("x".into())));
        assert!(err.is_err());
        assert_eq!(s.context.model_id(), before);
        assert!(matches!(s.status, Status::Failed(_)));
    }

    #[test]
    fn test_params_build_form_and_apply() {
        let mut s = state();
        s.on_model_loaded(Ok(box_glb([1.0; 3], [0.0; 3]))).unwrap();
        s.on_parameters_loaded(Ok(params_json(50.0, 80.0, 120.0, None).into_bytes()))
            .unwrap();
        assert_eq!(s.form.len(), 4);
        assert_eq!(
            s.parameters.as_ref().and_then(Parameters::color),
            Some(shared::Color::from_u32(0x00aaff))
        );
    }

    #[test]
    fn test_invalid_params_build_no_form() {
        let mut s = state();
        s.on_model_loaded(Ok(box_glb([1.0; 3], [0.0; 3]))).unwrap();
        let err = s.on_parameters_loaded(Ok(b"{not json".to_vec())).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert!(s.form.is_empty());
        assert!(s.parameters.is_none());
    }

    #[test]
    fn test_form_change_without_parameters_is_ignored() {
        let mut s = state();
        let applied = s.apply_form_change(FormChange::Number {
            key: "breedte".into(),
            text: "10".into(),
        });
        assert_eq!(applied, Applied::Ignored);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(Status::Failed("boom".into()).to_string(), "Error: boom");
        assert_eq!(Status::Ready("Loaded box".into()).to_string(), "Loaded box");
    }
}
