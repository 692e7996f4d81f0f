use std::path::Path;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::AppState;
use shared::ModelPaths;

/// API routes, `/models/**` from the model directory, everything else from the web bundle
pub fn router(state: AppState) -> Router {
    let models = ServeDir::new(&state.models_dir);
    let web = ServeDir::new(&state.web_dir);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/models", get(list_models))
        .nest_service("/models", models)
        .fallback_service(web)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: String,
    pub has_parameters: bool,
}

/// Models with a `<name>/<name>.glb` asset, sorted by name
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let models = scan_models(&state.models_dir).await.map_err(|e| {
        tracing::error!("Failed to list {}: {e}", state.models_dir.display());
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(json!({ "models": models })))
}

async fn scan_models(dir: &Path) -> std::io::Result<Vec<ModelEntry>> {
    let mut models = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(models),
        Err(e) => return Err(e),
    };

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let paths = ModelPaths::new(name);
        let model_dir = entry.path();
        if !tokio::fs::try_exists(model_dir.join(paths.asset_file_name())).await? {
            continue;
        }
        let has_parameters =
            tokio::fs::try_exists(model_dir.join(paths.parameters_file_name())).await?;
        models.push(ModelEntry {
            name: paths.name,
            has_parameters,
        });
    }

    models.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn fixture() -> (tempfile::TempDir, AppState) {
        let root = tempfile::tempdir().unwrap();
        let models = root.path().join("models");
        let web = root.path().join("web");

        std::fs::create_dir_all(models.join("box")).unwrap();
        std::fs::write(models.join("box/box.glb"), b"glTF-bytes").unwrap();
        std::fs::write(models.join("box/box_params.json"), br#"{"breedte": 50}"#).unwrap();

        std::fs::create_dir_all(models.join("chair")).unwrap();
        std::fs::write(models.join("chair/chair.glb"), b"glTF-bytes").unwrap();

        // Directory without an asset is not a model
        std::fs::create_dir_all(models.join("notes")).unwrap();

        std::fs::create_dir_all(&web).unwrap();
        std::fs::write(web.join("index.html"), "<canvas id=\"the_canvas_id\"></canvas>").unwrap();

        let state = AppState {
            models_dir: models,
            web_dir: web,
        };
        (root, state)
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (_root, state) = fixture();
        let (status, body) = get(state, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_models() {
        let (_root, state) = fixture();
        let (status, body) = get(state, "/api/models").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value["models"],
            json!([
                { "name": "box", "has_parameters": true },
                { "name": "chair", "has_parameters": false }
            ])
        );
    }

    #[tokio::test]
    async fn test_serves_model_files() {
        let (_root, state) = fixture();
        let (status, body) = get(state.clone(), "/models/box/box_params.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, br#"{"breedte": 50}"#);

        let (status, _) = get(state, "/models/box/missing.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_falls_back_to_web_bundle() {
        let (_root, state) = fixture();
        let (status, body) = get(state, "/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("the_canvas_id"));
    }

    #[tokio::test]
    async fn test_missing_models_dir_lists_nothing() {
        let (root, mut state) = fixture();
        state.models_dir = root.path().join("nowhere");
        let (status, body) = get(state, "/api/models").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["models"], json!([]));
    }
}
