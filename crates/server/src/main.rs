use std::path::PathBuf;

use clap::Parser;

mod routes;

/// Serve model assets and the viewer's web build
#[derive(Debug, Parser)]
#[command(name = "server", version, about)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Directory holding one subdirectory per model
    #[arg(long, default_value = "models")]
    models: PathBuf,

    /// Directory with the web bundle (index.html, wasm, js)
    #[arg(long, default_value = "web")]
    web: PathBuf,
}

#[derive(Clone)]
pub struct AppState {
    pub models_dir: PathBuf,
    pub web_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let state = AppState {
        models_dir: args.models,
        web_dir: args.web,
    };
    tracing::info!(
        "Models from {}, web bundle from {}",
        state.models_dir.display(),
        state.web_dir.display()
    );

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {addr}: {e}");
            return;
        }
    };
    tracing::info!("Server running on http://localhost:{}", args.port);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {e}");
    }
}
