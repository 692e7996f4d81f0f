mod app;
mod ui;
mod viewport;

use app::ViewerApp;
use model_viewer_lib::loader::{AssetSource, HttpSource};
use model_viewer_lib::settings::ViewerSettings;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use model_viewer_lib::settings::CliArgs;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "model_viewer=info,model_viewer_lib=info".into()),
        )
        .init();

    // Settings file first, then --model / --assets / --url
    let cli = CliArgs::parse();
    let mut settings = ViewerSettings::load();
    settings.apply_cli(cli);

    let source = match &settings.base_url {
        Some(url) => AssetSource::Http(HttpSource::new(url.clone())),
        None => AssetSource::Dir(settings.asset_root.clone()),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Model Viewer: {}", settings.model))
            .with_inner_size(settings.window_size)
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "model-viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, settings, source)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(window) = web_sys::window() else {
            tracing::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            tracing::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("the_canvas_id")
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            tracing::error!("Canvas 'the_canvas_id' not found");
            return;
        };

        // Assets are served next to the page
        let origin = window.location().origin().unwrap_or_default();
        let source = AssetSource::Http(HttpSource::new(origin));
        let settings = ViewerSettings::load();

        if let Err(e) = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, settings, source)))),
            )
            .await
        {
            tracing::error!("Failed to start eframe: {e:?}");
        }
    });
}
