use dioxus_logger::tracing::error;

use mindli_ui::PageConfig;

fn main() {
    let document = match mindli_ui::document() {
        Ok(document) => document,
        Err(e) => {
            // Nothing to log into without a window; fall back to the console default.
            wasm_logger::init(wasm_logger::Config::default());
            log::error!("mindli-ui cannot start: {e}");
            return;
        }
    };

    let (config, config_error) = match PageConfig::from_document(&document) {
        Ok(config) => (config, None),
        Err(e) => (PageConfig::default(), Some(e)),
    };

    // Initialize logging for WASM
    let level = config.log_level();
    wasm_logger::init(wasm_logger::Config::new(level));
    dioxus_logger::init(mindli_ui::tracing_level(level)).ok();

    if let Some(e) = config_error {
        error!("{e}; using default page config");
    }

    if let Err(e) = mindli_ui::boot(&document, config) {
        error!("mindli-ui boot failed: {e}");
    }
}
