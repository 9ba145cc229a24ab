#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    // Run the concept map application
    concept_map_builder::run_app()
}

// The browser build is driven through the library; the binary is a stub there.
#[cfg(target_arch = "wasm32")]
fn main() {}
