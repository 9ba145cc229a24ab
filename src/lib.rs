//! # Concept Map Builder
//!
//! An interactive concept-map editor built on an infinite pannable, zoomable
//! canvas. Concepts are labeled, colored nodes in one of five shapes,
//! linked by directional arrows.
//!
//! ## Features
//! - Double-click node creation with inline text editing
//! - Node dragging, connect mode, and connection selection
//! - Canvas panning and zooming with a clamped zoom range
//! - Built-in starter templates
//! - JSON export/import of the whole map
//! - PDF export of the visible viewport (native builds)

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod constants;
mod templates;
mod types;
mod ui;

// Re-export public types and functions
pub use templates::*;
pub use types::*;
pub use ui::ConceptMapApp;

/// Runs the concept map application with default settings.
///
/// This function initializes the egui application window and starts the main
/// event loop. A tokio runtime is entered for the lifetime of the window so
/// file dialogs can run as detached tasks.
///
/// # Example
///
/// ```no_run
/// use concept_map_builder::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> Result<(), eframe::Error> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        eframe::Error::AppCreation(Box::new(e))
    })?;
    let _guard = runtime.enter();

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Concept Map Builder",
        options,
        Box::new(|_cc| Ok(Box::new(ConceptMapApp::default()))),
    )
}
