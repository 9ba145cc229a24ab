//! Shared application-wide constants.
//! Centralizes tweakable values used across UI rendering and interactions.

// Zoom
/// Lowest zoom factor the canvas will reach.
pub const ZOOM_MIN: f32 = 0.3;
/// Highest zoom factor the canvas will reach.
pub const ZOOM_MAX: f32 = 3.0;
/// Multiplier applied per scroll-wheel step (inverse applied when zooming out).
pub const ZOOM_WHEEL_STEP: f32 = 1.1;
/// Multiplier applied by the toolbar zoom buttons.
pub const ZOOM_BUTTON_STEP: f32 = 1.2;

// Connections
/// Offset from a node's top-left corner to its connection anchor point,
/// in world units. A fixed approximation of the node center shared by all shapes.
pub const ANCHOR_OFFSET_X: f32 = 60.0;
/// See [`ANCHOR_OFFSET_X`].
pub const ANCHOR_OFFSET_Y: f32 = 30.0;
/// Distance subtracted from a connection at the destination end so the
/// arrowhead does not overlap the node body (world units).
pub const ARROW_CLEARANCE: f32 = 40.0;
/// A connection is never drawn shorter than this (world units).
pub const MIN_CONNECTION_LENGTH: f32 = 30.0;
/// Click threshold in world units for selecting a connection line.
pub const CONNECTION_CLICK_THRESHOLD: f32 = 10.0;

// Export
/// Raster scale applied when capturing the viewport for PDF export.
pub const PDF_EXPORT_SCALE: f32 = 2.0;
/// Background fill behind the captured viewport.
pub const PDF_BACKGROUND: &str = "#f8fafc";

/// Placeholder label given to freshly created nodes.
pub const DEFAULT_NODE_TEXT: &str = "New Concept";
/// Format version written into exported map metadata.
pub const FORMAT_VERSION: &str = "1.0";
