//! Application state management structures.
//!
//! This module contains the state structures that track the application's
//! current UI state: canvas navigation, the gesture state machine, file
//! operations, toast notifications, and the main [`ConceptMapApp`].

use crate::types::*;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// The current pointer gesture on the canvas.
///
/// Dragging, panning, and connecting are mutually exclusive per gesture, so
/// they live in one tagged variant; text editing can overlap with none of
/// them by construction and is tracked separately in [`InteractionState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// No gesture in progress
    Idle,
    /// A node is being dragged; `grab_offset` is the world-space offset
    /// from the node's top-left corner to the pointer at grab time, so the
    /// node does not jump under the cursor.
    Dragging {
        /// Id of the dragged node
        id: NodeId,
        /// World-space pointer offset fixed at grab time
        grab_offset: egui::Vec2,
    },
    /// The canvas background is being panned; `last` is the previous
    /// pointer position in screen space.
    Panning {
        /// Last screen-space pointer position
        last: egui::Pos2,
    },
    /// Connect mode has armed a source node; the next node click completes
    /// or cancels the connection. Survives pointer-up.
    Connecting {
        /// Id of the armed source node
        source: NodeId,
    },
}

/// State related to canvas navigation and display.
///
/// Zoom and pan are ephemeral, per-session view state; they are never
/// serialized and reset with the view.
pub struct CanvasState {
    /// Current zoom factor (1.0 = normal)
    pub zoom_factor: f32,
    /// Current pan offset in world units
    pub pan: egui::Vec2,
    /// Screen-space origin of the canvas widget, updated every frame
    pub origin: egui::Pos2,
    /// Screen-space rectangle of the canvas, if it has been drawn yet.
    /// `None` until the first frame; PDF export needs this.
    pub rect: Option<egui::Rect>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            zoom_factor: 1.0,
            pan: egui::Vec2::ZERO,
            origin: egui::Pos2::ZERO,
            rect: None,
        }
    }
}

/// State related to user interactions with nodes and the canvas.
pub struct InteractionState {
    /// The current pointer gesture
    pub gesture: Gesture,
    /// Node whose text is being edited inline, if any
    pub editing_node: Option<NodeId>,
    /// Buffer backing the inline text editor
    pub editing_text: String,
    /// Whether focus was already requested for the current edit session
    pub focus_requested_for_edit: bool,
    /// Node selected by the last pointer-down, if any
    pub selected_node: Option<NodeId>,
    /// Index of the selected connection, if any
    pub selected_connection: Option<usize>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            gesture: Gesture::Idle,
            editing_node: None,
            editing_text: String::new(),
            focus_requested_for_edit: false,
            selected_node: None,
            selected_connection: None,
        }
    }
}

/// Intents emitted by the canvas gesture handlers and applied to the
/// [`ConceptMap`] controller once per frame.
///
/// The interaction layer never mutates the map directly.
#[derive(Debug, Clone, PartialEq)]
pub enum MapIntent {
    /// Create a node or merge partial fields into an existing one
    UpsertNode {
        /// Target node id
        id: NodeId,
        /// Fields to merge
        update: NodeUpdate,
    },
    /// Delete a node, cascading its connections
    DeleteNode {
        /// Target node id
        id: NodeId,
    },
    /// Create a connection between two nodes
    CreateConnection {
        /// Source node id
        from: NodeId,
        /// Destination node id
        to: NodeId,
    },
    /// Delete the connection matching the unordered pair
    DeleteConnection {
        /// One endpoint
        from: NodeId,
        /// The other endpoint
        to: NodeId,
    },
}

/// Represents a pending file operation waiting to be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingFileOperation {
    /// Export the map as JSON via a save dialog / download
    ExportJson,
    /// Import a map from a JSON file via an open dialog / picker
    ImportJson,
    /// Capture the viewport and export it as a single-page PDF
    ExportPdf,
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// An export finished; carries the file name for the toast
    ExportCompleted(String),
    /// An import read file contents that still need parsing/validation
    ImportCompleted(String),
    /// The operation failed with a user-facing message
    OperationFailed(String),
}

/// State related to async file operations.
///
/// Dialogs and file I/O run as detached tasks; their results come back over
/// the mpsc channel and are applied on the UI thread each frame.
pub struct FileState {
    /// Operation queued this frame, dispatched by `handle_pending_operations`
    pub pending_operation: Option<PendingFileOperation>,
    /// Sender cloned into async tasks
    pub sender: Sender<FileOperationResult>,
    /// Receiver drained once per frame
    pub receiver: Receiver<FileOperationResult>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            pending_operation: None,
            sender,
            receiver,
        }
    }
}

/// Destructive actions that require user confirmation before proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmAction {
    /// User is clearing the canvas
    ClearCanvas,
    /// User is starting a new map
    NewMap,
}

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Routine confirmation of a mutation
    Info,
    /// A failure the user should notice
    Error,
}

/// A transient notification shown in the corner of the window.
pub struct Toast {
    /// Message text
    pub message: String,
    /// Severity
    pub kind: ToastKind,
    /// `egui` time at which the toast was raised
    pub shown_at: f64,
}

impl Toast {
    /// Seconds a toast stays fully visible before fading.
    pub const FADE_START: f64 = 2.0;
    /// Seconds after which a toast is removed.
    pub const DURATION: f64 = 2.5;

    /// Opacity in [0, 1] for the given current time.
    pub fn opacity(&self, now: f64) -> f32 {
        let elapsed = now - self.shown_at;
        if elapsed < Self::FADE_START {
            1.0
        } else if elapsed < Self::DURATION {
            (1.0 - (elapsed - Self::FADE_START) / (Self::DURATION - Self::FADE_START)) as f32
        } else {
            0.0
        }
    }

    /// Whether the toast should be dropped.
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.shown_at >= Self::DURATION
    }
}

/// The main application structure containing UI state and the map data.
///
/// This struct implements the `eframe::App` trait and handles all user
/// interface rendering and interaction logic.
pub struct ConceptMapApp {
    /// The authoritative map being edited
    pub map: ConceptMap,
    /// Palette color applied to newly created nodes
    pub selected_color: NodeColor,
    /// Shape applied to newly created nodes
    pub selected_shape: NodeShape,
    /// Whether node clicks arm/complete connections instead of dragging
    pub connect_mode: bool,
    /// Canvas navigation state
    pub canvas: CanvasState,
    /// Gesture and editing state
    pub interaction: InteractionState,
    /// Async file operation state
    pub file: FileState,
    /// Intents emitted by the canvas this frame, drained in `update`
    pub pending_intents: Vec<MapIntent>,
    /// Active toast notifications
    pub toasts: Vec<Toast>,
    /// Destructive action awaiting confirmation, if any
    pub pending_confirm: Option<PendingConfirmAction>,
}

impl Default for ConceptMapApp {
    fn default() -> Self {
        Self {
            map: ConceptMap::new(),
            selected_color: NodeColor::Blue,
            selected_shape: NodeShape::Rectangle,
            connect_mode: false,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            file: FileState::default(),
            pending_intents: Vec::new(),
            toasts: Vec::new(),
            pending_confirm: None,
        }
    }
}

impl ConceptMapApp {
    /// Queues an intent for application at the end of input handling.
    pub fn emit(&mut self, intent: MapIntent) {
        self.pending_intents.push(intent);
    }

    /// Raises a transient notification.
    pub fn push_toast(&mut self, kind: ToastKind, message: impl Into<String>, now: f64) {
        self.toasts.push(Toast {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    /// Starts inline text editing for the given node.
    pub fn begin_text_edit(&mut self, id: &str) {
        if let Some(node) = self.map.node(id) {
            self.interaction.editing_text = node.text.clone();
            self.interaction.editing_node = Some(id.to_string());
            self.interaction.focus_requested_for_edit = false;
        }
    }

    /// Exits inline text editing, if active.
    pub fn end_text_edit(&mut self) {
        self.interaction.editing_node = None;
        self.interaction.editing_text.clear();
        self.interaction.focus_requested_for_edit = false;
    }
}
