//! Core data types and structures for the concept map builder.
//!
//! This module defines the map content records (nodes, connections, metadata),
//! the serializable interchange format, and the [`ConceptMap`] controller that
//! owns the authoritative node/connection lists.

use crate::constants;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for concept nodes.
///
/// Ids are plain strings in the interchange format; freshly created nodes
/// use the `node-<uuid>` form from [`new_node_id`].
pub type NodeId = String;

/// Generates a fresh unique node id.
pub fn new_node_id() -> NodeId {
    format!("node-{}", Uuid::new_v4())
}

/// The fixed set of shapes a concept node can take.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    /// Rounded rectangle, 128x64
    Rectangle,
    /// Circle, 96x96
    Circle,
    /// Diamond (rotated square inset into an 80x80 footprint)
    Diamond,
    /// Hexagon, 112x80
    Hexagon,
    /// Oval (wide ellipse), 128x80
    Oval,
}

impl NodeShape {
    /// Width and height of this shape's bounding box in world units.
    pub fn footprint(self) -> (f32, f32) {
        match self {
            NodeShape::Rectangle => (128.0, 64.0),
            NodeShape::Circle => (96.0, 96.0),
            NodeShape::Diamond => (80.0, 80.0),
            NodeShape::Hexagon => (112.0, 80.0),
            NodeShape::Oval => (128.0, 80.0),
        }
    }

    /// Display name used in the toolbar.
    pub fn label(self) -> &'static str {
        match self {
            NodeShape::Rectangle => "Rectangle",
            NodeShape::Circle => "Circle",
            NodeShape::Diamond => "Diamond",
            NodeShape::Hexagon => "Hexagon",
            NodeShape::Oval => "Oval",
        }
    }

    /// All shapes in toolbar order.
    pub const fn all() -> &'static [NodeShape] {
        &[
            NodeShape::Rectangle,
            NodeShape::Circle,
            NodeShape::Diamond,
            NodeShape::Hexagon,
            NodeShape::Oval,
        ]
    }
}

/// The fixed color palette offered by the toolbar.
///
/// Nodes store the *resolved* display color string, not the palette name,
/// so imported maps keep their colors even if the palette changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeColor {
    /// Blue palette entry
    Blue,
    /// Green palette entry
    Green,
    /// Orange palette entry
    Orange,
    /// Purple palette entry
    Purple,
    /// Pink palette entry
    Pink,
    /// Teal palette entry
    Teal,
}

impl NodeColor {
    /// Resolved display color stored on nodes and used for rendering.
    pub fn display_color(self) -> &'static str {
        match self {
            NodeColor::Blue => "#4a8fd9",
            NodeColor::Green => "#3fae6a",
            NodeColor::Orange => "#e8923a",
            NodeColor::Purple => "#8e6bd4",
            NodeColor::Pink => "#e06a9e",
            NodeColor::Teal => "#2fa8a0",
        }
    }

    /// Palette name shown in the toolbar status line.
    pub fn label(self) -> &'static str {
        match self {
            NodeColor::Blue => "blue",
            NodeColor::Green => "green",
            NodeColor::Orange => "orange",
            NodeColor::Purple => "purple",
            NodeColor::Pink => "pink",
            NodeColor::Teal => "teal",
        }
    }

    /// All palette entries in toolbar order.
    pub const fn all() -> &'static [NodeColor] {
        &[
            NodeColor::Blue,
            NodeColor::Green,
            NodeColor::Orange,
            NodeColor::Purple,
            NodeColor::Pink,
            NodeColor::Teal,
        ]
    }
}

/// A labeled, positioned, shaped, colored point in the diagram.
///
/// `(x, y)` is the top-left corner of the node's bounding box in logical
/// (world) space; the plane is unbounded and positions are never validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConceptNode {
    /// Unique identifier within the map
    pub id: NodeId,
    /// Horizontal position in world units
    pub x: f32,
    /// Vertical position in world units
    pub y: f32,
    /// User-editable label text
    pub text: String,
    /// Resolved display color string (hex)
    pub color: String,
    /// Shape of the node
    pub shape: NodeShape,
}

/// A link between two nodes: unique per unordered pair, rendered directionally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    /// Id of the source node
    pub from: NodeId,
    /// Id of the destination node
    pub to: NodeId,
}

impl Connection {
    /// Creates a new connection between two nodes.
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether this connection links the same unordered pair as `(a, b)`.
    pub fn links(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// Whether this connection references `id` as either endpoint.
    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

/// Metadata attached to exported maps and templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MapMetadata {
    /// Human-readable title
    #[serde(default)]
    pub title: String,
    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 creation timestamp
    #[serde(default)]
    pub created: String,
    /// Interchange format version
    #[serde(default)]
    pub version: String,
}

impl MapMetadata {
    /// Metadata stamped with the current time and format version.
    pub fn stamped_now() -> Self {
        Self {
            title: String::new(),
            description: None,
            created: chrono::Utc::now().to_rfc3339(),
            version: constants::FORMAT_VERSION.to_string(),
        }
    }
}

/// The interchange unit for export, import, and template loading.
///
/// `nodes` must be present in imported JSON; a missing or non-sequence
/// `nodes` field is a deserialization error. `connections` and `metadata`
/// default when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConceptMapData {
    /// Ordered node sequence
    pub nodes: Vec<ConceptNode>,
    /// Ordered connection sequence
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Map metadata
    #[serde(default)]
    pub metadata: MapMetadata,
}

impl ConceptMapData {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON, enforcing the `nodes`-is-a-sequence contract.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Partial fields merged into a node by [`ConceptMap::upsert_node`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    /// New horizontal position, if set
    pub x: Option<f32>,
    /// New vertical position, if set
    pub y: Option<f32>,
    /// New label text, if set
    pub text: Option<String>,
    /// New display color, if set
    pub color: Option<String>,
    /// New shape, if set
    pub shape: Option<NodeShape>,
}

impl NodeUpdate {
    /// Update that only moves a node.
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Update that only renames a node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// The authoritative map state: ordered node and connection sequences.
///
/// All mutation funnels through the operations here; the interaction layer
/// only ever talks to this through intents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptMap {
    /// All nodes in the map, in creation order
    pub nodes: Vec<ConceptNode>,
    /// All connections, in creation order
    pub connections: Vec<Connection>,
}

impl ConceptMap {
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the map has no content.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&ConceptNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Merges `update` into the node with `id`, or creates the node if it
    /// does not exist yet.
    ///
    /// Created nodes default unset positions to 0.0, text to the
    /// placeholder literal, and color/shape to the supplied fallbacks
    /// (the toolbar's current selection).
    pub fn upsert_node(
        &mut self,
        id: &str,
        update: NodeUpdate,
        fallback_color: &str,
        fallback_shape: NodeShape,
    ) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            if let Some(x) = update.x {
                node.x = x;
            }
            if let Some(y) = update.y {
                node.y = y;
            }
            if let Some(text) = update.text {
                node.text = text;
            }
            if let Some(color) = update.color {
                node.color = color;
            }
            if let Some(shape) = update.shape {
                node.shape = shape;
            }
        } else {
            self.nodes.push(ConceptNode {
                id: id.to_string(),
                x: update.x.unwrap_or(0.0),
                y: update.y.unwrap_or(0.0),
                text: update
                    .text
                    .unwrap_or_else(|| constants::DEFAULT_NODE_TEXT.to_string()),
                color: update
                    .color
                    .unwrap_or_else(|| fallback_color.to_string()),
                shape: update.shape.unwrap_or(fallback_shape),
            });
        }
    }

    /// Removes the node with `id` and cascades removal of every connection
    /// referencing it as either endpoint. Returns whether a node was removed;
    /// absent ids are a silent no-op.
    ///
    /// This cascade is the sole referential-integrity rule in the system.
    pub fn delete_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        let removed = self.nodes.len() != before;
        if removed {
            self.connections.retain(|c| !c.touches(id));
        }
        removed
    }

    /// Appends a connection unless it would be a self-loop or duplicate the
    /// unordered pair (in either direction). Returns whether a connection
    /// was added. Endpoint existence is not validated.
    pub fn create_connection(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        if self.connections.iter().any(|c| c.links(from, to)) {
            return false;
        }
        self.connections.push(Connection::new(from, to));
        true
    }

    /// Removes the connection matching the unordered pair, in either
    /// direction. Returns whether anything was removed.
    pub fn delete_connection(&mut self, from: &str, to: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| !c.links(from, to));
        self.connections.len() != before
    }

    /// Resets both sequences to empty. Callers are responsible for the
    /// interactive confirmation required when the map is non-empty.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
    }

    /// Replaces the whole map content from interchange data. Only ever
    /// called with fully-validated data; never applies partially.
    pub fn replace_with(&mut self, data: ConceptMapData) {
        self.nodes = data.nodes;
        self.connections = data.connections;
    }

    /// Snapshot of the map as interchange data stamped with the current time.
    pub fn to_export_data(&self) -> ConceptMapData {
        ConceptMapData {
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
            metadata: MapMetadata::stamped_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_update_at(x: f32, y: f32) -> NodeUpdate {
        NodeUpdate::position(x, y)
    }

    #[test]
    fn upsert_creates_node_with_requested_id_and_defaults() {
        let mut map = ConceptMap::new();
        map.upsert_node("a", NodeUpdate::default(), "#4a8fd9", NodeShape::Rectangle);

        assert_eq!(map.nodes.len(), 1);
        let node = &map.nodes[0];
        assert_eq!(node.id, "a");
        assert_eq!((node.x, node.y), (0.0, 0.0));
        assert_eq!(node.text, "New Concept");
        assert_eq!(node.color, "#4a8fd9");
        assert_eq!(node.shape, NodeShape::Rectangle);
    }

    #[test]
    fn upsert_merges_into_existing_node_without_duplicating() {
        let mut map = ConceptMap::new();
        map.upsert_node("a", node_update_at(10.0, 20.0), "#4a8fd9", NodeShape::Circle);
        map.upsert_node("a", NodeUpdate::text("Renamed"), "#3fae6a", NodeShape::Diamond);

        assert_eq!(map.nodes.len(), 1);
        let node = &map.nodes[0];
        assert_eq!(node.text, "Renamed");
        // Unset fields keep their previous values
        assert_eq!((node.x, node.y), (10.0, 20.0));
        assert_eq!(node.shape, NodeShape::Circle);
    }

    #[test]
    fn upsert_keeps_ids_unique() {
        let mut map = ConceptMap::new();
        for _ in 0..3 {
            map.upsert_node("a", NodeUpdate::default(), "#4a8fd9", NodeShape::Rectangle);
        }
        assert_eq!(map.nodes.iter().filter(|n| n.id == "a").count(), 1);
    }

    #[test]
    fn delete_node_cascades_to_connections() {
        let mut map = ConceptMap::new();
        for id in ["a", "b", "c"] {
            map.upsert_node(id, NodeUpdate::default(), "#4a8fd9", NodeShape::Rectangle);
        }
        assert!(map.create_connection("a", "b"));
        assert!(map.create_connection("b", "c"));
        assert!(map.create_connection("a", "c"));

        assert!(map.delete_node("b"));

        assert!(map.connections.iter().all(|c| !c.touches("b")));
        assert_eq!(map.connections.len(), 1);
        assert!(map.node("b").is_none());
        assert!(map.node("c").is_some());
    }

    #[test]
    fn delete_missing_node_is_a_noop() {
        let mut map = ConceptMap::new();
        map.upsert_node("a", NodeUpdate::default(), "#4a8fd9", NodeShape::Rectangle);
        assert!(!map.delete_node("ghost"));
        assert_eq!(map.nodes.len(), 1);
    }

    #[test]
    fn reverse_duplicate_connection_is_rejected() {
        let mut map = ConceptMap::new();
        assert!(map.create_connection("a", "b"));
        assert!(!map.create_connection("b", "a"));
        assert!(!map.create_connection("a", "b"));
        assert_eq!(map.connections.len(), 1);
    }

    #[test]
    fn self_connection_is_rejected() {
        let mut map = ConceptMap::new();
        assert!(!map.create_connection("a", "a"));
        assert!(map.connections.is_empty());
    }

    #[test]
    fn delete_connection_matches_either_direction() {
        let mut map = ConceptMap::new();
        assert!(map.create_connection("a", "b"));
        assert!(map.delete_connection("b", "a"));
        assert!(map.connections.is_empty());
    }

    #[test]
    fn export_import_round_trip_preserves_content() {
        let mut map = ConceptMap::new();
        map.upsert_node("a", node_update_at(100.0, 150.0), "#4a8fd9", NodeShape::Hexagon);
        map.upsert_node("b", node_update_at(300.0, 150.0), "#e06a9e", NodeShape::Oval);
        map.create_connection("a", "b");

        let json = map.to_export_data().to_json().expect("export serializes");
        let restored = ConceptMapData::from_json(&json).expect("export re-imports");

        // Equal ignoring the metadata timestamp
        assert_eq!(restored.nodes, map.nodes);
        assert_eq!(restored.connections, map.connections);
        assert_eq!(restored.metadata.version, "1.0");
    }

    #[test]
    fn import_rejects_missing_nodes_field() {
        assert!(ConceptMapData::from_json(r#"{"foo": 1}"#).is_err());
        assert!(ConceptMapData::from_json(r#"{"nodes": 42}"#).is_err());
        assert!(ConceptMapData::from_json("not json at all").is_err());
    }

    #[test]
    fn import_defaults_missing_connections_and_metadata() {
        let data = ConceptMapData::from_json(
            r##"{"nodes": [{"id": "a", "x": 1.0, "y": 2.0, "text": "A",
                 "color": "#4a8fd9", "shape": "diamond"}]}"##,
        )
        .expect("nodes-only import is valid");
        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.nodes[0].shape, NodeShape::Diamond);
        assert!(data.connections.is_empty());
        assert!(data.metadata.created.is_empty());
    }

    #[test]
    fn generated_node_ids_are_unique() {
        let a = new_node_id();
        let b = new_node_id();
        assert_ne!(a, b);
        assert!(a.starts_with("node-"));
    }

    #[test]
    fn export_metadata_is_stamped() {
        let map = ConceptMap::new();
        let data = map.to_export_data();
        assert!(!data.metadata.created.is_empty());
        assert_eq!(data.metadata.version, "1.0");
    }
}
