//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, node dragging, connect-mode
//! clicks, double-click creation/editing, hit testing, and the coordinate
//! transformations between screen and logical (world) space.
//!
//! Gesture handlers take plain positions so they can be driven directly by
//! tests; `handle_canvas_input` wires them to egui events.

use super::state::{ConceptMapApp, Gesture, MapIntent};
use crate::constants;
use crate::types::*;
use eframe::egui;

impl ConceptMapApp {
    /// Converts screen coordinates to world coordinates accounting for the
    /// canvas origin, zoom, and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (((screen_pos - self.canvas.origin) / self.canvas.zoom_factor) - self.canvas.pan).to_pos2()
    }

    /// Converts world coordinates to screen coordinates: pan is a world-space
    /// additive offset, zoom a single outer scale about the canvas origin.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        self.canvas.origin + (world_pos.to_vec2() + self.canvas.pan) * self.canvas.zoom_factor
    }

    /// Bounding box of a node in world space. `(x, y)` is the top-left corner.
    pub fn node_rect_world(node: &ConceptNode) -> egui::Rect {
        let (w, h) = node.shape.footprint();
        egui::Rect::from_min_size(egui::pos2(node.x, node.y), egui::vec2(w, h))
    }

    /// Connection anchor point of a node in world space: a fixed offset into
    /// the bounding box approximating its center.
    pub fn node_anchor_world(node: &ConceptNode) -> egui::Pos2 {
        egui::pos2(
            node.x + constants::ANCHOR_OFFSET_X,
            node.y + constants::ANCHOR_OFFSET_Y,
        )
    }

    /// Finds the topmost node at the given world position, if any.
    pub fn find_node_at_position(&self, pos: egui::Pos2) -> Option<NodeId> {
        // Later nodes draw on top, so hit-test in reverse order
        self.map
            .nodes
            .iter()
            .rev()
            .find(|n| Self::node_rect_world(n).contains(pos))
            .map(|n| n.id.clone())
    }

    /// The drawn segment of a connection in world space: from the source
    /// anchor toward the destination anchor, shortened at the destination
    /// end so the arrowhead clears the node body.
    pub fn connection_segment(&self, connection: &Connection) -> Option<(egui::Pos2, egui::Pos2)> {
        let from = self.map.node(&connection.from).map(Self::node_anchor_world)?;
        let to = self.map.node(&connection.to).map(Self::node_anchor_world)?;
        let delta = to - from;
        let distance = delta.length();
        if distance < f32::EPSILON {
            return Some((from, to));
        }
        let shortened = (distance - constants::ARROW_CLEARANCE).max(constants::MIN_CONNECTION_LENGTH);
        Some((from, from + delta * (shortened / distance)))
    }

    /// Finds the connection whose drawn segment is within the click
    /// threshold of the given world position, if any.
    pub fn find_connection_at_position(&self, pos: egui::Pos2) -> Option<usize> {
        self.map.connections.iter().enumerate().find_map(|(idx, conn)| {
            let (start, end) = self.connection_segment(conn)?;
            (point_to_segment_distance(pos, start, end) < constants::CONNECTION_CLICK_THRESHOLD)
                .then_some(idx)
        })
    }

    /// Handles a primary-button press at the given screen position.
    ///
    /// On a node this starts a drag, or arms/completes a connection when
    /// connect mode is on; on empty background it starts a pan.
    pub fn on_primary_down(&mut self, screen_pos: egui::Pos2) {
        let world_pos = self.screen_to_world(screen_pos);

        if let Some(node_id) = self.find_node_at_position(world_pos) {
            self.interaction.selected_node = Some(node_id.clone());
            self.interaction.selected_connection = None;

            if self.connect_mode {
                match &self.interaction.gesture {
                    Gesture::Connecting { source } if *source != node_id => {
                        let from = source.clone();
                        self.interaction.gesture = Gesture::Idle;
                        self.emit(MapIntent::CreateConnection { from, to: node_id });
                    }
                    Gesture::Connecting { .. } => {
                        // Clicking the armed source again disarms without creating
                        self.interaction.gesture = Gesture::Idle;
                    }
                    _ => {
                        self.interaction.gesture = Gesture::Connecting { source: node_id };
                    }
                }
            } else if let Some(node) = self.map.node(&node_id) {
                let grab_offset = world_pos - egui::pos2(node.x, node.y);
                self.interaction.gesture = Gesture::Dragging {
                    id: node_id,
                    grab_offset,
                };
            }
        } else {
            self.interaction.selected_node = None;
            self.interaction.selected_connection = self.find_connection_at_position(world_pos);
            // Pressing empty background claims the gesture for panning; an
            // armed connection source is dropped with it.
            self.interaction.gesture = Gesture::Panning { last: screen_pos };
        }
    }

    /// Handles pointer movement at the given screen position.
    ///
    /// Dragging recomputes the node position from the pointer, zoom, pan and
    /// the fixed grab offset, emitting a move intent on every event; panning
    /// accumulates the screen delta divided by zoom so it feels consistent
    /// across zoom levels.
    pub fn on_pointer_move(&mut self, screen_pos: egui::Pos2) {
        match self.interaction.gesture.clone() {
            Gesture::Dragging { id, grab_offset } => {
                let world_pos = self.screen_to_world(screen_pos);
                let new_pos = world_pos - grab_offset;
                self.emit(MapIntent::UpsertNode {
                    id,
                    update: NodeUpdate::position(new_pos.x, new_pos.y),
                });
            }
            Gesture::Panning { last } => {
                let delta = screen_pos - last;
                self.canvas.pan += delta / self.canvas.zoom_factor;
                self.interaction.gesture = Gesture::Panning { last: screen_pos };
            }
            _ => {}
        }
    }

    /// Handles pointer release: dragging and panning end unconditionally,
    /// while an armed connection source stays armed.
    pub fn on_pointer_up(&mut self) {
        if matches!(
            self.interaction.gesture,
            Gesture::Dragging { .. } | Gesture::Panning { .. }
        ) {
            self.interaction.gesture = Gesture::Idle;
        }
    }

    /// Applies one scroll-wheel step: zoom in for wheel-up, out for
    /// wheel-down, clamped to the zoom range.
    pub fn on_wheel(&mut self, scroll_delta_y: f32) {
        if scroll_delta_y == 0.0 {
            return;
        }
        let step = if scroll_delta_y > 0.0 {
            constants::ZOOM_WHEEL_STEP
        } else {
            1.0 / constants::ZOOM_WHEEL_STEP
        };
        self.canvas.zoom_factor =
            (self.canvas.zoom_factor * step).clamp(constants::ZOOM_MIN, constants::ZOOM_MAX);
    }

    /// Toolbar zoom-in step.
    pub fn zoom_in(&mut self) {
        self.canvas.zoom_factor = (self.canvas.zoom_factor * constants::ZOOM_BUTTON_STEP)
            .clamp(constants::ZOOM_MIN, constants::ZOOM_MAX);
    }

    /// Toolbar zoom-out step.
    pub fn zoom_out(&mut self) {
        self.canvas.zoom_factor = (self.canvas.zoom_factor / constants::ZOOM_BUTTON_STEP)
            .clamp(constants::ZOOM_MIN, constants::ZOOM_MAX);
    }

    /// Restores the default view: zoom 1.0, pan (0, 0).
    pub fn reset_view(&mut self) {
        self.canvas.zoom_factor = 1.0;
        self.canvas.pan = egui::Vec2::ZERO;
    }

    /// Handles a double-click: on a node, enter text editing; on empty
    /// background, create a node at the inverse-transformed position with
    /// the currently selected shape/color and immediately edit its text.
    pub fn on_double_click(&mut self, screen_pos: egui::Pos2) {
        let world_pos = self.screen_to_world(screen_pos);

        if let Some(node_id) = self.find_node_at_position(world_pos) {
            self.begin_text_edit(&node_id);
            return;
        }

        let id = new_node_id();
        self.emit(MapIntent::UpsertNode {
            id: id.clone(),
            update: NodeUpdate {
                x: Some(world_pos.x),
                y: Some(world_pos.y),
                text: Some(constants::DEFAULT_NODE_TEXT.to_string()),
                color: Some(self.selected_color.display_color().to_string()),
                shape: Some(self.selected_shape),
            },
        });
        // The node materializes when the intent is applied; arm the editor now
        self.interaction.selected_node = Some(id.clone());
        self.interaction.editing_text = constants::DEFAULT_NODE_TEXT.to_string();
        self.interaction.editing_node = Some(id);
        self.interaction.focus_requested_for_edit = false;
    }

    /// Wires egui pointer and wheel events on the canvas widget to the
    /// gesture handlers above.
    pub fn handle_canvas_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        self.canvas.origin = response.rect.min;
        self.canvas.rect = Some(response.rect);

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.on_double_click(pos);
            }
        }

        let (primary_pressed, primary_down, primary_released) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
            )
        });

        if primary_pressed {
            if let Some(pos) = response.interact_pointer_pos() {
                self.on_primary_down(pos);
            }
        } else if primary_down {
            if let Some(pos) = response.interact_pointer_pos() {
                self.on_pointer_move(pos);
            }
        }
        if primary_released {
            self.on_pointer_up();
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.on_wheel(scroll);
            }
        }
    }
}

/// Distance from a point to a line segment, via clamped projection.
fn point_to_segment_distance(point: egui::Pos2, start: egui::Pos2, end: egui::Pos2) -> f32 {
    let seg = end - start;
    let to_point = point - start;
    let len_sq = seg.length_sq();
    if len_sq < 0.0001 {
        return to_point.length();
    }
    let t = (to_point.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (start + seg * t)).length()
}
