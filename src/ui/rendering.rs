//! Map rendering functionality.
//!
//! Draws connections, nodes in their five shapes, selection and connect-mode
//! highlights, and the inline text editor overlay. All geometry is computed
//! in world units and transformed to screen space at paint time.

use super::state::{ConceptMapApp, Gesture, MapIntent};
use crate::types::*;
use eframe::egui;
use eframe::egui::StrokeKind;

/// Points used to approximate ellipses as polygons.
const ELLIPSE_SEGMENTS: usize = 48;

impl ConceptMapApp {
    /// Renders the whole map: connections first so nodes draw on top.
    pub fn render_map(&self, painter: &egui::Painter) {
        for (idx, connection) in self.map.connections.iter().enumerate() {
            let is_selected = self.interaction.selected_connection == Some(idx);
            self.draw_connection(painter, connection, is_selected);
        }
        for node in &self.map.nodes {
            self.draw_node(painter, node);
        }
    }

    /// Draws a connection as a line from the source anchor toward the
    /// destination anchor, shortened so the arrowhead clears the target,
    /// with a filled triangle arrowhead at the destination end.
    pub fn draw_connection(
        &self,
        painter: &egui::Painter,
        connection: &Connection,
        is_selected: bool,
    ) {
        let Some((start_world, end_world)) = self.connection_segment(connection) else {
            return;
        };
        let start = self.world_to_screen(start_world);
        let end = self.world_to_screen(end_world);

        let (line_color, line_width) = if is_selected {
            (egui::Color32::from_rgb(100, 150, 255), 3.0)
        } else {
            (egui::Color32::from_rgb(71, 85, 105), 2.0)
        };

        painter.line_segment([start, end], egui::Stroke::new(line_width, line_color));
        self.draw_arrowhead(painter, start, end, line_color);
    }

    /// Draws the directional arrowhead at the destination end of a
    /// connection, oriented along the segment.
    fn draw_arrowhead(
        &self,
        painter: &egui::Painter,
        start: egui::Pos2,
        end: egui::Pos2,
        color: egui::Color32,
    ) {
        let direction = (end - start).normalized();
        if !direction.is_finite() {
            return;
        }

        let arrow_size = 10.0 * self.canvas.zoom_factor;
        let arrow_width = 6.0 * self.canvas.zoom_factor;
        let perpendicular = egui::vec2(-direction.y, direction.x);

        let base = end - direction * arrow_size;
        painter.add(egui::Shape::convex_polygon(
            vec![
                end,
                base + perpendicular * arrow_width,
                base - perpendicular * arrow_width,
            ],
            color,
            egui::Stroke::NONE,
        ));
    }

    /// Draws a node in its shape with selection and connect-mode highlights,
    /// then its centered label text.
    pub fn draw_node(&self, painter: &egui::Painter, node: &ConceptNode) {
        let world_rect = Self::node_rect_world(node);
        let rect = egui::Rect::from_min_max(
            self.world_to_screen(world_rect.min),
            self.world_to_screen(world_rect.max),
        );

        let fill = parse_hex_color(&node.color);
        self.draw_node_shape(painter, node.shape, rect, fill);

        // Armed connection source gets a white ring, selection a light one
        let is_armed_source = matches!(
            &self.interaction.gesture,
            Gesture::Connecting { source } if *source == node.id
        );
        if is_armed_source {
            self.stroke_node_shape(
                painter,
                node.shape,
                rect,
                egui::Stroke::new(3.0, egui::Color32::WHITE),
            );
        } else if self.interaction.selected_node.as_deref() == Some(node.id.as_str()) {
            self.stroke_node_shape(
                painter,
                node.shape,
                rect,
                egui::Stroke::new(2.0, egui::Color32::from_rgb(226, 232, 240)),
            );
        }

        // The inline editor overlay replaces the painted label while active
        if self.interaction.editing_node.as_deref() != Some(node.id.as_str()) {
            self.draw_node_text(painter, &node.text, rect);
        }
    }

    /// Fills the given shape within its bounding rectangle.
    fn draw_node_shape(
        &self,
        painter: &egui::Painter,
        shape: NodeShape,
        rect: egui::Rect,
        fill: egui::Color32,
    ) {
        match shape {
            NodeShape::Rectangle => {
                painter.rect_filled(rect, 8.0 * self.canvas.zoom_factor, fill);
            }
            NodeShape::Circle | NodeShape::Oval => {
                painter.add(egui::Shape::convex_polygon(
                    ellipse_points(rect),
                    fill,
                    egui::Stroke::NONE,
                ));
            }
            NodeShape::Diamond => {
                painter.add(egui::Shape::convex_polygon(
                    diamond_points(rect),
                    fill,
                    egui::Stroke::NONE,
                ));
            }
            NodeShape::Hexagon => {
                painter.add(egui::Shape::convex_polygon(
                    hexagon_points(rect),
                    fill,
                    egui::Stroke::NONE,
                ));
            }
        }
    }

    /// Strokes the outline of the given shape within its bounding rectangle.
    fn stroke_node_shape(
        &self,
        painter: &egui::Painter,
        shape: NodeShape,
        rect: egui::Rect,
        stroke: egui::Stroke,
    ) {
        match shape {
            NodeShape::Rectangle => {
                painter.rect_stroke(
                    rect,
                    8.0 * self.canvas.zoom_factor,
                    stroke,
                    StrokeKind::Outside,
                );
            }
            NodeShape::Circle | NodeShape::Oval => {
                painter.add(egui::Shape::closed_line(ellipse_points(rect), stroke));
            }
            NodeShape::Diamond => {
                painter.add(egui::Shape::closed_line(diamond_points(rect), stroke));
            }
            NodeShape::Hexagon => {
                painter.add(egui::Shape::closed_line(hexagon_points(rect), stroke));
            }
        }
    }

    /// Renders a node label: white, wrapped, centered both ways, never
    /// rotated regardless of shape.
    fn draw_node_text(&self, painter: &egui::Painter, text: &str, rect: egui::Rect) {
        let scaled_font_size = (13.0 * self.canvas.zoom_factor).clamp(8.0, 40.0);
        let font_id = egui::FontId::proportional(scaled_font_size);

        let max_width = rect.width() - 12.0 * self.canvas.zoom_factor;
        let lines = self.wrap_text(text, max_width, &font_id, painter);

        let line_height = painter.fonts_mut(|f| f.row_height(&font_id));
        let total_height = line_height * lines.len() as f32;
        let start_y = rect.center().y - total_height / 2.0 + line_height / 2.0;

        for (i, line) in lines.iter().enumerate() {
            painter.text(
                egui::pos2(rect.center().x, start_y + i as f32 * line_height),
                egui::Align2::CENTER_CENTER,
                line,
                font_id.clone(),
                egui::Color32::WHITE,
            );
        }
    }

    /// Wraps text at word boundaries to fit within `max_width`. A single
    /// word that is too long gets its own line anyway.
    pub fn wrap_text(
        &self,
        text: &str,
        max_width: f32,
        font_id: &egui::FontId,
        painter: &egui::Painter,
    ) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return vec![text.to_string()];
        }

        let mut lines = Vec::new();
        let mut current_line = String::new();

        for word in words {
            let test_line = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current_line, word)
            };

            let text_width = painter.fonts_mut(|f| {
                f.layout_no_wrap(test_line.clone(), font_id.clone(), egui::Color32::WHITE)
                    .size()
                    .x
            });

            if text_width <= max_width {
                current_line = test_line;
            } else if !current_line.is_empty() {
                lines.push(current_line);
                current_line = word.to_string();
            } else {
                lines.push(word.to_string());
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
        if lines.is_empty() {
            lines.push(text.to_string());
        }
        lines
    }

    /// Shows the inline text editor over the node being edited, keeping the
    /// node text in sync on every keystroke. Enter or focus loss ends the
    /// edit session.
    pub fn draw_text_edit_overlay(&mut self, ctx: &egui::Context) {
        let Some(editing_id) = self.interaction.editing_node.clone() else {
            return;
        };
        let Some(node) = self.map.node(&editing_id) else {
            // The node may still be queued as a create intent this frame;
            // only a genuinely gone node (import, delete) cancels the edit
            let creation_queued = self.pending_intents.iter().any(|intent| {
                matches!(intent, MapIntent::UpsertNode { id, .. } if *id == editing_id)
            });
            if !creation_queued {
                self.end_text_edit();
            }
            return;
        };

        let world_rect = Self::node_rect_world(node);
        let rect = egui::Rect::from_min_max(
            self.world_to_screen(world_rect.min),
            self.world_to_screen(world_rect.max),
        );

        let mut finished = false;
        egui::Area::new(egui::Id::new("node_text_editor"))
            .order(egui::Order::Foreground)
            .fixed_pos(rect.center() - egui::vec2(rect.width() / 2.0 - 6.0, 10.0))
            .show(ctx, |ui| {
                let edit = egui::TextEdit::singleline(&mut self.interaction.editing_text)
                    .desired_width(rect.width() - 12.0)
                    .font(egui::FontId::proportional(
                        (13.0 * self.canvas.zoom_factor).clamp(8.0, 40.0),
                    ));
                let response = ui.add(edit);

                if !self.interaction.focus_requested_for_edit {
                    response.request_focus();
                    self.interaction.focus_requested_for_edit = true;
                }

                if response.changed() {
                    self.pending_intents.push(MapIntent::UpsertNode {
                        id: editing_id.clone(),
                        update: NodeUpdate::text(self.interaction.editing_text.clone()),
                    });
                }

                let enter_pressed =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if enter_pressed || (response.lost_focus() && !response.has_focus()) {
                    finished = true;
                }
            });

        if finished {
            self.end_text_edit();
        }
    }
}

/// Parses a `#rrggbb` color string, falling back to slate gray for anything
/// malformed.
pub fn parse_hex_color(color: &str) -> egui::Color32 {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return egui::Color32::from_rgb(r, g, b);
        }
    }
    egui::Color32::from_rgb(100, 116, 139)
}

/// Polygon approximation of the ellipse inscribed in `rect`.
pub fn ellipse_points(rect: egui::Rect) -> Vec<egui::Pos2> {
    let center = rect.center();
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / ELLIPSE_SEGMENTS as f32;
            egui::pos2(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}

/// Four-point diamond inscribed in `rect`, inset 15% on each side.
pub fn diamond_points(rect: egui::Rect) -> Vec<egui::Pos2> {
    let inset_x = rect.width() * 0.15;
    let inset_y = rect.height() * 0.15;
    let center = rect.center();
    vec![
        egui::pos2(center.x, rect.top() + inset_y),
        egui::pos2(rect.right() - inset_x, center.y),
        egui::pos2(center.x, rect.bottom() - inset_y),
        egui::pos2(rect.left() + inset_x, center.y),
    ]
}

/// Six-point hexagon with flat top and bottom edges spanning the middle
/// half of `rect`.
pub fn hexagon_points(rect: egui::Rect) -> Vec<egui::Pos2> {
    let w = rect.width();
    let h = rect.height();
    let min = rect.min;
    vec![
        egui::pos2(min.x + w * 0.25, min.y),
        egui::pos2(min.x + w * 0.75, min.y),
        egui::pos2(min.x + w, min.y + h * 0.5),
        egui::pos2(min.x + w * 0.75, min.y + h),
        egui::pos2(min.x + w * 0.25, min.y + h),
        egui::pos2(min.x, min.y + h * 0.5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_and_fall_back() {
        assert_eq!(parse_hex_color("#4a8fd9"), egui::Color32::from_rgb(74, 143, 217));
        assert_eq!(parse_hex_color("4a8fd9"), egui::Color32::from_rgb(74, 143, 217));
        let fallback = egui::Color32::from_rgb(100, 116, 139);
        assert_eq!(parse_hex_color("teal-ish"), fallback);
        assert_eq!(parse_hex_color("#zzzzzz"), fallback);
        assert_eq!(parse_hex_color(""), fallback);
    }

    #[test]
    fn diamond_is_inset_and_centered() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(80.0, 80.0));
        let points = diamond_points(rect);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], egui::pos2(40.0, 12.0));
        assert_eq!(points[1], egui::pos2(68.0, 40.0));
    }

    #[test]
    fn hexagon_has_flat_top_edge() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(112.0, 80.0));
        let points = hexagon_points(rect);
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].y, points[1].y);
        assert_eq!(points[2], egui::pos2(112.0, 40.0));
    }
}
