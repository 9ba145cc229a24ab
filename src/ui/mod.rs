//! User interface components and rendering logic for the concept map builder.
//!
//! This module contains all the UI-related code including the main application
//! struct, canvas rendering, toolbar, navigation bar, toast notifications, and
//! user interaction handling.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main ConceptMapApp
//! - `canvas` - Canvas navigation, zooming, panning, and gestures
//! - `rendering` - Drawing nodes, connections, and the inline editor
//! - `file_ops` - JSON export/import for native and WASM
//! - `export` - Viewport capture and PDF export

mod canvas;
mod export;
mod file_ops;
mod rendering;
mod state;

pub use state::ConceptMapApp;

use self::state::{Gesture, MapIntent, PendingConfirmAction, ToastKind};
use crate::templates::{all_templates, build_template, TemplateKind};
use eframe::egui;

/// Canvas background, the slate tint the exported PDF shares.
const CANVAS_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(248, 250, 252);

impl eframe::App for ConceptMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_pending_operations(ctx);
        self.handle_delete_key(ctx);

        egui::TopBottomPanel::top("navigation_bar").show(ctx, |ui| {
            self.draw_navigation_bar(ui);
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        // Intents must land before the overlay draws: a double-click queues
        // the create intent and arms the editor in the same frame
        let now = ctx.input(|i| i.time);
        self.apply_pending_intents(now);

        self.draw_text_edit_overlay(ctx);
        self.draw_confirm_dialog(ctx);
        self.draw_toasts(ctx, now);
    }
}

impl ConceptMapApp {
    /// Deletes the selected node (or connection) on Delete/Backspace, unless
    /// a text field is consuming keyboard input.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let delete_pressed = ctx.input(|i| {
            i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)
        });
        if !delete_pressed {
            return;
        }

        if let Some(id) = self.interaction.selected_node.clone() {
            // A node mid-edit is never deleted out from under the editor
            if self.interaction.editing_node.as_deref() == Some(id.as_str()) {
                return;
            }
            self.emit(MapIntent::DeleteNode { id });
        } else if let Some(idx) = self.interaction.selected_connection {
            if let Some(conn) = self.map.connections.get(idx) {
                self.emit(MapIntent::DeleteConnection {
                    from: conn.from.clone(),
                    to: conn.to.clone(),
                });
            }
        }
    }

    fn draw_navigation_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Concept Map Builder");
            ui.separator();

            if ui.button("New Map").clicked() {
                self.request_new_map();
            }

            ui.menu_button("Templates", |ui| {
                let mut chosen: Option<TemplateKind> = None;
                for info in all_templates() {
                    let label = format!("{}\n{}", info.name, info.description);
                    if ui.button(label).clicked() {
                        chosen = Some(info.kind);
                        ui.close();
                    }
                }
                if let Some(kind) = chosen {
                    self.load_template(kind, ui.input(|i| i.time));
                }
            });
        });
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // Color palette for newly created nodes
            for color in crate::types::NodeColor::all() {
                let fill = rendering::parse_hex_color(color.display_color());
                let selected = self.selected_color == *color;
                let stroke = if selected {
                    egui::Stroke::new(2.0, ui.visuals().strong_text_color())
                } else {
                    egui::Stroke::new(1.0, egui::Color32::TRANSPARENT)
                };
                let swatch = egui::Button::new("  ").fill(fill).stroke(stroke);
                if ui.add(swatch).on_hover_text(color.label()).clicked() {
                    self.selected_color = *color;
                }
            }

            ui.separator();

            egui::ComboBox::from_id_salt("shape_picker")
                .selected_text(self.selected_shape.label())
                .show_ui(ui, |ui| {
                    for shape in crate::types::NodeShape::all() {
                        ui.selectable_value(&mut self.selected_shape, *shape, shape.label());
                    }
                });

            ui.separator();

            let connect_label = if self.connect_mode {
                "Connecting…"
            } else {
                "Connect"
            };
            if ui.selectable_label(self.connect_mode, connect_label).clicked() {
                self.toggle_connect_mode(ui.input(|i| i.time));
            }

            ui.separator();

            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.zoom_out();
            }
            ui.label(format!("{:.0}%", self.canvas.zoom_factor * 100.0));
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.zoom_in();
            }
            if ui.button("Reset View").clicked() {
                self.reset_view();
                let now = ui.input(|i| i.time);
                self.push_toast(ToastKind::Info, "View reset", now);
            }

            ui.separator();

            if ui.button("Clear").clicked() {
                self.request_clear();
            }
            if ui.button("Export JSON").clicked() {
                self.request_json_export();
            }
            if ui.button("Export PDF").clicked() {
                self.request_pdf_export();
            }
            if ui.button("Import").clicked() {
                self.request_json_import();
            }
        });
    }

    /// Flips connect mode; leaving it drops any armed source.
    fn toggle_connect_mode(&mut self, now: f64) {
        self.connect_mode = !self.connect_mode;
        if self.connect_mode {
            self.push_toast(
                ToastKind::Info,
                "Connect mode: click two nodes to link them",
                now,
            );
        } else {
            if matches!(self.interaction.gesture, Gesture::Connecting { .. }) {
                self.interaction.gesture = Gesture::Idle;
            }
            self.push_toast(ToastKind::Info, "Connect mode off", now);
        }
    }

    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        painter.rect_filled(response.rect, 0.0, CANVAS_BACKGROUND);

        self.handle_canvas_input(ui, &response);
        self.render_map(&painter);

        if self.map.is_empty() {
            self.draw_quick_guide(&painter, response.rect);
        }
    }

    /// Onboarding hints shown in the middle of an empty canvas.
    fn draw_quick_guide(&self, painter: &egui::Painter, rect: egui::Rect) {
        let lines = [
            "Double-click to add a concept",
            "Drag concepts to arrange them",
            "Use Connect to link two concepts",
            "Scroll to zoom, drag the background to pan",
        ];
        let font_id = egui::FontId::proportional(15.0);
        let color = egui::Color32::from_rgb(148, 163, 184);
        let line_height = 24.0;
        let start_y = rect.center().y - line_height * (lines.len() as f32 - 1.0) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            painter.text(
                egui::pos2(rect.center().x, start_y + i as f32 * line_height),
                egui::Align2::CENTER_CENTER,
                *line,
                font_id.clone(),
                color,
            );
        }
    }

    /// Applies the intents queued during input handling to the map, raising
    /// toasts for the mutations a user should notice.
    pub fn apply_pending_intents(&mut self, now: f64) {
        let intents = std::mem::take(&mut self.pending_intents);
        for intent in intents {
            match intent {
                MapIntent::UpsertNode { id, update } => {
                    let created = self.map.node(&id).is_none();
                    let fallback_color = self.selected_color.display_color();
                    self.map
                        .upsert_node(&id, update, fallback_color, self.selected_shape);
                    if created {
                        self.push_toast(ToastKind::Info, "Concept added", now);
                    }
                }
                MapIntent::DeleteNode { id } => {
                    if self.map.delete_node(&id) {
                        if self.interaction.selected_node.as_deref() == Some(id.as_str()) {
                            self.interaction.selected_node = None;
                        }
                        if self.interaction.editing_node.as_deref() == Some(id.as_str()) {
                            self.end_text_edit();
                        }
                        self.interaction.selected_connection = None;
                        self.push_toast(ToastKind::Info, "Concept deleted", now);
                    }
                }
                MapIntent::CreateConnection { from, to } => {
                    if self.map.create_connection(&from, &to) {
                        self.push_toast(ToastKind::Info, "Connection created", now);
                    }
                }
                MapIntent::DeleteConnection { from, to } => {
                    if self.map.delete_connection(&from, &to) {
                        self.interaction.selected_connection = None;
                        self.push_toast(ToastKind::Info, "Connection deleted", now);
                    }
                }
            }
        }
    }

    /// Asks for confirmation before clearing a non-empty canvas.
    fn request_clear(&mut self) {
        if !self.map.is_empty() {
            self.pending_confirm = Some(PendingConfirmAction::ClearCanvas);
        }
    }

    /// Asks for confirmation before replacing a non-empty map with a new one.
    fn request_new_map(&mut self) {
        if self.map.is_empty() {
            self.start_new_map_now();
        } else {
            self.pending_confirm = Some(PendingConfirmAction::NewMap);
        }
    }

    fn start_new_map_now(&mut self) {
        self.map.clear();
        self.reset_view();
        self.interaction.selected_node = None;
        self.interaction.selected_connection = None;
        self.interaction.gesture = Gesture::Idle;
        self.end_text_edit();
    }

    /// Loads a template, replacing the current map without confirmation.
    fn load_template(&mut self, kind: TemplateKind, now: f64) {
        let data = build_template(kind);
        let title = data.metadata.title.clone();
        self.map.replace_with(data);
        self.interaction.selected_node = None;
        self.interaction.selected_connection = None;
        self.interaction.gesture = Gesture::Idle;
        self.end_text_edit();
        self.push_toast(ToastKind::Info, format!("Loaded template: {}", title), now);
    }

    /// Confirmation dialog for destructive actions.
    fn draw_confirm_dialog(&mut self, ctx: &egui::Context) {
        let Some(action) = self.pending_confirm else {
            return;
        };
        let (title, body, confirm_label) = match action {
            PendingConfirmAction::ClearCanvas => (
                "Clear canvas?",
                "This removes every concept and connection.",
                "Clear",
            ),
            PendingConfirmAction::NewMap => (
                "Start a new map?",
                "The current map will be discarded.",
                "New Map",
            ),
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(body);
                ui.horizontal(|ui| {
                    if ui.button(confirm_label).clicked() {
                        let now = ui.input(|i| i.time);
                        match action {
                            PendingConfirmAction::ClearCanvas => {
                                self.map.clear();
                                self.interaction.selected_node = None;
                                self.interaction.selected_connection = None;
                                self.interaction.gesture = Gesture::Idle;
                                self.end_text_edit();
                                self.push_toast(ToastKind::Info, "Canvas cleared", now);
                            }
                            PendingConfirmAction::NewMap => {
                                self.start_new_map_now();
                                self.push_toast(ToastKind::Info, "New map created", now);
                            }
                        }
                        self.pending_confirm = None;
                    }
                    if ui.button("Cancel").clicked() {
                        self.pending_confirm = None;
                    }
                });
            });
    }

    /// Draws the toast stack in the bottom-right corner, fading each toast
    /// out before dropping it.
    fn draw_toasts(&mut self, ctx: &egui::Context, now: f64) {
        self.toasts.retain(|t| !t.is_expired(now));
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toast_stack"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let opacity = toast.opacity(now);
                    let (bg, fg) = match toast.kind {
                        ToastKind::Info => (
                            egui::Color32::from_rgb(30, 41, 59),
                            egui::Color32::WHITE,
                        ),
                        ToastKind::Error => (
                            egui::Color32::from_rgb(153, 27, 27),
                            egui::Color32::WHITE,
                        ),
                    };
                    egui::Frame::popup(ui.style())
                        .fill(bg.gamma_multiply(opacity))
                        .show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(&toast.message)
                                    .color(fg.gamma_multiply(opacity)),
                            );
                        });
                }
            });

        // Keep repainting while toasts animate
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests;
