//! Viewport export: render the visible canvas to SVG and wrap it in a
//! single-page PDF.
//!
//! The capture reflects the viewport as shown, including the current pan and
//! zoom. PDF export is supported on native targets only; the browser build
//! reports it as unavailable.

use super::state::{ConceptMapApp, FileOperationResult};
use crate::constants;
use crate::types::*;
use eframe::egui;
use std::fmt::Write as _;

impl ConceptMapApp {
    /// Builds an SVG snapshot of the visible viewport. Returns the SVG
    /// source and its pixel dimensions, or `None` before the first frame.
    pub fn build_viewport_svg(&self) -> Option<(String, u32, u32)> {
        let rect = self.canvas.rect?;
        let width = rect.width().ceil().max(1.0) as u32;
        let height = rect.height().ceil().max(1.0) as u32;

        // World -> viewport-local pixels
        let project = |world: egui::Pos2| self.world_to_screen(world) - rect.min.to_vec2();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = width,
            h = height
        );
        let _ = writeln!(
            out,
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\" />",
            width,
            height,
            constants::PDF_BACKGROUND
        );

        for connection in &self.map.connections {
            self.write_connection_svg(&mut out, connection, &project);
        }
        for node in &self.map.nodes {
            self.write_node_svg(&mut out, node, &project);
        }

        let _ = writeln!(out, "</svg>");
        Some((out, width, height))
    }

    fn write_connection_svg(
        &self,
        out: &mut String,
        connection: &Connection,
        project: &impl Fn(egui::Pos2) -> egui::Pos2,
    ) {
        let Some((start_world, end_world)) = self.connection_segment(connection) else {
            return;
        };
        let start = project(start_world);
        let end = project(end_world);

        let _ = writeln!(
            out,
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#475569\" stroke-width=\"2\" />",
            start.x, start.y, end.x, end.y
        );

        let direction = (end - start).normalized();
        if !direction.is_finite() {
            return;
        }
        let arrow_size = 10.0 * self.canvas.zoom_factor;
        let arrow_width = 6.0 * self.canvas.zoom_factor;
        let perpendicular = egui::vec2(-direction.y, direction.x);
        let base = end - direction * arrow_size;
        let left = base + perpendicular * arrow_width;
        let right = base - perpendicular * arrow_width;
        let _ = writeln!(
            out,
            "<polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"#475569\" />",
            end.x, end.y, left.x, left.y, right.x, right.y
        );
    }

    fn write_node_svg(
        &self,
        out: &mut String,
        node: &ConceptNode,
        project: &impl Fn(egui::Pos2) -> egui::Pos2,
    ) {
        let world_rect = Self::node_rect_world(node);
        let min = project(world_rect.min);
        let max = project(world_rect.max);
        let rect = egui::Rect::from_min_max(min, max);
        let fill = &node.color;

        match node.shape {
            NodeShape::Rectangle => {
                let _ = writeln!(
                    out,
                    "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"{:.1}\" fill=\"{}\" />",
                    rect.left(),
                    rect.top(),
                    rect.width(),
                    rect.height(),
                    8.0 * self.canvas.zoom_factor,
                    fill
                );
            }
            NodeShape::Circle | NodeShape::Oval => {
                let _ = writeln!(
                    out,
                    "<ellipse cx=\"{:.1}\" cy=\"{:.1}\" rx=\"{:.1}\" ry=\"{:.1}\" fill=\"{}\" />",
                    rect.center().x,
                    rect.center().y,
                    rect.width() / 2.0,
                    rect.height() / 2.0,
                    fill
                );
            }
            NodeShape::Diamond => {
                write_polygon_svg(out, &super::rendering::diamond_points(rect), fill);
            }
            NodeShape::Hexagon => {
                write_polygon_svg(out, &super::rendering::hexagon_points(rect), fill);
            }
        }

        let font_size = (13.0 * self.canvas.zoom_factor).clamp(8.0, 40.0);
        let max_width = rect.width() - 12.0 * self.canvas.zoom_factor;
        let lines = wrap_for_svg(&node.text, max_width, font_size);
        let line_height = font_size * 1.25;
        let total_height = line_height * lines.len() as f32;
        let start_y = rect.center().y - total_height / 2.0 + line_height / 2.0;

        for (i, line) in lines.iter().enumerate() {
            let _ = writeln!(
                out,
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{:.1}\" font-family=\"sans-serif\" fill=\"#ffffff\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
                rect.center().x,
                start_y + i as f32 * line_height,
                font_size,
                escape_xml(line)
            );
        }
    }

    /// Rasterizes the viewport and saves it as a single-page PDF through a
    /// save dialog. The page matches the viewport aspect, so orientation
    /// follows from the window shape.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn export_pdf(&mut self) {
        let sender = self.file.sender.clone();

        let Some((svg, width, height)) = self.build_viewport_svg() else {
            let _ = sender.send(FileOperationResult::OperationFailed(
                "Nothing to export yet".to_string(),
            ));
            return;
        };

        let file_name = format!("concept-map-{}.pdf", chrono::Utc::now().timestamp_millis());
        // Only the capture happens on the UI thread; rasterization and the
        // dialog run in the detached task
        tokio::spawn(async move {
            let pdf_bytes = match render_viewport_pdf(&svg, width, height) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("PDF export failed: {}", e);
                    let _ = sender.send(FileOperationResult::OperationFailed(format!(
                        "PDF export failed: {}",
                        e
                    )));
                    return;
                }
            };

            let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("PDF", &["pdf"])
                .set_file_name(&file_name)
                .save_file()
                .await
            else {
                return;
            };
            let result = match std::fs::write(handle.path(), &pdf_bytes) {
                Ok(()) => FileOperationResult::ExportCompleted(file_name),
                Err(e) => FileOperationResult::OperationFailed(format!("Failed to save PDF: {}", e)),
            };
            let _ = sender.send(result);
        });
    }

    /// PDF export depends on the native raster pipeline.
    #[cfg(target_arch = "wasm32")]
    pub fn export_pdf(&mut self) {
        let _ = self.file.sender.send(FileOperationResult::OperationFailed(
            "PDF export is not available in the browser".to_string(),
        ));
    }
}

/// Rasterizes the SVG at export scale and wraps the bitmap in a one-page
/// PDF sized to the viewport at CSS pixel density.
#[cfg(not(target_arch = "wasm32"))]
fn render_viewport_pdf(svg: &str, width: u32, height: u32) -> Result<Vec<u8>, String> {
    use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};
    use std::sync::Arc;

    let mut opt = usvg::Options::default();
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    opt.fontdb = Arc::new(db);

    let tree = usvg::Tree::from_data(svg.as_bytes(), &opt)
        .map_err(|e| format!("could not parse capture: {}", e))?;

    let scale = constants::PDF_EXPORT_SCALE;
    let out_w = ((width as f32) * scale).round().max(1.0) as u32;
    let out_h = ((height as f32) * scale).round().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(out_w, out_h)
        .ok_or_else(|| format!("could not allocate {}x{} raster", out_w, out_h))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // The capture is fully opaque, so drop the alpha channel
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    // Page dimensions in mm for the viewport at 96 CSS px per inch
    let page_w = Mm(width as f32 * 25.4 / 96.0);
    let page_h = Mm(height as f32 * 25.4 / 96.0);
    let (doc, page, layer) = PdfDocument::new("Concept Map", page_w, page_h, "Viewport");

    let image = Image::from(ImageXObject {
        width: Px(out_w as usize),
        height: Px(out_h as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: rgb,
        image_filter: None,
        clipping_bbox: None,
    });
    image.add_to_layer(
        doc.get_page(page).get_layer(layer),
        ImageTransform {
            dpi: Some(96.0 * scale),
            ..Default::default()
        },
    );

    doc.save_to_bytes()
        .map_err(|e| format!("could not assemble PDF: {}", e))
}

fn write_polygon_svg(out: &mut String, points: &[egui::Pos2], fill: &str) {
    let mut attr = String::new();
    for p in points {
        let _ = write!(attr, "{:.1},{:.1} ", p.x, p.y);
    }
    let _ = writeln!(out, "<polygon points=\"{}\" fill=\"{}\" />", attr.trim_end(), fill);
}

/// Word wrap using an average-glyph-width estimate; the SVG pass has no
/// font metrics available.
fn wrap_for_svg(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let max_chars = ((max_width / (font_size * 0.55)).floor() as usize).max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in words {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if candidate_len <= max_chars || current.is_empty() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
