//! File operations for exporting and importing concept maps.
//!
//! This module handles JSON export/import and PDF dispatch, including native
//! file dialogs and browser-based download/picker equivalents. Dialogs and
//! I/O run as detached tasks; results come back over the channel and are
//! applied on the UI thread.

use super::state::{ConceptMapApp, FileOperationResult, PendingFileOperation, ToastKind};
use crate::types::ConceptMapData;
use eframe::egui;

impl ConceptMapApp {
    /// Drains completed file operations and dispatches the queued one, if any.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);

        while let Ok(result) = self.file.receiver.try_recv() {
            match result {
                FileOperationResult::ExportCompleted(file_name) => {
                    self.push_toast(ToastKind::Info, format!("Exported {}", file_name), now);
                }
                FileOperationResult::ImportCompleted(content) => {
                    self.apply_import_result(&content, now);
                }
                FileOperationResult::OperationFailed(error) => {
                    log::error!("File operation failed: {}", error);
                    self.push_toast(ToastKind::Error, error, now);
                }
            }
        }

        let Some(operation) = self.file.pending_operation.take() else {
            return;
        };
        match operation {
            PendingFileOperation::ExportJson => self.dispatch_json_export(ctx),
            PendingFileOperation::ImportJson => self.dispatch_json_import(ctx),
            PendingFileOperation::ExportPdf => self.export_pdf(),
        }
    }

    /// Parses and validates imported JSON, replacing the map wholesale on
    /// success. A failed parse leaves the current map untouched.
    fn apply_import_result(&mut self, content: &str, now: f64) {
        match ConceptMapData::from_json(content) {
            Ok(data) => {
                self.map.replace_with(data);
                self.interaction.selected_node = None;
                self.interaction.selected_connection = None;
                self.end_text_edit();
                self.push_toast(ToastKind::Info, "Map imported", now);
            }
            Err(e) => {
                log::error!("Import rejected: {}", e);
                self.push_toast(ToastKind::Error, format!("Invalid map file: {}", e), now);
            }
        }
    }

    /// Serializes the map on the UI thread, then hands the bytes to a save
    /// dialog (native) or a download (browser).
    fn dispatch_json_export(&mut self, ctx: &egui::Context) {
        let json = match self.map.to_export_data().to_json() {
            Ok(json) => json,
            Err(e) => {
                let _ = self.file.sender.send(FileOperationResult::OperationFailed(
                    format!("Failed to serialize map: {}", e),
                ));
                return;
            }
        };
        let file_name = format!("concept-map-{}.json", chrono::Utc::now().timestamp_millis());
        let sender = self.file.sender.clone();

        #[cfg(target_arch = "wasm32")]
        {
            let result = match Self::trigger_download(&file_name, &json) {
                Ok(()) => FileOperationResult::ExportCompleted(file_name),
                Err(e) => FileOperationResult::OperationFailed(e),
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .set_file_name(&file_name)
                    .save_file()
                    .await
                {
                    let result = match std::fs::write(handle.path(), json) {
                        Ok(()) => FileOperationResult::ExportCompleted(file_name),
                        Err(e) => FileOperationResult::OperationFailed(format!(
                            "Failed to save file: {}",
                            e
                        )),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }

    /// Opens a file picker and forwards the raw contents back for parsing
    /// on the UI thread.
    fn dispatch_json_import(&mut self, ctx: &egui::Context) {
        let sender = self.file.sender.clone();
        let ctx = ctx.clone();

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                if let Some(file) = Self::show_open_file_picker().await {
                    let result = match Self::read_file(file).await {
                        Ok(content) => FileOperationResult::ImportCompleted(content),
                        Err(e) => FileOperationResult::OperationFailed(e),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file()
                    .await
                {
                    let result = match std::fs::read_to_string(handle.path()) {
                        Ok(content) => FileOperationResult::ImportCompleted(content),
                        Err(e) => FileOperationResult::OperationFailed(format!(
                            "Failed to read file: {}",
                            e
                        )),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }

    /// Triggers a file download in the browser via a temporary anchor with
    /// a blob URL.
    #[cfg(target_arch = "wasm32")]
    fn trigger_download(filename: &str, content: &str) -> Result<(), String> {
        use wasm_bindgen::JsCast;

        let window = web_sys::window().ok_or("No window found")?;
        let document = window.document().ok_or("No document found")?;

        let blob_parts = js_sys::Array::new();
        blob_parts.push(&wasm_bindgen::JsValue::from_str(content));

        let blob_options = web_sys::BlobPropertyBag::new();
        blob_options.set_type("application/json");

        let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &blob_options)
            .map_err(|_| "Failed to create blob")?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Failed to create object URL")?;

        let anchor = document
            .create_element("a")
            .map_err(|_| "Failed to create anchor element")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "Failed to cast to anchor element")?;

        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        let body = document.body().ok_or("No body found")?;
        body.append_child(&anchor)
            .map_err(|_| "Failed to append anchor")?;
        anchor.click();
        body.remove_child(&anchor)
            .map_err(|_| "Failed to remove anchor")?;

        web_sys::Url::revoke_object_url(&url).map_err(|_| "Failed to revoke object URL")?;
        Ok(())
    }

    /// Opens a file picker in the browser via a temporary input element.
    #[cfg(target_arch = "wasm32")]
    async fn show_open_file_picker() -> Option<web_sys::File> {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        let window = web_sys::window()?;
        let document = window.document()?;

        let input = document
            .create_element("input")
            .ok()?
            .dyn_into::<web_sys::HtmlInputElement>()
            .ok()?;
        input.set_type("file");
        input.set_accept(".json,application/json");
        input.style().set_property("display", "none").ok()?;

        let (sender, receiver) = futures::channel::oneshot::channel::<Option<web_sys::File>>();
        let sender = std::rc::Rc::new(std::cell::RefCell::new(Some(sender)));

        let onchange = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let input = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
            if let Some(input) = input {
                let file = input.files().and_then(|files| files.get(0));
                if let Some(sender) = sender.borrow_mut().take() {
                    let _ = sender.send(file);
                }
            }
        }) as Box<dyn FnMut(_)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();

        document.body()?.append_child(&input).ok()?;
        input.click();

        let file = receiver.await.ok()??;
        document.body()?.remove_child(&input).ok()?;
        Some(file)
    }

    /// Reads a picked file's contents as text.
    #[cfg(target_arch = "wasm32")]
    async fn read_file(file: web_sys::File) -> Result<String, String> {
        let text = wasm_bindgen_futures::JsFuture::from(file.text())
            .await
            .map_err(|_| "Failed to read file".to_string())?;
        text.as_string()
            .ok_or_else(|| "File did not contain text".to_string())
    }

    /// Queues a JSON export for dispatch this frame.
    pub fn request_json_export(&mut self) {
        self.file.pending_operation = Some(PendingFileOperation::ExportJson);
    }

    /// Queues a JSON import for dispatch this frame.
    pub fn request_json_import(&mut self) {
        self.file.pending_operation = Some(PendingFileOperation::ImportJson);
    }

    /// Queues a PDF export for dispatch this frame.
    pub fn request_pdf_export(&mut self) {
        self.file.pending_operation = Some(PendingFileOperation::ExportPdf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::state::MapIntent;
    use crate::types::NodeUpdate;

    #[test]
    fn valid_import_replaces_the_map() {
        let mut app = ConceptMapApp::default();
        app.emit(MapIntent::UpsertNode {
            id: "old".to_string(),
            update: NodeUpdate::position(1.0, 2.0),
        });
        app.apply_pending_intents(0.0);

        let json = r##"{
            "nodes": [{"id": "a", "x": 10.0, "y": 20.0, "text": "A", "color": "#4a8fd9", "shape": "circle"}],
            "connections": []
        }"##;
        app.apply_import_result(json, 0.0);

        assert_eq!(app.map.nodes.len(), 1);
        assert_eq!(app.map.nodes[0].id, "a");
        assert!(app.toasts.iter().any(|t| t.kind == ToastKind::Info));
    }

    #[test]
    fn invalid_import_leaves_map_untouched() {
        let mut app = ConceptMapApp::default();
        app.emit(MapIntent::UpsertNode {
            id: "keep".to_string(),
            update: NodeUpdate::position(1.0, 2.0),
        });
        app.apply_pending_intents(0.0);

        app.apply_import_result(r#"{"foo": 1}"#, 0.0);

        assert_eq!(app.map.nodes.len(), 1);
        assert_eq!(app.map.nodes[0].id, "keep");
        assert!(app.toasts.iter().any(|t| t.kind == ToastKind::Error));
    }

    #[test]
    fn import_clears_selection_and_editing_state() {
        let mut app = ConceptMapApp::default();
        app.emit(MapIntent::UpsertNode {
            id: "n1".to_string(),
            update: NodeUpdate::position(0.0, 0.0),
        });
        app.apply_pending_intents(0.0);
        app.interaction.selected_node = Some("n1".to_string());
        app.begin_text_edit("n1");

        app.apply_import_result(r#"{"nodes": []}"#, 0.0);

        assert!(app.interaction.selected_node.is_none());
        assert!(app.interaction.editing_node.is_none());
    }
}
