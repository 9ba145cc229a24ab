use super::state::Toast;
use super::*;
use crate::constants;
use crate::types::{NodeColor, NodeShape, NodeUpdate};
use eframe::egui;

/// Run a single headless egui frame with the provided input events and closure.
fn run_ui_with(events: Vec<egui::Event>, mut f: impl FnMut(&egui::Context)) -> egui::FullOutput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.events = events;

    let ctx = egui::Context::default();
    ctx.run(raw, |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        f(ctx);
    })
}

/// Seed a node directly through the intent path so the test exercises the
/// same plumbing the canvas uses.
fn add_node(app: &mut ConceptMapApp, id: &str, x: f32, y: f32) {
    app.emit(MapIntent::UpsertNode {
        id: id.to_string(),
        update: NodeUpdate::position(x, y),
    });
    app.apply_pending_intents(0.0);
}

#[test]
fn double_click_on_empty_canvas_creates_concept_under_cursor() {
    let mut app = ConceptMapApp::default();
    app.selected_color = NodeColor::Green;
    app.selected_shape = NodeShape::Hexagon;

    app.on_double_click(egui::pos2(100.0, 100.0));
    app.apply_pending_intents(0.0);

    assert_eq!(app.map.nodes.len(), 1);
    let node = &app.map.nodes[0];
    assert_eq!((node.x, node.y), (100.0, 100.0));
    assert_eq!(node.text, constants::DEFAULT_NODE_TEXT);
    assert_eq!(node.color, NodeColor::Green.display_color());
    assert_eq!(node.shape, NodeShape::Hexagon);
    // Creation drops straight into text editing
    assert_eq!(app.interaction.editing_node.as_deref(), Some(node.id.as_str()));
}

#[test]
fn double_click_editing_survives_the_frame_that_creates_the_node() {
    let mut app = ConceptMapApp::default();

    run_ui_with(vec![], |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
        app.on_double_click(egui::pos2(100.0, 100.0));

        // Same statement order as update(): intents land, then the overlay
        let now = ctx.input(|i| i.time);
        app.apply_pending_intents(now);
        app.draw_text_edit_overlay(ctx);
    });

    assert_eq!(app.map.nodes.len(), 1);
    let id = app.map.nodes[0].id.clone();
    assert_eq!(app.interaction.editing_node.as_deref(), Some(id.as_str()));
}

#[test]
fn editor_overlay_waits_for_a_queued_create_intent() {
    let mut app = ConceptMapApp::default();
    app.on_double_click(egui::pos2(50.0, 60.0));

    // The overlay drawn while the create intent is still queued must not
    // cancel the edit session
    run_ui_with(vec![], |ctx| {
        app.draw_text_edit_overlay(ctx);
    });
    assert!(app.interaction.editing_node.is_some());

    app.apply_pending_intents(0.0);
    assert_eq!(app.map.nodes.len(), 1);
}

#[test]
fn double_click_accounts_for_pan_and_zoom() {
    let mut app = ConceptMapApp::default();
    app.canvas.zoom_factor = 2.0;
    app.canvas.pan = egui::vec2(50.0, -20.0);

    app.on_double_click(egui::pos2(300.0, 100.0));
    app.apply_pending_intents(0.0);

    let node = &app.map.nodes[0];
    assert_eq!((node.x, node.y), (100.0, 70.0));
}

#[test]
fn double_click_on_existing_node_edits_instead_of_creating() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "n1", 100.0, 100.0);

    app.on_double_click(egui::pos2(120.0, 110.0));
    app.apply_pending_intents(0.0);

    assert_eq!(app.map.nodes.len(), 1);
    assert_eq!(app.interaction.editing_node.as_deref(), Some("n1"));
}

#[test]
fn wheel_zoom_is_clamped_to_range() {
    let mut app = ConceptMapApp::default();
    for _ in 0..100 {
        app.on_wheel(1.0);
    }
    assert_eq!(app.canvas.zoom_factor, constants::ZOOM_MAX);

    for _ in 0..100 {
        app.on_wheel(-1.0);
    }
    assert_eq!(app.canvas.zoom_factor, constants::ZOOM_MIN);
}

#[test]
fn wheel_zoom_applies_multiplicative_steps() {
    let mut app = ConceptMapApp::default();
    app.on_wheel(1.0);
    assert!((app.canvas.zoom_factor - 1.1).abs() < 1e-4);
    app.on_wheel(-1.0);
    assert!((app.canvas.zoom_factor - 1.0).abs() < 1e-4);
}

#[test]
fn toolbar_zoom_buttons_step_and_clamp() {
    let mut app = ConceptMapApp::default();
    app.zoom_in();
    assert!((app.canvas.zoom_factor - 1.2).abs() < 1e-4);

    for _ in 0..20 {
        app.zoom_out();
    }
    assert_eq!(app.canvas.zoom_factor, constants::ZOOM_MIN);
}

#[test]
fn reset_view_restores_defaults() {
    let mut app = ConceptMapApp::default();
    app.canvas.zoom_factor = 2.5;
    app.canvas.pan = egui::vec2(120.0, -40.0);

    app.reset_view();

    assert_eq!(app.canvas.zoom_factor, 1.0);
    assert_eq!(app.canvas.pan, egui::Vec2::ZERO);
}

#[test]
fn screen_world_transforms_round_trip() {
    let mut app = ConceptMapApp::default();
    app.canvas.origin = egui::pos2(10.0, 40.0);
    app.canvas.zoom_factor = 1.7;
    app.canvas.pan = egui::vec2(-35.0, 80.0);

    let screen = egui::pos2(412.0, 233.0);
    let back = app.world_to_screen(app.screen_to_world(screen));
    assert!((back - screen).length() < 1e-3);
}

#[test]
fn dragging_preserves_grab_offset() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "n1", 100.0, 100.0);

    // Grab 10 right and 20 below the top-left corner
    app.on_primary_down(egui::pos2(110.0, 120.0));
    assert!(matches!(app.interaction.gesture, Gesture::Dragging { .. }));

    app.on_pointer_move(egui::pos2(200.0, 200.0));
    app.apply_pending_intents(0.0);

    let node = app.map.node("n1").unwrap();
    assert_eq!((node.x, node.y), (190.0, 180.0));

    app.on_pointer_up();
    assert_eq!(app.interaction.gesture, Gesture::Idle);
}

#[test]
fn background_drag_pans_scaled_by_zoom() {
    let mut app = ConceptMapApp::default();
    app.canvas.zoom_factor = 2.0;

    app.on_primary_down(egui::pos2(500.0, 500.0));
    assert!(matches!(app.interaction.gesture, Gesture::Panning { .. }));

    app.on_pointer_move(egui::pos2(520.0, 510.0));
    assert_eq!(app.canvas.pan, egui::vec2(10.0, 5.0));

    app.on_pointer_up();
    assert_eq!(app.interaction.gesture, Gesture::Idle);
}

#[test]
fn connect_mode_links_two_nodes_exactly_once() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "a", 0.0, 0.0);
    add_node(&mut app, "b", 400.0, 300.0);
    app.connect_mode = true;

    app.on_primary_down(egui::pos2(60.0, 30.0));
    assert_eq!(
        app.interaction.gesture,
        Gesture::Connecting { source: "a".to_string() }
    );

    // Arming survives releasing the button
    app.on_pointer_up();
    assert!(matches!(app.interaction.gesture, Gesture::Connecting { .. }));

    app.on_primary_down(egui::pos2(460.0, 330.0));
    app.apply_pending_intents(0.0);
    assert_eq!(app.map.connections.len(), 1);
    assert_eq!(app.interaction.gesture, Gesture::Idle);

    // A reversed attempt is rejected as a duplicate of the unordered pair
    app.on_primary_down(egui::pos2(460.0, 330.0));
    app.on_primary_down(egui::pos2(60.0, 30.0));
    app.apply_pending_intents(0.0);
    assert_eq!(app.map.connections.len(), 1);
}

#[test]
fn clicking_armed_source_again_disarms() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "a", 0.0, 0.0);
    app.connect_mode = true;

    app.on_primary_down(egui::pos2(60.0, 30.0));
    app.on_primary_down(egui::pos2(60.0, 30.0));
    app.apply_pending_intents(0.0);

    assert_eq!(app.interaction.gesture, Gesture::Idle);
    assert!(app.map.connections.is_empty());
}

#[test]
fn clicking_a_connection_selects_it() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "a", 0.0, 0.0);
    add_node(&mut app, "b", 400.0, 0.0);
    app.emit(MapIntent::CreateConnection {
        from: "a".to_string(),
        to: "b".to_string(),
    });
    app.apply_pending_intents(0.0);

    // Midpoint of the segment between the anchors at (60, 30) and (460, 30)
    app.on_primary_down(egui::pos2(250.0, 32.0));
    assert_eq!(app.interaction.selected_connection, Some(0));
    assert!(app.interaction.selected_node.is_none());
}

#[test]
fn delete_key_removes_selected_node_and_cascades() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "a", 0.0, 0.0);
    add_node(&mut app, "b", 400.0, 300.0);
    app.emit(MapIntent::CreateConnection {
        from: "a".to_string(),
        to: "b".to_string(),
    });
    app.apply_pending_intents(0.0);
    app.interaction.selected_node = Some("a".to_string());

    run_ui_with(
        vec![egui::Event::Key {
            key: egui::Key::Delete,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }],
        |ctx| {
            app.handle_delete_key(ctx);
        },
    );
    app.apply_pending_intents(0.0);

    assert_eq!(app.map.nodes.len(), 1);
    assert!(app.map.connections.is_empty());
    assert!(app.interaction.selected_node.is_none());
}

#[test]
fn delete_key_spares_the_node_being_edited() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "a", 0.0, 0.0);
    app.interaction.selected_node = Some("a".to_string());
    app.begin_text_edit("a");

    run_ui_with(
        vec![egui::Event::Key {
            key: egui::Key::Backspace,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }],
        |ctx| {
            app.handle_delete_key(ctx);
        },
    );
    app.apply_pending_intents(0.0);

    assert_eq!(app.map.nodes.len(), 1);
}

#[test]
fn loading_a_template_replaces_the_map() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "old", 0.0, 0.0);

    app.load_template(TemplateKind::LearningPathway, 0.0);

    assert_eq!(app.map.nodes.len(), 4);
    assert!(app.map.node("old").is_none());
    assert_eq!(app.map.connections.len(), 3);
    assert!(app
        .toasts
        .iter()
        .any(|t| t.message.contains("Learning Pathway")));
}

#[test]
fn clear_asks_for_confirmation_only_when_non_empty() {
    let mut app = ConceptMapApp::default();
    app.request_clear();
    assert!(app.pending_confirm.is_none());

    add_node(&mut app, "a", 0.0, 0.0);
    app.request_clear();
    assert_eq!(app.pending_confirm, Some(PendingConfirmAction::ClearCanvas));
    // Nothing is removed until the dialog confirms
    assert_eq!(app.map.nodes.len(), 1);
}

#[test]
fn node_creation_and_deletion_raise_toasts() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "a", 0.0, 0.0);
    assert!(app.toasts.iter().any(|t| t.message == "Concept added"));

    app.emit(MapIntent::DeleteNode { id: "a".to_string() });
    app.apply_pending_intents(1.0);
    assert!(app.toasts.iter().any(|t| t.message == "Concept deleted"));
}

#[test]
fn toasts_fade_and_expire() {
    let toast = Toast {
        message: "x".to_string(),
        kind: ToastKind::Info,
        shown_at: 0.0,
    };
    assert_eq!(toast.opacity(0.0), 1.0);
    assert_eq!(toast.opacity(1.9), 1.0);
    let fading = toast.opacity(2.25);
    assert!(fading > 0.0 && fading < 1.0);
    assert!(toast.is_expired(2.6));
    assert!(!toast.is_expired(2.4));
}

#[test]
fn drawing_a_frame_records_the_canvas_rect() {
    let mut app = ConceptMapApp::default();
    add_node(&mut app, "a", 100.0, 100.0);

    run_ui_with(vec![], |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    });

    let rect = app.canvas.rect.expect("canvas rect captured during draw");
    assert!(rect.width() > 0.0 && rect.height() > 0.0);
    assert_eq!(app.canvas.origin, rect.min);
}

#[test]
fn moving_a_missing_node_creates_it_with_toolbar_defaults() {
    let mut app = ConceptMapApp::default();
    app.selected_color = NodeColor::Teal;
    app.selected_shape = NodeShape::Oval;

    app.emit(MapIntent::UpsertNode {
        id: "ghost".to_string(),
        update: NodeUpdate::position(5.0, 6.0),
    });
    app.apply_pending_intents(0.0);

    let node = app.map.node("ghost").unwrap();
    assert_eq!(node.text, constants::DEFAULT_NODE_TEXT);
    assert_eq!(node.color, NodeColor::Teal.display_color());
    assert_eq!(node.shape, NodeShape::Oval);
}
