use mm_core::layout::node_bounds;
use mm_core::{Color, Direction, EditorConfig, Point, ScreenSize, Viewport};
use mm_editor::{EditorAction, InputEvent, MapEditor, Modifiers, ShortcutAction};
use mm_render::{Control, Download, ExportError, ExportFrame, ImageExporter, PngRasterizer, RasterImage};
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor() -> MapEditor {
    init_logger();
    MapEditor::new(
        ScreenSize {
            width: 1200.0,
            height: 800.0,
        },
        EditorConfig::default(),
    )
}

/// Screen position of the center of `control` on `node`.
fn control_on_screen(ed: &MapEditor, node: mm_core::NodeId, control: Control) -> (f32, f32) {
    let scene = ed.scene();
    let view = scene.node(node).expect("node in scene");
    let (_, b) = view
        .controls
        .iter()
        .find(|(c, _)| *c == control)
        .expect("control on node");
    let (cx, cy) = b.center();
    let p = ed.canvas_to_screen(cx, cy);
    (p.x, p.y)
}

fn click(ed: &mut MapEditor, (x, y): (f32, f32)) -> Option<EditorAction> {
    ed.handle_pointer(&InputEvent::from_pointer_down(x, y, Modifiers::NONE));
    ed.handle_pointer(&InputEvent::from_pointer_up(x, y, Modifiers::NONE))
}

// ─── Spawn & delete ──────────────────────────────────────────────────────

#[test]
fn spawn_right_then_bottom() {
    let mut ed = editor();
    let root = ed.root();
    let (x0, y0) = (500.0, 350.0);

    let (second, _) = ed.add_neighbor(root, Direction::Right).unwrap();
    let (third, _) = ed.add_neighbor(second, Direction::Bottom).unwrap();

    let map = ed.map();
    assert_eq!(map.node_count(), 3);
    assert_eq!(map.link_count(), 2);
    assert_eq!(map.node(second).unwrap().position, Point::new(x0 + 200.0, y0));
    assert_eq!(map.node(third).unwrap().position, Point::new(x0 + 200.0, y0 + 200.0));
    assert_eq!(map.node(third).unwrap().content, "Nuovo Argomento");

    let links = map.links();
    assert_eq!((links[0].source, links[0].target), (root, second));
    assert_eq!((links[1].source, links[1].target), (second, third));
}

#[test]
fn spawned_link_takes_parent_color() {
    let mut ed = editor();
    let root = ed.root();
    let (plain, first) = ed.add_neighbor(root, Direction::Left).unwrap();
    assert_eq!(ed.map().link(first).unwrap().style.color, Color::DEFAULT_ACCENT);

    let green = Color::from_hex("#28A745").unwrap();
    assert_eq!(ed.set_color(root, green).unwrap(), 1);
    let (_, second) = ed.add_neighbor(root, Direction::Top).unwrap();
    assert_eq!(ed.map().link(second).unwrap().style.color, green);
    // Restyling reaches the existing outgoing link too
    assert_eq!(ed.map().link(first).unwrap().style.color, green);

    // ...but not links further down the chain
    let (_, grandchild_link) = ed.add_neighbor(plain, Direction::Left).unwrap();
    ed.set_color(root, Color::WHITE).unwrap();
    assert_eq!(
        ed.map().link(grandchild_link).unwrap().style.color,
        Color::DEFAULT_ACCENT
    );
}

#[test]
fn delete_cascades_to_incident_links() {
    let mut ed = editor();
    let root = ed.root();
    let (middle, _) = ed.add_neighbor(root, Direction::Right).unwrap();
    let (leaf, _) = ed.add_neighbor(middle, Direction::Right).unwrap();

    let removed = ed.delete_node(middle).unwrap();
    assert_eq!(removed.links.len(), 2);
    assert_eq!(ed.map().node_count(), 2);
    assert_eq!(ed.map().link_count(), 0);
    for link in ed.map().links() {
        assert!(link.source != middle && link.target != middle);
    }

    // Zero links left: deleting still succeeds
    ed.delete_node(leaf).unwrap();
    assert_eq!(ed.map().node_count(), 1);
    assert!(ed.scene().links.is_empty());
}

#[test]
fn add_neighbor_on_dead_parent_fails() {
    let mut ed = editor();
    let root = ed.root();
    ed.delete_node(root).unwrap();
    assert!(ed.add_neighbor(root, Direction::Top).is_err());
    assert_eq!(ed.map().node_count(), 0);
}

// ─── View ────────────────────────────────────────────────────────────────

#[test]
fn zoom_stays_in_range() {
    let mut ed = editor();
    let mut prev = ed.viewport().zoom;
    for _ in 0..30 {
        let z = ed.zoom_in();
        assert!(z <= 2.0 + 1e-6);
        assert!((z - prev - 0.1).abs() < 1e-4 || (z - 2.0).abs() < 1e-6);
        prev = z;
    }
    assert!((prev - 2.0).abs() < 1e-6);
    for _ in 0..30 {
        let z = ed.zoom_out();
        assert!(z >= 0.3 - 1e-6);
        prev = z;
    }
    assert!((prev - 0.3).abs() < 1e-6);
    assert_eq!(ed.viewport().pan, Point::new(0.0, 0.0));
}

#[test]
fn fit_single_node_lands_inside_window() {
    let mut ed = editor();
    let root = ed.root();
    ed.move_node(root, -500.0, -350.0).unwrap();
    assert!(ed.fit_to_screen());

    let b = node_bounds(ed.map().node(root).unwrap());
    let top_left = ed.canvas_to_screen(b.x, b.y);
    let bottom_right = ed.canvas_to_screen(b.right(), b.bottom());
    assert!(top_left.x >= 0.0 && top_left.y >= 0.0);
    assert!(bottom_right.x <= 1200.0 && bottom_right.y <= 800.0);
    assert!(ed.viewport().zoom <= 1.5);

    // Idempotent
    let first = ed.viewport();
    ed.fit_to_screen();
    assert_eq!(ed.viewport(), first);
}

#[test]
fn fit_on_empty_map_is_noop() {
    let mut ed = editor();
    ed.zoom_in();
    let before = ed.viewport();
    let root = ed.root();
    ed.delete_node(root).unwrap();
    assert!(!ed.fit_to_screen());
    assert_eq!(ed.viewport(), before);
}

#[test]
fn shortcuts_drive_the_view() {
    let mut ed = editor();
    assert_eq!(ed.handle_key("=", Modifiers::NONE), Some(ShortcutAction::ZoomIn));
    assert_eq!(ed.handle_key("-", Modifiers::NONE), Some(ShortcutAction::ZoomOut));
    assert!((ed.viewport().zoom - 1.0).abs() < 1e-6);
    assert_eq!(ed.handle_key("0", Modifiers::NONE), Some(ShortcutAction::ZoomToFit));
    assert!(ed.transform_css().starts_with("translate("));
    let cmd = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    assert_eq!(ed.handle_key("e", cmd), Some(ShortcutAction::Export));
}

// ─── Pointer ─────────────────────────────────────────────────────────────

#[test]
fn clicking_add_control_spawns_neighbor() {
    let mut ed = editor();
    ed.zoom_out();
    let root = ed.root();
    let at = control_on_screen(&ed, root, Control::Add(Direction::Right));

    let action = click(&mut ed, at);
    assert_eq!(action, Some(EditorAction::AddNeighbor(root, Direction::Right)));
    assert_eq!(ed.map().node_count(), 2);
}

#[test]
fn clicking_delete_control_removes_node() {
    let mut ed = editor();
    let root = ed.root();
    ed.add_neighbor(root, Direction::Bottom).unwrap();
    let at = control_on_screen(&ed, root, Control::Delete);
    assert_eq!(click(&mut ed, at), Some(EditorAction::Delete(root)));
    assert_eq!(ed.map().node_count(), 1);
    assert_eq!(ed.map().link_count(), 0);
}

#[test]
fn edit_control_toggles_and_outside_press_ends_edit() {
    let mut ed = editor();
    let root = ed.root();
    let at = control_on_screen(&ed, root, Control::Edit);
    click(&mut ed, at);
    assert_eq!(ed.editing(), Some(root));

    // Press on empty canvas = focus loss
    click(&mut ed, (5.0, 5.0));
    assert_eq!(ed.editing(), None);

    click(&mut ed, at);
    click(&mut ed, at);
    assert_eq!(ed.editing(), None);
}

#[test]
fn picker_actions_are_reported_to_host() {
    let mut ed = editor();
    let root = ed.root();
    let at = control_on_screen(&ed, root, Control::Image);
    assert_eq!(click(&mut ed, at), Some(EditorAction::PickImage(root)));
    let at = control_on_screen(&ed, root, Control::ColorPicker);
    assert_eq!(click(&mut ed, at), Some(EditorAction::PickColor(root)));
    assert_eq!(ed.map().node_count(), 1);
}

#[test]
fn dragging_a_node_moves_it_in_canvas_units() {
    let mut ed = editor();
    let root = ed.root();
    ed.zoom_in();
    ed.zoom_in(); // 1.2
    let start = ed.canvas_to_screen(600.0, 380.0);

    ed.handle_pointer(&InputEvent::from_pointer_down(start.x, start.y, Modifiers::NONE));
    ed.handle_pointer(&InputEvent::from_pointer_move(
        start.x + 60.0,
        start.y + 24.0,
        Modifiers::NONE,
    ));
    ed.handle_pointer(&InputEvent::from_pointer_up(
        start.x + 60.0,
        start.y + 24.0,
        Modifiers::NONE,
    ));

    let pos = ed.map().node(root).unwrap().position;
    assert!((pos.x - 550.0).abs() < 1e-3, "x = {}", pos.x);
    assert!((pos.y - 370.0).abs() < 1e-3, "y = {}", pos.y);
}

// ─── Export ──────────────────────────────────────────────────────────────

struct FailingExporter;

impl ImageExporter for FailingExporter {
    fn capture(&mut self, _frame: &ExportFrame) -> Result<RasterImage, ExportError> {
        Err(ExportError::Capture("canvas is tainted".into()))
    }
}

struct RecordingExporter {
    frames: Vec<(u32, u32, bool, Viewport)>,
}

impl ImageExporter for RecordingExporter {
    fn capture(&mut self, frame: &ExportFrame) -> Result<RasterImage, ExportError> {
        self.frames.push((
            frame.width,
            frame.height,
            frame.scene.chrome_visible,
            frame.scene.viewport,
        ));
        Ok(RasterImage {
            width: frame.width,
            height: frame.height,
            png: vec![0x89, b'P', b'N', b'G'],
        })
    }
}

#[test]
fn export_hides_chrome_at_identity_without_touching_view() {
    let mut ed = editor();
    ed.zoom_in();
    let live = ed.viewport();
    let mut exporter = RecordingExporter { frames: Vec::new() };

    let download = ed.export_with(&mut exporter).unwrap();
    assert_eq!(download.filename, "mapa-concettuale.png");
    assert_eq!(
        Download::decode_png_data_url(&download.data_url),
        Some(vec![0x89, b'P', b'N', b'G'])
    );
    assert_eq!(exporter.frames, vec![(1200, 800, false, Viewport::IDENTITY)]);
    assert_eq!(ed.viewport(), live);
    assert!(ed.chrome_visible());
}

#[test]
fn export_frame_covers_nodes_outside_the_window() {
    let mut ed = editor();
    let root = ed.root();
    let mut tip = root;
    for _ in 0..4 {
        tip = ed.add_neighbor(tip, Direction::Right).unwrap().0;
    }
    let mut tip = root;
    for _ in 0..3 {
        tip = ed.add_neighbor(tip, Direction::Left).unwrap().0;
    }

    let job = ed.begin_export().expect("export starts");
    let frame = &job.frame;
    assert_eq!(frame.scene.viewport.zoom, 1.0);
    for node in &frame.scene.nodes {
        let b = node.bounds();
        let tl = frame.scene.viewport.canvas_to_screen(Point::new(b.x, b.y));
        let br = frame.scene.viewport.canvas_to_screen(Point::new(b.right(), b.bottom()));
        assert!(tl.x >= 0.0 && tl.y >= 0.0, "{} starts outside the frame", node.id);
        assert!(
            br.x <= frame.width as f32 && br.y <= frame.height as f32,
            "{} ends outside the frame",
            node.id
        );
    }
    // Canvas area is still included, shifted by the leftmost node
    assert_eq!(frame.scene.viewport.pan, Point::new(100.0, 0.0));
    assert_eq!((frame.width, frame.height), (1550, 800));

    let outcome = FailingExporter.capture(&job.frame);
    assert!(ed.finish_export(job, outcome).is_err());
    assert!(ed.chrome_visible());
}

#[test]
fn failed_export_restores_chrome() {
    let mut ed = editor();
    let err = ed.export_with(&mut FailingExporter).unwrap_err();
    assert_eq!(err, ExportError::Capture("canvas is tainted".into()));
    assert!(ed.chrome_visible());
    assert!(!ed.export_in_flight());
}

#[test]
fn overlapping_exports_never_leave_chrome_hidden() {
    let mut ed = editor();
    let first = ed.begin_export().expect("first export starts");
    assert!(!ed.chrome_visible());
    assert!(ed.scene().node(ed.root()).is_some());
    assert!(!ed.scene().chrome_visible);

    // Second trigger while the first is still capturing
    assert!(ed.begin_export().is_none());
    assert_eq!(
        ed.export_with(&mut FailingExporter).unwrap_err(),
        ExportError::AlreadyInFlight
    );
    assert!(!ed.chrome_visible());

    let outcome = FailingExporter.capture(&first.frame);
    assert!(ed.finish_export(first, outcome).is_err());
    assert!(ed.chrome_visible());

    let again = ed.begin_export().expect("guard released");
    let outcome = RecordingExporter { frames: Vec::new() }.capture(&again.frame);
    assert!(ed.finish_export(again, outcome).is_ok());
    assert!(ed.chrome_visible());
}

#[test]
fn png_export_through_resvg() {
    let mut ed = editor();
    let root = ed.root();
    ed.add_neighbor(root, Direction::Right).unwrap();
    let download = ed.export_with(&mut PngRasterizer::new()).unwrap();
    let png = Download::decode_png_data_url(&download.data_url).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}
