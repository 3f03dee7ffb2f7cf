//! WASM bridge for the mind map editor: exposes `MapEditor` to the page.
//!
//! Compiled via `wasm-pack build --target web`. The page forwards pointer,
//! keyboard, and toolbar events here and repaints its `<canvas>` with
//! `render` on every animation frame.

mod export;
mod render2d;

use mm_core::layout::node_bounds;
use mm_core::{Color, Direction, EditorConfig, NodeId, ScreenSize};
use mm_editor::{EditorAction, ExportJob, InputEvent, MapEditor, Modifiers, ShortcutAction};
use mm_render::svg::render_svg;
use mm_render::{Download, ExportError, RasterImage};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing canvas controller.
///
/// Owns the editor, the image cache, and the export job handed to the
/// page for asynchronous capture.
#[wasm_bindgen]
pub struct MindMapCanvas {
    editor: MapEditor,
    images: render2d::ImageCache,
    pending_export: Option<ExportJob>,
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl MindMapCanvas {
    /// Create a controller for a window of the given size. The root topic
    /// is placed near the center.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        init_logging();
        Self {
            editor: MapEditor::new(screen(width, height), EditorConfig::default()),
            images: render2d::ImageCache::new(),
            pending_export: None,
            width,
            height,
        }
    }

    /// Override configuration with a (partial) camelCase JSON object.
    /// Returns `false` if the JSON does not parse.
    pub fn set_config_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<EditorConfig>(json) {
            Ok(config) => {
                self.editor.set_config(config);
                true
            }
            Err(err) => {
                log::warn!("ignoring config: {err}");
                false
            }
        }
    }

    /// Render the current view to a Canvas2D context.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        let scene = self.editor.scene();
        self.images.retain_used(&scene);
        let theme = render2d::CanvasTheme::light();
        render2d::render_scene(
            ctx,
            &scene,
            self.width,
            self.height,
            theme.bg,
            &theme,
            &mut self.images,
        );
    }

    /// The window was resized.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.editor.resize(screen(width, height));
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Returns the control action as JSON: `{"action":"add-right","node":"node-1"}`
    /// or `{"action":"none"}`.
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let event = InputEvent::from_pointer_down(x, y, modifiers(shift, ctrl, alt, meta));
        action_json(self.editor.handle_pointer(&event))
    }

    pub fn handle_pointer_move(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let event = InputEvent::from_pointer_move(x, y, modifiers(shift, ctrl, alt, meta));
        action_json(self.editor.handle_pointer(&event))
    }

    pub fn handle_pointer_up(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let event = InputEvent::from_pointer_up(x, y, modifiers(shift, ctrl, alt, meta));
        action_json(self.editor.handle_pointer(&event))
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns `{"action":"<action_name>"}`.
    /// Export shortcuts run the export right away.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let action = self
            .editor
            .handle_key(key, modifiers(shift, ctrl, alt, meta));
        if action == Some(ShortcutAction::Export) {
            self.export_image();
        }
        format!(r#"{{"action":"{}"}}"#, action.map_or("none", shortcut_name))
    }

    // ─── View (toolbar buttons) ──────────────────────────────────────────

    /// Returns the new zoom factor.
    pub fn zoom_in(&mut self) -> f32 {
        self.editor.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.editor.zoom_out()
    }

    /// Returns `false` when there is nothing to fit.
    pub fn fit_to_screen(&mut self) -> bool {
        self.editor.fit_to_screen()
    }

    /// CSS transform for DOM overlays (e.g. the text field of the node
    /// being edited) that must track the canvas.
    pub fn transform_css(&self) -> String {
        self.editor.transform_css()
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Create a node at canvas position `(x, y)`. Empty `content` means the
    /// placeholder. Returns the new id.
    pub fn create_node_at(&mut self, x: f32, y: f32, content: &str) -> String {
        let content = (!content.is_empty()).then_some(content);
        self.editor.create_node(x, y, content).to_string()
    }

    /// Spawn a neighbor (`"top"`, `"bottom"`, `"left"`, `"right"`).
    /// Returns the new node id, or `""` on failure.
    pub fn add_neighbor(&mut self, node_id: &str, direction: &str) -> String {
        let (Some(id), Some(direction)) =
            (NodeId::parse(node_id), Direction::from_name(direction))
        else {
            return String::new();
        };
        match self.editor.add_neighbor(id, direction) {
            Ok((child, _)) => child.to_string(),
            Err(err) => {
                log::warn!("add neighbor failed: {err}");
                String::new()
            }
        }
    }

    pub fn delete_node(&mut self, node_id: &str) -> bool {
        NodeId::parse(node_id).is_some_and(|id| self.editor.delete_node(id).is_ok())
    }

    /// Answer to the color picker. `color` is a `#RRGGBB` string.
    pub fn set_color(&mut self, node_id: &str, color: &str) -> bool {
        let (Some(id), Some(color)) = (NodeId::parse(node_id), Color::from_hex(color)) else {
            return false;
        };
        self.editor.set_color(id, color).is_ok()
    }

    /// Answer to the image URL prompt. Blank input changes nothing and
    /// returns `false`.
    pub fn set_image(&mut self, node_id: &str, url: &str) -> bool {
        NodeId::parse(node_id).is_some_and(|id| self.editor.set_image(id, url).unwrap_or(false))
    }

    pub fn clear_image(&mut self, node_id: &str) -> bool {
        NodeId::parse(node_id).is_some_and(|id| self.editor.clear_image(id).is_ok())
    }

    pub fn begin_edit(&mut self, node_id: &str) -> bool {
        NodeId::parse(node_id).is_some_and(|id| self.editor.begin_edit(id).is_ok())
    }

    pub fn set_node_text(&mut self, node_id: &str, text: &str) -> bool {
        NodeId::parse(node_id).is_some_and(|id| self.editor.set_text(id, text).is_ok())
    }

    /// Focus left the text field.
    pub fn end_edit(&mut self) -> String {
        self.editor
            .end_edit()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Id of the node being edited, or `""`.
    pub fn editing_id(&self) -> String {
        self.editor
            .editing()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub fn connect(&mut self, source: &str, target: &str) -> bool {
        let (Some(source), Some(target)) = (NodeId::parse(source), NodeId::parse(target)) else {
            return false;
        };
        self.editor.connect(source, target).is_ok()
    }

    /// Canvas-space bounds of a node as `{"x":..,"y":..,"width":..,"height":..}`,
    /// or `{}` if the node is not found.
    pub fn get_node_bounds(&self, node_id: &str) -> String {
        let node = NodeId::parse(node_id).and_then(|id| self.editor.map().get(id));
        match node {
            Some(node) => {
                let b = node_bounds(node);
                format!(
                    r#"{{"x":{},"y":{},"width":{},"height":{}}}"#,
                    b.x, b.y, b.width, b.height
                )
            }
            None => "{}".to_string(),
        }
    }

    /// Every node as a JSON array.
    pub fn nodes_json(&self) -> String {
        let nodes: Vec<NodeJson> = self
            .editor
            .map()
            .nodes()
            .into_iter()
            .map(|n| {
                let b = node_bounds(n);
                NodeJson {
                    id: n.id,
                    x: b.x,
                    y: b.y,
                    width: b.width,
                    height: b.height,
                    content: &n.content,
                    accent: n.accent_or(self.editor.config().default_accent),
                    image: n.image.as_deref(),
                }
            })
            .collect();
        serde_json::to_string(&nodes).unwrap_or_else(|_| "[]".to_string())
    }

    /// Every link as a JSON array.
    pub fn links_json(&self) -> String {
        serde_json::to_string(&self.editor.map().links()).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Export the canvas to `mapa-concettuale.png` and start the download.
    /// Returns `false` if an export is already running or the capture
    /// failed; the node controls are visible again either way.
    pub fn export_image(&mut self) -> bool {
        let mut exporter = export::CanvasExporter {
            images: &mut self.images,
        };
        let download = match self.editor.export_with(&mut exporter) {
            Ok(download) => download,
            Err(_) => return false,
        };
        match export::trigger_download(&download) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("download failed: {err:?}");
                false
            }
        }
    }

    /// First half of an asynchronous export: hides the controls and returns
    /// the frame as SVG for the page to rasterize, or `""` while another
    /// export is running. Loaded node images are embedded as data URLs;
    /// the page rasterizes the SVG as an image, which never fetches.
    pub fn begin_export(&mut self) -> String {
        if self.pending_export.is_some() {
            return String::new();
        }
        let Some(job) = self.editor.begin_export() else {
            return String::new();
        };
        let mut scene = job.frame.scene.clone();
        let images = &mut self.images;
        for url in scene.inline_images(|url| images.data_url(url)) {
            log::warn!("export: image {url} not loaded or not readable, left out of the frame");
        }
        let svg = render_svg(
            &scene,
            job.frame.width,
            job.frame.height,
            Some(job.frame.background),
        );
        self.pending_export = Some(job);
        svg
    }

    /// Second half: pass the PNG data URL, or `""` if rasterizing failed.
    /// Restores the controls and starts the download on success.
    pub fn finish_export(&mut self, png_data_url: &str) -> bool {
        let Some(job) = self.pending_export.take() else {
            return false;
        };
        let outcome = Download::decode_png_data_url(png_data_url)
            .map(|png| RasterImage {
                width: job.frame.width,
                height: job.frame.height,
                png,
            })
            .ok_or_else(|| ExportError::Capture("page did not return a PNG".into()));
        match self.editor.finish_export(job, outcome) {
            Ok(download) => export::trigger_download(&download).is_ok(),
            Err(_) => false,
        }
    }

    pub fn controls_visible(&self) -> bool {
        self.editor.chrome_visible()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeJson<'a> {
    id: NodeId,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    content: &'a str,
    accent: Color,
    image: Option<&'a str>,
}

fn screen(width: f64, height: f64) -> ScreenSize {
    ScreenSize {
        width: width as f32,
        height: height as f32,
    }
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn action_name(action: &EditorAction) -> &'static str {
    match action {
        EditorAction::Delete(_) => "delete",
        EditorAction::Edit(_) => "edit",
        EditorAction::PickImage(_) => "pick-image",
        EditorAction::PickColor(_) => "pick-color",
        EditorAction::AddNeighbor(_, Direction::Top) => "add-top",
        EditorAction::AddNeighbor(_, Direction::Bottom) => "add-bottom",
        EditorAction::AddNeighbor(_, Direction::Left) => "add-left",
        EditorAction::AddNeighbor(_, Direction::Right) => "add-right",
    }
}

fn action_json(action: Option<EditorAction>) -> String {
    match action {
        Some(action) => format!(
            r#"{{"action":"{}","node":"{}"}}"#,
            action_name(&action),
            action.node()
        ),
        None => r#"{"action":"none"}"#.to_string(),
    }
}

fn shortcut_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::ZoomIn => "zoom-in",
        ShortcutAction::ZoomOut => "zoom-out",
        ShortcutAction::ZoomToFit => "zoom-to-fit",
        ShortcutAction::Export => "export",
        ShortcutAction::EndEdit => "end-edit",
    }
}

/// Route `log` to the browser console and report panics there.
fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = console_log::init_with_level(log::Level::Debug);
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("mind map WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn control_actions_serialize_with_node_id() {
        let id = NodeId::from_raw(3);
        assert_eq!(
            action_json(Some(EditorAction::AddNeighbor(id, Direction::Right))),
            r#"{"action":"add-right","node":"node-3"}"#
        );
        assert_eq!(action_json(None), r#"{"action":"none"}"#);
    }

    #[test]
    fn bridge_edits_through_string_ids() {
        let mut canvas = MindMapCanvas::new(1200.0, 800.0);
        let root = canvas.editor.root().to_string();
        let child = canvas.add_neighbor(&root, "right");
        assert!(!child.is_empty());
        assert_eq!(canvas.add_neighbor(&root, "diagonal"), "");
        assert!(canvas.set_color(&child, "#FF8800"));
        assert!(!canvas.set_color(&child, "orange"));
        assert!(!canvas.set_image(&child, "  "));
        assert!(canvas.set_image(&child, "https://example.com/cat.png"));
        assert!(canvas.delete_node(&child));
        assert!(!canvas.delete_node(&child));
        assert_eq!(canvas.get_node_bounds(&child), "{}");
    }

    #[test]
    fn nodes_json_lists_geometry() {
        let canvas = MindMapCanvas::new(1200.0, 800.0);
        let nodes: serde_json::Value = serde_json::from_str(&canvas.nodes_json()).unwrap();
        assert_eq!(nodes[0]["id"], "node-0");
        assert_eq!(nodes[0]["x"], 500.0);
        assert_eq!(nodes[0]["content"], "Argomento Principale");
        assert_eq!(nodes[0]["accent"], "#007BFF");
    }

    #[test]
    fn config_json_is_validated() {
        let mut canvas = MindMapCanvas::new(800.0, 600.0);
        assert!(canvas.set_config_json(r#"{"spacing": 150}"#));
        assert!(!canvas.set_config_json("not json"));
        let root = canvas.editor.root().to_string();
        canvas.add_neighbor(&root, "bottom");
        let nodes: serde_json::Value = serde_json::from_str(&canvas.nodes_json()).unwrap();
        assert_eq!(nodes[1]["y"], nodes[0]["y"].as_f64().unwrap() + 150.0);
    }

    #[test]
    fn two_phase_export_guards_and_restores() {
        let mut canvas = MindMapCanvas::new(800.0, 600.0);
        let svg = canvas.begin_export();
        assert!(svg.starts_with("<svg"));
        assert!(!canvas.controls_visible());
        assert_eq!(canvas.begin_export(), "");
        // The page failed to rasterize
        assert!(!canvas.finish_export(""));
        assert!(canvas.controls_visible());
        assert!(!canvas.finish_export(""));
    }
}
