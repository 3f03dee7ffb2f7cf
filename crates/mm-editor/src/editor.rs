//! Map editor: the single owner of editor state.
//!
//! `MapEditor` holds the map, the view transform, the configuration, the
//! connection router, the export session, and the pointer gesture. Every
//! host interaction (button, pointer, key, prompt answer) goes through one
//! of its methods; rendering reads `scene()`.

use crate::export::{ExportJob, ExportSession};
use crate::gesture::{DragGesture, EditorAction};
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use mm_core::error::Result;
use mm_core::layout::{content_bounds, neighbor_position, node_size};
use mm_core::{
    Bounds, Color, Direction, EditorConfig, LinkId, LinkStyle, MindMap, NodeId, Point, RemovedNode,
    ScreenSize, Size, Viewport,
};
use mm_render::{
    ConnectionRouter, Download, ExportError, ExportFrame, FlowchartRouter, Hit, ImageExporter,
    ProjectOptions, RasterImage, Scene, hit_test, project,
};

/// A single edit to the map, as produced by gestures or replayed by hosts.
#[derive(Debug, Clone, PartialEq)]
pub enum MapMutation {
    /// Drag by a canvas-space delta.
    MoveNode { id: NodeId, dx: f32, dy: f32 },
    AddNeighbor { parent: NodeId, direction: Direction },
    RemoveNode { id: NodeId },
    SetColor { id: NodeId, color: Color },
    SetText { id: NodeId, content: String },
    /// `None` clears the image.
    SetImage { id: NodeId, url: Option<String> },
    Connect { source: NodeId, target: NodeId },
}

pub struct MapEditor {
    map: MindMap,
    viewport: Viewport,
    /// Window size, used by fit-to-screen and as the default canvas size.
    screen: ScreenSize,
    config: EditorConfig,
    router: Box<dyn ConnectionRouter>,
    export: ExportSession,
    gesture: DragGesture,
    /// Node whose text is being edited. At most one.
    editing: Option<NodeId>,
    root: NodeId,
}

impl MapEditor {
    /// Create an editor for a window of size `screen` and place the root
    /// topic near its center.
    pub fn new(screen: ScreenSize, config: EditorConfig) -> Self {
        Self::with_router(screen, config, Box::new(FlowchartRouter::default()))
    }

    pub fn with_router(
        screen: ScreenSize,
        config: EditorConfig,
        router: Box<dyn ConnectionRouter>,
    ) -> Self {
        let mut map = MindMap::new();
        let origin = Point::new(screen.width / 2.0 - 100.0, screen.height / 2.0 - 50.0);
        let root = map.create_node(origin, config.root_text.clone());
        log::debug!(
            "editor ready: {}x{} window, root {root}",
            screen.width,
            screen.height
        );
        Self {
            map,
            viewport: Viewport::IDENTITY,
            screen,
            config,
            router,
            export: ExportSession::new(),
            gesture: DragGesture::new(),
            editing: None,
            root,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn map(&self) -> &MindMap {
        &self.map
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The node created at startup. It may have been deleted since.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn editing(&self) -> Option<NodeId> {
        self.editing
    }

    pub fn chrome_visible(&self) -> bool {
        self.export.chrome_visible()
    }

    pub fn export_in_flight(&self) -> bool {
        self.export.in_flight()
    }

    /// Replace the configuration. The map and view are left as they are.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    pub fn set_router(&mut self, router: Box<dyn ConnectionRouter>) {
        self.router = router;
    }

    /// The container that nodes are dragged within.
    pub fn canvas_size(&self) -> Size {
        self.config
            .canvas
            .unwrap_or(Size::new(self.screen.width, self.screen.height))
    }

    // ─── Node operations ─────────────────────────────────────────────────

    /// Insert a topic at canvas position `(x, y)`. Without `content` the
    /// node gets the placeholder text.
    pub fn create_node(&mut self, x: f32, y: f32, content: Option<&str>) -> NodeId {
        let content = content.map_or_else(|| self.config.placeholder_text.clone(), str::to_string);
        self.map.create_node(Point::new(x, y), content)
    }

    /// Spawn a placeholder topic `spacing` pixels from `parent` in
    /// `direction` and link parent → child in the parent's accent.
    pub fn add_neighbor(&mut self, parent: NodeId, direction: Direction) -> Result<(NodeId, LinkId)> {
        let node = self.map.node(parent)?;
        let color = node.accent_or(self.config.default_accent);
        let position = neighbor_position(node.position, direction, self.config.spacing);

        let child = self.create_node(position.x, position.y, None);
        let link = self.map.connect(
            parent,
            child,
            LinkStyle {
                color,
                width: self.config.link_width,
            },
        )?;
        log::debug!("spawned {child} {} of {parent}", direction.name());
        Ok((child, link))
    }

    /// Remove a node and every link touching it.
    pub fn delete_node(&mut self, id: NodeId) -> Result<RemovedNode> {
        let removed = self.map.remove_node(id)?;
        if self.editing == Some(id) {
            self.editing = None;
        }
        if self.gesture.dragging() == Some(id) {
            self.gesture.cancel();
        }
        Ok(removed)
    }

    /// Recolor a node and its outgoing links. Returns how many links were
    /// restyled.
    pub fn set_color(&mut self, id: NodeId, color: Color) -> Result<usize> {
        let restyled = self.map.set_accent(id, color)?;
        log::debug!("recolored {id} to {}, {restyled} link(s)", color.to_hex());
        Ok(restyled)
    }

    /// Set the node's image from a prompt answer. Blank input leaves the
    /// node unchanged and returns `false`.
    pub fn set_image(&mut self, id: NodeId, url: &str) -> Result<bool> {
        self.map.node(id)?;
        let url = url.trim();
        if url.is_empty() {
            return Ok(false);
        }
        self.map.set_image(id, Some(url.to_string()))?;
        Ok(true)
    }

    pub fn clear_image(&mut self, id: NodeId) -> Result<()> {
        self.map.set_image(id, None)
    }

    /// Enter text edit mode on `id`, ending any other edit.
    pub fn begin_edit(&mut self, id: NodeId) -> Result<()> {
        self.map.node(id)?;
        if let Some(prev) = self.editing.replace(id) {
            if prev != id {
                log::debug!("edit moved from {prev} to {id}");
            }
        }
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.map.set_content(id, text)
    }

    /// Leave edit mode (focus loss). Returns the node that was being edited.
    pub fn end_edit(&mut self) -> Option<NodeId> {
        self.editing.take()
    }

    /// The edit button: on when off, off when on.
    pub fn toggle_edit(&mut self, id: NodeId) -> Result<bool> {
        if self.editing == Some(id) {
            self.end_edit();
            Ok(false)
        } else {
            self.begin_edit(id)?;
            Ok(true)
        }
    }

    /// Drag a node by a canvas-space delta. The drag never pushes a node
    /// further out of the canvas container; a node already outside (e.g.
    /// spawned past the edge) keeps its position on that axis until it is
    /// dragged back in. Returns its new position.
    pub fn move_node(&mut self, id: NodeId, dx: f32, dy: f32) -> Result<Point> {
        let canvas = self.canvas_size();
        let node = self.map.node(id)?;
        let size = node_size(node);
        let pos = node.position;
        let to = Point::new(
            contain(pos.x, dx, canvas.width - size.width),
            contain(pos.y, dy, canvas.height - size.height),
        );
        self.map.move_to(id, to)?;
        Ok(to)
    }

    /// User-drawn link, styled like a spawned one.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<LinkId> {
        let color = self.map.node(source)?.accent_or(self.config.default_accent);
        self.map.connect(
            source,
            target,
            LinkStyle {
                color,
                width: self.config.link_width,
            },
        )
    }

    /// Apply one mutation.
    pub fn apply(&mut self, mutation: MapMutation) -> Result<()> {
        match mutation {
            MapMutation::MoveNode { id, dx, dy } => {
                self.move_node(id, dx, dy)?;
            }
            MapMutation::AddNeighbor { parent, direction } => {
                self.add_neighbor(parent, direction)?;
            }
            MapMutation::RemoveNode { id } => {
                self.delete_node(id)?;
            }
            MapMutation::SetColor { id, color } => {
                self.set_color(id, color)?;
            }
            MapMutation::SetText { id, content } => self.set_text(id, &content)?,
            MapMutation::SetImage { id, url: Some(url) } => {
                self.set_image(id, &url)?;
            }
            MapMutation::SetImage { id, url: None } => self.clear_image(id)?,
            MapMutation::Connect { source, target } => {
                self.connect(source, target)?;
            }
        }
        Ok(())
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> f32 {
        self.viewport.zoom_in(&self.config)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.viewport.zoom_out(&self.config)
    }

    /// Frame every node in the window. `false` (view untouched) when there
    /// is nothing with a nonzero extent to frame.
    pub fn fit_to_screen(&mut self) -> bool {
        let fitted = self
            .viewport
            .fit(content_bounds(&self.map), self.screen, &self.config);
        if !fitted {
            log::debug!("fit to screen skipped: no content");
        }
        fitted
    }

    pub fn transform_css(&self) -> String {
        self.viewport.transform_css()
    }

    pub fn screen_to_canvas(&self, x: f32, y: f32) -> Point {
        self.viewport.screen_to_canvas(Point::new(x, y))
    }

    pub fn canvas_to_screen(&self, x: f32, y: f32) -> Point {
        self.viewport.canvas_to_screen(Point::new(x, y))
    }

    /// The window was resized.
    pub fn resize(&mut self, screen: ScreenSize) {
        self.screen = screen;
    }

    /// Current frame, in canvas coordinates with the live view transform.
    pub fn scene(&self) -> Scene {
        project(
            &self.map,
            self.router.as_ref(),
            &ProjectOptions {
                viewport: self.viewport,
                chrome_visible: self.chrome_visible(),
                editing: self.editing,
                default_accent: self.config.default_accent,
            },
        )
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Handle a screen-space pointer event. Returns the control action it
    /// completed, if any; `Delete`, `Edit` and `AddNeighbor` have already
    /// been carried out when this returns.
    pub fn handle_pointer(&mut self, event: &InputEvent) -> Option<EditorAction> {
        let (sx, sy) = event.position();
        let p = self.screen_to_canvas(sx, sy);
        let mut hit = hit_test(&self.scene(), p);

        if let InputEvent::PointerDown { .. } = event {
            if let Some(editing) = self.editing {
                if hit.map(Hit::node) != Some(editing) {
                    self.end_edit();
                } else if hit == Some(Hit::Node(editing)) {
                    // Presses inside the text being edited belong to the text field
                    hit = None;
                }
            }
        }

        let outcome = self.gesture.handle(&event.with_position(p.x, p.y), hit);
        for mutation in outcome.mutations {
            if let Err(err) = self.apply(mutation) {
                log::warn!("gesture mutation rejected: {err}");
            }
        }

        let action = outcome.action?;
        self.run_action(action);
        Some(action)
    }

    fn run_action(&mut self, action: EditorAction) {
        let result = match action {
            EditorAction::Delete(id) => self.delete_node(id).map(|_| ()),
            EditorAction::Edit(id) => self.toggle_edit(id).map(|_| ()),
            EditorAction::AddNeighbor(id, direction) => self.add_neighbor(id, direction).map(|_| ()),
            EditorAction::PickImage(_) | EditorAction::PickColor(_) => Ok(()),
        };
        if let Err(err) = result {
            log::warn!("{action:?} failed: {err}");
        }
    }

    /// Handle a key press. View shortcuts and Escape are applied here;
    /// `Export` is returned for the host to run with its exporter.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve_in_context(
            key,
            modifiers.ctrl,
            modifiers.shift,
            modifiers.alt,
            modifiers.meta,
            self.editing.is_some(),
        )?;
        match action {
            ShortcutAction::ZoomIn => {
                self.zoom_in();
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
            }
            ShortcutAction::ZoomToFit => {
                self.fit_to_screen();
            }
            ShortcutAction::EndEdit => {
                self.end_edit();
            }
            ShortcutAction::Export => {}
        }
        Some(action)
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Hide the chrome and snapshot the full map for capture. `None` while
    /// another export is in flight.
    ///
    /// The frame covers the canvas container and every node, including
    /// nodes left of or above the origin, at 1:1 scale; the live view
    /// transform is not touched.
    pub fn begin_export(&mut self) -> Option<ExportJob> {
        if self.export.in_flight() {
            log::debug!("export already in flight");
            return None;
        }
        let canvas = self.canvas_size();
        let canvas_rect = Bounds::new(0.0, 0.0, canvas.width.max(0.0), canvas.height.max(0.0));
        let area = content_bounds(&self.map).map_or(canvas_rect, |c| canvas_rect.union(&c));
        let scene = project(
            &self.map,
            self.router.as_ref(),
            &ProjectOptions {
                viewport: Viewport {
                    zoom: 1.0,
                    pan: Point::new(-area.x, -area.y),
                },
                chrome_visible: false,
                editing: None,
                default_accent: self.config.default_accent,
            },
        );
        let frame = ExportFrame {
            scene,
            width: area.width.ceil() as u32,
            height: area.height.ceil() as u32,
            background: self.config.export_background,
        };
        self.export.begin(frame, self.config.export_filename.clone())
    }

    /// Show the chrome again and wrap the capture result. Always restores,
    /// whatever `outcome` is.
    pub fn finish_export(
        &mut self,
        job: ExportJob,
        outcome: std::result::Result<RasterImage, ExportError>,
    ) -> std::result::Result<Download, ExportError> {
        self.export.finish(job, outcome)
    }

    /// Run a full export against a synchronous backend.
    pub fn export_with(
        &mut self,
        exporter: &mut dyn ImageExporter,
    ) -> std::result::Result<Download, ExportError> {
        let job = self.begin_export().ok_or(ExportError::AlreadyInFlight)?;
        let outcome = exporter.capture(&job.frame);
        self.finish_export(job, outcome)
    }
}

/// Move `pos` by `delta` within `[0, max]`, never pushing it further
/// outside that range than it already is.
fn contain(pos: f32, delta: f32, max: f32) -> f32 {
    let max = max.max(0.0);
    (pos + delta).clamp(pos.min(0.0), pos.max(max))
}
