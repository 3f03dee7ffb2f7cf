//! Pointer gestures on the canvas.
//!
//! The gesture turns canvas-space pointer events plus the hit under the
//! pointer into `MapMutation`s (node drags) or an `EditorAction` (a
//! completed click on one of a node's controls).
//!
//! ## Modifier behaviors
//!
//! | Modifier | Drag |
//! |----------|------|
//! | **Shift** | Axis-constrain drag |

use crate::editor::MapMutation;
use crate::input::InputEvent;
use mm_core::{Direction, NodeId, Point};
use mm_render::{Control, Hit};

/// What a control click asks for. Delete and spawn are carried out by the
/// editor; the rest need host UI (text field focus, URL prompt, picker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Delete(NodeId),
    Edit(NodeId),
    PickImage(NodeId),
    PickColor(NodeId),
    AddNeighbor(NodeId, Direction),
}

impl EditorAction {
    pub fn from_control(id: NodeId, control: Control) -> Self {
        match control {
            Control::Delete => Self::Delete(id),
            Control::Edit => Self::Edit(id),
            Control::Image => Self::PickImage(id),
            Control::ColorPicker => Self::PickColor(id),
            Control::Add(direction) => Self::AddNeighbor(id, direction),
        }
    }

    pub fn node(&self) -> NodeId {
        match *self {
            Self::Delete(id)
            | Self::Edit(id)
            | Self::PickImage(id)
            | Self::PickColor(id)
            | Self::AddNeighbor(id, _) => id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureOutcome {
    pub mutations: Vec<MapMutation>,
    pub action: Option<EditorAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum State {
    #[default]
    Idle,
    /// Moving a node. `last` is the previous pointer position.
    Dragging {
        id: NodeId,
        origin: Point,
        last: Point,
    },
    /// Pressed on a control; fires on release over the same control.
    Pressing { id: NodeId, control: Control },
}

#[derive(Debug, Default)]
pub struct DragGesture {
    state: State,
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node currently being dragged.
    pub fn dragging(&self) -> Option<NodeId> {
        match self.state {
            State::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Drop any in-progress gesture (e.g. the dragged node was deleted).
    pub fn cancel(&mut self) {
        self.state = State::Idle;
    }

    /// Handle a canvas-space event. `hit` is whatever sits under the pointer.
    pub fn handle(&mut self, event: &InputEvent, hit: Option<Hit>) -> GestureOutcome {
        let (x, y) = event.position();
        let p = Point::new(x, y);
        let mut out = GestureOutcome::default();

        match event {
            InputEvent::PointerDown { .. } => {
                self.state = match hit {
                    Some(Hit::Control(id, control)) => State::Pressing { id, control },
                    Some(Hit::Node(id)) => State::Dragging {
                        id,
                        origin: p,
                        last: p,
                    },
                    None => State::Idle,
                };
            }
            InputEvent::PointerMove { modifiers, .. } => {
                if let State::Dragging { id, origin, last } = self.state {
                    let mut dx = p.x - last.x;
                    let mut dy = p.y - last.y;
                    if modifiers.shift {
                        // Lock to the dominant axis of the whole drag
                        if (p.x - origin.x).abs() >= (p.y - origin.y).abs() {
                            dy = 0.0;
                        } else {
                            dx = 0.0;
                        }
                    }
                    if dx != 0.0 || dy != 0.0 {
                        out.mutations.push(MapMutation::MoveNode { id, dx, dy });
                    }
                    self.state = State::Dragging {
                        id,
                        origin,
                        last: p,
                    };
                }
            }
            InputEvent::PointerUp { .. } => {
                if let State::Pressing { id, control } = self.state {
                    if hit == Some(Hit::Control(id, control)) {
                        out.action = Some(EditorAction::from_control(id, control));
                    }
                }
                self.state = State::Idle;
            }
        }
        out
    }
}
