//! Hit testing: point → node or control lookup.
//!
//! Walks the scene front-to-back (last painted = topmost) and reports the
//! first control or node body under the canvas-space point.

use crate::chrome::Control;
use crate::scene::Scene;
use mm_core::{NodeId, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// One of a node's buttons.
    Control(NodeId, Control),
    /// The node body.
    Node(NodeId),
}

impl Hit {
    pub fn node(self) -> NodeId {
        match self {
            Hit::Control(id, _) | Hit::Node(id) => id,
        }
    }
}

/// Find what sits at canvas position `p`. Returns `None` on background.
pub fn hit_test(scene: &Scene, p: Point) -> Option<Hit> {
    for node in scene.nodes.iter().rev() {
        if scene.chrome_visible {
            // Controls paint over their own node, so check them first
            for &(control, b) in node.controls.iter().rev() {
                if b.contains(p.x, p.y) {
                    return Some(Hit::Control(node.id, control));
                }
            }
        }
        if node.bounds().contains(p.x, p.y) {
            return Some(Hit::Node(node.id));
        }
    }
    None
}
