//! Node geometry and neighbor placement.
//!
//! Node sizes are derived from content with a fixed text metric so every
//! consumer (fit-to-screen, hit testing, export) agrees on the same boxes.
//! There is no layout algorithm beyond this: positions are user-placed or
//! offset from a parent by the spacing constant.

use crate::geometry::{Bounds, Point, Size, union_all};
use crate::model::{MindMap, TopicNode};
use serde::{Deserialize, Serialize};

pub const NODE_MIN_WIDTH: f32 = 150.0;
pub const NODE_MAX_WIDTH: f32 = 250.0;
pub const NODE_PADDING: f32 = 15.0;
pub const CHAR_WIDTH: f32 = 8.0;
pub const LINE_HEIGHT: f32 = 20.0;
pub const FONT_SIZE: f32 = 14.0;
pub const IMAGE_HEIGHT: f32 = 100.0;
pub const IMAGE_GAP: f32 = 10.0;

/// Where a spawned neighbor goes relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(Direction::Top),
            "bottom" => Some(Direction::Bottom),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Unit step along the axis, in canvas coordinates (y grows downward).
    pub fn unit(self) -> (f32, f32) {
        match self {
            Direction::Top => (0.0, -1.0),
            Direction::Bottom => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

/// Position of a neighbor spawned from `origin`. No collision avoidance.
pub fn neighbor_position(origin: Point, direction: Direction, spacing: f32) -> Point {
    let (ux, uy) = direction.unit();
    origin.offset(ux * spacing, uy * spacing)
}

// ─── Text & node metrics ─────────────────────────────────────────────────

/// Greedy word wrap at `max_chars` characters per line. Explicit newlines
/// are kept; words longer than a line are split. Always yields at least
/// one line.
pub fn wrap_text(content: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in content.split('\n') {
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let len = word.len();
            if len == 0 {
                continue;
            }
            let needed = if line_len == 0 { len } else { line_len + 1 + len };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word);
            line_len += len;
        }
        lines.push(line);
    }

    lines
}

/// Resolved geometry of one node: outer box, optional image slot, and the
/// wrapped text lines with the baseline of the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub bounds: Bounds,
    pub image: Option<Bounds>,
    pub lines: Vec<String>,
    /// Horizontal center of the text column and top of the first line.
    pub text_origin: Point,
}

fn max_chars_per_line() -> usize {
    ((NODE_MAX_WIDTH - NODE_PADDING * 2.0) / CHAR_WIDTH) as usize
}

/// Lay out a node from its content.
pub fn layout_node(node: &TopicNode) -> NodeLayout {
    let lines = wrap_text(&node.content, max_chars_per_line());
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (widest as f32 * CHAR_WIDTH + NODE_PADDING * 2.0).clamp(NODE_MIN_WIDTH, NODE_MAX_WIDTH);

    let origin = node.position;
    let mut cursor_y = origin.y + NODE_PADDING;
    let image = node.image.as_ref().map(|_| {
        let slot = Bounds::new(
            origin.x + NODE_PADDING,
            cursor_y,
            width - NODE_PADDING * 2.0,
            IMAGE_HEIGHT,
        );
        cursor_y += IMAGE_HEIGHT + IMAGE_GAP;
        slot
    });
    let text_origin = Point::new(origin.x + width / 2.0, cursor_y);
    let height = cursor_y - origin.y + lines.len() as f32 * LINE_HEIGHT + NODE_PADDING;

    NodeLayout {
        bounds: Bounds::new(origin.x, origin.y, width, height),
        image,
        lines,
        text_origin,
    }
}

/// Rendered size of a node.
pub fn node_size(node: &TopicNode) -> Size {
    let b = layout_node(node).bounds;
    Size::new(b.width, b.height)
}

/// Rendered box of a node in canvas coordinates.
pub fn node_bounds(node: &TopicNode) -> Bounds {
    Bounds::from_origin_size(node.position, node_size(node))
}

/// Bounding box over every node, or `None` for an empty map.
pub fn content_bounds(map: &MindMap) -> Option<Bounds> {
    union_all(map.nodes().into_iter().map(node_bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use pretty_assertions::assert_eq;

    fn node(content: &str) -> TopicNode {
        TopicNode::new(NodeId::from_raw(0), Point::new(10.0, 20.0), content)
    }

    #[test]
    fn neighbor_offsets() {
        let origin = Point::new(100.0, 100.0);
        assert_eq!(neighbor_position(origin, Direction::Top, 200.0), Point::new(100.0, -100.0));
        assert_eq!(neighbor_position(origin, Direction::Bottom, 200.0), Point::new(100.0, 300.0));
        assert_eq!(neighbor_position(origin, Direction::Left, 200.0), Point::new(-100.0, 100.0));
        assert_eq!(neighbor_position(origin, Direction::Right, 200.0), Point::new(300.0, 100.0));
    }

    #[test]
    fn direction_names_roundtrip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_name(d.name()), Some(d));
        }
        assert_eq!(Direction::from_name("up"), None);
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_text("Nuovo Argomento", 27), vec!["Nuovo Argomento"]);
    }

    #[test]
    fn wrap_breaks_on_words_and_newlines() {
        assert_eq!(
            wrap_text("alpha beta gamma\ndelta", 11),
            vec!["alpha beta", "gamma", "delta"]
        );
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn placeholder_node_has_minimum_width() {
        let size = node_size(&node("Nuovo Argomento"));
        assert_eq!(size, Size::new(NODE_MIN_WIDTH, 50.0));
    }

    #[test]
    fn long_text_is_capped_and_grows_downward() {
        let size = node_size(&node(
            "a fairly long topic label that certainly needs more than one line",
        ));
        assert!(size.width > NODE_MIN_WIDTH && size.width <= NODE_MAX_WIDTH);
        assert_eq!(size.height, 50.0 + 2.0 * LINE_HEIGHT);
    }

    #[test]
    fn image_adds_slot_above_text() {
        let mut n = node("pic");
        n.image = Some("https://example.com/a.png".into());
        let layout = layout_node(&n);
        let slot = layout.image.expect("image slot");
        assert_eq!(slot.y, 20.0 + NODE_PADDING);
        assert_eq!(slot.height, IMAGE_HEIGHT);
        assert_eq!(layout.text_origin.y, slot.bottom() + IMAGE_GAP);
        assert_eq!(layout.bounds.height, 50.0 + IMAGE_HEIGHT + IMAGE_GAP);
    }

    #[test]
    fn content_bounds_spans_all_nodes() {
        let mut map = MindMap::new();
        assert_eq!(content_bounds(&map), None);
        map.create_node(Point::new(0.0, 0.0), "a");
        map.create_node(Point::new(400.0, 300.0), "b");
        let b = content_bounds(&map).unwrap();
        assert_eq!(b, Bounds::new(0.0, 0.0, 400.0 + NODE_MIN_WIDTH, 350.0));
    }
}
