//! Per-node interactive controls ("chrome").
//!
//! Every node carries the same eight controls at fixed spots around its
//! box. Hiding the chrome only changes visibility; the geometry stays put.

use mm_core::Bounds;
use mm_core::layout::Direction;

/// Side of the square hit area of a control.
pub const CONTROL_SIZE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Delete,
    Edit,
    Image,
    Add(Direction),
    ColorPicker,
}

impl Control {
    /// Paint order; hit testing walks it backwards.
    pub const ALL: [Control; 8] = [
        Control::Edit,
        Control::Image,
        Control::Delete,
        Control::Add(Direction::Top),
        Control::Add(Direction::Bottom),
        Control::Add(Direction::Left),
        Control::Add(Direction::Right),
        Control::ColorPicker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Control::Delete => "delete",
            Control::Edit => "edit",
            Control::Image => "image",
            Control::Add(Direction::Top) => "add-top",
            Control::Add(Direction::Bottom) => "add-bottom",
            Control::Add(Direction::Left) => "add-left",
            Control::Add(Direction::Right) => "add-right",
            Control::ColorPicker => "color",
        }
    }

    /// Glyph drawn on the button.
    pub fn glyph(self) -> &'static str {
        match self {
            Control::Delete => "×",
            Control::Edit => "✎",
            Control::Image => "🖼",
            Control::Add(_) => "+",
            Control::ColorPicker => "",
        }
    }

    /// Hit area of this control for a node occupying `node`.
    pub fn bounds(self, node: &Bounds) -> Bounds {
        let half = CONTROL_SIZE / 2.0;
        let (cx, cy) = node.center();
        let (x, y) = match self {
            Control::Edit => (node.x - half, node.y - half),
            Control::Image => (node.x + CONTROL_SIZE, node.y - half),
            Control::Delete => (node.right() - half, node.y - half),
            Control::Add(Direction::Top) => (cx - half, node.y - CONTROL_SIZE - half),
            Control::Add(Direction::Bottom) => (cx - half, node.bottom() + half),
            Control::Add(Direction::Left) => (node.x - CONTROL_SIZE - half, cy - half),
            Control::Add(Direction::Right) => (node.right() + half, cy - half),
            Control::ColorPicker => (node.right() - half, node.bottom() - half),
        };
        Bounds::new(x, y, CONTROL_SIZE, CONTROL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_do_not_overlap() {
        let node = Bounds::new(0.0, 0.0, 150.0, 50.0);
        for (i, a) in Control::ALL.iter().enumerate() {
            for b in &Control::ALL[i + 1..] {
                assert!(
                    !a.bounds(&node).intersects(&b.bounds(&node)),
                    "{} overlaps {}",
                    a.name(),
                    b.name()
                );
            }
        }
    }

    #[test]
    fn add_buttons_sit_on_their_side() {
        let node = Bounds::new(100.0, 100.0, 150.0, 50.0);
        assert!(Control::Add(Direction::Top).bounds(&node).bottom() <= node.y);
        assert!(Control::Add(Direction::Bottom).bounds(&node).y >= node.bottom());
        assert!(Control::Add(Direction::Left).bounds(&node).right() <= node.x);
        assert!(Control::Add(Direction::Right).bounds(&node).x >= node.right());
    }
}
