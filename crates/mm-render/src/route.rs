//! Connection routing.
//!
//! Links are drawn between a pair of anchors, one on each node, picked from
//! the four side midpoints as the closest pair. The router decides the path
//! between them. `FlowchartRouter` draws orthogonal segments with rounded
//! corners; `StraightRouter` draws a single segment.

use kurbo::BezPath;
use mm_core::{Bounds, Point};
use smallvec::SmallVec;

/// Arrow head dimensions at the target end.
pub const ARROW_LENGTH: f32 = 8.0;
pub const ARROW_WIDTH: f32 = 8.0;

/// Side midpoint of a node box where a link attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [Anchor::Top, Anchor::Bottom, Anchor::Left, Anchor::Right];

    pub fn point(self, b: &Bounds) -> Point {
        let (cx, cy) = b.center();
        match self {
            Anchor::Top => Point::new(cx, b.y),
            Anchor::Bottom => Point::new(cx, b.bottom()),
            Anchor::Left => Point::new(b.x, cy),
            Anchor::Right => Point::new(b.right(), cy),
        }
    }

    /// Outward unit normal.
    pub fn normal(self) -> (f32, f32) {
        match self {
            Anchor::Top => (0.0, -1.0),
            Anchor::Bottom => (0.0, 1.0),
            Anchor::Left => (-1.0, 0.0),
            Anchor::Right => (1.0, 0.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Anchor::Left | Anchor::Right)
    }
}

/// Pick the closest (source, target) anchor pair. Ties go to the first
/// pair in `Anchor::ALL` order.
pub fn closest_anchors(source: &Bounds, target: &Bounds) -> (Anchor, Anchor) {
    let mut best = (Anchor::Top, Anchor::Top);
    let mut best_dist = f32::INFINITY;
    for s in Anchor::ALL {
        for t in Anchor::ALL {
            let d = s.point(source).distance_squared(t.point(target));
            if d < best_dist {
                best_dist = d;
                best = (s, t);
            }
        }
    }
    best
}

/// Triangle at the end of a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

impl ArrowHead {
    /// Arrow pointing from `from` toward `tip`.
    pub fn pointing(from: Point, tip: Point) -> Self {
        let dx = tip.x - from.x;
        let dy = tip.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();
        let (ux, uy) = if len > f32::EPSILON {
            (dx / len, dy / len)
        } else {
            (1.0, 0.0)
        };
        let base = Point::new(tip.x - ux * ARROW_LENGTH, tip.y - uy * ARROW_LENGTH);
        let (px, py) = (-uy * ARROW_WIDTH / 2.0, ux * ARROW_WIDTH / 2.0);
        Self {
            tip,
            left: base.offset(px, py),
            right: base.offset(-px, -py),
        }
    }
}

/// A routed link, ready to paint.
#[derive(Debug, Clone)]
pub struct Route {
    pub source_anchor: Anchor,
    pub target_anchor: Anchor,
    /// Corner points of the polyline, before corner rounding.
    pub points: SmallVec<[Point; 6]>,
    /// Paintable outline, corners rounded.
    pub path: BezPath,
    pub arrow: ArrowHead,
}

impl Route {
    /// SVG path data of the link body.
    pub fn svg_path(&self) -> String {
        self.path.to_svg()
    }
}

/// Computes link geometry between two node boxes. Implementations are
/// swappable without touching the model.
pub trait ConnectionRouter {
    fn route(&self, source: &Bounds, target: &Bounds) -> Route;
}

// ─── Flowchart ───────────────────────────────────────────────────────────

/// Orthogonal connector: leaves each anchor along its normal for `stub`
/// pixels, then joins the stubs with horizontal/vertical segments.
#[derive(Debug, Clone, Copy)]
pub struct FlowchartRouter {
    pub stub: f32,
    pub corner_radius: f32,
}

impl Default for FlowchartRouter {
    fn default() -> Self {
        Self {
            stub: 30.0,
            corner_radius: 5.0,
        }
    }
}

impl ConnectionRouter for FlowchartRouter {
    fn route(&self, source: &Bounds, target: &Bounds) -> Route {
        let (sa, ta) = closest_anchors(source, target);
        let s = sa.point(source);
        let t = ta.point(target);
        let (snx, sny) = sa.normal();
        let (tnx, tny) = ta.normal();
        let s1 = s.offset(snx * self.stub, sny * self.stub);
        let t1 = t.offset(tnx * self.stub, tny * self.stub);

        let mut points: SmallVec<[Point; 6]> = SmallVec::new();
        points.push(s);
        points.push(s1);
        match (sa.is_horizontal(), ta.is_horizontal()) {
            (true, true) => {
                let mx = (s1.x + t1.x) / 2.0;
                points.push(Point::new(mx, s1.y));
                points.push(Point::new(mx, t1.y));
            }
            (false, false) => {
                let my = (s1.y + t1.y) / 2.0;
                points.push(Point::new(s1.x, my));
                points.push(Point::new(t1.x, my));
            }
            (true, false) => points.push(Point::new(t1.x, s1.y)),
            (false, true) => points.push(Point::new(s1.x, t1.y)),
        }
        points.push(t1);
        points.push(t);
        simplify(&mut points);

        let before_tip = points[points.len().saturating_sub(2)];
        Route {
            source_anchor: sa,
            target_anchor: ta,
            path: rounded_polyline(&points, self.corner_radius),
            arrow: ArrowHead::pointing(before_tip, t),
            points,
        }
    }
}

// ─── Straight ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct StraightRouter;

impl ConnectionRouter for StraightRouter {
    fn route(&self, source: &Bounds, target: &Bounds) -> Route {
        let (sa, ta) = closest_anchors(source, target);
        let s = sa.point(source);
        let t = ta.point(target);
        let mut points: SmallVec<[Point; 6]> = SmallVec::new();
        points.push(s);
        points.push(t);
        Route {
            source_anchor: sa,
            target_anchor: ta,
            path: rounded_polyline(&points, 0.0),
            arrow: ArrowHead::pointing(s, t),
            points,
        }
    }
}

// ─── Polyline helpers ────────────────────────────────────────────────────

const EPS: f32 = 1e-3;

/// Drop repeated points and interior points on a straight run.
fn simplify(points: &mut SmallVec<[Point; 6]>) {
    points.dedup_by(|b, a| a.distance_squared(*b) < EPS * EPS);
    let mut i = 1;
    while i + 1 < points.len() {
        let (a, b, c) = (points[i - 1], points[i], points[i + 1]);
        let same_x = (a.x - b.x).abs() < EPS && (b.x - c.x).abs() < EPS;
        let same_y = (a.y - b.y).abs() < EPS && (b.y - c.y).abs() < EPS;
        if same_x || same_y {
            points.remove(i);
        } else {
            i += 1;
        }
    }
}

fn kp(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x as f64, p.y as f64)
}

/// Polyline with each interior corner replaced by a quadratic arc of at
/// most `radius`, shrunk to half the shorter adjacent segment.
fn rounded_polyline(points: &[Point], radius: f32) -> BezPath {
    let mut path = BezPath::new();
    let Some((&first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(kp(first));
    if rest.is_empty() {
        return path;
    }

    for w in points.windows(3) {
        let (prev, corner, next) = (kp(w[0]), kp(w[1]), kp(w[2]));
        let into = corner - prev;
        let out = next - corner;
        let r = (radius as f64)
            .min(into.hypot() / 2.0)
            .min(out.hypot() / 2.0);
        if r <= 0.0 {
            path.line_to(corner);
            continue;
        }
        let a = corner - into * (r / into.hypot());
        let b = corner + out * (r / out.hypot());
        path.line_to(a);
        path.quad_to(corner, b);
    }

    if let Some(&last) = points.last() {
        path.line_to(kp(last));
    }
    path
}
