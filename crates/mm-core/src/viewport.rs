//! Viewport transform: zoom factor plus pan offset.
//!
//! The view maps canvas coordinates to screen coordinates as
//! `screen = canvas × zoom + pan`, which is exactly the CSS
//! `translate(pan) scale(zoom)` applied to the canvas container with a
//! top-left transform origin.

use crate::config::EditorConfig;
use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

/// The visible window (screen) dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl ScreenSize {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Pan/zoom state applied to the canvas for on-screen display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f32,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Viewport {
    pub const IDENTITY: Viewport = Viewport {
        zoom: 1.0,
        pan: Point { x: 0.0, y: 0.0 },
    };

    /// Step the zoom by `delta`, clamped to `[min, max]`. Pan is unchanged.
    pub fn zoom_by(&mut self, delta: f32, min: f32, max: f32) -> f32 {
        self.zoom = (self.zoom + delta).clamp(min, max);
        self.zoom
    }

    pub fn zoom_in(&mut self, config: &EditorConfig) -> f32 {
        self.zoom_by(config.zoom_step, config.min_zoom, config.max_zoom)
    }

    pub fn zoom_out(&mut self, config: &EditorConfig) -> f32 {
        self.zoom_by(-config.zoom_step, config.min_zoom, config.max_zoom)
    }

    /// Fit `content` in `screen`. Returns `false` (and leaves the view
    /// alone) when there is nothing to fit.
    pub fn fit(&mut self, content: Option<Bounds>, screen: ScreenSize, config: &EditorConfig) -> bool {
        let Some(fitted) = content
            .and_then(|b| fit_to_bounds(b, screen, config.fit_padding, config.fit_max_zoom))
        else {
            return false;
        };
        *self = fitted;
        true
    }

    /// The single transform applied to the canvas container.
    pub fn transform_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.pan.x, self.pan.y, self.zoom
        )
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    pub fn screen_to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    /// Convert a screen-space delta (drag distance) to canvas units.
    pub fn screen_delta_to_canvas(&self, dx: f32, dy: f32) -> (f32, f32) {
        (dx / self.zoom, dy / self.zoom)
    }
}

/// Closed-form fit: the zoom that makes `content` plus `padding` on every
/// side fit the screen (never above `max_zoom`), and the pan that puts the
/// content center at the screen center.
///
/// Returns `None` for zero-width or zero-height content, and for a screen
/// without a positive area (a hidden or collapsed window), which would
/// otherwise produce a zero zoom.
pub fn fit_to_bounds(content: Bounds, screen: ScreenSize, padding: f32, max_zoom: f32) -> Option<Viewport> {
    if content.is_degenerate() || !(screen.width > 0.0 && screen.height > 0.0) {
        return None;
    }

    let scale_x = screen.width / (content.width + padding * 2.0);
    let scale_y = screen.height / (content.height + padding * 2.0);
    let zoom = scale_x.min(scale_y).min(max_zoom);

    let (cx, cy) = content.center();
    let center = screen.center();
    Some(Viewport {
        zoom,
        pan: Point::new(center.x - cx * zoom, center.y - cy * zoom),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCREEN: ScreenSize = ScreenSize {
        width: 1200.0,
        height: 800.0,
    };

    #[test]
    fn zoom_steps_and_clamps() {
        let cfg = EditorConfig::default();
        let mut vp = Viewport::default();
        let z = vp.zoom_in(&cfg);
        assert!((z - 1.1).abs() < 1e-5);
        for _ in 0..20 {
            vp.zoom_in(&cfg);
        }
        assert_eq!(vp.zoom, 2.0);
        for _ in 0..30 {
            vp.zoom_out(&cfg);
        }
        assert_eq!(vp.zoom, 0.3);
        assert_eq!(vp.pan, Point::default());
    }

    #[test]
    fn css_string() {
        let vp = Viewport {
            zoom: 0.5,
            pan: Point::new(10.0, -20.0),
        };
        assert_eq!(vp.transform_css(), "translate(10px, -20px) scale(0.5)");
        assert_eq!(Viewport::IDENTITY.transform_css(), "translate(0px, 0px) scale(1)");
    }

    #[test]
    fn screen_canvas_roundtrip() {
        let vp = Viewport {
            zoom: 1.5,
            pan: Point::new(40.0, 30.0),
        };
        let p = Point::new(100.0, 200.0);
        let back = vp.screen_to_canvas(vp.canvas_to_screen(p));
        assert!((back.x - p.x).abs() < 1e-4 && (back.y - p.y).abs() < 1e-4);
    }

    #[test]
    fn fit_small_content_is_capped() {
        let content = Bounds::new(500.0, 375.0, 200.0, 50.0);
        let vp = fit_to_bounds(content, SCREEN, 100.0, 1.5).unwrap();
        // 1200 / 400 = 3, 800 / 250 = 3.2 → capped
        assert_eq!(vp.zoom, 1.5);
        assert_eq!(vp.pan, Point::new(600.0 - 600.0 * 1.5, 400.0 - 400.0 * 1.5));
    }

    #[test]
    fn fit_large_content_shrinks() {
        let content = Bounds::new(0.0, 0.0, 2200.0, 600.0);
        let vp = fit_to_bounds(content, SCREEN, 100.0, 1.5).unwrap();
        assert_eq!(vp.zoom, 0.5);
        assert_eq!(vp.pan, Point::new(600.0 - 1100.0 * 0.5, 400.0 - 300.0 * 0.5));
    }

    #[test]
    fn fit_degenerate_is_none() {
        assert!(fit_to_bounds(Bounds::new(1.0, 1.0, 0.0, 10.0), SCREEN, 100.0, 1.5).is_none());
        let mut vp = Viewport::default();
        assert!(!vp.fit(None, SCREEN, &EditorConfig::default()));
        assert_eq!(vp, Viewport::IDENTITY);
    }

    #[test]
    fn fit_on_collapsed_screen_keeps_view() {
        let content = Bounds::new(0.0, 0.0, 400.0, 300.0);
        let collapsed = ScreenSize {
            width: 0.0,
            height: 800.0,
        };
        assert!(fit_to_bounds(content, collapsed, 100.0, 1.5).is_none());
        assert!(fit_to_bounds(content, ScreenSize { width: 0.0, height: 0.0 }, 100.0, 1.5).is_none());

        let mut vp = Viewport::default();
        vp.zoom_in(&EditorConfig::default());
        let before = vp;
        assert!(!vp.fit(Some(content), collapsed, &EditorConfig::default()));
        assert_eq!(vp, before);
        assert!(vp.zoom.is_finite() && vp.pan.x.is_finite());
    }

    #[test]
    fn fit_is_idempotent() {
        let cfg = EditorConfig::default();
        let content = Some(Bounds::new(-300.0, 40.0, 900.0, 700.0));
        let mut vp = Viewport::default();
        vp.fit(content, SCREEN, &cfg);
        let first = vp;
        vp.fit(content, SCREEN, &cfg);
        assert_eq!(vp, first);
    }
}
