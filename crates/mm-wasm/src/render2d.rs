//! Canvas2D renderer.
//!
//! Draws a projected `Scene` to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. The same code paints the live view and the
//! offscreen export canvas.

use kurbo::PathEl;
use mm_core::layout::{FONT_SIZE, LINE_HEIGHT};
use mm_core::{Bounds, Color};
use mm_render::chrome::CONTROL_SIZE;
use mm_render::svg::{FONT_FAMILY, NODE_BORDER_WIDTH, NODE_CORNER_RADIUS};
use mm_render::{Control, LinkView, NodeView, Scene};
use crate::export::create_canvas;
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// Page colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub node_fill: &'static str,
    pub text: &'static str,
    pub control: &'static str,
    pub delete: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: "#F0F2F5",
            node_fill: "#FFFFFF",
            text: "#333333",
            control: "#6C757D",
            delete: "#DC3545",
        }
    }
}

/// Node images, loaded once per URL. Requests are made with
/// `crossOrigin = "anonymous"` so the export canvas stays readable when
/// the server allows it.
#[derive(Default)]
pub struct ImageCache {
    images: HashMap<String, HtmlImageElement>,
    data_urls: HashMap<String, String>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The image for `url` if it has finished loading. Starts the load on
    /// first request.
    pub fn get(&mut self, url: &str) -> Option<&HtmlImageElement> {
        if !self.images.contains_key(url) {
            let img = HtmlImageElement::new().ok()?;
            img.set_cross_origin(Some("anonymous"));
            img.set_src(url);
            self.images.insert(url.to_string(), img);
        }
        self.images
            .get(url)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }

    /// The loaded image for `url` re-encoded as a PNG data URL, for
    /// documents that cannot fetch on their own. `None` while the image is
    /// still loading or when its origin taints the canvas.
    pub fn data_url(&mut self, url: &str) -> Option<String> {
        if let Some(cached) = self.data_urls.get(url) {
            return Some(cached.clone());
        }
        let img = self.get(url)?;
        let canvas = create_canvas(img.natural_width(), img.natural_height()).ok()?;
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        ctx.draw_image_with_html_image_element(img, 0.0, 0.0).ok()?;
        let encoded = canvas.to_data_url().ok()?;
        self.data_urls.insert(url.to_string(), encoded.clone());
        Some(encoded)
    }

    /// Forget images no longer referenced by the scene.
    pub fn retain_used(&mut self, scene: &Scene) {
        let used = |url: &String| scene.nodes.iter().any(|n| n.image.as_deref() == Some(url));
        self.images.retain(|url, _| used(url));
        self.data_urls.retain(|url, _| used(url));
    }
}

pub fn css_color(c: &Color) -> String {
    let [r, g, b, _] = c.to_rgba8();
    format!("rgba({r}, {g}, {b}, {})", c.a)
}

/// Render a whole frame. `width`/`height` are the canvas pixel size.
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    width: f64,
    height: f64,
    background: &str,
    theme: &CanvasTheme,
    images: &mut ImageCache,
) {
    // Clear canvas
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.set_fill_style_str(background);
    ctx.fill_rect(0.0, 0.0, width, height);

    let vp = scene.viewport;
    let zoom = vp.zoom as f64;
    let _ = ctx.set_transform(zoom, 0.0, 0.0, zoom, vp.pan.x as f64, vp.pan.y as f64);

    for link in &scene.links {
        draw_link(ctx, link);
    }
    for node in &scene.nodes {
        draw_node(ctx, node, theme, images);
        if scene.chrome_visible {
            draw_controls(ctx, node, theme);
        }
    }

    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
}

// ─── Drawing primitives ─────────────────────────────────────────────────

fn draw_link(ctx: &CanvasRenderingContext2d, link: &LinkView) {
    let color = css_color(&link.style.color);
    ctx.save();
    ctx.set_stroke_style_str(&color);
    ctx.set_line_width(link.style.width as f64);
    ctx.begin_path();
    for el in link.route.path.elements() {
        match *el {
            PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
            PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathEl::ClosePath => ctx.close_path(),
        }
    }
    ctx.stroke();

    let a = link.route.arrow;
    ctx.set_fill_style_str(&color);
    ctx.begin_path();
    ctx.move_to(a.tip.x as f64, a.tip.y as f64);
    ctx.line_to(a.left.x as f64, a.left.y as f64);
    ctx.line_to(a.right.x as f64, a.right.y as f64);
    ctx.close_path();
    ctx.fill();
    ctx.restore();
}

fn draw_node(
    ctx: &CanvasRenderingContext2d,
    node: &NodeView,
    theme: &CanvasTheme,
    images: &mut ImageCache,
) {
    let b = node.bounds();
    let radius = NODE_CORNER_RADIUS as f64;
    ctx.save();

    rounded_rect_path(ctx, &b, radius);
    ctx.set_fill_style_str(theme.node_fill);
    ctx.fill();
    ctx.set_stroke_style_str(&css_color(&node.accent));
    ctx.set_line_width(NODE_BORDER_WIDTH as f64);
    if node.editing {
        let dash = js_dash(&[4.0, 3.0]);
        let _ = ctx.set_line_dash(&dash);
    }
    ctx.stroke();
    let _ = ctx.set_line_dash(&js_dash(&[]));

    // A missing or broken image leaves its slot empty
    if let (Some(url), Some(slot)) = (&node.image, node.layout.image) {
        if let Some(img) = images.get(url) {
            draw_image_contained(ctx, img, &slot);
        }
    }

    ctx.set_font(&format!("{FONT_SIZE}px {FONT_FAMILY}"));
    ctx.set_fill_style_str(theme.text);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let origin = node.layout.text_origin;
    for (i, line) in node.layout.lines.iter().enumerate() {
        let y = origin.y + i as f32 * LINE_HEIGHT + LINE_HEIGHT / 2.0;
        let _ = ctx.fill_text(line, origin.x as f64, y as f64);
    }

    ctx.restore();
}

/// Scale the image to fit `slot`, keeping its aspect ratio.
fn draw_image_contained(ctx: &CanvasRenderingContext2d, img: &HtmlImageElement, slot: &Bounds) {
    let (iw, ih) = (img.natural_width() as f64, img.natural_height() as f64);
    if iw <= 0.0 || ih <= 0.0 {
        return;
    }
    let (sw, sh) = (slot.width as f64, slot.height as f64);
    let scale = (sw / iw).min(sh / ih);
    let (dw, dh) = (iw * scale, ih * scale);
    let dx = slot.x as f64 + (sw - dw) / 2.0;
    let dy = slot.y as f64 + (sh - dh) / 2.0;
    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, dx, dy, dw, dh);
}

fn draw_controls(ctx: &CanvasRenderingContext2d, node: &NodeView, theme: &CanvasTheme) {
    let r = CONTROL_SIZE as f64 / 2.0;
    ctx.save();
    ctx.set_font(&format!("12px {FONT_FAMILY}"));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    for (control, b) in &node.controls {
        let (cx, cy) = b.center();
        let (cx, cy) = (cx as f64, cy as f64);
        let fill = match control {
            Control::Delete => theme.delete.to_string(),
            Control::ColorPicker => css_color(&node.accent),
            _ => theme.control.to_string(),
        };
        ctx.begin_path();
        let _ = ctx.arc(cx, cy, r, 0.0, std::f64::consts::TAU);
        ctx.set_fill_style_str(&fill);
        ctx.fill();

        let glyph = control.glyph();
        if !glyph.is_empty() {
            ctx.set_fill_style_str("#FFFFFF");
            let _ = ctx.fill_text(glyph, cx, cy);
        }
    }
    ctx.restore();
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, b: &Bounds, radius: f64) {
    let (x, y, w, h) = (b.x as f64, b.y as f64, b.width as f64, b.height as f64);
    let r = radius.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    let _ = ctx.arc_to(x + w, y, x + w, y + r, r);
    ctx.line_to(x + w, y + h - r);
    let _ = ctx.arc_to(x + w, y + h, x + w - r, y + h, r);
    ctx.line_to(x + r, y + h);
    let _ = ctx.arc_to(x, y + h, x, y + h - r, r);
    ctx.line_to(x, y + r);
    let _ = ctx.arc_to(x, y, x + r, y, r);
    ctx.close_path();
}

fn js_dash(segments: &[f64]) -> wasm_bindgen::JsValue {
    let array = js_sys::Array::new();
    for s in segments {
        array.push(&wasm_bindgen::JsValue::from_f64(*s));
    }
    array.into()
}
