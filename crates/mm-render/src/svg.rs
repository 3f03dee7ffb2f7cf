//! Scene → SVG text. Feeds the raster exporter and can be saved as-is.

use crate::chrome::{CONTROL_SIZE, Control};
use crate::scene::{NodeView, Scene};
use mm_core::Color;
use mm_core::layout::{FONT_SIZE, LINE_HEIGHT};
use std::fmt::Write as _;

pub const NODE_CORNER_RADIUS: f32 = 8.0;
pub const NODE_BORDER_WIDTH: f32 = 2.0;
pub const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";

/// CSS color string for an SVG attribute.
pub fn svg_color(c: &Color) -> String {
    let [r, g, b, _] = c.to_rgba8();
    if (c.a - 1.0).abs() < f32::EPSILON {
        format!("#{r:02X}{g:02X}{b:02X}")
    } else {
        format!("rgba({r}, {g}, {b}, {})", c.a)
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render `scene` into a `width` × `height` SVG document, optionally on a
/// solid background.
pub fn render_svg(scene: &Scene, width: u32, height: u32, background: Option<Color>) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    if let Some(bg) = background {
        let _ = writeln!(
            svg,
            "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"{}\" />",
            svg_color(&bg)
        );
    }

    let vp = scene.viewport;
    let _ = writeln!(
        svg,
        "<g transform=\"translate({}, {}) scale({})\" font-family=\"{FONT_FAMILY}\">",
        vp.pan.x, vp.pan.y, vp.zoom
    );

    // Links under nodes, like the connector layer of the live page
    for link in &scene.links {
        let stroke = svg_color(&link.style.color);
        let _ = writeln!(
            svg,
            "  <path d=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{}\" />",
            link.route.svg_path(),
            link.style.width
        );
        let a = link.route.arrow;
        let _ = writeln!(
            svg,
            "  <polygon points=\"{},{} {},{} {},{}\" fill=\"{stroke}\" />",
            a.tip.x, a.tip.y, a.left.x, a.left.y, a.right.x, a.right.y
        );
    }

    for node in &scene.nodes {
        render_node_svg(&mut svg, node);
        if scene.chrome_visible {
            render_chrome_svg(&mut svg, node);
        }
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

fn render_node_svg(out: &mut String, node: &NodeView) {
    let b = node.bounds();
    let dash = if node.editing {
        " stroke-dasharray=\"4 3\""
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{NODE_CORNER_RADIUS}\" ry=\"{NODE_CORNER_RADIUS}\" fill=\"#FFFFFF\" stroke=\"{}\" stroke-width=\"{NODE_BORDER_WIDTH}\"{dash} />",
        b.x,
        b.y,
        b.width,
        b.height,
        svg_color(&node.accent)
    );

    if let (Some(url), Some(slot)) = (&node.image, node.layout.image) {
        let _ = writeln!(
            out,
            "  <image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\" xlink:href=\"{}\" />",
            slot.x,
            slot.y,
            slot.width,
            slot.height,
            escape_xml(url)
        );
    }

    let origin = node.layout.text_origin;
    for (i, line) in node.layout.lines.iter().enumerate() {
        let baseline = origin.y + i as f32 * LINE_HEIGHT + LINE_HEIGHT * 0.75;
        let _ = writeln!(
            out,
            "  <text x=\"{}\" y=\"{baseline}\" font-size=\"{FONT_SIZE}\" fill=\"#333333\" text-anchor=\"middle\">{}</text>",
            origin.x,
            escape_xml(line)
        );
    }
}

fn render_chrome_svg(out: &mut String, node: &NodeView) {
    let r = CONTROL_SIZE / 2.0;
    for (control, b) in &node.controls {
        let (cx, cy) = b.center();
        let fill = match control {
            Control::Delete => "#DC3545".to_string(),
            Control::ColorPicker => svg_color(&node.accent),
            _ => "#6C757D".to_string(),
        };
        let _ = writeln!(
            out,
            "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{fill}\" />"
        );
        let glyph = control.glyph();
        if !glyph.is_empty() {
            let _ = writeln!(
                out,
                "  <text x=\"{cx}\" y=\"{}\" font-size=\"12\" fill=\"#FFFFFF\" text-anchor=\"middle\">{}</text>",
                cy + 4.0,
                escape_xml(glyph)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::FlowchartRouter;
    use crate::scene::{ProjectOptions, project};
    use mm_core::{LinkStyle, MindMap, Point};

    fn sample_scene(chrome_visible: bool) -> Scene {
        let mut map = MindMap::new();
        let a = map.create_node(Point::new(10.0, 10.0), "Tom & <Jerry>");
        let b = map.create_node(Point::new(210.0, 10.0), "b");
        map.set_image(b, Some("https://example.com/x.png?a=1&b=2".into()))
            .unwrap();
        map.connect(
            a,
            b,
            LinkStyle {
                color: Color::from_hex("#FF0000").unwrap(),
                width: 2.0,
            },
        )
        .unwrap();
        let opts = ProjectOptions {
            chrome_visible,
            ..Default::default()
        };
        project(&map, &FlowchartRouter::default(), &opts)
    }

    #[test]
    fn svg_contains_nodes_links_and_escaped_text() {
        let svg = render_svg(&sample_scene(false), 800, 600, Some(Color::EXPORT_BACKGROUND));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("fill=\"#F0F2F5\""));
        assert!(svg.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(svg.contains("stroke=\"#FF0000\""));
        assert!(svg.contains("x.png?a=1&amp;b=2"));
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn chrome_is_drawn_when_visible() {
        let svg = render_svg(&sample_scene(true), 800, 600, None);
        assert_eq!(svg.matches("<circle").count(), 2 * Control::ALL.len());
    }
}
