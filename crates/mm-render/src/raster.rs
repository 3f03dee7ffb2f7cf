//! Native PNG export: scene → SVG → resvg pixmap → PNG bytes.

use crate::export::{ExportError, ExportFrame, ImageExporter, RasterImage};
use crate::svg::render_svg;

/// Rasterizes export frames with resvg. Remote images are not fetched;
/// only `data:` URLs and local files resolve.
pub struct PngRasterizer {
    options: usvg::Options<'static>,
}

impl PngRasterizer {
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        options.font_family = "Arial".to_string();
        Self { options }
    }

    pub fn render_pixmap(&self, frame: &ExportFrame) -> Result<tiny_skia::Pixmap, ExportError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(ExportError::EmptyFrame);
        }
        let svg = render_svg(&frame.scene, frame.width, frame.height, None);
        let tree = usvg::Tree::from_str(&svg, &self.options).map_err(|_| ExportError::SvgParse)?;

        let mut pixmap =
            tiny_skia::Pixmap::new(frame.width, frame.height).ok_or(ExportError::PixmapAlloc)?;
        let [r, g, b, a] = frame.background.to_rgba8();
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        Ok(pixmap)
    }
}

impl Default for PngRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageExporter for PngRasterizer {
    fn capture(&mut self, frame: &ExportFrame) -> Result<RasterImage, ExportError> {
        let pixmap = self.render_pixmap(frame)?;
        let png = pixmap.encode_png().map_err(|_| ExportError::PngEncode)?;
        log::debug!(
            "rasterized {}x{} frame ({} bytes)",
            frame.width,
            frame.height,
            png.len()
        );
        Ok(RasterImage {
            width: frame.width,
            height: frame.height,
            png,
        })
    }
}
