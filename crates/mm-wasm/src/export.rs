//! Browser export backend: paint the frame on an offscreen canvas and read
//! it back as PNG.

use crate::render2d::{CanvasTheme, ImageCache, css_color, render_scene};
use mm_render::{Download, ExportError, ExportFrame, ImageExporter, RasterImage};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement};

/// Captures through a detached `<canvas>`. Images come from the shared
/// cache; a cross-origin image without CORS headers taints the canvas and
/// the read-back fails with `ExportError::Capture`.
pub struct CanvasExporter<'a> {
    pub images: &'a mut ImageCache,
}

impl ImageExporter for CanvasExporter<'_> {
    fn capture(&mut self, frame: &ExportFrame) -> Result<RasterImage, ExportError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(ExportError::EmptyFrame);
        }
        let canvas = create_canvas(frame.width, frame.height).map_err(capture_error)?;
        let ctx = canvas
            .get_context("2d")
            .map_err(capture_error)?
            .ok_or_else(|| ExportError::Capture("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(capture_error)?;

        render_scene(
            &ctx,
            &frame.scene,
            frame.width as f64,
            frame.height as f64,
            &css_color(&frame.background),
            &CanvasTheme::light(),
            self.images,
        );

        let url = canvas.to_data_url().map_err(capture_error)?;
        let png = Download::decode_png_data_url(&url).ok_or(ExportError::PngEncode)?;
        Ok(RasterImage {
            width: frame.width,
            height: frame.height,
            png,
        })
    }
}

pub(crate) fn create_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement, wasm_bindgen::JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

fn capture_error<T: std::fmt::Debug>(err: T) -> ExportError {
    ExportError::Capture(format!("{err:?}"))
}

/// Save a finished export through a temporary `<a download>` click.
pub fn trigger_download(download: &Download) -> Result<(), wasm_bindgen::JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;
    let link = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()?;
    link.set_href(&download.data_url);
    link.set_download(&download.filename);
    link.click();
    Ok(())
}
