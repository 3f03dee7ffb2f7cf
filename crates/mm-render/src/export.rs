//! Image export contract.
//!
//! The editor hands an `ExportFrame` (scene at identity transform with the
//! chrome hidden) to an `ImageExporter` backend and wraps the PNG it gets
//! back into a `Download`.

use crate::scene::Scene;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use mm_core::Color;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    AlreadyInFlight,
    #[error("export frame has zero area")]
    EmptyFrame,
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    /// Backend-specific capture failure (e.g. a tainted browser canvas).
    #[error("capture failed: {0}")]
    Capture(String),
}

/// What gets rasterized: the full canvas area at 1:1.
#[derive(Debug, Clone)]
pub struct ExportFrame {
    pub scene: Scene,
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

/// Encoded PNG plus its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Rasterization backend.
pub trait ImageExporter {
    fn capture(&mut self, frame: &ExportFrame) -> Result<RasterImage, ExportError>;
}

/// A finished export ready to be saved by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub data_url: String,
}

impl Download {
    pub fn png(filename: &str, bytes: &[u8]) -> Self {
        Self {
            filename: filename.to_string(),
            data_url: format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(bytes)),
        }
    }

    /// Decode a `data:image/png;base64,` URL back into bytes.
    pub fn decode_png_data_url(url: &str) -> Option<Vec<u8>> {
        let payload = url.strip_prefix(PNG_DATA_URL_PREFIX)?;
        STANDARD.decode(payload.as_bytes()).ok()
    }
}
