//! Editor configuration.
//!
//! Every field has a default matching the stock editor; hosts override a
//! subset by deserializing a partial JSON object.

use crate::geometry::Size;
use crate::model::Color;
use serde::{Deserialize, Serialize};

/// Placeholder label for freshly created nodes.
pub const PLACEHOLDER_TEXT: &str = "Nuovo Argomento";

/// Label of the node created when the editor boots.
pub const ROOT_TEXT: &str = "Argomento Principale";

/// Name of the downloaded export.
pub const EXPORT_FILENAME: &str = "mapa-concettuale.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Distance between a parent and a spawned neighbor, in canvas pixels.
    pub spacing: f32,
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Fit-to-screen never zooms in past this factor.
    pub fit_max_zoom: f32,
    /// Margin kept around the content on each side by fit-to-screen.
    pub fit_padding: f32,
    /// Accent used for nodes that were never recolored.
    pub default_accent: Color,
    pub link_width: f32,
    pub export_background: Color,
    pub export_filename: String,
    pub placeholder_text: String,
    pub root_text: String,
    /// Size of the canvas container that drags are clamped to.
    /// `None` means the container fills the window.
    pub canvas: Option<Size>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            spacing: 200.0,
            zoom_step: 0.1,
            min_zoom: 0.3,
            max_zoom: 2.0,
            fit_max_zoom: 1.5,
            fit_padding: 100.0,
            default_accent: Color::DEFAULT_ACCENT,
            link_width: 2.0,
            export_background: Color::EXPORT_BACKGROUND,
            export_filename: EXPORT_FILENAME.to_string(),
            placeholder_text: PLACEHOLDER_TEXT.to_string(),
            root_text: ROOT_TEXT.to_string(),
            canvas: None,
        }
    }
}
