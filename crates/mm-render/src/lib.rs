pub mod chrome;
pub mod export;
pub mod hit;
#[cfg(feature = "raster")]
pub mod raster;
pub mod route;
pub mod scene;
pub mod svg;

pub use chrome::Control;
pub use export::{Download, ExportError, ExportFrame, ImageExporter, RasterImage};
pub use hit::{Hit, hit_test};
#[cfg(feature = "raster")]
pub use raster::PngRasterizer;
pub use route::{Anchor, ConnectionRouter, FlowchartRouter, Route, StraightRouter};
pub use scene::{LinkView, NodeView, ProjectOptions, Scene, project};
