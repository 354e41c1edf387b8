/// StereoSketch Core Library - Shared projection, scene and rendering logic
///
/// This library provides the platform-independent core of the stereographic
/// sketching tool: camera orientation, the stereographic projector, polyline
/// sampling and splitting, scene state with property edits, and a renderer
/// that draws onto any `Surface` back end.

pub mod color;
pub mod edit;
pub mod geometry;
pub mod projection;
pub mod render;
pub mod sampler;
pub mod splitter;
pub mod state;
pub mod surface;
pub mod theme;
pub mod transform;
pub mod view;

// Re-export commonly used types
pub use color::{Color, ColorError};
pub use edit::{CubeUpdate, EditError, GeometryUpdate};
pub use geometry::{CubeGeometry, GeometryId, GeometryItem};
pub use projection::{ProjectedPoint, Projector, Viewport};
pub use render::{FrameStats, RenderOptions, RenderPass, SceneRenderer};
pub use state::{GridSettings, SceneState};
pub use surface::{
    circle_path, for_each_dash, ExportError, ExportSurface, ScreenPoint, StrokeStyle, Surface,
    TextAlign, TextStyle,
};
pub use theme::Theme;
pub use transform::{Axis, CameraOrientation, EulerAngles};
pub use view::{SelectionRect, ViewController, ViewTransform};
