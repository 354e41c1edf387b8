/// Stereographic projection from the unit sphere onto the screen
use nalgebra::{Point2, UnitQuaternion, Vector3};

use crate::transform::CameraOrientation;
use crate::view::ViewTransform;

/// Points with a normalized `y` below this lie in the neighborhood of the
/// projection pole and map to infinity.
pub const POLE_LIMIT: f64 = -0.999;

/// Vectors shorter than this collapse to the viewport center.
const DEGENERATE_LENGTH: f64 = 1e-5;

/// Pixel dimensions of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Radius of the unit circle at zoom 1
    pub fn base_scale(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }
}

/// A sample projected to screen space.
///
/// `u`/`v` are the raw stereographic coordinates, `x`/`y` are device pixels.
/// When `visible` is false the coordinates carry no meaning and the point
/// must break any path it sits in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
    pub visible: bool,
}

impl ProjectedPoint {
    pub fn hidden() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            u: 0.0,
            v: 0.0,
            visible: false,
        }
    }

    pub fn screen(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn screen_distance(&self, other: &ProjectedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Projection parameters frozen for one frame
#[derive(Debug, Clone)]
pub struct Projector {
    inverse: UnitQuaternion<f64>,
    viewport: Viewport,
    view: ViewTransform,
    scale: f64,
}

impl Projector {
    pub fn new(camera: &CameraOrientation, viewport: Viewport, view: ViewTransform) -> Self {
        Self {
            inverse: camera.inverse_rotation(),
            scale: viewport.base_scale() * view.zoom,
            viewport,
            view,
        }
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Screen radius of the projected equator (`u² + v² = 1`)
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen position of the projection origin, pan included
    pub fn center(&self) -> (f64, f64) {
        let (cx, cy) = self.viewport.center();
        (cx + self.view.offset_x, cy + self.view.offset_y)
    }

    /// Screen distance that counts as a wrap-around jump, scaled by zoom
    pub fn jump_threshold(&self) -> f64 {
        self.viewport.width * self.view.zoom
    }

    /// Project a world-space point
    pub fn project(&self, point: &Vector3<f64>) -> ProjectedPoint {
        let p = self.inverse * point;

        let r = p.norm();
        if r < DEGENERATE_LENGTH {
            let (x, y) = self.viewport.center();
            return ProjectedPoint {
                x,
                y,
                u: 0.0,
                v: 0.0,
                visible: true,
            };
        }

        let n = p / r;
        if n.y < POLE_LIMIT {
            return ProjectedPoint::hidden();
        }

        let denom = 1.0 + n.y;
        let u = n.x / denom;
        let v = n.z / denom;

        let (cx, cy) = self.center();
        ProjectedPoint {
            x: cx + u * self.scale,
            y: cy - v * self.scale,
            u,
            v,
            visible: true,
        }
    }

    /// Screen point that all lines parallel to `direction` converge to
    pub fn vanishing_point(&self, direction: &Vector3<f64>) -> ProjectedPoint {
        match direction.try_normalize(0.0) {
            Some(unit) => self.project(&unit),
            None => self.project(&Vector3::zeros()),
        }
    }
}

/// Project a single point without keeping a [`Projector`] around
pub fn project(
    point: &Vector3<f64>,
    camera: &CameraOrientation,
    viewport: Viewport,
    view: ViewTransform,
) -> ProjectedPoint {
    Projector::new(camera, viewport, view).project(point)
}
