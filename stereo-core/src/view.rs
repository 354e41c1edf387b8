/// View transform and the pointer-driven view controller.
///
/// The controller is a small state machine: a press either starts a camera
/// drag or, in selection mode, a rubber-band region that is committed as a
/// new zoom and pan when the pointer is released.
use crate::projection::Viewport;
use crate::state::SceneState;

/// Rotation applied per dragged pixel, in radians
pub const DRAG_SENSITIVITY: f64 = 0.005;

/// Smallest selection (in both dimensions) accepted as a region commit
pub const MIN_SELECTION_PIXELS: f64 = 10.0;

/// Zoom above which the view counts as a region of interest
const REGION_ACTIVE_ZOOM: f64 = 1.1;

/// Screen-space zoom and pan applied after projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewTransform {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Sampling density multiplier, grows with zoom and is capped at 10
    pub fn adaptive_factor(&self) -> f64 {
        self.zoom.sqrt().min(10.0)
    }

    pub fn is_region_active(&self) -> bool {
        self.zoom > REGION_ACTIVE_ZOOM
    }

    /// Short status line describing the current view
    pub fn status(&self) -> String {
        if self.is_region_active() {
            format!("ROI Active ({:.1}x)", self.zoom)
        } else {
            "Full Sphere View".to_string()
        }
    }

    /// Same view expressed for a surface `ratio` times denser in pixels
    pub fn scaled(&self, ratio: f64) -> Self {
        Self {
            zoom: self.zoom,
            offset_x: self.offset_x * ratio,
            offset_y: self.offset_y * ratio,
        }
    }

    /// Zoom and pan so that `rect` fills the viewport.
    ///
    /// Returns false and leaves the transform untouched when the rectangle
    /// is smaller than [`MIN_SELECTION_PIXELS`] in either dimension.
    pub fn zoom_to_region(&mut self, rect: &SelectionRect, viewport: Viewport) -> bool {
        let (width, height) = (rect.width(), rect.height());
        if width < MIN_SELECTION_PIXELS || height < MIN_SELECTION_PIXELS {
            return false;
        }

        let multiplier = (viewport.width / width).min(viewport.height / height);
        let (center_x, center_y) = viewport.center();
        let (sel_x, sel_y) = rect.center();
        let rel_x = sel_x - center_x - self.offset_x;
        let rel_y = sel_y - center_y - self.offset_y;

        self.zoom *= multiplier;
        self.offset_x = -rel_x * multiplier;
        self.offset_y = -rel_y * multiplier;
        true
    }
}

/// Rubber-band rectangle between the press point and the current pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl SelectionRect {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            start: (x, y),
            end: (x, y),
        }
    }

    pub fn left(&self) -> f64 {
        self.start.0.min(self.end.0)
    }

    pub fn top(&self) -> f64 {
        self.start.1.min(self.end.1)
    }

    pub fn width(&self) -> f64 {
        (self.start.0 - self.end.0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.start.1 - self.end.1).abs()
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.left() + self.width() / 2.0,
            self.top() + self.height() / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerState {
    Idle,
    Rotating { last_x: f64, last_y: f64 },
    RegionSelecting(SelectionRect),
}

/// Translates pointer input into camera drags or region commits
#[derive(Debug, Clone)]
pub struct ViewController {
    state: ControllerState,
    sensitivity: f64,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self::with_sensitivity(DRAG_SENSITIVITY)
    }

    pub fn with_sensitivity(sensitivity: f64) -> Self {
        Self {
            state: ControllerState::Idle,
            sensitivity,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self.state, ControllerState::Rotating { .. })
    }

    /// Selection in progress, for the renderer's overlay
    pub fn selection(&self) -> Option<&SelectionRect> {
        match &self.state {
            ControllerState::RegionSelecting(rect) => Some(rect),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, scene: &SceneState, x: f64, y: f64) {
        if self.state != ControllerState::Idle {
            return;
        }
        self.state = if scene.selection_mode() {
            ControllerState::RegionSelecting(SelectionRect::at(x, y))
        } else {
            ControllerState::Rotating {
                last_x: x,
                last_y: y,
            }
        };
        log::debug!("pointer down at ({x:.1}, {y:.1}) -> {:?}", self.state);
    }

    pub fn pointer_move(&mut self, scene: &mut SceneState, x: f64, y: f64) {
        match &mut self.state {
            ControllerState::Idle => {}
            ControllerState::Rotating { last_x, last_y } => {
                let (dx, dy) = (x - *last_x, y - *last_y);
                *last_x = x;
                *last_y = y;
                scene.drag_camera(dx, dy, self.sensitivity);
            }
            ControllerState::RegionSelecting(rect) => {
                rect.end = (x, y);
            }
        }
    }

    /// Release the pointer; commits a pending region selection.
    ///
    /// Returns true when the view transform changed.
    pub fn pointer_up(&mut self, scene: &mut SceneState, viewport: Viewport) -> bool {
        let state = std::mem::replace(&mut self.state, ControllerState::Idle);
        match state {
            ControllerState::RegionSelecting(rect) => {
                let committed = scene.commit_region(&rect, viewport);
                if committed {
                    log::debug!("region committed, view now {:?}", scene.view());
                } else {
                    log::debug!(
                        "discarded {:.0}x{:.0} selection",
                        rect.width(),
                        rect.height()
                    );
                }
                committed
            }
            _ => false,
        }
    }

    /// Pointer left the canvas: abandon whatever was in progress
    pub fn pointer_leave(&mut self) {
        self.state = ControllerState::Idle;
    }
}
