/// Shared editor state read by the renderer each frame.
///
/// Fields are private. The view controller, property edits and toggles go
/// through the methods below; the renderer only ever sees `&SceneState`.
use crate::edit::{EditError, GeometryUpdate};
use crate::geometry::{CubeGeometry, GeometryId, GeometryItem};
use crate::projection::Viewport;
use crate::theme::Theme;
use crate::transform::{Axis, CameraOrientation};
use crate::view::{SelectionRect, ViewTransform};

/// Grid intervals offered by the interval slider, all divisors of 360
pub const GRID_ANGLES: [u32; 11] = [5, 6, 9, 10, 12, 15, 18, 20, 30, 36, 45];

pub const MIN_RENDER_DETAIL: f64 = 1.0;
pub const MAX_RENDER_DETAIL: f64 = 1000.0;

/// Reference grid and sampling density settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub show_grid: bool,
    grid_angle: u32,
    render_detail: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            grid_angle: 15,
            render_detail: 50.0,
        }
    }
}

impl GridSettings {
    pub fn grid_angle(&self) -> u32 {
        self.grid_angle
    }

    /// Set the interval, snapping to the nearest allowed angle
    pub fn set_grid_angle(&mut self, degrees: f64) {
        let nearest = GRID_ANGLES
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = (*a as f64 - degrees).abs();
                let db = (*b as f64 - degrees).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(15);
        self.grid_angle = nearest;
    }

    /// Position of the current angle on the interval slider
    pub fn slider_index(&self) -> usize {
        GRID_ANGLES
            .iter()
            .position(|&a| a == self.grid_angle)
            .unwrap_or(0)
    }

    pub fn set_slider_index(&mut self, index: usize) {
        self.grid_angle = GRID_ANGLES[index.min(GRID_ANGLES.len() - 1)];
    }

    pub fn render_detail(&self) -> f64 {
        self.render_detail
    }

    pub fn set_render_detail(&mut self, detail: f64) {
        let detail = if detail.is_finite() {
            detail
        } else {
            MIN_RENDER_DETAIL
        };
        self.render_detail = detail.clamp(MIN_RENDER_DETAIL, MAX_RENDER_DETAIL);
    }
}

/// Everything one frame needs to draw the scene
#[derive(Debug, Clone)]
pub struct SceneState {
    camera: CameraOrientation,
    grid: GridSettings,
    snap_to_grid: bool,
    geometries: Vec<GeometryItem>,
    view: ViewTransform,
    selection_mode: bool,
    dark_mode: bool,
    next_id: u32,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            camera: CameraOrientation::identity(),
            grid: GridSettings::default(),
            snap_to_grid: true,
            geometries: Vec::new(),
            view: ViewTransform::default(),
            selection_mode: false,
            dark_mode: true,
            next_id: 1,
        }
    }

    pub fn camera(&self) -> CameraOrientation {
        self.camera
    }

    pub fn grid(&self) -> GridSettings {
        self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridSettings {
        &mut self.grid
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn geometries(&self) -> &[GeometryItem] {
        &self.geometries
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&GeometryItem> {
        self.geometries.iter().find(|g| g.id() == id)
    }

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn theme(&self) -> Theme {
        Theme::for_mode(self.dark_mode)
    }

    pub fn set_selection_mode(&mut self, on: bool) {
        self.selection_mode = on;
    }

    pub fn toggle_selection_mode(&mut self) {
        self.selection_mode = !self.selection_mode;
    }

    pub fn set_snap_to_grid(&mut self, on: bool) {
        self.snap_to_grid = on;
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
    }

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Direct angle input, honoring snap-to-grid
    pub fn set_camera_degrees(&mut self, axis: Axis, degrees: f64) {
        self.camera.set_axis_degrees(axis, degrees, self.snap_to_grid);
    }

    pub fn set_camera(&mut self, camera: CameraOrientation) {
        self.camera = camera;
    }

    pub(crate) fn drag_camera(&mut self, dx: f64, dy: f64, sensitivity: f64) {
        self.camera.drag(dx, dy, sensitivity);
    }

    /// Zoom into `rect`; leaves selection mode when the region is accepted
    pub(crate) fn commit_region(&mut self, rect: &SelectionRect, viewport: Viewport) -> bool {
        let committed = self.view.zoom_to_region(rect, viewport);
        if committed {
            self.selection_mode = false;
        }
        committed
    }

    /// Back to the full sphere view
    pub fn reset_view(&mut self) {
        self.view.reset();
        self.selection_mode = false;
    }

    /// Append a default cube named after its position in the cube count
    pub fn add_cube(&mut self) -> GeometryId {
        let id = GeometryId(self.next_id);
        self.next_id += 1;

        let count = self
            .geometries
            .iter()
            .filter(|g| matches!(g, GeometryItem::Cube(_)))
            .count();
        let cube = CubeGeometry::new(
            id,
            format!("Cube {}", count + 1),
            self.theme().geometry_default,
        );
        self.geometries.push(GeometryItem::Cube(cube));
        log::debug!("added cube {id}");
        id
    }

    pub fn remove_geometry(&mut self, id: GeometryId) -> bool {
        let before = self.geometries.len();
        self.geometries.retain(|g| g.id() != id);
        self.geometries.len() != before
    }

    pub fn update_geometry(
        &mut self,
        id: GeometryId,
        update: GeometryUpdate,
    ) -> Result<(), EditError> {
        let Some(item) = self.geometries.iter_mut().find(|g| g.id() == id) else {
            log::warn!("edit for unknown geometry {id} ignored");
            return Err(EditError::UnknownGeometry(id));
        };
        update.apply(item);
        Ok(())
    }

    /// Copy of the scene for a surface `ratio` times denser than the live view
    pub fn scaled_for_export(&self, ratio: f64) -> SceneState {
        let mut scene = self.clone();
        scene.view = self.view.scaled(ratio);
        scene
    }
}
