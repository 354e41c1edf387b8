/// StereoSketch Web - canvas front end compiled to WASM
///
/// The page owns the panels and the animation loop. It forwards pointer
/// events and form edits to [`WebRenderer`] and calls [`WebRenderer::frame`]
/// from `requestAnimationFrame` while it returns true.
use stereo_core::{
    Axis, CubeUpdate, GeometryId, GeometryUpdate, RenderOptions, RenderPass, SceneRenderer,
    SceneState, Surface, ViewController, Viewport,
};
use wasm_bindgen::prelude::*;

pub mod canvas;

pub use canvas::CanvasSurface;

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_axis(axis: &str) -> Result<Axis, JsValue> {
    Axis::from_letter(axis).ok_or_else(|| JsValue::from_str(&format!("unknown axis `{axis}`")))
}

#[wasm_bindgen]
pub struct WebRenderer {
    scene: SceneState,
    controller: ViewController,
    renderer: SceneRenderer,
    surface: CanvasSurface,
}

impl WebRenderer {
    fn viewport(&self) -> Viewport {
        let (width, height) = self.surface.size();
        Viewport::new(width as f64, height as f64)
    }
}

#[wasm_bindgen]
impl WebRenderer {
    /// Bind to the canvas element with id `canvas_id`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebRenderer, JsValue> {
        let surface = CanvasSurface::from_element_id(canvas_id)?;
        log::info!("bound renderer to #{canvas_id}");
        Ok(WebRenderer {
            scene: SceneState::new(),
            controller: ViewController::new(),
            renderer: SceneRenderer::new(RenderOptions::default()),
            surface,
        })
    }

    /// Draw one frame sized to the canvas element; true while more frames are wanted
    pub fn frame(&mut self) -> bool {
        let container = self.surface.client_size();
        let stats = self.renderer.render(
            &self.scene,
            self.controller.selection(),
            &mut self.surface,
            Some(container),
            RenderPass::Live,
        );
        stats.schedule_next
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.controller.pointer_down(&self.scene, x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.controller.pointer_move(&mut self.scene, x, y);
    }

    /// True when a region selection was committed
    pub fn pointer_up(&mut self) -> bool {
        let viewport = self.viewport();
        self.controller.pointer_up(&mut self.scene, viewport)
    }

    pub fn pointer_leave(&mut self) {
        self.controller.pointer_leave();
    }

    pub fn is_rotating(&self) -> bool {
        self.controller.is_rotating()
    }

    pub fn status(&self) -> String {
        self.scene.view().status()
    }

    pub fn selection_mode(&self) -> bool {
        self.scene.selection_mode()
    }

    pub fn toggle_selection_mode(&mut self) {
        self.scene.toggle_selection_mode();
    }

    pub fn reset_view(&mut self) {
        self.scene.reset_view();
    }

    pub fn dark_mode(&self) -> bool {
        self.scene.dark_mode()
    }

    pub fn toggle_theme(&mut self) {
        self.scene.toggle_theme();
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.scene.grid_mut().show_grid = show;
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.scene.set_snap_to_grid(snap);
    }

    /// Interval slider position, 0 for 5° up to 10 for 45°
    pub fn grid_slider(&self) -> usize {
        self.scene.grid().slider_index()
    }

    pub fn set_grid_slider(&mut self, index: usize) {
        self.scene.grid_mut().set_slider_index(index);
    }

    pub fn grid_angle(&self) -> u32 {
        self.scene.grid().grid_angle()
    }

    pub fn set_render_detail(&mut self, detail: f64) {
        self.scene.grid_mut().set_render_detail(detail);
    }

    pub fn camera_degrees(&self, axis: &str) -> Result<f64, JsValue> {
        Ok(self.scene.camera().axis_degrees(parse_axis(axis)?))
    }

    pub fn set_camera_degrees(&mut self, axis: &str, degrees: f64) -> Result<(), JsValue> {
        self.scene.set_camera_degrees(parse_axis(axis)?, degrees);
        Ok(())
    }

    pub fn add_cube(&mut self) -> u32 {
        self.scene.add_cube().0
    }

    pub fn remove_geometry(&mut self, id: u32) -> bool {
        self.scene.remove_geometry(GeometryId(id))
    }

    pub fn geometry_ids(&self) -> Vec<u32> {
        self.scene.geometries().iter().map(|g| g.id().0).collect()
    }

    pub fn geometry_name(&self, id: u32) -> Option<String> {
        self.scene
            .geometry(GeometryId(id))
            .map(|g| g.name().to_string())
    }

    /// Apply a form edit such as `("size.x", "2.5")` or `("color", "#22d3ee")`
    pub fn update_geometry(&mut self, id: u32, field: &str, value: &str) -> Result<(), JsValue> {
        let update = CubeUpdate::parse(field, value).map_err(|e| {
            log::warn!("rejected edit {field}={value}: {e}");
            to_js(e)
        })?;
        self.scene
            .update_geometry(GeometryId(id), GeometryUpdate::Cube(update))
            .map_err(to_js)
    }

    /// Transparent PNG of the current view as a data URL; `None` without a canvas
    pub fn export_png(&mut self) -> Option<String> {
        match self.renderer.export(&self.scene, &mut self.surface) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("export skipped: {e}");
                None
            }
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(to_js)?;
    Ok(())
}
