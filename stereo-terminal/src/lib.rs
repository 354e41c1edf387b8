/// Terminal front end for stereographic sketching
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stereo_core::{
    Axis, CubeUpdate, GeometryId, GeometryUpdate, RenderOptions, RenderPass, SceneRenderer,
    SceneState, Surface, ViewController, Viewport,
};

pub mod cells;
pub mod config;
pub mod raster;

pub use cells::{CellSurface, PIXELS_PER_ROW};
pub use config::{AppConfig, Args};
pub use raster::PixelSurface;

/// Degrees per arrow-key camera step
const KEY_ROTATION_STEP: f64 = 5.0;
/// Render-detail change per `+`/`-` press
const DETAIL_STEP: f64 = 5.0;

const HELP: &str = "drag=rotate s=select r=reset g=grid [ ]=interval +/-=detail \
n=snap a=add x=del tab=next e/f=guides t=theme p=png q=quit";

/// Center of a terminal cell in virtual pixels
pub fn cell_to_pixel(column: u16, row: u16) -> (f64, f64) {
    (
        column as f64 + 0.5,
        row as f64 * PIXELS_PER_ROW as f64 + PIXELS_PER_ROW as f64 / 2.0,
    )
}

/// Main application struct for the terminal sketcher
pub struct TerminalApp {
    scene: SceneState,
    controller: ViewController,
    renderer: SceneRenderer,
    surface: CellSurface,
    config: AppConfig,
    selected: Option<GeometryId>,
    message: String,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: AppConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(config, width, height))
    }

    /// App for a terminal of `columns` by `rows` cells
    pub fn with_size(config: AppConfig, columns: u16, rows: u16) -> Self {
        let scene = config.build_scene();
        let selected = scene.geometries().first().map(|g| g.id());
        Self {
            scene,
            controller: ViewController::with_sensitivity(config.sensitivity),
            renderer: SceneRenderer::new(RenderOptions::default()),
            surface: CellSurface::new(columns as usize, rows as usize),
            config,
            selected,
            message: String::new(),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn selected(&self) -> Option<GeometryId> {
        self.selected
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableFocusChange
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableFocusChange,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::FocusLost => self.controller.pointer_leave(),
            _ => {}
        }
    }

    fn viewport(&self) -> Viewport {
        let (width, height) = self.surface.size();
        Viewport::new(width as f64, height as f64)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = cell_to_pixel(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.controller.pointer_down(&self.scene, x, y);
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                self.controller.pointer_move(&mut self.scene, x, y);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let viewport = self.viewport();
                if self.controller.pointer_up(&mut self.scene, viewport) {
                    self.message = self.scene.view().status();
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('s') => {
                self.scene.toggle_selection_mode();
                self.message = if self.scene.selection_mode() {
                    "Drag a rectangle to zoom".to_string()
                } else {
                    String::new()
                };
            }
            KeyCode::Char('r') => {
                self.scene.reset_view();
                self.message = self.scene.view().status();
            }
            KeyCode::Char('g') => {
                let grid = self.scene.grid_mut();
                grid.show_grid = !grid.show_grid;
            }
            KeyCode::Char('[') | KeyCode::Char(']') => {
                let grid = self.scene.grid_mut();
                let index = grid.slider_index();
                let index = if key.code == KeyCode::Char('[') {
                    index.saturating_sub(1)
                } else {
                    index + 1
                };
                grid.set_slider_index(index);
            }
            KeyCode::Char('n') => {
                let snap = !self.scene.snap_to_grid();
                self.scene.set_snap_to_grid(snap);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_detail(DETAIL_STEP),
            KeyCode::Char('-') => self.step_detail(-DETAIL_STEP),
            KeyCode::Char('a') => {
                let id = self.scene.add_cube();
                self.selected = Some(id);
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.selected.take() {
                    self.scene.remove_geometry(id);
                    self.selected = self.scene.geometries().last().map(|g| g.id());
                }
            }
            KeyCode::Tab => self.select_next(),
            KeyCode::Char('e') => self.toggle_guides(false),
            KeyCode::Char('f') => self.toggle_guides(true),
            KeyCode::Char('t') => self.scene.toggle_theme(),
            KeyCode::Char('p') => self.export(),
            KeyCode::Left => self.step_camera(Axis::Z, -KEY_ROTATION_STEP),
            KeyCode::Right => self.step_camera(Axis::Z, KEY_ROTATION_STEP),
            KeyCode::Up => self.step_camera(Axis::X, KEY_ROTATION_STEP),
            KeyCode::Down => self.step_camera(Axis::X, -KEY_ROTATION_STEP),
            KeyCode::Char(',') => self.step_camera(Axis::Y, -KEY_ROTATION_STEP),
            KeyCode::Char('.') => self.step_camera(Axis::Y, KEY_ROTATION_STEP),
            _ => {}
        }
    }

    fn step_detail(&mut self, delta: f64) {
        let grid = self.scene.grid_mut();
        let detail = grid.render_detail();
        grid.set_render_detail(detail + delta);
    }

    fn step_camera(&mut self, axis: Axis, delta: f64) {
        let degrees = self.scene.camera().axis_degrees(axis);
        self.scene.set_camera_degrees(axis, degrees + delta);
    }

    fn select_next(&mut self) {
        let ids: Vec<GeometryId> = self.scene.geometries().iter().map(|g| g.id()).collect();
        self.selected = match self.selected.and_then(|id| ids.iter().position(|&i| i == id)) {
            Some(index) => ids.get((index + 1) % ids.len()).copied(),
            None => ids.first().copied(),
        };
    }

    fn toggle_guides(&mut self, full: bool) {
        let Some(id) = self.selected else {
            return;
        };
        let Some(cube) = self.scene.geometry(id).and_then(|g| g.as_cube()) else {
            return;
        };
        let update = if full {
            CubeUpdate::FullGuide(!cube.show_full_guide)
        } else {
            CubeUpdate::EdgeGuides(!cube.show_edge_guides)
        };
        if let Err(e) = self.scene.update_geometry(id, GeometryUpdate::Cube(update)) {
            self.message = e.to_string();
        }
    }

    fn export(&mut self) {
        let size = self.surface.size();
        let path = self.config.export_path.clone();
        match raster::write_png(
            &self.renderer,
            &self.scene,
            size,
            self.config.pixel_ratio,
            &path,
        ) {
            Ok(()) => self.message = format!("Saved {}", path.display()),
            Err(e) => {
                log::error!("export failed: {e:#}");
                self.message = format!("Export failed: {e}");
            }
        }
    }

    /// Top line: view, grid settings, selected cube and mode flags
    fn status_line(&self) -> String {
        let grid = self.scene.grid();
        let selected = self
            .selected
            .and_then(|id| self.scene.geometry(id))
            .map(|g| g.name().to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "StereoSketch | {} | grid {}° detail {:.0}{} | {}{} | FPS: {:.1} {}",
            self.scene.view().status(),
            grid.grid_angle(),
            grid.render_detail(),
            if self.scene.snap_to_grid() { " snap" } else { "" },
            selected,
            if self.scene.selection_mode() { " | SELECT" } else { "" },
            self.fps,
            self.message
        )
    }

    fn render(&mut self) -> io::Result<()> {
        let (columns, rows) = terminal::size()?;
        let container = (columns as u32, rows as u32 * PIXELS_PER_ROW);

        self.renderer.render(
            &self.scene,
            self.controller.selection(),
            &mut self.surface,
            Some(container),
            RenderPass::Live,
        );

        let mut stdout = stdout();
        self.surface.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(self.status_line()),
            cursor::MoveTo(0, rows.saturating_sub(1)),
            Print(HELP),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};

    fn app() -> TerminalApp {
        TerminalApp::with_size(AppConfig::default(), 80, 40)
    }

    fn press(app: &mut TerminalApp, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn mouse(app: &mut TerminalApp, kind: MouseEventKind, column: u16, row: u16) {
        app.handle_event(Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }));
    }

    #[test]
    fn test_cell_to_pixel() {
        assert_eq!(cell_to_pixel(0, 0), (0.5, 1.0));
        assert_eq!(cell_to_pixel(10, 3), (10.5, 7.0));
    }

    #[test]
    fn test_quit_and_toggles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('g'));
        assert!(!app.scene().grid().show_grid);
        press(&mut app, KeyCode::Char('t'));
        assert!(!app.scene().dark_mode());
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.scene().grid().grid_angle(), 18);
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.scene().grid().render_detail(), 5.0);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_arrow_keys_step_camera() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Up);
        let camera = app.scene().camera();
        assert!((camera.axis_degrees(Axis::Z) - 5.0).abs() < 1e-9);
        assert!((camera.axis_degrees(Axis::X) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_snap_toggle_shows_in_status() {
        let mut app = app();
        assert!(app.scene().snap_to_grid());
        assert!(app.status_line().contains("detail 10 snap |"));

        press(&mut app, KeyCode::Char('n'));
        assert!(!app.scene().snap_to_grid());
        assert!(app.status_line().contains("detail 10 |"));

        // Without snapping a key step lands between the 5° marks
        app.scene.set_camera_degrees(Axis::Z, 2.0);
        press(&mut app, KeyCode::Right);
        assert!((app.scene().camera().axis_degrees(Axis::Z) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_mouse_drag_rotates() {
        let mut app = app();
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 10);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 30, 10);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 30, 10);

        // 20 columns right at 0.005 rad per pixel
        assert!((app.scene().camera().yaw + 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_region_select_zooms() {
        let mut app = app();
        // Surface size is only known after a frame; match the 80x40 terminal
        app.surface.resize(80, 80);

        press(&mut app, KeyCode::Char('s'));
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 40, 20);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 60, 30);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 60, 30);

        assert!(app.scene().view().is_region_active());
        assert!(!app.scene().selection_mode());
        assert!(app.message().starts_with("ROI Active"));

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.scene().view().zoom, 1.0);
    }

    #[test]
    fn test_cube_selection_and_guides() {
        let mut app = app();
        let first = app.selected();
        assert!(first.is_some());

        press(&mut app, KeyCode::Char('a'));
        let second = app.selected();
        assert_ne!(first, second);

        press(&mut app, KeyCode::Char('f'));
        let cube = second
            .and_then(|id| app.scene().geometry(id))
            .and_then(|g| g.as_cube())
            .cloned();
        assert_eq!(cube.map(|c| c.show_full_guide), Some(true));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selected(), first);

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.scene().geometries().len(), 1);
        assert_eq!(app.selected(), second);
    }

    #[test]
    fn test_focus_lost_cancels_drag() {
        let mut app = app();
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 10);
        app.handle_event(Event::FocusLost);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 30, 10);
        assert_eq!(app.scene().camera().yaw, 0.0);
    }
}
