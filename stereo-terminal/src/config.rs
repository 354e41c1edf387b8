/// Command-line configuration for the terminal front end
use clap::Parser;
use nalgebra::Vector3;
use std::path::PathBuf;
use stereo_core::view::DRAG_SENSITIVITY;
use stereo_core::{Axis, CubeUpdate, GeometryUpdate, SceneState};

/// Distance from the camera of the first cube placed from the command line
const FIRST_CUBE_DISTANCE: f64 = 5.0;
/// Spacing between command-line cubes along X
const CUBE_SPACING: f64 = 3.0;
const MAX_PIXEL_RATIO: f64 = 32.0;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "stereo-terminal",
    version,
    about = "Stereographic sketching in the terminal"
)]
pub struct Args {
    /// Grid interval in degrees, snapped to 5, 6, 9, 10, 12, 15, 18, 20, 30, 36 or 45
    #[arg(long, default_value_t = 15.0)]
    pub grid_angle: f64,

    /// Sampling density multiplier (1 to 1000)
    #[arg(long, default_value_t = 10.0)]
    pub detail: f64,

    /// Start without the reference grid
    #[arg(long)]
    pub no_grid: bool,

    /// Use the light theme
    #[arg(long)]
    pub light: bool,

    /// Radians of camera rotation per dragged pixel
    #[arg(long, default_value_t = DRAG_SENSITIVITY)]
    pub sensitivity: f64,

    /// Where the `p` key writes the exported PNG
    #[arg(long, default_value = "stereosketch.png")]
    pub export_path: PathBuf,

    /// Output pixels per virtual terminal pixel in exports
    #[arg(long, default_value_t = 8.0)]
    pub pixel_ratio: f64,

    /// Cubes to place in front of the camera at startup
    #[arg(long, default_value_t = 1)]
    pub cubes: usize,

    /// Render one PNG of WIDTHxHEIGHT pixels to the export path and exit
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub render: Option<(u32, u32)>,
}

fn parse_size(input: &str) -> Result<(u32, u32), String> {
    let (w, h) = input
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{input}`"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if w == 0 || h == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok((w, h))
}

/// Validated startup settings
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub grid_angle: f64,
    pub render_detail: f64,
    pub show_grid: bool,
    pub dark_mode: bool,
    pub sensitivity: f64,
    pub export_path: PathBuf,
    pub pixel_ratio: f64,
    pub initial_cubes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            grid_angle: 15.0,
            render_detail: 10.0,
            show_grid: true,
            dark_mode: true,
            sensitivity: DRAG_SENSITIVITY,
            export_path: PathBuf::from("stereosketch.png"),
            pixel_ratio: 8.0,
            initial_cubes: 1,
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let defaults = AppConfig::default();
        let sensitivity = if args.sensitivity.is_finite() && args.sensitivity > 0.0 {
            args.sensitivity
        } else {
            defaults.sensitivity
        };
        let pixel_ratio = if args.pixel_ratio.is_finite() && args.pixel_ratio > 0.0 {
            args.pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            defaults.pixel_ratio
        };

        Self {
            grid_angle: args.grid_angle,
            render_detail: args.detail,
            show_grid: !args.no_grid,
            dark_mode: !args.light,
            sensitivity,
            export_path: args.export_path,
            pixel_ratio,
            initial_cubes: args.cubes,
        }
    }
}

impl AppConfig {
    /// Initial scene: grid settings, theme and a row of cubes ahead of the camera
    pub fn build_scene(&self) -> SceneState {
        let mut scene = SceneState::new();
        scene.set_dark_mode(self.dark_mode);

        let grid = scene.grid_mut();
        grid.show_grid = self.show_grid;
        grid.set_grid_angle(self.grid_angle);
        grid.set_render_detail(self.render_detail);

        for i in 0..self.initial_cubes {
            let id = scene.add_cube();
            let offset = (i as f64 - (self.initial_cubes - 1) as f64 / 2.0) * CUBE_SPACING;
            let center = Vector3::new(offset, FIRST_CUBE_DISTANCE, 0.0);
            for axis in Axis::ALL {
                let update = CubeUpdate::Center(axis, axis.component(&center));
                if let Err(e) = scene.update_geometry(id, GeometryUpdate::Cube(update)) {
                    log::warn!("could not place cube {id}: {e}");
                }
            }
        }
        scene
    }
}
