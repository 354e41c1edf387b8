/// Example: Render a scene headlessly and save it as a transparent PNG
///
/// Usage: cargo run --example export_png -- [output.png]
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use stereo_core::{
    Axis, CameraOrientation, CubeUpdate, GeometryUpdate, RenderOptions, SceneRenderer, SceneState,
};
use stereo_terminal::raster;

fn main() -> Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("export.png"));

    let mut scene = SceneState::new();
    scene.set_camera(CameraOrientation::new(0.3, 0.0, -0.4));
    scene.grid_mut().set_grid_angle(30.0);

    let id = scene.add_cube();
    for (field, value) in [("center.y", "6"), ("rotation.z", "30"), ("full_guide", "true")] {
        let update = CubeUpdate::parse(field, value)?;
        scene.update_geometry(id, GeometryUpdate::Cube(update))?;
    }
    scene.update_geometry(
        id,
        GeometryUpdate::Cube(CubeUpdate::Size(Axis::Z, 4.0)),
    )?;

    let renderer = SceneRenderer::new(RenderOptions::default());
    raster::write_png(&renderer, &scene, (800, 600), 1.0, &path)?;

    println!("Saved {}", path.display());
    Ok(())
}
