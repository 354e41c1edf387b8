/// StereoSketch Terminal - interactive stereographic sketching
///
/// Controls:
///   - Mouse drag: Rotate the camera (or draw a zoom region in select mode)
///   - Arrow keys / , .: Step the camera by 5°
///   - S: Toggle region select, R: Reset view
///   - G, [ ], + -: Grid visibility, interval and detail
///   - A / X / Tab: Add, delete and cycle cubes; E/F toggle guides
///   - T: Theme, P: Export PNG, Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use stereo_core::{RenderOptions, SceneRenderer};
use stereo_terminal::{raster, AppConfig, Args, TerminalApp};

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let render = args.render;
    let config = AppConfig::from(args);
    log::debug!("starting with {config:?}");

    if let Some(size) = render {
        let renderer = SceneRenderer::new(RenderOptions::default());
        let scene = config.build_scene();
        raster::write_png(&renderer, &scene, size, 1.0, &config.export_path)?;
        println!("Wrote {}", config.export_path.display());
        return Ok(());
    }

    let mut app = TerminalApp::new(config).context("failed to query terminal size")?;
    app.run().context("terminal session failed")?;

    println!("Thank you for using StereoSketch!");
    Ok(())
}
