/// Per-frame scene drawing.
///
/// A pass reads the scene once and issues draw calls in a fixed order:
/// background, clipped sphere content (grid arcs, cube guides and edges),
/// rim labels, then raw screen-space overlays. Live passes ask for another
/// frame; export passes draw on a transparent background and do not.
use nalgebra::{UnitQuaternion, Vector3};

use crate::color::Color;
use crate::geometry::{CubeGeometry, CUBE_EDGES, GUIDE_ANCHORS};
use crate::projection::{ProjectedPoint, Projector, Viewport};
use crate::sampler::{sample_great_circle, sample_infinite_ray, sample_segment};
use crate::splitter::split_into_groups;
use crate::state::SceneState;
use crate::surface::{
    ExportError, ExportSurface, ScreenPoint, StrokeStyle, Surface, TextAlign, TextStyle,
};
use crate::theme::Theme;
use crate::transform::Axis;
use crate::view::SelectionRect;

/// Grid arc sampling step at detail 1 and zoom 1, in degrees
pub const GRID_STEP_DEGREES: f64 = 4.0;
/// Samples per cube edge at detail 1 and zoom 1
pub const EDGE_SAMPLES: f64 = 10.0;
/// Samples per infinite guide at detail 1 and zoom 1
pub const GUIDE_SAMPLES: f64 = 50.0;
/// Distance of the rim degree labels outside the boundary circle
pub const RIM_LABEL_GAP: f64 = 20.0;

const GUIDE_DASH: &[f64] = &[3.0, 6.0];
const GUIDE_WIDTH: f64 = 0.4;
const GUIDE_OPACITY: f64 = 0.6;
const SELECTION_DASH: &[f64] = &[5.0, 5.0];
const GIZMO_MARGIN: f64 = 64.0;
const GIZMO_AXIS_LENGTH: f64 = 30.0;
const GIZMO_LABEL_OFFSET: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Interactive frame on the theme background
    Live,
    /// One-off frame on a transparent background for image export
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Draw the orientation gizmo in the top-right corner of live frames
    pub show_gizmo: bool,
    /// Multiplier on label font size, matching the surface pixel ratio
    pub label_scale: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_gizmo: true,
            label_scale: 1.0,
        }
    }
}

/// What a pass drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub polylines: usize,
    pub labels: usize,
    pub hidden_samples: usize,
    /// Live passes request the next frame
    pub schedule_next: bool,
}

/// Draws a [`SceneState`] onto any [`Surface`]
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    pub options: RenderOptions,
}

impl SceneRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renderer for a surface `ratio` times denser than the live view
    pub fn for_pixel_ratio(&self, ratio: f64) -> Self {
        Self::new(RenderOptions {
            label_scale: self.options.label_scale * ratio,
            ..self.options
        })
    }

    /// Draw one frame.
    ///
    /// `container` is the size the surface should have; it is applied on
    /// live passes only, so an export keeps the dimensions it started with.
    pub fn render<S: Surface + ?Sized>(
        &self,
        scene: &SceneState,
        selection: Option<&SelectionRect>,
        surface: &mut S,
        container: Option<(u32, u32)>,
        pass: RenderPass,
    ) -> FrameStats {
        if pass == RenderPass::Live {
            if let Some(size) = container {
                if surface.size() != size {
                    surface.resize(size.0, size.1);
                }
            }
        }

        let theme = scene.theme();
        match pass {
            RenderPass::Live => surface.fill_background(theme.background),
            RenderPass::Export => surface.clear(),
        }

        let mut stats = FrameStats {
            schedule_next: pass == RenderPass::Live,
            ..FrameStats::default()
        };

        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            return stats;
        }

        let view = scene.view();
        let projector = Projector::new(
            &scene.camera(),
            Viewport::new(width as f64, height as f64),
            view,
        );
        let mut frame = Frame {
            surface,
            projector,
            theme,
            stats: &mut stats,
            label_size: (10.0 * view.zoom.sqrt()).max(8.0) * self.options.label_scale,
        };

        let (cx, cy) = frame.projector.center();
        let center = ScreenPoint::new(cx, cy);
        let scale = frame.projector.scale();

        frame.surface.stroke_circle(
            center,
            scale,
            &StrokeStyle::solid(theme.boundary, 2.0),
        );
        frame.surface.push_clip_circle(center, scale);

        let grid = scene.grid();
        let density = Density::new(grid.render_detail(), view.adaptive_factor());

        if grid.show_grid {
            frame.draw_grid_family(GridFamily::Longitude, grid.grid_angle(), density.circle_step);
            frame.draw_grid_family(GridFamily::Latitude, grid.grid_angle(), density.circle_step);
        }

        for cube in scene
            .geometries()
            .iter()
            .filter(|g| g.is_visible())
            .filter_map(|g| g.as_cube())
        {
            frame.draw_cube(cube, &density);
        }

        frame.surface.pop_clip();

        if grid.show_grid {
            frame.draw_rim_labels(center, scale, grid.grid_angle());
        }

        if let Some(rect) = selection {
            frame.draw_selection(rect);
        }

        if self.options.show_gizmo && pass == RenderPass::Live {
            frame.draw_gizmo(&scene.camera().inverse_rotation(), width as f64);
        }

        log::trace!("{pass:?} pass: {stats:?}");
        stats
    }

    /// Render on a transparent background, encode, then restore the live view.
    ///
    /// Runs both passes synchronously; the live pass keeps the surface size.
    pub fn export<S: ExportSurface + ?Sized>(
        &self,
        scene: &SceneState,
        surface: &mut S,
    ) -> Result<S::Image, ExportError> {
        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            return Err(ExportError::Unavailable);
        }

        self.render(scene, None, surface, None, RenderPass::Export);
        let image = surface.encode();
        self.render(scene, None, surface, None, RenderPass::Live);

        if image.is_ok() {
            log::info!("exported {width}x{height} frame");
        }
        image
    }
}

#[derive(Debug, Clone, Copy)]
enum GridFamily {
    Longitude,
    Latitude,
}

impl GridFamily {
    /// Orthonormal basis of the arc at signed angle `theta` (radians);
    /// the first vector is the label anchor
    fn basis(self, theta: f64) -> (Vector3<f64>, Vector3<f64>) {
        match self {
            GridFamily::Longitude => (
                Vector3::new(-theta.sin(), theta.cos(), 0.0),
                Vector3::z(),
            ),
            GridFamily::Latitude => (
                Vector3::new(0.0, theta.cos(), theta.sin()),
                Vector3::x(),
            ),
        }
    }
}

/// Sample counts for one frame
#[derive(Debug, PartialEq)]
struct Density {
    edge_steps: usize,
    guide_steps: usize,
    /// Great-circle step in degrees, shared by grid arcs and full guides
    circle_step: f64,
}

impl Density {
    fn new(detail: f64, adaptive: f64) -> Self {
        let factor = detail * adaptive;
        Self {
            edge_steps: (EDGE_SAMPLES * factor).round() as usize,
            guide_steps: (GUIDE_SAMPLES * factor).round() as usize,
            circle_step: GRID_STEP_DEGREES / factor,
        }
    }
}

struct Frame<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    projector: Projector,
    theme: Theme,
    stats: &'a mut FrameStats,
    label_size: f64,
}

impl<S: Surface + ?Sized> Frame<'_, S> {
    fn draw_samples(&mut self, points: &[ProjectedPoint], style: &StrokeStyle) {
        self.stats.hidden_samples += points.iter().filter(|p| !p.visible).count();
        for group in split_into_groups(points, self.projector.jump_threshold()) {
            if group.len() < 2 {
                continue;
            }
            let path: Vec<ScreenPoint> = group.iter().map(ProjectedPoint::screen).collect();
            self.surface.stroke_polyline(&path, style);
            self.stats.polylines += 1;
        }
    }

    fn draw_label(&mut self, text: &str, at: ScreenPoint, color: Color, bold: bool) {
        let style = TextStyle {
            color,
            size: self.label_size,
            bold,
        };
        self.surface.fill_text(text, at, &style, TextAlign::Center);
        self.stats.labels += 1;
    }

    fn draw_grid_family(&mut self, family: GridFamily, angle: u32, step: f64) {
        let (line, axis) = match family {
            GridFamily::Longitude => (self.theme.grid_longitude, self.theme.axis_longitude),
            GridFamily::Latitude => (self.theme.grid_latitude, self.theme.axis_latitude),
        };

        let angle = angle.max(1) as usize;
        for i in (180 % angle..360).step_by(angle) {
            let degrees = i as i64 - 180;
            let is_axis = degrees == 0;
            let (a, b) = family.basis((degrees as f64).to_radians());

            let points = sample_great_circle(&self.projector, &a, &b, step);
            let style = if is_axis {
                StrokeStyle::solid(axis, 2.0)
            } else {
                StrokeStyle::solid(line, 1.0)
            };
            self.draw_samples(&points, &style);

            let anchor = self.projector.project(&a);
            if anchor.visible {
                self.draw_label(&format!("{degrees}°"), anchor.screen(), axis, is_axis);
            }
        }
    }

    fn draw_cube(&mut self, cube: &CubeGeometry, density: &Density) {
        let corners = cube.corners();

        if cube.show_edge_guides {
            let color = cube.color.with_alpha(cube.color.alpha() * GUIDE_OPACITY);
            let style = StrokeStyle::dashed(color, GUIDE_WIDTH, GUIDE_DASH);
            for (axis, anchors) in GUIDE_ANCHORS {
                let direction = cube.local_axis(axis);
                for index in anchors {
                    let origin = corners[index];
                    let points =
                        sample_infinite_ray(&self.projector, &origin, &direction, density.guide_steps);
                    self.draw_samples(&points, &style);

                    if cube.show_full_guide {
                        self.draw_full_guide(&origin, &direction, density.circle_step, &style);
                    }
                }
            }
        }

        let style = StrokeStyle::solid(cube.color, 2.0);
        for (start, end) in CUBE_EDGES {
            let points = sample_segment(
                &self.projector,
                &corners[start],
                &corners[end],
                density.edge_steps,
            );
            self.draw_samples(&points, &style);
        }
    }

    /// Whole great circle swept by the directions of a line's points
    fn draw_full_guide(
        &mut self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        step: f64,
        style: &StrokeStyle,
    ) {
        let normal_part = origin - direction * origin.dot(direction);
        if let Some(b) = normal_part.try_normalize(1e-9) {
            let points = sample_great_circle(&self.projector, direction, &b, step);
            self.draw_samples(&points, style);
        }
    }

    fn draw_rim_labels(&mut self, center: ScreenPoint, scale: f64, angle: u32) {
        let radius = scale + RIM_LABEL_GAP;
        let color = self.theme.label;
        for i in (0..360).step_by(angle.max(1) as usize) {
            let theta = (i as f64 - 90.0).to_radians();
            let at = ScreenPoint::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            );
            self.draw_label(&format!("{i}°"), at, color, true);
        }
    }

    fn draw_selection(&mut self, rect: &SelectionRect) {
        let (x, y, w, h) = (rect.left(), rect.top(), rect.width(), rect.height());
        let stroke = StrokeStyle::dashed(self.theme.selection_stroke, 2.0, SELECTION_DASH);
        self.surface.stroke_rect(x, y, w, h, &stroke);
        self.surface.fill_rect(x, y, w, h, self.theme.selection_fill);
    }

    fn draw_gizmo(&mut self, inverse: &UnitQuaternion<f64>, width: f64) {
        let origin = ScreenPoint::new(width - GIZMO_MARGIN, GIZMO_MARGIN);
        let axes = [
            (Axis::X, "X", self.theme.gizmo_x),
            (Axis::Y, "Y", self.theme.gizmo_y),
            (Axis::Z, "Z", self.theme.gizmo_z),
        ];

        for (axis, label, color) in axes {
            let dir = inverse * axis.unit();
            let tip = ScreenPoint::new(
                origin.x + dir.x * GIZMO_AXIS_LENGTH,
                origin.y - dir.z * GIZMO_AXIS_LENGTH,
            );
            self.surface
                .stroke_polyline(&[origin, tip], &StrokeStyle::solid(color, 2.0));
            self.surface.fill_circle(tip, 2.0, color);

            let at = ScreenPoint::new(
                tip.x + dir.x * GIZMO_LABEL_OFFSET,
                tip.y - dir.z * GIZMO_LABEL_OFFSET,
            );
            let style = TextStyle {
                color,
                size: 10.0,
                bold: true,
            };
            self.surface.fill_text(label, at, &style, TextAlign::Center);
        }
        self.surface.fill_circle(origin, 1.5, self.theme.gizmo_center);
    }
}
