/// RGBA pixel surface used for PNG export
use anyhow::{Context, Result};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use std::fs;
use std::path::Path;
use stereo_core::{
    circle_path, for_each_dash, Color, ExportError, ExportSurface, SceneRenderer, SceneState,
    ScreenPoint, StrokeStyle, Surface, TextAlign, TextStyle,
};

/// Glyph cell size of the built-in label font
const GLYPH_WIDTH: i64 = 3;
const GLYPH_HEIGHT: i64 = 5;

/// Software rasterizer over a tight RGBA8 buffer
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    clips: Vec<(ScreenPoint, f64)>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            clips: Vec::new(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[offset..offset + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    fn inside_clips(&self, x: f64, y: f64) -> bool {
        self.clips
            .iter()
            .all(|(c, r)| (x - c.x).hypot(y - c.y) <= *r)
    }

    /// Source-over blend of `color` at `coverage` into pixel (x, y)
    fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        if coverage <= 0.0 || !self.inside_clips(x as f64 + 0.5, y as f64 + 0.5) {
            return;
        }

        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let dst = &mut self.pixels[offset..offset + 4];
        let src_a = color.alpha() * coverage.min(1.0);
        let dst_a = dst[3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        let src = [color.r, color.g, color.b];
        for i in 0..3 {
            let value = (src[i] as f64 * src_a + dst[i] as f64 * dst_a * (1.0 - src_a)) / out_a;
            dst[i] = value.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Anti-aliased segment by distance to the center line
    fn segment(&mut self, a: ScreenPoint, b: ScreenPoint, color: Color, width: f64) {
        let half = width.max(1.0) / 2.0;
        // Hairlines fade instead of thinning below one pixel
        let strength = width.min(1.0);
        let reach = half + 1.0;

        let min_x = (a.x.min(b.x) - reach).floor() as i64;
        let max_x = (a.x.max(b.x) + reach).ceil() as i64;
        let min_y = (a.y.min(b.y) - reach).floor() as i64;
        let max_y = (a.y.max(b.y) + reach).ceil() as i64;

        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i64 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = ScreenPoint::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = (half + 0.5 - distance_to_segment(p, a, b)).clamp(0.0, 1.0);
                self.blend(x, y, color, coverage * strength);
            }
        }
    }

    fn fill_glyph(&mut self, rows: [u8; 5], x0: i64, y0: i64, scale: i64, color: Color) {
        for (gy, bits) in rows.iter().enumerate() {
            for gx in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - gx)) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        self.blend(
                            x0 + gx * scale + dx,
                            y0 + gy as i64 * scale + dy,
                            color,
                            1.0,
                        );
                    }
                }
            }
        }
    }
}

fn distance_to_segment(p: ScreenPoint, a: ScreenPoint, b: ScreenPoint) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// 3×5 bitmap rows for the characters labels use
fn glyph(ch: char) -> Option<[u8; 5]> {
    let rows = match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '°' => [0b010, 0b101, 0b010, 0b000, 0b000],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        _ => return None,
    };
    Some(rows)
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = PixelSurface::new(width, height);
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill_background(&mut self, color: Color) {
        let rgba = [color.r, color.g, color.b, 255];
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    fn stroke_circle(&mut self, center: ScreenPoint, radius: f64, style: &StrokeStyle) {
        self.stroke_polyline(&circle_path(center, radius), style);
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, color: Color) {
        let reach = radius.ceil() as i64 + 1;
        let (cx, cy) = (center.x.floor() as i64, center.y.floor() as i64);
        for y in cy - reach..=cy + reach {
            for x in cx - reach..=cx + reach {
                let d = (x as f64 + 0.5 - center.x).hypot(y as f64 + 0.5 - center.y);
                self.blend(x, y, color, (radius + 0.5 - d).clamp(0.0, 1.0));
            }
        }
    }

    fn push_clip_circle(&mut self, center: ScreenPoint, radius: f64) {
        self.clips.push((center, radius));
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn stroke_polyline(&mut self, points: &[ScreenPoint], style: &StrokeStyle) {
        let (color, width) = (style.color, style.width);
        for_each_dash(points, style.dash, |a, b| self.segment(a, b, color, width));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &StrokeStyle) {
        let corners = [
            ScreenPoint::new(x, y),
            ScreenPoint::new(x + width, y),
            ScreenPoint::new(x + width, y + height),
            ScreenPoint::new(x, y + height),
            ScreenPoint::new(x, y),
        ];
        self.stroke_polyline(&corners, style);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let (x0, x1) = (x.round() as i64, (x + width).round() as i64);
        let (y0, y1) = (y.round() as i64, (y + height).round() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    fn fill_text(&mut self, text: &str, at: ScreenPoint, style: &TextStyle, align: TextAlign) {
        let scale = ((style.size / GLYPH_HEIGHT as f64).round() as i64).max(1);
        let advance = (GLYPH_WIDTH + 1) * scale;
        let count = text.chars().count() as i64;
        let total = (count * advance - scale).max(0);

        let left = at.x.round() as i64
            - match align {
                TextAlign::Left => 0,
                TextAlign::Center => total / 2,
                TextAlign::Right => total,
            };
        let top = at.y.round() as i64 - GLYPH_HEIGHT * scale / 2;

        for (i, ch) in text.chars().enumerate() {
            if let Some(rows) = glyph(ch) {
                let x = left + i as i64 * advance;
                self.fill_glyph(rows, x, top, scale, style.color);
                if style.bold {
                    self.fill_glyph(rows, x + 1, top, scale, style.color);
                }
            }
        }
    }
}

impl ExportSurface for PixelSurface {
    type Image = Vec<u8>;

    fn encode(&self) -> Result<Vec<u8>, ExportError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(&self.pixels, self.width, self.height, ColorType::Rgba8.into())
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// Render `scene` at `pixel_ratio` times the given live size and encode it as PNG
pub fn render_png(
    renderer: &SceneRenderer,
    scene: &SceneState,
    width: u32,
    height: u32,
    pixel_ratio: f64,
) -> Result<Vec<u8>, ExportError> {
    let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio
    } else {
        1.0
    };
    let scaled_width = (width as f64 * ratio).round() as u32;
    let scaled_height = (height as f64 * ratio).round() as u32;

    let mut surface = PixelSurface::new(scaled_width, scaled_height);
    renderer
        .for_pixel_ratio(ratio)
        .export(&scene.scaled_for_export(ratio), &mut surface)
}

/// Export the scene and write the PNG to `path`
pub fn write_png(
    renderer: &SceneRenderer,
    scene: &SceneState,
    size: (u32, u32),
    pixel_ratio: f64,
    path: &Path,
) -> Result<()> {
    let bytes = render_png(renderer, scene, size.0, size.1, pixel_ratio)
        .context("failed to render export image")?;
    fs::write(path, &bytes)
        .with_context(|| format!("failed to write PNG to {}", path.display()))?;
    log::info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stereo_core::RenderOptions;

    const WHITE: Color = Color::rgb(255, 255, 255);

    #[test]
    fn test_clear_and_background() {
        let mut surface = PixelSurface::new(4, 3);
        assert_eq!(surface.pixels.len(), 48);
        surface.fill_background(Color::rgb(10, 20, 30));
        assert_eq!(surface.pixel(3, 2), Some([10, 20, 30, 255]));

        surface.clear();
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn test_translucent_blend_over_transparent() {
        let mut surface = PixelSurface::new(2, 2);
        surface.blend(0, 0, Color::rgba(200, 100, 0, 128), 1.0);
        assert_eq!(surface.pixel(0, 0), Some([200, 100, 0, 128]));

        // Over an opaque background the result stays opaque
        surface.fill_background(Color::rgb(0, 0, 0));
        surface.blend(1, 1, Color::rgba(200, 100, 0, 255).with_alpha(0.5), 1.0);
        let [r, g, b, a] = surface.pixel(1, 1).unwrap_or_default();
        assert_eq!(a, 255);
        assert!((r as i32 - 100).abs() <= 1);
        assert!((g as i32 - 50).abs() <= 1);
        assert_eq!(b, 0);
    }

    #[test]
    fn test_segment_covers_center_line() {
        let mut surface = PixelSurface::new(20, 10);
        let line = [ScreenPoint::new(2.0, 5.0), ScreenPoint::new(18.0, 5.0)];
        surface.stroke_polyline(&line, &StrokeStyle::solid(WHITE, 2.0));

        assert_eq!(surface.pixel(10, 4).map(|p| p[3]), Some(255));
        assert_eq!(surface.pixel(10, 5).map(|p| p[3]), Some(255));
        assert_eq!(surface.pixel(10, 8).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_clip_circle() {
        let mut surface = PixelSurface::new(40, 40);
        surface.push_clip_circle(ScreenPoint::new(20.0, 20.0), 5.0);
        surface.fill_rect(0.0, 0.0, 40.0, 40.0, WHITE);
        surface.pop_clip();

        assert_eq!(surface.pixel(20, 20).map(|p| p[3]), Some(255));
        assert_eq!(surface.pixel(2, 2).map(|p| p[3]), Some(0));

        surface.fill_rect(0.0, 0.0, 4.0, 4.0, WHITE);
        assert_eq!(surface.pixel(2, 2).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_text_draws_known_glyphs() {
        let mut surface = PixelSurface::new(40, 20);
        let style = TextStyle {
            color: WHITE,
            size: 5.0,
            bold: false,
        };
        surface.fill_text("-", ScreenPoint::new(10.0, 10.0), &style, TextAlign::Left);
        // Middle glyph row of '-' sits two rows below the top
        assert_eq!(surface.pixel(11, 10).map(|p| p[3]), Some(255));
        assert_eq!(surface.pixel(11, 8).map(|p| p[3]), Some(0));

        surface.fill_text("?", ScreenPoint::new(30.0, 10.0), &style, TextAlign::Left);
        assert_eq!(surface.pixel(30, 10).map(|p| p[3]), Some(0));
        assert!(glyph('°').is_some());
    }

    #[test]
    fn test_encode_png() {
        let mut surface = PixelSurface::new(8, 6);
        surface.fill_rect(0.0, 0.0, 4.0, 6.0, WHITE);
        let bytes = surface.encode().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(decoded.get_pixel(6, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_render_png_scales_surface() {
        let renderer = SceneRenderer::new(RenderOptions {
            show_gizmo: false,
            ..RenderOptions::default()
        });
        let mut scene = SceneState::new();
        scene.grid_mut().show_grid = false;

        let bytes = render_png(&renderer, &scene, 40, 30, 2.0).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (80, 60));
        // Only the boundary circle is drawn; the export background stays transparent
        assert_eq!(decoded.get_pixel(0, 59).0[3], 0);
        assert_eq!(decoded.get_pixel(79, 0).0[3], 0);
        assert!(decoded.pixels().any(|p| p.0[3] > 0));
    }

    #[test]
    fn test_exported_png_has_no_gizmo() {
        let mut scene = SceneState::new();
        scene.grid_mut().show_grid = false;
        let plain = SceneRenderer::new(RenderOptions {
            show_gizmo: false,
            ..RenderOptions::default()
        });

        let with_gizmo = render_png(&SceneRenderer::default(), &scene, 400, 300, 1.0).unwrap();
        let without = render_png(&plain, &scene, 400, 300, 1.0).unwrap();
        assert_eq!(with_gizmo, without);
    }
}
