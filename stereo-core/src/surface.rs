/// Drawing surface abstraction shared by the terminal, pixel and canvas
/// back ends
use nalgebra::Point2;
use thiserror::Error;

use crate::color::Color;

/// Device-pixel position, origin top-left, Y down
pub type ScreenPoint = Point2<f64>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("drawing surface is not available")]
    Unavailable,

    #[error("failed to encode image: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Line color, width and dash pattern (alternating on/off lengths)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub dash: &'static [f64],
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: &[],
        }
    }

    pub fn dashed(color: Color, width: f64, dash: &'static [f64]) -> Self {
        Self { color, width, dash }
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    /// Font size in pixels
    pub size: f64,
    pub bold: bool,
}

/// Primitive 2D drawing operations in device pixels.
///
/// Clips nest: every `push_clip_circle` is matched by a `pop_clip`, and
/// drawing between them is limited to the intersection of active clips.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to fully transparent
    fn clear(&mut self);

    /// Cover the whole surface with an opaque color
    fn fill_background(&mut self, color: Color);

    fn stroke_circle(&mut self, center: ScreenPoint, radius: f64, style: &StrokeStyle);

    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, color: Color);

    fn push_clip_circle(&mut self, center: ScreenPoint, radius: f64);

    fn pop_clip(&mut self);

    /// Connect consecutive points with straight segments
    fn stroke_polyline(&mut self, points: &[ScreenPoint], style: &StrokeStyle);

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &StrokeStyle);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);

    fn fill_text(&mut self, text: &str, at: ScreenPoint, style: &TextStyle, align: TextAlign);
}

/// A surface whose pixels can be read back and encoded as an image
pub trait ExportSurface: Surface {
    type Image;

    fn encode(&self) -> Result<Self::Image, ExportError>;
}

/// Closed polygon approximating a circle, fine enough for pixel rasters
pub fn circle_path(center: ScreenPoint, radius: f64) -> Vec<ScreenPoint> {
    let segments = ((radius * std::f64::consts::TAU / 2.0).ceil() as usize).max(16);
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64 * std::f64::consts::TAU;
            ScreenPoint::new(center.x + radius * t.cos(), center.y + radius * t.sin())
        })
        .collect()
}

/// Splits a polyline into the visible dash pieces of `pattern`.
///
/// Calls `emit` with each "on" piece's endpoints. An empty pattern emits the
/// segments unchanged. Back ends that cannot dash natively share this walk.
pub fn for_each_dash<F>(points: &[ScreenPoint], pattern: &[f64], mut emit: F)
where
    F: FnMut(ScreenPoint, ScreenPoint),
{
    let total: f64 = pattern.iter().sum();
    if pattern.is_empty() || total <= 0.0 {
        for pair in points.windows(2) {
            emit(pair[0], pair[1]);
        }
        return;
    }

    let mut index = 0;
    let mut left = pattern[0];
    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let length = (end - start).norm();
        let mut travelled = 0.0;
        while travelled < length {
            let step = left.min(length - travelled);
            if index % 2 == 0 {
                let a = start + (end - start) * (travelled / length);
                let b = start + (end - start) * ((travelled + step) / length);
                emit(a, b);
            }
            travelled += step;
            left -= step;
            if left <= 0.0 {
                index = (index + 1) % pattern.len();
                left = pattern[index];
            }
        }
    }
}
