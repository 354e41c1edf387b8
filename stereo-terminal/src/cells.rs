/// Character-cell surface for terminal rendering
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use stereo_core::{
    circle_path, for_each_dash, Color, ScreenPoint, StrokeStyle, Surface, TextAlign, TextStyle,
};

/// Stroke characters ordered by visual weight (lightest to heaviest)
const STROKE_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Stroke width drawn with the heaviest ramp character
const FULL_WEIGHT_WIDTH: f64 = 2.0;

/// Text always wins over strokes in the same cell
const TEXT_WEIGHT: f64 = 2.0;

/// Virtual pixels stacked in one cell; terminal cells are about twice as tall as wide
pub const PIXELS_PER_ROW: u32 = 2;

/// One terminal character with its colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Option<Color>,
    pub fill: Option<Color>,
    weight: f64,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        color: None,
        fill: None,
        weight: 0.0,
    };
}

/// Surface that rasterizes strokes into terminal cells.
///
/// Coordinates are virtual pixels: one per column horizontally and
/// [`PIXELS_PER_ROW`] per row vertically, so circles stay round.
pub struct CellSurface {
    columns: usize,
    rows: usize,
    height: u32,
    cells: Vec<Cell>,
    background: Option<Color>,
    clips: Vec<(ScreenPoint, f64)>,
}

impl CellSurface {
    /// Surface covering `columns` by `rows` terminal cells
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            height: rows as u32 * PIXELS_PER_ROW,
            cells: vec![Cell::BLANK; columns * rows],
            background: None,
            clips: Vec::new(),
        }
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&Cell> {
        if column < self.columns && row < self.rows {
            self.cells.get(row * self.columns + column)
        } else {
            None
        }
    }

    /// Characters only, one line per row
    pub fn text(&self) -> String {
        self.cells
            .chunks(self.columns.max(1))
            .map(|row| row.iter().map(|c| c.ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn reset_cells(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = Cell::BLANK);
    }

    fn inside_clips(&self, x: f64, y: f64) -> bool {
        self.clips
            .iter()
            .all(|(c, r)| (x - c.x).hypot(y - c.y) <= *r)
    }

    /// Cell holding virtual pixel (x, y), if on screen and not clipped
    fn cell_at(&mut self, x: i64, y: i64) -> Option<&mut Cell> {
        if x < 0 || y < 0 || x as usize >= self.columns || y as u32 >= self.height {
            return None;
        }
        if !self.inside_clips(x as f64 + 0.5, y as f64 + 0.5) {
            return None;
        }
        let row = y as usize / PIXELS_PER_ROW as usize;
        self.cells.get_mut(row * self.columns + x as usize)
    }

    fn plot(&mut self, x: i64, y: i64, ch: char, color: Color, weight: f64) {
        if let Some(cell) = self.cell_at(x, y) {
            if weight >= cell.weight {
                cell.ch = ch;
                cell.color = Some(color);
                cell.weight = weight;
            }
        }
    }

    /// Bresenham walk between two virtual pixels, limited to the surface
    fn line(&mut self, a: ScreenPoint, b: ScreenPoint, ch: char, color: Color, weight: f64) {
        let max = ScreenPoint::new(self.columns as f64, self.height as f64);
        let Some((a, b)) = clip_segment(a, b, max) else {
            return;
        };
        let (mut x0, mut y0) = (a.x.round() as i64, a.y.round() as i64);
        let (x1, y1) = (b.x.round() as i64, b.y.round() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, ch, color, weight);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Write the cells to the terminal, one row per line
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (row, cells) in self.cells.chunks(self.columns.max(1)).enumerate() {
            writer.queue(cursor::MoveTo(0, row as u16))?;
            for cell in cells {
                let background = match (cell.fill, self.background) {
                    (Some(fill), Some(base)) => Some(mix(fill, base)),
                    (Some(fill), None) => Some(fill.with_alpha(1.0)),
                    (None, base) => base,
                };
                match background {
                    Some(c) => writer.queue(SetBackgroundColor(term_color(c)))?,
                    None => writer.queue(SetBackgroundColor(TermColor::Reset))?,
                };
                let foreground = cell.color.map(term_color).unwrap_or(TermColor::Reset);
                writer.queue(SetForegroundColor(foreground))?;
                writer.queue(Print(cell.ch))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Part of segment `a -> b` inside `[-1, max.x] x [-1, max.y]` (Liang-Barsky)
fn clip_segment(
    a: ScreenPoint,
    b: ScreenPoint,
    max: ScreenPoint,
) -> Option<(ScreenPoint, ScreenPoint)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-d.x, a.x + 1.0),
        (d.x, max.x - a.x),
        (-d.y, a.y + 1.0),
        (d.y, max.y - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Ramp character for a stroke of the given width and opacity
fn stroke_char(style: &StrokeStyle) -> (char, f64) {
    let weight = (style.width * style.color.alpha() / FULL_WEIGHT_WIDTH).clamp(0.0, 1.0);
    let index = (weight * (STROKE_RAMP.len() - 1) as f64).round() as usize;
    (STROKE_RAMP[index.min(STROKE_RAMP.len() - 1)], weight)
}

/// `over` composited onto an opaque `under`
fn mix(over: Color, under: Color) -> Color {
    let a = over.alpha();
    let channel = |o: u8, u: u8| (o as f64 * a + u as f64 * (1.0 - a)).round() as u8;
    Color::rgb(
        channel(over.r, under.r),
        channel(over.g, under.g),
        channel(over.b, under.b),
    )
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

impl Surface for CellSurface {
    fn size(&self) -> (u32, u32) {
        (self.columns as u32, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.columns = width as usize;
        self.rows = height.div_ceil(PIXELS_PER_ROW) as usize;
        self.height = height;
        self.cells = vec![Cell::BLANK; self.columns * self.rows];
        self.clips.clear();
    }

    fn clear(&mut self) {
        self.reset_cells();
        self.background = None;
    }

    fn fill_background(&mut self, color: Color) {
        self.reset_cells();
        self.background = Some(color);
    }

    fn stroke_circle(&mut self, center: ScreenPoint, radius: f64, style: &StrokeStyle) {
        self.stroke_polyline(&circle_path(center, radius), style);
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, color: Color) {
        let r = radius.ceil() as i64;
        let (cx, cy) = (center.x.round() as i64, center.y.round() as i64);
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                if ((x - cx) as f64).hypot((y - cy) as f64) <= radius {
                    self.plot(x, y, 'o', color, 1.0);
                }
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
        let (ch, weight) = stroke_char(style);
        let color = style.color;
        for_each_dash(points, style.dash, |a, b| self.line(a, b, ch, color, weight));
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
                if let Some(cell) = self.cell_at(px, py) {
                    cell.fill = Some(color);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, at: ScreenPoint, style: &TextStyle, align: TextAlign) {
        let len = text.chars().count() as i64;
        let start = at.x.round() as i64
            - match align {
                TextAlign::Left => 0,
                TextAlign::Center => len / 2,
                TextAlign::Right => len,
            };
        let y = at.y.round() as i64;
        for (i, ch) in text.chars().enumerate() {
            self.plot(start + i as i64, y, ch, style.color, TEXT_WEIGHT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    fn row(surface: &CellSurface, index: usize) -> String {
        surface.text().lines().nth(index).unwrap_or_default().to_string()
    }

    #[test]
    fn test_virtual_pixels_map_to_cells() {
        let mut surface = CellSurface::new(4, 3);
        assert_eq!(surface.size(), (4, 6));

        surface.resize(10, 7);
        assert_eq!(surface.size(), (10, 7));
        assert_eq!(surface.rows, 4);

        // Pixel rows 2 and 3 share cell row 1
        surface.plot(1, 2, '#', RED, 1.0);
        surface.plot(2, 3, '#', RED, 1.0);
        assert_eq!(row(&surface, 1), " ##       ");
    }

    #[test]
    fn test_stroke_weight_picks_ramp_character() {
        let mut surface = CellSurface::new(10, 2);
        let line = [ScreenPoint::new(0.0, 0.0), ScreenPoint::new(9.0, 0.0)];
        surface.stroke_polyline(&line, &StrokeStyle::solid(RED, 2.0));
        assert_eq!(row(&surface, 0), "@@@@@@@@@@");

        // A lighter stroke never overwrites a heavier one
        let faint = StrokeStyle::solid(RED.with_alpha(0.3), 0.4);
        surface.stroke_polyline(&line, &faint);
        assert_eq!(row(&surface, 0), "@@@@@@@@@@");

        let (ch, _) = stroke_char(&faint);
        assert_eq!(ch, '.');
    }

    #[test]
    fn test_dashed_stroke_leaves_gaps() {
        let mut surface = CellSurface::new(20, 1);
        let line = [ScreenPoint::new(0.0, 0.0), ScreenPoint::new(19.0, 0.0)];
        surface.stroke_polyline(&line, &StrokeStyle::dashed(RED, 2.0, &[3.0, 6.0]));
        let text = row(&surface, 0);
        assert!(text.starts_with("@@@@ "));
        assert!(text.contains("   "));
    }

    #[test]
    fn test_far_off_screen_segments_are_clipped() {
        let mut surface = CellSurface::new(10, 2);
        let line = [ScreenPoint::new(-1e12, 1.0), ScreenPoint::new(1e12, 1.0)];
        surface.stroke_polyline(&line, &StrokeStyle::solid(RED, 2.0));
        assert_eq!(row(&surface, 0), "@@@@@@@@@@");

        let outside = [ScreenPoint::new(-1e12, -50.0), ScreenPoint::new(1e12, -50.0)];
        surface.stroke_polyline(&outside, &StrokeStyle::solid(RED, 2.0));
        assert_eq!(row(&surface, 1), "          ");

        let max = ScreenPoint::new(10.0, 4.0);
        let vertical = (ScreenPoint::new(5.0, -20.0), ScreenPoint::new(5.0, 20.0));
        let (top, bottom) = clip_segment(vertical.0, vertical.1, max).unwrap();
        assert!((top.y + 1.0).abs() < 1e-9 && (bottom.y - 4.0).abs() < 1e-9);
        assert_eq!((top.x, bottom.x), (5.0, 5.0));

        let beside = (ScreenPoint::new(20.0, 0.0), ScreenPoint::new(30.0, 0.0));
        assert!(clip_segment(beside.0, beside.1, max).is_none());
    }

    #[test]
    fn test_clip_circle_limits_drawing() {
        let mut surface = CellSurface::new(20, 10);
        surface.push_clip_circle(ScreenPoint::new(10.0, 10.0), 3.0);
        let line = [ScreenPoint::new(0.0, 10.0), ScreenPoint::new(19.0, 10.0)];
        surface.stroke_polyline(&line, &StrokeStyle::solid(RED, 2.0));
        surface.pop_clip();

        let text = row(&surface, 5);
        assert_eq!(text.trim(), "@@@@@@");
        assert_eq!(surface.cell(0, 5).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn test_text_alignment_and_priority() {
        let mut surface = CellSurface::new(11, 2);
        let line = [ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 0.0)];
        surface.stroke_polyline(&line, &StrokeStyle::solid(RED, 2.0));

        let style = TextStyle {
            color: RED,
            size: 10.0,
            bold: false,
        };
        surface.fill_text("15°", ScreenPoint::new(5.0, 0.0), &style, TextAlign::Center);
        assert_eq!(row(&surface, 0), "@@@@15°@@@@");

        surface.fill_text("X", ScreenPoint::new(10.0, 2.0), &style, TextAlign::Right);
        assert_eq!(row(&surface, 1), "         X ");
    }

    #[test]
    fn test_fill_and_background_reset() {
        let mut surface = CellSurface::new(6, 3);
        surface.fill_rect(0.0, 0.0, 2.0, 2.0, RED.with_alpha(0.5));
        assert!(surface.cell(0, 0).and_then(|c| c.fill).is_some());
        assert!(surface.cell(2, 0).and_then(|c| c.fill).is_none());

        surface.fill_background(Color::rgb(0, 0, 0));
        assert_eq!(surface.cell(0, 0), Some(&Cell::BLANK));
        assert_eq!(mix(RED.with_alpha(0.5), Color::rgb(0, 0, 0)), Color::rgb(128, 0, 0));
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let mut surface = CellSurface::new(3, 2);
        surface.fill_background(Color::rgb(10, 20, 30));
        surface.plot(0, 0, 'a', RED, 1.0);

        let mut out = Vec::new();
        surface.draw(&mut out).unwrap();
        let printed = String::from_utf8_lossy(&out);
        assert!(printed.contains('a'));
        assert_eq!(printed.matches(' ').count(), 5);
    }
}
