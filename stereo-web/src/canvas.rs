/// HTML canvas back end for the scene renderer
use stereo_core::{
    Color, ExportError, ExportSurface, ScreenPoint, StrokeStyle, Surface, TextAlign, TextStyle,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// `Surface` over a 2D canvas context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Look up `canvas_id` in the document and take its 2D context
    pub fn from_element_id(canvas_id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("missing canvas #{canvas_id}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Laid-out size of the canvas element in CSS pixels
    pub fn client_size(&self) -> (u32, u32) {
        (
            self.canvas.client_width().max(0) as u32,
            self.canvas.client_height().max(0) as u32,
        )
    }

    fn set_fill(&self, color: Color) {
        let _ = js_sys::Reflect::set(
            self.ctx.as_ref(),
            &JsValue::from_str("fillStyle"),
            &JsValue::from_str(&color.to_css()),
        );
    }

    fn apply_stroke(&self, style: &StrokeStyle) {
        let _ = js_sys::Reflect::set(
            self.ctx.as_ref(),
            &JsValue::from_str("strokeStyle"),
            &JsValue::from_str(&style.color.to_css()),
        );
        self.ctx.set_line_width(style.width);
        let dash = js_sys::Array::new();
        for length in style.dash {
            dash.push(&JsValue::from_f64(*length));
        }
        let _ = self.ctx.set_line_dash(&dash);
    }

    fn circle_path(&self, center: ScreenPoint, radius: f64) {
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x, center.y, radius.max(0.0), 0.0, std::f64::consts::TAU);
    }
}

pub(crate) fn css_font(style: &TextStyle) -> String {
    let weight = if style.bold { "bold " } else { "" };
    format!("{weight}{:.0}px monospace", style.size)
}

pub(crate) fn css_align(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn fill_background(&mut self, color: Color) {
        let (w, h) = self.size();
        self.set_fill(color);
        self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn stroke_circle(&mut self, center: ScreenPoint, radius: f64, style: &StrokeStyle) {
        self.circle_path(center, radius);
        self.apply_stroke(style);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, color: Color) {
        self.circle_path(center, radius);
        self.set_fill(color);
        self.ctx.fill();
    }

    fn push_clip_circle(&mut self, center: ScreenPoint, radius: f64) {
        self.ctx.save();
        self.circle_path(center, radius);
        self.ctx.clip();
    }

    fn pop_clip(&mut self) {
        self.ctx.restore();
    }

    fn stroke_polyline(&mut self, points: &[ScreenPoint], style: &StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.apply_stroke(style);
        self.ctx.stroke();
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &StrokeStyle) {
        self.apply_stroke(style);
        self.ctx.stroke_rect(x, y, width, height);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.set_fill(color);
        self.ctx.fill_rect(x, y, width, height);
    }

    fn fill_text(&mut self, text: &str, at: ScreenPoint, style: &TextStyle, align: TextAlign) {
        self.set_fill(style.color);
        self.ctx.set_font(&css_font(style));
        self.ctx.set_text_align(css_align(align));
        self.ctx.set_text_baseline("middle");
        let _ = self.ctx.fill_text(text, at.x, at.y);
    }
}

impl ExportSurface for CanvasSurface {
    /// PNG data URL
    type Image = String;

    fn encode(&self) -> Result<String, ExportError> {
        self.canvas
            .to_data_url_with_type("image/png")
            .map_err(|e| ExportError::Encode(format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_font() {
        let style = TextStyle {
            color: Color::rgb(0, 0, 0),
            size: 14.14,
            bold: true,
        };
        assert_eq!(css_font(&style), "bold 14px monospace");

        let plain = TextStyle { bold: false, ..style };
        assert_eq!(css_font(&plain), "14px monospace");
    }

    #[test]
    fn test_css_align() {
        assert_eq!(css_align(TextAlign::Center), "center");
        assert_eq!(css_align(TextAlign::Right), "right");
    }
}
