/// Dark and light drawing palettes
use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    /// Longitude arcs
    pub grid_longitude: Color,
    pub axis_longitude: Color,
    /// Latitude arcs
    pub grid_latitude: Color,
    pub axis_latitude: Color,
    pub label: Color,
    pub boundary: Color,
    pub selection_stroke: Color,
    pub selection_fill: Color,
    pub geometry_default: Color,
    pub gizmo_x: Color,
    pub gizmo_y: Color,
    pub gizmo_z: Color,
    pub gizmo_center: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color::rgb(0x0f, 0x17, 0x2a),
            grid_longitude: Color::rgb(16, 185, 129).with_alpha(0.2),
            axis_longitude: Color::rgb(0x10, 0xb9, 0x81),
            grid_latitude: Color::rgb(239, 68, 68).with_alpha(0.2),
            axis_latitude: Color::rgb(0xef, 0x44, 0x44),
            label: Color::rgb(0x3b, 0x82, 0xf6),
            boundary: Color::rgb(0x33, 0x41, 0x55),
            selection_stroke: Color::rgb(0xf4, 0x72, 0xb6),
            selection_fill: Color::rgb(244, 114, 182).with_alpha(0.1),
            geometry_default: Color::rgb(0xf4, 0x72, 0xb6),
            gizmo_x: Color::rgb(0xef, 0x44, 0x44),
            gizmo_y: Color::rgb(0x22, 0xc5, 0x5e),
            gizmo_z: Color::rgb(0x3b, 0x82, 0xf6),
            gizmo_center: Color::rgb(255, 255, 255),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::rgb(0xf8, 0xfa, 0xfc),
            grid_longitude: Color::rgb(5, 150, 105).with_alpha(0.4),
            axis_longitude: Color::rgb(0x05, 0x96, 0x69),
            grid_latitude: Color::rgb(220, 38, 38).with_alpha(0.4),
            axis_latitude: Color::rgb(0xdc, 0x26, 0x26),
            label: Color::rgb(0x25, 0x63, 0xeb),
            boundary: Color::rgb(0xcb, 0xd5, 0xe1),
            selection_stroke: Color::rgb(0xf4, 0x72, 0xb6),
            selection_fill: Color::rgb(244, 114, 182).with_alpha(0.1),
            geometry_default: Color::rgb(0xdb, 0x27, 0x77),
            gizmo_x: Color::rgb(0xef, 0x44, 0x44),
            gizmo_y: Color::rgb(0x16, 0xa3, 0x4a),
            gizmo_z: Color::rgb(0x3b, 0x82, 0xf6),
            gizmo_center: Color::rgb(0, 0, 0),
        }
    }

    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }
}
