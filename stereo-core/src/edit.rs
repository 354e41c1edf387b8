/// Typed property edits for scene geometry.
///
/// Form inputs arrive as text. Numeric fields never fail: unparseable or
/// non-finite input falls back to the field's default and sizes are clamped
/// to [`MIN_SIZE`]. Names, colors and flags are validated and rejected with
/// an [`EditError`].
use nom::{
    character::complete::multispace0,
    combinator::all_consuming,
    number::complete::double,
    sequence::delimited,
    IResult,
};
use thiserror::Error;

use crate::color::{Color, ColorError};
use crate::geometry::{CubeGeometry, GeometryId, GeometryItem, MIN_SIZE};
use crate::transform::Axis;

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("no geometry with id {0}")]
    UnknownGeometry(GeometryId),

    #[error("unknown property `{0}`")]
    UnknownField(String),

    #[error("expected true or false for `{field}`, got `{value}`")]
    InvalidFlag { field: String, value: String },

    #[error(transparent)]
    Color(#[from] ColorError),
}

/// One property change on a cube
#[derive(Debug, Clone, PartialEq)]
pub enum CubeUpdate {
    Name(String),
    Color(Color),
    Center(Axis, f64),
    Size(Axis, f64),
    /// Rotation about one local axis, in degrees
    RotationDegrees(Axis, f64),
    Visible(bool),
    EdgeGuides(bool),
    FullGuide(bool),
}

/// Property change addressed to a geometry kind
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryUpdate {
    Cube(CubeUpdate),
}

impl CubeUpdate {
    /// Build an update from a form field name and its raw text.
    ///
    /// Field names are `name`, `color`, `visible`, `edge_guides`,
    /// `full_guide`, or `center.<axis>`, `size.<axis>`, `rotation.<axis>`.
    pub fn parse(field: &str, value: &str) -> Result<Self, EditError> {
        if let Some((group, axis)) = field.split_once('.') {
            let axis = Axis::from_letter(axis)
                .ok_or_else(|| EditError::UnknownField(field.to_string()))?;
            let number = parse_number(value);
            return match group {
                "center" => Ok(CubeUpdate::Center(axis, number.unwrap_or(0.0))),
                "size" => Ok(CubeUpdate::Size(axis, number.unwrap_or(MIN_SIZE))),
                "rotation" => Ok(CubeUpdate::RotationDegrees(axis, number.unwrap_or(0.0))),
                _ => Err(EditError::UnknownField(field.to_string())),
            };
        }

        match field {
            "name" => Ok(CubeUpdate::Name(value.to_string())),
            "color" => Ok(CubeUpdate::Color(Color::parse(value)?)),
            "visible" => parse_flag(field, value).map(CubeUpdate::Visible),
            "edge_guides" => parse_flag(field, value).map(CubeUpdate::EdgeGuides),
            "full_guide" => parse_flag(field, value).map(CubeUpdate::FullGuide),
            _ => Err(EditError::UnknownField(field.to_string())),
        }
    }

    /// Merge into `cube`, coercing values to their valid ranges
    pub fn apply(self, cube: &mut CubeGeometry) {
        match self {
            CubeUpdate::Name(name) => cube.name = name,
            CubeUpdate::Color(color) => cube.color = color,
            CubeUpdate::Center(axis, value) => {
                axis.set_component(&mut cube.center, finite_or(value, 0.0));
            }
            CubeUpdate::Size(axis, value) => {
                let size = finite_or(value, MIN_SIZE).max(MIN_SIZE);
                axis.set_component(&mut cube.size, size);
            }
            CubeUpdate::RotationDegrees(axis, degrees) => {
                cube.rotation.set(axis, finite_or(degrees, 0.0).to_radians());
            }
            CubeUpdate::Visible(visible) => cube.visible = visible,
            CubeUpdate::EdgeGuides(on) => cube.show_edge_guides = on,
            CubeUpdate::FullGuide(on) => cube.show_full_guide = on,
        }
    }
}

impl GeometryUpdate {
    pub fn apply(self, item: &mut GeometryItem) {
        match (self, item) {
            (GeometryUpdate::Cube(update), GeometryItem::Cube(cube)) => update.apply(cube),
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn number(input: &str) -> IResult<&str, f64> {
    all_consuming(delimited(multispace0, double, multispace0))(input)
}

/// Parse a numeric form value; `None` for anything that is not a finite number
pub fn parse_number(input: &str) -> Option<f64> {
    number(input)
        .ok()
        .map(|(_, value)| value)
        .filter(|value| value.is_finite())
}

fn parse_flag(field: &str, value: &str) -> Result<bool, EditError> {
    match value.trim() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(EditError::InvalidFlag {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn cube() -> CubeGeometry {
        CubeGeometry::new(GeometryId(7), "Cube 1", Color::rgb(1, 2, 3))
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1.5"), Some(1.5));
        assert_eq!(parse_number("  -2e1 "), Some(-20.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("3 apples"), None);
    }

    #[test]
    fn test_numeric_fields_coerce() {
        let mut cube = cube();
        CubeUpdate::parse("center.y", "oops").unwrap().apply(&mut cube);
        assert_eq!(cube.center.y, 0.0);

        CubeUpdate::parse("size.x", "-4").unwrap().apply(&mut cube);
        assert_eq!(cube.size.x, MIN_SIZE);

        CubeUpdate::parse("size.z", "").unwrap().apply(&mut cube);
        assert_eq!(cube.size.z, MIN_SIZE);

        CubeUpdate::parse("rotation.z", "90").unwrap().apply(&mut cube);
        assert!((cube.rotation.z - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        CubeUpdate::Center(Axis::X, f64::INFINITY).apply(&mut cube);
        assert_eq!(cube.center, Vector3::zeros());
    }

    #[test]
    fn test_flags_and_color() {
        let mut cube = cube();
        CubeUpdate::parse("visible", "false").unwrap().apply(&mut cube);
        CubeUpdate::parse("full_guide", "on").unwrap().apply(&mut cube);
        CubeUpdate::parse("color", "#22d3ee").unwrap().apply(&mut cube);

        assert!(!cube.visible);
        assert!(cube.show_full_guide);
        assert_eq!(cube.color, Color::rgb(0x22, 0xd3, 0xee));
    }

    #[test]
    fn test_rejected_edits() {
        assert_eq!(
            CubeUpdate::parse("center.w", "1"),
            Err(EditError::UnknownField("center.w".to_string()))
        );
        assert_eq!(
            CubeUpdate::parse("mass", "1"),
            Err(EditError::UnknownField("mass".to_string()))
        );
        assert!(matches!(
            CubeUpdate::parse("visible", "maybe"),
            Err(EditError::InvalidFlag { .. })
        ));
        assert!(matches!(
            CubeUpdate::parse("color", "pinkish"),
            Err(EditError::Color(_))
        ));
    }

    #[test]
    fn test_geometry_update_dispatch() {
        let mut item = GeometryItem::Cube(cube());
        GeometryUpdate::Cube(CubeUpdate::Name("Tower".into())).apply(&mut item);
        assert_eq!(item.name(), "Tower");
    }
}
