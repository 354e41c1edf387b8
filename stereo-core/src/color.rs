/// RGBA colors and the CSS color strings the editor exchanges
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while_m_n},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map_opt, opt},
    number::complete::double,
    sequence::{delimited, preceded},
    IResult,
};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("unrecognized color `{0}`")]
pub struct ColorError(pub String);

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a fractional opacity in `[0, 1]`
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: unit_to_byte(alpha),
            ..self
        }
    }

    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(..)` or `rgba(..)`
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        match all_consuming(delimited(multispace0, parse_color, multispace0))(input) {
            Ok((_, color)) => Ok(color),
            Err(_) => Err(ColorError(input.to_string())),
        }
    }

    /// CSS form understood by canvas style setters
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.alpha()
            )
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn unit_to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn channel_to_byte(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

fn parse_color(input: &str) -> IResult<&str, Color> {
    alt((parse_hex, parse_functional))(input)
}

fn hex_digits(input: &str) -> IResult<&str, &str> {
    take_while_m_n(3, 8, |c: char| c.is_ascii_hexdigit())(input)
}

fn parse_hex(input: &str) -> IResult<&str, Color> {
    let (input, _) = char('#')(input)?;
    map_opt(hex_digits, hex_to_color)(input)
}

fn hex_to_color(digits: &str) -> Option<Color> {
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    let nibble = |s: &str| u8::from_str_radix(s, 16).ok().map(|n| n * 17);

    match digits.len() {
        3 => Some(Color::rgb(
            nibble(&digits[0..1])?,
            nibble(&digits[1..2])?,
            nibble(&digits[2..3])?,
        )),
        6 => Some(Color::rgb(
            byte(&digits[0..2])?,
            byte(&digits[2..4])?,
            byte(&digits[4..6])?,
        )),
        8 => Some(Color::rgba(
            byte(&digits[0..2])?,
            byte(&digits[2..4])?,
            byte(&digits[4..6])?,
            byte(&digits[6..8])?,
        )),
        _ => None,
    }
}

fn parse_component(input: &str) -> IResult<&str, f64> {
    preceded(multispace0, double)(input)
}

fn parse_separator(input: &str) -> IResult<&str, char> {
    preceded(multispace0, char(','))(input)
}

fn parse_functional(input: &str) -> IResult<&str, Color> {
    let (input, _) = alt((tag_no_case("rgba"), tag_no_case("rgb")))(input)?;
    let (input, _) = preceded(multispace0, tag("("))(input)?;
    let (input, r) = parse_component(input)?;
    let (input, _) = parse_separator(input)?;
    let (input, g) = parse_component(input)?;
    let (input, _) = parse_separator(input)?;
    let (input, b) = parse_component(input)?;
    let (input, a) = opt(preceded(parse_separator, parse_component))(input)?;
    let (input, _) = preceded(multispace0, tag(")"))(input)?;

    let alpha = unit_to_byte(a.unwrap_or(1.0));
    Ok((
        input,
        Color::rgba(
            channel_to_byte(r),
            channel_to_byte(g),
            channel_to_byte(b),
            alpha,
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse("#f472b6"), Ok(Color::rgb(0xf4, 0x72, 0xb6)));
        assert_eq!(Color::parse("#FFF"), Ok(Color::rgb(255, 255, 255)));
        assert_eq!(
            Color::parse("#10b98180"),
            Ok(Color::rgba(0x10, 0xb9, 0x81, 0x80))
        );
        assert_eq!(Color::parse("  #000000 "), Ok(Color::rgb(0, 0, 0)));
    }

    #[test]
    fn test_parse_functional_forms() {
        assert_eq!(
            Color::parse("rgba(71, 85, 105, 0.5)"),
            Ok(Color::rgba(71, 85, 105, 128))
        );
        assert_eq!(Color::parse("rgb(1,2,3)"), Ok(Color::rgb(1, 2, 3)));
        assert_eq!(Color::parse("RGB( 300 , 0 , 0 )"), Ok(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "#12", "#1234", "#gggggg", "rgb(1,2)", "pink", "#fff extra"] {
            assert!(Color::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_css_round_trip() {
        let color = Color::rgb(0x22, 0xd3, 0xee);
        assert_eq!(color.to_css(), "#22d3ee");
        assert_eq!(Color::parse(&color.to_css()), Ok(color));

        let faded = color.with_alpha(0.5);
        assert_eq!(faded.a, 128);
        assert_eq!(faded.to_css(), "rgba(34, 211, 238, 0.502)");
    }
}
