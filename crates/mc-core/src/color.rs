//! RGBA colors for the theme table.
//!
//! Theme entries are written the way a stylesheet would write them
//! (`#4a6fa5`, `rgba(80, 200, 120, 0.9)`) and parsed with `winnow`.

use crate::error::{CanvasError, Result};
use serde::{Deserialize, Serialize};
use winnow::ascii::{float, multispace0};
use winnow::combinator::{alt, delimited};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::rgba(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 8-bit channels with a unit alpha, the `rgba(…)` convention.
    pub const fn rgb8a(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a)
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn parse(s: &str) -> Result<Self> {
        alt((parse_hex, parse_functional))
            .parse(s.trim())
            .map_err(|_| CanvasError::InvalidColor {
                input: s.to_string(),
            })
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Multiply alpha, e.g. to dim an item during search.
    pub fn fade(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear blend toward `other` by `t` in [0, 1].
    pub fn mix(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Blend toward white, keeping alpha.
    pub fn lighten(self, t: f32) -> Self {
        self.mix(Rgba::WHITE.with_alpha(self.a), t)
    }

    /// Blend toward black, keeping alpha.
    pub fn darken(self, t: f32) -> Self {
        self.mix(Rgba::BLACK.with_alpha(self.a), t)
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// CSS form understood by Canvas2D `fillStyle`.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        let a = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
        format!("rgba({r}, {g}, {b}, {a})")
    }
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn from_hex_digits(hex: &str) -> Option<Rgba> {
    let b = hex.as_bytes();
    let short = |i: usize| hex_val(b[i]).map(|v| v * 17);
    let long = |i: usize| Some(hex_val(b[i])? << 4 | hex_val(b[i + 1])?);
    let [r, g, bl, a] = match b.len() {
        3 => [short(0)?, short(1)?, short(2)?, 255],
        4 => [short(0)?, short(1)?, short(2)?, short(3)?],
        6 => [long(0)?, long(2)?, long(4)?, 255],
        8 => [long(0)?, long(2)?, long(4)?, long(6)?],
        _ => return None,
    };
    Some(Rgba::rgb8a(r, g, bl, a as f32 / 255.0))
}

fn parse_hex(input: &mut &str) -> ModalResult<Rgba> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(3..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    from_hex_digits(digits).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}

fn number(input: &mut &str) -> ModalResult<f32> {
    delimited(multispace0, float, multispace0).parse_next(input)
}

fn parse_functional(input: &mut &str) -> ModalResult<Rgba> {
    let name = alt(("rgba", "rgb")).parse_next(input)?;
    let _ = (multispace0, '(').parse_next(input)?;
    let r = number.parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let g = number.parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let b = number.parse_next(input)?;
    let a = if name == "rgba" {
        let _ = ','.parse_next(input)?;
        number.parse_next(input)?
    } else {
        1.0
    };
    let _ = ')'.parse_next(input)?;
    let channel = |v: f32| v.clamp(0.0, 255.0) / 255.0;
    Ok(Rgba::rgba(channel(r), channel(g), channel(b), a.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_forms() {
        let c = Rgba::parse("#ff0000").unwrap();
        assert_eq!(c.to_rgba8(), [255, 0, 0, 255]);
        let c = Rgba::parse("#0f08").unwrap();
        assert_eq!(c.to_rgba8(), [0, 255, 0, 136]);
        assert!(Rgba::parse("#12345").is_err());
    }

    #[test]
    fn parse_functional_forms() {
        let c = Rgba::parse("rgba(80, 200, 120, 0.9)").unwrap();
        assert_eq!(c.to_rgba8(), [80, 200, 120, 230]);
        let c = Rgba::parse("rgb( 10,20 ,30 )").unwrap();
        assert_eq!(c.to_rgba8(), [10, 20, 30, 255]);
        assert!(Rgba::parse("rgba(1, 2, 3)").is_err());
        assert!(Rgba::parse("hsl(1, 2, 3)").is_err());
    }

    #[test]
    fn css_output() {
        let c = Rgba::rgb8a(255, 215, 0, 0.5);
        assert_eq!(c.to_css(), "rgba(255, 215, 0, 0.5)");
    }

    #[test]
    fn lighten_and_fade() {
        let c = Rgba::rgb8a(0, 0, 0, 0.8);
        let l = c.lighten(0.5);
        assert!((l.r - 0.5).abs() < 1e-6);
        assert!((l.a - 0.8).abs() < 1e-6);
        assert!((c.fade(0.18).a - 0.144).abs() < 1e-6);
    }
}
