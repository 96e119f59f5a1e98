//! CSS color normalization
//!
//! Parsing goes through lightningcss, so anything it accepts as a
//! `<color>` resolves: named colors, hex, `rgb()`, `hsl()`, `hwb()`,
//! `lab()`/`lch()`, `oklab()`/`oklch()` and `color()`. Results are
//! converted to sRGB with 8-bit channels.

use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use std::fmt;

/// An sRGB color with 8-bit channels and a 0..=1 alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Channels as an `[r, g, b]` triple
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Parse a CSS color; `None` for anything the host would reject
///
/// `currentcolor` and system colors have no fixed value and yield `None`.
pub fn parse_color(input: &str) -> Option<Rgba> {
    let color = CssColor::parse_string(input.trim()).ok()?;
    match color.to_rgb() {
        Ok(CssColor::RGBA(rgba)) => Some(Rgba {
            r: rgba.red,
            g: rgba.green,
            b: rgba.blue,
            a: (f64::from(rgba.alpha).clamp(0.0, 1.0) * 1000.0).round() / 1000.0,
        }),
        _ => {
            tracing::trace!("No sRGB value for color '{}'", input);
            None
        }
    }
}
