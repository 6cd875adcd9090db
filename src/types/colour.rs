//! Renderer tint colour and parsing.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CharexError, Result};

/// A multiplicative RGBA tint, each channel in `0.0..=1.0`.
///
/// This is the colour a sprite renderer multiplies its sprite by. White
/// (all ones) leaves pixels untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Tint {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// The identity tint.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Check whether the tint is (within rounding) the identity.
    pub fn is_identity(&self) -> bool {
        const EPS: f32 = 0.001;
        (self.r - 1.0).abs() < EPS
            && (self.g - 1.0).abs() < EPS
            && (self.b - 1.0).abs() < EPS
            && (self.a - 1.0).abs() < EPS
    }

    /// Multiply one RGBA pixel by the tint.
    pub fn apply(&self, px: [u8; 4]) -> [u8; 4] {
        let mul = |c: u8, f: f32| (c as f32 * f).round().clamp(0.0, 255.0) as u8;
        [
            mul(px[0], self.r),
            mul(px[1], self.g),
            mul(px[2], self.b),
            mul(px[3], self.a),
        ]
    }

    /// Parse a hex tint string.
    ///
    /// Supports `#RRGGBB` and `#RRGGBBAA`, with or without the `#`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);

        let channel = |range: std::ops::Range<usize>| -> Result<f32> {
            let byte = hex
                .get(range)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| invalid_hex(s))?;
            Ok(byte as f32 / 255.0)
        };

        match hex.len() {
            6 => Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0)),
            8 => Ok(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(invalid_hex(s)),
        }
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Tint {
    type Err = CharexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Tint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }
}

fn invalid_hex(s: &str) -> CharexError {
    CharexError::Config {
        message: format!("Invalid hex tint: {}", s),
        help: Some("Use #RRGGBB or #RRGGBBAA format".to_string()),
    }
}
