//! Positional payload of an anchor.
//!
//! A translation is whatever the AR session reported for the anchor's pose,
//! in whatever frame the session was using at capture time. Waymark only
//! ever subtracts, adds and measures these; it never reinterprets the frame.

use crate::error::ParseTranslationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// A 3D translation in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Translation {
    /// The zero offset.
    pub const ZERO: Translation = Translation {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a translation from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length of the offset.
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Straight-line distance to another translation.
    pub fn distance(&self, other: &Translation) -> f32 {
        (*self - *other).length()
    }

    /// True when no component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Translation {
    type Output = Translation;

    fn add(self, rhs: Translation) -> Translation {
        Translation::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Translation {
    type Output = Translation;

    fn sub(self, rhs: Translation) -> Translation {
        Translation::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Translation {
    type Output = Translation;

    fn neg(self) -> Translation {
        Translation::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Translation {
    type Err = ParseTranslationError;

    /// Parses `"x,y,z"`. Whitespace around components is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseTranslationError::WrongArity(parts.len()));
        }

        let mut components = [0.0f32; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            let value: f32 = part
                .parse()
                .map_err(|_| ParseTranslationError::InvalidComponent(part.to_string()))?;
            if !value.is_finite() {
                return Err(ParseTranslationError::NonFinite(part.to_string()));
            }
            *slot = value;
        }

        Ok(Translation::new(components[0], components[1], components[2]))
    }
}
