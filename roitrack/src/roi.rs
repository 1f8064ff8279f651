//! Region-of-interest rectangles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned region in pixel coordinates, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Roi {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Roi {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the region covers no pixels
    pub fn is_empty(&self) -> bool {
        !(self.width >= 1.0 && self.height >= 1.0)
    }

    /// Intersect with the frame `[0, width) x [0, height)`
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x1 = self.x.max(0.0);
        let y1 = self.y.max(0.0);
        let x2 = self.right().min(width as f32);
        let y2 = self.bottom().min(height as f32);

        Self {
            x: x1,
            y: y1,
            width: (x2 - x1).max(0.0),
            height: (y2 - y1).max(0.0),
        }
    }

    /// Integer pixel rectangle (x, y, w, h), rounded like OpenCV's `Rect2d -> Rect`
    pub fn to_pixels(&self) -> (i32, i32, u32, u32) {
        (
            self.x.round() as i32,
            self.y.round() as i32,
            self.width.round().max(0.0) as u32,
            self.height.round().max(0.0) as u32,
        )
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Roi({:.1}, {:.1}, {:.1}x{:.1})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Parses `x,y,w,h`
impl FromStr for Roi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid region '{}': {}", s, e))?;

        match values.as_slice() {
            [x, y, w, h] if *w >= 0.0 && *h >= 0.0 => Ok(Roi::new(*x, *y, *w, *h)),
            [_, _, _, _] => Err(format!("region '{}' has a negative size", s)),
            _ => Err(format!("region '{}' must have the form x,y,w,h", s)),
        }
    }
}
