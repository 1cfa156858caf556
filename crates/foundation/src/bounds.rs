use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Axis-aligned screen-space bounds in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Bounds2 { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Strict overlap; rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Bounds2) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x, self.max.x.max(self.min.x)),
            p.y.clamp(self.min.y, self.max.y.max(self.min.y)),
        )
    }
}

/// Pixel margins around a viewport, in left/top/right/bottom order.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(px: f64) -> Self {
        Self::new(px, px, px, px)
    }

    pub fn grown_by(&self, px: f64) -> Self {
        Self::new(
            self.left + px,
            self.top + px,
            self.right + px,
            self.bottom + px,
        )
    }

    /// Offset from the viewport center to the center of the area inside the margins.
    pub fn center_shift(&self) -> Vec2 {
        Vec2::new(
            (self.left - self.right) / 2.0,
            (self.top - self.bottom) / 2.0,
        )
    }

    /// The part of a `size` viewport left over once the margins are removed.
    pub fn inner_bounds(&self, size: Vec2) -> Bounds2 {
        Bounds2::new(
            Vec2::new(self.left, self.top),
            Vec2::new(size.x - self.right, size.y - self.bottom),
        )
    }
}
