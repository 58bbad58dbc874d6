//! Axis-aligned rectangle with float origin and size
//!
//! Screen-space convention: the origin is the top-left corner and y grows
//! downward, so `bottom() > top()` for any non-degenerate rect.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0, "negative rect extents");
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns this rect translated by `amount`
    pub fn offset_by(&self, amount: Vec2) -> Self {
        Self {
            x: self.x + amount.x,
            y: self.y + amount.y,
            ..*self
        }
    }

    /// Boolean overlap test; rects that merely touch along an edge count
    pub fn intersects(&self, other: &RectF) -> bool {
        !(self.left() > other.right()
            || self.right() < other.left()
            || self.top() > other.bottom()
            || self.bottom() < other.top())
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Signed overlap vector between two intersecting rects.
    ///
    /// The sign of each component says which side `other` is on relative to
    /// `self` (positive x: other is to the right, positive y: other is
    /// below); the magnitude is the penetration depth on that axis. Returns
    /// `None` when the rects do not intersect. Centers that coincide exactly
    /// on an axis yield a zero component on that axis.
    pub fn overlap(&self, other: &RectF) -> Option<Vec2> {
        if !self.intersects(other) {
            return None;
        }

        let delta = other.center() - self.center();
        let half = self.size() / 2.0;
        let other_half = other.size() / 2.0;

        Some(Vec2::new(
            axis_sign(delta.x) * (half.x + other_half.x - delta.x.abs()),
            axis_sign(delta.y) * (half.y + other_half.y - delta.y.abs()),
        ))
    }
}

#[inline]
fn axis_sign(d: f32) -> f32 {
    if d > 0.0 {
        1.0
    } else if d < 0.0 {
        -1.0
    } else {
        0.0
    }
}
