//! Center-origin placement of a layer and the local/global frame conversions.
//!
//! A layer's local frame has its origin at the layer center, x to the right and y
//! down, rotated by `rotation` radians (clockwise in screen space). The layer covers
//! `[-w/2, w/2] x [-h/2, h/2]` in its local frame.

use crate::foundation::core::{Affine, Point, Rect, Vec2};

/// Position, size and rotation of a layer in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians; any real value.
    #[serde(default)]
    pub rotation: f64,
}

impl Placement {
    pub fn new(center: Point, width: f64, height: f64) -> Self {
        Self {
            x: center.x,
            y: center.y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_center(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    pub fn half_extent(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Local-frame bounds, centered on the origin.
    pub fn local_rect(&self) -> Rect {
        let h = self.half_extent();
        Rect::new(-h.x, -h.y, h.x, h.y)
    }

    /// Local-to-canvas transform: rotate about the origin, then translate to the center.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::rotate(self.rotation)
    }

    /// Convert a canvas point into this placement's local frame.
    pub fn to_local(&self, global: Point) -> Point {
        let (sin, cos) = self.rotation.sin_cos();
        let dx = global.x - self.x;
        let dy = global.y - self.y;
        Point::new(dx * cos + dy * sin, -dx * sin + dy * cos)
    }

    /// Convert a local-frame point back into canvas coordinates.
    pub fn to_global(&self, local: Point) -> Point {
        let (sin, cos) = self.rotation.sin_cos();
        Point::new(
            self.x + local.x * cos - local.y * sin,
            self.y + local.x * sin + local.y * cos,
        )
    }

    /// Rotate a local-frame vector into canvas orientation (no translation).
    pub fn rotate_vec(&self, v: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
    }

    /// Edge-inclusive containment test in the local frame.
    pub fn contains(&self, global: Point) -> bool {
        let l = self.to_local(global);
        let h = self.half_extent();
        l.x.abs() <= h.x && l.y.abs() <= h.y
    }

    /// Axis-aligned canvas bounds of the rotated rectangle.
    pub fn bounding_box(&self) -> Rect {
        let r = self.local_rect();
        let corners = [
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x0, r.y1),
            Point::new(r.x1, r.y1),
        ]
        .map(|p| self.to_global(p));
        let mut out = Rect::from_points(corners[0], corners[1]);
        out = out.union_pt(corners[2]);
        out.union_pt(corners[3])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/placement.rs"]
mod tests;
