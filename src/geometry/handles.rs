use crate::foundation::core::Point;
use crate::geometry::placement::Placement;

/// One of the four resize handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Unit direction of the corner in the local frame: `(-1|1, -1|1)`.
    pub fn signs(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }

    pub fn local_position(self, placement: &Placement) -> Point {
        let (sx, sy) = self.signs();
        Point::new(sx * placement.width / 2.0, sy * placement.height / 2.0)
    }

    pub fn global_position(self, placement: &Placement) -> Point {
        placement.to_global(self.local_position(placement))
    }
}

/// Handle geometry in canvas pixels (already multiplied by the device pixel ratio).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleMetrics {
    /// Chebyshev distance around a corner that grabs it.
    pub corner_hit: f64,
    /// Side of the drawn corner square.
    pub corner_size: f64,
    /// Distance of the rotation handle above the top edge.
    pub rotate_offset: f64,
    pub rotate_radius: f64,
    /// Radius around the rotation handle that grabs it.
    pub rotate_hit: f64,
    pub dash: f64,
    pub outline_width: f64,
}

impl HandleMetrics {
    pub fn rotation_handle_local(&self, placement: &Placement) -> Point {
        Point::new(0.0, -placement.height / 2.0 - self.rotate_offset)
    }

    pub fn rotation_handle_global(&self, placement: &Placement) -> Point {
        placement.to_global(self.rotation_handle_local(placement))
    }

    pub fn hits_rotation_handle(&self, placement: &Placement, p: Point) -> bool {
        self.rotation_handle_global(placement).distance(p) <= self.rotate_hit
    }

    pub fn corner_at(&self, placement: &Placement, p: Point) -> Option<Corner> {
        Corner::ALL.into_iter().find(|c| {
            let cp = c.global_position(placement);
            (p.x - cp.x).abs() <= self.corner_hit && (p.y - cp.y).abs() <= self.corner_hit
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/handles.rs"]
mod tests;
