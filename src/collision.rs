//! Axis-aligned box overlap tests.
//!
//! The detector only answers "do these two rectangles overlap"; what happens
//! afterwards is decided by the driver in `compute`.

use crate::vector::Vector;

/// Rectangle used for collision purposes, top-left anchored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Collider {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Collider { x, y, width, height }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Vector {
        Vector::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Strict AABB test: boxes that only share an edge do not overlap.
pub fn overlap(a: &Collider, b: &Collider) -> bool {
    a.right() > b.left() && a.left() < b.right() && a.bottom() > b.top() && a.top() < b.bottom()
}

/// Depth of the overlap along each axis, or `None` when the boxes are apart.
pub fn penetration(a: &Collider, b: &Collider) -> Option<Vector> {
    if !overlap(a, b) {
        return None;
    }
    let depth_x = a.right().min(b.right()) - a.left().max(b.left());
    let depth_y = a.bottom().min(b.bottom()) - a.top().max(b.top());
    Some(Vector::new(depth_x, depth_y))
}
