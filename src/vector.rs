//! 2D vector used for positions, sizes and velocities.
//!
//! Every operation returns a new value; nothing here mutates in place.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    /// Unit vector pointing at `radians`, measured from the +x axis towards +y.
    pub fn from_angle(radians: f64) -> Self {
        Vector::new(radians.cos(), radians.sin())
    }

    pub fn plus(self, other: Vector) -> Self {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    pub fn minus(self, other: Vector) -> Self {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    pub fn times(self, factor: f64) -> Self {
        Vector::new(self.x * factor, self.y * factor)
    }

    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Same direction with length 1.  The zero vector stays zero.
    pub fn normalize(self) -> Self {
        let len = self.magnitude();
        if len == 0.0 {
            return Vector::ZERO;
        }
        Vector::new(self.x / len, self.y / len)
    }

    pub fn distance_to(self, point: Vector) -> f64 {
        point.minus(self).magnitude()
    }

    pub fn direction_to(self, point: Vector) -> Self {
        point.minus(self).normalize()
    }

    /// Heading in radians (`atan2(y, x)`).
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        self.plus(rhs)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        self.minus(rhs)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self.times(rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.times(-1.0)
    }
}
