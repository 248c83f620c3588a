// Copyright 2017 Matthew Plant. This file is part of Cosserat Contact.
//
// Cosserat Contact is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Cosserat Contact is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Cosserat Contact. If not, see <http://www.gnu.org/licenses/>.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

/// Squared lengths and distances at or below this value are treated as zero.
pub const COLLISION_EPSILON: f64 = 1.0e-12;

/// Two edges are parallel when `1 - cos²θ` between them falls below this
/// value.
pub const PARALLEL_EPSILON: f64 = 1.0e-6;

/// Dot product of two vectors.
#[inline(always)]
pub fn dot(a: Vector3<f64>, b: Vector3<f64>) -> f64 {
    a.dot(b)
}

/// Euclidean length of a vector.
#[inline(always)]
pub fn norm(a: Vector3<f64>) -> f64 {
    a.magnitude()
}

/// Clamps `x` into `[low, high]`.
#[inline(always)]
pub fn clip(x: f64, low: f64, high: f64) -> f64 {
    if x < low {
        low
    } else if x > high {
        high
    } else {
        x
    }
}

/// Returns true if `x` lies outside of `[low, high]`.
#[inline(always)]
pub fn out_of_bounds(x: f64, low: f64, high: f64) -> bool {
    x < low || x > high
}

/// Segments are two end points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
}

/// A sphere swept along a line. Rod elements and the axis of a rigid
/// cylinder are both described this way.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Capsule {
    pub a: Point3<f64>,  // Line start
    pub d: Vector3<f64>, // Line direction, not normalized
    pub r: f64,
}

impl Capsule {
    /// Midpoint of the capsule's axis.
    pub fn center(&self) -> Point3<f64> {
        self.a + self.d * 0.5
    }
}

/// Axis Aligned Bounding Boxes are closed boxes aligned to the axes of the
/// coordinate system. AABBs are described by a point and three half widths.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub c: Point3<f64>,
    pub r: Vector3<f64>,
}

impl AABB {
    /// Construct the box spanning `lower` to `upper`.
    pub fn from_extents(lower: Point3<f64>, upper: Point3<f64>) -> Self {
        AABB {
            c: Point3::from_vec((lower.to_vec() + upper.to_vec()) * 0.5),
            r: (upper - lower) * 0.5,
        }
    }

    pub fn lower(&self) -> Point3<f64> {
        self.c - self.r
    }

    pub fn upper(&self) -> Point3<f64> {
        self.c + self.r
    }
}

/// The pair of closest points between two geometries.
///
/// `min_dist` always points from `a` to `b`, i.e. `min_dist == b - a`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClosestPoints {
    pub min_dist: Vector3<f64>,
    pub a: Point3<f64>,
    pub b: Point3<f64>,
}

impl ClosestPoints {
    fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        ClosestPoints { min_dist: b - a, a, b }
    }
}

/// Often times we want to determine how close to objects are, or what pair of
/// points on their surfaces are closest.
pub trait MinDistance<To = Point3<f64>, Result = Point3<f64>> {
    fn min_dist(&self, to: &To) -> Result;
}

impl MinDistance<Point3<f64>> for Segment {
    /// Returns closest point on segment to q
    fn min_dist(&self, q: &Point3<f64>) -> Point3<f64> {
        let ab = self.b - self.a;
        let t = ab.dot(q - self.a);
        if t <= 0.0 {
            self.a
        } else {
            let denom = ab.dot(ab);
            if t >= denom {
                self.b
            } else {
                self.a + ab * (t / denom)
            }
        }
    }
}

impl MinDistance<Capsule, ClosestPoints> for Capsule {
    /// Closest points between the two capsule axes. Radii are not taken into
    /// account.
    fn min_dist(&self, to: &Capsule) -> ClosestPoints {
        closest_points_between_segments(self.a, self.d, to.a, to.d)
    }
}

/// Finds the closest points between segment A, starting at `x1` and spanning
/// `e1`, and segment B, starting at `x2` and spanning `e2`.
///
/// Solves the 2×2 normal equations for the parameters `s` (on A) and `t` (on
/// B). When the solution leaves the unit square the minimum lies on one of
/// the four boundary edges, each of which is checked. Parallel edges clamp
/// `s` first and solve for `t`, and zero-length edges reduce to a point
/// against a segment. None of the degenerate cases divide by zero.
pub fn closest_points_between_segments(
    x1: Point3<f64>,
    e1: Vector3<f64>,
    x2: Point3<f64>,
    e2: Vector3<f64>,
) -> ClosestPoints {
    let e1e1 = e1.dot(e1);
    let e2e2 = e2.dot(e2);
    let seg_a = Segment { a: x1, b: x1 + e1 };
    let seg_b = Segment { a: x2, b: x2 + e2 };

    if e1e1 <= COLLISION_EPSILON {
        if e2e2 <= COLLISION_EPSILON {
            return ClosestPoints::new(x1, x2);
        }
        let q: Point3<f64> = seg_b.min_dist(&x1);
        return ClosestPoints::new(x1, q);
    }
    if e2e2 <= COLLISION_EPSILON {
        let q: Point3<f64> = seg_a.min_dist(&x2);
        return ClosestPoints::new(q, x2);
    }

    let r = x2 - x1;
    let e1e2 = e1.dot(e2);
    let re1 = r.dot(e1);
    let re2 = r.dot(e2);

    let parallel = (1.0 - e1e2 * e1e2 / (e1e1 * e2e2)).abs() < PARALLEL_EPSILON;
    let (s, t) = if parallel {
        let s = clip(re1 / e1e1, 0.0, 1.0);
        (s, clip((s * e1e2 - re2) / e2e2, 0.0, 1.0))
    } else {
        let denom = e1e1 * e2e2 - e1e2 * e1e2;
        let s = (re1 * e2e2 - e1e2 * re2) / denom;
        let t = (e1e2 * re1 - e1e1 * re2) / denom;
        if out_of_bounds(s, 0.0, 1.0) || out_of_bounds(t, 0.0, 1.0) {
            boundary_minimum(x1, e1, x2, e2, e1e1, e2e2, e1e2, re1, re2)
        } else {
            (s, t)
        }
    };

    ClosestPoints::new(x1 + e1 * s, x2 + e2 * t)
}

/// Minimum over the four edges of the parameter square. Ties keep the
/// earlier candidate.
#[allow(clippy::too_many_arguments)]
fn boundary_minimum(
    x1: Point3<f64>,
    e1: Vector3<f64>,
    x2: Point3<f64>,
    e2: Vector3<f64>,
    e1e1: f64,
    e2e2: f64,
    e1e2: f64,
    re1: f64,
    re2: f64,
) -> (f64, f64) {
    // t = 0: start of B against A
    let s = clip(re1 / e1e1, 0.0, 1.0);
    let mut best = (s, 0.0);
    let mut best_dist = (x1 + e1 * s - x2).magnitude();

    // t = 1: end of B against A
    let s = clip((re1 + e1e2) / e1e1, 0.0, 1.0);
    let dist = (x1 + e1 * s - (x2 + e2)).magnitude();
    if dist < best_dist {
        best = (s, 1.0);
        best_dist = dist;
    }

    // s = 0: start of A against B
    let t = clip(-re2 / e2e2, 0.0, 1.0);
    let dist = (x2 + e2 * t - x1).magnitude();
    if dist < best_dist {
        best = (0.0, t);
        best_dist = dist;
    }

    // s = 1: end of A against B
    let t = clip((e1e2 - re2) / e2e2, 0.0, 1.0);
    let dist = (x2 + e2 * t - (x1 + e1)).magnitude();
    if dist < best_dist {
        best = (1.0, t);
    }

    best
}
