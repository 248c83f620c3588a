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

use std::ops::Neg;

use cgmath::{InnerSpace, Point3, Vector3, Zero};

use crate::geom::*;

/// A type that can overlap another.
///
/// Overlaps is the most simple form of discrete collision detection and is
/// the only predicate used by the broad phase.
pub trait Overlaps<RHS> {
    /// Returns true if the two objects overlap and false otherwise.
    fn overlaps(&self, rhs: &RHS) -> bool;
}

impl Overlaps<AABB> for AABB {
    /// Boxes that merely touch are considered overlapping.
    fn overlaps(&self, rhs: &AABB) -> bool {
        (self.c.x - rhs.c.x).abs() <= (self.r.x + rhs.r.x)
            && (self.c.y - rhs.c.y).abs() <= (self.r.y + rhs.r.y)
            && (self.c.z - rhs.c.z).abs() <= (self.r.z + rhs.r.z)
    }
}

/// Separating axis test on the three coordinate axes. Returns false as soon
/// as the boxes are disjoint along any axis.
#[inline(always)]
pub fn segment_bounding_box_overlap(a: &AABB, b: &AABB) -> bool {
    a.overlaps(b)
}

/// A point of contact between two capsules.
///
/// The contact points lie on the capsule axes, not on their surfaces, so that
/// they can serve directly as moment arm end points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// Closest point on the axis of the collider.
    pub a: Point3<f64>,
    /// Closest point on the axis of the collidee.
    pub b: Point3<f64>,
    /// Vector from `a` to `b`.
    pub min_dist: Vector3<f64>,
    /// Unit normal from `a` towards `b`. Zero when the axes intersect.
    pub n: Vector3<f64>,
    /// Sum of radii minus axis separation. Always positive.
    pub penetration: f64,
}

impl Neg for Contact {
    type Output = Contact;

    /// Negate the normal and swap contact points
    fn neg(self) -> Self {
        Contact {
            a: self.b,
            b: self.a,
            min_dist: -self.min_dist,
            n: -self.n,
            ..self
        }
    }
}

/// A type that can produce a point of contact with another.
pub trait Contacts<RHS> {
    /// Returns the contact if the two objects interpenetrate.
    fn contact(&self, rhs: &RHS) -> Option<Contact>;
}

impl Contacts<Capsule> for Capsule {
    fn contact(&self, rhs: &Capsule) -> Option<Contact> {
        let ClosestPoints { min_dist, a, b } = self.min_dist(rhs);
        let dist = min_dist.magnitude();
        let penetration = (self.r + rhs.r) - dist;
        if !(penetration > 0.0) {
            return None;
        }
        // Coincident axes have no defined normal.
        let n = if dist * dist > COLLISION_EPSILON {
            min_dist / dist
        } else {
            Vector3::zero()
        };
        Some(Contact { a, b, min_dist, n, penetration })
    }
}

#[cfg(test)]
mod tests {
    mod overlaps {
        use cgmath::{Point3, Vector3};

        use crate::collision::{segment_bounding_box_overlap, Overlaps};
        use crate::geom::AABB;

        #[test]
        fn test_aabb() {
            let bound1 = AABB {
                c: Point3::new(0.0, 0.0, 0.0),
                r: Vector3::new(1.0, 1.0, 1.0),
            };
            let bound2 = AABB {
                c: Point3::new(0.0, 2.0, 0.0),
                r: Vector3::new(1.0, 1.0, 1.0),
            };
            let bound3 = AABB {
                c: Point3::new(0.0, 3.0, 0.0),
                r: Vector3::new(1.0, 1.0, 1.0),
            };
            let bound4 = AABB::from_extents(
                Point3::new(-0.5, -0.5, 1.5),
                Point3::new(0.5, 0.5, 2.5),
            );
            assert!(bound1.overlaps(&bound2));
            assert!(bound2.overlaps(&bound1));
            assert!(!bound1.overlaps(&bound3));
            assert!(segment_bounding_box_overlap(&bound2, &bound3));
            // Separated along z only.
            assert!(!segment_bounding_box_overlap(&bound1, &bound4));
        }
    }

    mod contacts {
        use approx::assert_relative_eq;
        use cgmath::{Point3, Vector3, Zero};

        use crate::collision::Contacts;
        use crate::geom::Capsule;

        #[test]
        fn test_capsule_contact() {
            let rod_element = Capsule {
                a: Point3::new(1.5, 0.0, 0.0),
                d: Vector3::new(1.0, 0.0, 0.0),
                r: 1.0,
            };
            let cylinder = Capsule {
                a: Point3::new(0.0, 0.0, -1.0),
                d: Vector3::new(0.0, 0.0, 2.0),
                r: 1.0,
            };
            let c = rod_element.contact(&cylinder).unwrap();
            assert_relative_eq!(c.penetration, 0.5);
            assert_relative_eq!(c.n, Vector3::new(-1.0, 0.0, 0.0));
            assert_relative_eq!(c.a, Point3::new(1.5, 0.0, 0.0));
            assert_relative_eq!(c.b, Point3::new(0.0, 0.0, 0.0));
            assert_relative_eq!(c.min_dist, c.b - c.a);

            let flipped = -c;
            assert_eq!(flipped.a, c.b);
            assert_relative_eq!(flipped.n, Vector3::new(1.0, 0.0, 0.0));
            assert_relative_eq!(cylinder.contact(&rod_element).unwrap().n, flipped.n);
        }

        #[test]
        fn test_no_contact() {
            let a = Capsule {
                a: Point3::new(0.0, 0.0, 0.0),
                d: Vector3::new(1.0, 0.0, 0.0),
                r: 0.5,
            };
            // Exactly touching surfaces do not interpenetrate.
            let b = Capsule {
                a: Point3::new(0.0, 1.0, 0.0),
                d: Vector3::new(1.0, 0.0, 0.0),
                r: 0.5,
            };
            assert!(a.contact(&b).is_none());
            let b = Capsule { a: Point3::new(0.0, 5.0, 0.0), ..b };
            assert!(a.contact(&b).is_none());
        }

        #[test]
        fn test_coincident_axes() {
            let a = Capsule {
                a: Point3::new(-1.0, 0.0, 0.0),
                d: Vector3::new(2.0, 0.0, 0.0),
                r: 0.5,
            };
            let b = Capsule {
                a: Point3::new(0.0, -1.0, 0.0),
                d: Vector3::new(0.0, 2.0, 0.0),
                r: 0.5,
            };
            let c = a.contact(&b).unwrap();
            assert_relative_eq!(c.penetration, 1.0);
            assert_eq!(c.n, Vector3::zero());
        }

        #[test]
        fn test_penetration_grows_with_overlap() {
            let a = Capsule {
                a: Point3::new(0.0, 0.0, 0.0),
                d: Vector3::new(1.0, 0.0, 0.0),
                r: 0.5,
            };
            let mut last = 0.0;
            for &gap in &[0.9, 0.7, 0.5, 0.2] {
                let b = Capsule {
                    a: Point3::new(0.0, gap, 0.0),
                    d: Vector3::new(0.0, 0.0, 1.0),
                    r: 0.5,
                };
                let c = a.contact(&b).unwrap();
                assert!(c.penetration > last);
                last = c.penetration;
            }
        }
    }
}
