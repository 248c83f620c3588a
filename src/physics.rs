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

use std::slice;

use cgmath::{InnerSpace, Matrix, Matrix3, Point3, Vector3, Zero};

use crate::bounds::*;
use crate::error::*;
use crate::geom::*;

/// Computes a unit vector orthogonal to `n`.
/// Code taken from http://box2d.org/2014/02/computing-a-basis/
fn orthogonal_to(n: Vector3<f64>) -> Vector3<f64> {
    let b = if n.x.abs() >= 0.57735 {
        Vector3::new(n.y, -n.x, 0.0)
    } else {
        Vector3::new(0.0, n.z, -n.y)
    };
    b.normalize()
}

/// Stacks three directors as the rows of a frame, so that `q * v` maps a
/// lab-frame vector into the local frame.
fn frame(d1: Vector3<f64>, d2: Vector3<f64>, d3: Vector3<f64>) -> Matrix3<f64> {
    Matrix3::from_cols(d1, d2, d3).transpose()
}

fn abs(v: Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x.abs(), v.y.abs(), v.z.abs())
}

fn check_radius(r: f64) -> BodyResult<f64> {
    if r.is_finite() && r > 0.0 {
        Ok(r)
    } else {
        Err(BodyError::InvalidRadius(r))
    }
}

fn check_length(l: f64) -> BodyResult<f64> {
    if l.is_finite() && l > 0.0 {
        Ok(l)
    } else {
        Err(BodyError::InvalidLength(l))
    }
}

/// The set of capabilities a contact or joint needs from a body.
///
/// Every body is a chain of capsule shaped elements. A rod has `n` elements
/// and `n + 1` nodes; a rigid body has exactly one element and one "node",
/// its center. Contacts tell the two apart by element count.
///
/// External forces are indexed by node and expressed in the lab frame.
/// External torques are indexed by element and expressed in the element's
/// local director frame.
pub trait Body: BoundedBy<AABB> {
    /// Number of elements.
    fn n_elems(&self) -> usize;

    fn positions(&self) -> &[Point3<f64>];

    fn velocities(&self) -> &[Vector3<f64>];

    /// One frame per element, directors stored as rows.
    fn directors(&self) -> &[Matrix3<f64>];

    /// Angular velocities per element, in the local frame.
    fn omegas(&self) -> &[Vector3<f64>];

    fn radii(&self) -> &[f64];

    fn lengths(&self) -> &[f64];

    /// The capsule occupied by element `i`.
    fn element(&self, i: usize) -> Capsule;

    /// Velocity of element `i`'s center.
    fn element_velocity(&self, i: usize) -> Vector3<f64>;

    fn external_forces(&self) -> &[Vector3<f64>];

    fn external_forces_mut(&mut self) -> &mut [Vector3<f64>];

    fn external_torques(&self) -> &[Vector3<f64>];

    fn external_torques_mut(&mut self) -> &mut [Vector3<f64>];

    /// True for a body with one node per element, i.e. a rigid body.
    fn is_rigid(&self) -> bool {
        self.positions().len() == self.n_elems()
    }

    /// Zeroes both accumulators. Called by the integrator before contacts
    /// and joints are applied for a new step.
    fn reset_external_loads(&mut self) {
        for f in self.external_forces_mut() {
            *f = Vector3::zero();
        }
        for t in self.external_torques_mut() {
            *t = Vector3::zero();
        }
    }
}

/// A slender elastic rod discretized into straight elements between nodes.
///
/// Lengths and tangents are derived from the node positions. After moving
/// nodes through `positions_mut`, call `update_geometry` to refresh them.
#[derive(Clone, Debug)]
pub struct CosseratRod {
    positions: Vec<Point3<f64>>,
    velocities: Vec<Vector3<f64>>,
    directors: Vec<Matrix3<f64>>,
    omegas: Vec<Vector3<f64>>,
    radii: Vec<f64>,
    lengths: Vec<f64>,
    tangents: Vec<Vector3<f64>>,
    external_forces: Vec<Vector3<f64>>,
    external_torques: Vec<Vector3<f64>>,
}

impl CosseratRod {
    /// Construct a rod at rest through the given nodes with a uniform radius.
    ///
    /// Each element's third director is its tangent; the first is an
    /// arbitrary unit vector orthogonal to it.
    pub fn from_nodes(positions: Vec<Point3<f64>>, radius: f64) -> BodyResult<Self> {
        if positions.len() < 2 {
            return Err(BodyError::TooFewNodes(positions.len()));
        }
        let radius = check_radius(radius)?;
        let n_elems = positions.len() - 1;
        let mut rod = CosseratRod {
            velocities: vec![Vector3::zero(); n_elems + 1],
            directors: Vec::with_capacity(n_elems),
            omegas: vec![Vector3::zero(); n_elems],
            radii: vec![radius; n_elems],
            lengths: Vec::with_capacity(n_elems),
            tangents: Vec::with_capacity(n_elems),
            external_forces: vec![Vector3::zero(); n_elems + 1],
            external_torques: vec![Vector3::zero(); n_elems],
            positions,
        };
        rod.update_geometry()?;
        for &t in &rod.tangents {
            let d1 = orthogonal_to(t);
            rod.directors.push(frame(d1, t.cross(d1), t));
        }
        Ok(rod)
    }

    /// Construct a straight rod of `n_elems` equal elements starting at
    /// `start`. `normal` becomes every element's first director.
    pub fn straight_rod(
        n_elems: usize,
        start: Point3<f64>,
        direction: Vector3<f64>,
        normal: Vector3<f64>,
        length: f64,
        radius: f64,
    ) -> BodyResult<Self> {
        if n_elems == 0 {
            return Err(BodyError::TooFewNodes(1));
        }
        let length = check_length(length)?;
        if direction.magnitude2() <= COLLISION_EPSILON || normal.magnitude2() <= COLLISION_EPSILON {
            return Err(BodyError::DegenerateFrame);
        }
        let d3 = direction.normalize();
        let d1 = normal.normalize();
        if d1.dot(d3).abs() > PARALLEL_EPSILON {
            return Err(BodyError::DegenerateFrame);
        }
        let step = d3 * (length / n_elems as f64);
        let positions = (0..=n_elems).map(|i| start + step * i as f64).collect();
        let mut rod = CosseratRod::from_nodes(positions, radius)?;
        let q = frame(d1, d3.cross(d1), d3);
        for director in &mut rod.directors {
            *director = q;
        }
        Ok(rod)
    }

    /// Replace the uniform radius with one radius per element.
    pub fn with_radii(mut self, radii: Vec<f64>) -> BodyResult<Self> {
        if radii.len() != self.n_elems() {
            return Err(BodyError::LengthMismatch {
                what: "radii",
                expected: self.n_elems(),
                found: radii.len(),
            });
        }
        for &r in &radii {
            check_radius(r)?;
        }
        self.radii = radii;
        Ok(self)
    }

    /// Recompute element lengths and unit tangents from the nodes.
    pub fn update_geometry(&mut self) -> BodyResult<()> {
        self.lengths.clear();
        self.tangents.clear();
        for (i, pair) in self.positions.windows(2).enumerate() {
            let edge = pair[1] - pair[0];
            let l = edge.magnitude();
            if l * l <= COLLISION_EPSILON {
                return Err(BodyError::ZeroLengthElement(i));
            }
            self.lengths.push(l);
            self.tangents.push(edge / l);
        }
        Ok(())
    }

    pub fn tangents(&self) -> &[Vector3<f64>] {
        &self.tangents
    }

    pub fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.positions
    }

    pub fn velocities_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.velocities
    }

    pub fn directors_mut(&mut self) -> &mut [Matrix3<f64>] {
        &mut self.directors
    }

    pub fn omegas_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.omegas
    }
}

impl BoundedBy<AABB> for CosseratRod {
    /// Node extent padded by the largest radius and element length.
    fn bounds(&self) -> AABB {
        let first = self.positions[0];
        let (lower, upper) = self.positions.iter().fold((first, first), |(lo, hi), p| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });
        let pad = self.radii.iter().cloned().fold(0.0, f64::max)
            + self.lengths.iter().cloned().fold(0.0, f64::max);
        let pad = Vector3::new(pad, pad, pad);
        AABB::from_extents(lower - pad, upper + pad)
    }
}

impl Body for CosseratRod {
    fn n_elems(&self) -> usize {
        self.positions.len() - 1
    }

    fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    fn velocities(&self) -> &[Vector3<f64>] {
        &self.velocities
    }

    fn directors(&self) -> &[Matrix3<f64>] {
        &self.directors
    }

    fn omegas(&self) -> &[Vector3<f64>] {
        &self.omegas
    }

    fn radii(&self) -> &[f64] {
        &self.radii
    }

    fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    fn element(&self, i: usize) -> Capsule {
        Capsule {
            a: self.positions[i],
            d: self.positions[i + 1] - self.positions[i],
            r: self.radii[i],
        }
    }

    /// Average of the element's two node velocities.
    fn element_velocity(&self, i: usize) -> Vector3<f64> {
        (self.velocities[i] + self.velocities[i + 1]) * 0.5
    }

    fn external_forces(&self) -> &[Vector3<f64>] {
        &self.external_forces
    }

    fn external_forces_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.external_forces
    }

    fn external_torques(&self) -> &[Vector3<f64>] {
        &self.external_torques
    }

    fn external_torques_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.external_torques
    }
}

/// A rigid cylinder.
///
/// The cylinder's axis is its third director, and it is centered on
/// `position`. The integrator owns its state; contacts only read the
/// kinematics and add to `external_force` and `external_torque`.
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub position: Point3<f64>,
    pub velocity: Vector3<f64>,
    pub director: Matrix3<f64>,
    pub omega: Vector3<f64>,
    pub radius: f64,
    pub length: f64,
    pub external_force: Vector3<f64>,
    pub external_torque: Vector3<f64>,
}

impl RigidBody {
    /// Construct a cylinder at rest. `director` holds the body's directors as
    /// rows.
    pub fn cylinder(
        center: Point3<f64>,
        director: Matrix3<f64>,
        radius: f64,
        length: f64,
    ) -> BodyResult<Self> {
        Ok(RigidBody {
            position: center,
            velocity: Vector3::zero(),
            director,
            omega: Vector3::zero(),
            radius: check_radius(radius)?,
            length: check_length(length)?,
            external_force: Vector3::zero(),
            external_torque: Vector3::zero(),
        })
    }

    /// Unit vector along the cylinder's axis.
    pub fn axis(&self) -> Vector3<f64> {
        self.director.row(2)
    }
}

impl BoundedBy<AABB> for RigidBody {
    /// Oriented half extents `(r, r, L/2 + r)` projected onto the lab axes.
    /// The axial extent includes the rounded caps of `element(0)`.
    fn bounds(&self) -> AABB {
        let q = &self.director;
        let r = abs(q.row(0)) * self.radius
            + abs(q.row(1)) * self.radius
            + abs(q.row(2)) * (0.5 * self.length + self.radius);
        AABB { c: self.position, r }
    }
}

impl Body for RigidBody {
    fn n_elems(&self) -> usize {
        1
    }

    fn positions(&self) -> &[Point3<f64>] {
        slice::from_ref(&self.position)
    }

    fn velocities(&self) -> &[Vector3<f64>] {
        slice::from_ref(&self.velocity)
    }

    fn directors(&self) -> &[Matrix3<f64>] {
        slice::from_ref(&self.director)
    }

    fn omegas(&self) -> &[Vector3<f64>] {
        slice::from_ref(&self.omega)
    }

    fn radii(&self) -> &[f64] {
        slice::from_ref(&self.radius)
    }

    fn lengths(&self) -> &[f64] {
        slice::from_ref(&self.length)
    }

    fn element(&self, _i: usize) -> Capsule {
        let d = self.axis() * self.length;
        Capsule {
            a: self.position - d * 0.5,
            d,
            r: self.radius,
        }
    }

    fn element_velocity(&self, _i: usize) -> Vector3<f64> {
        self.velocity
    }

    fn external_forces(&self) -> &[Vector3<f64>] {
        slice::from_ref(&self.external_force)
    }

    fn external_forces_mut(&mut self) -> &mut [Vector3<f64>] {
        slice::from_mut(&mut self.external_force)
    }

    fn external_torques(&self) -> &[Vector3<f64>] {
        slice::from_ref(&self.external_torque)
    }

    fn external_torques_mut(&mut self) -> &mut [Vector3<f64>] {
        slice::from_mut(&mut self.external_torque)
    }
}
