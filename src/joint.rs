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

use cgmath::{InnerSpace, Matrix, Matrix3, SquareMatrix, Vector3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::contact::Connection;
use crate::geom::*;
use crate::physics::*;

/// Element that a joint attached at `node` acts on. The last node of a rod
/// belongs to its last element.
fn element_of(body: &dyn Body, node: usize) -> usize {
    node.min(body.n_elems() - 1)
}

/// Rotation vector of the rotation taking frame `from` to frame `to`.
pub fn rotation_vector(from: Matrix3<f64>, to: Matrix3<f64>) -> Vector3<f64> {
    let r = to * from.transpose();
    let axis = Vector3::new(r[1][2] - r[2][1], r[2][0] - r[0][2], r[0][1] - r[1][0]);
    let theta = clip(0.5 * r.trace() - 0.5 - 1.0e-10, -1.0, 1.0).acos();
    axis * (-0.5 * theta / (theta + 1.0e-14).sin())
}

fn spring_force(k: f64, nu: f64, one: &mut dyn Body, index_one: usize, two: &mut dyn Body, index_two: usize) {
    let dx = two.positions()[index_two] - one.positions()[index_one];
    let dv = two.velocities()[index_two] - one.velocities()[index_one];
    let f = dx * k + dv * nu;
    one.external_forces_mut()[index_one] += f;
    two.external_forces_mut()[index_two] -= f;
    trace!(index_one, index_two, force = f.magnitude(), "joint force");
}

/// Adds `-Q₁ τ` to body one and `Q₂ τ` to body two, where `τ` is given in
/// the lab frame.
fn apply_torque(one: &mut dyn Body, e1: usize, two: &mut dyn Body, e2: usize, torque: Vector3<f64>) {
    let q1 = one.directors()[e1];
    let q2 = two.directors()[e2];
    one.external_torques_mut()[e1] -= q1 * torque;
    two.external_torques_mut()[e2] += q2 * torque;
}

/// A spherical joint: a damped spring pulling two nodes together.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FreeJoint {
    pub k: f64,
    pub nu: f64,
}

impl FreeJoint {
    pub fn new(k: f64, nu: f64) -> Self {
        FreeJoint { k, nu }
    }
}

impl Connection for FreeJoint {
    fn apply_forces(&self, one: &mut dyn Body, index_one: usize, two: &mut dyn Body, index_two: usize) {
        spring_force(self.k, self.nu, one, index_one, two, index_two);
    }
}

/// A free joint that additionally restricts body two to rotate about
/// `normal`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HingeJoint {
    pub k: f64,
    pub nu: f64,
    /// Stiffness of the rotational restoring torque.
    pub kt: f64,
    /// Hinge axis in the lab frame. Need not be normalized.
    pub normal: Vector3<f64>,
}

impl HingeJoint {
    pub fn new(k: f64, nu: f64, kt: f64, normal: Vector3<f64>) -> Self {
        HingeJoint { k, nu, kt, normal }
    }
}

impl Connection for HingeJoint {
    fn apply_forces(&self, one: &mut dyn Body, index_one: usize, two: &mut dyn Body, index_two: usize) {
        spring_force(self.k, self.nu, one, index_one, two, index_two);
    }

    fn apply_torques(&self, one: &mut dyn Body, index_one: usize, two: &mut dyn Body, index_two: usize) {
        if self.normal.magnitude2() <= COLLISION_EPSILON {
            return;
        }
        let n = self.normal.normalize();
        let (e1, e2) = (element_of(one, index_one), element_of(two, index_two));
        let link = two.directors()[e2].row(2);
        // Component of the link along the axis, which the hinge forbids.
        let off_plane = n * link.dot(n);
        let torque = -link.cross(off_plane) * self.kt;
        apply_torque(one, e1, two, e2, torque);
    }
}

fn identity() -> Matrix3<f64> {
    Matrix3::identity()
}

/// A free joint that additionally holds the relative orientation of the two
/// bodies at `rest_rotation_matrix`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedJoint {
    pub k: f64,
    pub nu: f64,
    /// Stiffness of the rotational restoring torque.
    pub kt: f64,
    /// Damping of the relative angular velocity.
    #[serde(default)]
    pub nut: f64,
    /// `Q₁ Q₂ᵀ` at rest.
    #[serde(default = "identity")]
    pub rest_rotation_matrix: Matrix3<f64>,
}

impl FixedJoint {
    pub fn new(k: f64, nu: f64, kt: f64) -> Self {
        FixedJoint {
            k,
            nu,
            kt,
            nut: 0.0,
            rest_rotation_matrix: identity(),
        }
    }

    pub fn with_damping(self, nut: f64) -> Self {
        FixedJoint { nut, ..self }
    }

    pub fn with_rest_rotation(self, rest_rotation_matrix: Matrix3<f64>) -> Self {
        FixedJoint {
            rest_rotation_matrix,
            ..self
        }
    }
}

impl Connection for FixedJoint {
    fn apply_forces(&self, one: &mut dyn Body, index_one: usize, two: &mut dyn Body, index_two: usize) {
        spring_force(self.k, self.nu, one, index_one, two, index_two);
    }

    fn apply_torques(&self, one: &mut dyn Body, index_one: usize, two: &mut dyn Body, index_two: usize) {
        let (e1, e2) = (element_of(one, index_one), element_of(two, index_two));
        let (q1, q2) = (one.directors()[e1], two.directors()[e2]);

        let deviation = (q1 * q2.transpose()).transpose() * self.rest_rotation_matrix;
        let rotation = q2.transpose() * rotation_vector(Matrix3::identity(), deviation.transpose());

        let omega_one = q1.transpose() * one.omegas()[e1];
        let omega_two = q2.transpose() * two.omegas()[e2];
        let torque = rotation * self.kt - (omega_two - omega_one) * self.nut;
        trace!(e1, e2, angle = rotation.magnitude(), "fixed joint torque");
        apply_torque(one, e1, two, e2, torque);
    }
}

#[cfg(test)]
mod tests {
    mod fixtures {
        use cgmath::{Point3, Vector3};

        use crate::physics::CosseratRod;

        pub fn rod(start: Point3<f64>, direction: Vector3<f64>, normal: Vector3<f64>) -> CosseratRod {
            CosseratRod::straight_rod(2, start, direction, normal, 1.0, 0.1).unwrap()
        }
    }

    mod free {
        use approx::assert_relative_eq;
        use cgmath::{Point3, Vector3, Zero};

        use super::fixtures::rod;
        use crate::contact::Connection;
        use crate::joint::*;
        use crate::physics::Body;

        #[test]
        fn test_free_joint() {
            let (k, nu) = (4.0, 0.5);
            let x = Vector3::new(1.0, 0.0, 0.0);
            let y = Vector3::new(0.0, 1.0, 0.0);
            let mut one = rod(Point3::new(0.0, 0.0, 0.0), x, y);
            let mut two = rod(Point3::new(2.0, 0.0, 0.0), x, y);
            for v in one.velocities_mut() {
                *v = -x;
            }
            for v in two.velocities_mut() {
                *v = x;
            }

            let joint = FreeJoint::new(k, nu);
            joint.apply_forces(&mut one, 2, &mut two, 0);
            joint.apply_torques(&mut one, 2, &mut two, 0);

            let f = x * (k * 1.0 + nu * 2.0);
            assert_relative_eq!(one.external_forces()[2], f);
            assert_relative_eq!(two.external_forces()[0], -f);
            assert_eq!(one.external_forces()[0], Vector3::zero());
            assert_eq!(two.external_forces()[2], Vector3::zero());
            for t in one.external_torques().iter().chain(two.external_torques()) {
                assert_eq!(*t, Vector3::zero());
            }
        }
    }

    mod hinge {
        use approx::assert_relative_eq;
        use cgmath::{Point3, Vector3, Zero};

        use super::fixtures::rod;
        use crate::contact::Connection;
        use crate::joint::*;
        use crate::physics::Body;

        #[test]
        fn test_hinge_torque() {
            let kt = 3.0;
            let mut one = rod(
                Point3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            );
            let mut two = rod(
                Point3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            );
            let joint = HingeJoint::new(1.0, 0.0, kt, Vector3::new(0.0, 2.0, 0.0));
            joint.apply_forces(&mut one, 2, &mut two, 0);
            joint.apply_torques(&mut one, 2, &mut two, 0);

            // The ends coincide, so there is no force.
            assert_relative_eq!(one.external_forces()[2], Vector3::zero(), epsilon = 1e-12);
            assert_relative_eq!(
                one.external_torques()[1],
                Vector3::new(0.0, 0.5 * kt, 0.0),
                epsilon = 1e-12
            );
            assert_relative_eq!(
                two.external_torques()[0],
                Vector3::new(-0.5 * kt, 0.0, 0.0),
                epsilon = 1e-12
            );
            assert_eq!(one.external_torques()[0], Vector3::zero());
        }

        #[test]
        fn test_in_plane_link_is_free() {
            let mut one = rod(
                Point3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            );
            let mut two = rod(
                Point3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            );
            let joint = HingeJoint::new(1.0, 0.0, 3.0, Vector3::new(0.0, 0.0, 1.0));
            joint.apply_torques(&mut one, 2, &mut two, 0);
            assert_relative_eq!(two.external_torques()[0], Vector3::zero());
        }
    }

    mod fixed {
        use approx::assert_relative_eq;
        use cgmath::{Matrix, Matrix3, Point3, SquareMatrix, Vector3, Zero};

        use super::fixtures::rod;
        use crate::contact::Connection;
        use crate::joint::*;
        use crate::physics::{Body, CosseratRod};

        fn twisted_pair(phi: f64) -> (CosseratRod, CosseratRod) {
            let z = Vector3::new(0.0, 0.0, 1.0);
            let one = rod(Point3::new(0.0, 0.0, 0.0), z, Vector3::new(1.0, 0.0, 0.0));
            let two = rod(
                Point3::new(0.0, 0.0, 1.0),
                z,
                Vector3::new(phi.cos(), phi.sin(), 0.0),
            );
            (one, two)
        }

        #[test]
        fn test_rotation_vector() {
            let phi: f64 = 0.3;
            let (c, s) = (phi.cos(), phi.sin());
            // Rows are the directors.
            let q = Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
            assert_relative_eq!(
                rotation_vector(Matrix3::identity(), q.transpose()),
                Vector3::new(0.0, 0.0, -phi),
                epsilon = 1e-8
            );
            assert_relative_eq!(
                rotation_vector(Matrix3::identity(), Matrix3::identity()),
                Vector3::zero()
            );
        }

        #[test]
        fn test_fixed_joint_restores_twist() {
            let (phi, kt) = (0.3, 2.0);
            let (mut one, mut two) = twisted_pair(phi);
            assert_relative_eq!(one.directors()[1], Matrix3::identity());

            let joint = FixedJoint::new(1.0, 0.0, kt);
            joint.apply_forces(&mut one, 2, &mut two, 0);
            joint.apply_torques(&mut one, 2, &mut two, 0);

            assert_relative_eq!(one.external_forces()[2], Vector3::zero(), epsilon = 1e-12);
            assert_relative_eq!(
                one.external_torques()[1],
                Vector3::new(0.0, 0.0, kt * phi),
                epsilon = 1e-8
            );
            assert_relative_eq!(
                two.external_torques()[0],
                Vector3::new(0.0, 0.0, -kt * phi),
                epsilon = 1e-8
            );
        }

        #[test]
        fn test_rest_rotation() {
            let (mut one, mut two) = twisted_pair(0.3);
            let rest = one.directors()[1] * two.directors()[0].transpose();
            let joint = FixedJoint::new(1.0, 0.0, 2.0).with_rest_rotation(rest);
            joint.apply_torques(&mut one, 2, &mut two, 0);
            assert_relative_eq!(one.external_torques()[1], Vector3::zero(), epsilon = 1e-8);
            assert_relative_eq!(two.external_torques()[0], Vector3::zero(), epsilon = 1e-8);
        }

        #[test]
        fn test_angular_damping() {
            let nut = 0.7;
            let (mut one, mut two) = twisted_pair(0.0);
            two.omegas_mut()[0] = Vector3::new(0.0, 0.0, 1.0);
            let joint = FixedJoint::new(1.0, 0.0, 2.0).with_damping(nut);
            joint.apply_torques(&mut one, 2, &mut two, 0);
            assert_relative_eq!(one.external_torques()[1], Vector3::new(0.0, 0.0, nut), epsilon = 1e-8);
            assert_relative_eq!(two.external_torques()[0], Vector3::new(0.0, 0.0, -nut), epsilon = 1e-8);
        }

        #[test]
        fn test_deserialize_defaults() {
            let joint: FixedJoint = serde_json::from_str(r#"{ "k": 1.0, "nu": 0.1, "kt": 2.0 }"#).unwrap();
            assert_eq!(joint, FixedJoint::new(1.0, 0.1, 2.0));
        }
    }
}
