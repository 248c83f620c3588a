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

use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collision::Contact;
use crate::error::*;

/// Added to the slip speed before normalizing the slip direction.
pub const SLIP_EPSILON: f64 = 1.0e-14;

/// Penalty parameters of a contact.
///
/// Parameters are not checked when a contact is constructed or applied.
/// Call `validate` while assembling a simulation to catch mistakes early.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactParams {
    /// Stiffness of the elastic penalty.
    pub k: f64,
    /// Damping of the normal relative velocity.
    pub nu: f64,
    /// Viscous coefficient of the tangential friction.
    #[serde(default)]
    pub velocity_damping_coefficient: f64,
    /// Coulomb coefficient capping the tangential friction.
    #[serde(default)]
    pub friction_coefficient: f64,
}

impl ContactParams {
    /// Frictionless parameters.
    pub fn new(k: f64, nu: f64) -> Self {
        ContactParams {
            k,
            nu,
            velocity_damping_coefficient: 0.0,
            friction_coefficient: 0.0,
        }
    }

    pub fn with_friction(self, velocity_damping_coefficient: f64, friction_coefficient: f64) -> Self {
        ContactParams {
            velocity_damping_coefficient,
            friction_coefficient,
            ..self
        }
    }

    /// Returns an error if any coefficient is negative or not finite.
    pub fn validate(&self) -> ContactResult<()> {
        let checks = [
            ("k", self.k),
            ("nu", self.nu),
            ("velocity_damping_coefficient", self.velocity_damping_coefficient),
            ("friction_coefficient", self.friction_coefficient),
        ];
        for &(name, value) in checks.iter() {
            if !(value.is_finite() && value >= 0.0) {
                warn!(name, value, "rejected contact parameter");
                return Err(ContactError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Returns the half force the contact exerts on its second body.
    ///
    /// `rel_v` is the velocity of the second body's element relative to the
    /// first's. Each side of the contact receives this force once per node of
    /// its element, so a rigid body, having no nodes to share it, receives
    /// twice the returned value.
    pub fn element_force(&self, contact: &Contact, rel_v: Vector3<f64>) -> Vector3<f64> {
        let n = contact.n;
        let normal_v = rel_v.dot(n);
        let mut f = n * (0.5 * (self.k * contact.penetration - self.nu * normal_v));

        if self.friction_coefficient > 0.0 {
            let slip = rel_v - n * normal_v;
            let slip_speed = slip.magnitude();
            let magnitude = (self.velocity_damping_coefficient * slip_speed)
                .min(self.friction_coefficient * f.magnitude());
            f -= slip * (magnitude / (slip_speed + SLIP_EPSILON));
        }
        f
    }
}

/// Adds an element force to the element's two nodes.
///
/// End elements weight their outer node by 2/3 and their inner node by 4/3,
/// interior elements give the full force to both nodes.
pub fn distribute_element_force(
    forces: &mut [Vector3<f64>],
    i: usize,
    n_elems: usize,
    f: Vector3<f64>,
) {
    let (w0, w1) = if i == 0 && n_elems > 1 {
        (2.0 / 3.0, 4.0 / 3.0)
    } else if i + 1 == n_elems && n_elems > 1 {
        (4.0 / 3.0, 2.0 / 3.0)
    } else {
        (1.0, 1.0)
    };
    forces[i] += f * w0;
    forces[i + 1] += f * w1;
}
