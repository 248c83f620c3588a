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

//! Contact between rods, between a rod and a rigid body, and between distant
//! elements of the same rod.
//!
//! Every contact runs in three phases: whole body bounds, element bounds
//! and an exact capsule test. Only element pairs that interpenetrate write to
//! the bodies' accumulators.

use std::f64::consts::PI;

use cgmath::{Vector3, Zero};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bounds::*;
use crate::collision::*;
use crate::geom::*;
use crate::physics::*;
use crate::response::*;

/// An interaction between two bodies evaluated once per step.
///
/// The indices address the node or element of each body the interaction is
/// attached to. Contacts span whole bodies and ignore them.
pub trait Connection {
    /// Add this interaction's forces to both bodies' force accumulators.
    fn apply_forces(&self, one: &mut dyn Body, index_one: usize, two: &mut dyn Body, index_two: usize);

    /// Add this interaction's torques to both bodies' torque accumulators.
    fn apply_torques(
        &self,
        _one: &mut dyn Body,
        _index_one: usize,
        _two: &mut dyn Body,
        _index_two: usize,
    ) {
    }
}

fn element_bounds<F>(n_elems: usize, element: F) -> Vec<AABB>
where
    F: Fn(usize) -> Capsule,
{
    (0..n_elems).map(|i| element(i).bounds()).collect()
}

fn rod_rod_contact(params: &ContactParams, one: &mut dyn Body, two: &mut dyn Body) {
    if !one.bounds().overlaps(&two.bounds()) {
        return;
    }
    let (n_one, n_two) = (one.n_elems(), two.n_elems());
    let candidates = prune_element_pairs(
        &element_bounds(n_one, |i| one.element(i)),
        &element_bounds(n_two, |j| two.element(j)),
    );

    let mut contacts = 0;
    for &CandidatePair { a: i, b: j } in candidates.iter() {
        let contact = match one.element(i).contact(&two.element(j)) {
            Some(contact) => contact,
            None => continue,
        };
        let rel_v = two.element_velocity(j) - one.element_velocity(i);
        let f = params.element_force(&contact, rel_v);
        distribute_element_force(one.external_forces_mut(), i, n_one, -f);
        distribute_element_force(two.external_forces_mut(), j, n_two, f);
        trace!(i, j, penetration = contact.penetration, "rod-rod contact");
        contacts += 1;
    }
    debug!(candidates = candidates.len(), contacts, "resolved rod-rod contact");
}

/// The rod element as seen by a rigid body: starting at the element's
/// center and extending one element length along its tangent.
fn shifted_element(rod: &dyn Body, i: usize) -> Capsule {
    let element = rod.element(i);
    Capsule {
        a: element.center(),
        ..element
    }
}

fn rod_rigid_body_contact(params: &ContactParams, rod: &mut dyn Body, rigid: &mut dyn Body) {
    if !rod.bounds().overlaps(&rigid.bounds()) {
        return;
    }
    let n_elems = rod.n_elems();
    let cylinder = rigid.element(0);
    let center = rigid.positions()[0];
    let candidates = prune_element_pairs(
        &element_bounds(n_elems, |i| shifted_element(&*rod, i)),
        &[cylinder.bounds()],
    );

    let mut torque = Vector3::zero();
    let mut contacts = 0;
    for &CandidatePair { a: i, .. } in candidates.iter() {
        let contact = match shifted_element(&*rod, i).contact(&cylinder) {
            Some(contact) => contact,
            None => continue,
        };
        let rel_v = rigid.element_velocity(0) - rod.element_velocity(i);
        let f = params.element_force(&contact, rel_v);
        distribute_element_force(rod.external_forces_mut(), i, n_elems, -f);
        rigid.external_forces_mut()[0] += f * 2.0;
        torque += (contact.b - center).cross(f * 2.0);
        trace!(i, penetration = contact.penetration, "rod-rigid body contact");
        contacts += 1;
    }
    if contacts > 0 {
        let q = rigid.directors()[0];
        rigid.external_torques_mut()[0] += q * torque;
    }
    debug!(candidates = candidates.len(), contacts, "resolved rod-rigid body contact");
}

/// Contact between two rods.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RodRodContact {
    pub params: ContactParams,
}

impl RodRodContact {
    pub fn new(params: ContactParams) -> Self {
        RodRodContact { params }
    }
}

impl Connection for RodRodContact {
    fn apply_forces(&self, one: &mut dyn Body, _index_one: usize, two: &mut dyn Body, _index_two: usize) {
        rod_rod_contact(&self.params, one, two);
    }
}

/// Contact between a rod (`one`) and a rigid cylinder (`two`).
///
/// The cylinder receives the reaction force at its center and the torque of
/// that force about its center, the latter in its local frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RodRigidBodyContact {
    pub params: ContactParams,
}

impl RodRigidBodyContact {
    pub fn new(params: ContactParams) -> Self {
        RodRigidBodyContact { params }
    }
}

impl Connection for RodRigidBodyContact {
    fn apply_forces(&self, one: &mut dyn Body, _index_one: usize, two: &mut dyn Body, _index_two: usize) {
        rod_rigid_body_contact(&self.params, one, two);
    }
}

/// Contact between two bodies of any kind, choosing the rod-rod or
/// rod-rigid body law from the bodies' element counts.
///
/// Contact between two rigid bodies is not modeled and is ignored.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalContact {
    pub params: ContactParams,
}

impl ExternalContact {
    pub fn new(params: ContactParams) -> Self {
        ExternalContact { params }
    }
}

impl Connection for ExternalContact {
    fn apply_forces(&self, one: &mut dyn Body, _index_one: usize, two: &mut dyn Body, _index_two: usize) {
        match (one.is_rigid(), two.is_rigid()) {
            (false, false) => rod_rod_contact(&self.params, one, two),
            (false, true) => rod_rigid_body_contact(&self.params, one, two),
            (true, false) => rod_rigid_body_contact(&self.params, two, one),
            (true, true) => {
                debug!("skipping contact between two rigid bodies");
            }
        }
    }
}

/// Number of neighboring elements, counting the element itself, that an
/// element of the given radius and length never contacts.
///
/// Neighbors within this window overlap at rest because the rod is thicker
/// than its elements are long.
pub fn self_contact_window(radius: f64, length: f64) -> usize {
    let w = 1.0 + (0.8 * PI * radius / length).ceil();
    if w > 2.0 {
        w as usize
    } else {
        2
    }
}

/// Contact between distant elements of the same rod.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelfContact {
    pub params: ContactParams,
}

impl SelfContact {
    pub fn new(params: ContactParams) -> Self {
        SelfContact { params }
    }

    pub fn apply_forces(&self, rod: &mut dyn Body) {
        let n_elems = rod.n_elems();
        let candidates = {
            let (radii, lengths) = (rod.radii(), rod.lengths());
            prune_self_pairs(&element_bounds(n_elems, |i| rod.element(i)), |i| {
                self_contact_window(radii[i], lengths[i])
            })
        };

        let mut contacts = 0;
        for &CandidatePair { a: i, b: j } in candidates.iter() {
            let contact = match rod.element(i).contact(&rod.element(j)) {
                Some(contact) => contact,
                None => continue,
            };
            let rel_v = rod.element_velocity(j) - rod.element_velocity(i);
            let f = self.params.element_force(&contact, rel_v);
            let forces = rod.external_forces_mut();
            distribute_element_force(forces, i, n_elems, -f);
            distribute_element_force(forces, j, n_elems, f);
            trace!(i, j, penetration = contact.penetration, "self contact");
            contacts += 1;
        }
        debug!(candidates = candidates.len(), contacts, "resolved self contact");
    }
}
