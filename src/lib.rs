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

//! Contact and joint forces for assemblies of Cosserat rods and rigid bodies.
//!
//! Once per time step the integrator zeroes every body's external loads and
//! hands each pair of connected bodies to a `Connection`. Connections only
//! ever add to the bodies' force and torque accumulators.
//!
//! # Contact detection overview
//!
//! Every body is a chain of capsules. Contact detection is layered the same
//! way for every kind of contact:
//!
//! - `BoundedBy`: whole bodies and single elements produce axis aligned
//!   bounding boxes.
//! - `Overlaps`: disjoint boxes are discarded, first for the whole bodies,
//!   then element by element.
//! - `MinDistance`: the closest points between the axes of two surviving
//!   elements.
//! - `Contacts`: a `Contact` is produced only when the two capsules
//!   interpenetrate.
//!
//! `ContactParams` turns a contact into a penalty force with normal damping
//! and optional friction.
//!
//! # Connections
//!
//! - `RodRodContact`, `RodRigidBodyContact` and `ExternalContact` between two
//!   bodies, `SelfContact` within a single rod.
//! - `FreeJoint`, `HingeJoint` and `FixedJoint` tie a node of one body to a
//!   node of another.

pub extern crate cgmath;

mod geom;
pub use geom::*;

mod bounds;
pub use bounds::*;

mod collision;
pub use collision::*;

mod error;
pub use error::*;

mod physics;
pub use physics::*;

mod response;
pub use response::*;

mod contact;
pub use contact::*;

mod joint;
pub use joint::*;
