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
use smallvec::SmallVec;

use crate::collision::*;
use crate::geom::*;

/// A type that can be decomposed into a bound.
pub trait BoundedBy<B> {
    fn bounds(&self) -> B;
}

impl BoundedBy<AABB> for Capsule {
    fn bounds(&self) -> AABB {
        // Include length of d with radius to cover all rotations
        let r = self.r + self.d.magnitude() * 0.5;
        AABB {
            c: self.a + self.d * 0.5,
            r: Vector3::new(r, r, r),
        }
    }
}

/// Candidate pair from the broad phase: indices of one element on each side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CandidatePair {
    pub a: usize,
    pub b: usize,
}

/// Candidate pairs surviving the broad phase. Most calls produce only a
/// handful, which stay inline.
pub type Candidates = SmallVec<[CandidatePair; 16]>;

/// Returns every index pair `(i, j)` whose boxes `a[i]` and `b[j]` overlap, in
/// `i`-major order.
///
/// Never rejects a pair whose boxes touch, so it has no false negatives as
/// long as each box encloses its element.
pub fn prune_element_pairs(a: &[AABB], b: &[AABB]) -> Candidates {
    let mut pairs = Candidates::new();
    for (i, box_a) in a.iter().enumerate() {
        for (j, box_b) in b.iter().enumerate() {
            if segment_bounding_box_overlap(box_a, box_b) {
                pairs.push(CandidatePair { a: i, b: j });
            }
        }
    }
    pairs
}

/// Self-contact variant of `prune_element_pairs`.
///
/// Element `i` is only paired with elements `j <= i - window(i)`, visited from
/// the nearest outward. Pairs inside the window are excluded before any box
/// is tested.
pub fn prune_self_pairs<F>(bounds: &[AABB], window: F) -> Candidates
where
    F: Fn(usize) -> usize,
{
    let mut pairs = Candidates::new();
    for (i, box_i) in bounds.iter().enumerate() {
        let w = window(i);
        if w > i {
            continue;
        }
        for j in (0..=(i - w)).rev() {
            if segment_bounding_box_overlap(box_i, &bounds[j]) {
                pairs.push(CandidatePair { a: i, b: j });
            }
        }
    }
    pairs
}
