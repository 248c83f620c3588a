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

//! Error types for body construction and parameter validation.
//!
//! Contact and joint evaluation itself never fails; these errors are only
//! produced while a simulation is being assembled.

use thiserror::Error;

/// Errors that can occur while constructing a rod or rigid body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BodyError {
    /// A rod needs at least one element.
    #[error("a rod needs at least two nodes, got {0}")]
    TooFewNodes(usize),

    /// A per-element or per-node array has the wrong length.
    #[error("expected {expected} {what}, found {found}")]
    LengthMismatch {
        /// Which array is wrong.
        what: &'static str,
        /// Length implied by the node count.
        expected: usize,
        /// Length that was supplied.
        found: usize,
    },

    /// Two consecutive nodes coincide.
    #[error("element {0} has zero length")]
    ZeroLengthElement(usize),

    /// A radius is negative, zero or not finite.
    #[error("invalid radius {0} (must be finite and > 0)")]
    InvalidRadius(f64),

    /// A length is negative, zero or not finite.
    #[error("invalid length {0} (must be finite and > 0)")]
    InvalidLength(f64),

    /// Direction and normal of a straight rod are degenerate or not
    /// orthogonal.
    #[error("direction and normal must be non-zero and orthogonal")]
    DegenerateFrame,
}

/// Result type for body construction.
pub type BodyResult<T> = std::result::Result<T, BodyError>;

/// Errors reported when validating contact or joint parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContactError {
    /// A coefficient is negative or not finite.
    #[error("invalid {name}: {value} (must be finite and >= 0)")]
    InvalidParameter {
        /// Name of the offending coefficient.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Result type for parameter validation.
pub type ContactResult<T> = std::result::Result<T, ContactError>;
