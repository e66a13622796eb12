// Copyright (c) 2015-2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

#![forbid(unsafe_code)]

//! Bi-objective parametric pivoting on network flow problems.
//!
//! Starting at the optimum of a slightly perturbed first objective,
//! the [`biobj`] driver pivots towards the optimum of a second
//! objective, keeping one LP engine instance per objective on the same
//! basis.

// # Data

pub mod network;
pub use self::network::Network;

pub mod basis;
pub use self::basis::{Basis, BasisStatus, BasisStore};

pub mod solution;
pub use self::solution::{objective_value, Solution, SolutionState};

pub mod dimacs;

// # Engines

pub mod engine;
pub use self::engine::{EngineError, EngineParams, LpEngine, NetworkSimplex};

// # Algorithms

pub mod biobj;
pub use self::biobj::{BiobjDriver, BiobjError, DriverConfig, NoArcPolicy, Outcome};
