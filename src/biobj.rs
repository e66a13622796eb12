/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! Bi-objective parametric pivoting over a network flow polytope.
//!
//! Two objectives `c1` and `c2` are defined over the same network. The
//! procedure starts at the optimum of the blend `0.999 c1 + 0.001 c2`
//! and pivots, one arc at a time, towards the optimum of `c2`. Each
//! entering arc is the one with the smallest ratio of its reduced costs
//! with respect to both objectives. Two engine instances, one per
//! objective, are kept on the same basis during the whole run.
//!
//! # Example
//!
//! ```
//! use rs_biflow::biobj::{BiobjDriver, DriverConfig, Termination};
//! use rs_biflow::{BasisStore, Network, NetworkSimplex};
//!
//! let mut net = Network::new(3);
//! net.set_balance(0, 2.0);
//! net.set_balance(2, -2.0);
//! net.add_arc(0, 1, 0.0, 10.0, 1.0);
//! net.add_arc(1, 2, 0.0, 10.0, 1.0);
//! net.add_arc(0, 2, 0.0, 10.0, 3.0);
//!
//! let mut net2 = net.clone();
//! net2.costs = vec![2.0, 2.0, 1.0];
//!
//! let driver = BiobjDriver::new(
//!     NetworkSimplex::new("first", &net),
//!     NetworkSimplex::new("second", &net2),
//!     BasisStore::new(),
//!     DriverConfig::default(),
//! )
//! .unwrap();
//! let outcome = driver.run().unwrap();
//!
//! assert_eq!(outcome.termination, Termination::ReachedFloor);
//! assert_eq!(outcome.floor, 2.0);
//! assert_eq!(outcome.steps.len(), 1);
//! assert_eq!(outcome.steps[0].arc, 2);
//! ```

pub mod driver;
pub mod entering;
pub mod perturb;
pub mod probe;
pub mod sync;

pub use self::driver::{BiobjDriver, DriverConfig, DriverState, NoArcPolicy, Outcome, PivotStep, Termination};
pub use self::entering::{entering_arc, Candidate, NoImprovingArc};
pub use self::perturb::{perturbation_start, perturbed_costs};
pub use self::probe::global_optimum;
pub use self::sync::synchronize;

use thiserror::Error;

use crate::engine::EngineError;

/// Name of the basis of the global optimum of the second objective.
pub const GLOBAL_BASIS: &str = "basis";
/// Name of the optimal basis of the perturbed objective.
pub const PERTURBED_BASIS: &str = "pbasis";
/// Name of the current basis of the first instance.
pub const BASIS1: &str = "basis1";
/// Name of the current basis of the second instance.
pub const BASIS2: &str = "basis2";

/// Error of a bi-objective run.
#[derive(Debug, Error)]
pub enum BiobjError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("global optimum probe failed: {0}")]
    ProbeFailed(String),
    #[error("perturbed problem not solved to optimality: {0}")]
    PerturbationFailed(String),
    #[error("problems differ in structure: {0}")]
    StructureMismatch(String),
    #[error("network has no arcs or no nodes")]
    EmptyNetwork,
    #[error("bases of both solutions differ (arcs {arcs:?}, nodes {nodes:?})")]
    BasisMismatch { arcs: Vec<usize>, nodes: Vec<usize> },
    #[error("no arc improves the second objective at value {objval2}")]
    NoImprovingArc { objval2: f64 },
    #[error("pivot limit of {0} reached")]
    PivotLimit(usize),
    #[error("invalid termination tolerance {0}")]
    InvalidTolerance(f64),
}
