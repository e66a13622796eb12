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

//! LP engines for network flow problems.
//!
//! A network flow problem is viewed as a linear program with one column
//! per arc and one row per node. The bi-objective driver only talks to
//! engines through the [`LpEngine`] trait; [`NetworkSimplex`] is the
//! engine shipped with this crate.

pub mod simplex;
pub use simplex::{NetworkSimplex, Pricing};

use thiserror::Error;

use crate::basis::{Basis, BasisStatus, BasisStore, StoreError};
use crate::dimacs;
use crate::solution::{Solution, SolutionState};

/// Error of an engine call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot read problem: {0}")]
    Dimacs(#[from] dimacs::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("invalid basis: {0}")]
    InvalidBasis(String),
    #[error("arc {0} does not exist")]
    ArcOutOfRange(usize),
    #[error("arc {0} is already basic")]
    ArcIsBasic(usize),
    #[error("pivot on arc {0} is unbounded")]
    Unbounded(usize),
    #[error("value {0} cannot be represented")]
    Numeric(f64),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Parameters of an engine instance.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineParams {
    /// Maximal number of simplex iterations of one solve. `None` means no limit.
    pub iteration_limit: Option<usize>,
    /// Log solve summaries at `info` instead of `debug` level.
    pub screen_output: bool,
    pub presolve: bool,
    pub aggregator: bool,
    pub scaling: bool,
    /// Start a solve from the current basis instead of a fresh one.
    pub advanced_start: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            iteration_limit: None,
            screen_output: false,
            presolve: true,
            aggregator: true,
            scaling: true,
            advanced_start: true,
        }
    }
}

impl EngineParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iteration_limit(mut self, limit: Option<usize>) -> Self {
        self.iteration_limit = limit;
        self
    }

    pub fn with_screen_output(mut self, enabled: bool) -> Self {
        self.screen_output = enabled;
        self
    }

    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = enabled;
        self
    }

    pub fn with_aggregator(mut self, enabled: bool) -> Self {
        self.aggregator = enabled;
        self
    }

    pub fn with_scaling(mut self, enabled: bool) -> Self {
        self.scaling = enabled;
        self
    }

    pub fn with_advanced_start(mut self, enabled: bool) -> Self {
        self.advanced_start = enabled;
        self
    }
}

/// The capabilities the bi-objective driver needs from an LP engine.
///
/// One value of an implementing type is one problem instance with its
/// own parameters and its own current basis.
pub trait LpEngine: Sized {
    /// The name of the problem instance.
    fn name(&self) -> &str;

    fn num_arcs(&self) -> usize;

    fn num_nodes(&self) -> usize;

    /// Create a new instance with the same structure, costs and parameters.
    ///
    /// The new instance has no basis.
    fn clone_problem(&self, name: &str) -> Result<Self>;

    /// Return the current objective coefficients.
    fn costs(&self) -> Vec<f64>;

    /// Replace the objective coefficients of arcs `begin..begin + costs.len()`.
    fn set_costs(&mut self, begin: usize, costs: &[f64]) -> Result<()>;

    fn params(&self) -> &EngineParams;

    fn params_mut(&mut self) -> &mut EngineParams;

    fn set_iteration_limit(&mut self, limit: Option<usize>) {
        self.params_mut().iteration_limit = limit;
    }

    /// Run the primal simplex until optimality or the iteration limit.
    ///
    /// Infeasibility or unboundedness of the problem is not an error,
    /// it is reported by [`LpEngine::solution_state`].
    fn primal_opt(&mut self) -> Result<()>;

    fn solution_state(&self) -> SolutionState;

    fn objective_value(&self) -> f64;

    /// Number of simplex iterations of the latest solve.
    fn num_iterations(&self) -> usize;

    /// Wall clock time of the latest solve.
    fn solve_time(&self) -> time::Duration;

    /// Copy status, objective value, flows, duals, slacks and reduced
    /// costs into `sol`. The basis of `sol` is not touched.
    fn solution_into(&self, sol: &mut Solution) -> Result<()>;

    fn basis(&self) -> Result<Basis>;

    /// Install `basis` as the current basis.
    ///
    /// Primal and dual values are recomputed from the basis, no pivots
    /// are performed.
    fn set_basis(&mut self, basis: &Basis) -> Result<()>;

    /// Pivot the non-basic `arc` into the basis.
    ///
    /// The leaving variable is chosen by the ratio test and becomes
    /// non-basic at the bound it reaches; `leaving` is its status if both
    /// bounds coincide.
    fn pivot(&mut self, arc: usize, leaving: BasisStatus) -> Result<()>;

    /// Copy solution values and basis into `sol`.
    fn read_solution(&self, sol: &mut Solution) -> Result<()> {
        self.solution_into(sol)?;
        sol.basis = self.basis()?;
        Ok(())
    }

    /// Persist the current basis under `name`.
    fn write_basis(&self, store: &mut BasisStore, name: &str) -> Result<()> {
        store.save(name, &self.basis()?)?;
        Ok(())
    }

    /// Install the basis persisted under `name`.
    fn read_basis(&mut self, store: &BasisStore, name: &str) -> Result<()> {
        let basis = store.load(name)?;
        self.set_basis(&basis)
    }
}

#[cfg(test)]
mod tests {
    use super::EngineParams;

    #[test]
    fn params_builder() {
        let params = EngineParams::new()
            .with_iteration_limit(Some(1))
            .with_screen_output(true)
            .with_presolve(false)
            .with_aggregator(false)
            .with_scaling(false)
            .with_advanced_start(true);
        assert_eq!(params.iteration_limit, Some(1));
        assert!(params.screen_output);
        assert!(!params.presolve && !params.aggregator && !params.scaling);
        assert!(params.advanced_start);
    }

    #[test]
    fn default_params_are_unlimited() {
        let params = EngineParams::default();
        assert_eq!(params.iteration_limit, None);
        assert!(params.advanced_start);
        assert_eq!(params, EngineParams::new());
    }
}
