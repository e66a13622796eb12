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

//! The starting basis of the pivoting procedure.

use tracing::info;

use super::{BiobjError, PERTURBED_BASIS};
use crate::basis::BasisStore;
use crate::engine::LpEngine;
use crate::solution::{Solution, SolutionState};

/// Weight of the first objective in the perturbed objective.
pub const FIRST_WEIGHT: f64 = 0.999;
/// Weight of the second objective in the perturbed objective.
pub const SECOND_WEIGHT: f64 = 0.001;

/// Return `0.999 * c1 + 0.001 * c2`.
pub fn perturbed_costs(c1: &[f64], c2: &[f64]) -> Result<Vec<f64>, BiobjError> {
    if c1.len() != c2.len() {
        return Err(BiobjError::StructureMismatch(format!(
            "{} costs in first objective, {} in second",
            c1.len(),
            c2.len()
        )));
    }
    Ok(c1
        .iter()
        .zip(c2)
        .map(|(&a, &b)| FIRST_WEIGHT * a + SECOND_WEIGHT * b)
        .collect())
}

/// Solve the perturbed problem on a scratch copy of `engine1`.
///
/// The costs of the copy are replaced by the perturbed costs of the
/// costs of `engine1` and `c2`. The optimal basis is saved as
/// [`PERTURBED_BASIS`]. The scratch problem is dropped on return.
pub fn perturbation_start<E: LpEngine>(engine1: &E, c2: &[f64], store: &mut BasisStore) -> Result<Solution, BiobjError> {
    let costs = perturbed_costs(&engine1.costs(), c2)?;

    let mut scratch = engine1.clone_problem(&format!("{}-perturbed", engine1.name()))?;
    scratch.set_costs(0, &costs)?;
    scratch.set_iteration_limit(None);
    scratch.primal_opt()?;

    let status = scratch.solution_state();
    if status != SolutionState::Optimal {
        return Err(BiobjError::PerturbationFailed(format!("solution status is {:?}", status)));
    }

    let mut sol = Solution::new(scratch.num_arcs(), scratch.num_nodes()).ok_or(BiobjError::EmptyNetwork)?;
    scratch.read_solution(&mut sol)?;
    scratch.write_basis(store, PERTURBED_BASIS)?;

    info!(
        component = "biobj",
        operation = "perturb",
        problem = scratch.name(),
        objval = sol.objval,
        iterations = scratch.num_iterations() as u64,
        "Perturbed problem solved"
    );

    Ok(sol)
}
