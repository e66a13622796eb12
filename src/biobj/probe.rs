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

use tracing::info;

use super::{BiobjError, GLOBAL_BASIS};
use crate::basis::BasisStore;
use crate::engine::LpEngine;
use crate::solution::{Solution, SolutionState};

/// Solve `engine` from scratch to optimality.
///
/// The optimal basis is saved as [`GLOBAL_BASIS`]. The engine is
/// consumed, any failure is reported as [`BiobjError::ProbeFailed`].
pub fn global_optimum<E: LpEngine>(mut engine: E, store: &mut BasisStore) -> Result<Solution, BiobjError> {
    let failed = |e: &dyn std::fmt::Display| BiobjError::ProbeFailed(e.to_string());

    engine.set_iteration_limit(None);
    engine.params_mut().advanced_start = false;
    engine.primal_opt().map_err(|e| failed(&e))?;

    let status = engine.solution_state();
    if status != SolutionState::Optimal {
        return Err(BiobjError::ProbeFailed(format!("solution status is {:?}", status)));
    }

    let mut sol = Solution::new(engine.num_arcs(), engine.num_nodes()).ok_or(BiobjError::EmptyNetwork)?;
    engine.read_solution(&mut sol).map_err(|e| failed(&e))?;
    engine.write_basis(store, GLOBAL_BASIS).map_err(|e| failed(&e))?;

    info!(
        component = "biobj",
        operation = "probe",
        problem = engine.name(),
        objval = sol.objval,
        iterations = engine.num_iterations() as u64,
        "Global optimum of second objective"
    );

    Ok(sol)
}

#[cfg(test)]
mod tests {
    use super::global_optimum;
    use crate::basis::BasisStore;
    use crate::biobj::{BiobjError, GLOBAL_BASIS};
    use crate::engine::{LpEngine, NetworkSimplex};
    use crate::network::Network;
    use crate::solution::SolutionState;

    #[test]
    fn probe_saves_optimal_basis() {
        let mut net = Network::new(3);
        net.set_balance(0, 2.0);
        net.set_balance(2, -2.0);
        net.add_arc(0, 1, 0.0, 10.0, 1.0);
        net.add_arc(1, 2, 0.0, 10.0, 1.0);
        net.add_arc(0, 2, 0.0, 10.0, 3.0);

        let mut spx = NetworkSimplex::new("probe", &net);
        spx.set_iteration_limit(Some(0));
        let mut store = BasisStore::new();
        let sol = global_optimum(spx, &mut store).unwrap();
        assert_eq!(sol.status, SolutionState::Optimal);
        assert_eq!(sol.objval, 4.0);
        assert_eq!(sol.x, vec![2.0, 2.0, 0.0]);
        assert_eq!(store.load(GLOBAL_BASIS).unwrap(), sol.basis);
    }

    #[test]
    fn probe_rejects_infeasible_problem() {
        let mut net = Network::new(2);
        net.set_balance(0, 3.0);
        net.set_balance(1, -3.0);
        net.add_arc(0, 1, 0.0, 1.0, 1.0);

        let mut store = BasisStore::new();
        let res = global_optimum(NetworkSimplex::new("probe", &net), &mut store);
        assert!(matches!(res, Err(BiobjError::ProbeFailed(_))));
        assert!(!store.contains(GLOBAL_BASIS));
    }
}
