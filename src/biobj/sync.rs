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

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::basis::BasisStore;
use crate::engine::{LpEngine, Result};
use crate::solution::Solution;

/// Iteration limit of an engine between two synchronizations.
pub const RESTORED_ITERATION_LIMIT: Option<usize> = Some(1);

/// Resets the iteration limit of the engine when dropped.
struct LimitGuard<'a, E: LpEngine> {
    engine: &'a mut E,
}

impl<'a, E: LpEngine> Deref for LimitGuard<'a, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.engine
    }
}

impl<'a, E: LpEngine> DerefMut for LimitGuard<'a, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.engine
    }
}

impl<'a, E: LpEngine> Drop for LimitGuard<'a, E> {
    fn drop(&mut self) {
        self.engine.set_iteration_limit(RESTORED_ITERATION_LIMIT);
    }
}

/// Load the basis `basis_name` into `engine` and read its solution.
///
/// The engine solves with an iteration limit of zero, so primal and
/// dual values are recomputed for the loaded basis without changing
/// it. The basis is saved again as `out_name`. The iteration limit is
/// reset to one on return, also on failure.
pub fn synchronize<E: LpEngine>(
    engine: &mut E,
    store: &mut BasisStore,
    basis_name: &str,
    sol: &mut Solution,
    out_name: &str,
) -> Result<()> {
    let mut engine = LimitGuard { engine };

    engine.set_iteration_limit(Some(0));
    engine.read_basis(store, basis_name)?;
    engine.primal_opt()?;
    engine.read_solution(sol)?;
    engine.write_basis(store, out_name)?;

    debug!(
        component = "biobj",
        operation = "synchronize",
        problem = engine.name(),
        basis = basis_name,
        output = out_name,
        status = ?sol.status,
        objval = sol.objval,
        "Solution synchronized"
    );

    Ok(())
}
