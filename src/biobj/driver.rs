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

//! The pivoting loop.

use tracing::{debug, info, warn};

use super::entering::{entering_arc, NoImprovingArc};
use super::perturb::perturbation_start;
use super::probe::global_optimum;
use super::sync::{synchronize, RESTORED_ITERATION_LIMIT};
use super::{BiobjError, BASIS1, BASIS2, PERTURBED_BASIS};
use crate::basis::{BasisStatus, BasisStore};
use crate::engine::LpEngine;
use crate::solution::Solution;

/// The phase of a driver run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DriverState {
    Init,
    Converging,
    Terminated,
    Failed,
    Cleanup,
}

/// What to do if no arc improves the second objective.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NoArcPolicy {
    /// Stop with [`BiobjError::NoImprovingArc`].
    Fail,
    /// Stop successfully with [`Termination::Exhausted`].
    Converge,
}

impl Default for NoArcPolicy {
    fn default() -> Self {
        NoArcPolicy::Fail
    }
}

/// Configuration of a driver run.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Relative tolerance of the termination test.
    ///
    /// The run terminates once `|objval2 - floor| <= tolerance * (1 + |floor|)`.
    /// A value of `0` requires exact equality. Negative and NaN values are
    /// rejected by [`BiobjDriver::new`].
    pub tolerance: f64,
    pub no_arc_policy: NoArcPolicy,
    /// Maximal number of pivots, `None` means unlimited.
    pub max_pivots: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            tolerance: 1e-9,
            no_arc_policy: NoArcPolicy::default(),
            max_pivots: None,
        }
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_no_arc_policy(mut self, policy: NoArcPolicy) -> Self {
        self.no_arc_policy = policy;
        self
    }

    pub fn with_max_pivots(mut self, max_pivots: Option<usize>) -> Self {
        self.max_pivots = max_pivots;
        self
    }

    /// Return `true` if `objval2` is at the floor.
    pub fn reached(&self, floor: f64, objval2: f64) -> bool {
        (objval2 - floor).abs() <= self.tolerance * (1.0 + floor.abs())
    }
}

/// Why a run stopped successfully.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Termination {
    /// The second objective reached its global optimum.
    ReachedFloor,
    /// No improving arc was left.
    Exhausted,
}

/// One pivot of the run.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PivotStep {
    /// The entering arc.
    pub arc: usize,
    /// Its ratio `dj2 / dj1` before the pivot.
    pub ratio: f64,
    /// Value of the first objective after the pivot.
    pub objval1: f64,
    /// Value of the second objective after the pivot.
    pub objval2: f64,
}

/// The result of a successful run.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub termination: Termination,
    /// Global optimum of the second objective.
    pub floor: f64,
    /// Values of both objectives at the perturbed optimum.
    pub start: (f64, f64),
    pub steps: Vec<PivotStep>,
    pub solution1: Solution,
    pub solution2: Solution,
    /// Simplex iterations of the latest solve of each engine.
    pub iterations: (usize, usize),
}

/// Drives two engine instances from the perturbed optimum to the
/// optimum of the second objective.
///
/// `engine1` holds the problem with the first, `engine2` the problem
/// with the second objective. Both must be loaded with the same network.
pub struct BiobjDriver<E: LpEngine> {
    engine1: E,
    engine2: E,
    store: BasisStore,
    config: DriverConfig,
    state: DriverState,
}

fn configure<E: LpEngine>(engine: &mut E) {
    let params = engine.params_mut();
    params.advanced_start = true;
    params.presolve = false;
    params.aggregator = false;
    params.scaling = false;
    params.iteration_limit = RESTORED_ITERATION_LIMIT;
}

fn check_bases(sol1: &Solution, sol2: &Solution) -> Result<(), BiobjError> {
    if sol1.basis == sol2.basis {
        return Ok(());
    }
    let arcs = sol1.basis.changed_arcs(&sol2.basis).collect();
    let nodes = (0..sol1.num_nodes())
        .filter(|&u| sol2.basis.nodes.get(u) != Some(&sol1.basis.nodes[u]))
        .collect();
    Err(BiobjError::BasisMismatch { arcs, nodes })
}

impl<E: LpEngine> BiobjDriver<E> {
    pub fn new(engine1: E, engine2: E, store: BasisStore, config: DriverConfig) -> Result<Self, BiobjError> {
        if config.tolerance.is_nan() || config.tolerance < 0.0 {
            return Err(BiobjError::InvalidTolerance(config.tolerance));
        }
        if engine1.num_arcs() == 0 || engine1.num_nodes() == 0 {
            return Err(BiobjError::EmptyNetwork);
        }
        if engine1.num_arcs() != engine2.num_arcs() || engine1.num_nodes() != engine2.num_nodes() {
            return Err(BiobjError::StructureMismatch(format!(
                "{} nodes and {} arcs in '{}', {} nodes and {} arcs in '{}'",
                engine1.num_nodes(),
                engine1.num_arcs(),
                engine1.name(),
                engine2.num_nodes(),
                engine2.num_arcs(),
                engine2.name()
            )));
        }

        Ok(BiobjDriver {
            engine1,
            engine2,
            store,
            config,
            state: DriverState::Init,
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn transition(&mut self, next: DriverState) {
        debug!(
            component = "biobj_driver",
            operation = "transition",
            from = ?self.state,
            to = ?next,
            "Driver state changed"
        );
        self.state = next;
    }

    /// Run the pivoting procedure.
    ///
    /// Both engines, the basis store and all intermediate solutions are
    /// dropped on return.
    pub fn run(mut self) -> Result<Outcome, BiobjError> {
        let result = self.converge();
        self.finish(result)
    }

    fn finish(&mut self, result: Result<Outcome, BiobjError>) -> Result<Outcome, BiobjError> {
        match &result {
            Ok(outcome) => {
                self.transition(DriverState::Terminated);
                info!(
                    component = "biobj_driver",
                    operation = "run",
                    termination = ?outcome.termination,
                    pivots = outcome.steps.len() as u64,
                    objval1 = outcome.solution1.objval,
                    objval2 = outcome.solution2.objval,
                    "Pivoting finished"
                );
            }
            Err(err) => {
                self.transition(DriverState::Failed);
                warn!(component = "biobj_driver", operation = "run", error = %err, "Pivoting failed");
            }
        }
        self.transition(DriverState::Cleanup);
        result
    }

    fn converge(&mut self) -> Result<Outcome, BiobjError> {
        let narcs = self.engine1.num_arcs();
        let nnodes = self.engine1.num_nodes();

        configure(&mut self.engine1);
        configure(&mut self.engine2);

        let probe = self.engine2.clone_problem(&format!("{}-probe", self.engine2.name()))?;
        let floor = global_optimum(probe, &mut self.store)?.objval;

        perturbation_start(&self.engine1, &self.engine2.costs(), &mut self.store)?;

        let mut sol1 = Solution::new(narcs, nnodes).ok_or(BiobjError::EmptyNetwork)?;
        let mut sol2 = Solution::new(narcs, nnodes).ok_or(BiobjError::EmptyNetwork)?;
        synchronize(&mut self.engine1, &mut self.store, PERTURBED_BASIS, &mut sol1, BASIS1)?;
        synchronize(&mut self.engine2, &mut self.store, PERTURBED_BASIS, &mut sol2, BASIS2)?;
        check_bases(&sol1, &sol2)?;

        let start = (sol1.objval, sol2.objval);
        info!(
            component = "biobj_driver",
            operation = "init",
            floor,
            objval1 = sol1.objval,
            objval2 = sol2.objval,
            "Starting from perturbed optimum"
        );

        self.transition(DriverState::Converging);
        let mut steps = Vec::new();
        let termination = loop {
            if self.config.reached(floor, sol2.objval) {
                break Termination::ReachedFloor;
            }
            if let Some(max) = self.config.max_pivots {
                if steps.len() >= max {
                    return Err(BiobjError::PivotLimit(max));
                }
            }

            let candidate = match entering_arc(&sol1.dj, &sol2.dj, &sol2.basis.arcs) {
                Ok(candidate) => candidate,
                Err(NoImprovingArc) => match self.config.no_arc_policy {
                    NoArcPolicy::Fail => return Err(BiobjError::NoImprovingArc { objval2: sol2.objval }),
                    NoArcPolicy::Converge => break Termination::Exhausted,
                },
            };

            self.engine2.pivot(candidate.arc, BasisStatus::AtLower)?;
            self.engine2.read_solution(&mut sol2)?;
            self.engine2.write_basis(&mut self.store, BASIS2)?;
            synchronize(&mut self.engine1, &mut self.store, BASIS2, &mut sol1, BASIS1)?;
            check_bases(&sol1, &sol2)?;

            let step = PivotStep {
                arc: candidate.arc,
                ratio: candidate.ratio,
                objval1: sol1.objval,
                objval2: sol2.objval,
            };
            debug!(
                component = "biobj_driver",
                operation = "pivot",
                pivot = steps.len() as u64 + 1,
                arc = step.arc,
                ratio = step.ratio,
                objval1 = step.objval1,
                objval2 = step.objval2,
                "Pivot done"
            );
            steps.push(step);
        };

        Ok(Outcome {
            termination,
            floor,
            start,
            steps,
            solution1: sol1,
            solution2: sol2,
            iterations: (self.engine1.num_iterations(), self.engine2.num_iterations()),
        })
    }
}
