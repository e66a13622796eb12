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

//! A primal network simplex implementation with explicit bases.
//!
//! Besides each arc of the network there is one artificial arc per node
//! connecting it with an artificial root node. The artificial arcs are
//! the slack columns of the flow conservation rows: the basis status of
//! a node is the status of its artificial arc. The initial basis
//! consists of the artificial arcs only, infeasibility is penalized by
//! a big artificial cost.
//!
//! The basis tree is rebuilt from the arc states after each basis
//! change. This allows arbitrary bases to be installed with
//! [`LpEngine::set_basis`] and single pivots with [`LpEngine::pivot`].

use super::{EngineError, EngineParams, LpEngine, Result};
use crate::basis::{Basis, BasisStatus};
use crate::dimacs;
use crate::network::Network;
use crate::solution::{Solution, SolutionState};
use num_traits::{Float, NumAssign};
use std::fmt::{Debug, Display};
use std::path::Path;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, trace};

const NONE: usize = usize::MAX;

/// Rule to select the entering arc.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pricing {
    /// First eligible arc after the previous entering arc.
    RoundRobin,
    /// Most negative reduced cost (Dantzig's rule).
    Complete,
    /// Most negative reduced cost within a block of arcs.
    Block,
}

/// A primal network simplex engine.
pub struct NetworkSimplex<F> {
    name: String,
    nnodes: usize,
    narcs: usize,

    balances: Vec<F>,
    potentials: Vec<F>,
    parent_nodes: Vec<usize>,
    parent_edges: Vec<usize>,
    depths: Vec<usize>,
    /// The nodes of the basis tree in breadth-first order from the root.
    preorder: Vec<usize>,

    sources: Vec<usize>,
    sinks: Vec<usize>,
    lower: Vec<F>,
    upper: Vec<F>,
    costs: Vec<F>,
    caps: Vec<F>,
    flows: Vec<F>,
    /// 1 at lower bound, -1 at upper bound, 0 basic.
    state: Vec<i8>,

    pub pricing: Pricing,
    current_edge: usize,
    block_size: usize,
    /// The value to be considered zero. Defaults to `1e-9`.
    pub zero: F,

    /// The artificial cost value.
    ///
    /// Should be larger than the value of any augmenting cycle. If
    /// `None` (the default) the artificial cost is set to
    /// `(max(max(cost), 0) + 1) * n`, which should be large enough.
    pub artificial_cost: Option<F>,
    /// The infinite flow value.
    ///
    /// Capacities greater than or equal to this are considered
    /// unbounded. The default is `F::max_value()`.
    pub infinite: F,

    params: EngineParams,
    niter: usize,
    solution_state: SolutionState,
    need_new_basis: bool,
    /// Whether all flows of the current basis are within their bounds.
    primal_ok: bool,
    solve_time: Duration,
}

impl<F> NetworkSimplex<F>
where
    F: Float + NumAssign + Debug,
{
    pub fn new(name: &str, net: &Network<F>) -> Self {
        let n = net.num_nodes();
        let m = net.num_arcs();

        let extend = |v: &[F], value: F| {
            let mut v = v.to_vec();
            v.resize(m + n, value);
            v
        };
        let mut sources = net.sources.clone();
        sources.resize(m + n, 0);
        let mut sinks = net.sinks.clone();
        sinks.resize(m + n, 0);

        NetworkSimplex {
            name: name.to_string(),
            nnodes: n,
            narcs: m,

            balances: net.balances.clone(),
            potentials: vec![F::zero(); n + 1],
            parent_nodes: vec![NONE; n + 1],
            parent_edges: vec![NONE; n + 1],
            depths: vec![0; n + 1],
            preorder: Vec::with_capacity(n + 1),

            sources,
            sinks,
            lower: extend(&net.lower, F::zero()),
            upper: extend(&net.upper, F::max_value()),
            costs: extend(&net.costs, F::zero()),
            caps: vec![F::zero(); m + n],
            flows: vec![F::zero(); m + n],
            state: vec![1; m + n],

            pricing: Pricing::Block,
            current_edge: 0,
            block_size: 0,
            zero: F::from(1e-9).unwrap_or_else(F::epsilon),

            artificial_cost: None,
            infinite: F::max_value(),

            params: EngineParams::default(),
            niter: 0,
            solution_state: SolutionState::Unknown,
            need_new_basis: true,
            primal_ok: false,
            solve_time: Duration::ZERO,
        }
    }

    /// Return the network of this instance (with the current costs).
    pub fn network(&self) -> Network<F> {
        let m = self.narcs;
        Network {
            sources: self.sources[..m].to_vec(),
            sinks: self.sinks[..m].to_vec(),
            balances: self.balances.clone(),
            lower: self.lower[..m].to_vec(),
            upper: self.upper[..m].to_vec(),
            costs: self.costs[..m].to_vec(),
        }
    }

    /// The flow on arc `i`.
    pub fn flow(&self, i: usize) -> F {
        self.flows[i] + self.lower[i]
    }

    /// Return the value of the latest computed flow.
    pub fn value(&self) -> F {
        let mut v = F::zero();
        for i in 0..self.narcs {
            v += self.flow(i) * self.costs[i];
        }
        v
    }

    /// The reduced cost of arc `i` with respect to the current basis.
    pub fn reduced_cost(&self, i: usize) -> F {
        self.costs[i] + self.potentials[self.sources[i]] - self.potentials[self.sinks[i]]
    }

    fn pricing_cost(&self, eid: usize) -> F {
        match self.state[eid] {
            1 => self.reduced_cost(eid),
            -1 => -self.reduced_cost(eid),
            _ => F::zero(),
        }
    }

    fn residual(&self, eid: usize, increase: bool) -> F {
        if !increase {
            self.flows[eid]
        } else if self.caps[eid] >= self.infinite {
            self.infinite
        } else {
            self.caps[eid] - self.flows[eid]
        }
    }

    fn initialize_pricing(&mut self) {
        match self.pricing {
            Pricing::RoundRobin => self.current_edge = 0,
            Pricing::Complete => (),
            Pricing::Block => {
                self.current_edge = 0;
                self.block_size = ((self.narcs as f64).sqrt() * 0.5).round().max(10.0) as usize;
            }
        }
    }

    fn prepare_initial_basis(&mut self) -> bool {
        let n = self.nnodes;
        let m = self.narcs;
        // The artificial node is always the root of the basis tree
        let root = n;

        // modified balances of each node
        let mut balances = self.balances.clone();

        // compute the cost value for the artificial nodes
        let artificial_cost = self.artificial_cost.unwrap_or_else(|| {
            let mut value = F::zero();
            for &c in &self.costs[0..m] {
                if c > value {
                    value = c;
                }
            }
            F::from(n).unwrap_or_else(F::max_value) * (F::one() + value)
        });

        // Initial flow on all non-artificial edges is at lower or upper bound depending on the cost
        for eid in 0..m {
            let cap = if self.upper[eid] >= self.infinite {
                self.infinite
            } else {
                self.upper[eid] - self.lower[eid]
            };

            if cap < -self.zero {
                return false;
            }

            let flw = if self.costs[eid] >= F::zero() || cap >= self.infinite {
                self.state[eid] = 1;
                F::zero()
            } else {
                self.state[eid] = -1;
                cap
            };

            self.flows[eid] = flw;
            self.caps[eid] = cap.max(F::zero());

            // Update artificial balances
            let flw = flw + self.lower[eid];
            balances[self.sources[eid]] -= flw;
            balances[self.sinks[eid]] += flw;
        }

        // The initial basis consists of the artificial edges only
        self.preorder.clear();
        self.preorder.push(root);
        self.parent_nodes[root] = NONE;
        self.parent_edges[root] = NONE;
        self.depths[root] = 0;
        for vid in 0..n {
            let eid = m + vid;
            if balances[vid] >= F::zero() {
                // oriented from v to the artificial node
                self.sources[eid] = vid;
                self.sinks[eid] = root;
                self.costs[eid] = F::zero();
                self.flows[eid] = balances[vid];
            } else {
                // oriented from the artificial node to v
                self.sources[eid] = root;
                self.sinks[eid] = vid;
                self.costs[eid] = artificial_cost;
                self.flows[eid] = -balances[vid];
            }
            self.lower[eid] = F::zero();
            self.upper[eid] = self.infinite;
            self.caps[eid] = self.infinite;
            self.state[eid] = 0;

            self.parent_nodes[vid] = root;
            self.parent_edges[vid] = eid;
            self.depths[vid] = 1;
            self.preorder.push(vid);
        }

        self.compute_potentials();
        self.need_new_basis = false;
        self.primal_ok = true;

        true
    }

    /// Rebuild the basis tree from the edge states.
    ///
    /// Fails if the basic edges do not form a spanning tree.
    fn rebuild_tree(&mut self) -> Result<()> {
        let n = self.nnodes;
        let root = n;

        let mut adjacent = vec![Vec::new(); n + 1];
        let mut nbasic = 0;
        for (eid, &s) in self.state.iter().enumerate() {
            if s == 0 {
                adjacent[self.sources[eid]].push(eid);
                adjacent[self.sinks[eid]].push(eid);
                nbasic += 1;
            }
        }
        if nbasic != n {
            return Err(EngineError::InvalidBasis(format!(
                "{} basic variables, expected {}",
                nbasic, n
            )));
        }

        let mut visited = vec![false; n + 1];
        visited[root] = true;
        self.preorder.clear();
        self.preorder.push(root);
        self.parent_nodes[root] = NONE;
        self.parent_edges[root] = NONE;
        self.depths[root] = 0;

        let mut i = 0;
        while i < self.preorder.len() {
            let uid = self.preorder[i];
            i += 1;
            for &eid in &adjacent[uid] {
                let vid = if self.sources[eid] == uid {
                    self.sinks[eid]
                } else {
                    self.sources[eid]
                };
                if !visited[vid] {
                    visited[vid] = true;
                    self.parent_nodes[vid] = uid;
                    self.parent_edges[vid] = eid;
                    self.depths[vid] = self.depths[uid] + 1;
                    self.preorder.push(vid);
                }
            }
        }

        if self.preorder.len() != n + 1 {
            return Err(EngineError::InvalidBasis(
                "basic arcs do not form a spanning tree".to_string(),
            ));
        }

        Ok(())
    }

    /// Compute the flows of all edges from the basis tree.
    ///
    /// Non-basic edges are at their bounds, the flow on basic edges
    /// is determined by the node balances. Returns `true` if all flows
    /// are within their bounds.
    fn compute_flows(&mut self) -> bool {
        let n = self.nnodes;
        let mut excess = self.balances.clone();
        excess.push(F::zero());

        for eid in 0..self.state.len() {
            if self.state[eid] == 0 {
                continue;
            }
            self.flows[eid] = if self.state[eid] == 1 { F::zero() } else { self.caps[eid] };
            let flw = self.flows[eid] + self.lower[eid];
            excess[self.sources[eid]] -= flw;
            excess[self.sinks[eid]] += flw;
        }

        // The subtree of v must send its excess over the parent edge.
        for k in (1..self.preorder.len()).rev() {
            let vid = self.preorder[k];
            let eid = self.parent_edges[vid];
            let r = excess[vid];
            let flw = if self.sources[eid] == vid { r } else { -r };
            let mut flw = flw - self.lower[eid];
            if flw.abs() <= self.zero {
                flw = F::zero();
            }
            self.flows[eid] = flw;
            excess[self.parent_nodes[vid]] += r;
        }
        debug_assert!(n + 1 == self.preorder.len());

        (0..self.flows.len()).all(|eid| {
            self.flows[eid] >= -self.zero
                && (self.caps[eid] >= self.infinite || self.flows[eid] <= self.caps[eid] + self.zero)
        })
    }

    fn compute_potentials(&mut self) {
        let root = self.nnodes;
        self.potentials[root] = F::zero();
        for k in 1..self.preorder.len() {
            let vid = self.preorder[k];
            let eid = self.parent_edges[vid];
            let uid = self.parent_nodes[vid];
            self.potentials[vid] = if self.sources[eid] == uid {
                self.potentials[uid] + self.costs[eid]
            } else {
                self.potentials[uid] - self.costs[eid]
            };
        }
    }

    /// Push flow around the cycle closed by `e_in` and update the basis.
    ///
    /// The leaving edge is the last blocking edge of the cycle
    /// traversed from its apex in direction of `e_in`.
    fn augment_cycle(&mut self, e_in: usize, leaving: BasisStatus) -> Result<()> {
        let fwd = self.state[e_in] == 1;
        let (a, b) = if fwd {
            (self.sources[e_in], self.sinks[e_in])
        } else {
            (self.sinks[e_in], self.sources[e_in])
        };

        // Walk up from both end nodes to the common ancestor.
        let mut a_side = Vec::new();
        let mut b_side = Vec::new();
        let (mut uid, mut vid) = (a, b);
        while uid != vid {
            if self.depths[uid] >= self.depths[vid] {
                a_side.push(uid);
                uid = self.parent_nodes[uid];
            } else {
                b_side.push(vid);
                vid = self.parent_nodes[vid];
            }
        }

        // The cycle in flow direction: apex -> a, a -> b, b -> apex.
        let mut cycle = Vec::with_capacity(a_side.len() + b_side.len() + 1);
        for &wid in a_side.iter().rev() {
            let eid = self.parent_edges[wid];
            cycle.push((eid, self.sources[eid] == self.parent_nodes[wid]));
        }
        cycle.push((e_in, fwd));
        for &wid in &b_side {
            let eid = self.parent_edges[wid];
            cycle.push((eid, self.sources[eid] == wid));
        }

        let mut d = self.infinite;
        let mut out = None;
        for (k, &(eid, inc)) in cycle.iter().enumerate() {
            let r = self.residual(eid, inc);
            if r < self.infinite && r <= d {
                d = r;
                out = Some(k);
            }
        }
        let out = out.ok_or(EngineError::Unbounded(e_in))?;
        let d = d.max(F::zero());

        for &(eid, inc) in &cycle {
            if inc {
                self.flows[eid] += d;
            } else {
                self.flows[eid] -= d;
            }
        }

        let (e_out, inc_out) = cycle[out];
        trace!(
            component = "network_simplex",
            operation = "pivot",
            entering = e_in,
            leaving = e_out,
            delta = ?d,
            "Augmented cycle"
        );

        if e_out == e_in {
            // switch bound, the basis does not change
            self.state[e_in] = -self.state[e_in];
            self.flows[e_in] = if self.state[e_in] == 1 { F::zero() } else { self.caps[e_in] };
            return Ok(());
        }

        let at_upper = if self.caps[e_out] <= self.zero {
            leaving == BasisStatus::AtUpper
        } else {
            inc_out
        };
        if at_upper {
            self.state[e_out] = -1;
            self.flows[e_out] = self.caps[e_out];
        } else {
            self.state[e_out] = 1;
            self.flows[e_out] = F::zero();
        }
        self.state[e_in] = 0;

        self.rebuild_tree()?;
        self.compute_potentials();

        Ok(())
    }

    /// Return `true` if the flow is feasible for the original problem.
    fn check_feasibility(&self) -> bool {
        self.primal_ok && self.flows[self.narcs..].iter().all(|&x| x <= self.zero)
    }

    /// Status of the current basis without further pivots.
    fn classify(&self) -> SolutionState {
        if !self.check_feasibility() {
            SolutionState::Infeasible
        } else if (0..self.narcs).any(|eid| self.pricing_cost(eid) < -self.zero) {
            SolutionState::Feasible
        } else {
            SolutionState::Optimal
        }
    }

    fn find_entering_edge(&mut self) -> Option<usize> {
        if self.narcs == 0 {
            return None;
        }
        match self.pricing {
            Pricing::RoundRobin => self.round_robin_pricing(),
            Pricing::Complete => self.complete_pricing(),
            Pricing::Block => self.block_pricing(),
        }
    }

    fn round_robin_pricing(&mut self) -> Option<usize> {
        let m = self.narcs;
        let start = self.current_edge % m;
        let mut eid = start;
        loop {
            if self.pricing_cost(eid) < -self.zero {
                self.current_edge = eid;
                return Some(eid);
            }
            eid = (eid + 1) % m;
            if eid == start {
                return None;
            }
        }
    }

    fn complete_pricing(&mut self) -> Option<usize> {
        let mut min_cost = -self.zero;
        let mut min_edge = None;
        for eid in 0..self.narcs {
            let c = self.pricing_cost(eid);
            if c < min_cost {
                min_cost = c;
                min_edge = Some(eid);
            }
        }
        min_edge
    }

    fn block_pricing(&mut self) -> Option<usize> {
        let m = self.narcs;
        let mut eid = self.current_edge % m;
        let mut min_edge = None;
        let mut min_cost = -self.zero;
        let mut cnt = 0;

        for _ in 0..m {
            let c = self.pricing_cost(eid);
            if c < min_cost {
                min_cost = c;
                min_edge = Some(eid);
            }
            eid = (eid + 1) % m;
            cnt += 1;
            // reached the end of the current block
            if cnt == self.block_size {
                if min_edge.is_some() {
                    break;
                }
                cnt = 0;
            }
        }

        if min_edge.is_some() {
            self.current_edge = eid;
        }
        min_edge
    }

    fn cast(&self, value: f64) -> Result<F> {
        F::from(value).ok_or(EngineError::Numeric(value))
    }

    fn finish_solve(&mut self, tstart: OffsetDateTime) {
        self.solve_time = OffsetDateTime::now_utc() - tstart;
        let objval = self.value().to_f64().unwrap_or(f64::NAN);
        if self.params.screen_output {
            info!(
                component = "network_simplex",
                operation = "solve",
                problem = %self.name,
                status = ?self.solution_state,
                objval,
                iterations = self.niter as u64,
                seconds = self.solve_time.as_seconds_f64(),
                "Primal simplex finished"
            );
        } else {
            debug!(
                component = "network_simplex",
                operation = "solve",
                problem = %self.name,
                status = ?self.solution_state,
                objval,
                iterations = self.niter as u64,
                seconds = self.solve_time.as_seconds_f64(),
                "Primal simplex finished"
            );
        }
    }
}

impl<F> NetworkSimplex<F>
where
    F: Float + NumAssign + Debug + FromStr,
    F::Err: Display,
{
    /// Read a DIMACS min-cost-flow file.
    ///
    /// The instance is named after the file.
    pub fn read_from_file<P: AsRef<Path>>(filename: P) -> Result<Self> {
        let path = filename.as_ref();
        let net = dimacs::min::read_from_file(path)?;
        Ok(NetworkSimplex::new(&path.display().to_string(), &net))
    }
}

impl<F> LpEngine for NetworkSimplex<F>
where
    F: Float + NumAssign + Debug,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn num_arcs(&self) -> usize {
        self.narcs
    }

    fn num_nodes(&self) -> usize {
        self.nnodes
    }

    fn clone_problem(&self, name: &str) -> Result<Self> {
        let mut spx = NetworkSimplex::new(name, &self.network());
        spx.pricing = self.pricing;
        spx.zero = self.zero;
        spx.artificial_cost = self.artificial_cost;
        spx.infinite = self.infinite;
        spx.params = self.params.clone();
        Ok(spx)
    }

    fn costs(&self) -> Vec<f64> {
        self.costs[..self.narcs]
            .iter()
            .map(|c| c.to_f64().unwrap_or(f64::NAN))
            .collect()
    }

    fn set_costs(&mut self, begin: usize, costs: &[f64]) -> Result<()> {
        let end = begin
            .checked_add(costs.len())
            .ok_or(EngineError::ArcOutOfRange(begin))?;
        if end > self.narcs {
            return Err(EngineError::ArcOutOfRange(end - 1));
        }
        for (i, &c) in costs.iter().enumerate() {
            self.costs[begin + i] = self.cast(c)?;
        }
        if !self.need_new_basis {
            self.compute_potentials();
        }
        self.solution_state = SolutionState::Unknown;
        Ok(())
    }

    fn params(&self) -> &EngineParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut EngineParams {
        &mut self.params
    }

    fn primal_opt(&mut self) -> Result<()> {
        let tstart = OffsetDateTime::now_utc();
        self.niter = 0;
        trace!(
            component = "network_simplex",
            operation = "solve",
            problem = %self.name,
            iteration_limit = ?self.params.iteration_limit,
            advanced_start = self.params.advanced_start,
            presolve = self.params.presolve,
            aggregator = self.params.aggregator,
            scaling = self.params.scaling,
            "Starting primal simplex"
        );

        if (self.need_new_basis || !self.params.advanced_start) && !self.prepare_initial_basis() {
            self.solution_state = SolutionState::Infeasible;
            self.finish_solve(tstart);
            return Ok(());
        }

        // An infeasible advanced basis is not repaired.
        if !self.primal_ok {
            self.solution_state = SolutionState::Infeasible;
            self.finish_solve(tstart);
            return Ok(());
        }

        self.initialize_pricing();

        while let Some(eid) = self.find_entering_edge() {
            if let Some(limit) = self.params.iteration_limit {
                if self.niter >= limit {
                    self.solution_state = SolutionState::IterationLimit;
                    self.finish_solve(tstart);
                    return Ok(());
                }
            }
            self.niter += 1;
            match self.augment_cycle(eid, BasisStatus::AtLower) {
                Ok(()) => (),
                Err(EngineError::Unbounded(_)) => {
                    self.solution_state = SolutionState::Unbounded;
                    self.finish_solve(tstart);
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }

        self.solution_state = if self.check_feasibility() {
            SolutionState::Optimal
        } else {
            SolutionState::Infeasible
        };
        self.finish_solve(tstart);

        Ok(())
    }

    fn solution_state(&self) -> SolutionState {
        if self.need_new_basis {
            SolutionState::Unknown
        } else {
            self.solution_state
        }
    }

    fn objective_value(&self) -> f64 {
        self.value().to_f64().unwrap_or(f64::NAN)
    }

    fn num_iterations(&self) -> usize {
        self.niter
    }

    fn solve_time(&self) -> Duration {
        self.solve_time
    }

    fn solution_into(&self, sol: &mut Solution) -> Result<()> {
        if sol.num_arcs() != self.narcs {
            return Err(EngineError::DimensionMismatch {
                what: "solution arcs",
                expected: self.narcs,
                got: sol.num_arcs(),
            });
        }
        if sol.dj.len() != self.narcs {
            return Err(EngineError::DimensionMismatch {
                what: "solution reduced costs",
                expected: self.narcs,
                got: sol.dj.len(),
            });
        }
        if sol.num_nodes() != self.nnodes {
            return Err(EngineError::DimensionMismatch {
                what: "solution nodes",
                expected: self.nnodes,
                got: sol.num_nodes(),
            });
        }
        if sol.slack.len() != self.nnodes {
            return Err(EngineError::DimensionMismatch {
                what: "solution slacks",
                expected: self.nnodes,
                got: sol.slack.len(),
            });
        }

        let f64_of = |v: F| v.to_f64().unwrap_or(f64::NAN);

        sol.status = self.solution_state();
        sol.objval = self.objective_value();

        let mut netflow = vec![F::zero(); self.nnodes];
        for i in 0..self.narcs {
            let flw = self.flow(i);
            netflow[self.sources[i]] += flw;
            netflow[self.sinks[i]] -= flw;
            sol.x[i] = f64_of(flw);
            sol.dj[i] = f64_of(self.reduced_cost(i));
        }
        for u in 0..self.nnodes {
            sol.pi[u] = f64_of(-self.potentials[u]);
            sol.slack[u] = f64_of(self.balances[u] - netflow[u]);
        }

        Ok(())
    }

    fn basis(&self) -> Result<Basis> {
        if self.need_new_basis {
            return Err(EngineError::InvalidBasis(format!("problem '{}' has no basis", self.name)));
        }
        let status = |s: i8| match s {
            0 => BasisStatus::Basic,
            -1 => BasisStatus::AtUpper,
            _ => BasisStatus::AtLower,
        };
        Ok(Basis {
            arcs: self.state[..self.narcs].iter().map(|&s| status(s)).collect(),
            nodes: self.state[self.narcs..]
                .iter()
                .map(|&s| if s == 0 { BasisStatus::Basic } else { BasisStatus::AtLower })
                .collect(),
        })
    }

    fn set_basis(&mut self, basis: &Basis) -> Result<()> {
        if basis.num_arcs() != self.narcs {
            return Err(EngineError::DimensionMismatch {
                what: "basis arcs",
                expected: self.narcs,
                got: basis.num_arcs(),
            });
        }
        if basis.num_nodes() != self.nnodes {
            return Err(EngineError::DimensionMismatch {
                what: "basis nodes",
                expected: self.nnodes,
                got: basis.num_nodes(),
            });
        }

        // The artificial edges are set up with the initial basis.
        if self.need_new_basis && !self.prepare_initial_basis() {
            return Err(EngineError::InvalidBasis(format!(
                "problem '{}' has inconsistent bounds",
                self.name
            )));
        }

        for (eid, s) in basis.arcs.iter().enumerate() {
            if *s == BasisStatus::AtUpper && self.caps[eid] >= self.infinite {
                return Err(EngineError::InvalidBasis(format!(
                    "arc {} has no finite upper bound",
                    eid
                )));
            }
        }

        for (eid, s) in basis.arcs.iter().enumerate() {
            self.state[eid] = match s {
                BasisStatus::AtLower => 1,
                BasisStatus::Basic => 0,
                BasisStatus::AtUpper => -1,
            };
        }
        for (vid, s) in basis.nodes.iter().enumerate() {
            self.state[self.narcs + vid] = if s.is_basic() { 0 } else { 1 };
        }

        if let Err(err) = self.rebuild_tree() {
            // the previous basis is gone
            self.need_new_basis = true;
            return Err(err);
        }
        self.primal_ok = self.compute_flows();
        self.compute_potentials();
        self.solution_state = SolutionState::Unknown;

        debug!(
            component = "network_simplex",
            operation = "set_basis",
            problem = %self.name,
            primal_feasible = self.primal_ok,
            "Basis installed"
        );

        Ok(())
    }

    fn pivot(&mut self, arc: usize, leaving: BasisStatus) -> Result<()> {
        if arc >= self.narcs {
            return Err(EngineError::ArcOutOfRange(arc));
        }
        if self.need_new_basis {
            return Err(EngineError::InvalidBasis(format!("problem '{}' has no basis", self.name)));
        }
        if self.state[arc] == 0 {
            return Err(EngineError::ArcIsBasic(arc));
        }
        if !self.primal_ok {
            return Err(EngineError::InvalidBasis(
                "current basis is not primal feasible".to_string(),
            ));
        }

        self.augment_cycle(arc, leaving)?;
        self.solution_state = self.classify();

        debug!(
            component = "network_simplex",
            operation = "pivot",
            problem = %self.name,
            arc,
            status = ?self.solution_state,
            objval = self.objective_value(),
            "Pivoted arc into basis"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NetworkSimplex, Pricing};
    use crate::basis::{Basis, BasisStatus::*};
    use crate::engine::{EngineError, LpEngine};
    use crate::network::Network;
    use crate::solution::{Solution, SolutionState};

    fn small_net() -> Network<f64> {
        let mut net = Network::new(4);
        net.set_balance(0, 4.0);
        net.set_balance(3, -4.0);
        net.add_arc(0, 1, 0.0, 4.0, 2.0);
        net.add_arc(0, 2, 0.0, 2.0, 2.0);
        net.add_arc(1, 2, 0.0, 2.0, 1.0);
        net.add_arc(1, 3, 0.0, 3.0, 3.0);
        net.add_arc(2, 3, 0.0, 5.0, 1.0);
        net
    }

    fn solved(pricing: Pricing) -> NetworkSimplex<f64> {
        let net = small_net();
        let mut spx = NetworkSimplex::new("small", &net);
        spx.pricing = pricing;
        spx.primal_opt().unwrap();
        spx
    }

    #[test]
    fn solve_small_network() {
        let spx = solved(Pricing::Block);
        assert_eq!(spx.solution_state(), SolutionState::Optimal);
        assert_eq!(spx.objective_value(), 14.0);

        let mut sol = Solution::new(5, 4).unwrap();
        spx.read_solution(&mut sol).unwrap();
        assert_eq!(sol.x, vec![2.0, 2.0, 2.0, 0.0, 4.0]);
        assert!(sol.slack.iter().all(|s| s.abs() < 1e-9));
        assert_eq!(sol.basis.num_basic(), 4);

        // optimality conditions
        for i in 0..5 {
            match sol.basis.arcs[i] {
                AtLower => assert!(sol.dj[i] >= -1e-9),
                AtUpper => assert!(sol.dj[i] <= 1e-9),
                Basic => assert!(sol.dj[i].abs() <= 1e-9),
            }
        }
        // arcs with flow strictly between their bounds
        assert_eq!(sol.basis.arcs[0], Basic);
        assert_eq!(sol.basis.arcs[4], Basic);
    }

    #[test]
    fn all_pricing_rules_agree() {
        for &pricing in &[Pricing::Block, Pricing::Complete, Pricing::RoundRobin] {
            let spx = solved(pricing);
            assert_eq!(spx.solution_state(), SolutionState::Optimal);
            assert_eq!(spx.objective_value(), 14.0);
        }
    }

    #[test]
    fn zero_iteration_limit() {
        let net = small_net();
        let mut spx = NetworkSimplex::new("small", &net);
        spx.set_iteration_limit(Some(0));
        spx.primal_opt().unwrap();
        assert_eq!(spx.solution_state(), SolutionState::IterationLimit);
        assert_eq!(spx.num_iterations(), 0);
        // only artificial arcs are basic
        let basis = spx.basis().unwrap();
        assert!(basis.arcs.iter().all(|s| !s.is_basic()));
        assert!(basis.nodes.iter().all(|s| s.is_basic()));
    }

    #[test]
    fn reload_optimal_basis() {
        let spx = solved(Pricing::Block);
        let basis = spx.basis().unwrap();

        let mut other = spx.clone_problem("other").unwrap();
        assert_eq!(other.solution_state(), SolutionState::Unknown);
        assert!(other.basis().is_err());
        other.set_basis(&basis).unwrap();
        other.set_iteration_limit(Some(0));
        other.primal_opt().unwrap();
        assert_eq!(other.solution_state(), SolutionState::Optimal);
        assert_eq!(other.num_iterations(), 0);

        let mut a = Solution::new(5, 4).unwrap();
        let mut b = Solution::new(5, 4).unwrap();
        spx.read_solution(&mut a).unwrap();
        other.read_solution(&mut b).unwrap();
        assert!(a.approx_eq(&b, 1e-9));
    }

    #[test]
    fn reject_invalid_bases() {
        let net = small_net();
        let mut spx = NetworkSimplex::new("small", &net);

        // wrong dimension
        let basis = Basis::new(4, 4);
        assert!(matches!(spx.set_basis(&basis), Err(EngineError::DimensionMismatch { .. })));

        // too few basic variables
        let basis = Basis::new(5, 4);
        assert!(matches!(spx.set_basis(&basis), Err(EngineError::InvalidBasis(_))));

        // a cycle 1-2-3 with node 4 disconnected
        let basis = Basis {
            arcs: vec![Basic, Basic, Basic, AtLower, AtLower],
            nodes: vec![Basic, AtLower, AtLower, AtLower],
        };
        assert!(matches!(spx.set_basis(&basis), Err(EngineError::InvalidBasis(_))));
    }

    #[test]
    fn pivot_errors() {
        let mut spx = solved(Pricing::Complete);
        assert!(matches!(spx.pivot(7, AtLower), Err(EngineError::ArcOutOfRange(7))));
        assert!(matches!(spx.pivot(0, AtLower), Err(EngineError::ArcIsBasic(0))));

        let mut fresh = NetworkSimplex::new("fresh", &small_net());
        assert!(matches!(fresh.pivot(3, AtLower), Err(EngineError::InvalidBasis(_))));
    }

    #[test]
    fn pivot_with_bound_flip() {
        let mut net = Network::new(2);
        net.set_balance(0, 5.0);
        net.set_balance(1, -5.0);
        net.add_arc(0, 1, 0.0, 10.0, 2.0);
        net.add_arc(0, 1, 0.0, 2.0, 1.0);

        let mut spx = NetworkSimplex::new("parallel", &net);
        spx.set_basis(&Basis {
            arcs: vec![Basic, AtLower],
            nodes: vec![Basic, AtLower],
        })
        .unwrap();
        assert_eq!(spx.flow(0), 5.0);

        spx.pivot(1, AtLower).unwrap();
        let basis = spx.basis().unwrap();
        assert_eq!(basis.arcs, vec![Basic, AtUpper]);
        assert_eq!(basis.nodes, vec![Basic, AtLower]);
        assert_eq!(spx.flow(0), 3.0);
        assert_eq!(spx.flow(1), 2.0);
        assert_eq!(spx.solution_state(), SolutionState::Optimal);
        assert_eq!(spx.objective_value(), 8.0);
    }

    #[test]
    fn pivot_changes_basis() {
        let mut net = Network::new(3);
        net.set_balance(0, 2.0);
        net.set_balance(2, -2.0);
        net.add_arc(0, 1, 0.0, 10.0, 1.0);
        net.add_arc(1, 2, 0.0, 10.0, 1.0);
        net.add_arc(0, 2, 0.0, 10.0, 1.0);

        let mut spx = NetworkSimplex::new("triangle", &net);
        spx.set_basis(&Basis {
            arcs: vec![Basic, Basic, AtLower],
            nodes: vec![Basic, AtLower, AtLower],
        })
        .unwrap();
        assert_eq!(spx.objective_value(), 4.0);

        let mut sol = Solution::new(3, 3).unwrap();
        spx.solution_into(&mut sol).unwrap();
        assert_eq!(sol.dj, vec![0.0, 0.0, -1.0]);

        spx.pivot(2, AtLower).unwrap();
        let basis = spx.basis().unwrap();
        assert_eq!(basis.arcs[2], Basic);
        assert_eq!(basis.num_basic(), 3);
        assert_eq!(spx.flow(2), 2.0);
        assert_eq!(spx.objective_value(), 2.0);
        assert_eq!(spx.solution_state(), SolutionState::Optimal);
    }

    #[test]
    fn solution_size_errors() {
        let spx = solved(Pricing::Complete);

        let mismatch = |sol: &mut Solution| match spx.solution_into(sol) {
            Err(EngineError::DimensionMismatch { what, expected, got }) => (what, expected, got),
            res => panic!("unexpected result {:?}", res),
        };

        let mut sol = Solution::new(5, 4).unwrap();
        sol.dj.pop();
        assert_eq!(mismatch(&mut sol), ("solution reduced costs", 5, 4));

        let mut sol = Solution::new(5, 4).unwrap();
        sol.slack.push(0.0);
        assert_eq!(mismatch(&mut sol), ("solution slacks", 4, 5));

        let mut sol = Solution::new(5, 3).unwrap();
        assert_eq!(mismatch(&mut sol), ("solution nodes", 4, 3));

        let mut sol = Solution::new(5, 4).unwrap();
        spx.solution_into(&mut sol).unwrap();
        assert_eq!(sol.objval, 14.0);
    }

    #[test]
    fn detect_unbounded() {
        let mut net = Network::new(2);
        net.add_arc(0, 1, 0.0, f64::MAX, -1.0);
        net.add_arc(1, 0, 0.0, f64::MAX, 0.0);

        let mut spx = NetworkSimplex::new("cycle", &net);
        spx.primal_opt().unwrap();
        assert_eq!(spx.solution_state(), SolutionState::Unbounded);
    }

    #[test]
    fn detect_infeasible() {
        let mut net = Network::new(2);
        net.set_balance(0, 5.0);
        net.set_balance(1, -5.0);
        net.add_arc(0, 1, 0.0, 3.0, 1.0);

        let mut spx = NetworkSimplex::new("tight", &net);
        spx.primal_opt().unwrap();
        assert_eq!(spx.solution_state(), SolutionState::Infeasible);
    }

    #[test]
    fn change_costs() {
        let mut spx = solved(Pricing::Block);
        assert!(matches!(spx.set_costs(4, &[1.0, 1.0]), Err(EngineError::ArcOutOfRange(5))));
        assert!(matches!(
            spx.set_costs(usize::MAX, &[1.0, 1.0]),
            Err(EngineError::ArcOutOfRange(usize::MAX))
        ));
        spx.set_costs(3, &[0.0]).unwrap();
        assert_eq!(spx.costs(), vec![2.0, 2.0, 1.0, 0.0, 1.0]);
        spx.primal_opt().unwrap();
        assert_eq!(spx.solution_state(), SolutionState::Optimal);
        // 3 units over 1-2-4 at cost 2, 1 unit over 1-3-4 at cost 3
        assert_eq!(spx.objective_value(), 9.0);
    }
}
