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

//! Solutions of a network flow problem with respect to one objective.

use std::iter::Sum;
use std::ops::Mul;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

use crate::basis::Basis;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum SolutionState {
    /// Unknown state, the problem has not been solved, yet
    Unknown,
    /// The problem has been solved to optimality
    Optimal,
    /// The current basis is primal feasible but not known to be optimal
    Feasible,
    /// The problem (or the current basis) is infeasible
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The iteration limit has been reached before optimality
    IterationLimit,
}

/// Primal and dual values of one objective at one basis.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Solution {
    pub status: SolutionState,
    pub objval: f64,
    /// Flow value of each arc.
    pub x: Vec<f64>,
    /// Reduced cost of each arc.
    pub dj: Vec<f64>,
    /// Dual value of each node.
    pub pi: Vec<f64>,
    /// Slack of each node's flow conservation row.
    pub slack: Vec<f64>,
    pub basis: Basis,
}

impl Solution {
    /// Create an empty solution for a problem of the given size.
    ///
    /// Returns `None` if the problem has no arcs or no nodes.
    pub fn new(narcs: usize, nnodes: usize) -> Option<Solution> {
        if narcs == 0 || nnodes == 0 {
            return None;
        }
        Some(Solution {
            status: SolutionState::Unknown,
            objval: 0.0,
            x: vec![0.0; narcs],
            dj: vec![0.0; narcs],
            pi: vec![0.0; nnodes],
            slack: vec![0.0; nnodes],
            basis: Basis::new(narcs, nnodes),
        })
    }

    pub fn num_arcs(&self) -> usize {
        self.x.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.pi.len()
    }

    /// Return `true` if both solutions have the same values.
    ///
    /// Values are compared up to the absolute tolerance `eps`, the
    /// status and the basis must agree exactly.
    pub fn approx_eq(&self, other: &Solution, eps: f64) -> bool {
        let close = |a: &[f64], b: &[f64]| a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= eps);
        self.status == other.status
            && (self.objval - other.objval).abs() <= eps
            && close(&self.x[..], &other.x[..])
            && close(&self.dj[..], &other.dj[..])
            && close(&self.pi[..], &other.pi[..])
            && close(&self.slack[..], &other.slack[..])
            && self.basis == other.basis
    }
}

/// Return the objective value `costs^T flow`.
///
/// If one of the vectors is missing the value is zero. Vectors of
/// different length are multiplied on their common prefix.
pub fn objective_value<T>(costs: Option<&[T]>, flow: Option<&[T]>) -> T
where
    T: Copy + Mul<Output = T> + Sum<T>,
{
    match (costs, flow) {
        (Some(c), Some(x)) => c.iter().zip(x).map(|(&c, &x)| c * x).sum(),
        _ => std::iter::empty::<T>().sum(),
    }
}
