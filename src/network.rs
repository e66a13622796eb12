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

//! Network flow problem data.
//!
//! A [`Network`] is the feasible region of a min-cost-flow problem
//! together with one cost vector. Nodes and arcs are numbered from `0`;
//! arc `i` runs from `sources[i]` to `sinks[i]`.

use num_traits::Zero;

/// A min-cost-flow instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Network<T> {
    /// The source node of each arc.
    pub sources: Vec<usize>,
    /// The sink node of each arc.
    pub sinks: Vec<usize>,
    /// The node balance, supply if positive and demand if negative.
    pub balances: Vec<T>,
    /// The lower bounds.
    pub lower: Vec<T>,
    /// The upper bounds.
    pub upper: Vec<T>,
    /// The arc costs.
    pub costs: Vec<T>,
}

impl<T> Network<T>
where
    T: Zero + Clone,
{
    /// Create a network with `nnodes` nodes of zero balance and no arcs.
    pub fn new(nnodes: usize) -> Self {
        Network {
            sources: vec![],
            sinks: vec![],
            balances: vec![T::zero(); nnodes],
            lower: vec![],
            upper: vec![],
            costs: vec![],
        }
    }

    /// Set the balance of node `u`.
    pub fn set_balance(&mut self, u: usize, balance: T) {
        self.balances[u] = balance;
    }

    /// Add a new arc `(u,v)` with bounds and cost, returns its index.
    pub fn add_arc(&mut self, u: usize, v: usize, lower: T, upper: T, cost: T) -> usize {
        assert!(u < self.num_nodes() && v < self.num_nodes(), "invalid arc ({},{})", u, v);
        self.sources.push(u);
        self.sinks.push(v);
        self.lower.push(lower);
        self.upper.push(upper);
        self.costs.push(cost);
        self.costs.len() - 1
    }
}

impl<T> Network<T> {
    pub fn num_nodes(&self) -> usize {
        self.balances.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.sources.len()
    }

    /// The end nodes `(src, snk)` of arc `i`.
    pub fn arc(&self, i: usize) -> (usize, usize) {
        (self.sources[i], self.sinks[i])
    }

    /// Return `true` if both networks share the same feasible region.
    ///
    /// Costs are ignored: two objectives over the same network differ
    /// only in their cost vectors.
    pub fn same_structure(&self, other: &Network<T>) -> bool
    where
        T: PartialEq,
    {
        self.sources == other.sources
            && self.sinks == other.sinks
            && self.balances == other.balances
            && self.lower == other.lower
            && self.upper == other.upper
    }
}

#[cfg(test)]
mod tests {
    use super::Network;

    #[test]
    fn build_network() {
        let mut net = Network::new(3);
        net.set_balance(0, 2);
        net.set_balance(2, -2);
        assert_eq!(net.add_arc(0, 1, 0, 5, 1), 0);
        assert_eq!(net.add_arc(1, 2, 0, 5, 1), 1);
        assert_eq!(net.num_nodes(), 3);
        assert_eq!(net.num_arcs(), 2);
        assert_eq!(net.arc(1), (1, 2));
        assert_eq!(net.balances, vec![2, 0, -2]);
    }

    #[test]
    fn structure_ignores_costs() {
        let mut a = Network::new(2);
        a.add_arc(0, 1, 0, 1, 3);
        let mut b = a.clone();
        b.costs[0] = 7;
        assert!(a.same_structure(&b));
        b.upper[0] = 2;
        assert!(!a.same_structure(&b));
    }
}
