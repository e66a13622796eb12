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

//! This module implements a read function for the DIMACS min cost
//! flow format. A DIMACS file must look as follows.
//!
//! 1. empty lines are allowed and ignored
//! 2. a line starting with `c` is a comment line and is ignored
//! 3. the first non-comment line must have the form `p min <n> <m>`,
//!    where `<n>` is an integer > 0 denoting the number of nodes and
//!    `<m>` an integer > 0 denoting the number of arcs.
//! 4. after the problem line there must follow node lines of the form
//!    `n <node> <balance>` where `<node>` is the node number between
//!    `1..n` and `<balance>` is node's supply (if positive) or demand
//!    (if negative). Nodes that have balance 0 do not need to be
//!    specified.
//! 5. after the node lines there must be exactly `m` arc lines `a <u>
//!    <v> <lb> <ub> <c>` denoting the source and sink nodes of an arc
//!    as well as the arcs lower bound `<lb>`, upper bound `<ub>` and
//!    cost `<c>`.
//!
//! Loops are not allowed. Parallel arcs are accepted.

use super::{DimacsReader, Error, Result};
use crate::network::Network;
use num_traits::Zero;
use std::fmt::Display;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

pub fn read<R: Read, T>(r: R) -> Result<Network<T>>
where
    T: FromStr + Zero + Clone,
    T::Err: Display,
{
    let mut reader = DimacsReader::new(r);

    // Read the problem line.
    let mut pline = reader.expect_line('p')?;
    pline.expect("min")?;
    let nnodes: usize = pline.number()?;
    let narcs: usize = pline.number()?;
    pline.end()?;

    let mut net = Network::new(nnodes);

    while let Some((d, mut toks)) = reader.read_one_line_of(&["n", "a"])? {
        if d == "n" {
            let u = toks.id(nnodes, "node")?;
            net.set_balance(u, toks.number()?);
        } else {
            let u = toks.id(nnodes, "source node")?;
            let v = toks.id(nnodes, "sink node")?;
            let lb: T = toks.number()?;
            let ub: T = toks.number()?;
            let c: T = toks.number()?;

            if u == v {
                return Err(Error::Data {
                    line: toks.line,
                    msg: format!("invalid loop ({},{}) in arc", u + 1, u + 1),
                });
            }

            if net.num_arcs() == narcs {
                return Err(Error::Data {
                    line: toks.line,
                    msg: format!("unexpected 'a' line (expected exactly {} arcs)", narcs),
                });
            }

            net.add_arc(u, v, lb, ub, c);
        }

        toks.end()?;
    }

    if net.num_arcs() != narcs {
        return Err(Error::Data {
            line: reader.line_number,
            msg: format!("expected {} arcs, got {}", narcs, net.num_arcs()),
        });
    }

    Ok(net)
}

pub fn read_from_file<P, T>(filename: P) -> Result<Network<T>>
where
    P: AsRef<Path>,
    T: FromStr + Zero + Clone,
    T::Err: Display,
{
    read(std::fs::File::open(filename)?)
}

/// Write a solution of a min-cost-flow problem.
///
/// `flow` is indexed by arc, only arcs with nonzero flow are written.
pub fn write_solution<W, T>(mut w: W, net: &Network<T>, flow: &[T], value: T) -> std::io::Result<()>
where
    W: Write,
    T: Display + Zero,
{
    writeln!(w, "s {}", value)?;
    for (i, fl) in flow.iter().enumerate().take(net.num_arcs()) {
        if !fl.is_zero() {
            let (u, v) = net.arc(i);
            writeln!(w, "f {} {} {}", u + 1, v + 1, fl)?;
        }
    }

    Ok(())
}

/// Read a solution of a min-cost-flow problem.
///
/// Returns the solution value and the flow lines `(u, v, flow)` with
/// 0-based node numbers.
pub fn read_solution<R, T>(r: R) -> Result<(T, Vec<(usize, usize, T)>)>
where
    R: Read,
    T: FromStr,
    T::Err: Display,
{
    let mut reader = DimacsReader::new(r);
    let mut flows = vec![];
    let mut value = None;

    while let Some((d, mut toks)) = reader.read_one_line_of(&["f", "s"])? {
        if d == "f" {
            let u = toks.number::<usize>()?;
            let v = toks.number::<usize>()?;
            if u == 0 || v == 0 {
                return Err(Error::Data {
                    line: toks.line,
                    msg: "node numbers start at 1".to_string(),
                });
            }
            flows.push((u - 1, v - 1, toks.number()?));
        } else {
            if value.is_some() {
                return Err(Error::Format {
                    line: toks.line,
                    msg: "The solution value must be specified exactly once".to_string(),
                });
            }
            value = Some(toks.number()?);
        }
        toks.end()?;
    }

    let line = reader.line_number;
    Ok((
        value.ok_or_else(|| Error::Format {
            line,
            msg: "Missing solution value".to_string(),
        })?,
        flows,
    ))
}

/// Read a solution of a min-cost-flow problem from a named file.
pub fn read_solution_from_file<P, T>(filename: P) -> Result<(T, Vec<(usize, usize, T)>)>
where
    P: AsRef<Path>,
    T: FromStr,
    T::Err: Display,
{
    read_solution(std::fs::File::open(filename)?)
}
