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

//! Basis files in DIMACS style.
//!
//! 1. empty lines and lines starting with `c` are ignored
//! 2. the first non-comment line must have the form `p basis <n> <m>`
//!    with the number of nodes `<n>` and arcs `<m>`
//! 3. it is followed by arc lines `a <arc> <status>` and node lines
//!    `n <node> <status>` in any order, where `<status>` is one of
//!    `L` (at lower bound), `B` (basic) or `U` (at upper bound)
//!
//! Every arc and every node must be listed exactly once.

use super::{DimacsReader, Error, Result, Tokens};
use crate::basis::{Basis, BasisStatus};
use std::io::{Read, Write};
use std::path::Path;

fn status(toks: &mut Tokens) -> Result<BasisStatus> {
    let code = toks.str()?;
    BasisStatus::from_code(code).ok_or_else(|| Error::Data {
        line: toks.line,
        msg: format!("invalid basis status '{}' (expected L, B or U)", code),
    })
}

fn assign(cells: &mut [Option<BasisStatus>], i: usize, s: BasisStatus, what: &str, line: usize) -> Result<()> {
    if cells[i].is_some() {
        return Err(Error::Data {
            line,
            msg: format!("duplicate {} {}", what, i + 1),
        });
    }
    cells[i] = Some(s);
    Ok(())
}

fn complete(cells: Vec<Option<BasisStatus>>, what: &str, line: usize) -> Result<Vec<BasisStatus>> {
    cells
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            s.ok_or_else(|| Error::Data {
                line,
                msg: format!("missing status of {} {}", what, i + 1),
            })
        })
        .collect()
}

pub fn read<R: Read>(r: R) -> Result<Basis> {
    let mut reader = DimacsReader::new(r);

    let mut pline = reader.expect_line('p')?;
    pline.expect("basis")?;
    let nnodes: usize = pline.number()?;
    let narcs: usize = pline.number()?;
    pline.end()?;

    let mut arcs = vec![None; narcs];
    let mut nodes = vec![None; nnodes];

    while let Some((d, mut toks)) = reader.read_one_line_of(&["a", "n"])? {
        if d == "a" {
            let i = toks.id(narcs, "arc")?;
            let s = status(&mut toks)?;
            assign(&mut arcs, i, s, "arc", toks.line)?;
        } else {
            let u = toks.id(nnodes, "node")?;
            let s = status(&mut toks)?;
            assign(&mut nodes, u, s, "node", toks.line)?;
        }
        toks.end()?;
    }

    let line = reader.line_number;
    Ok(Basis {
        arcs: complete(arcs, "arc", line)?,
        nodes: complete(nodes, "node", line)?,
    })
}

pub fn read_from_file<P: AsRef<Path>>(filename: P) -> Result<Basis> {
    read(std::fs::File::open(filename)?)
}

/// Write a basis.
pub fn write<W: Write>(mut w: W, basis: &Basis) -> std::io::Result<()> {
    writeln!(w, "p basis {} {}", basis.num_nodes(), basis.num_arcs())?;
    for (i, s) in basis.arcs.iter().enumerate() {
        writeln!(w, "a {} {}", i + 1, s.code())?;
    }
    for (u, s) in basis.nodes.iter().enumerate() {
        writeln!(w, "n {} {}", u + 1, s.code())?;
    }
    Ok(())
}

/// Write a basis to a named file.
pub fn write_to_file<P: AsRef<Path>>(filename: P, basis: &Basis) -> std::io::Result<()> {
    write(&mut std::fs::File::create(filename)?, basis)
}

#[cfg(test)]
mod tests {
    use crate::basis::{Basis, BasisStatus::*};
    use crate::dimacs;
    use std::io::Cursor;

    #[test]
    fn parse_basis() {
        let file = "c written by hand
p basis 3 2
n 2 B
a 2 U
a 1 B
n 1 L
n 3 L
";
        let basis = dimacs::basis::read(Cursor::new(file)).unwrap();
        assert_eq!(basis.arcs, vec![Basic, AtUpper]);
        assert_eq!(basis.nodes, vec![AtLower, Basic, AtLower]);
    }

    #[test]
    fn write_basis() {
        let basis = Basis {
            arcs: vec![Basic, AtLower],
            nodes: vec![Basic, AtLower],
        };
        let mut buf = Cursor::new(Vec::new());
        dimacs::basis::write(&mut buf, &basis).unwrap();
        assert_eq!(
            String::from_utf8(buf.into_inner()).unwrap(),
            "p basis 2 2
a 1 B
a 2 L
n 1 B
n 2 L
"
        );
    }

    #[test]
    fn reject_incomplete_or_duplicate() {
        let missing = "p basis 2 1\na 1 B\nn 1 L\n";
        assert!(dimacs::basis::read(Cursor::new(missing)).is_err());

        let duplicate = "p basis 1 1\na 1 B\na 1 L\nn 1 L\n";
        assert!(dimacs::basis::read(Cursor::new(duplicate)).is_err());

        let bad_status = "p basis 1 1\na 1 X\nn 1 L\n";
        assert!(dimacs::basis::read(Cursor::new(bad_status)).is_err());
    }
}
