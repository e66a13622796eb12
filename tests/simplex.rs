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

use std::collections::HashMap;
use std::error::Error;
use std::fs::read_dir;
use std::path::Path;

use rs_biflow::engine::Pricing;
use rs_biflow::{dimacs, LpEngine, NetworkSimplex, Solution, SolutionState};

#[test]
fn test_network_simplex() -> Result<(), Box<dyn Error>> {
    let mut values = HashMap::new();

    for entry in read_dir(Path::new("tests/biobj"))? {
        let entry = entry?;
        if entry.path().extension().map(|ext| ext == "sol").unwrap_or(false) {
            let solution = dimacs::min::read_solution_from_file::<_, f64>(entry.path())?;
            if let Some(file_stem) = entry.path().file_stem().map(|s| s.to_string_lossy().to_string()) {
                values.insert(file_stem, solution);
            }
        }
    }

    let mut nsolved = 0;
    for entry in read_dir(Path::new("tests/biobj"))? {
        let entry = entry?;
        if entry.path().extension().map(|ext| ext == "min").unwrap_or(false) {
            for &pricing in &[Pricing::Block, Pricing::Complete, Pricing::RoundRobin] {
                let mut spx = NetworkSimplex::<f64>::read_from_file(entry.path())?;
                spx.pricing = pricing;
                spx.primal_opt()?;
                assert_eq!(spx.solution_state(), SolutionState::Optimal);

                let stem = entry
                    .path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                let (value, flows) = match values.get(&stem) {
                    Some(sol) => sol.clone(),
                    None => panic!("Can't find solution file for {:?}", entry.path()),
                };
                assert_eq!(spx.objective_value(), value);

                let net = spx.network();
                let mut sol = Solution::new(net.num_arcs(), net.num_nodes()).unwrap();
                spx.read_solution(&mut sol)?;
                for i in 0..net.num_arcs() {
                    let (u, v) = net.arc(i);
                    let expected = flows
                        .iter()
                        .find(|&&(fu, fv, _)| (fu, fv) == (u, v))
                        .map(|&(_, _, x)| x)
                        .unwrap_or(0.0);
                    assert_eq!(sol.x[i], expected, "flow on arc {}", i + 1);
                }
                assert!(sol.slack.iter().all(|s| s.abs() < 1e-9));
            }
            nsolved += 1;
        }
    }
    assert_eq!(nsolved, 2);

    Ok(())
}

#[test]
fn test_basis_round_trip() -> Result<(), Box<dyn Error>> {
    let mut spx = NetworkSimplex::<f64>::read_from_file("tests/biobj/first.min")?;
    spx.primal_opt()?;
    let basis = spx.basis()?;
    assert_eq!(basis.num_basic(), 4);

    let path = std::env::temp_dir().join(format!("rs-biflow-simplex-{}.bas", std::process::id()));
    dimacs::basis::write_to_file(&path, &basis)?;
    let loaded = dimacs::basis::read_from_file(&path)?;
    std::fs::remove_file(&path)?;
    assert_eq!(loaded, basis);

    let mut other = NetworkSimplex::<f64>::read_from_file("tests/biobj/first.min")?;
    other.set_basis(&loaded)?;
    other.set_iteration_limit(Some(0));
    other.primal_opt()?;
    assert_eq!(other.solution_state(), SolutionState::Optimal);
    assert_eq!(other.objective_value(), 12.0);

    Ok(())
}
