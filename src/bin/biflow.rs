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

use rs_biflow::biobj::{BiobjDriver, BiobjError, DriverConfig, NoArcPolicy, Outcome};
use rs_biflow::{dimacs, BasisStore, LpEngine, Network, NetworkSimplex, Solution};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::result::Result;

use rustop::opts;
use time::OffsetDateTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log to stderr, the filter is taken from `BIFLOW_LOG` (default `info`).
fn init_logging() -> Result<(), Box<dyn Error>> {
    let filter = match std::env::var("BIFLOW_LOG") {
        Ok(directives) => EnvFilter::try_new(&directives)?,
        Err(_) => EnvFilter::new("info"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn print_solution(title: &str, net: &Network<f64>, sol: &Solution, iterations: usize) {
    println!();
    println!("{}", title);
    println!("Solution state      : {:?}", sol.status);
    println!("Value               : {}", sol.objval);
    println!("Number of nodes     : {}", sol.num_nodes());
    println!("Number of arcs      : {}", sol.num_arcs());
    println!("Iterations          : {}", iterations);
    println!();
    println!(
        "{:>6} {:>6} {:>6} {:>14} {:>14} {:>10}",
        "arc", "from", "to", "value", "reduced cost", "status"
    );
    for i in 0..sol.num_arcs() {
        let (u, v) = net.arc(i);
        println!(
            "{:>6} {:>6} {:>6} {:>14.4} {:>14.4} {:>10}",
            i + 1,
            u + 1,
            v + 1,
            sol.x[i],
            sol.dj[i],
            sol.basis.arcs[i]
        );
    }
    println!();
    println!("{:>6} {:>14} {:>14} {:>10}", "node", "pi", "slack", "status");
    for u in 0..sol.num_nodes() {
        println!(
            "{:>6} {:>14.4} {:>14.4} {:>10}",
            u + 1,
            sol.pi[u],
            sol.slack[u],
            sol.basis.nodes[u]
        );
    }
}

fn print_outcome(outcome: &Outcome) {
    println!();
    println!("Termination         : {:?}", outcome.termination);
    println!("Floor (objective 2) : {}", outcome.floor);
    println!("Start               : {} / {}", outcome.start.0, outcome.start.1);
    println!("Pivots              : {}", outcome.steps.len());
    if !outcome.steps.is_empty() {
        println!();
        println!("{:>6} {:>6} {:>14} {:>14} {:>14}", "pivot", "arc", "ratio", "objective 1", "objective 2");
        for (k, step) in outcome.steps.iter().enumerate() {
            println!(
                "{:>6} {:>6} {:>14.4} {:>14.4} {:>14.4}",
                k + 1,
                step.arc + 1,
                step.ratio,
                step.objval1,
                step.objval2
            );
        }
    }
}

fn write_solution_file(filename: &str, net: &Network<f64>, sol: &Solution) -> Result<(), Box<dyn Error>> {
    let solfile = PathBuf::from(format!("{}.sol", filename));
    let f = &mut std::fs::File::create(&solfile)?;
    writeln!(f, "c Final basis of the bi-objective pivoting")?;
    writeln!(f, "c solution status     : {:?}", sol.status)?;
    dimacs::min::write_solution(f, net, &sol.x, sol.objval)?;
    println!("Write solution to   : {}", solfile.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let (args, _) = opts! {
        synopsis "Pivot from the perturbed optimum of the first objective to the optimum of the second.";
        param first:String, desc:"Network file with the first objective";
        param second:String, desc:"Network file with the second objective";
        opt tolerance:f64=1e-9, desc:"Relative tolerance of the termination test";
        opt converge_on_exhaustion:bool, desc:"Stop successfully if no improving arc is left";
        opt max_pivots:Option<usize>, desc:"Maximal number of pivots";
        opt basis_dir:Option<String>, desc:"Write basis files to this directory";
        opt screen:bool, desc:"Report every engine solve";
        opt write_solutions:bool, desc:"Write the final flows to <file>.sol";
    }
    .parse_or_exit();

    init_logging()?;

    let tstart = OffsetDateTime::now_utc();
    let mut first = NetworkSimplex::<f64>::read_from_file(&args.first)?;
    let mut second = NetworkSimplex::<f64>::read_from_file(&args.second)?;
    let tend = OffsetDateTime::now_utc();

    let net1 = first.network();
    let net2 = second.network();
    if !net1.same_structure(&net2) {
        return Err(BiobjError::StructureMismatch(format!(
            "'{}' and '{}' describe different networks",
            args.first, args.second
        ))
        .into());
    }

    println!("Instances           : {} {}", args.first, args.second);
    println!("Read Time (seconds) : {}", (tend - tstart).as_seconds_f64());
    println!("Number of nodes     : {}", net1.num_nodes());
    println!("Number of arcs      : {}", net1.num_arcs());

    first.params_mut().screen_output = args.screen;
    second.params_mut().screen_output = args.screen;

    let store = match &args.basis_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            BasisStore::with_dir(dir)
        }
        None => BasisStore::new(),
    };

    let config = DriverConfig::new()
        .with_tolerance(args.tolerance)
        .with_no_arc_policy(if args.converge_on_exhaustion {
            NoArcPolicy::Converge
        } else {
            NoArcPolicy::Fail
        })
        .with_max_pivots(args.max_pivots);

    let tstart = OffsetDateTime::now_utc();
    let outcome = BiobjDriver::new(first, second, store, config)?.run()?;
    let tend = OffsetDateTime::now_utc();

    print_outcome(&outcome);
    println!("Time (seconds)      : {:.2}", (tend - tstart).as_seconds_f64());
    print_solution("Objective 1", &net1, &outcome.solution1, outcome.iterations.0);
    print_solution("Objective 2", &net2, &outcome.solution2, outcome.iterations.1);

    if args.write_solutions {
        println!();
        write_solution_file(&args.first, &net1, &outcome.solution1)?;
        write_solution_file(&args.second, &net2, &outcome.solution2)?;
    }

    Ok(())
}
