use couriers::metrics::{self, IterationRecord};
use couriers::operators::{generate_many_feasible, MutationKind};
use couriers::problem::Problem;
use couriers::search::{Ga, GaParams};
use couriers::utils::{Args, Parser, SimulationConfig};

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Initialise tracing_subscriber for better logging/debugging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env()) // Reads RUST_LOG
        .with(fmt::layer().compact())
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = SimulationConfig::load(&args.config)?;
    let problem = Problem::load(&args.problem)?;
    config.validate(&problem)?;

    info!(
        "loaded problem: {} couriers, {} vehicles, {} packages, {} nodes",
        problem.n_couriers(),
        problem.n_vehicles(),
        problem.n_packages(),
        problem.n_nodes()
    );

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);

    let setup_time = Instant::now();
    let generated = generate_many_feasible(&problem, config.num_to_find, config.max_attempts, &mut rng);
    info!(
        "generator: {} solutions in {} attempts ({:?})",
        generated.solutions.len(),
        generated.attempts,
        setup_time.elapsed()
    );

    if generated.solutions.is_empty() {
        return Err(format!(
            "no feasible initial solution found within {} attempts",
            config.max_attempts
        )
        .into());
    }
    if generated.exhausted(config.num_to_find) {
        warn!(
            "found only {} of {} requested initial solutions, running on those",
            generated.solutions.len(),
            config.num_to_find
        );
    }

    let params = GaParams {
        fuel_weight: args.fuel_weight,
        lateness_weight: args.alpha,
        max_iter: config.max_iter,
        ..GaParams::default()
    };

    let mut ga = Ga::new(&problem, generated.solutions, params, rng);

    let mut records: Vec<IterationRecord> = Vec::with_capacity(config.max_iter + 1);
    let mut initial_cost = None;
    let mut final_step = None;

    let start_time = Instant::now();
    let mut last_step_time = start_time;

    while let Some(step) = ga.next() {
        let clock = Instant::now();

        records.push(IterationRecord {
            iteration: step.iteration,
            best_cost: step.best_cost,
            crossover_ok: step.crossover_ok,
            crossover_total: step.crossover_total,
            mutation_attempts: ga.stats().mutations.total_attempts(),
            mutation_accepted: ga.stats().mutations.total_accepted(),
            time: clock.duration_since(last_step_time).as_secs_f64(),
        });
        last_step_time = clock;

        if initial_cost.is_none() {
            initial_cost = Some(step.best_cost);
        }

        print!(
            "\rIteration: {}/{}. Best cost: {:.2}. Crossovers: {}/{}.        ",
            step.iteration, config.max_iter, step.best_cost, step.crossover_ok, step.crossover_total
        );
        io::stdout().flush()?;

        final_step = Some(step);
    }
    println!();

    let stats = ga.stats().clone();
    let initial_cost = initial_cost.expect("population was not empty");
    let final_step = final_step.expect("population was not empty");

    println!("Time computing: {:?}", start_time.elapsed());
    println!("Initial best cost: {:.2}", initial_cost);
    println!("Final best cost: {:.2}", final_step.best_cost);
    println!(
        "Improvement over initial: {:.2}%",
        (initial_cost - final_step.best_cost) / initial_cost * 100.0
    );
    println!(
        "Crossovers: {}/{}",
        stats.crossover_ok, stats.crossover_total
    );
    for kind in MutationKind::ALL {
        println!(
            "{}: {}/{}",
            kind.name(),
            stats.mutations.accepted(kind),
            stats.mutations.attempts(kind)
        );
    }
    println!();
    println!("{}", final_step.best.render(&problem));

    if let Some(path) = &args.metrics {
        metrics::serialize_to_parquet(&records, path.to_str().ok_or("invalid metrics path")?)?;
        info!("wrote {} iteration records to {:?}", records.len(), path);
    }

    Ok(())
}
