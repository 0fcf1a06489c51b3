//! Benchmark binary: time one reduction strategy, then validate it.
//!
//! Reproduces the original measurement setup: seeded uniform inputs
//! (revenue as integer-valued floats in `0..10`, cost as one-decimal values
//! in `0.0..10.0`), a fixed strategy for the whole session, one timing line
//! per trial and a min/mean/median summary block. Exits non-zero if the
//! strategy's output diverges from the canonical flat-scalar reference.

use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};

use cohort_reduce::{run_benchmark, DenseArray, ProblemDims, Strategy};

#[derive(Parser)]
#[command(name = "cohort-bench")]
#[command(version, about = "Time one profit-reduction strategy and validate it against the canonical reference")]
struct Args {
    /// Time steps per (geo, team) series
    #[arg(short = 'n', long, default_value_t = 2000)]
    time_steps: usize,

    /// Cohorts per time step; 0 means "match --time-steps"
    #[arg(short = 'm', long, default_value_t = 0)]
    cohorts: usize,

    /// Geo count
    #[arg(long, default_value_t = 4)]
    geos: usize,

    /// Team count
    #[arg(long, default_value_t = 5)]
    teams: usize,

    /// Timed runs of the selected strategy
    #[arg(long, default_value_t = 10)]
    trials: usize,

    /// Strategy under test: coordinate, flat, vectorized, work-stealing or
    /// thread-team
    #[arg(short, long, default_value = "flat")]
    strategy: String,

    /// Seed for the revenue/cost generators
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> cohort_reduce::Result<()> {
    let strategy: Strategy = args.strategy.parse()?;
    let cohorts = if args.cohorts == 0 {
        args.time_steps
    } else {
        args.cohorts
    };
    let dims = ProblemDims::new(args.geos, args.teams, args.time_steps, cohorts);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut revenue = DenseArray::<f32>::uninit(&dims.revenue_dims());
    revenue.fill(|_| rng.gen_range(0..10) as f32);
    let mut cost = DenseArray::<f32>::uninit(&dims.slot_dims());
    cost.fill(|_| rng.gen_range(0..100) as f32 / 10.0);

    let report = run_benchmark(strategy, &dims, args.trials, &revenue, &cost)?;

    for elapsed in &report.timings {
        println!("{:.3}ms", elapsed.as_secs_f64() * 1e3);
    }
    println!(
        "{} over {} slots x {} cohorts, {} trials",
        report.strategy,
        dims.slots(),
        dims.cohorts,
        report.timings.len()
    );
    println!("min:    {:.3}ms", report.stats.min.as_secs_f64() * 1e3);
    println!("mean:   {:.3}ms", report.stats.mean.as_secs_f64() * 1e3);
    println!("median: {:.3}ms", report.stats.median.as_secs_f64() * 1e3);
    Ok(())
}
