mod config;
mod error;

use clap::{Parser, Subcommand};
use config::RunConfig;
use error::CliResult;
use sp_continuation::{
    KeplerSweep, KeplerSweepOptions, SpinDown, SpinDownOptions, StabilityOptions, is_stable,
};
use sp_core::timing::{enable_timing, sequence_timing};
use sp_model::{EquilibriumModel, ModelSnapshot, RelaxationSolver, SolveStats};
use sp_results::{DumpStore, drain_or_dump};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "sp-cli")]
#[command(about = "starspin CLI - rotating relativistic star sequences", long_about = None)]
struct Cli {
    /// Record wall-clock timing of continuation steps
    #[arg(long, global = true)]
    timing: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single model
    Solve {
        /// Path to the run YAML file
        run_path: PathBuf,
        #[arg(long)]
        r_ratio: f64,
        #[arg(long)]
        ec: f64,
        /// Accept unconverged models with a warning
        #[arg(long)]
        lenient: bool,
    },
    /// Follow a constant rest-mass sequence
    SpinDown {
        /// Path to the run YAML file
        run_path: PathBuf,
        /// Starting axis ratio
        #[arg(long)]
        r_ratio: f64,
        /// Starting central density
        #[arg(long)]
        ec: f64,
        /// Central density at which the sequence stops
        #[arg(long)]
        target_ec: f64,
        /// Central density increment per step
        #[arg(long, default_value_t = 1e-2, allow_hyphen_values = true)]
        step: f64,
        /// Rest mass to hold instead of the starting model's
        #[arg(long)]
        rest_mass: Option<f64>,
    },
    /// Test a model for stability against collapse
    Stability {
        /// Path to the run YAML file
        run_path: PathBuf,
        #[arg(long)]
        r_ratio: f64,
        #[arg(long)]
        ec: f64,
        /// Central density perturbation
        #[arg(long, default_value_t = 1e-4)]
        delta_ec: f64,
    },
    /// Sweep between the mass-shedding limit and slow rotation
    Sweep {
        /// Path to the run YAML file
        run_path: PathBuf,
        #[arg(long)]
        r_ratio: f64,
        #[arg(long)]
        ec: f64,
        #[arg(long)]
        end_ec: f64,
        #[arg(long, default_value_t = 1e-3)]
        ec_step: f64,
        #[arg(long, default_value_t = 1e-2)]
        r_step: f64,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if cli.timing {
        enable_timing();
    }

    match cli.command {
        Commands::Solve {
            run_path,
            r_ratio,
            ec,
            lenient,
        } => cmd_solve(&run_path, r_ratio, ec, lenient),
        Commands::SpinDown {
            run_path,
            r_ratio,
            ec,
            target_ec,
            step,
            rest_mass,
        } => {
            let options = SpinDownOptions {
                target_ec,
                step,
                target_rest_mass: rest_mass,
                display: true,
                ..SpinDownOptions::default()
            };
            cmd_spin_down(&run_path, r_ratio, ec, options)
        }
        Commands::Stability {
            run_path,
            r_ratio,
            ec,
            delta_ec,
        } => cmd_stability(&run_path, r_ratio, ec, delta_ec),
        Commands::Sweep {
            run_path,
            r_ratio,
            ec,
            end_ec,
            ec_step,
            r_step,
        } => {
            let options = KeplerSweepOptions {
                end_ec,
                ec_step,
                r_step,
            };
            cmd_sweep(&run_path, r_ratio, ec, options)
        }
    }
}

fn cmd_solve(run_path: &Path, r_ratio: f64, ec: f64, lenient: bool) -> CliResult<()> {
    let run = RunConfig::load(run_path)?;
    let mut model = run.build_model()?;
    let snapshot = model.solve_with(r_ratio, ec, !lenient)?;

    print_header();
    print_snapshot(&snapshot);
    print_stats(&model);
    Ok(())
}

fn cmd_spin_down(
    run_path: &Path,
    r_ratio: f64,
    ec: f64,
    options: SpinDownOptions,
) -> CliResult<()> {
    let run = RunConfig::load(run_path)?;
    let store = DumpStore::new(run.dump_dir())?;
    let mut model = run.build_model()?;
    model.solve(r_ratio, ec)?;

    println!(
        "Spin-down from r_ratio = {r_ratio}, ec = {ec} to ec = {}",
        options.target_ec
    );
    let mut sequence = SpinDown::new(&mut model, options)?;
    let snapshots = drain_or_dump(&mut sequence, &store, "spin-down")?;
    let termination = sequence.termination();
    let target = sequence.target_rest_mass();

    print_header();
    for snapshot in &snapshots {
        print_snapshot(snapshot);
    }
    if let Some(m0) = target {
        println!("\nRest mass held at {m0:.6}");
    }
    if let Some(t) = termination {
        println!("Finished: {t:?}");
    }
    print_stats(&model);
    print_timing_summary();
    Ok(())
}

fn cmd_stability(run_path: &Path, r_ratio: f64, ec: f64, delta_ec: f64) -> CliResult<()> {
    let run = RunConfig::load(run_path)?;
    let mut model = run.build_model()?;
    let snapshot = model.solve(r_ratio, ec)?;

    let options = StabilityOptions {
        delta_ec,
        ..StabilityOptions::default()
    };
    let stable = is_stable(&mut model, &options)?;

    print_header();
    print_snapshot(&snapshot);
    if stable {
        println!("\n✓ Stable against collapse");
    } else {
        println!("\n✗ Unstable against collapse");
    }
    print_stats(&model);
    Ok(())
}

fn cmd_sweep(
    run_path: &Path,
    r_ratio: f64,
    ec: f64,
    options: KeplerSweepOptions,
) -> CliResult<()> {
    let run = RunConfig::load(run_path)?;
    let store = DumpStore::new(run.dump_dir())?;
    let mut model = run.build_model()?;
    model.solve(r_ratio, ec)?;

    let sweep = KeplerSweep::new(&mut model, options)?;
    let snapshots = drain_or_dump(sweep, &store, "kepler-sweep")?;
    info!(models = snapshots.len(), "Kepler sweep finished");

    print_header();
    for snapshot in &snapshots {
        print_snapshot(snapshot);
    }
    print_stats(&model);
    print_timing_summary();
    Ok(())
}

fn print_header() {
    println!(
        "{:>10} {:>8} {:>10} {:>10} {:>9} {:>11} {:>11} {:>10}",
        "ec", "r_ratio", "M", "M0", "R", "Omega", "Omega_K", "J"
    );
}

fn print_snapshot(s: &ModelSnapshot) {
    println!(
        "{:>10.5} {:>8.5} {:>10.6} {:>10.6} {:>9.4} {:>11.4e} {:>11.4e} {:>10.4e}",
        s.ec, s.r_ratio, s.mass, s.rest_mass, s.radius, s.omega, s.omega_k, s.angular_momentum
    );
}

fn print_stats<S: RelaxationSolver>(model: &EquilibriumModel<S>) {
    let stats: SolveStats = model.stats();
    println!("\nSolver calls ({}):", model.solver().name());
    println!(
        "  Solves:      {} ({} cache hits)",
        stats.solves, stats.cache_hits
    );
    println!("  Seeds:       {}", stats.seeds);
    println!("  Relaxations: {}", stats.relaxations);
    println!("  Refinements: {}", stats.refinements);
    if stats.unconverged > 0 {
        println!("  Unconverged: {}", stats.unconverged);
    }
}

fn print_timing_summary() {
    if let Some(summary) = sequence_timing::summary() {
        println!("\nTiming summary:");
        println!("  {summary}");
    }
}

