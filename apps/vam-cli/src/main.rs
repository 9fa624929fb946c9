use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::time::Instant;
use vam_flowsheet::{FeedSpec, Flowsheet, OperatingSpec, StateVec, StreamId, solve_network};
use vam_props::Species;
use vam_solver::{NewtonConfig, NewtonResult, SolverError, solve};

#[derive(Parser)]
#[command(name = "vam-cli")]
#[command(about = "Steady-state vinyl-acetate flowsheet solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Close the flow network and print the stream table
    Streams {
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Evaluate the residual at the built-in initial guess
    Residual {
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Solve for the steady state and print unit profiles
    Solve {
        #[command(flatten)]
        feed: FeedArgs,
        /// Maximum Newton iterations
        #[arg(long, default_value_t = 200)]
        max_iter: usize,
        /// Absolute residual-norm tolerance
        #[arg(long, default_value_t = 1e-9)]
        tol: f64,
        /// Emit the solution report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

/// The five independent feed/purge flows [lb-mol/min].
#[derive(Args)]
struct FeedArgs {
    /// Gas-loop circulation rate (stream S4)
    #[arg(long, default_value_t = 12.113916)]
    reactor_feed: f64,
    /// Purge gas draw (stream S1)
    #[arg(long, default_value_t = 0.905)]
    purge: f64,
    /// Separator liquid draw (stream S3)
    #[arg(long, default_value_t = 2.1924)]
    separator_liquid: f64,
    /// Fresh oxygen feed (stream S5)
    #[arg(long, default_value_t = 0.55)]
    fresh_o2: f64,
    /// Fresh acetic acid feed (stream S9)
    #[arg(long, default_value_t = 0.82)]
    fresh_hac: f64,
}

impl FeedArgs {
    fn to_spec(&self) -> FeedSpec {
        FeedSpec {
            reactor_feed: self.reactor_feed,
            purge: self.purge,
            separator_liquid: self.separator_liquid,
            fresh_o2: self.fresh_o2,
            fresh_hac: self.fresh_hac,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Streams { feed } => cmd_streams(&feed.to_spec()),
        Commands::Residual { feed } => cmd_residual(&feed.to_spec()),
        Commands::Solve {
            feed,
            max_iter,
            tol,
            json,
        } => cmd_solve(&feed.to_spec(), max_iter, tol, json),
    }
}

fn cmd_streams(feed: &FeedSpec) -> Result<(), Box<dyn Error>> {
    let flows = solve_network(feed)?;

    println!("Stream table [lb-mol/min]:");
    for id in StreamId::ALL {
        println!("  {:>4}  {:>12.6}", id.to_string(), flows.get(id));
    }
    println!(
        "\nTotal in: {:.6}   Total out: {:.6}",
        flows.total_in(),
        flows.total_out()
    );
    Ok(())
}

fn cmd_residual(feed: &FeedSpec) -> Result<(), Box<dyn Error>> {
    let sheet = Flowsheet::new(*feed, OperatingSpec::default())?;
    let x0 = sheet.initial_guess();
    let r = sheet.residual(&x0)?;

    let (worst_idx, worst) = r
        .iter()
        .enumerate()
        .map(|(i, e)| (i, e.abs()))
        .fold((0, 0.0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

    println!("Residual at initial guess:");
    println!("  dimension:    {}", r.len());
    println!("  norm:         {:.6e}", r.norm());
    println!("  largest:      {:.6e} (equation {})", worst, worst_idx);
    Ok(())
}

fn cmd_solve(feed: &FeedSpec, max_iter: usize, tol: f64, json: bool) -> Result<(), Box<dyn Error>> {
    let sheet = Flowsheet::new(*feed, OperatingSpec::default())?;
    let config = NewtonConfig {
        max_iterations: max_iter,
        abs_tol: tol,
        ..NewtonConfig::default()
    };

    let start = Instant::now();
    let result = match solve(&sheet, &config) {
        Ok(result) => result,
        Err(SolverError::ConvergenceFailed {
            what,
            residual_norm,
            iterations,
        }) => {
            eprintln!(
                "✗ No steady state found after {} iterations: {} (residual norm {:.3e})",
                iterations, what, residual_norm
            );
            std::process::exit(1);
        }
        Err(other) => return Err(other.into()),
    };
    let elapsed = start.elapsed().as_secs_f64();

    let state = StateVec::unflatten(&result.x)?;

    if json {
        let report = SolveReport::build(feed, &result, &state, elapsed);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "✓ Steady state found in {} iterations ({:.2}s), residual norm {:.3e}",
        result.iterations, elapsed, result.residual_norm
    );

    println!("\nStream table [lb-mol/min]:");
    for id in StreamId::ALL {
        println!("  {:>4}  {:>12.6}", id.to_string(), sheet.params().flows.get(id));
    }

    println!("\nReactor temperature profile [degC]:");
    for (j, stage) in state.reactor.iter().enumerate() {
        println!("  stage {:>2}  {:>8.3}", j + 1, stage.t);
    }

    println!("\nAbsorber temperature profile [degC]:");
    for (j, stage) in state.absorber.iter().enumerate() {
        println!("  stage {:>2}  {:>8.3}", j + 1, stage.t);
    }

    println!(
        "\nSeparator drum: T = {:.3} degC, P = {:.2} psia",
        state.separator.t, state.separator.p
    );
    println!("  {:>6}  {:>10}  {:>10}", "", "liquid x", "vapor y");
    for species in Species::ALL {
        let i = species.index();
        println!(
            "  {:>6}  {:>10.6}  {:>10.6}",
            species.key(),
            state.separator.x[i],
            state.separator.y[i]
        );
    }

    println!(
        "\nVaporizer: T = {:.3} degC   Surge tank: T = {:.3} degC",
        state.vaporizer.t, state.surge.t
    );
    println!(
        "Compressor discharge: T = {:.3} degC, P = {:.2} psia",
        state.compressor.t_discharge, state.compressor.p_discharge
    );

    Ok(())
}

/// Machine-readable solution summary for the `--json` flag.
#[derive(Serialize)]
struct SolveReport {
    feed: FeedSpec,
    iterations: usize,
    residual_norm: f64,
    elapsed_s: f64,
    reactor_t: Vec<f64>,
    absorber_t: Vec<f64>,
    separator_t: f64,
    separator_p: f64,
    separator_x: Vec<SpeciesValue>,
    separator_y: Vec<SpeciesValue>,
    vaporizer_t: f64,
    surge_t: f64,
    compressor_discharge_t: f64,
}

#[derive(Serialize)]
struct SpeciesValue {
    species: String,
    value: f64,
}

impl SolveReport {
    fn build(feed: &FeedSpec, result: &NewtonResult, state: &StateVec, elapsed_s: f64) -> Self {
        let by_species = |values: &[f64]| -> Vec<SpeciesValue> {
            Species::ALL
                .iter()
                .map(|s| SpeciesValue {
                    species: s.key().to_string(),
                    value: values[s.index()],
                })
                .collect()
        };

        Self {
            feed: *feed,
            iterations: result.iterations,
            residual_norm: result.residual_norm,
            elapsed_s,
            reactor_t: state.reactor.iter().map(|s| s.t).collect(),
            absorber_t: state.absorber.iter().map(|s| s.t).collect(),
            separator_t: state.separator.t,
            separator_p: state.separator.p,
            separator_x: by_species(&state.separator.x),
            separator_y: by_species(&state.separator.y),
            vaporizer_t: state.vaporizer.t,
            surge_t: state.surge.t,
            compressor_discharge_t: state.compressor.t_discharge,
        }
    }
}
