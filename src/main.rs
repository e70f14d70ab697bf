//! grid-forecast entry point: CLI wiring and config-driven runs.

use std::process;

use clap::Parser;
use grid_forecast::cli::{Cli, Command};
use grid_forecast::runner::{self, DemoOptions, RunSummary};

fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();

    // --config takes priority, then --preset, then nordic
    let mut config = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    match cli.command {
        Command::Forecast { .. } => {
            let summary = runner::run_all(&config);
            for city in &summary.completed {
                println!("=== {} ===", city.city);
                for r in &city.records {
                    println!("{r}");
                }
                eprintln!("Forecast written to {}", city.path.display());
            }
            exit_on_skipped(&summary);
        }
        Command::Evaluate { holdout, .. } => {
            let summary = runner::evaluate_all(&config, holdout);
            for city in &summary.completed {
                println!("=== {} ===\n{}\n", city.city, city.report);
            }
            exit_on_skipped(&summary);
        }
        Command::Demo {
            seed,
            start,
            history_days,
            out_dir,
            ..
        } => {
            let options = DemoOptions {
                seed,
                start,
                history_days,
                out_dir,
            };
            match runner::run_demo(&config, &options) {
                Ok(outcome) => {
                    println!("{}\n", outcome.report);
                    for r in &outcome.records {
                        println!("{r}");
                    }
                    for path in &outcome.written {
                        eprintln!("Wrote {}", path.display());
                    }
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    process::exit(1);
                }
            }
        }
    }
}

/// Exits with status 1 when any city failed; the failures were already logged.
fn exit_on_skipped<T>(summary: &RunSummary<T>) {
    if summary.is_complete() {
        return;
    }
    for s in &summary.skipped {
        eprintln!("error: {}: {}", s.city, s.reason);
    }
    process::exit(1);
}
