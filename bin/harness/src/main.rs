//! Command line entry point of the derivation harness.

use clap::Parser;
use eyre::{bail, eyre};
use harness_scenario::{catalog, DeployParams, Scenario};
use tracing_subscriber::EnvFilter;

mod args;
use args::{Cli, Command, RunArgs};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    match cli.command {
        Command::List => {
            for scenario in catalog::all() {
                println!("{} ({} steps)", scenario.name(), scenario.step_list().len());
            }
            Ok(())
        }
        Command::Run(args) => run_scenarios(args),
    }
}

fn run_scenarios(args: RunArgs) -> eyre::Result<()> {
    let params = match &args.config {
        Some(path) => DeployParams::from_file(path)?,
        None => DeployParams::new(Default::default())?,
    };
    let scenarios = if args.scenarios.is_empty() {
        catalog::all()
    } else {
        args.scenarios
            .iter()
            .map(|name| catalog::find(name).ok_or_else(|| eyre!("unknown scenario {name}")))
            .collect::<eyre::Result<Vec<Scenario>>>()?
    };

    let mut runs = 0;
    let mut failures = 0;
    for scenario in scenarios {
        for mode in args.mode.modes() {
            let variant = catalog::ScenarioVariant::new(scenario.clone(), mode, &params);
            runs += 1;
            match variant.run() {
                Ok(report) => println!("ok   {report}"),
                Err(err) => {
                    failures += 1;
                    println!("FAIL {err}");
                }
            }
        }
    }

    tracing::info!(target: "harness::scenario", runs, failures, "finished scenario runs");
    if failures > 0 {
        bail!("{failures} of {runs} scenario runs failed")
    }
    Ok(())
}
