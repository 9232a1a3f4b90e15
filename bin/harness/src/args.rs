use harness_primitives::BatchMode;
use std::path::PathBuf;

/// Runs the derivation scenarios against the simulated L1 and L2 chains.
#[derive(Debug, clap::Parser)]
#[command(name = "harness", version, about)]
pub(crate) struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Command {
    /// Lists the built-in scenarios.
    List,
    /// Runs built-in scenarios, stopping each run at its first failing step.
    Run(RunArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct RunArgs {
    /// The scenario to run, may be repeated. Runs every scenario if unset.
    #[arg(long = "scenario", value_name = "NAME")]
    pub(crate) scenarios: Vec<String>,
    /// The batch encoding to run each scenario with.
    #[arg(long, value_enum, default_value_t = ModeArg::All)]
    pub(crate) mode: ModeArg,
    /// Path to a JSON deploy configuration. The defaults are used if unset.
    #[arg(long, env = "HARNESS_CONFIG", value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ModeArg {
    /// One batch per L2 block.
    Singular,
    /// One batch per range of L2 blocks.
    Span,
    /// Both encodings.
    All,
}

impl ModeArg {
    /// Returns the batch modes selected by the argument.
    pub(crate) fn modes(self) -> Vec<BatchMode> {
        match self {
            Self::Singular => vec![BatchMode::Singular],
            Self::Span => vec![BatchMode::Span],
            Self::All => BatchMode::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::parse_from([
            "harness",
            "run",
            "--scenario",
            "batcher-key-rotation",
            "--scenario",
            "gas-limit-change",
            "--mode",
            "span",
        ]);
        let Command::Run(args) = cli.command else { panic!("expected run command") };

        assert_eq!(args.scenarios, ["batcher-key-rotation", "gas-limit-change"]);
        assert_eq!(args.mode.modes(), [BatchMode::Span]);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_mode_defaults_to_all() {
        let cli = Cli::parse_from(["harness", "run"]);
        let Command::Run(args) = cli.command else { panic!("expected run command") };

        assert!(args.scenarios.is_empty());
        assert_eq!(args.mode.modes(), BatchMode::ALL);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["harness", "run", "--mode", "channel"]).is_err());
    }
}
