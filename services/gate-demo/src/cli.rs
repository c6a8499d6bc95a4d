use crate::demo::{run_kyc_demo, run_validate, KycDemoArgs, ValidateArgs};
use clap::{Parser, Subcommand};
use review_gate::config::AppConfig;
use review_gate::error::AppError;
use review_gate::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Scholarship Review Gate",
    about = "Exercise the scholarship review gate from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a single value against a named validation rule
    Validate(ValidateArgs),
    /// Walk a KYC session through submission, review, and decision
    Kyc(KycDemoArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Kyc(args) => run_kyc_demo(args, config.gate),
    }
}
