pub mod commands;

use clap::{Parser, Subcommand};
use roamly_core::config::{AppConfig, LoadOptions};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "roamly",
    about = "Roamly pricing operator CLI",
    long_about = "Quote eSIM data bundles, redeem coupons against checkout sessions, and operate migrations, demo seeds, config inspection, and readiness checks.",
    after_help = "Examples:\n  roamly quote --country IT --days 10 --save\n  roamly coupon --session cs-demo-0001 --code WELCOME20\n  roamly doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a trip against the synced catalog and print the full breakdown")]
    Quote(commands::quote::QuoteArgs),
    #[command(about = "Apply a coupon code to a saved checkout session and reprice it")]
    Coupon {
        #[arg(long, value_name = "SESSION_ID", help = "Checkout session to reprice")]
        session: String,
        #[arg(long, value_name = "CODE", help = "Coupon code, or a destination code like IT10")]
        code: String,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog, rules, coupons, and session")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution per field"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Commands report config failures themselves with a proper exit code, so
    // a load error here only means we run without a subscriber installed.
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Quote(args) => commands::quote::run(args),
        Command::Coupon { session, code } => commands::coupon::run(&session, &code),
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) {
    use roamly_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // Logs go to stderr so stdout stays machine-readable command output.
    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .compact()
                .init();
        }
        Pretty => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .pretty()
                .init();
        }
        Json => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_max_level(log_level)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
    }
}
