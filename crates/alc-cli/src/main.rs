//! ALC CLI - plan audio signal chains and their latency from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::common::GlobalOpts;

#[derive(Parser)]
#[command(name = "alc")]
#[command(author, version, about = "Audio latency chain planner", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    /// Log more (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the device catalog
    Devices(commands::devices::DevicesArgs),

    /// List catalog brands
    Brands,

    /// Show and edit the saved signal chain
    Chain(commands::chain::ChainArgs),

    /// Show or change analytics consent
    Consent(commands::consent::ConsentArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Devices(args) => commands::devices::run(&cli.global, args),
        Commands::Brands => commands::devices::brands(&cli.global),
        Commands::Chain(args) => commands::chain::run(&cli.global, args),
        Commands::Consent(args) => commands::consent::run(&cli.global, args),
    }
}
