use clap::{Parser, Subcommand};

mod commands;

use commands::{GreetArgs, ScanArgs};

#[derive(Parser)]
#[command(name = "market-scan")]
#[command(about = "Utilities for greetings and EVE market analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a friendly greeting
    Greet(GreetArgs),
    /// Find profitable EVE market opportunities
    #[command(alias = "eve-market")]
    Scan(ScanArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => commands::run_greet(&GreetArgs::default()),
        Some(Commands::Greet(args)) => commands::run_greet(&args),
        Some(Commands::Scan(args)) => commands::run_scan(args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["market-scan"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_eve_market_alias() {
        let cli = Cli::try_parse_from(["market-scan", "eve-market", "--top", "5"]).unwrap();
        match cli.command {
            Some(Commands::Scan(args)) => assert_eq!(args.top, 5),
            _ => panic!("expected scan command"),
        }
    }
}
