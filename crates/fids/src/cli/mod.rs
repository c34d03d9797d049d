//! Command-line interface for fids.
//!
//! This module provides the CLI structure for the `fids` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    parse_time, CategoryArg, ConfigCommand, DashboardCommand, DirectionArg, DisplayArgs,
    FlightFields, FlightsCommand, OutputFormat, SeedCommand, StatusArg,
};

/// fids - Flight information display system
///
/// Runs a rotating departures board in the terminal and manages the local
/// flight store behind it.
#[derive(Debug, Parser)]
#[command(name = "fids")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the departures board
    Display(DisplayArgs),

    /// Manage stored flights
    #[command(subcommand)]
    Flights(FlightsCommand),

    /// Fill the flight store with generated flights
    Seed(SeedCommand),

    /// Show flight counts and the next movements
    Dashboard(DashboardCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn dashboard(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Dashboard(DashboardCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "fids");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(dashboard(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(dashboard(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(dashboard(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(dashboard(3, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_display() {
        let cli = Cli::try_parse_from([
            "fids",
            "display",
            "--live",
            "--category",
            "international",
            "--per-page",
            "10",
            "--kiosk",
            "false",
        ])
        .unwrap();

        let Command::Display(args) = cli.command else {
            panic!("expected display command");
        };
        assert!(args.live);
        assert_eq!(args.category, Some(CategoryArg::International));
        assert_eq!(args.per_page, Some(10));
        assert_eq!(args.kiosk, Some(false));
    }

    #[test]
    fn test_mock_and_live_conflict() {
        let result = Cli::try_parse_from(["fids", "display", "--mock", "--live"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_display_set() {
        let cli = Cli::try_parse_from([
            "fids",
            "display",
            "--set",
            "show_system_time=false",
            "--set",
            "page_interval_secs=20",
        ])
        .unwrap();

        let Command::Display(args) = cli.command else {
            panic!("expected display command");
        };
        assert_eq!(args.settings.len(), 2);
    }

    #[test]
    fn test_parse_flights_add() {
        let cli = Cli::try_parse_from([
            "fids",
            "flights",
            "add",
            "-n",
            "AI101",
            "-a",
            "Air India",
            "-d",
            "Mumbai (BOM)",
            "--departure",
            "2024-05-01T10:30:00Z",
            "--status",
            "on-time",
        ])
        .unwrap();

        let Command::Flights(FlightsCommand::Add(fields)) = cli.command else {
            panic!("expected flights add");
        };
        assert_eq!(fields.flight_number.as_deref(), Some("AI101"));
        assert_eq!(fields.status, Some(StatusArg::OnTime));
        assert!(fields.departure.is_some());
    }

    #[test]
    fn test_parse_flights_list() {
        let cli = Cli::try_parse_from([
            "fids", "flights", "list", "-s", "indigo", "-t", "arrival", "-f", "json",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Command::Flights(FlightsCommand::List {
                direction: Some(DirectionArg::Arrival),
                format: OutputFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_flights_edit() {
        let cli = Cli::try_parse_from(["fids", "flights", "edit", "abc", "--gate", "B4"]).unwrap();

        let Command::Flights(FlightsCommand::Edit { id, fields }) = cli.command else {
            panic!("expected flights edit");
        };
        assert_eq!(id, "abc");
        assert_eq!(fields.gate.as_deref(), Some("B4"));
    }

    #[test]
    fn test_bad_departure_is_rejected() {
        let result = Cli::try_parse_from([
            "fids",
            "flights",
            "add",
            "-n",
            "AI1",
            "-a",
            "Air India",
            "--departure",
            "soon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_seed_default_count() {
        let cli = Cli::try_parse_from(["fids", "seed"]).unwrap();
        let Command::Seed(seed) = cli.command else {
            panic!("expected seed");
        };
        assert_eq!(seed.count, 15);
        assert_eq!(seed.category, None);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["fids", "-c", "/custom/config.toml", "dashboard"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["fids", "-vv", "config", "path"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["fids", "-q", "config", "show"]).unwrap();
        assert!(cli.quiet);
    }
}
