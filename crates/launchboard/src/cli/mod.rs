//! Command-line interface for launchboard.
//!
//! This module provides the CLI structure and command handlers for the
//! `lboard` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AnalyticsCommand, ConfigCommand, ExportCommand, LaunchesCommand, ShowCommand, SortArg,
};

/// lboard - SpaceX launches in your terminal
///
/// Browse, filter and sort launches, inspect launch sites, export selected
/// launches to PDF and view launch analytics.
#[derive(Debug, Parser)]
#[command(name = "lboard")]
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
    /// List launches as a paged table
    Launches(LaunchesCommand),

    /// Show the detail card of one launch
    Show(ShowCommand),

    /// Export launches to a PDF report
    Export(ExportCommand),

    /// Show launch analytics
    Analytics(AnalyticsCommand),

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

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "lboard");
    }

    #[test]
    fn test_verbosity() {
        use crate::logging::Verbosity;

        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_launches() {
        let args = vec![
            "lboard", "launches", "--filter", "falcon", "--sort", "date", "--desc", "--page", "2",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Launches(cmd) = cli.command else {
            panic!("expected launches command");
        };
        assert_eq!(cmd.filter.as_deref(), Some("falcon"));
        assert_eq!(cmd.sort, Some(SortArg::Date));
        assert!(cmd.desc);
        assert_eq!(cmd.page, 2);
        assert!(!cmd.json);
    }

    #[test]
    fn test_parse_launches_defaults() {
        let cli = Cli::try_parse_from(vec!["lboard", "launches"]).unwrap();
        let Command::Launches(cmd) = cli.command else {
            panic!("expected launches command");
        };
        assert_eq!(cmd.page, 1);
        assert!(cmd.sort.is_none());
    }

    #[test]
    fn test_parse_desc_requires_sort() {
        assert!(Cli::try_parse_from(vec!["lboard", "launches", "--desc"]).is_err());
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(vec!["lboard", "show", "abc", "--map"]).unwrap();
        let Command::Show(cmd) = cli.command else {
            panic!("expected show command");
        };
        assert_eq!(cmd.id, "abc");
        assert!(cmd.map);
    }

    #[test]
    fn test_parse_export() {
        let args = vec!["lboard", "export", "a", "b", "--output", "/tmp/out"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Export(cmd) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(cmd.ids, vec!["a", "b"]);
        assert_eq!(cmd.output, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_parse_export_requires_ids() {
        assert!(Cli::try_parse_from(vec!["lboard", "export"]).is_err());
    }

    #[test]
    fn test_parse_analytics() {
        let args = vec!["lboard", "analytics", "--table", "--charts-dir", "charts"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Analytics(cmd) = cli.command else {
            panic!("expected analytics command");
        };
        assert!(cmd.table);
        assert_eq!(cmd.charts_dir, Some(PathBuf::from("charts")));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["lboard", "-c", "/custom/config.toml", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let cli = Cli::try_parse_from(vec!["lboard", "-v", "launches"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(vec!["lboard", "-q", "analytics"]).unwrap();
        assert!(cli.quiet);
    }
}
