//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::collection::{SortDirection, SortField, SortSpec};

/// Launch table arguments.
#[derive(Debug, Args)]
pub struct LaunchesCommand {
    /// Only show launches whose name or date contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Sort column
    #[arg(short, long, value_enum)]
    pub sort: Option<SortArg>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page to show (1-based)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl LaunchesCommand {
    /// The requested sort, if any.
    #[must_use]
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort.map(|field| SortSpec {
            field: field.into(),
            direction: if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        })
    }
}

/// Detail card arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Launch identifier
    pub id: String,

    /// Also show the launch site map
    #[arg(short, long)]
    pub map: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// PDF export arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Launch identifiers, in report order
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Directory to write the report to (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Analytics panel arguments.
#[derive(Debug, Args)]
pub struct AnalyticsCommand {
    /// Also show the analytics service's launch table
    #[arg(short, long)]
    pub table: bool,

    /// Save the chart images as PNG files in this directory
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Sort column argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Mission name
    Name,
    /// Launch date
    Date,
    /// Launch outcome
    Status,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => Self::Name,
            SortArg::Date => Self::Date,
            SortArg::Status => Self::Status,
        }
    }
}
