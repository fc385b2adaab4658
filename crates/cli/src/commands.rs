//! CLI command definitions for `campusctl`.

use std::path::PathBuf;

use campus_core::catalog::CollegeTable;
use campus_core::generate::{college, messy, sales, DEFAULT_SEED};
use clap::{Parser, Subcommand, ValueEnum};

/// Log level options
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Info, warnings, and errors
    Info,
    /// Debug messages and above
    Debug,
    /// Everything, including trace
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// College-management schema tooling
#[derive(Debug, Parser)]
#[command(name = "campusctl")]
#[command(about = "Create, populate and repair the college-management schema")]
#[command(version)]
pub struct Cli {
    /// Log level for the campus crates (overridden by RUST_LOG)
    #[arg(short = 'l', long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Verbose mode (equivalent to --log-level debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective level, with `--verbose` winning over the default.
    pub fn level(&self) -> LogLevel {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level,
            (None, true) => LogLevel::Debug,
            (None, false) => LogLevel::Info,
        }
    }
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Recreate the student role, then rebuild the college tables as that role
    Setup,

    /// Write a synthetic CSV dataset
    Generate {
        #[command(subcommand)]
        dataset: Dataset,
    },

    /// Load the clean dataset CSVs into the college tables
    Load {
        /// Directory holding `<table>.csv` files (defaults to DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Load only this table
        #[arg(short, long, value_parser = parse_table)]
        table: Option<CollegeTable>,
    },

    /// Grant the student role access to tables owned by another role
    FixAccess,

    /// Delete every row from the college tables
    Clear {
        /// Skip the interactive confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the connected role, the visible tables and their row counts
    Verify,
}

/// Dataset kinds for `generate`
#[derive(Debug, Subcommand)]
pub enum Dataset {
    /// Clean relational dataset, one CSV per college table
    College {
        /// Number of students
        #[arg(long, default_value_t = college::DEFAULT_STUDENTS)]
        students: usize,

        /// Courses each student enrolls in (1-6)
        #[arg(long, default_value_t = college::DEFAULT_COURSES_PER_STUDENT)]
        courses_per_student: usize,

        /// Share of students taking part in activities (0-1)
        #[arg(long, default_value_t = college::DEFAULT_ACTIVITY_SHARE)]
        activity_share: f64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Student sheet with inconsistent formats, missing cells and duplicates
    Messy {
        /// Distinct rows before duplicates
        #[arg(long, default_value_t = messy::DEFAULT_ROWS)]
        rows: usize,

        /// Duplicate rows appended before shuffling
        #[arg(long, default_value_t = messy::DEFAULT_DUPLICATES)]
        duplicates: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Retail sales orders with derived money columns
    Sales {
        /// Number of orders
        #[arg(long, default_value_t = sales::DEFAULT_ORDERS)]
        orders: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Output options shared by every generator
#[derive(Debug, Clone, clap::Args)]
pub struct OutputArgs {
    /// Output directory (defaults to DATA_DIR)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Random seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

fn parse_table(s: &str) -> Result<CollegeTable, String> {
    CollegeTable::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = CollegeTable::ALL.iter().map(|t| t.as_str()).collect();
        format!("unknown table '{s}', expected one of: {}", names.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_load_with_table() {
        let cli = Cli::try_parse_from(["campusctl", "load", "--table", "Fees", "-d", "out"]).unwrap();
        assert_matches!(
            cli.command,
            Commands::Load { table: Some(CollegeTable::Fees), data_dir: Some(ref dir) } if dir == &PathBuf::from("out")
        );
    }

    #[test]
    fn rejects_unknown_table() {
        let err = Cli::try_parse_from(["campusctl", "load", "--table", "library"]).unwrap_err();
        assert!(err.to_string().contains("unknown table"));
    }

    #[test]
    fn generator_defaults() {
        let cli = Cli::try_parse_from(["campusctl", "generate", "college"]).unwrap();
        assert_matches!(
            cli.command,
            Commands::Generate {
                dataset: Dataset::College { students: 10_000, courses_per_student: 6, ref output, .. }
            } if output.seed == 42 && output.out.is_none()
        );

        let cli = Cli::try_parse_from(["campusctl", "generate", "messy", "--rows", "50", "--seed", "7"])
            .unwrap();
        assert_matches!(
            cli.command,
            Commands::Generate {
                dataset: Dataset::Messy { rows: 50, duplicates: 10, ref output }
            } if output.seed == 7
        );
    }

    #[test]
    fn clear_confirmation_flag() {
        let cli = Cli::try_parse_from(["campusctl", "clear"]).unwrap();
        assert_matches!(cli.command, Commands::Clear { yes: false });
        let cli = Cli::try_parse_from(["campusctl", "clear", "--yes"]).unwrap();
        assert_matches!(cli.command, Commands::Clear { yes: true });
    }

    #[test]
    fn verbose_and_log_level() {
        let cli = Cli::try_parse_from(["campusctl", "verify"]).unwrap();
        assert_eq!(cli.level(), LogLevel::Info);
        let cli = Cli::try_parse_from(["campusctl", "-v", "verify"]).unwrap();
        assert_eq!(cli.level(), LogLevel::Debug);
        let cli = Cli::try_parse_from(["campusctl", "setup", "--log-level", "warn", "-v"]).unwrap();
        assert_eq!(cli.level(), LogLevel::Warn);
    }
}
