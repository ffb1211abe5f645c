//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

use covid_core::fetch::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use covid_core::{CDC_CASES_URL, DEFAULT_MAX_RETRIES, DEFAULT_PAGE_SIZE, PaginatorConfig, RetryPolicy};

/// Download public COVID-19 datasets as single CSV files.
///
/// Pages through CSV-over-HTTP endpoints and merges every page into one
/// column-stable CSV on standard output or a file.
#[derive(Parser, Debug)]
#[command(name = "covid")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level command groups.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Work with CDC data streams
    #[command(subcommand)]
    Cdc(CdcCommand),
}

/// `covid cdc` subcommands.
#[derive(Subcommand, Debug)]
pub enum CdcCommand {
    /// Download CDC COVID-19 case and death counts by state as one CSV
    Cases(CasesArgs),
}

/// Options for `covid cdc cases`.
#[derive(Args, Debug, Clone)]
pub struct CasesArgs {
    /// Rows requested per page
    #[arg(short = 'l', long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,

    /// Stop paging once this many rows have been requested (soft limit, may overshoot by up to one page)
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_records: Option<u64>,

    /// Destination file; omit or use '-' for stdout, a '.gz' suffix writes gzip
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Retry attempts when a page fails to open with a transient error (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub retries: u32,

    /// Dataset endpoint to page through
    #[arg(long, default_value = CDC_CASES_URL)]
    pub source_url: String,

    /// TCP connect timeout in seconds (1-600)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub connect_timeout: u64,

    /// Maximum idle time between body reads in seconds (1-3600)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: u64,
}

impl CasesArgs {
    /// Builds the pagination settings for this run.
    pub fn paginator_config(&self) -> PaginatorConfig {
        PaginatorConfig::new(self.limit)
            .with_max_records(self.max_records)
            .with_retry(RetryPolicy::with_max_retries(self.retries))
    }
}
