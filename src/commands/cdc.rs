//! `covid cdc ...` command handlers.

use anyhow::{Context, Result};
use covid_core::{HttpClient, HttpPageSource, OutputTarget, Termination, export};
use tracing::{debug, info};

use crate::cli::{CasesArgs, CdcCommand};

pub(crate) async fn run(command: &CdcCommand) -> Result<()> {
    match command {
        CdcCommand::Cases(args) => run_cases(args).await,
    }
}

async fn run_cases(args: &CasesArgs) -> Result<()> {
    let client = HttpClient::with_timeouts(args.connect_timeout, args.read_timeout)?;
    let source = HttpPageSource::new(client, &args.source_url)?;
    let target = OutputTarget::parse(args.output.as_deref());
    let config = args.paginator_config();
    debug!(?config, "pagination settings resolved");

    info!(
        source = %args.source_url,
        output = %target,
        page_size = args.limit,
        max_records = ?args.max_records,
        "Fetching CDC case data"
    );

    let summary = export(&source, config, &target)
        .await
        .context("CDC case export failed")?;

    match summary.termination {
        Termination::Exhausted => info!(
            records = summary.records_written,
            pages = summary.pages_fetched,
            "Download complete"
        ),
        Termination::SoftLimit => info!(
            records = summary.records_written,
            pages = summary.pages_fetched,
            max_records = ?args.max_records,
            "Stopped at record limit"
        ),
    }
    Ok(())
}
