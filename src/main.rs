//! quakefind - find the earthquake closest to a target time and place.
//!
//! Queries the USGS ComCat catalog for events near the given time and
//! location, ranks them by temporal then spatial proximity, and prints the
//! nearest match (or the whole ranked set with -a).

use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use quakefind::cli::{Cli, LogLevel, OutputMode};
use quakefind::client::ComcatClient;
use quakefind::nearest::find_nearby_events;
use quakefind::output::{Presenter, TableStyle};
use quakefind::query::{parse_time, Query};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Resolve the output mode first: flag conflicts must fail before any
    // side effect, logging included.
    let mode = OutputMode::from_cli(&cli)?;

    init_tracing(&cli.logfile, cli.loglevel)?;

    let time = parse_time(&cli.time)?;
    let mut query = Query::new(time, cli.lat, cli.lon)?;
    if let Some(radius) = cli.radius {
        query = query.with_radius_km(radius)?;
    }
    if let Some(window) = cli.window {
        query = query.with_window_secs(window)?;
    }

    let client = ComcatClient::new().context("failed to create ComCat client")?;
    let ranked = find_nearby_events(&client, &query).context("failed to search the catalog")?;

    if ranked.is_empty() {
        // Not a failure: the query worked, nothing was close enough.
        error!("No events found matching your search criteria. Exiting.");
        return Ok(());
    }

    let presenter = Presenter::new(TableStyle::default());
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::All { export: None } => presenter.write_table(&mut handle, &ranked)?,
        OutputMode::All {
            export: Some(target),
        } => {
            presenter.export(&target, &ranked)?;
            writeln!(
                handle,
                "Wrote {} records to {}",
                ranked.len(),
                target.path.display()
            )?;
        }
        OutputMode::Verbose => presenter.write_verbose(&mut handle, &ranked[0])?,
        OutputMode::Url => presenter.write_url(&mut handle, &ranked[0])?,
        OutputMode::Id => presenter.write_id(&mut handle, &ranked[0])?,
    }

    Ok(())
}

/// Initialize the tracing subscriber, writing to stderr or a log file.
fn init_tracing(logfile: &str, level: LogLevel) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(level.as_directive());

    if logfile == "stderr" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    } else {
        let file = File::create(logfile)
            .with_context(|| format!("failed to open log file {logfile}"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init();
    }
    Ok(())
}
