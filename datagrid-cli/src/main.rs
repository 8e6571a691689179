mod cli;
mod error;

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use datagrid_lib::Table;
use datagrid_lib::TableConfig;
use datagrid_lib::export::ExportFormat;
use datagrid_lib::export::ExportOptions;
use datagrid_lib::export::ExportScope;
use datagrid_lib::model::Column;
use datagrid_lib::model::Record;
use datagrid_lib::model::columns_from_records;
use datagrid_lib::query::Pagination;
use datagrid_lib::query::SortConfig;
use datagrid_lib::remote::normalize_response;
use datagrid_lib::server::TableEngine;
use datagrid_lib::server::serve;
use log::debug;
use log::info;
use serde::Serialize;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::cli::Command;
use crate::cli::OutputFormat;
use crate::cli::QueryArgs;
use crate::cli::ServeArgs;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Query(args) => run_query(args).await,
        Command::Serve(args) => run_serve(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_records(path: &Path) -> Result<Vec<Record>, CliError> {
    let records = normalize_response(read_json(path)?).into_records();
    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

fn read_columns(path: Option<&Path>, records: &[Record]) -> Result<Vec<Column>, CliError> {
    match path {
        Some(path) => serde_json::from_value(read_json(path)?).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(columns_from_records(records)),
    }
}

#[derive(Serialize)]
struct PageOutput<'a> {
    items: &'a [Record],
    pagination: Pagination,
}

async fn run_query(args: QueryArgs) -> Result<(), CliError> {
    let records = read_records(&args.file)?;
    let columns = read_columns(args.columns.as_deref(), &records)?;

    let mut config = TableConfig::new(columns, records)
        .with_per_page(args.per_page)
        .with_filters(args.filters.into_iter().collect());
    if let Some(sort) = &args.sort {
        let sort = SortConfig::parse(sort)
            .ok_or_else(|| CliError::invalid_argument(format!("bad sort '{}'", sort)))?;
        config = config.with_initial_sort(sort);
    }

    let table = Table::new(config)?;
    table.load().await;
    table.set_search(args.search).await;
    table.set_page(args.page).await;

    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Json => {
            let rows = if args.all {
                table.matching_items()
            } else {
                table.display_items()
            };
            let output = PageOutput {
                items: &rows,
                pagination: table.state().pagination,
            };
            let text = serde_json::to_string_pretty(&output).map_err(CliError::Encode)?;
            writeln!(stdout, "{}", text)?;
        }
        OutputFormat::Csv => {
            let scope = if args.all {
                ExportScope::AllRows
            } else {
                ExportScope::CurrentPage
            };
            let document = table.export(&ExportOptions::new(ExportFormat::Csv).with_scope(scope))?;
            stdout.write_all(&document.bytes)?;
        }
    }
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<(), CliError> {
    let records = read_records(&args.data)?;
    let columns = read_columns(args.columns.as_deref(), &records)?;

    let mut engine = TableEngine::new(columns, records)?;
    for (name, path) in &args.relations {
        engine = engine.with_relation_table(name.clone(), read_records(path)?);
    }

    let listener = TcpListener::bind(args.addr).await?;
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            shutdown.cancel();
        }
    });

    serve(listener, Arc::new(engine), cancel).await?;
    Ok(())
}
