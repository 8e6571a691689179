//! Command-line arguments.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use datagrid_lib::model::Value;
use datagrid_lib::query::Filter;

#[derive(Debug, Parser)]
#[command(name = "datagrid", version, about = "Search, filter, sort and page tabular JSON data")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a query over a JSON file and print the result
    Query(QueryArgs),
    /// Serve a JSON file through the table engine over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// JSON file holding an array of records or an {items, pagination} envelope
    pub file: PathBuf,

    /// JSON file with column definitions, inferred from the first record if absent
    #[arg(long)]
    pub columns: Option<PathBuf>,

    /// Free-text search
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Sort as field:asc or field:desc
    #[arg(long)]
    pub sort: Option<String>,

    /// Filter as key=value, the value is read as JSON when it parses
    #[arg(short, long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, Filter)>,

    /// Page to print (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    pub per_page: usize,

    /// Print every matching row instead of one page
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// JSON file with the served records
    #[arg(long)]
    pub data: PathBuf,

    /// JSON file with column definitions, inferred from the first record if absent
    #[arg(long)]
    pub columns: Option<PathBuf>,

    /// Related table as name=path, may be repeated
    #[arg(long = "relation", value_parser = parse_relation)]
    pub relations: Vec<(String, PathBuf)>,

    /// Listen address
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

fn parse_filter(s: &str) -> Result<(String, Filter), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter key in '{}'", s));
    }
    let filter = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Filter::from_json(json),
        Err(_) => Filter::Simple(Value::String(raw.to_string())),
    };
    Ok((key.to_string(), filter))
}

fn parse_relation(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected name=path, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagrid_lib::query::FilterOp;

    #[test]
    fn test_parse_filter_json_first() {
        let (key, filter) = parse_filter("active=false").unwrap();
        assert_eq!(key, "active");
        assert_eq!(filter, Filter::simple(false));

        let (_, filter) = parse_filter("name=Alice").unwrap();
        assert_eq!(filter, Filter::simple("Alice"));

        let (_, filter) =
            parse_filter(r#"status={"field":"status","operator":"in","value":["a","b"]}"#).unwrap();
        assert_eq!(filter.operator(), FilterOp::In);
    }

    #[test]
    fn test_parse_filter_rejects_missing_key() {
        assert!(parse_filter("novalue").is_err());
        assert!(parse_filter("=1").is_err());
    }

    #[test]
    fn test_parse_relation() {
        assert_eq!(
            parse_relation("departments=deps.json").unwrap(),
            ("departments".to_string(), PathBuf::from("deps.json"))
        );
        assert!(parse_relation("departments").is_err());
    }

    #[test]
    fn test_cli_parses_query() {
        let cli = Cli::try_parse_from([
            "datagrid", "-v", "query", "rows.json", "--sort", "age:desc", "-f", "age=30",
            "--per-page", "5", "--format", "csv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.sort.as_deref(), Some("age:desc"));
        assert_eq!(args.per_page, 5);
        assert_eq!(args.format, OutputFormat::Csv);
        assert_eq!(args.filters.len(), 1);
    }
}
