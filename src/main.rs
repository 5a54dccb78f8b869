use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use slog::{debug, info, o, Drain, Level, Logger};

use wherefilter::config::{parse_where_filter_with_limits, DEFAULT_MAX_QUERY_LENGTH};
use wherefilter::import::project;
use wherefilter::{AttributeTypes, DataType, Evaluator, ParseMode, QueryLimits, Value};

/// Parse, evaluate and project where-filter queries
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// log evaluation details to stderr
    #[clap(short, long, global = true)]
    verbose: bool,

    /// reject queries longer than this many bytes
    #[clap(long, global = true, default_value_t = DEFAULT_MAX_QUERY_LENGTH)]
    max_query_length: usize,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parsed expressions of a query
    Parse {
        /// parse with the import operator set (=, !=, IN, NOT IN)
        #[clap(long)]
        import: bool,
        query: String,
    },
    /// Print the import filters and options of an import query as JSON
    Project { query: String },
    /// Evaluate a query against a JSON object of resolved attribute values
    Eval {
        query: String,
        /// JSON file mapping attribute paths to values
        #[clap(long)]
        values: PathBuf,
        /// declared type of an attribute, as PATH=TYPE (e.g. metadata.labels=map[string]string)
        #[clap(long = "type", value_parser = parse_type_decl)]
        types: Vec<(String, DataType)>,
    },
}

fn parse_type_decl(s: &str) -> Result<(String, DataType), String> {
    let (path, data_type) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=TYPE, found '{}'", s))?;
    Ok((path.to_string(), data_type.parse()?))
}

fn build_logger(verbose: bool) -> Logger {
    let decorator = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let level = if verbose { Level::Debug } else { Level::Info };
    let drain = slog_term::FullFormat::new(decorator)
        .build()
        .filter_level(level)
        .fuse();
    Logger::root(drain, o!())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let logger = build_logger(args.verbose);
    let limits = QueryLimits {
        max_query_length: args.max_query_length,
    };

    match run(&logger, &limits, args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            match err.downcast::<wherefilter::Error>() {
                Ok(err) => eprintln!("{:?}", miette::Report::new(err)),
                Err(err) => eprintln!("error: {:#}", err),
            }
            ExitCode::from(2)
        }
    }
}

fn run(logger: &Logger, limits: &QueryLimits, command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Parse { import, query } => {
            let mode = if import {
                ParseMode::Import
            } else {
                ParseMode::Standard
            };
            let exprs = parse_where_filter_with_limits(&query, mode, limits)
                .map_err(wherefilter::Error::from)?;
            debug!(logger, "parsed query"; "mode" => %mode, "expressions" => exprs.len());
            for expr in &exprs {
                let split = match &expr.split {
                    Some(split) => format!(" (requires {}, optional {})", split.visitor_path, split.sub_path),
                    None => String::new(),
                };
                println!("{}\t[{}]{}", expr, expr.data_type, split);
            }
            Ok(true)
        }
        Command::Project { query } => {
            let exprs = parse_where_filter_with_limits(&query, ParseMode::Import, limits)
                .map_err(wherefilter::Error::from)?;
            let (filters, options) = project(&exprs).map_err(wherefilter::Error::from)?;
            let output = serde_json::json!({ "filters": filters, "options": options });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(true)
        }
        Command::Eval {
            query,
            values,
            types,
        } => {
            let raw = fs::read_to_string(&values)
                .with_context(|| format!("reading {}", values.display()))?;
            let document: HashMap<String, serde_json::Value> = serde_json::from_str(&raw)
                .with_context(|| format!("{} must hold a JSON object", values.display()))?;

            let exprs = parse_where_filter_with_limits(&query, ParseMode::Standard, limits)
                .map_err(wherefilter::Error::from)?;
            let types: AttributeTypes = types.into_iter().collect();
            let exprs = types.apply(&exprs).map_err(wherefilter::Error::from)?;

            let evaluator = Evaluator::new(logger);
            let matched = evaluator
                .matches_all(&exprs, |expr| {
                    document
                        .get(&expr.path)
                        .and_then(|json| Value::from_json_as(json, expr.data_type))
                })
                .map_err(wherefilter::Error::from)?;

            info!(logger, "evaluated query"; "query" => &query, "matched" => matched);
            println!("{}", matched);
            Ok(matched)
        }
    }
}
