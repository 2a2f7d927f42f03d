use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use formlog::config::{Config, DEFAULT_STORE, SCHEMA_ENV, STORE_ENV};
use formlog::interactive::{TerminalPrompter, fill_form};
use formlog::{FormState, Record, Schema, Store, normalize};

fn cli() -> Command {
    Command::new("formlog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Schema-driven data-entry form backed by a JSON record log")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("PATH")
                .help("Record store file")
                .env(STORE_ENV)
                .default_value(DEFAULT_STORE)
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("schema")
                .long("schema")
                .value_name("PATH")
                .help("JSON schema file (built-in journal schema if omitted)")
                .env(SCHEMA_ENV)
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Log only errors")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("submit")
                .about("Store one record from NAME=VALUE pairs")
                .arg(
                    Arg::new("values")
                        .value_name("NAME=VALUE")
                        .num_args(0..)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(Command::new("add").about("Fill in the form interactively"))
        .subcommand(
            Command::new("list")
                .about("Show the most recent records, newest first")
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .default_value("5")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print records as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write a snapshot of the store as JSON")
                .arg(
                    Arg::new("output")
                        .value_name("PATH")
                        .help("Destination file (stdout if omitted)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Replace the store with a JSON array of records")
                .arg(
                    Arg::new("input")
                        .value_name("PATH")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(Command::new("schema").about("Print the effective schema as JSON"))
}

fn init_logging(matches: &ArgMatches) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if matches.get_flag("quiet") {
        builder.filter_level(log::LevelFilter::Error);
    } else if matches.get_flag("verbose") {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(&matches);

    let config = Config::from_matches(&matches);
    let store = config.store();
    log::debug!("Using store {}", store.path().display());

    match matches.subcommand() {
        Some(("submit", sub)) => {
            let pairs: Vec<&String> = sub
                .get_many::<String>("values")
                .map(|v| v.collect())
                .unwrap_or_default();
            let schema = load_schema(&config)?;
            let raw = parse_submission(&schema, pairs)?;
            save(&store, normalize(&schema, &raw))
        }
        Some(("add", _)) => {
            let schema = load_schema(&config)?;
            let mut prompter = TerminalPrompter::new();
            let state = fill_form(&schema, &mut prompter)?;
            save(&store, normalize(&schema, &state))
        }
        Some(("list", sub)) => {
            let count = sub.get_one::<usize>("count").copied().unwrap_or(5);
            let records = store.recent(count);
            if sub.get_flag("json") {
                print_json(&records)
            } else {
                print_history(&records);
                Ok(())
            }
        }
        Some(("export", sub)) => match sub.get_one::<PathBuf>("output") {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                store.export(&mut writer).context("Failed to export store")?;
                writer.flush()?;
                eprintln!("Exported {} records to {}", store.load().len(), path.display());
                Ok(())
            }
            None => {
                let mut out = io::stdout().lock();
                store.export(&mut out).context("Failed to export store")?;
                writeln!(out)?;
                Ok(())
            }
        },
        Some(("import", sub)) => {
            let path = sub
                .get_one::<PathBuf>("input")
                .context("import requires a file")?;
            let count = store
                .import_file(path)
                .with_context(|| format!("Rejected {}; store left unchanged", path.display()))?;
            eprintln!("Imported {} records into {}", count, store.path().display());
            Ok(())
        }
        Some(("schema", _)) => print_json(&load_schema(&config)?),
        _ => unreachable!("subcommand_required is set"),
    }
}

/// Only the commands that render or normalize a form need the schema.
fn load_schema(config: &Config) -> Result<Schema> {
    let schema = config
        .load_schema()
        .context("Failed to load form schema")?;
    log::debug!("Loaded schema with {} fields", schema.len());
    Ok(schema)
}

/// Turns NAME=VALUE arguments into a raw submission.
/// Names outside the schema are ignored with a warning.
fn parse_submission(schema: &Schema, pairs: Vec<&String>) -> Result<FormState> {
    let mut raw = FormState::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("Expected NAME=VALUE, got '{}'", pair);
        };
        if schema.field(name).is_none() {
            log::warn!("Ignoring unknown field '{}'", name);
            continue;
        }
        raw.insert(name, value);
    }

    Ok(raw)
}

fn save(store: &Store, record: Record) -> Result<()> {
    store
        .append(record.clone())
        .with_context(|| format!("Failed to save record to {}", store.path().display()))?;
    print_json(&record)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode JSON")?;
    println!("{}", text);
    Ok(())
}

fn print_history(records: &[Record]) {
    if records.is_empty() {
        println!("No records yet.");
        return;
    }
    for record in records {
        println!("{}", record.timestamp);
        for (name, value) in record.filled() {
            println!("  {}: {}", name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_parse_submission_rejects_missing_equals() {
        let schema = Schema::journal();
        let bad = "titulo".to_string();
        assert!(parse_submission(&schema, vec![&bad]).is_err());
    }

    #[test]
    fn test_parse_submission_keeps_value_with_equals() {
        let schema = Schema::journal();
        let pair = "obs=a=b".to_string();
        let unknown = "nope=1".to_string();
        let raw = parse_submission(&schema, vec![&pair, &unknown]).unwrap();
        assert_eq!(raw.get("obs"), Some("a=b"));
        assert_eq!(raw.get("nope"), None);
    }
}
