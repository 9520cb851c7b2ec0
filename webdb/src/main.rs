//! # Webdb CLI Entry Point
//!
//! The main executable for the webdb tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs logging.
//! 2. **Configuration**: Loads the config file and applies command-line overrides.
//! 3. **Execution**: Runs the selected action through a `WebDatabase`.
//! 4. **Presentation**: Formats and prints the result or error to standard output/error.

mod cli;
mod config;
mod formatter;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Commands, PageArgs, QueryArgs};
use config::ConfigManager;
use formatter::{Count, FormattedString, LastUpdate, RecordList};
use serde_json::{Map, Value};
use std::process;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use webdb_core::{
    client::{WebDatabase, WriteBatch},
    registry::{TypeLookup, TypeRegistry},
    state::{Query, State, TYPE_KEY},
    uuid::Uuid,
};

fn main() {
    init_logging();

    let args = Cli::parse();
    let (database, types) = connect_or_exit(&args);

    match args.command {
        Commands::ReadAll(query) => {
            let query = query_or_exit(&query, &types);
            print_or_exit(database.read_all(&query).map(RecordList));
        }
        Commands::ReadAllGrouped(query) => {
            let query = query_or_exit(&query, &types);
            print_or_exit(database.read_all_grouped(&query));
        }
        Commands::ReadFirst(query) => {
            let query = query_or_exit(&query, &types);
            print_or_exit(database.read_first(&query));
        }
        Commands::Count(query) => {
            let query = query_or_exit(&query, &types);
            print_or_exit(database.read_count(&query).map(Count));
        }
        Commands::LastUpdate(query) => {
            let query = query_or_exit(&query, &types);
            print_or_exit(database.read_last_update(&query).map(LastUpdate));
        }
        Commands::ReadPartial { query, page } => {
            let query = query_or_exit(&query, &types);
            let PageArgs { offset, limit } = page;
            print_or_exit(database.read_partial(&query, offset, limit));
        }
        Commands::ReadPartialGrouped { query, page } => {
            let query = query_or_exit(&query, &types);
            let PageArgs { offset, limit } = page;
            print_or_exit(database.read_partial_grouped(&query, offset, limit));
        }
        Commands::Write {
            saves,
            indexes,
            deletes,
        } => {
            let batch = match build_batch(saves, indexes, deletes, &types) {
                Ok(batch) => batch,
                Err(err) => exit_with(err),
            };
            let written = batch.len();
            match database.write(&batch) {
                Ok(()) => println!(
                    "{}",
                    FormattedString(format!("Wrote {written} object(s)."))
                ),
                Err(err) => exit_with(err),
            }
        }
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn exit_with(err: impl Into<FormattedString>) -> ! {
    eprintln!("{}", err.into());
    process::exit(1);
}

fn print_or_exit<T, E>(result: Result<T, E>)
where
    T: Into<FormattedString>,
    E: Into<FormattedString>,
{
    match result {
        Ok(value) => println!("{}", value.into()),
        Err(err) => exit_with(err),
    }
}

fn connect_or_exit(args: &Cli) -> (WebDatabase, TypeRegistry) {
    match connect(args) {
        Ok(connected) => connected,
        Err(err) => exit_with(err),
    }
}

fn connect(args: &Cli) -> Result<(WebDatabase, TypeRegistry)> {
    let config = ConfigManager::new(args.config.clone())?.load()?.override_with(
        args.url.clone(),
        args.database.clone(),
        args.user.clone(),
        args.password.clone(),
    );

    let types = config.registry();
    let database = WebDatabase::from_settings(config.settings, types.clone())
        .context("Failed to configure the database")?;

    Ok((database, types))
}

fn query_or_exit(args: &QueryArgs, types: &TypeRegistry) -> Query {
    match build_query(args, types) {
        Ok(query) => query,
        Err(err) => exit_with(err),
    }
}

fn build_query(args: &QueryArgs, types: &TypeRegistry) -> Result<Query> {
    let mut query = match &args.object_type {
        Some(name) => Query::from_type(type_id(name, types)?),
        None => Query::from_all(),
    };

    for (key, value) in args.query.iter().flatten() {
        if key == TYPE_KEY {
            bail!("Use --type to select the type of a query");
        }
        query = query.with(key.clone(), value.clone());
    }

    Ok(query)
}

fn build_batch(
    saves: Vec<Map<String, Value>>,
    indexes: Vec<Map<String, Value>>,
    deletes: Vec<Map<String, Value>>,
    types: &TypeRegistry,
) -> Result<WriteBatch> {
    let mut batch = WriteBatch::new();
    for values in saves {
        batch = batch.save(state(values, types)?);
    }
    for values in indexes {
        batch = batch.index(state(values, types)?);
    }
    for values in deletes {
        batch = batch.delete(state(values, types)?);
    }
    Ok(batch)
}

/// Builds a state from a JSON map whose `_type` may name a configured type.
fn state(mut values: Map<String, Value>, types: &TypeRegistry) -> Result<State> {
    if let Some(Value::String(name)) = values.get(TYPE_KEY)
        && Uuid::parse_str(name).is_err()
    {
        let id = type_id(name, types)?;
        values.insert(TYPE_KEY.to_string(), Value::String(id.to_string()));
    }
    Ok(State::from_simple_values(values))
}

fn type_id(name: &str, types: &TypeRegistry) -> Result<Uuid> {
    types
        .by_name(name)
        .map(|object_type| object_type.id)
        .with_context(|| format!("Unknown type '{name}', add it to the 'types' of the config file"))
}
