//! # CLI
//!
//! This module defines the command-line interface of `webdb` using `clap`.
//!
//! It is responsible for parsing user input and validating JSON arguments before any request is sent.
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "webdb", version, about = "Command-line client for web databases")]
pub struct Cli {
    /// Path to a JSON config file (defaults to `config.json` in the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The remote URL of the database API (e.g. http://localhost:8080/_db)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// The name of the remote database
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Username sent with every request
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Password sent with every request
    #[arg(long, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read every object matching the query
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// webdb --url http://localhost:8080/_db read-all --type demo.Article --query '{"predicate": "title = ?"}'
    /// ```
    ReadAll(QueryArgs),

    /// Read every group of objects matching the query
    ReadAllGrouped(QueryArgs),

    /// Read the first object matching the query
    ReadFirst(QueryArgs),

    /// Count the objects matching the query
    Count(QueryArgs),

    /// Read the time of the last update of the objects matching the query
    LastUpdate(QueryArgs),

    /// Read one page of the objects matching the query
    ReadPartial {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Read one page of the groups of objects matching the query
    ReadPartialGrouped {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Save, index and delete objects in a single request
    ///
    /// Objects are JSON maps. `_type` may hold either a type id or a configured type name.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// webdb write --save '{"_type": "demo.Article", "title": "Hello"}' --delete '{"_id": "..."}'
    /// ```
    Write {
        #[arg(long = "save", value_parser = parse_object)]
        saves: Vec<Map<String, Value>>,

        #[arg(long = "index", value_parser = parse_object)]
        indexes: Vec<Map<String, Value>>,

        #[arg(long = "delete", value_parser = parse_object)]
        deletes: Vec<Map<String, Value>>,
    },
}

#[derive(Args)]
pub struct QueryArgs {
    /// Internal name of the type to read (e.g. demo.Article)
    #[arg(long = "type")]
    pub object_type: Option<String>,

    /// Additional query fields as a JSON object
    #[arg(long, value_parser = parse_object)]
    pub query: Option<Map<String, Value>>,
}

#[derive(Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,
}

fn parse_object(value: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("Expected a JSON object".to_string()),
        Err(e) => Err(format!("Invalid JSON: {e}")),
    }
}
