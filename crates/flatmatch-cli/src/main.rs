//! Build a query predicate from JSON files named by environment variables.
//!
//! - `FLATMATCH_SCHEMAS`: schema set, `{ "<id>": { fields... } }`
//! - `FLATMATCH_SCHEMA`: id of the root schema
//! - `FLATMATCH_ARGS`: flat query arguments
//! - `FLATMATCH_CONFIG` (optional): matcher config
//! - `FLATMATCH_MAX_DEPTH` (optional): overrides the config's max depth
//!
//! The predicate is printed through bson's serde serialization: plain JSON
//! for strings, numbers and booleans, and canonical extended-JSON wrappers
//! for other types, e.g. `{"$date":{"$numberLong":"1000"}}` and
//! `{"$oid":"..."}`.

use std::env::{self, VarError};
use std::sync::Arc;
use std::{fmt, fs};

use bson::Document;
use flatmatch_query::{FlatMatcher, MatchError, MatcherConfig, SchemaRegistry};
use tracing::info;

#[derive(Debug)]
enum CliError {
    MissingEnv(&'static str),
    InvalidEnv(&'static str, String),
    Io(String, std::io::Error),
    Json(String, serde_json::Error),
    Match(MatchError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::MissingEnv(var) => write!(f, "{var} must be set"),
            CliError::InvalidEnv(var, value) => write!(f, "invalid {var}: {value}"),
            CliError::Io(path, e) => write!(f, "failed to read {path}: {e}"),
            CliError::Json(path, e) => write!(f, "failed to parse {path}: {e}"),
            CliError::Match(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<MatchError> for CliError {
    fn from(e: MatchError) -> Self {
        CliError::Match(e)
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run() {
        eprintln!("flatmatch: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let schemas_path = require_env("FLATMATCH_SCHEMAS")?;
    let schema_id = require_env("FLATMATCH_SCHEMA")?;
    let args_path = require_env("FLATMATCH_ARGS")?;

    let registry: SchemaRegistry = read_json(&schemas_path)?;
    let mut config = match optional_env("FLATMATCH_CONFIG", env::var("FLATMATCH_CONFIG"))? {
        Some(path) => read_json::<MatcherConfig>(&path)?,
        None => MatcherConfig::default(),
    };
    if let Some(depth) = optional_env("FLATMATCH_MAX_DEPTH", env::var("FLATMATCH_MAX_DEPTH"))? {
        config.max_depth = depth
            .parse()
            .map_err(|_| CliError::InvalidEnv("FLATMATCH_MAX_DEPTH", depth.clone()))?;
    }

    info!(
        schemas = registry.len(),
        schema = %schema_id,
        max_depth = config.max_depth,
        strict = config.strict,
        "loaded schemas"
    );

    let matcher = FlatMatcher::new(Arc::new(registry), schema_id, config)?;
    let args: Document = read_json(&args_path)?;
    let predicate = matcher.matcher(&args)?;

    let out = render(&predicate).map_err(|e| CliError::Json("predicate".into(), e))?;
    println!("{out}");
    Ok(())
}

fn require_env(var: &'static str) -> Result<String, CliError> {
    env::var(var).map_err(|_| CliError::MissingEnv(var))
}

/// Only an absent variable falls back to the default.
fn optional_env(
    var: &'static str,
    value: Result<String, VarError>,
) -> Result<Option<String>, CliError> {
    match value {
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(CliError::InvalidEnv(
            var,
            raw.to_string_lossy().into_owned(),
        )),
    }
}

fn render(predicate: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(predicate)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let data = fs::read_to_string(path).map_err(|e| CliError::Io(path.to_string(), e))?;
    serde_json::from_str(&data).map_err(|e| CliError::Json(path.to_string(), e))
}
