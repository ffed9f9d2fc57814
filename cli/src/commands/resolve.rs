//! Resolve command: shows what the supply step would read for a parameter.

use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value, json};

use crate::app::AppContext;
use crate::domain::params::ALL_KEYS;
use crate::infra::env::default_resolver;

/// Arguments for the resolve command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Parameter to look up, e.g. SPIRE_TRUST_DOMAIN
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub key: Option<String>,

    /// Value to print when the parameter is not set
    #[arg(long)]
    pub default: Option<String>,

    /// Show every parameter the supply step reads
    #[arg(long)]
    pub all: bool,
}

/// Run the resolve command.
///
/// # Errors
///
/// Returns `MissingParameter` when a single key is not set and no default
/// was given.
pub fn run(app: &AppContext, args: &ResolveArgs) -> Result<()> {
    let resolver = default_resolver(&app.env);

    if args.all {
        let mut values = Map::new();
        for key in ALL_KEYS {
            values.insert(
                (*key).to_string(),
                resolver.resolve(key)?.map_or(Value::Null, Value::String),
            );
        }
        if app.is_json() {
            println!("{}", Value::Object(values));
        } else {
            for (key, value) in &values {
                app.output.kv(key, value.as_str().unwrap_or("(not set)"));
            }
        }
        return Ok(());
    }

    let key = args.key.as_deref().unwrap_or_default();
    let value = match &args.default {
        Some(default) => resolver.resolve_or_default(key, default),
        None => resolver.resolve_required(key)?,
    };
    if app.is_json() {
        println!("{}", json!({ "key": key, "value": value }));
    } else {
        println!("{value}");
    }
    Ok(())
}
