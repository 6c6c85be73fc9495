use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use element_adapter_engine::params::validate_watched_properties;
use element_adapter_engine::{AdapterConfig, AttachError, WatchedProperties, DEFAULT_CONFIG_NAME};
use element_adapter_query::{compile_query_list, CompiledQueryList};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Config file (defaults to element-adapter.config.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let path = args
        .config
        .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_NAME));

    let config = AdapterConfig::load(&path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;

    let extra = validate_watched_properties(config.watched_properties.as_deref())?;
    let compiled = compile_query_list(config.queries)?;

    let watched = WatchedProperties::new(compiled.properties.iter().copied().chain(extra));
    if watched.is_empty() {
        return Err(AttachError::NoWatchedProperties.into());
    }

    match args.format.as_str() {
        "json" => print_json(&compiled, &watched)?,
        "text" => print_text(&path, &compiled, &watched),
        other => {
            return Err(anyhow::anyhow!(
                "Invalid format: {}. Use: text or json",
                other
            ))
        }
    }

    Ok(())
}

fn print_text(path: &Path, compiled: &CompiledQueryList<String>, watched: &WatchedProperties) {
    println!("🔍 {} {}", "Checked".green().bold(), path.display());
    println!();

    for entry in &compiled.entries {
        println!("   {} {} → {}", "✓".green(), entry.text, entry.behavior.cyan());
        println!("     {}", entry.query.to_string().dimmed());
    }

    println!();
    println!("   Watched:  {}", join(watched.iter()));
    println!("   Units:    {}", join(compiled.units.iter()));
    println!(
        "   Percent:  {}",
        join(compiled.percent_units.iter().map(|axis| axis.percent_symbol()))
    );
}

fn print_json(compiled: &CompiledQueryList<String>, watched: &WatchedProperties) -> Result<()> {
    let queries: Vec<_> = compiled
        .entries
        .iter()
        .map(|entry| {
            json!({
                "query": entry.text,
                "label": entry.behavior,
                "compiled": entry.query.to_string(),
            })
        })
        .collect();

    let output = json!({
        "queries": queries,
        "watchedProperties": watched.iter().collect::<Vec<_>>(),
        "units": compiled.units,
        "percentUnits": compiled
            .percent_units
            .iter()
            .map(|axis| axis.percent_symbol())
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    let items: Vec<String> = items.map(|item| item.to_string()).collect();
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
