use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use element_adapter_engine::Snapshot;
use element_adapter_query::{compile, compute_orientation, compute_ratio, UnitKey, UnitMeasurements};
use tracing::{debug, warn};

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Query text, e.g. "width >= 40em && height < 50%"
    pub query: String,

    /// Content box width in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Content box height in pixels
    #[arg(long)]
    pub height: Option<f64>,

    /// Trimmed text length
    #[arg(long)]
    pub characters: Option<usize>,

    /// Direct element child count
    #[arg(long)]
    pub children: Option<usize>,

    /// Pixel value of a unit, e.g. em=16, w%=12.5 (repeatable)
    #[arg(short, long = "unit", value_parser = parse_unit)]
    pub units: Vec<(UnitKey, f64)>,
}

fn parse_unit(arg: &str) -> Result<(UnitKey, f64)> {
    let (unit, pixels) = arg
        .split_once('=')
        .with_context(|| format!("expected <unit>=<pixels>, got \"{arg}\""))?;
    let unit: UnitKey = unit.trim().parse()?;
    let pixels: f64 = pixels
        .trim()
        .parse()
        .with_context(|| format!("invalid pixel value \"{pixels}\""))?;
    Ok((unit, pixels))
}

fn snapshot(args: &EvalArgs) -> Snapshot {
    let mut snapshot = Snapshot {
        width: args.width,
        height: args.height,
        children: args.children,
        characters: args.characters,
        ..Snapshot::default()
    };
    if let (Some(width), Some(height)) = (args.width, args.height) {
        snapshot.aspect_ratio = Some(compute_ratio(width, height));
        snapshot.orientation = Some(compute_orientation(width, height));
    }
    snapshot
}

pub fn eval(args: EvalArgs) -> Result<()> {
    let compilation = compile(&args.query)?;
    debug!(query = %args.query, compiled = %compilation.query, "Compiled query");

    let mut measurements = UnitMeasurements::new();
    for (unit, pixels) in &args.units {
        measurements.insert(*unit, *pixels);
    }

    let required = compilation
        .units
        .iter()
        .map(|unit| UnitKey::from(*unit))
        .chain(compilation.percent_units.iter().map(|axis| UnitKey::from(*axis)));
    for unit in required {
        if measurements.get(&unit).is_none() {
            warn!(%unit, "No pixel value given for unit, comparisons against it are false");
        }
    }

    let snapshot = snapshot(&args);
    let matched = compilation
        .query
        .evaluate(&measurements, |property| snapshot.query_value(property))?;

    if matched {
        println!("{}", "true".green().bold());
    } else {
        println!("{}", "false".red().bold());
    }

    Ok(())
}
