//! mindgrid CLI - evaluate formulas against CSV and JSON datasets

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use mindgrid::prelude::*;
use mindgrid::{evaluate_detailed, FunctionRegistry};
use mindgrid_cli::{load_dataset, write_grid, CsvLoadOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mindgrid")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one formula against a dataset
    Eval {
        /// Formula or literal, e.g. "=SUM(B1:B10)"
        formula: String,

        /// Dataset file (csv or json); an empty dataset when omitted
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Field delimiter for CSV input
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// CSV input has no header row
        #[arg(long)]
        no_header: bool,

        /// Pin the clock used by TODAY and NOW (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        now: Option<String>,

        /// Deepest allowed nesting of function calls
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print how the value was produced
        #[arg(long)]
        explain: bool,
    },

    /// Evaluate every cell and print the display grid as CSV
    Render {
        /// Dataset file (csv or json)
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter for CSV input and output
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// CSV input has no header row
        #[arg(long)]
        no_header: bool,

        /// Fixed decimals for number columns
        #[arg(long)]
        decimals: Option<usize>,

        /// Separator between list items
        #[arg(long, default_value = ", ")]
        list_separator: String,

        /// Pin the clock used by TODAY and NOW
        #[arg(long)]
        now: Option<String>,
    },

    /// List the built-in functions
    Functions,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Eval {
            formula,
            data,
            delimiter,
            no_header,
            now,
            max_depth,
            explain,
        } => {
            let dataset = match data {
                Some(path) => load_dataset(&path, &csv_options(delimiter, no_header)?)?,
                None => Dataset::default(),
            };
            let mut options = evaluation_options(now.as_deref())?;
            if let Some(depth) = max_depth {
                options = options.with_max_depth(depth);
            }
            eval(&formula, &dataset, &options, explain)
        }
        Commands::Render {
            input,
            output,
            delimiter,
            no_header,
            decimals,
            list_separator,
            now,
        } => {
            let dataset = load_dataset(&input, &csv_options(delimiter, no_header)?)?;
            let mut format = FormatOptions::default().with_list_separator(list_separator);
            if let Some(places) = decimals {
                format = format.with_decimal_places(places);
            }
            let formatter = Formatter::new(format)
                .with_evaluation_options(evaluation_options(now.as_deref())?);
            render(&dataset, &formatter, output.as_deref(), delimiter)
        }
        Commands::Functions => list_functions(),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn csv_options(delimiter: char, no_header: bool) -> Result<CsvLoadOptions> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter '{}' is not a single ASCII character", delimiter))?;
    Ok(CsvLoadOptions {
        delimiter,
        has_header: !no_header,
    })
}

fn evaluation_options(now: Option<&str>) -> Result<EvaluationOptions> {
    let options = EvaluationOptions::default();
    let Some(now) = now else {
        return Ok(options);
    };
    let pinned = parse_now(now).with_context(|| format!("Invalid --now value '{}'", now))?;
    Ok(options.with_now(pinned))
}

fn parse_now(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0).context("Invalid midnight")
}

fn eval(formula: &str, dataset: &Dataset, options: &EvaluationOptions, explain: bool) -> Result<()> {
    let evaluation = evaluate_detailed(formula, dataset, options);

    if explain {
        let path = match &evaluation {
            Evaluation::Literal(_) => "literal".to_string(),
            Evaluation::Computed(_) => "computed".to_string(),
            Evaluation::Unrecognized(_) => "unrecognized formula, shown as text".to_string(),
            Evaluation::Failed(err) => format!("failed: {}", err),
        };
        eprintln!("{}", path);
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", evaluation.into_value())?;
    Ok(())
}

fn render(
    dataset: &Dataset,
    formatter: &Formatter,
    output: Option<&Path>,
    delimiter: char,
) -> Result<()> {
    let mut cache = EvaluationCache::new();
    let grid = formatter.render_dataset_cached(dataset, &mut cache);
    let delimiter = csv_options(delimiter, false)?.delimiter;

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            write_grid(file, dataset, &grid, delimiter)?;
            eprintln!("Wrote {} rows to '{}'", grid.len(), path.display());
        }
        None => write_grid(io::stdout().lock(), dataset, &grid, delimiter)?,
    }

    let stats = cache.stats();
    tracing::debug!(
        hits = stats.hits,
        misses = stats.misses,
        uncached = stats.uncached,
        "render finished"
    );
    Ok(())
}

fn list_functions() -> Result<()> {
    let mut stdout = io::stdout().lock();
    for def in FunctionRegistry::global().definitions() {
        let volatile = if def.volatile { " (volatile)" } else { "" };
        writeln!(stdout, "{:<12} {}{}", def.name(), def.arity(), volatile)?;
    }
    Ok(())
}
