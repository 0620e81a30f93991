//! CLI interface for Bacheca.
//!
//! Each subcommand is non-interactive: arguments in, structured output out.
//!
//! - `bacheca infer <text>`: show the date inferred from a piece of text.
//! - `bacheca aggregate <items.json>...`: build event records from fetched
//!   feeds, update the discovery registry, and emit a view as JSON.
//! - `bacheca registry list`: show what the registry has seen and when.

mod format;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use jiff::Zoned;

use bacheca::{
    aggregate::{self, Aggregator},
    config::Config,
    infer::DateInference,
    ingest,
    registry::DiscoveryRegistry,
};

use format::{format_inferred, format_registry_entry, parse_reference};

/// Bacheca: hiking-club announcements, dated and deduplicated.
#[derive(Debug, Parser)]
#[command(name = "bacheca", after_long_help = USAGE_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const USAGE_HELP: &str = r#"Typical run:
  1. fetchers write feeds.json
  2. bacheca aggregate feeds.json --out events.json
  3. bacheca aggregate feeds.json --view upcoming --out upcoming.json
  4. bacheca aggregate feeds.json --view recent    # what to notify about

Check a phrasing:
  bacheca infer "trekking dal 12 al 14 giugno" --now 2026-05-01"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Infer the event date from a piece of text.
    ///
    /// Prints the date as YYYY-MM-DD, or `no date`.
    Infer {
        /// Free text: a title, a description, or both.
        text: String,

        /// Reference time for dates without a year
        /// (YYYY-MM-DD or YYYY-MM-DDTHH:MM). Defaults to now.
        #[arg(long)]
        now: Option<String>,
    },

    /// Build event records from fetched feeds.
    ///
    /// Reads one or more JSON files of feeds, consults and updates the
    /// discovery registry, and writes the selected view as JSON to `--out`
    /// (if given) or stdout. The registry is saved once, at the end.
    Aggregate {
        /// Feed files produced by the fetch layer.
        #[arg(required = true)]
        items: Vec<PathBuf>,

        /// Which records to emit.
        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,

        /// Write the records to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Registry file (overrides `BACHECA_REGISTRY` and config).
        #[arg(long)]
        registry: Option<PathBuf>,
    },

    /// Inspect the discovery registry.
    Registry {
        #[command(subcommand)]
        command: RegistryCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum RegistryCommand {
    /// List every key with its discovery time.
    List {
        /// Registry file (overrides `BACHECA_REGISTRY` and config).
        #[arg(long)]
        registry: Option<PathBuf>,
    },
}

/// Record views offered by `aggregate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Every record, newest source timestamp first.
    All,
    /// Records with an event date from today on, soonest first.
    Upcoming,
    /// Records discovered within the configured recent window.
    Recent,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Infer { text, now } => cmd_infer(config, &text, now.as_deref()),
        Command::Aggregate {
            items,
            view,
            out,
            registry,
        } => cmd_aggregate(config, &items, view, out.as_deref(), registry.as_deref()),
        Command::Registry { command } => match command {
            RegistryCommand::List { registry } => cmd_registry_list(config, registry.as_deref()),
        },
    }
}

fn cmd_infer(config: &Config, text: &str, now: Option<&str>) -> Result<(), String> {
    let reference = match now {
        Some(s) => parse_reference(s)?,
        None => Zoned::now().datetime(),
    };
    let inferred = DateInference::new(config.grace()).infer(text, reference);
    println!("{}", format_inferred(inferred));
    Ok(())
}

fn cmd_aggregate(
    config: &Config,
    items: &[PathBuf],
    view: View,
    out: Option<&Path>,
    registry_path: Option<&Path>,
) -> Result<(), String> {
    let feeds = ingest::load_all(items).map_err(|e| e.to_string())?;
    let registry_path = config.resolve_registry_path(registry_path)?;
    let mut registry = DiscoveryRegistry::load(registry_path, config.bootstrap_instant);

    let now = Zoned::now();
    let records = Aggregator::from_config(config).build(&feeds, &mut registry, &now);

    // Outputs don't depend on the registry reaching disk.
    if let Err(e) = registry.save() {
        tracing::error!(error = %e, "failed to save discovery registry");
    }

    let records = match view {
        View::All => aggregate::chronological(records),
        View::Upcoming => aggregate::upcoming(&records, now.date()),
        View::Recent => aggregate::recent(
            &records,
            now.timestamp(),
            config.recent_days,
            registry.bootstrap(),
        ),
    };

    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| format!("failed to serialize records: {e}"))?;

    match out {
        Some(path) => {
            fs::write(path, &json)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!("Wrote {} record(s) → {}", records.len(), path.display());
        }
        None => {
            println!("{json}");
        }
    }

    Ok(())
}

fn cmd_registry_list(config: &Config, registry_path: Option<&Path>) -> Result<(), String> {
    let registry_path = config.resolve_registry_path(registry_path)?;
    let registry = DiscoveryRegistry::load(registry_path, config.bootstrap_instant);

    if registry.is_empty() {
        println!("No discoveries");
        return Ok(());
    }

    for (key, discovered_at) in registry.entries() {
        println!(
            "{}",
            format_registry_entry(key, discovered_at, registry.bootstrap())
        );
    }

    Ok(())
}
