//! relay-sim CLI - run or inspect a relay-logic schematic from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use relay_sim::model::ComponentKind;
use relay_sim::{Engine, EngineOptions, SimError};

#[derive(Parser)]
#[command(name = "relay-sim")]
#[command(about = "Relay-logic circuit simulation kernel", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a document, run it to stability, and print the snapshot
    Run {
        /// Path to a .rsim document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Emit the snapshot as JSON instead of a human-readable table
        #[arg(long)]
        json: bool,
    },

    /// Report document statistics without simulating
    Inspect {
        /// Path to a .rsim document
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Run { file, json } => handle_run(&file, json),
        Commands::Inspect { file } => handle_inspect(&file),
    };
    process::exit(exit_code);
}

fn handle_run(file: &PathBuf, json: bool) -> i32 {
    let document = match relay_sim::load(file) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };

    match Engine::start(document, EngineOptions::default()) {
        Ok(engine) => {
            let snapshot = engine.snapshot().expect("engine reports Stable on success");
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot).expect("snapshot serializes"));
            } else {
                print_snapshot_human(&snapshot);
            }
            for warning in engine.warnings() {
                eprintln!("warning: {}", warning.message);
            }
            0
        }
        Err(SimError::Oscillation { iterations, offenders }) => {
            eprintln!("oscillation detected after {iterations} iterations; offending nets: {offenders:?}");
            1
        }
        Err(SimError::Timeout(duration)) => {
            eprintln!("simulation timed out after {duration:?}");
            1
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn print_snapshot_human(snapshot: &relay_sim::Snapshot) {
    println!("{} component(s), {} net(s)", snapshot.components.len(), snapshot.vnets.len());
    for vnet in &snapshot.vnets {
        println!("  net {:?}: {:?} ({} member tab(s))", vnet.id, vnet.state, vnet.members.len());
    }
}

fn handle_inspect(file: &PathBuf) -> i32 {
    let document = match relay_sim::load(file) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };

    let page_count = document.pages.len();
    let mut wire_count = 0;
    let mut counts: std::collections::BTreeMap<ComponentKind, usize> = std::collections::BTreeMap::new();
    for page in &document.pages {
        wire_count += page.wires.len();
        for component in &page.components {
            *counts.entry(component.kind).or_insert(0) += 1;
        }
    }

    println!("pages: {page_count}");
    println!("wires: {wire_count}");
    println!("components:");
    for (kind, count) in &counts {
        println!("  {kind:?}: {count}");
    }
    0
}
