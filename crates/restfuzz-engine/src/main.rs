//! CLI for `restfuzz-engine`.
//!
//! Standalone binary — the schema loader writes the operation list, this
//! tool resolves data-flow bindings for the grammar emitter.
//!
//! # Subcommands
//!
//! ```text
//! # Resolve every consumer parameter and emit bindings JSON
//! restfuzz resolve \
//!   --operations ops.json \
//!   --dictionary dict.json \
//!   --annotations annotations.json \
//!   --config config.yaml \
//!   --output bindings.json
//!
//! # Print the ranked producer registry for debugging
//! restfuzz inspect --operations ops.json [--resource id]
//! ```

#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use restfuzz_dictionary::MutationsDictionary;
use restfuzz_engine::{
    build_registry, compile, load_operations, AnnotationSet, EngineConfig, Operation,
};

/// Data-dependency resolver for REST API fuzzing grammars.
#[derive(Parser)]
#[command(name = "restfuzz", version, about)]
enum Cli {
    /// Resolve every consumer parameter to a binding and emit JSON.
    Resolve(ResolveArgs),

    /// Print the ranked producer registry extracted from an operation list.
    Inspect(InspectArgs),
}

#[derive(Parser)]
struct ResolveArgs {
    /// Path to the operation list (JSON, produced by the schema loader).
    #[arg(long)]
    operations: PathBuf,

    /// Path to a mutations dictionary (JSON). Merged onto the built-in
    /// defaults; omit to use the defaults alone.
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// Path to an annotation document (JSON array of records).
    #[arg(short, long)]
    annotations: Option<PathBuf>,

    /// Path to an engine config YAML file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write bindings JSON to this path instead of stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct InspectArgs {
    /// Path to the operation list (JSON, produced by the schema loader).
    #[arg(long)]
    operations: PathBuf,

    /// Only print producers registered under this resource name.
    #[arg(short, long)]
    resource: Option<String>,

    /// Path to an engine config YAML file (method ordering).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli {
        Cli::Resolve(args) => run_resolve(&args),
        Cli::Inspect(args) => run_inspect(&args),
    }
}

fn run_resolve(args: &ResolveArgs) -> anyhow::Result<()> {
    let operations = read_operations(&args.operations)?;
    let config = read_config(args.config.as_deref())?;

    let dictionary = match &args.dictionary {
        Some(path) => {
            eprintln!("Loading dictionary: {}", path.display());
            let user = MutationsDictionary::load(path)
                .with_context(|| format!("Failed to load dictionary: {}", path.display()))?;
            MutationsDictionary::default().merge(user)
        }
        None => MutationsDictionary::default(),
    };

    let annotations = match &args.annotations {
        Some(path) => {
            eprintln!("Loading annotations: {}", path.display());
            AnnotationSet::load(path)
                .with_context(|| format!("Failed to load annotations: {}", path.display()))?
        }
        None => AnnotationSet::default(),
    };

    let grammar = compile(&operations, &dictionary, &annotations, &config);
    eprintln!(
        "Resolved {} consumer parameters across {} operations",
        grammar.bindings.len(),
        operations.len(),
    );

    let json = serde_json::to_string_pretty(&grammar).context("Failed to serialize bindings")?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Bindings ready: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let operations = read_operations(&args.operations)?;
    let config = read_config(args.config.as_deref())?;
    let registry = build_registry(&operations, &config);

    eprintln!(
        "Registry holds {} response producers under {} resource names",
        registry.response_producer_count(),
        registry.resource_names().len(),
    );

    for name in registry.resource_names() {
        if args.resource.as_deref().is_some_and(|r| r != name) {
            continue;
        }
        let Some(indexes) = registry.indexes(name) else {
            continue;
        };

        println!("{name}:");
        for (position, ranked) in indexes.ranked(false).iter().enumerate() {
            let producer = &ranked.producer;
            println!(
                "  {}. {} {}  path={}  key=({}, {}, {})",
                position + 1,
                producer.request.method,
                producer.request.endpoint,
                producer.path,
                ranked.key.method_rank,
                ranked.key.shape_rank,
                ranked.key.path_len,
            );
        }
        for input in indexes.input_only() {
            println!(
                "  input-only: {} {}  parameter={}",
                input.request.method,
                input.request.endpoint,
                input.resource.resource_name().unwrap_or("?"),
            );
        }
    }

    Ok(())
}

fn read_operations(path: &std::path::Path) -> anyhow::Result<Vec<Operation>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read operations: {}", path.display()))?;
    let operations = load_operations(&content)
        .with_context(|| format!("Failed to parse operations: {}", path.display()))?;
    eprintln!(
        "Loaded {} operations from {}",
        operations.len(),
        path.display()
    );
    Ok(operations)
}

fn read_config(path: Option<&std::path::Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => {
            eprintln!("Loading config: {}", path.display());
            EngineConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}
