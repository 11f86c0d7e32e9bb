//! Blorb resource compiler.
//!
//! Invoked as `bresc` it writes the container and the declarations file,
//! as `bres` only the declarations file, and as `blc` only the container.

use anyhow::{Context, Result};
use blorb_rs::{
    BlorbBuild, BuildOptions, ContainerReader, OutputPaths, Personality, Usage, APP_NAME, VERSION,
};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bresc")]
#[command(about = "Blorb resource compiler")]
#[command(version = VERSION)]
struct Args {
    /// Do not write the Inform declarations file
    #[arg(long = "nobli")]
    no_declarations: bool,

    /// Only write the Inform declarations file
    #[arg(long = "blionly")]
    declarations_only: bool,

    /// Name the container with the short `.blb` extension
    #[arg(long = "shortext")]
    short_extension: bool,

    /// Print the chunk listing and log every entry
    #[arg(short, long)]
    verbose: bool,

    /// Print the chunk listing as JSON
    #[arg(long)]
    json: bool,

    /// TOML file with default build options
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the index of an existing container instead of building one
    #[arg(long)]
    list: bool,

    /// Control list (its extension is replaced by `.res`), or the container with --list
    input: PathBuf,

    /// Container path (derived from the input when omitted)
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let program = std::env::args().next().unwrap_or_else(|| APP_NAME.to_string());
    let personality = Personality::from_program_name(&program)?;

    if !args.json {
        println!(
            "{} {} (Blorb resource compiler, {} personality)",
            APP_NAME,
            VERSION,
            personality.name()
        );
    }

    if args.list {
        return list_container(&args);
    }

    let mut options = match &args.config {
        Some(path) => BuildOptions::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BuildOptions::default(),
    };
    options.merge(&BuildOptions {
        index_only: args.declarations_only,
        skip_declarations: args.no_declarations,
        short_extension: args.short_extension,
        verbose: args.verbose || args.json,
    });
    personality.apply(&mut options);

    let paths = OutputPaths::new(&args.input, args.output.clone());
    let control = paths.control.clone();
    let report = BlorbBuild::new(paths, options)
        .program(personality.name())
        .run()
        .with_context(|| format!("Failed to build from {}", control.display()))?;

    if args.json {
        let json = report.to_json()?;
        println!("{}", String::from_utf8_lossy(&json));
        return Ok(());
    }

    if options.verbose {
        print!("{}", report);
    }
    if let Some(path) = &report.container {
        println!("Container saved to: {}", path.display());
    }
    if let Some(path) = &report.declarations {
        println!("Declarations saved to: {}", path.display());
    }

    Ok(())
}

fn list_container(args: &Args) -> Result<()> {
    let mut reader = ContainerReader::open(&args.input)
        .with_context(|| format!("Failed to open container {}", args.input.display()))?;

    if args.json {
        let entries: Vec<_> = reader
            .index()
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "usage": entry.usage.trimmed(),
                    "resource": entry.resource,
                    "offset": entry.offset,
                })
            })
            .collect();
        let listing = serde_json::json!({
            "total_size": reader.total_size(),
            "index": entries,
            "frontispiece": reader.frontispiece()?,
        });
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("{}: {} bytes", args.input.display(), u64::from(reader.total_size()) + 8);
    for entry in reader.index() {
        let usage = Usage::from_index_tag(entry.usage)
            .map(|u| u.to_string())
            .unwrap_or_else(|| entry.usage.trimmed());
        match reader.chunk_for(entry) {
            Some(chunk) => println!(
                "\tid#{:04}: Use '{}'\tType '{}'\tLength: '{}'\tOffset: '{}'",
                entry.resource,
                usage,
                chunk.kind.trimmed(),
                chunk.length,
                entry.offset
            ),
            None => println!("\tid#{:04}: Use '{}'\tOffset: '{}'", entry.resource, usage, entry.offset),
        }
    }
    if let Some(cover) = reader.frontispiece()? {
        println!("\tCover: picture #{}", cover);
    }

    Ok(())
}
