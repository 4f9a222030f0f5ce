//! AvatarForge CLI
//!
//! Commands: styles, generate, cover, import, tree
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero when a request cannot be served

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use avatarforge_core::{
    config::GeneratorConfig,
    logging::{init_logging, LoggingConfig},
    pipeline::{CoverRecord, DirectorySink, GenerationPipeline, Selection},
    tree::{dump_tree, IgnoreSet},
    Registry, RngSampler,
};

#[derive(Parser)]
#[command(name = "avatarforge-cli")]
#[command(about = "AvatarForge CLI - Procedural Placeholder Images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered generators
    Styles,

    /// Generate one of every style, or one of a named style
    Generate {
        /// Generator name (all generators when omitted)
        #[arg(short, long)]
        style: Option<String>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Canvas side length
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        size: Option<u32>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a cover payload ({id, imageUrl}) for a named style
    Cover {
        #[arg(short, long)]
        style: String,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        size: Option<u32>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Save cover payloads from a JSON array as SVG files
    Import {
        /// JSON file holding [{name, response: {id, imageUrl}}, ...]
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Dump a directory structure as JSON
    Tree {
        /// Root directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Glob patterns to ignore (replaces the defaults)
        #[arg(long, num_args = 1..)]
        ignore: Option<Vec<String>>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn fail(error: impl std::fmt::Display) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", output);
    ExitCode::FAILURE
}

fn print_json(value: &impl serde::Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn pipeline_for(size: u32) -> Result<GenerationPipeline, ExitCode> {
    GenerationPipeline::new(Registry::new(), size).map_err(|e| fail(e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LoggingConfig::verbose(cli.verbose));

    let config = match &cli.config {
        Some(path) => match GeneratorConfig::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return fail(e),
        },
        None => GeneratorConfig::default(),
    };

    match cli.command {
        Commands::Styles => {
            let registry = Registry::new();
            print_json(&registry.list())
        }

        Commands::Generate { style, out, size, seed } => {
            let pipeline = match pipeline_for(size.unwrap_or(config.canvas_size)) {
                Ok(p) => p,
                Err(code) => return code,
            };
            let mut sampler = RngSampler::from_seed_option(seed.or(config.seed));
            let dir = out.unwrap_or(config.output_dir);

            match pipeline.write_batch_to_dir(&Selection::from_name(style), &mut sampler, &dir) {
                Ok(manifest) => print_json(&serde_json::json!({
                    "success": true,
                    "dir": dir,
                    "manifest": manifest,
                })),
                Err(e) => fail(e),
            }
        }

        Commands::Cover { style, size, seed } => {
            let pipeline = match pipeline_for(size.unwrap_or(config.canvas_size)) {
                Ok(p) => p,
                Err(code) => return code,
            };
            let mut sampler = RngSampler::from_seed_option(seed.or(config.seed));

            match pipeline.generate_cover(&style, &mut sampler) {
                Ok(cover) => print_json(&cover),
                Err(e) => fail(e),
            }
        }

        Commands::Import { input, out } => {
            let records: Vec<CoverRecord> = match fs::read_to_string(&input)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
            {
                Ok(r) => r,
                Err(e) => return fail(format!("Invalid input {}: {}", input.display(), e)),
            };
            let mut sink = match DirectorySink::create(out.unwrap_or(config.covers_dir)) {
                Ok(s) => s,
                Err(e) => return fail(e),
            };

            let pipeline = GenerationPipeline::default();
            match pipeline.import_covers(&records, &mut sink) {
                Ok(report) => print_json(&report),
                Err(e) => fail(e),
            }
        }

        Commands::Tree { path, ignore, out } => {
            let patterns = ignore.unwrap_or(config.ignore);
            let ignore = match IgnoreSet::new(patterns.as_slice()) {
                Ok(i) => i,
                Err(e) => return fail(e),
            };
            let tree = match dump_tree(&path, &ignore) {
                Ok(t) => t,
                Err(e) => return fail(e),
            };

            match out {
                Some(file) => {
                    let written = serde_json::to_string_pretty(&tree)
                        .map_err(|e| e.to_string())
                        .and_then(|s| fs::write(&file, s).map_err(|e| e.to_string()));
                    match written {
                        Ok(()) => {
                            log::info!("tree saved to {}", file.display());
                            ExitCode::SUCCESS
                        }
                        Err(e) => fail(e),
                    }
                }
                None => print_json(&tree),
            }
        }
    }
}
