//! Command line front end for the CoverageJSON playground.
//!
//! # Usage
//!
//! ```bash
//! # Validate a document against the default schema and summarize its layers
//! covjson-playground check coverages/grid.covjson
//!
//! # Reformat a minified document
//! covjson-playground format https://example.org/data.covjson
//! ```
//!
//! Set `RUST_LOG=debug` for validation and load tracing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use covjson_editor::{EditorEvent, FormatOptions, fetch_document};
use covjson_playground::{
    DisplayOutcome, HeadlessLayerFactory, JsonCoverageReader, LocationHash, Playground,
    PlaygroundConfig, PlaygroundFetcher,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "covjson-playground", version, about = "CoverageJSON playground")]
struct Cli {
    /// JSON configuration file overriding the built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory relative document paths are resolved against.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a document and list the layers it would produce.
    Check {
        /// Document path or URL. Defaults to the first configured example.
        document: Option<String>,
        /// Schema path or URL. Defaults to the configured schema.
        #[arg(long, conflicts_with = "no_schema")]
        schema: Option<String>,
        /// Only check syntax and coverage structure.
        #[arg(long)]
        no_schema: bool,
    },
    /// Print a document, reformatted if it is minified.
    Format {
        /// Document path or URL.
        document: String,
    },
    /// List the configured examples.
    Examples,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PlaygroundConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PlaygroundConfig::default(),
    };
    let fetcher = PlaygroundFetcher::new(&cli.root);

    match cli.command {
        Commands::Check {
            document,
            schema,
            no_schema,
        } => check(config, fetcher, document, schema, no_schema).await,
        Commands::Format { document } => {
            let text = fetch_document(&fetcher, &document, &FormatOptions::default()).await?;
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Examples => {
            for (index, example) in config.examples.iter().enumerate() {
                println!("{index:>2}  {:<20} {}", example.title, example.url);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn check(
    config: PlaygroundConfig,
    fetcher: PlaygroundFetcher,
    document: Option<String>,
    schema: Option<String>,
    no_schema: bool,
) -> Result<ExitCode> {
    let mut playground = Playground::new(
        config,
        fetcher,
        JsonCoverageReader,
        HeadlessLayerFactory::new(),
    );

    let notices = Arc::new(AtomicUsize::new(0));
    let notices_clone = Arc::clone(&notices);
    playground.editor_mut().subscribe(move |event| {
        if let EditorEvent::Notice { message } = event {
            notices_clone.fetch_add(1, Ordering::Relaxed);
            eprintln!("error: {message}");
        }
    });

    let outcome = if no_schema {
        let url = document
            .or_else(|| playground.config().default_example().map(|e| e.url.clone()))
            .context("no document given and no examples configured")?;
        playground.load_document(&url).await?
    } else {
        let hash = LocationHash {
            url: document,
            schema,
        };
        playground.start(&hash.to_fragment()).await?
    };

    if notices.load(Ordering::Relaxed) > 0 {
        return Ok(ExitCode::FAILURE);
    }

    let diagnostics = playground.editor().diagnostics();
    for diagnostic in diagnostics {
        println!("{diagnostic}");
    }

    if let Some(DisplayOutcome::Displayed { .. }) = outcome {
        for group in playground.groups() {
            let extent = playground
                .param_sync()
                .virtual_layer(group.key())
                .and_then(|layer| layer.property("paletteExtent"));
            let extent = extent.map(|e| format!(", extent {e}")).unwrap_or_default();
            println!("{}: {} layer(s){extent}", group.key(), group.len());
        }
    }

    Ok(if diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
