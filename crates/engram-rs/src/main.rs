//! Command-line client for an Engram memory store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use engram_rs::StoreFactory;
use engram_rs::config::{EngramConfig, LayeredConfigOptions};
use engram_rs::memory::MemoryStore;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Command-line options for the memory client.
#[derive(Debug, Parser)]
#[command(name = "engram", version, about = "Long-term semantic memory for agents")]
struct Cli {
    /// Config file applied as the highest-precedence layer
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Agent name, overriding memory.agent_name
    #[arg(long, global = true)]
    agent: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chunk, embed and store text (reads stdin when no text or file is given)
    Write {
        /// Provenance label stored with every chunk
        #[arg(long)]
        source: String,
        /// Mark the chunks as external reference material
        #[arg(long)]
        reference: bool,
        /// Read the text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        text: Option<String>,
    },
    /// Recall the memories most similar to the given text
    Query {
        text: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Drop results scoring below this similarity
        #[arg(long, allow_hyphen_values = true)]
        min_score: Option<f32>,
        /// Print scored records as JSON instead of payload lines
        #[arg(long)]
        json: bool,
    },
    /// Delete one memory by id and print whether it was removed
    Delete { id: String },
    /// Drop the agent's whole collection
    Wipe,
}

/// Entry point for the Engram CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    engram_rs::init_logging();

    let cli = Cli::parse();
    info!(
        "starting engram (config_set={}, agent_set={})",
        cli.config.is_some(),
        cli.agent.is_some()
    );
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(agent) = cli.agent {
        config.memory.agent_name = agent;
    }
    let store = StoreFactory::from_config(&config).context("failed to build memory store")?;

    match cli.command {
        Command::Write {
            source,
            reference,
            file,
            text,
        } => {
            let text = read_input(file.as_deref(), text)?;
            write(&store, &source, reference, &text).await?;
        }
        Command::Query {
            text,
            limit,
            min_score,
            json,
        } => {
            let mut options = StoreFactory::query_options(&config.memory);
            if let Some(limit) = limit {
                options.limit = limit;
            }
            if let Some(min_score) = min_score {
                options = options.with_min_relevance(min_score);
            }
            if json {
                let memories = store.query(&text, options).await.context("query failed")?;
                println!("{}", serde_json::to_string_pretty(&memories)?);
            } else {
                for payload in store
                    .query_payloads(&text, options)
                    .await
                    .context("query failed")?
                {
                    println!("{payload}");
                }
            }
        }
        Command::Delete { id } => {
            println!("{}", store.delete(&id).await);
        }
        Command::Wipe => {
            store.wipe().await.context("wipe failed")?;
            println!("wiped {}", store.collection_name());
        }
    }
    Ok(())
}

/// Load the layered config, with an optional runtime override file.
fn load_config(runtime_path: Option<&Path>) -> anyhow::Result<EngramConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = runtime_path {
        options = options.with_runtime_path(path);
    }
    let layered = EngramConfig::load_layered(options).context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

fn read_input(file: Option<&Path>, text: Option<String>) -> anyhow::Result<String> {
    match (file, text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        (None, Some(text)) => Ok(text),
        (None, None) => std::io::read_to_string(std::io::stdin()).context("failed to read stdin"),
    }
}

async fn write(
    store: &MemoryStore,
    source: &str,
    reference: bool,
    text: &str,
) -> anyhow::Result<()> {
    let result = if reference {
        store.write_reference(source, text).await
    } else {
        store.write(source, text).await
    };
    result.context("write failed")
}
