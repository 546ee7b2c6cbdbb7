use anyhow::Context;
use clap::{ArgGroup, Parser};
use scriptforge_agent::{ForgeConfig, Pipeline};
use scriptforge_core::{ArtifactStore, RunContext};
use std::path::{Path, PathBuf};

mod console;
mod logging;

use console::Console;

/// Scriptforge - generate a tested Python script from a plain-language description
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").args(["requirements", "file"])))]
struct Cli {
    /// High-level requirements for the function as a direct string
    #[arg(short, long)]
    requirements: Option<String>,

    /// Path to a text file containing the requirements
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Configuration file (default: scriptforge.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Model to request from the generation service
    #[arg(short, long)]
    model: Option<String>,

    /// Directory that holds one sub-directory per run
    #[arg(long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = ForgeConfig::load(cli.config.as_deref())?;
    if let Some(model) = cli.model.clone() {
        config.model = model;
    }
    if let Some(root) = cli.output_root.clone() {
        config.artifact_root = root;
    }

    let run = RunContext::create(&config.artifact_root).with_context(|| {
        format!(
            "Failed to create run directory under {}",
            config.artifact_root.display()
        )
    })?;
    let store = ArtifactStore::new(run);
    logging::init(&store, cli.verbose)?;

    tracing::info!(
        run_id = %store.context().run_id(),
        model = %config.model,
        "run directory {}",
        store.context().dir().display()
    );

    let requirements = read_requirements(&cli)?;
    let pipeline = Pipeline::new(config.build_gateway()?, config.validator());
    let mut console = Console::stdio();
    if requirements.is_none() {
        console.say(scriptforge_agent::prompts::WELCOME).await?;
    }

    let outcome = pipeline.run(&store, requirements, &mut console).await?;

    println!();
    println!("Run {}: {}", outcome.run_id, outcome.verdict.summary());
    match &outcome.final_artifact {
        Some(path) => println!("Accepted script: {}", path.display()),
        None => {
            println!("No script accepted. Artifacts: {}", store.context().dir().display());
            if !outcome.verdict.stderr.is_empty() {
                println!("{}", outcome.verdict.stderr.trim_end());
            }
        }
    }

    Ok(())
}

fn read_requirements(cli: &Cli) -> anyhow::Result<Option<String>> {
    let supplied = match (&cli.file, &cli.requirements) {
        (Some(path), _) => {
            let text = read_requirements_file(path)?;
            tracing::info!("Requirements read from file.");
            Some(text)
        }
        (None, Some(text)) => {
            tracing::info!("Requirements provided as a direct string.");
            Some(text.clone())
        }
        (None, None) => None,
    };
    // blank requirements fall back to the interactive dialogue
    Ok(supplied.filter(|text| !text.trim().is_empty()))
}

fn read_requirements_file(path: &Path) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read requirements from {}", path.display()))?;
    Ok(content.trim().to_string())
}
