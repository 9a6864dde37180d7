//! CLI e servidor HTTP do pipeline de anotação morfológica
//!
//! - `annotate`: anota o corpus inteiro e grava os artefatos CONLL-U.
//! - `frequencies`: relê o CONLL-U gravado e conta as classes gramaticais.
//! - `serve`: expõe a anotação de textos avulsos via HTTP.

mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use morph_core::config::{Loader, MorphConfig};
use morph_core::pipeline::annotator_for;
use morph_core::{CorpusManager, MorphologicalAnalysisPipeline, PosFrequencyPipeline};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::server::AppState;

#[derive(Parser)]
#[command(name = "morph-web")]
#[command(about = "Anotação morfológica de corpus em CONLL-U")]
#[command(version)]
struct Cli {
    /// Arquivo TOML sobreposto aos defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Anota todos os documentos do diretório de artigos
    Annotate {
        /// Diretório com {id}_raw.txt e {id}_meta.json
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Processa documentos em paralelo
        #[arg(long)]
        parallel: bool,
    },
    /// Conta classes gramaticais a partir do CONLL-U já gravado
    Frequencies {
        #[arg(short, long)]
        assets: Option<PathBuf>,
    },
    /// Inicia o servidor HTTP
    Serve {
        /// Endereço de escuta, ex. 127.0.0.1:3000
        #[arg(short, long)]
        address: Option<String>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<MorphConfig> {
    let mut loader = Loader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader = loader.with_env();

    match &cli.command {
        Commands::Annotate { assets, parallel } => {
            if let Some(dir) = assets {
                loader = loader.set_override("corpus.assets_dir", dir.display().to_string())?;
            }
            if *parallel {
                loader = loader.set_override("pipeline.parallel", true)?;
            }
        }
        Commands::Frequencies { assets: Some(dir) } => {
            loader = loader.set_override("corpus.assets_dir", dir.display().to_string())?;
        }
        Commands::Serve { address: Some(addr) } => {
            loader = loader.set_override("server.address", addr.as_str())?;
        }
        _ => {}
    }

    loader.build().context("configuração inválida")
}

fn run_annotate(config: &MorphConfig) -> anyhow::Result<()> {
    let mut corpus = CorpusManager::load(&config.corpus.assets_dir)
        .with_context(|| format!("falha ao carregar {}", config.corpus.assets_dir.display()))?;
    info!(documents = corpus.documents().len(), "corpus carregado");

    let pipeline = MorphologicalAnalysisPipeline::new(annotator_for(&config.analyzer)?)
        .parallel(config.pipeline.parallel);
    let report = pipeline.run(&mut corpus);

    println!(
        "{} documentos anotados em {} ms",
        report.annotated.len(),
        report.processing_ms
    );
    for (id, reason) in &report.failed {
        warn!(document = %id, %reason, "documento ignorado");
        println!("  falhou {id}: {reason}");
    }
    if !report.is_success() {
        bail!("{} documentos falharam", report.failed.len());
    }
    Ok(())
}

fn run_frequencies(config: &MorphConfig) -> anyhow::Result<()> {
    let mut corpus = CorpusManager::load(&config.corpus.assets_dir)
        .with_context(|| format!("falha ao carregar {}", config.corpus.assets_dir.display()))?;
    let frequencies = PosFrequencyPipeline::new().run(&mut corpus)?;

    for (id, frequency) in &frequencies {
        let summary: Vec<String> = frequency
            .iter()
            .map(|(pos, count)| format!("{pos}={count}"))
            .collect();
        println!("{id}\t{}", summary.join(" "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("morph_core=info,morph_web=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Annotate { .. } => {
            tokio::task::spawn_blocking(move || run_annotate(&config)).await??;
        }
        Commands::Frequencies { .. } => {
            tokio::task::spawn_blocking(move || run_frequencies(&config)).await??;
        }
        Commands::Serve { .. } => {
            let state = Arc::new(AppState {
                annotator: annotator_for(&config.analyzer)?,
            });
            server::serve(&config.server.address, state).await?;
        }
    }

    Ok(())
}
