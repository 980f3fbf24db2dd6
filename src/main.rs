//! DocuMind - CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use documind::{
    cli::{Args, ChatSession, Commands, ResultDisplay},
    config::Config,
    index::{CandleEmbedder, EmbeddingEngine, VectorDBManager},
    llm::{OllamaClient, OllamaJudge},
    rag::QueryEngine,
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(2);
    }

    telemetry::init_logging(args.verbosity());

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let display = ResultDisplay::new(args.verbosity());

    match &args.command {
        Commands::Config => show_config(&config, args.config.as_deref()),
        Commands::Doctor => run_doctor(&config, &display).await,
        Commands::Ask {
            question,
            top_k,
            json,
        } => {
            let engine = build_engine(&config, &display).await?;
            let spinner = display.start_spinner(question);
            let outcome = engine
                .answer(question, top_k.unwrap_or(engine.default_top_k()))
                .await;
            spinner.finish_and_clear();

            let result = outcome.context("Query failed")?;
            if *json {
                display.show_json(&result)?;
            } else {
                display.show_result(&result);
            }
            Ok(())
        }
        Commands::Chat => {
            let engine = build_engine(&config, &display).await?;
            display.show_banner(
                env!("CARGO_PKG_VERSION"),
                &config.ollama.model,
                &config.qdrant.collection,
            );
            let mut session =
                ChatSession::new(&engine, display, config.validation.failure_threshold)?;
            session.run().await
        }
    }
}

/// Wire the query engine from configuration
async fn build_engine(config: &Config, display: &ResultDisplay) -> Result<QueryEngine> {
    display.show_info(&format!("Loading embedding model {}", config.embedding.model_id));
    let model_id = config.embedding.model_id.clone();
    let engine = tokio::task::spawn_blocking(move || EmbeddingEngine::new(&model_id))
        .await
        .context("Embedding model loader panicked")??;
    let embedder = CandleEmbedder::new(engine, config.embedding.dimension)?;

    let store = VectorDBManager::connect(&config.qdrant.url, &config.qdrant.collection).await?;

    let generator = OllamaClient::with_config(&config.ollama.url, &config.ollama.model)?
        .with_temperature(config.ollama.temperature);
    let judge = OllamaJudge::new(OllamaClient::with_config(
        &config.ollama.url,
        &config.ollama.judge_model,
    )?);

    Ok(QueryEngine::from_config(
        Arc::new(embedder),
        Arc::new(store),
        Arc::new(generator),
        Arc::new(judge),
        config,
    ))
}

async fn run_doctor(config: &Config, display: &ResultDisplay) -> Result<()> {
    let mut healthy = true;

    let ollama = OllamaClient::with_config(&config.ollama.url, &config.ollama.model)?;
    if ollama.health_check().await? {
        display.show_success(&format!("Ollama reachable at {}", ollama.base_url()));
    } else {
        display.show_error(&format!(
            "Ollama not reachable at {} (start it with: ollama serve)",
            ollama.base_url()
        ));
        healthy = false;
    }

    match VectorDBManager::connect(&config.qdrant.url, &config.qdrant.collection).await {
        Ok(store) => {
            let points = store.point_count().await.unwrap_or(0);
            display.show_success(&format!(
                "Collection '{}' found with {} chunks",
                store.collection(),
                points
            ));
        }
        Err(e) => {
            display.show_error(&format!("Vector store check failed: {}", e));
            healthy = false;
        }
    }

    if healthy {
        Ok(())
    } else {
        anyhow::bail!("One or more checks failed")
    }
}

fn show_config(config: &Config, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };
    println!("{} {}\n", "Config file:".bold(), path.display());
    println!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
    Ok(())
}
