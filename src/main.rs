// This is the entry point of docforge.
//
// **Architecture Overview:**
// - `core/` = Business logic (content models, credential chain, pipelines)
// - `infra/` = Implementations of core traits (files, Google APIs, .docx)
// - `web/` = HTTP surface for the curriculum form
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Dispatch the chosen subcommand

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "web/web_layer.rs"]
mod web;

mod config;

use crate::config::Config;
use crate::core::auth::{CredentialProvider, CredentialSource, CredentialStore};
use crate::core::curriculum::{CurriculumService, FormParameters, TextGenerator};
use crate::core::publishing::DocumentService;
use crate::infra::ai::GeminiClient;
use crate::infra::auth::{
    GoogleAuthorizationFlow, GoogleTokenRefresher, InMemoryCredentialStore, JsonCredentialStore,
};
use crate::infra::docx::write_docx;
use crate::infra::google_docs::GoogleDocsClient;
use crate::infra::resume::load_content_model;
use crate::web::handlers::CurriculumPipeline;
use crate::web::{AppState, GeneratorFactory};
use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// docforge - resume .docx builder and AI curriculum publisher.
#[derive(Parser)]
#[command(name = "docforge", version, about, long_about = None)]
struct Cli {
    /// Keep the Google credential in memory only (nothing is read from or
    /// written to the token cache file).
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a resume .docx from a JSON or TOML content file.
    Resume {
        /// Content file (.json or .toml).
        #[arg(short, long)]
        input: PathBuf,

        /// Output path. An existing file is overwritten.
        #[arg(short, long, default_value = "resume.docx")]
        output: PathBuf,
    },

    /// Serve the curriculum form.
    Serve {
        #[arg(long, env = "DOCFORGE_BIND", default_value = "127.0.0.1:8501")]
        bind: SocketAddr,
    },

    /// Generate and publish one curriculum without the form.
    Generate {
        /// Subject / course title.
        #[arg(long)]
        subject: String,

        #[arg(long, default_value = "")]
        audience: String,

        /// e.g. "8 weeks" or "1 semester".
        #[arg(long, default_value = "")]
        duration: String,

        /// Learning objective (repeatable).
        #[arg(long = "objective")]
        objectives: Vec<String>,

        /// Topic or module (repeatable).
        #[arg(long = "topic")]
        topics: Vec<String>,

        /// Extra instructions for the model.
        #[arg(long, default_value = "")]
        instructions: String,

        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists) before clap
    // reads env-backed arguments.
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening. RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;

    match cli.command {
        Command::Resume { input, output } => run_resume(&input, &output).await,
        Command::Serve { bind } => serve(&config, cli.no_cache, bind).await,
        Command::Generate {
            subject,
            audience,
            duration,
            objectives,
            topics,
            instructions,
            api_key,
        } => {
            let params = FormParameters {
                subject,
                audience,
                duration,
                objectives: objectives.join("\n"),
                topics: topics.join("\n"),
                instructions,
                api_key,
            };
            generate_once(&config, cli.no_cache, params).await
        }
    }
}

async fn run_resume(input: &Path, output: &Path) -> anyhow::Result<()> {
    let model = load_content_model(input)
        .await
        .with_context(|| format!("Failed to load resume content from {}", input.display()))?;

    let document = crate::core::resume::build(&model);

    write_docx(&document, output)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Resume saved to {}", output.display());
    Ok(())
}

// ============================================================================
// DEPENDENCY INJECTION
// ============================================================================
// This is the "composition root" where we wire everything together.

fn build_pipeline(config: &Config, no_cache: bool, client: &Client) -> CurriculumPipeline {
    let store: Box<dyn CredentialStore> = if no_cache {
        tracing::info!("Credential cache disabled for this run");
        Box::new(InMemoryCredentialStore::new())
    } else {
        Box::new(JsonCredentialStore::new(&config.token_cache_file))
    };

    let credentials = CredentialProvider::new(
        store,
        GoogleTokenRefresher::new(client.clone()),
        GoogleAuthorizationFlow::new(
            client.clone(),
            config.client_secrets_file.clone(),
            config.oauth_redirect_port,
            config.oauth_timeout,
        ),
    );

    let documents = GoogleDocsClient::with_endpoints(
        client.clone(),
        &config.docs_base_url,
        &config.drive_base_url,
    );

    CurriculumService::new(
        Box::new(credentials) as Box<dyn CredentialSource>,
        Box::new(documents) as Box<dyn DocumentService>,
    )
}

fn gemini_factory(config: &Config, client: &Client) -> GeneratorFactory {
    let settings = config.gemini.clone();
    let client = client.clone();
    Arc::new(move |api_key: &str| {
        Box::new(GeminiClient::new(
            client.clone(),
            api_key.to_string(),
            settings.clone(),
        )) as Box<dyn TextGenerator>
    })
}

async fn serve(config: &Config, no_cache: bool, bind: SocketAddr) -> anyhow::Result<()> {
    let client = Client::new();
    let state = Arc::new(AppState {
        pipeline: build_pipeline(config, no_cache, &client),
        generators: gemini_factory(config, &client),
    });

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    tracing::info!(
        "Curriculum form ready at http://{} (model {})",
        listener.local_addr().unwrap_or(bind),
        config.gemini.model
    );

    axum::serve(listener, web::router(state))
        .await
        .context("Web server stopped")
}

async fn generate_once(
    config: &Config,
    no_cache: bool,
    params: FormParameters,
) -> anyhow::Result<()> {
    let client = Client::new();
    let pipeline = build_pipeline(config, no_cache, &client);
    let generator = (gemini_factory(config, &client))(params.api_key.trim());

    let published = pipeline
        .run(&params, generator.as_ref())
        .await
        .map_err(|e| anyhow::anyhow!("Curriculum run failed during {}: {}", e.stage(), e))?;

    println!("{}", published.title);
    println!("{}", published.view_link);
    Ok(())
}
