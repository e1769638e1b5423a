use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use wikirank::{api, Config, RankingService};

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Crawl a wiki, rank its articles and search them", long_about = None)]
struct Args {
    /// JSON config file; flags below override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true)]
    seed: Option<String>,

    #[arg(long, global = true)]
    max_documents: Option<usize>,

    /// Directory for crawl artifacts
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Give up on the crawl after this many seconds
    #[arg(long, global = true)]
    load_timeout: Option<u64>,

    /// Skip pages that fail to fetch instead of aborting
    #[arg(long, global = true)]
    tolerate_fetch_failures: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the search API; the index loads in the background
    Serve {
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Load the index and run a single query
    Search {
        query: String,

        #[arg(short, long, default_value = "basic")]
        mode: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

impl Args {
    fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(seed) = &self.seed {
            config.seed = seed.clone();
        }
        if let Some(max) = self.max_documents {
            config.max_documents = max;
        }
        if let Some(store) = &self.store {
            config.store_path = Some(store.clone());
        }
        if let Some(secs) = self.load_timeout {
            config.load_timeout_secs = Some(secs);
        }
        if self.tolerate_fetch_failures {
            config.tolerate_fetch_failures = true;
        }
        if let Command::Serve { bind: Some(bind) } = &self.command {
            config.bind = bind.clone();
        }
        Ok(config)
    }
}

async fn serve(service: Arc<RankingService>) -> Result<()> {
    let loader = service.clone();
    tokio::spawn(async move {
        if loader.load().await.is_err() {
            tracing::warn!("Serving without an index; /health reports FAILED");
        }
    });

    let bind = service.config().bind.clone();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!(%bind, "server listening");
    axum::serve(listener, api::create_router(service)).await?;
    Ok(())
}

async fn search(service: &RankingService, query: &str, mode: &str, limit: usize) -> Result<()> {
    service.load().await?;

    let start = Instant::now();
    let results = service.query(query, mode)?;
    let duration = start.elapsed();

    println!("Search found {} documents in {:?}", results.len(), duration);
    println!();

    for (i, result) in results.iter().take(limit).enumerate() {
        println!(
            "{:>3}. {:<40} score={:.4} content={:.4} location={:.4} pageRank={:.4}",
            i + 1,
            result.name,
            result.score,
            result.content,
            result.location,
            result.authority
        );
        println!("     {}", result.link);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.to_config()?;
    let service = Arc::new(RankingService::from_config(config)?);

    match &args.command {
        Command::Serve { .. } => serve(service).await,
        Command::Search { query, mode, limit } => search(&service, query, mode, *limit).await,
    }
}
