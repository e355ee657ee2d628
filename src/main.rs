mod cli;

use cinevault::{
    config::{self, Config},
    metadata,
    scanner::Scanner,
    server::{self, routes_library::MovieResponse, AppContext},
};
use cinevault_db::pool::{get_conn, init_pool, DbPool};
use cinevault_db::queries::movies;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

/// Load the config file and apply environment overrides.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let mut config = config::load_config_or_default(config_path)?;
    config.apply_env();
    Ok(config)
}

fn open_catalog(config: &Config) -> Result<DbPool> {
    let db_path = config.database.path.to_string_lossy();
    tracing::info!("Opening catalog at {}", db_path);
    init_pool(&db_path).with_context(|| format!("Failed to open database {db_path}"))
}

fn build_scanner(config: &Config, pool: DbPool) -> Result<Scanner> {
    let provider = metadata::provider_from_config(&config.metadata)?;
    Ok(Scanner::new(pool, provider))
}

async fn serve(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting cinevault server");
    match config.library.root_dir {
        Some(ref dir) => tracing::info!("Library root: {:?}", dir),
        None => tracing::warn!("No library root configured, POST /scan is a no-op"),
    }

    let pool = open_catalog(&config)?;
    let scanner = build_scanner(&config, pool.clone())?;

    server::start_server(AppContext::new(config, pool, scanner)).await
}

async fn scan(dir: Option<PathBuf>, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let root = dir
        .or_else(|| config.library.root_dir.clone())
        .context("No directory given and no library root configured")?;

    let pool = open_catalog(&config)?;
    let scanner = build_scanner(&config, pool)?;

    let summary = scanner
        .scan(&root)
        .await
        .with_context(|| format!("Scan of {:?} failed", root))?;

    println!("Scanned {}", root.display());
    println!("  Files seen:  {}", summary.files_seen);
    println!("  Cataloged:   {}", summary.cataloged);
    println!("  Skipped:     {}", summary.skipped);
    println!("  Enriched:    {}", summary.enriched);
    if summary.enrichment_failures > 0 {
        println!("  Lookup failures: {}", summary.enrichment_failures);
    }
    Ok(())
}

fn list(json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let pool = open_catalog(&config)?;
    let conn = get_conn(&pool)?;
    let catalog = movies::list_movies(&conn)?;

    if json {
        let entries: Vec<MovieResponse> = catalog.into_iter().map(MovieResponse::from).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("Catalog is empty");
        return Ok(());
    }

    for movie in &catalog {
        println!(
            "{:>5}  {:<40}  {:>12}  {}",
            movie.id.get(),
            movie.title,
            movie.file_size,
            movie.file_path
        );
    }
    println!("\n{} entries", catalog.len());
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Database: {:?}", config.database.path);
            match config.library.root_dir {
                Some(ref dir) => println!("  Library root: {:?}", dir),
                None => println!("  Library root: (not set)"),
            }
            println!(
                "  TMDB enrichment: {}",
                if config.metadata.api_key.is_some() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Database: {:?}", config.database.path);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cinevault=trace,cinevault_db=debug,cinevault_common=debug,tower_http=debug".to_string()
        } else {
            "cinevault=debug,cinevault_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, cli.config.as_deref()))
        }
        Commands::Scan { dir } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(scan(dir, cli.config.as_deref()))
        }
        Commands::List { json } => list(json, cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cinevault {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
