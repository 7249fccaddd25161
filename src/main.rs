mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use hotelier_core::config::Config;
use hotelier_server::context::AppContext;

async fn serve(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting hotelier");
    hotelier_server::start(config).await?;
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p).with_context(|| format!("failed to load {}", p.display()))?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for w in &warnings {
            println!("  - {w}");
        }
    }
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!("  Auth enabled: {}", config.auth.enabled);
    println!("  Storage root: {}", config.storage.root_dir.display());
    println!("  Public URL: {}", config.storage.public_base_url);
    println!("  Max upload: {} bytes", config.storage.max_upload_bytes);

    Ok(())
}

async fn audit_storage(config_path: Option<&Path>, purge_orphans: bool, json: bool) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let db = hotelier_server::open_database(&config)?;
    let ctx = AppContext::new(config, db);

    let report = ctx.pictures.audit(purge_orphans).await?;

    if json {
        let value = serde_json::json!({
            "rows": report.rows,
            "blobs": report.blobs,
            "orphaned_blobs": report.orphaned_blobs,
            "missing_blobs": report.missing_blobs,
            "stale_stashes": report.stale_stashes,
            "purged": report.purged,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Picture rows: {}", report.rows);
    println!("Stored files: {}", report.blobs);
    println!("Orphaned files: {}", report.orphaned_blobs.len());
    for key in &report.orphaned_blobs {
        println!("  {key}");
    }
    println!("Rows with missing files: {}", report.missing_blobs.len());
    for key in &report.missing_blobs {
        println!("  {key}");
    }
    println!("Stale stashed files: {}", report.stale_stashes.len());
    for key in &report.stale_stashes {
        println!("  {key}");
    }
    if purge_orphans {
        println!("Purged: {}", report.purged);
    }
    if report.is_consistent() {
        println!("✓ Storage is consistent");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from --verbose.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "hotelier=trace,hotelier_server=trace,hotelier_db=debug,hotelier_core=debug,tower_http=debug".to_string()
        } else {
            "hotelier=info,hotelier_server=info,hotelier_db=info,tower_http=info".to_string()
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
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::AuditStorage {
            purge_orphans,
            json,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(audit_storage(cli.config.as_deref(), purge_orphans, json))
        }
        Commands::GenerateApiKey => {
            println!("{}", hotelier_server::middleware::auth::generate_api_key());
            Ok(())
        }
        Commands::Version => {
            println!("hotelier {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
