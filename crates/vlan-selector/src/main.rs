use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vlan_selector::{
    Config, ConfigStore, DEFAULT_CONFIG_PATH, FileMappingSource, RadiusServer, ReloadHandle,
    ServerConfig,
};

/// VLAN Selector - RADIUS MAC authentication with VLAN assignment
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "vlan_selector")]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config_path: String,

    /// Validate configuration and exit (doesn't start server)
    #[arg(short = 't', long)]
    validate: bool,
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_summary(config: &Config, store: &ConfigStore) {
    let snapshot = store.snapshot();
    let report = snapshot.report();

    println!("✓ Configuration validated successfully!");
    println!();
    println!("Configuration summary:");
    println!(
        "  Listen: {}:{}",
        config.radius.listen_address, config.radius.port
    );
    println!("  Clients: {}", config.clients.len());
    println!("  VLAN groups: {}", snapshot.vlan_count());
    println!("  Mapped MACs: {}", snapshot.len());
    match snapshot.default_vlan() {
        Some(vlan) => println!("  Default VLAN: {}", vlan),
        None => println!("  Default VLAN: none (unknown MACs are rejected)"),
    }
    println!("  Log level: {}", config.log_level.as_deref().unwrap_or("info"));
    if let Some(ref path) = config.audit_log_path {
        println!("  Audit log: {}", path);
    }
    if !report.is_clean() {
        println!();
        println!("⚠️  Skipped mapping entries:");
        println!("  Invalid VLAN ids: {}", report.skipped_vlan_keys);
        println!("  VLANs without a MAC list: {}", report.skipped_vlan_values);
        println!("  Non-scalar MAC entries: {}", report.skipped_macs);
        println!("  MACs overridden by a later VLAN: {}", report.overridden_macs);
        if report.invalid_default {
            println!("  Default VLAN is not a number");
        }
    }
}

/// Reload the mapping on every SIGHUP
#[cfg(unix)]
fn spawn_reload_on_sighup(reload: ReloadHandle) -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangups = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!("SIGHUP received, reloading MAC to VLAN mapping");
            if let Ok(report) = reload.reload().await {
                info!(skipped = report.total_skipped(), "Mapping reload complete");
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn spawn_reload_on_sighup(_reload: ReloadHandle) -> std::io::Result<()> {
    warn!("Reload on SIGHUP is not available on this platform");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing("info");

            if cli.validate {
                eprintln!("❌ Configuration validation failed!");
                eprintln!("   Error: {}", e);
                process::exit(1);
            }

            if std::path::Path::new(&cli.config_path).exists() {
                error!("Invalid configuration in {}: {}", cli.config_path, e);
                process::exit(1);
            }

            warn!("Could not load config file from: {}", cli.config_path);
            info!("Creating example configuration at: {}", cli.config_path);

            if let Err(e) = Config::example().to_file(&cli.config_path) {
                error!("Error creating example config: {}", e);
                process::exit(1);
            }

            info!("Please edit {} and restart the server", cli.config_path);
            process::exit(0);
        }
    };

    if !cli.validate {
        init_tracing(config.log_level.as_deref().unwrap_or("info"));
    }

    let store = match ConfigStore::new(FileMappingSource::new(&cli.config_path)) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            if cli.validate {
                eprintln!("❌ Mapping validation failed!");
                eprintln!("   Error: {}", e);
            } else {
                error!("Failed to load MAC to VLAN mapping: {}", e);
            }
            process::exit(1);
        }
    };

    if cli.validate {
        print_summary(&config, &store);
        process::exit(0);
    }

    info!("VLAN Selector v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config_path);

    if config.clients.is_empty() {
        warn!("⚠️  No authorized clients configured, accepting requests from ANY IP address");
    } else {
        for client in &config.clients {
            let status = if client.enabled { "✓" } else { "✗" };
            let name = client.name.as_deref().unwrap_or("(unnamed)");
            info!("Client {} {} - {}", status, client.address, name);
        }
    }

    let server_config = match ServerConfig::new(config, store) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match RadiusServer::new(server_config).await {
        Ok(srv) => srv,
        Err(e) => {
            error!("Failed to create server: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = spawn_reload_on_sighup(server.reload_handle()) {
        error!("Failed to install SIGHUP handler: {}", e);
        process::exit(1);
    }

    info!("Waiting for requests...");

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
