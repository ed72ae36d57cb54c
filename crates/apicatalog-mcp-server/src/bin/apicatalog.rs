use anyhow::{Context, Result};
use apicatalog_core::{CatalogConfig, CatalogService, ConfigManager, OPERATION_NAMES};
use apicatalog_mcp_server::ApiCatalogMcpServer;
use atty::Stream;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rmcp::ServiceExt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, Registry};

#[derive(Parser)]
#[command(
    name = "apicatalog",
    version,
    author,
    about = "Public API catalog - MCP server and command line lookups",
    long_about = "Search, filter and get recommendations from a catalog of public APIs, \
                  either as an MCP tool server or directly from the command line."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[arg(long, global = true, help = "Configuration file path")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start MCP server with specified transport")]
    Start {
        #[command(subcommand)]
        transport: TransportType,
    },

    #[command(
        about = "Run a single catalog operation and print the result",
        long_about = "Run a single catalog operation by its tool name, e.g.\n\
                      apicatalog call search_apis_by_keyword --args '{\"keyword\": \"weather\"}'"
    )]
    Call {
        #[arg(help = "Operation name (see --list)", required_unless_present = "list")]
        operation: Option<String>,

        #[arg(long, help = "Arguments as a JSON object", default_value = "{}")]
        args: String,

        #[arg(long, help = "List available operations")]
        list: bool,
    },

    #[command(about = "Download the catalog and report the outcome")]
    Sync {
        #[arg(short, long, help = "Refetch even if the catalog is fresh")]
        force: bool,
    },

    #[command(about = "Write a default configuration file")]
    Init {
        #[arg(long, help = "Destination", default_value = ".apicatalog.toml")]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum TransportType {
    #[command(about = "Start with STDIO transport (default)")]
    Stdio,

    #[cfg(feature = "server-http")]
    #[command(about = "Start with HTTP streaming transport")]
    Http {
        #[arg(long, help = "Host to bind to", env = "APICATALOG_HTTP_HOST")]
        host: Option<String>,

        #[arg(short, long, help = "Port to bind to", env = "APICATALOG_HTTP_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path } = &cli.command {
        ConfigManager::create_default_config(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} {}", "✅ Wrote default configuration to".green(), path.display());
        return Ok(());
    }

    let manager =
        ConfigManager::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(manager.config(), cli.verbose);
    manager.log_summary();
    let config = manager.into_config();

    let service = Arc::new(
        CatalogService::from_config(&config).context("Failed to build catalog service")?,
    );

    match cli.command {
        Commands::Start { transport } => handle_start(transport, &config, service).await?,
        Commands::Call {
            operation,
            args,
            list,
        } => handle_call(service, operation, &args, list).await?,
        Commands::Sync { force } => handle_sync(service, force).await?,
        Commands::Init { .. } => {}
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the MCP protocol or command output
fn init_tracing(config: &CatalogConfig, verbose: bool) {
    let directive = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(Stream::Stderr))
            .with_target(false),
    );
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn handle_start(
    transport: TransportType,
    config: &CatalogConfig,
    service: Arc<CatalogService>,
) -> Result<()> {
    let server = ApiCatalogMcpServer::new(service);

    match transport {
        TransportType::Stdio => {
            if atty::is(Stream::Stderr) {
                eprintln!("{}", "Starting API catalog MCP server (stdio)...".green().bold());
            }

            let service = server
                .serve(rmcp::transport::stdio())
                .await
                .map_err(|e| anyhow::anyhow!("MCP server startup failed: {}", e))?;

            info!("MCP server ready on stdio");
            service
                .waiting()
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
        #[cfg(feature = "server-http")]
        TransportType::Http { host, port } => {
            use apicatalog_mcp_server::start_http_server;

            let mut http = config.http.clone();
            if let Some(host) = host {
                http.host = host;
            }
            if let Some(port) = port {
                http.port = port;
            }

            if atty::is(Stream::Stderr) {
                eprintln!(
                    "{}",
                    format!("Starting API catalog MCP server on http://{}", http.bind_address())
                        .green()
                        .bold()
                );
            }

            start_http_server(server, http)
                .await
                .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;
        }
    }

    Ok(())
}

async fn handle_call(
    service: Arc<CatalogService>,
    operation: Option<String>,
    args: &str,
    list: bool,
) -> Result<()> {
    if list {
        for name in OPERATION_NAMES {
            println!("{}", name);
        }
        return Ok(());
    }

    let operation = operation.context("An operation name is required")?;
    let args: serde_json::Value =
        serde_json::from_str(args).context("--args must be a JSON object")?;

    let text = service
        .call(&operation, args)
        .await
        .with_context(|| format!("{} failed", operation))?;
    println!("{}", text);
    Ok(())
}

async fn handle_sync(service: Arc<CatalogService>, force: bool) -> Result<()> {
    let outcome = service.synchronizer().sync(force).await;
    if outcome.success {
        println!("{} {}", "✅".green(), outcome.message);
        Ok(())
    } else {
        eprintln!("{} {}", "❌".red(), outcome.message);
        anyhow::bail!("catalog sync failed")
    }
}
