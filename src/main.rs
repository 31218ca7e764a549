use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use servedir::{config, netinfo, port, routes, AppState, Config, ServerInfo};

#[derive(Parser, Debug)]
#[command(name = "servedir")]
#[command(about = "Zero-configuration HTTP file server for sharing a local directory")]
#[command(version)]
struct Cli {
    /// Preferred port; the next free port is used when it is busy
    #[arg(short, long, env = "SERVEDIR_PORT")]
    port: Option<u16>,

    /// Directory to serve (created if absent, default "./serve")
    #[arg(short, long, env = "SERVEDIR_DIR")]
    dir: Option<PathBuf>,

    /// Address to bind to
    #[arg(short, long, env = "SERVEDIR_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Enable verbose logging
    #[arg(short, long, env = "SERVEDIR_VERBOSE")]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long, env = "SERVEDIR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "servedir=debug,tower_http=debug"
    } else {
        "servedir=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from file if provided, otherwise use defaults
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    // Pick the serve root: explicit argument or "serve" under the current
    // working directory, created if absent.
    let root = match &cli.dir {
        Some(dir) => dir.clone(),
        None => config::default_serve_dir(&std::env::current_dir()?),
    };

    if !root.exists() {
        info!("Creating directory: {}", root.display());
    }
    std::fs::create_dir_all(&root)?;
    let root_dir = root.canonicalize()?;

    if !root_dir.is_dir() {
        return Err(format!("Root path is not a directory: {}", root_dir.display()).into());
    }

    // Find a free port before the real listener binds. The probe releases
    // the port, so a concurrent grab surfaces as a bind error below.
    let start_port = cli.port.unwrap_or(config.port);
    let chosen_port = port::find_available_port(cli.bind, start_port, config.max_port_attempts)?;

    let info = ServerInfo {
        port: chosen_port,
        serve_dir: root_dir.display().to_string(),
        network_ips: netinfo::network_ips(),
        hostname: netinfo::hostname(),
    };

    info!("Serving directory: {}", root_dir.display());
    info!("Hostname: {}", info.hostname);
    info!("Local:    http://localhost:{}", chosen_port);
    info!("Local:    http://127.0.0.1:{}", chosen_port);
    for ip in &info.network_ips {
        info!(
            "Network:  http://{}:{} ({})",
            ip.address, chosen_port, ip.interface
        );
    }
    if info.network_ips.is_empty() {
        warn!("No network interfaces found, server is only reachable locally");
    }
    if let Some(requested) = cli.port {
        if requested != chosen_port {
            warn!("Port {} was busy, using {} instead", requested, chosen_port);
        }
    }

    let state = AppState::new(root_dir, config, info);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::new(cli.bind, chosen_port);
    info!("Starting servedir on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
