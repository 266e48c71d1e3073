use crate::shutdown;
use outlook_calendar::components::{outlook_calendar::OutlookCalendar, ComponentManager};
use outlook_calendar::config::Config;
use outlook_calendar::error::{component_error, config_error, Error};
use outlook_calendar::server::McpServer;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration.
///
/// Everything goes to stderr: stdout carries the MCP protocol.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Outlook is only scriptable on Windows; elsewhere an interpreter has to be
/// configured on purpose (e.g. `pwsh` talking to a remote Outlook)
pub async fn check_platform(config: &Arc<RwLock<Config>>) -> miette::Result<()> {
    let config_read = config.read().await;
    info!(platform = std::env::consts::OS, "Checking platform");

    if cfg!(windows) {
        return Ok(());
    }

    if config_read.interpreter_overridden {
        warn!(
            interpreter = %config_read.interpreter,
            "Not running on Windows; using the configured interpreter anyway"
        );
        return Ok(());
    }

    Err(config_error(
        "This server only works on Windows, where Outlook can be automated. \
         Set OUTLOOK_INTERPRETER to run it elsewhere.",
    )
    .into())
}

/// Initialize components and serve MCP requests on stdio
pub async fn start_server(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    {
        let config_read = config.read().await;
        if !config_read.script_path.exists() {
            warn!(
                script = %config_read.script_path.display(),
                "Calendar script not found; every operation will fail until it is installed"
            );
        }
    }

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    // Register Outlook calendar component
    component_manager.register(OutlookCalendar::new());

    component_manager.init_all().await?;

    let handle = component_manager
        .outlook_calendar()
        .await
        .ok_or_else(|| component_error("Outlook calendar component failed to initialize"))?;

    // Cancelled by the signal handler
    let shutdown_token = CancellationToken::new();

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(signal_token).await;
    });

    info!("MCP Outlook Calendar Server running on stdio");
    let result = McpServer::new(handle, shutdown_token.clone()).run_stdio().await;

    // Shut down all components
    if let Err(e) = component_manager.shutdown_all().await {
        error!("Error shutting down components: {:?}", e);
    } else {
        info!("All components shut down successfully");
    }

    if let Err(e) = result {
        error!("MCP server error: {:?}", e);
        return Err(e.into());
    }

    info!("MCP server stopped");
    if shutdown_token.is_cancelled() {
        // The blocking stdin reader cannot be interrupted, so leaving it to
        // runtime shutdown would hang until the client writes another line
        std::process::exit(0);
    }
    Ok(())
}
