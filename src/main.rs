mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Outlook calendar MCP server");

    // Load configuration
    let config = startup::load_config().await?;

    // Refuse to run where Outlook automation cannot work
    startup::check_platform(&config).await?;

    // Serve until stdin closes or a signal arrives
    startup::start_server(config).await
}
