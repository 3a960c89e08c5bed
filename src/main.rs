use assignment_calendar::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting assignment calendar");

    // Load configuration
    let config = startup::load_config().await?;

    // Start the calendar
    startup::start(config).await
}
