use crate::components::assignment_calendar::assets::HttpAssetLoader;
use crate::components::assignment_calendar::service::HttpCalendarService;
use crate::components::assignment_calendar::widget::AgendaRenderer;
use crate::components::assignment_calendar::CalendarServices;
use crate::components::{AssignmentCalendar, ComponentManager};
use crate::config::Config;
use crate::error::{component_error, Error};
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
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

/// Collaborators backed by the configured service
pub async fn http_services(config: &Arc<RwLock<Config>>) -> miette::Result<CalendarServices> {
    let (service_url, token) = {
        let config_read = config.read().await;
        (config_read.service_url.clone(), config_read.service_token.clone())
    };

    let service = Arc::new(HttpCalendarService::new(&service_url, token)?);

    Ok(CalendarServices {
        assignments: service.clone(),
        picklists: service,
        assets: Arc::new(HttpAssetLoader::new()),
        renderer: Arc::new(AgendaRenderer::stdout()),
    })
}

/// Mount the calendar and run until a shutdown signal arrives
pub async fn start(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let services = http_services(&config).await?;

    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(AssignmentCalendar::new(services));
    let component_manager = Arc::new(component_manager);

    let failed = component_manager.init_all().await?;
    if !failed.is_empty() {
        warn!("Components failed to connect: {}", failed.join(", "));
    }

    // The page has rendered: load the calendar library and fetch
    let calendar = component_manager
        .get::<AssignmentCalendar>("assignment_calendar")
        .ok_or_else(|| component_error("Assignment calendar is not registered"))?;
    match calendar.get_handle().await {
        Some(handle) => handle.render_ready().await?,
        None => return Err(component_error("Assignment calendar failed to initialize").into()),
    }

    let (shutdown_send, shutdown_recv) = oneshot::channel();

    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components).await;
    });

    info!("Calendar running, press Ctrl+C to stop");
    let _ = shutdown_recv.await;
    info!("Received shutdown signal, calendar stopped");
    Ok(())
}
