use crate::config::Config;
use crate::error::CalendarResult;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

pub mod assignment_calendar;

pub use assignment_calendar::{AssignmentCalendar, AssignmentCalendarHandle};

/// A unit of the page that is connected once and torn down on exit
#[async_trait]
pub trait Component: Send + Sync + Any {
    /// Stable name used for lookup
    fn name(&self) -> &'static str;

    /// Initialize the component when it is connected to the page
    async fn init(&self, config: Arc<RwLock<Config>>) -> CalendarResult<()>;

    /// Disconnect from the page and release anything the component holds
    async fn shutdown(&self) -> CalendarResult<()>;

    fn as_any(&self) -> &dyn Any;
}

/// Owns the components mounted on the page, in mount order
pub struct ComponentManager {
    components: Vec<Box<dyn Component>>,
    config: Arc<RwLock<Config>>,
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.components.iter().map(|c| c.name()).collect();
        f.debug_struct("ComponentManager")
            .field("components", &names)
            .field("config", &self.config)
            .finish()
    }
}

impl ComponentManager {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            components: Vec::new(),
            config,
        }
    }

    /// Mount a component; it is connected by the next `init_all`
    pub fn register<T: Component + 'static>(&mut self, component: T) {
        debug!(component = component.name(), "Mounting component");
        self.components.push(Box::new(component));
    }

    /// Connect every component in mount order. A failing component is
    /// logged and skipped; its name is returned so the caller can decide
    /// whether the page is still usable.
    pub async fn init_all(&self) -> CalendarResult<Vec<&'static str>> {
        let mut failed = Vec::new();

        for component in &self.components {
            info!(component = component.name(), "Connecting component");

            if let Err(e) = component.init(Arc::clone(&self.config)).await {
                error!("Error connecting component {}: {:?}", component.name(), e);
                failed.push(component.name());
            }
        }

        Ok(failed)
    }

    /// Disconnect components in reverse mount order
    pub async fn shutdown_all(&self) -> CalendarResult<()> {
        info!("Disconnecting {} component(s)", self.components.len());

        for component in self.components.iter().rev() {
            if let Err(e) = component.shutdown().await {
                error!("Error disconnecting component {}: {:?}", component.name(), e);
            }
        }

        Ok(())
    }

    pub fn get_component_by_name(&self, name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// Look a component up by name and concrete type
    pub fn get<T: Component + 'static>(&self, name: &str) -> Option<&T> {
        self.get_component_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<T>())
    }
}
