mod actor;
pub mod assets;
mod handle;
pub mod lifecycle;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod time;
pub mod transform;
pub mod widget;

pub use handle::AssignmentCalendarHandle;
pub use models::CalendarEvent;

use crate::config::Config;
use crate::error::{component_error, CalendarResult};
use assets::{default_assets, Asset, AssetLoader};
use async_trait::async_trait;
use models::HostInputs;
use service::{AssignmentService, PicklistService};
use std::sync::Arc;
use tokio::sync::RwLock;
use widget::CalendarRenderer;

/// A picklist field used to populate a filter dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicklistField {
    pub object_name: String,
    pub field_name: String,
}

impl PicklistField {
    pub fn new(object_name: &str, field_name: &str) -> Self {
        Self {
            object_name: object_name.to_string(),
            field_name: field_name.to_string(),
        }
    }
}

/// Per-instance settings of a calendar
#[derive(Debug, Clone)]
pub struct CalendarSettings {
    /// Element the widget is bound to
    pub container: String,
    pub host: HostInputs,
    pub asset_base_url: String,
    pub assets: Vec<Asset>,
    pub sub_category_field: PicklistField,
    pub role_field: PicklistField,
}

impl CalendarSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            container: config.container.clone(),
            host: config.host_inputs(),
            asset_base_url: config.asset_base_url.clone(),
            assets: default_assets(),
            sub_category_field: PicklistField::new(&config.picklist_object, &config.sub_category_field),
            role_field: PicklistField::new(&config.picklist_object, &config.role_field),
        }
    }
}

/// External collaborators the calendar talks to
#[derive(Clone)]
pub struct CalendarServices {
    pub assignments: Arc<dyn AssignmentService>,
    pub picklists: Arc<dyn PicklistService>,
    pub assets: Arc<dyn AssetLoader>,
    pub renderer: Arc<dyn CalendarRenderer>,
}

/// Assignment calendar component for the hosting page
pub struct AssignmentCalendar {
    services: CalendarServices,
    handle: RwLock<Option<AssignmentCalendarHandle>>,
}

impl AssignmentCalendar {
    /// Create a new assignment calendar component
    pub fn new(services: CalendarServices) -> Self {
        Self {
            services,
            handle: RwLock::new(None),
        }
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<AssignmentCalendarHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for AssignmentCalendar {
    fn name(&self) -> &'static str {
        "assignment_calendar"
    }

    async fn init(&self, config: Arc<RwLock<Config>>) -> CalendarResult<()> {
        let settings = {
            let config_read = config.read().await;
            CalendarSettings::from_config(&config_read)
        };

        // Create a new handle if one doesn't exist
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_none() {
            *handle_lock = Some(AssignmentCalendarHandle::new(settings, self.services.clone()));
        }

        let handle = handle_lock
            .as_ref()
            .ok_or_else(|| component_error("Calendar handle missing after init"))?;
        handle.connected().await
    }

    async fn shutdown(&self) -> CalendarResult<()> {
        // Shutdown the handle if it exists
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
