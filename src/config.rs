use crate::components::assignment_calendar::models::{FilterKey, HostInputs};
use crate::error::{config_error, env_error, CalendarResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use tracing::warn;

/// Default element the calendar widget is bound to
pub const DEFAULT_CONTAINER: &str = "fullcalendarjs";
/// Default file with filter visibility toggles
pub const FILTERS_FILE: &str = "config/filters.toml";

/// Main configuration structure for the calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the assignment and picklist service
    pub service_url: String,
    /// Bearer token for the service
    pub service_token: Option<String>,
    /// Project name scoping every fetch
    pub project_name: Option<String>,
    /// Base URL of the calendar library's static resources
    pub asset_base_url: String,
    /// Element the widget is bound to
    pub container: String,
    /// Object holding the picklist fields used by filters
    pub picklist_object: String,
    pub sub_category_field: String,
    pub role_field: String,
    /// Map of filter names to whether the page displays them
    pub filters: HashMap<String, bool>,
}

impl Config {
    /// Configuration with defaults for everything but the service URL
    pub fn new(service_url: &str) -> Self {
        let filters = FilterKey::ALL
            .into_iter()
            .map(|key| (key.as_str().to_string(), true))
            .collect();

        Self {
            service_url: service_url.to_string(),
            service_token: None,
            project_name: None,
            asset_base_url: format!("{}/resource/FullCalendarJS", service_url.trim_end_matches('/')),
            container: DEFAULT_CONTAINER.to_string(),
            picklist_object: "pse__Assignment__c".to_string(),
            sub_category_field: "Sub_Category__c".to_string(),
            role_field: "pse__Role__c".to_string(),
            filters,
        }
    }

    /// Load configuration from environment and config file
    pub fn load() -> CalendarResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let service_url = env::var("CALENDAR_SERVICE_URL").map_err(|_| env_error("CALENDAR_SERVICE_URL"))?;
        let mut config = Config::new(&service_url);

        config.service_token = non_empty_var("CALENDAR_SERVICE_TOKEN");
        config.project_name = non_empty_var("CALENDAR_PROJECT_NAME");
        if let Some(asset_base_url) = non_empty_var("CALENDAR_ASSET_BASE_URL") {
            config.asset_base_url = asset_base_url;
        }
        if let Some(container) = non_empty_var("CALENDAR_CONTAINER") {
            config.container = container;
        }
        if let Some(object) = non_empty_var("CALENDAR_PICKLIST_OBJECT") {
            config.picklist_object = object;
        }

        // Merge filter toggles from file if it exists
        if let Ok(content) = fs::read_to_string(FILTERS_FILE) {
            config.merge_filters(&content)?;
        }

        Ok(config)
    }

    /// Merge filter visibility toggles from TOML (`region = false`)
    pub fn merge_filters(&mut self, content: &str) -> CalendarResult<()> {
        let file_filters = toml::from_str::<HashMap<String, bool>>(content)?;
        for (key, value) in file_filters {
            let key = key
                .parse::<FilterKey>()
                .map_err(|_| config_error(&format!("Unknown filter '{}' in {}", key, FILTERS_FILE)))?;
            self.filters.insert(key.as_str().to_string(), value);
        }
        Ok(())
    }

    /// Check if a filter is displayed
    pub fn is_filter_visible(&self, key: FilterKey) -> bool {
        *self.filters.get(key.as_str()).unwrap_or(&false)
    }

    /// Inputs the hosting page passes to the calendar
    pub fn host_inputs(&self) -> HostInputs {
        for name in self.filters.keys() {
            if name.parse::<FilterKey>().is_err() {
                warn!("Ignoring unknown filter '{}'", name);
            }
        }

        HostInputs {
            project_name: self.project_name.clone(),
            visible_filters: FilterKey::ALL
                .into_iter()
                .filter(|key| self.is_filter_visible(*key))
                .collect(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
