use super::actor::{AssignmentCalendarActor, AssignmentCalendarActorHandle};
use super::models::FilterKey;
use super::pipeline::CalendarView;
use super::{CalendarServices, CalendarSettings};
use crate::error::CalendarResult;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with one calendar instance
#[derive(Clone)]
pub struct AssignmentCalendarHandle {
    actor_handle: AssignmentCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl AssignmentCalendarHandle {
    /// Create a new AssignmentCalendarHandle and spawn the actor
    pub fn new(settings: CalendarSettings, services: CalendarServices) -> Self {
        // Create the actor and get its handle
        let (mut actor, handle) = AssignmentCalendarActor::new(settings, services);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// The component was attached to the page: load filter options
    pub async fn connected(&self) -> CalendarResult<()> {
        self.actor_handle.connected().await
    }

    /// The page has rendered. Only the first call loads the calendar library.
    pub async fn render_ready(&self) -> CalendarResult<()> {
        self.actor_handle.render_ready().await
    }

    /// Record a filter selection without fetching
    pub async fn set_filter(
        &self,
        key: FilterKey,
        value: Option<String>,
        label: Option<String>,
    ) -> CalendarResult<()> {
        self.actor_handle.set_filter(key, value, label).await
    }

    /// Fetch with the current filters; returns the request sequence number
    pub async fn apply_filters(&self) -> CalendarResult<u64> {
        self.actor_handle.apply_filters().await
    }

    /// Reset all filters and fetch unfiltered
    pub async fn clear_filters(&self) -> CalendarResult<u64> {
        self.actor_handle.clear_filters().await
    }

    pub async fn event_click(&self, event_id: &str) -> CalendarResult<()> {
        self.actor_handle.event_click(event_id).await
    }

    pub async fn day_click(&self, date: NaiveDate) -> CalendarResult<()> {
        self.actor_handle.day_click(date).await
    }

    /// Dismiss the event detail view
    pub async fn close_modal(&self) -> CalendarResult<()> {
        self.actor_handle.close_modal().await
    }

    /// Dismiss the record creation request
    pub async fn create_cancel(&self) -> CalendarResult<()> {
        self.actor_handle.create_cancel().await
    }

    pub async fn snapshot(&self) -> CalendarResult<CalendarView> {
        self.actor_handle.snapshot().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        self.actor_handle.shutdown().await
    }
}
