use super::lifecycle::LifecycleState;
use super::models::{
    AssignmentRecord, CalendarEvent, FetchParams, FilterKey, FilterOptions, FilterState,
    HostInputs, SelectedEvent,
};
use super::transform::prepare_events;
use super::widget::{CalendarRenderer, WidgetCallbacks, WidgetConfig, WidgetHandle};
use crate::error::CalendarResult;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where the pipeline is in its fetch/render cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    Fetching,
    Rendering,
}

/// A dispatched fetch. Responses are matched back by `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub params: FetchParams,
}

/// What happened to a fetch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Rendered { events: usize, dropped: usize },
    /// A newer request was dispatched after this one
    Stale,
    /// The fetch failed; the previous events stay on screen
    Failed,
    /// The events were replaced but the widget could not be created
    RenderFailed,
}

/// Read-only view of the calendar for the host page
#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub lifecycle: LifecycleState,
    pub state: PipelineState,
    pub filters: BTreeMap<FilterKey, String>,
    pub filter_labels: BTreeMap<FilterKey, String>,
    pub events: Vec<CalendarEvent>,
    pub selected_event: Option<SelectedEvent>,
    pub creation_requested: bool,
    pub dropped_records: usize,
    pub latest_request: u64,
    pub rendered_request: u64,
    pub widget_live: bool,
    pub filter_options: FilterOptions,
}

/// Filter state, fetch sequencing, event set and the live widget
pub struct EventPipeline {
    container: String,
    project_name: Option<String>,
    filters: FilterState,
    state: PipelineState,
    events: Vec<CalendarEvent>,
    dropped: usize,
    latest_dispatched: u64,
    last_rendered: u64,
    widget: Option<Box<dyn WidgetHandle>>,
    renderer: Arc<dyn CalendarRenderer>,
    callbacks: WidgetCallbacks,
    selected: Option<SelectedEvent>,
    creation_requested: bool,
    filter_options: FilterOptions,
}

impl EventPipeline {
    pub fn new(
        container: &str,
        host: HostInputs,
        renderer: Arc<dyn CalendarRenderer>,
        callbacks: WidgetCallbacks,
    ) -> Self {
        Self {
            container: container.to_string(),
            project_name: host.project_name,
            filters: FilterState::new(host.visible_filters),
            state: PipelineState::Idle,
            events: Vec::new(),
            dropped: 0,
            latest_dispatched: 0,
            last_rendered: 0,
            widget: None,
            renderer,
            callbacks,
            selected: None,
            creation_requested: false,
            filter_options: FilterOptions::default(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Record a filter selection. Nothing is fetched until filters are applied.
    pub fn set_filter(
        &mut self,
        key: FilterKey,
        value: Option<String>,
        label: Option<String>,
    ) -> CalendarResult<()> {
        self.filters.set(key, value, label)?;
        debug!(filter = %key, value = ?self.filters.get(key), "Filter selection recorded");
        Ok(())
    }

    /// Start a fetch with the current filters
    pub fn apply_filters(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Reset every filter and its displayed value, then fetch unfiltered
    pub fn clear_filters(&mut self) -> FetchTicket {
        self.filters.clear();
        self.begin_fetch()
    }

    fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_dispatched += 1;
        self.state = PipelineState::Fetching;

        let params = self.filters.to_params(self.project_name.as_deref());
        info!(seq = self.latest_dispatched, ?params, "Fetching assignments");

        FetchTicket {
            seq: self.latest_dispatched,
            params,
        }
    }

    /// Handle the response to the fetch tagged `seq`
    pub fn complete_fetch(
        &mut self,
        seq: u64,
        result: CalendarResult<Vec<AssignmentRecord>>,
    ) -> FetchOutcome {
        if seq < self.latest_dispatched {
            debug!(seq, latest = self.latest_dispatched, "Discarding stale assignment response");
            return FetchOutcome::Stale;
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                error!(seq, "Error fetching assignments: {}", e);
                self.state = PipelineState::Idle;
                return FetchOutcome::Failed;
            }
        };

        self.state = PipelineState::Rendering;
        let outcome = prepare_events(&records);
        self.events = outcome.events;
        self.dropped = outcome.dropped;
        self.last_rendered = seq;

        let rendered = self.render(Local::now().date_naive());
        self.state = PipelineState::Idle;

        match rendered {
            Ok(()) => FetchOutcome::Rendered {
                events: self.events.len(),
                dropped: self.dropped,
            },
            Err(e) => {
                error!(seq, "Error rendering calendar: {}", e);
                FetchOutcome::RenderFailed
            }
        }
    }

    /// Destroy the current widget, if any, then create a new one with the
    /// current events. Runs on every fetch cycle.
    pub fn render(&mut self, default_date: NaiveDate) -> CalendarResult<()> {
        if let Some(previous) = self.widget.take() {
            debug!(container = %previous.container(), "Destroying previous calendar widget");
            previous.destroy();
        }

        let config = WidgetConfig::new(default_date, self.events.clone(), self.callbacks.clone());
        let handle = self.renderer.init(&self.container, config)?;
        self.widget = Some(handle);

        info!(container = %self.container, events = self.events.len(), "Calendar rendered");
        Ok(())
    }

    /// Open the detail view for a clicked event
    pub fn event_click(&mut self, event_id: &str) {
        match self.events.iter().find(|e| e.id == event_id) {
            Some(event) => self.selected = Some(SelectedEvent::from(event)),
            None => warn!(event_id, "Clicked event is not in the current event set"),
        }
    }

    /// An empty day was clicked; the host page may start a record creation
    pub fn day_click(&mut self, date: NaiveDate) {
        debug!(%date, "Record creation requested");
        self.creation_requested = true;
    }

    pub fn close_modal(&mut self) {
        self.selected = None;
    }

    pub fn create_cancel(&mut self) {
        self.creation_requested = false;
    }

    pub fn set_filter_options(&mut self, options: FilterOptions) {
        self.filter_options = options;
    }

    /// Release the live widget
    pub fn teardown(&mut self) {
        if let Some(widget) = self.widget.take() {
            widget.destroy();
        }
    }

    pub fn view(&self, lifecycle: LifecycleState) -> CalendarView {
        CalendarView {
            lifecycle,
            state: self.state,
            filters: self
                .filters
                .active()
                .map(|(k, v)| (k, v.to_string()))
                .collect(),
            filter_labels: FilterKey::ALL
                .into_iter()
                .filter(|k| self.filters.is_visible(*k))
                .map(|k| (k, self.filters.label(k).to_string()))
                .collect(),
            events: self.events.clone(),
            selected_event: self.selected.clone(),
            creation_requested: self.creation_requested,
            dropped_records: self.dropped,
            latest_request: self.latest_dispatched,
            rendered_request: self.last_rendered,
            widget_live: self.widget.is_some(),
            filter_options: self.filter_options.clone(),
        }
    }
}
