use super::assets::load_all;
use super::lifecycle::LifecycleController;
use super::models::{AssignmentRecord, FilterKey, FilterOptions};
use super::pipeline::{CalendarView, EventPipeline, FetchTicket};
use super::service::PicklistService;
use super::widget::WidgetCallbacks;
use super::{CalendarServices, CalendarSettings, PicklistField};
use crate::error::{component_error, CalendarResult};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The calendar actor: a single task that owns all calendar state and
/// processes one command at a time
pub struct AssignmentCalendarActor {
    settings: CalendarSettings,
    services: CalendarServices,
    lifecycle: LifecycleController,
    pipeline: EventPipeline,
    command_rx: mpsc::Receiver<CalendarCommand>,
    command_tx: mpsc::WeakSender<CalendarCommand>,
}

/// Commands that can be sent to the calendar actor
pub enum CalendarCommand {
    Connected,
    RenderReady,
    AssetsLoaded(CalendarResult<()>),
    PicklistsLoaded(FilterOptions),
    SetFilter {
        key: FilterKey,
        value: Option<String>,
        label: Option<String>,
        respond_to: mpsc::Sender<CalendarResult<()>>,
    },
    ApplyFilters(mpsc::Sender<CalendarResult<u64>>),
    ClearFilters(mpsc::Sender<CalendarResult<u64>>),
    FetchCompleted {
        seq: u64,
        result: CalendarResult<Vec<AssignmentRecord>>,
    },
    EventClick(String),
    DayClick(NaiveDate),
    CloseModal,
    CreateCancel,
    Snapshot(mpsc::Sender<CalendarView>),
    Shutdown,
}

/// Handle for communicating with the calendar actor
#[derive(Clone)]
pub struct AssignmentCalendarActorHandle {
    command_tx: mpsc::Sender<CalendarCommand>,
}

impl AssignmentCalendarActorHandle {
    async fn send(&self, cmd: CalendarCommand) -> CalendarResult<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))
    }

    pub async fn connected(&self) -> CalendarResult<()> {
        self.send(CalendarCommand::Connected).await
    }

    pub async fn render_ready(&self) -> CalendarResult<()> {
        self.send(CalendarCommand::RenderReady).await
    }

    pub async fn set_filter(
        &self,
        key: FilterKey,
        value: Option<String>,
        label: Option<String>,
    ) -> CalendarResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(CalendarCommand::SetFilter {
            key,
            value,
            label,
            respond_to: response_tx,
        })
        .await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    pub async fn apply_filters(&self) -> CalendarResult<u64> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(CalendarCommand::ApplyFilters(response_tx)).await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    pub async fn clear_filters(&self) -> CalendarResult<u64> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(CalendarCommand::ClearFilters(response_tx)).await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    pub async fn event_click(&self, event_id: &str) -> CalendarResult<()> {
        self.send(CalendarCommand::EventClick(event_id.to_string())).await
    }

    pub async fn day_click(&self, date: NaiveDate) -> CalendarResult<()> {
        self.send(CalendarCommand::DayClick(date)).await
    }

    pub async fn close_modal(&self) -> CalendarResult<()> {
        self.send(CalendarCommand::CloseModal).await
    }

    pub async fn create_cancel(&self) -> CalendarResult<()> {
        self.send(CalendarCommand::CreateCancel).await
    }

    pub async fn snapshot(&self) -> CalendarResult<CalendarView> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(CalendarCommand::Snapshot(response_tx)).await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        let _ = self.command_tx.send(CalendarCommand::Shutdown).await;
        Ok(())
    }
}

/// Widget callbacks that post clicks back into the actor's mailbox
fn widget_callbacks(command_tx: mpsc::WeakSender<CalendarCommand>) -> WidgetCallbacks {
    let event_tx = command_tx.clone();
    WidgetCallbacks::new(
        move |event_id| {
            if let Some(tx) = event_tx.upgrade() {
                if let Err(e) = tx.try_send(CalendarCommand::EventClick(event_id.to_string())) {
                    warn!("Dropped event click: {}", e);
                }
            }
        },
        move |date| {
            if let Some(tx) = command_tx.upgrade() {
                if let Err(e) = tx.try_send(CalendarCommand::DayClick(date)) {
                    warn!("Dropped day click: {}", e);
                }
            }
        },
    )
}

impl AssignmentCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(settings: CalendarSettings, services: CalendarServices) -> (Self, AssignmentCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let weak_tx = command_tx.downgrade();

        let lifecycle = LifecycleController::new(&settings.asset_base_url, settings.assets.clone());
        let pipeline = EventPipeline::new(
            &settings.container,
            settings.host.clone(),
            Arc::clone(&services.renderer),
            widget_callbacks(weak_tx.clone()),
        );

        let actor = Self {
            settings,
            services,
            lifecycle,
            pipeline,
            command_rx,
            command_tx: weak_tx,
        };

        let handle = AssignmentCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!(container = %self.settings.container, "Assignment calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                CalendarCommand::Connected => self.load_filter_options(),
                CalendarCommand::RenderReady => self.render_ready(),
                CalendarCommand::AssetsLoaded(result) => {
                    if self.lifecycle.finish(&result) {
                        let ticket = self.pipeline.apply_filters();
                        self.dispatch_fetch(ticket);
                    }
                }
                CalendarCommand::PicklistsLoaded(options) => {
                    self.pipeline.set_filter_options(options);
                }
                CalendarCommand::SetFilter {
                    key,
                    value,
                    label,
                    respond_to,
                } => {
                    let result = self.pipeline.set_filter(key, value, label);
                    if let Err(e) = &result {
                        warn!("Filter change rejected: {}", e);
                    }
                    let _ = respond_to.send(result).await;
                }
                CalendarCommand::ApplyFilters(respond_to) => {
                    let result = self.start_fetch(false);
                    let _ = respond_to.send(result).await;
                }
                CalendarCommand::ClearFilters(respond_to) => {
                    let result = self.start_fetch(true);
                    let _ = respond_to.send(result).await;
                }
                CalendarCommand::FetchCompleted { seq, result } => {
                    let outcome = self.pipeline.complete_fetch(seq, result);
                    debug!(seq, ?outcome, "Fetch settled");
                }
                CalendarCommand::EventClick(event_id) => self.pipeline.event_click(&event_id),
                CalendarCommand::DayClick(date) => self.pipeline.day_click(date),
                CalendarCommand::CloseModal => self.pipeline.close_modal(),
                CalendarCommand::CreateCancel => self.pipeline.create_cancel(),
                CalendarCommand::Snapshot(respond_to) => {
                    let _ = respond_to.send(self.pipeline.view(self.lifecycle.state())).await;
                }
                CalendarCommand::Shutdown => {
                    info!("Assignment calendar actor shutting down");
                    break;
                }
            }
        }

        self.pipeline.teardown();
        info!("Assignment calendar actor shut down");
    }

    /// First render-ready signal starts the asset batch; later ones do nothing
    fn render_ready(&mut self) {
        if !self.lifecycle.begin() {
            debug!("Render-ready signal ignored, assets already requested");
            return;
        }

        let Some(tx) = self.command_tx.upgrade() else {
            return;
        };
        let loader = Arc::clone(&self.services.assets);
        let (base_url, assets) = self.lifecycle.batch();

        tokio::spawn(async move {
            let result = load_all(loader.as_ref(), &base_url, &assets).await;
            let _ = tx.send(CalendarCommand::AssetsLoaded(result)).await;
        });
    }

    fn start_fetch(&mut self, clear: bool) -> CalendarResult<u64> {
        if !self.lifecycle.is_ready() {
            let err = self.lifecycle.not_ready();
            warn!("Filters ignored: {}", err);
            return Err(err);
        }

        let ticket = if clear {
            self.pipeline.clear_filters()
        } else {
            self.pipeline.apply_filters()
        };
        let seq = ticket.seq;
        self.dispatch_fetch(ticket);
        Ok(seq)
    }

    /// Run the fetch off the actor task; the response comes back as a command
    fn dispatch_fetch(&self, ticket: FetchTicket) {
        let Some(tx) = self.command_tx.upgrade() else {
            return;
        };
        let service = Arc::clone(&self.services.assignments);

        tokio::spawn(async move {
            let result = service.fetch_assignments(&ticket.params).await;
            let _ = tx
                .send(CalendarCommand::FetchCompleted {
                    seq: ticket.seq,
                    result,
                })
                .await;
        });
    }

    /// Populate the picklist-backed filter options
    fn load_filter_options(&self) {
        let Some(tx) = self.command_tx.upgrade() else {
            return;
        };
        let picklists = Arc::clone(&self.services.picklists);
        let sub_category = self.settings.sub_category_field.clone();
        let role = self.settings.role_field.clone();

        tokio::spawn(async move {
            let (sub_categories, roles) = futures::join!(
                picklist_or_empty(picklists.as_ref(), &sub_category),
                picklist_or_empty(picklists.as_ref(), &role),
            );
            let _ = tx
                .send(CalendarCommand::PicklistsLoaded(FilterOptions {
                    sub_categories,
                    roles,
                }))
                .await;
        });
    }
}

async fn picklist_or_empty(picklists: &dyn PicklistService, field: &PicklistField) -> Vec<String> {
    match picklists
        .picklist_values(&field.object_name, &field.field_name)
        .await
    {
        Ok(values) => values,
        Err(e) => {
            warn!("Error loading picklist {}.{}: {}", field.object_name, field.field_name, e);
            Vec::new()
        }
    }
}
