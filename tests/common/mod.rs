#![allow(dead_code)]

use assignment_calendar::components::assignment_calendar::assets::{default_assets, AssetLoader};
use assignment_calendar::components::assignment_calendar::models::{
    AssignmentRecord, FetchParams, HostInputs, RecordRef,
};
use assignment_calendar::components::assignment_calendar::pipeline::CalendarView;
use assignment_calendar::components::assignment_calendar::service::{AssignmentService, PicklistService};
use assignment_calendar::components::assignment_calendar::widget::{
    CalendarRenderer, WidgetCallbacks, WidgetConfig, WidgetHandle,
};
use assignment_calendar::components::assignment_calendar::{
    AssignmentCalendarHandle, CalendarServices, CalendarSettings, PicklistField,
};
use assignment_calendar::error::{asset_error, picklist_error, service_error, CalendarResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// Build an assignment record
pub fn assignment(id: &str, start: Option<&str>, end: Option<&str>) -> AssignmentRecord {
    AssignmentRecord {
        id: id.to_string(),
        name: Some(format!("Task {}", id)),
        start_date: start.map(str::to_string),
        end_date: end.map(str::to_string),
        description: None,
        resource: Some(RecordRef::named("Ada Lovelace")),
        project: None,
    }
}

enum MockResponse {
    Ready(CalendarResult<Vec<AssignmentRecord>>),
    Gated(oneshot::Receiver<CalendarResult<Vec<AssignmentRecord>>>),
}

/// Mock assignment service that records every request
#[derive(Default)]
pub struct MockAssignmentService {
    calls: Mutex<Vec<FetchParams>>,
    responses: Mutex<VecDeque<MockResponse>>,
    fallback: Mutex<Vec<AssignmentRecord>>,
}

impl MockAssignmentService {
    /// Respond with `records` whenever no queued response is left
    pub fn returning(records: Vec<AssignmentRecord>) -> Self {
        let service = Self::default();
        *service.fallback.lock().unwrap() = records;
        service
    }

    /// Queue a response for the next request
    pub fn push_response(&self, response: CalendarResult<Vec<AssignmentRecord>>) {
        self.responses.lock().unwrap().push_back(MockResponse::Ready(response));
    }

    /// Queue a response that is only delivered once the returned sender fires
    pub fn push_gated(&self) -> oneshot::Sender<CalendarResult<Vec<AssignmentRecord>>> {
        let (tx, rx) = oneshot::channel();
        self.responses.lock().unwrap().push_back(MockResponse::Gated(rx));
        tx
    }

    pub fn calls(&self) -> Vec<FetchParams> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AssignmentService for MockAssignmentService {
    async fn fetch_assignments(&self, params: &FetchParams) -> CalendarResult<Vec<AssignmentRecord>> {
        self.calls.lock().unwrap().push(params.clone());
        let next = self.responses.lock().unwrap().pop_front();

        match next {
            Some(MockResponse::Ready(response)) => response,
            Some(MockResponse::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(service_error("gate dropped"))),
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }
}

/// Mock picklist service backed by a map of field name to values
#[derive(Default)]
pub struct MockPicklistService {
    values: HashMap<String, Vec<String>>,
}

impl MockPicklistService {
    pub fn with_field(mut self, field_name: &str, values: &[&str]) -> Self {
        self.values.insert(
            field_name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl PicklistService for MockPicklistService {
    async fn picklist_values(&self, object_name: &str, field_name: &str) -> CalendarResult<Vec<String>> {
        self.values
            .get(field_name)
            .cloned()
            .ok_or_else(|| picklist_error(&format!("No such field {}.{}", object_name, field_name)))
    }
}

/// Mock asset loader; can fail one asset or hold the batch until released
#[derive(Default)]
pub struct MockAssetLoader {
    loaded: Mutex<Vec<String>>,
    fail_on: Option<String>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MockAssetLoader {
    pub fn failing_on(path: &str) -> Self {
        Self {
            fail_on: Some(path.to_string()),
            ..Default::default()
        }
    }

    /// Loader whose batch stays pending until the sender fires
    pub fn gated() -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let loader = Self {
            gate: Mutex::new(Some(rx)),
            ..Default::default()
        };
        (loader, tx)
    }

    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    async fn load(&self, url: &str) -> CalendarResult<()> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail_on.as_deref().is_some_and(|f| url.ends_with(f)) {
            return Err(asset_error(&format!("404 for {}", url)));
        }
        self.loaded.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[async_trait]
impl AssetLoader for MockAssetLoader {
    async fn load_script(&self, url: &str) -> CalendarResult<()> {
        self.load(url).await
    }

    async fn load_style(&self, url: &str) -> CalendarResult<()> {
        self.load(url).await
    }
}

#[derive(Default)]
struct RendererLog {
    next_id: u64,
    inits: usize,
    destroys: usize,
    live: HashMap<u64, (String, WidgetCallbacks)>,
    last_events: usize,
}

/// Renderer that tracks live widgets and lets tests click on them
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<RendererLog>>,
}

impl RecordingRenderer {
    pub fn inits(&self) -> usize {
        self.log.lock().unwrap().inits
    }

    pub fn destroys(&self) -> usize {
        self.log.lock().unwrap().destroys
    }

    /// Number of events handed to the most recent widget
    pub fn last_event_count(&self) -> usize {
        self.log.lock().unwrap().last_events
    }

    /// Live widgets bound to `container`
    pub fn live_on(&self, container: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .live
            .values()
            .filter(|(c, _)| c == container)
            .count()
    }

    /// Click an event on every live widget of `container`; returns how many
    /// handlers fired
    pub fn click_event(&self, container: &str, event_id: &str) -> usize {
        let callbacks = self.callbacks_on(container);
        for cb in &callbacks {
            cb.event_click(event_id);
        }
        callbacks.len()
    }

    /// Click an empty day on every live widget of `container`
    pub fn click_day(&self, container: &str, date: NaiveDate) -> usize {
        let callbacks = self.callbacks_on(container);
        for cb in &callbacks {
            cb.day_click(date);
        }
        callbacks.len()
    }

    fn callbacks_on(&self, container: &str) -> Vec<WidgetCallbacks> {
        self.log
            .lock()
            .unwrap()
            .live
            .values()
            .filter(|(c, _)| c == container)
            .map(|(_, cb)| cb.clone())
            .collect()
    }
}

struct RecordingHandle {
    id: u64,
    container: String,
    log: Arc<Mutex<RendererLog>>,
}

impl WidgetHandle for RecordingHandle {
    fn container(&self) -> &str {
        &self.container
    }

    fn destroy(self: Box<Self>) {
        let mut log = self.log.lock().unwrap();
        log.live.remove(&self.id);
        log.destroys += 1;
    }
}

impl CalendarRenderer for RecordingRenderer {
    fn init(&self, container: &str, config: WidgetConfig) -> CalendarResult<Box<dyn WidgetHandle>> {
        let mut log = self.log.lock().unwrap();
        log.next_id += 1;
        log.inits += 1;
        log.last_events = config.events.len();
        let id = log.next_id;
        log.live.insert(id, (container.to_string(), config.callbacks.clone()));

        Ok(Box::new(RecordingHandle {
            id,
            container: container.to_string(),
            log: Arc::clone(&self.log),
        }))
    }
}

pub const CONTAINER: &str = "fullcalendarjs";

/// Settings for a calendar on the test page
pub fn settings(host: HostInputs) -> CalendarSettings {
    CalendarSettings {
        container: CONTAINER.to_string(),
        host,
        asset_base_url: "https://cdn.example.com/FullCalendarJS".to_string(),
        assets: default_assets(),
        sub_category_field: PicklistField::new("pse__Assignment__c", "Sub_Category__c"),
        role_field: PicklistField::new("pse__Assignment__c", "pse__Role__c"),
    }
}

/// Everything a test needs to drive and observe one calendar
pub struct Harness {
    pub handle: AssignmentCalendarHandle,
    pub service: Arc<MockAssignmentService>,
    pub loader: Arc<MockAssetLoader>,
    pub renderer: RecordingRenderer,
}

impl Harness {
    pub fn new(host: HostInputs, service: MockAssignmentService, loader: MockAssetLoader) -> Self {
        Self::with_picklists(host, service, loader, MockPicklistService::default())
    }

    pub fn with_picklists(
        host: HostInputs,
        service: MockAssignmentService,
        loader: MockAssetLoader,
        picklists: MockPicklistService,
    ) -> Self {
        let service = Arc::new(service);
        let loader = Arc::new(loader);
        let renderer = RecordingRenderer::default();

        let services = CalendarServices {
            assignments: service.clone(),
            picklists: Arc::new(picklists),
            assets: loader.clone(),
            renderer: Arc::new(renderer.clone()),
        };

        Self {
            handle: AssignmentCalendarHandle::new(settings(host), services),
            service,
            loader,
            renderer,
        }
    }

    /// Poll the calendar until `predicate` holds
    pub async fn wait_for(&self, predicate: impl Fn(&CalendarView) -> bool) -> CalendarView {
        for _ in 0..200 {
            let view = self.handle.snapshot().await.unwrap();
            if predicate(&view) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("calendar never reached the expected state");
    }

    /// Wait until the service has received `count` requests
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..200 {
            if self.service.call_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("service never received {} requests", count);
    }

    /// Render-ready plus the initial fetch
    pub async fn ready(&self) -> CalendarView {
        self.handle.render_ready().await.unwrap();
        self.wait_for(|v| v.rendered_request == 1).await
    }
}
