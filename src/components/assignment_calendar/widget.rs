use super::models::CalendarEvent;
use super::time::{format_calendar_date, parse_calendar_date};
use crate::error::{widget_error, CalendarResult};
use chrono::NaiveDate;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Header/navigation layout of the calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            left: "prev,next today".to_string(),
            center: "title".to_string(),
            right: "month,basicWeek,basicDay,listWeek".to_string(),
        }
    }
}

type EventClickFn = dyn Fn(&str) + Send + Sync;
type DayClickFn = dyn Fn(NaiveDate) + Send + Sync;

/// Hooks the widget calls on user interaction
#[derive(Clone)]
pub struct WidgetCallbacks {
    on_event_click: Arc<EventClickFn>,
    on_day_click: Arc<DayClickFn>,
}

impl WidgetCallbacks {
    pub fn new(
        on_event_click: impl Fn(&str) + Send + Sync + 'static,
        on_day_click: impl Fn(NaiveDate) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_event_click: Arc::new(on_event_click),
            on_day_click: Arc::new(on_day_click),
        }
    }

    /// A rendered event with `event_id` was clicked
    pub fn event_click(&self, event_id: &str) {
        (self.on_event_click)(event_id)
    }

    /// An empty day was clicked
    pub fn day_click(&self, date: NaiveDate) {
        (self.on_day_click)(date)
    }
}

impl fmt::Debug for WidgetCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetCallbacks").finish_non_exhaustive()
    }
}

/// Everything the widget needs to draw one event set
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub header: HeaderOptions,
    pub default_date: NaiveDate,
    pub nav_links: bool,
    pub editable: bool,
    pub event_limit: bool,
    pub events: Vec<CalendarEvent>,
    pub callbacks: WidgetCallbacks,
}

impl WidgetConfig {
    pub fn new(default_date: NaiveDate, events: Vec<CalendarEvent>, callbacks: WidgetCallbacks) -> Self {
        Self {
            header: HeaderOptions::default(),
            default_date,
            nav_links: true,
            editable: false,
            event_limit: true,
            events,
            callbacks,
        }
    }
}

/// The calendar library: creates a widget bound to a container
pub trait CalendarRenderer: Send + Sync {
    fn init(&self, container: &str, config: WidgetConfig) -> CalendarResult<Box<dyn WidgetHandle>>;
}

/// A live widget instance. Must be destroyed before another is created
/// on the same container.
pub trait WidgetHandle: Send {
    fn container(&self) -> &str;

    /// Release the widget and its event listeners
    fn destroy(self: Box<Self>);
}

/// Renders the event set as a plain-text agenda
pub struct AgendaRenderer {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl AgendaRenderer {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

/// Text agenda for `config`, one line per event ordered by start date
pub fn render_agenda(container: &str, config: &WidgetConfig) -> String {
    let mut events: Vec<&CalendarEvent> = config.events.iter().collect();
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));

    let mut text = format!(
        "== {} | {} events | around {} ==\n",
        container,
        events.len(),
        format_calendar_date(config.default_date)
    );

    for event in events {
        // The widget end is exclusive, show the last day instead
        let last_day = parse_calendar_date(&event.end)
            .and_then(|d| d.pred_opt())
            .map(format_calendar_date)
            .unwrap_or_else(|| event.end.clone());

        let mut line = if last_day == event.start {
            format!("{}         {}", event.start, event.title)
        } else {
            format!(
                "{}..{}  {}",
                event.start,
                last_day.get(5..).unwrap_or(&last_day),
                event.title
            )
        };

        let props = &event.extended_props;
        match (props.resource_name.is_empty(), props.project_name.is_empty()) {
            (false, false) => line.push_str(&format!(" [{} / {}]", props.resource_name, props.project_name)),
            (false, true) => line.push_str(&format!(" [{}]", props.resource_name)),
            (true, false) => line.push_str(&format!(" [{}]", props.project_name)),
            (true, true) => {}
        }
        text.push_str(&line);
        text.push('\n');
    }

    text
}

impl CalendarRenderer for AgendaRenderer {
    fn init(&self, container: &str, config: WidgetConfig) -> CalendarResult<Box<dyn WidgetHandle>> {
        let text = render_agenda(container, &config);
        let mut out = self
            .out
            .lock()
            .map_err(|_| widget_error("Agenda output lock poisoned"))?;
        out.write_all(text.as_bytes())?;
        out.flush()?;

        info!(container, events = config.events.len(), "Agenda rendered");
        Ok(Box::new(AgendaHandle {
            container: container.to_string(),
        }))
    }
}

struct AgendaHandle {
    container: String,
}

impl WidgetHandle for AgendaHandle {
    fn container(&self) -> &str {
        &self.container
    }

    fn destroy(self: Box<Self>) {
        debug!(container = %self.container, "Agenda destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::assignment_calendar::models::EventExtension;

    fn event(id: &str, start: &str, end: &str, resource: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: format!("Task {}", id),
            start: start.to_string(),
            end: end.to_string(),
            all_day: true,
            description: String::new(),
            extended_props: EventExtension {
                resource_name: resource.to_string(),
                ..Default::default()
            },
        }
    }

    fn config(events: Vec<CalendarEvent>) -> WidgetConfig {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        WidgetConfig::new(today, events, WidgetCallbacks::new(|_| {}, |_| {}))
    }

    #[test]
    fn default_config_matches_calendar_layout() {
        let config = config(Vec::new());
        assert_eq!(config.header.left, "prev,next today");
        assert_eq!(config.header.right, "month,basicWeek,basicDay,listWeek");
        assert!(config.nav_links);
        assert!(!config.editable);
        assert!(config.event_limit);
    }

    #[test]
    fn agenda_lists_events_by_start() {
        let text = render_agenda(
            "cal",
            &config(vec![
                event("b", "2024-05-12", "2024-05-15", ""),
                event("a", "2024-05-10", "2024-05-11", "Ada"),
            ]),
        );

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== cal | 2 events | around 2024-05-01 ==");
        assert!(lines[1].starts_with("2024-05-10 "));
        assert!(lines[1].ends_with("Task a [Ada]"));
        assert!(lines[2].starts_with("2024-05-12..05-14"));
    }

    #[test]
    fn callbacks_forward_clicks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callbacks = WidgetCallbacks::new(move |id| sink.lock().unwrap().push(id.to_string()), |_| {});

        callbacks.event_click("a1");
        callbacks.clone().event_click("a2");
        assert_eq!(*seen.lock().unwrap(), vec!["a1", "a2"]);
    }

    #[test]
    fn agenda_renderer_writes_output() {
        #[derive(Clone, Default)]
        struct Shared(Arc<Mutex<Vec<u8>>>);
        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Shared::default();
        let renderer = AgendaRenderer::new(Box::new(buffer.clone()));
        let handle = renderer
            .init("cal", config(vec![event("a", "2024-05-10", "2024-05-11", "")]))
            .unwrap();
        assert_eq!(handle.container(), "cal");
        handle.destroy();

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(written.contains("Task a"));
    }
}
