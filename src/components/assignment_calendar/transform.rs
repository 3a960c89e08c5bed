use super::models::{display_name, AssignmentRecord, CalendarEvent, EventExtension};
use super::time::{format_calendar_date, parse_calendar_date};
use tracing::{debug, warn};

/// Result of turning one fetch's records into events
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformOutcome {
    pub events: Vec<CalendarEvent>,
    /// Records left out because their start or end date could not be resolved
    pub dropped: usize,
}

/// Convert assignment records into all-day calendar events.
///
/// Pure function of its input. Records without a resolvable start or end
/// date are skipped and counted in `dropped`.
pub fn prepare_events(records: &[AssignmentRecord]) -> TransformOutcome {
    let events: Vec<CalendarEvent> = records.iter().filter_map(to_event).collect();
    let dropped = records.len() - events.len();

    if dropped > 0 {
        warn!(
            dropped,
            total = records.len(),
            "Dropped assignments without a usable start or end date"
        );
    }

    TransformOutcome { events, dropped }
}

/// Convert a single record, or `None` if it cannot be placed on the calendar
pub fn to_event(record: &AssignmentRecord) -> Option<CalendarEvent> {
    let start_str = record.start_date.as_deref()?.trim();
    let end_str = record.end_date.as_deref()?.trim();
    let start = parse_calendar_date(start_str)?;
    let end = parse_calendar_date(end_str)?;

    // An end before the start still renders as a single day
    let last_day = if end < start {
        debug!(id = %record.id, "Assignment ends before it starts, rendering start day only");
        start
    } else {
        end
    };
    let exclusive_end = format_calendar_date(last_day.succ_opt()?);

    Some(CalendarEvent {
        id: record.id.clone(),
        title: record.name.clone().unwrap_or_default(),
        start: start_str.to_string(),
        end: exclusive_end,
        all_day: true,
        description: record.description.clone().unwrap_or_default(),
        extended_props: EventExtension {
            original_start: start_str.to_string(),
            original_end: end_str.to_string(),
            resource_name: display_name(record.resource.as_ref()),
            project_name: display_name(record.project.as_ref()),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::assignment_calendar::models::RecordRef;

    fn record(id: &str, start: Option<&str>, end: Option<&str>) -> AssignmentRecord {
        AssignmentRecord {
            id: id.to_string(),
            name: Some(format!("Task {}", id)),
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn single_day_assignment() {
        let outcome = prepare_events(&[AssignmentRecord {
            id: "a1".to_string(),
            name: Some("Task A".to_string()),
            start_date: Some("2024-05-10".to_string()),
            end_date: Some("2024-05-10".to_string()),
            description: None,
            ..Default::default()
        }]);

        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.events.len(), 1);
        let event = &outcome.events[0];
        assert_eq!(event.id, "a1");
        assert_eq!(event.title, "Task A");
        assert_eq!(event.start, "2024-05-10");
        assert_eq!(event.end, "2024-05-11");
        assert!(event.all_day);
        assert_eq!(event.description, "");
        assert_eq!(event.extended_props.original_start, "2024-05-10");
        assert_eq!(event.extended_props.original_end, "2024-05-10");
    }

    #[test]
    fn single_day_across_boundaries() {
        let outcome = prepare_events(&[
            record("leap", Some("2024-02-29"), Some("2024-02-29")),
            record("nye", Some("2023-12-31"), Some("2023-12-31")),
        ]);
        assert_eq!(outcome.events[0].end, "2024-03-01");
        assert_eq!(outcome.events[1].end, "2024-01-01");
    }

    #[test]
    fn drops_records_without_dates() {
        let records = vec![
            record("ok", Some("2024-01-01"), Some("2024-01-03")),
            record("no-start", None, Some("2024-01-03")),
            record("no-end", Some("2024-01-01"), None),
            record("garbage", Some("soon"), Some("2024-01-03")),
            record("blank", Some(""), Some("")),
        ];

        let outcome = prepare_events(&records);
        assert_eq!(outcome.dropped, 4);
        assert_eq!(outcome.events.len(), records.len() - 4);
        assert_eq!(outcome.events[0].id, "ok");
        assert_eq!(outcome.events[0].end, "2024-01-04");
    }

    #[test]
    fn end_is_always_after_start() {
        let outcome = prepare_events(&[record("backwards", Some("2024-06-10"), Some("2024-06-01"))]);
        let event = &outcome.events[0];
        assert_eq!(event.start, "2024-06-10");
        assert_eq!(event.end, "2024-06-11");
        assert_eq!(event.extended_props.original_end, "2024-06-01");
    }

    #[test]
    fn reference_names_are_null_safe() {
        let mut with_refs = record("r", Some("2024-01-01"), Some("2024-01-01"));
        with_refs.resource = Some(RecordRef::named("Ada Lovelace"));
        with_refs.project = Some(RecordRef::default());
        with_refs.name = None;

        let outcome = prepare_events(&[with_refs]);
        let props = &outcome.events[0].extended_props;
        assert_eq!(props.resource_name, "Ada Lovelace");
        assert_eq!(props.project_name, "");
        assert_eq!(outcome.events[0].title, "");
    }

    #[test]
    fn transformation_is_repeatable() {
        let records = vec![
            record("a", Some("2024-03-30"), Some("2024-03-31")),
            record("b", None, None),
        ];
        assert_eq!(prepare_events(&records), prepare_events(&records));
    }
}
