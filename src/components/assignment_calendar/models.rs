use crate::error::{CalendarResult, Error};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Named reference to a related record (resource or project)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecordRef {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

impl RecordRef {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }
}

/// Assignment record as returned by the assignment service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AssignmentRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "pse__Start_Date__c", default)]
    pub start_date: Option<String>,
    #[serde(rename = "pse__End_Date__c", default)]
    pub end_date: Option<String>,
    #[serde(rename = "Description__c", default)]
    pub description: Option<String>,
    #[serde(rename = "pse__Resource__r", default)]
    pub resource: Option<RecordRef>,
    #[serde(rename = "pse__Project__r", default)]
    pub project: Option<RecordRef>,
}

/// Null-safe read of a reference's display name; any missing link yields ""
pub fn display_name(reference: Option<&RecordRef>) -> String {
    reference
        .and_then(|r| r.name.as_deref())
        .unwrap_or("")
        .to_string()
}

/// Extra data carried on each event, not interpreted by the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventExtension {
    /// Inclusive start date from the record
    pub original_start: String,
    /// Inclusive end date from the record
    pub original_end: String,
    pub resource_name: String,
    pub project_name: String,
}

/// All-day event handed to the calendar widget.
///
/// `end` is exclusive: it is always at least one day after `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub all_day: bool,
    pub description: String,
    pub extended_props: EventExtension,
}

/// Read-only projection shown in the event detail panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: String,
    pub resource_name: String,
    pub project_name: String,
}

impl From<&CalendarEvent> for SelectedEvent {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            start: event.start.clone(),
            end: event.end.clone(),
            description: event.description.clone(),
            resource_name: event.extended_props.resource_name.clone(),
            project_name: event.extended_props.project_name.clone(),
        }
    }
}

/// Filter dimensions the page can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    Resource,
    Region,
    Practice,
    Group,
    ReportsTo,
    SubCategory,
    Role,
}

impl FilterKey {
    pub const ALL: [FilterKey; 7] = [
        FilterKey::Resource,
        FilterKey::Region,
        FilterKey::Practice,
        FilterKey::Group,
        FilterKey::ReportsTo,
        FilterKey::SubCategory,
        FilterKey::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Resource => "resource",
            FilterKey::Region => "region",
            FilterKey::Practice => "practice",
            FilterKey::Group => "group",
            FilterKey::ReportsTo => "reports_to",
            FilterKey::SubCategory => "sub_category",
            FilterKey::Role => "role",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        FilterKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| Error::Config(format!("Unknown filter key: {}", s)))
    }
}

/// What a filter input currently holds: the value sent to the service
/// and the label the input displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub value: String,
    pub label: String,
}

/// Current filter selections.
///
/// Only visible dimensions can ever hold a value; a dimension without an
/// entry is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    visible: BTreeSet<FilterKey>,
    selections: BTreeMap<FilterKey, FilterSelection>,
}

impl FilterState {
    pub fn new(visible: BTreeSet<FilterKey>) -> Self {
        Self {
            visible,
            selections: BTreeMap::new(),
        }
    }

    pub fn is_visible(&self, key: FilterKey) -> bool {
        self.visible.contains(&key)
    }

    /// Record a selection for one dimension. An empty value clears it.
    pub fn set(
        &mut self,
        key: FilterKey,
        value: Option<String>,
        label: Option<String>,
    ) -> CalendarResult<()> {
        if !self.is_visible(key) {
            return Err(Error::FilterHidden(key.to_string()));
        }

        match value.filter(|v| !v.trim().is_empty()) {
            Some(value) => {
                let label = label.unwrap_or_else(|| value.clone());
                self.selections.insert(key, FilterSelection { value, label });
            }
            None => {
                self.selections.remove(&key);
            }
        }
        Ok(())
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.selections.get(&key).map(|s| s.value.as_str())
    }

    /// Label currently displayed by the input for `key` ("" when cleared)
    pub fn label(&self, key: FilterKey) -> &str {
        self.selections
            .get(&key)
            .map(|s| s.label.as_str())
            .unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.selections.iter().map(|(k, s)| (*k, s.value.as_str()))
    }

    /// Build fetch parameters; hidden dimensions are never sent
    pub fn to_params(&self, project_name: Option<&str>) -> FetchParams {
        let value = |key: FilterKey| -> Option<String> {
            if self.is_visible(key) {
                self.get(key).map(str::to_string)
            } else {
                None
            }
        };

        FetchParams {
            project_name: project_name
                .filter(|p| !p.trim().is_empty())
                .map(str::to_string),
            resource_id: value(FilterKey::Resource),
            region_id: value(FilterKey::Region),
            practice_id: value(FilterKey::Practice),
            group_id: value(FilterKey::Group),
            reports_to_id: value(FilterKey::ReportsTo),
            sub_category: value(FilterKey::SubCategory),
            role: value(FilterKey::Role),
        }
    }
}

/// Parameters sent to the assignment service; `None` means unconstrained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    pub project_name: Option<String>,
    pub resource_id: Option<String>,
    pub region_id: Option<String>,
    pub practice_id: Option<String>,
    pub group_id: Option<String>,
    pub reports_to_id: Option<String>,
    pub sub_category: Option<String>,
    pub role: Option<String>,
}

impl FetchParams {
    /// Non-null parameters as query pairs, in a stable order
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("projectName", &self.project_name),
            ("resourceId", &self.resource_id),
            ("regionId", &self.region_id),
            ("practiceId", &self.practice_id),
            ("groupId", &self.group_id),
            ("reportsToId", &self.reports_to_id),
            ("subCategory", &self.sub_category),
            ("role", &self.role),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    /// True when no filter dimension constrains the query
    pub fn is_unfiltered(&self) -> bool {
        self.query_pairs()
            .iter()
            .all(|(name, _)| *name == "projectName")
    }
}

/// Options for the picklist-backed filter dropdowns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct FilterOptions {
    pub sub_categories: Vec<String>,
    pub roles: Vec<String>,
}

/// Inputs set by the hosting page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInputs {
    pub project_name: Option<String>,
    pub visible_filters: BTreeSet<FilterKey>,
}

impl Default for HostInputs {
    fn default() -> Self {
        Self {
            project_name: None,
            visible_filters: FilterKey::ALL.into_iter().collect(),
        }
    }
}
