use super::models::{AssignmentRecord, FetchParams};
use crate::error::{picklist_error, service_error, CalendarResult, Error};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use url::Url;

/// Source of assignment records. The service decides what the caller may see.
#[async_trait]
pub trait AssignmentService: Send + Sync {
    /// Fetch assignments matching `params`; `None` fields are unconstrained
    async fn fetch_assignments(&self, params: &FetchParams) -> CalendarResult<Vec<AssignmentRecord>>;
}

/// Lookup of valid values for a picklist field
#[async_trait]
pub trait PicklistService: Send + Sync {
    /// Ordered values for `field_name` on `object_name`
    async fn picklist_values(&self, object_name: &str, field_name: &str) -> CalendarResult<Vec<String>>;
}

/// HTTP client for the assignment and picklist endpoints
#[derive(Clone)]
pub struct HttpCalendarService {
    base_url: Url,
    token: Option<String>,
    client: Client,
}

impl HttpCalendarService {
    pub fn new(base_url: &str, token: Option<String>) -> CalendarResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid service URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Service URL '{}' cannot be a base", base_url)));
        }

        Ok(Self {
            base_url,
            token,
            client: Client::new(),
        })
    }

    /// Build `{base}/{endpoint}?{pairs}`
    pub fn endpoint_url(&self, endpoint: &str, pairs: &[(&str, &str)]) -> CalendarResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Service URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push(endpoint);

        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }
}

/// Turn a non-success response into an error message with status and body
async fn check_status(response: Response) -> Result<Response, String> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());
    Err(format!("HTTP {} - {}", status, error_body))
}

#[async_trait]
impl AssignmentService for HttpCalendarService {
    async fn fetch_assignments(&self, params: &FetchParams) -> CalendarResult<Vec<AssignmentRecord>> {
        let url = self.endpoint_url("assignments", &params.query_pairs())?;
        debug!(%url, "Fetching assignments");

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| service_error(&format!("Failed to fetch assignments: {}", e)))?;

        let response = check_status(response)
            .await
            .map_err(|e| service_error(&format!("Failed to fetch assignments: {}", e)))?;

        response
            .json::<Vec<AssignmentRecord>>()
            .await
            .map_err(|e| service_error(&format!("Failed to parse assignments response: {}", e)))
    }
}

#[async_trait]
impl PicklistService for HttpCalendarService {
    async fn picklist_values(&self, object_name: &str, field_name: &str) -> CalendarResult<Vec<String>> {
        let url = self.endpoint_url(
            "picklist",
            &[("objectName", object_name), ("fieldName", field_name)],
        )?;

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| picklist_error(&format!("Failed to fetch {}.{}: {}", object_name, field_name, e)))?;

        let response = check_status(response)
            .await
            .map_err(|e| picklist_error(&format!("Failed to fetch {}.{}: {}", object_name, field_name, e)))?;

        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| picklist_error(&format!("Failed to parse picklist response: {}", e)))
    }
}
