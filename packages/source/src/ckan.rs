//! Paginated CKAN Datastore API fetcher.
//!
//! Fetches the current and historical incident partitions from the
//! Milwaukee open data portal's `datastore_search` endpoint, page by page,
//! until an empty page signals the end of the resource.

use serde_json::Value;

use crate::SourceError;

/// The Milwaukee open data portal's Datastore search endpoint.
pub const MILWAUKEE_DATASTORE_URL: &str =
    "https://data.milwaukee.gov/api/3/action/datastore_search";

/// CKAN resource ID of the current-year incident partition (WIBR).
pub const CURRENT_RESOURCE_ID: &str = "87843297-a6fa-46d4-ba5d-cb342fb2d3bb";

/// CKAN resource ID of the historical incident partition.
pub const HISTORICAL_RESOURCE_ID: &str = "395db729-a30a-4e53-ab66-faeb5e1899c8";

/// Default page size for pagination.
pub const DEFAULT_PAGE_SIZE: u64 = 5000;

/// Configuration for one CKAN fetch operation.
pub struct CkanConfig<'a> {
    /// Base API URL (up to `.../datastore_search`).
    pub api_url: &'a str,
    /// CKAN resource ID for the dataset.
    pub resource_id: &'a str,
    /// Label for log messages (e.g., `"current"`).
    pub label: &'a str,
    /// Page size for pagination.
    pub page_size: u64,
    /// Maximum total records to fetch; `None` fetches everything.
    pub limit: Option<u64>,
}

impl<'a> CkanConfig<'a> {
    /// Config for the Milwaukee current-partition resource.
    #[must_use]
    pub const fn current(limit: Option<u64>) -> Self {
        Self {
            api_url: MILWAUKEE_DATASTORE_URL,
            resource_id: CURRENT_RESOURCE_ID,
            label: "current",
            page_size: DEFAULT_PAGE_SIZE,
            limit,
        }
    }

    /// Config for the Milwaukee historical-partition resource.
    #[must_use]
    pub const fn historical(limit: Option<u64>) -> Self {
        Self {
            api_url: MILWAUKEE_DATASTORE_URL,
            resource_id: HISTORICAL_RESOURCE_ID,
            label: "historical",
            page_size: DEFAULT_PAGE_SIZE,
            limit,
        }
    }
}

/// Fetches all records from a CKAN Datastore endpoint with pagination,
/// preserving the resource's row order.
///
/// # Errors
///
/// Returns [`SourceError`] if an HTTP request or response decode fails.
pub async fn fetch_ckan(config: &CkanConfig<'_>) -> Result<Vec<Value>, SourceError> {
    let client = reqwest::Client::new();
    let mut all_records: Vec<Value> = Vec::new();
    let mut offset: u64 = 0;
    let fetch_limit = config.limit.unwrap_or(u64::MAX);

    loop {
        let remaining = fetch_limit.saturating_sub(offset);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(config.page_size);

        log::info!(
            "Fetching {} partition: offset={offset}, limit={page_limit}",
            config.label
        );

        let response = client
            .get(config.api_url)
            .query(&[
                ("resource_id", config.resource_id),
                ("limit", &page_limit.to_string()),
                ("offset", &offset.to_string()),
            ])
            .send()
            .await?;
        let body: Value = response.json().await?;

        let records = records_from_response(&body);
        let count = records.len() as u64;
        if count == 0 {
            break;
        }

        all_records.extend(records);
        offset += count;

        if count < page_limit {
            break;
        }
    }

    log::info!(
        "Downloaded {} {} partition records total",
        all_records.len(),
        config.label
    );

    Ok(all_records)
}

/// Extracts the record page from a `datastore_search` response body.
/// Missing or malformed `result.records` yields an empty page.
fn records_from_response(body: &Value) -> Vec<Value> {
    body.get("result")
        .and_then(|result| result.get("records"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
