//! Record query endpoint.

use serde::Deserialize;
use serde_json::Value;
use sky_core::{FilterPredicate, Record};
use tracing::warn;

use crate::{
    ClientError, SkyClient,
    http::{check_response, decode},
};

#[derive(Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    sightings: Option<Vec<Value>>,
}

impl SkyClient {
    /// Full URL for a record query with `predicate`.
    #[must_use]
    pub fn records_url(&self, predicate: &FilterPredicate) -> String {
        let base = self.config.endpoint(&self.config.records_path);
        let query = predicate.to_query_string();
        if query.is_empty() {
            format!("{base}?format=simple")
        } else {
            format!("{base}?format=simple&{query}")
        }
    }

    /// Run the record query.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success status,
    /// or an unparseable body.
    pub async fn query_records(&self, predicate: &FilterPredicate) -> Result<Vec<Record>, ClientError> {
        let url = self.records_url(predicate);
        let resp = check_response(self.get(&url).send().await?).await?;
        let body = resp.text().await?;
        parse_records(&body)
    }
}

/// Decode a `{ "sightings": [...] }` body. A missing or `null` list is empty.
/// Entries that do not decode as a [`Record`] (no id, say) are logged and
/// skipped; the rest of the batch is kept.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] when the body is not a JSON object or
/// `sightings` is not a list.
pub fn parse_records(body: &str) -> Result<Vec<Record>, ClientError> {
    let data: RecordsResponse = decode(body)?;
    let entries = data.sightings.unwrap_or_default();
    let total = entries.len();
    let records: Vec<Record> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "skipping undecodable record");
                None
            }
        })
        .collect();
    if records.len() < total {
        warn!(kept = records.len(), total, "some records were skipped");
    }
    Ok(records)
}
