//! Region index endpoint.

use serde::Deserialize;
use sky_core::RegionSummary;

use crate::{
    ClientError, SkyClient,
    http::{check_response, decode},
};

#[derive(Deserialize)]
struct RegionsResponse {
    #[serde(default)]
    states: Option<Vec<RegionSummary>>,
}

impl SkyClient {
    /// Fetch per-region counts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success status,
    /// or an unparseable body.
    pub async fn query_regions(&self) -> Result<Vec<RegionSummary>, ClientError> {
        let url = self.config.endpoint(&self.config.regions_path);
        let resp = check_response(self.get(&url).send().await?).await?;
        let body = resp.text().await?;
        parse_regions(&body)
    }
}

/// Decode a `{ "states": [...] }` body.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] on malformed JSON.
pub fn parse_regions(body: &str) -> Result<Vec<RegionSummary>, ClientError> {
    let data: RegionsResponse = decode(body)?;
    Ok(data.states.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_states_envelope() {
        let regions = parse_regions(
            r#"{"states": [
                {"code": "NM", "name": "New Mexico", "count": 310},
                {"state": "AZ", "sighting_count": 512}
            ]}"#,
        )
        .unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].display_name(), "New Mexico");
        assert_eq!(regions[1].code, "AZ");
        assert_eq!(regions[1].count, 512);
    }

    #[test]
    fn missing_states_is_empty() {
        assert!(parse_regions("{}").unwrap().is_empty());
    }
}
