//! Research endpoints: quick analysis, full report, and service status.

use serde::{Deserialize, Serialize};
use sky_core::{RecordId, ResearchResult, SourceCitation};

use crate::{
    ClientError, SkyClient,
    http::{check_response, decode, read_json},
};

#[derive(Deserialize)]
struct QuickResponse {
    quick_analysis: String,
}

#[derive(Deserialize)]
struct FullResponse {
    research_report: String,
    #[serde(default)]
    citations: Option<Vec<SourceCitation>>,
}

/// Availability report from the research service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchStatus {
    /// `available`, `unavailable`, or `error`.
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl ResearchStatus {
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == "available"
    }
}

impl SkyClient {
    /// URL for a per-record research call under `prefix`.
    fn research_url(&self, prefix: &str, record_id: &RecordId) -> String {
        format!(
            "{}/{}",
            self.config.endpoint(prefix).trim_end_matches('/'),
            urlencoding::encode(record_id.as_str())
        )
    }

    /// Fetch the quick analysis for a record.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success status,
    /// or a body without `quick_analysis`.
    pub async fn quick_research(&self, record_id: &RecordId) -> Result<ResearchResult, ClientError> {
        let url = self.research_url(&self.config.quick_research_path, record_id);
        let resp = check_response(self.get(&url).send().await?).await?;
        let body = resp.text().await?;
        tracing::debug!(%record_id, bytes = body.len(), "quick research received");
        parse_quick(&body)
    }

    /// Fetch the full research report for a record.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success status,
    /// or a body without `research_report`.
    pub async fn full_research(&self, record_id: &RecordId) -> Result<ResearchResult, ClientError> {
        let url = self.research_url(&self.config.full_research_path, record_id);
        let resp = check_response(self.get(&url).send().await?).await?;
        let body = resp.text().await?;
        tracing::debug!(%record_id, bytes = body.len(), "full research received");
        parse_full(&body)
    }

    /// Probe the research service.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success status,
    /// or an unparseable body.
    pub async fn research_status(&self) -> Result<ResearchStatus, ClientError> {
        let url = self.config.endpoint(&self.config.research_status_path);
        let resp = check_response(self.get(&url).send().await?).await?;
        read_json(resp).await
    }
}

/// Decode a `{ "quick_analysis": "..." }` body.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] when the field is missing.
pub fn parse_quick(body: &str) -> Result<ResearchResult, ClientError> {
    let data: QuickResponse = decode(body)?;
    Ok(ResearchResult::Quick {
        narrative: data.quick_analysis,
    })
}

/// Decode a `{ "research_report": "...", "citations": [...] }` body.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] when `research_report` is missing.
pub fn parse_full(body: &str) -> Result<ResearchResult, ClientError> {
    let data: FullResponse = decode(body)?;
    Ok(ResearchResult::Full {
        narrative: data.research_report,
        citations: data.citations.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sky_config::ApiConfig;
    use sky_core::ResearchTier;

    #[test]
    fn parses_quick_payload() {
        let result = parse_quick(
            r#"{"sighting_id": 42, "quick_analysis": "**Credibility**: 6/10", "analysis_type": "quick"}"#,
        )
        .unwrap();
        assert_eq!(result.tier(), ResearchTier::Quick);
        assert_eq!(result.narrative(), "**Credibility**: 6/10");
    }

    #[test]
    fn parses_full_payload_with_and_without_citations() {
        let with = parse_full(
            r#"{"research_report": "report", "citations": [{"title": "NWS", "url": "https://weather.gov/abq"}]}"#,
        )
        .unwrap();
        assert_eq!(with.citations().len(), 1);
        assert_eq!(with.citations()[0].url, "https://weather.gov/abq");

        let without = parse_full(r#"{"research_report": "report"}"#).unwrap();
        assert!(without.citations().is_empty());

        let null = parse_full(r#"{"research_report": "report", "citations": null}"#).unwrap();
        assert!(null.citations().is_empty());
    }

    #[test]
    fn missing_narrative_is_a_parse_error() {
        assert!(matches!(parse_quick("{}"), Err(ClientError::Parse(_))));
        assert!(matches!(
            parse_full(r#"{"citations": []}"#),
            Err(ClientError::Parse(_))
        ));
    }

    #[test]
    fn research_urls_append_encoded_id() {
        let client = SkyClient::new(&ApiConfig::default()).unwrap();
        assert_eq!(
            client.research_url("/v1/research/quick", &RecordId::from(42)),
            "http://localhost:8000/v1/research/quick/42"
        );
        assert_eq!(
            client.research_url("/v1/research/sighting/", &RecordId::from("a b")),
            "http://localhost:8000/v1/research/sighting/a%20b"
        );
    }

    #[test]
    fn status_payload() {
        let status: ResearchStatus = serde_json::from_str(
            r#"{"status": "available", "message": "ok", "features": ["Quick sighting analysis"]}"#,
        )
        .unwrap();
        assert!(status.is_available());
        assert_eq!(status.features.len(), 1);
        assert_eq!(status.model, None);
    }
}
