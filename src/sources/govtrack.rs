// src/sources/govtrack.rs
// Fallback aggregator: one GovTrack API request per chamber, normalized
// defensively since the provider's field names vary by endpoint vintage.
//
// Unlike the official fetchers this source propagates transport errors;
// the orchestrator catches them and records the failed attempt.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::model::{Chamber, DateWindow, SourceRef, VoteRecord};
use crate::sources::{SourceDescriptor, VoteSource};
use crate::trust::rank_source_domain;

const GOVTRACK_DOMAIN: &str = "govtrack.us";
const GOVTRACK_HOME: &str = "https://www.govtrack.us/";

pub struct GovTrackSource {
    chamber: Chamber,
    mode: Mode,
}

enum Mode {
    Http {
        client: reqwest::Client,
        base: String,
    },
    /// Canned response body, for tests.
    Fixture(String),
}

impl GovTrackSource {
    pub fn over_http(chamber: Chamber, base: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("building GovTrack client")?;
        Ok(Self {
            chamber,
            mode: Mode::Http {
                client,
                base: base.to_string(),
            },
        })
    }

    pub fn from_fixture(chamber: Chamber, body: impl Into<String>) -> Self {
        Self {
            chamber,
            mode: Mode::Fixture(body.into()),
        }
    }

    fn normalize(&self, data: &Value, window: DateWindow, cap: usize) -> Vec<VoteRecord> {
        let objects = data
            .get("objects")
            .or_else(|| data.get("results"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut normalized: Vec<VoteRecord> = Vec::with_capacity(objects.len());
        for obj in &objects {
            // created is an ISO timestamp like "2025-11-12T17:42:00".
            let created = str_field(obj, &["created", "voted_at"]);

            // Respect the date window only when the timestamp parses.
            if let Some(day) = created.as_deref().and_then(created_day) {
                if !window.contains(day) {
                    continue;
                }
            }

            let source_url = str_field(obj, &["link", "url"])
                .unwrap_or_else(|| GOVTRACK_HOME.to_string());

            let mut vote = VoteRecord::bare(parse_chamber(obj, self.chamber));
            vote.id = id_field(obj);
            vote.created = created;
            vote.question = str_field(obj, &["question"]);
            vote.description = str_field(obj, &["description", "question"]);
            vote.result = str_field(obj, &["result", "vote_type"]);
            vote.sources = vec![SourceRef {
                domain: GOVTRACK_DOMAIN.to_string(),
                url: source_url.clone(),
                rank: rank_source_domain(&source_url),
            }];
            normalized.push(vote);
        }

        // Newest first by created timestamp for determinism.
        normalized.sort_by(|a, b| {
            b.created
                .as_deref()
                .unwrap_or("")
                .cmp(a.created.as_deref().unwrap_or(""))
        });
        normalized.truncate(cap);
        normalized
    }
}

/// First present-and-string value among the candidate keys.
fn str_field(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_str())
        .map(String::from)
}

/// Provider ids come back numeric; keep them as strings in our namespace.
fn id_field(obj: &Value) -> Option<String> {
    match obj.get("id") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn parse_chamber(obj: &Value, requested: Chamber) -> Chamber {
    match obj.get("chamber").and_then(Value::as_str) {
        Some("house") => Chamber::House,
        Some("senate") => Chamber::Senate,
        _ => requested,
    }
}

fn created_day(created: &str) -> Option<NaiveDate> {
    let day = created.trim_end_matches('Z');
    let day = day.get(..10).unwrap_or(day);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[async_trait]
impl VoteSource for GovTrackSource {
    fn descriptor(&self) -> SourceDescriptor {
        let base = match &self.mode {
            Mode::Http { base, .. } => base.clone(),
            Mode::Fixture(_) => crate::config::GOVTRACK_BASE.to_string(),
        };
        SourceDescriptor {
            key: format!("govtrack.{}", self.chamber),
            name: format!("GovTrack.us ({})", self.chamber),
            domain: GOVTRACK_DOMAIN.to_string(),
            url: format!("{base}/vote"),
            priority: 60,
        }
    }

    async fn fetch(&self, window: DateWindow, cap: usize) -> Result<Vec<VoteRecord>> {
        let data: Value = match &self.mode {
            Mode::Http { client, base } => {
                let url = format!("{base}/vote");
                let resp = client
                    .get(&url)
                    .query(&[
                        ("chamber", self.chamber.as_str()),
                        ("order_by", "-created"),
                        ("limit", &cap.to_string()),
                    ])
                    .send()
                    .await
                    .with_context(|| format!("GovTrack GET {url}"))?;

                let status = resp.status();
                if !status.is_success() {
                    bail!("GovTrack votes failed: {status}");
                }
                resp.json().await.context("decoding GovTrack response")?
            }
            Mode::Fixture(body) => {
                serde_json::from_str(body).context("decoding GovTrack fixture")?
            }
        };

        let votes = self.normalize(&data, window, cap);
        debug!(chamber = %self.chamber, count = votes.len(), "GovTrack fetch done");
        Ok(votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        )
    }

    const BODY: &str = r#"{
      "objects": [
        {
          "id": 90210,
          "chamber": "house",
          "created": "2025-01-12T17:42:00",
          "question": "On the Motion to Recommit",
          "result": "Failed",
          "link": "https://www.govtrack.us/congress/votes/119-2025/h12"
        },
        {
          "id": 90211,
          "created": "2024-12-30T10:00:00",
          "description": "Outside the window",
          "result": "Passed"
        },
        {
          "id": "gt-90212",
          "created": "not a timestamp",
          "vote_type": "cloture"
        }
      ]
    }"#;

    #[tokio::test]
    async fn normalizes_and_window_filters() {
        let src = GovTrackSource::from_fixture(Chamber::House, BODY);
        let out = src.fetch(window(), 200).await.unwrap();

        // The December record parsed and fell outside the window; the
        // unparseable timestamp is kept.
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id.as_deref(), Some("90210"));
        assert_eq!(out[0].question.as_deref(), Some("On the Motion to Recommit"));
        assert_eq!(out[0].description.as_deref(), Some("On the Motion to Recommit"));
        assert_eq!(out[0].sources[0].rank, 40);
        assert_eq!(out[0].sources[0].domain, "govtrack.us");

        assert_eq!(out[1].id.as_deref(), Some("gt-90212"));
        assert_eq!(out[1].result.as_deref(), Some("cloture"));
        assert_eq!(
            out[1].sources[0].url,
            "https://www.govtrack.us/"
        );
    }

    #[tokio::test]
    async fn sorted_descending_and_capped() {
        let body = r#"{"results": [
            {"id": 1, "created": "2025-01-05T00:00:00"},
            {"id": 2, "created": "2025-01-20T00:00:00"},
            {"id": 3, "created": "2025-01-10T00:00:00"}
        ]}"#;
        let src = GovTrackSource::from_fixture(Chamber::Senate, body);
        let out = src.fetch(window(), 2).await.unwrap();
        let ids: Vec<_> = out.iter().filter_map(|v| v.id.as_deref()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(out[0].chamber, Chamber::Senate);
    }

    #[tokio::test]
    async fn garbage_fixture_is_an_error() {
        let src = GovTrackSource::from_fixture(Chamber::House, "also not json");
        assert!(src.fetch(window(), 10).await.is_err());
    }

    #[test]
    fn descriptor_keys_are_per_chamber() {
        let src = GovTrackSource::from_fixture(Chamber::Senate, "{}");
        let d = src.descriptor();
        assert_eq!(d.key, "govtrack.senate");
        assert_eq!(d.priority, 60);
    }
}
