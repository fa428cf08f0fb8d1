// src/status.rs
// Per-source diagnostic record. Updated via a pure transition so the
// snapshot in `sourceMeta` only ever holds the latest complete state;
// nothing mutates individual fields in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Diagnostics for one (source, chamber) pair. `priority` is static
/// documentation of the intended ordering (official 120, fallback 60);
/// actual attempt order is fixed by the orchestrator, not by this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub name: String,
    pub domain: String,
    pub url: String,
    pub priority: u32,
    #[serde(default)]
    pub last_attempt: Option<String>,
    #[serde(default)]
    pub last_status: Option<String>,
    #[serde(default)]
    pub last_success: Option<String>,
}

impl SourceStatus {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        url: impl Into<String>,
        priority: u32,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            url: url.into(),
            priority,
            last_attempt: None,
            last_status: None,
            last_success: None,
        }
    }

    /// Transition after one fetch attempt. `success` tracks "yielded at
    /// least one record", not "no transport error": an empty non-error
    /// result is status "ok" with `success = false`. Note this makes
    /// "source down" and "window genuinely empty" indistinguishable in
    /// `last_success`; that ambiguity is inherited from the feed contract.
    #[must_use]
    pub fn after_attempt(
        mut self,
        status: impl Into<String>,
        success: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let stamp = now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        self.last_attempt = Some(stamp.clone());
        self.last_status = Some(status.into());
        if success {
            self.last_success = Some(stamp);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn successful_attempt_stamps_all_three_fields() {
        let s = SourceStatus::new("Clerk", "clerk.house.gov", "https://clerk.house.gov/evs/", 120);
        let s = s.after_attempt("ok", true, t0());
        assert_eq!(s.last_status.as_deref(), Some("ok"));
        assert_eq!(s.last_attempt, s.last_success);
    }

    #[test]
    fn failed_attempt_leaves_last_success_untouched() {
        let s = SourceStatus::new("GovTrack.us (house)", "govtrack.us", "https://x", 60);
        let s = s.after_attempt("ok", true, t0());
        let prev_success = s.last_success.clone();

        let later = t0() + chrono::Duration::hours(1);
        let s = s.after_attempt("error: timeout", false, later);
        assert_eq!(s.last_status.as_deref(), Some("error: timeout"));
        assert_eq!(s.last_success, prev_success);
        assert_ne!(s.last_attempt, s.last_success);
    }

    #[test]
    fn empty_result_is_ok_but_not_success() {
        let s = SourceStatus::new("Senate LIS (XML)", "senate.gov", "https://x", 120);
        let s = s.after_attempt("ok", false, t0());
        assert_eq!(s.last_status.as_deref(), Some("ok"));
        assert!(s.last_success.is_none());
    }
}
