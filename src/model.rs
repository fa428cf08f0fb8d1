// src/model.rs
// Canonical record shapes shared by the fetchers, the merge engine and the
// persisted snapshot. Field names serialize as camelCase so the JSON
// document matches what the site and graph builders already consume.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::status::SourceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    pub const BOTH: [Chamber; 2] = [Chamber::House, Chamber::Senate];

    /// Lowercase name as used in URLs, status keys and the snapshot.
    pub fn as_str(self) -> &'static str {
        match self {
            Chamber::House => "house",
            Chamber::Senate => "senate",
        }
    }

    /// Single-letter prefix used when composing official vote ids.
    pub fn letter(self) -> char {
        match self {
            Chamber::House => 'H',
            Chamber::Senate => 'S',
        }
    }
}

impl std::fmt::Display for Chamber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive [from, to] date range a fetch or merge operation is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.from <= d && d <= self.to
    }

    /// Calendar years intersecting the window, oldest first.
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        use chrono::Datelike;
        self.from.year()..=self.to.year()
    }
}

/// Provenance entry: where a record came from and how much we trust it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub domain: String,
    pub url: String,
    pub rank: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRef {
    pub code: Option<String>,
    pub raw_legislation_number: Option<String>,
    pub official_site_url: Option<String>,
}

/// Overall yea/nay/present/not-voting tallies. Missing feed fields are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTotals {
    pub yea: i64,
    pub nay: i64,
    pub present: i64,
    pub not_voting: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyTotals {
    pub party: String,
    pub yea: i64,
    pub nay: i64,
    pub present: i64,
    pub not_voting: i64,
}

/// One roll-call vote in the normalized shape every source maps into.
///
/// `id` is the merge identity key: `H-<congress>-<session>-<roll>` for
/// official House records, provider-defined for fallback records, `None`
/// when the feed was missing a component (such records do not merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub id: Option<String>,
    pub chamber: Chamber,
    #[serde(default)]
    pub congress: Option<i64>,
    #[serde(default)]
    pub session: Option<i64>,
    #[serde(default)]
    pub roll_number: Option<i64>,
    /// ISO date or date-time of the vote action (official sources).
    #[serde(default)]
    pub date: Option<String>,
    /// Provider creation timestamp (fallback sources). Preferred merge
    /// sort key when present.
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub bill: Option<BillRef>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vote_type: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub totals: VoteTotals,
    #[serde(default)]
    pub totals_by_party: Vec<PartyTotals>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

impl VoteRecord {
    /// Empty shell for one chamber; fetchers fill in what they parsed.
    pub fn bare(chamber: Chamber) -> Self {
        Self {
            id: None,
            chamber,
            congress: None,
            session: None,
            roll_number: None,
            date: None,
            created: None,
            bill: None,
            question: None,
            description: None,
            vote_type: None,
            result: None,
            totals: VoteTotals::default(),
            totals_by_party: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Best-effort recency key: creation timestamp, else action date.
    pub fn sort_key(&self) -> &str {
        self.created
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub lookback_days: i64,
    pub vote_cap_per_chamber: usize,
}

/// Per-chamber snapshot section. `from_date`/`to_date` always reflect the
/// last attempted window, even when every source failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamberVotes {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub count: usize,
    #[serde(default)]
    pub votes: Vec<VoteRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChamberMap {
    #[serde(default)]
    pub house: ChamberVotes,
    #[serde(default)]
    pub senate: ChamberVotes,
}

impl ChamberMap {
    pub fn section(&self, chamber: Chamber) -> &ChamberVotes {
        match chamber {
            Chamber::House => &self.house,
            Chamber::Senate => &self.senate,
        }
    }

    pub fn section_mut(&mut self, chamber: Chamber) -> &mut ChamberVotes {
        match chamber {
            Chamber::House => &mut self.house,
            Chamber::Senate => &mut self.senate,
        }
    }
}

/// Per-source diagnostics, keyed by source key (e.g. "house.clerk").
/// BTreeMap keeps the persisted document stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMeta {
    #[serde(default)]
    pub votes: BTreeMap<String, SourceStatus>,
}

/// Root aggregate persisted to `master_state.json`. `league` and `cards`
/// belong to other tooling; we carry them through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterState {
    pub generated_at: String,
    pub params: Params,
    pub votes: ChamberMap,
    #[serde(default)]
    pub source_meta: SourceMeta,
    #[serde(default)]
    pub league: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub cards: serde_json::Map<String, serde_json::Value>,
}
