// src/sources/house_clerk.rs
// Official House roll-call fetcher against the Clerk's XML feeds.
//
// Discovery is a three-level crawl: the year index page links to
// ROLL_<start>.asp range pages, each range page links to individual rolls
// via a `rollnumber=` query parameter, and each roll has a fixed-template
// XML document. Any single page or document failing is a skip, never an
// error for the whole fetch.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{BillRef, Chamber, DateWindow, PartyTotals, SourceRef, VoteRecord, VoteTotals};
use crate::sources::{PageFetcher, SourceDescriptor, VoteSource};
use crate::trust::rank_source_domain;

const INDEX_BASE: &str = "https://clerk.house.gov/evs";

fn index_url(year: i32) -> String {
    format!("{INDEX_BASE}/{year}/index.asp")
}

fn range_url(year: i32, start: u32) -> String {
    format!("{INDEX_BASE}/{year}/ROLL_{start}.asp")
}

fn roll_xml_url(year: i32, roll: u32) -> String {
    format!("{INDEX_BASE}/{year}/roll{roll:03}.xml")
}

// Range pages are linked as ROLL_000.asp, ROLL_100.asp, ...
static RE_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"ROLL_(\d+)\.asp").unwrap());
// Individual rolls show up as href query params; &amp;-encoding around them
// varies, so match just the parameter itself.
static RE_ROLL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)rollnumber=(\d+)").unwrap());

// ---------------------------------------------------------------------------
// Clerk rollcall XML schema (the subset we consume)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RollcallVoteXml {
    #[serde(rename = "vote-metadata")]
    metadata: Option<VoteMetadataXml>,
}

#[derive(Debug, Deserialize)]
struct VoteMetadataXml {
    congress: Option<String>,
    session: Option<String>,
    #[serde(rename = "rollcall-num")]
    rollcall_num: Option<String>,
    #[serde(rename = "legis-num")]
    legis_num: Option<String>,
    #[serde(rename = "vote-question")]
    vote_question: Option<String>,
    #[serde(rename = "vote-type")]
    vote_type: Option<String>,
    #[serde(rename = "vote-result")]
    vote_result: Option<String>,
    #[serde(rename = "action-date")]
    action_date: Option<String>,
    #[serde(rename = "action-time")]
    action_time: Option<ActionTimeXml>,
    #[serde(rename = "vote-desc")]
    vote_desc: Option<String>,
    #[serde(rename = "vote-totals")]
    vote_totals: Option<VoteTotalsXml>,
}

// action-time carries a time-etz attribute we don't need; keep the text.
#[derive(Debug, Deserialize)]
struct ActionTimeXml {
    #[serde(rename = "$text")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoteTotalsXml {
    #[serde(rename = "totals-by-party", default)]
    by_party: Vec<PartyTotalsXml>,
    #[serde(rename = "totals-by-vote")]
    overall: Option<OverallTotalsXml>,
}

#[derive(Debug, Deserialize)]
struct OverallTotalsXml {
    #[serde(rename = "yea-total")]
    yea: Option<String>,
    #[serde(rename = "nay-total")]
    nay: Option<String>,
    #[serde(rename = "present-total")]
    present: Option<String>,
    #[serde(rename = "not-voting-total")]
    not_voting: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PartyTotalsXml {
    party: Option<String>,
    #[serde(rename = "yea-total")]
    yea: Option<String>,
    #[serde(rename = "nay-total")]
    nay: Option<String>,
    #[serde(rename = "present-total")]
    present: Option<String>,
    #[serde(rename = "not-voting-total")]
    not_voting: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Missing or non-numeric count fields default to 0.
fn count(field: &Option<String>) -> i64 {
    field
        .as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

fn int_field(field: &Option<String>) -> Option<i64> {
    field.as_deref().and_then(|s| s.trim().parse::<i64>().ok())
}

/// The session element reads "1st"/"2nd"; take the leading digits.
fn leading_int(field: &Option<String>) -> Option<i64> {
    let s = field.as_deref()?.trim();
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Derive a bill code and, when the legislation number matches a known
/// bill-type pattern, the canonical congress.gov bill page URL.
/// Unrecognized patterns leave the URL empty rather than failing.
fn derive_bill(legis_num: &str, congress: Option<i64>) -> BillRef {
    let parts: Vec<&str> = legis_num.split_whitespace().collect();
    let mut bill = BillRef {
        code: None,
        raw_legislation_number: Some(legis_num.to_string()),
        official_site_url: None,
    };
    if parts.len() < 2 {
        return bill;
    }

    let chamber_abbrev = parts[0];
    let bill_type = parts[1];
    let number = parts[parts.len() - 1];
    bill.code = Some(parts.join(" "));

    let (Some(congress), Ok(number)) = (congress, number.parse::<i64>()) else {
        return bill;
    };

    let slug = if chamber_abbrev == "H" && bill_type == "R" {
        Some("house-bill")
    } else if chamber_abbrev == "S" && bill_type == "R" {
        Some("senate-bill")
    } else if chamber_abbrev == "H" && bill_type.starts_with("RES") {
        Some("house-resolution")
    } else if chamber_abbrev == "S" && bill_type.starts_with("RES") {
        Some("senate-resolution")
    } else if chamber_abbrev == "H" && bill_type == "J" {
        Some("house-joint-resolution")
    } else if chamber_abbrev == "S" && bill_type == "J" {
        Some("senate-joint-resolution")
    } else {
        None
    };

    if let Some(slug) = slug {
        bill.official_site_url = Some(format!(
            "https://www.congress.gov/bill/{congress}th-congress/{slug}/{number}"
        ));
    }
    bill
}

/// Parse one Clerk rollcall XML document into the normalized shape.
/// Malformed XML or a missing metadata block is a per-item skip (None).
pub fn parse_house_vote_xml(xml_text: &str, xml_url: &str) -> Option<VoteRecord> {
    let doc: RollcallVoteXml = match from_str(xml_text) {
        Ok(d) => d,
        Err(e) => {
            warn!(url = %xml_url, error = %e, "rollcall XML parse error");
            return None;
        }
    };
    let Some(md) = doc.metadata else {
        warn!(url = %xml_url, "rollcall XML has no vote-metadata");
        return None;
    };

    let congress = int_field(&md.congress);
    let session = leading_int(&md.session);
    let roll = int_field(&md.rollcall_num);

    let mut vote = VoteRecord::bare(Chamber::House);
    vote.congress = congress;
    vote.session = session;
    vote.roll_number = roll;
    vote.question = md.vote_question.clone();
    vote.description = md.vote_desc.clone();
    vote.vote_type = md.vote_type.clone();
    vote.result = md.vote_result.clone();

    if let (Some(c), Some(s), Some(r)) = (congress, session, roll) {
        vote.id = Some(format!("{}-{c}-{s}-{r}", Chamber::House.letter()));
    }

    if let Some(date) = md.action_date.as_deref() {
        let time = md
            .action_time
            .as_ref()
            .and_then(|t| t.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("00:00:00");
        vote.date = Some(format!("{date}T{time}"));
    }

    if let Some(totals) = &md.vote_totals {
        if let Some(overall) = &totals.overall {
            vote.totals = VoteTotals {
                yea: count(&overall.yea),
                nay: count(&overall.nay),
                present: count(&overall.present),
                not_voting: count(&overall.not_voting),
            };
        }
        vote.totals_by_party = totals
            .by_party
            .iter()
            .map(|pt| PartyTotals {
                party: pt.party.clone().unwrap_or_else(|| "Unknown".to_string()),
                yea: count(&pt.yea),
                nay: count(&pt.nay),
                present: count(&pt.present),
                not_voting: count(&pt.not_voting),
            })
            .collect();
    }

    if let Some(legis_num) = md.legis_num.as_deref() {
        vote.bill = Some(derive_bill(legis_num, congress));
    }

    vote.sources = vec![SourceRef {
        domain: "clerk.house.gov".to_string(),
        url: xml_url.to_string(),
        rank: rank_source_domain(xml_url),
    }];

    Some(vote)
}

fn day_prefix(date: &str) -> Option<NaiveDate> {
    let day = date.split('T').next().unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Newest first by (date string, roll number); lexical comparison is fine
/// for zero-padded ISO dates.
fn sort_newest_first(votes: &mut [VoteRecord]) {
    votes.sort_by(|a, b| {
        let ka = (a.date.as_deref().unwrap_or(""), a.roll_number.unwrap_or(0));
        let kb = (b.date.as_deref().unwrap_or(""), b.roll_number.unwrap_or(0));
        kb.cmp(&ka)
    });
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

pub struct HouseClerkSource {
    fetcher: Arc<dyn PageFetcher>,
}

impl HouseClerkSource {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl VoteSource for HouseClerkSource {
    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            key: "house.clerk".to_string(),
            name: "Clerk of the House (XML)".to_string(),
            domain: "clerk.house.gov".to_string(),
            url: format!("{INDEX_BASE}/"),
            priority: 120,
        }
    }

    async fn fetch(&self, window: DateWindow, cap: usize) -> Result<Vec<VoteRecord>> {
        let mut results: Vec<VoteRecord> = Vec::new();

        for year in window.years() {
            let index_url = index_url(year);
            let Some(index_html) = self.fetcher.get_text(&index_url).await else {
                warn!(year, url = %index_url, "no index page; skipping year");
                continue;
            };

            let mut range_starts: BTreeSet<u32> = RE_RANGE
                .captures_iter(&index_html)
                .filter_map(|c| c[1].parse().ok())
                .collect();
            if range_starts.is_empty() {
                debug!(year, "no ROLL_*.asp links in index; assuming single range at 1");
                range_starts.insert(1);
            }

            let mut seen_rolls: HashSet<u32> = HashSet::new();

            // Highest range first to bias toward the most recent votes.
            for &start in range_starts.iter().rev() {
                let url = range_url(year, start);
                let Some(range_html) = self.fetcher.get_text(&url).await else {
                    warn!(year, start, url = %url, "no roll range page; skipping");
                    continue;
                };

                let rolls: Vec<u32> = RE_ROLL
                    .captures_iter(&range_html)
                    .filter_map(|c| c[1].parse().ok())
                    .collect();
                if rolls.is_empty() {
                    debug!(year, start, "no rollnumber links in range page");
                    continue;
                }

                for roll in rolls {
                    if !seen_rolls.insert(roll) {
                        continue;
                    }

                    let xml_url = roll_xml_url(year, roll);
                    let Some(xml_text) = self.fetcher.get_text(&xml_url).await else {
                        debug!(year, roll, "no XML for roll; skipping");
                        continue;
                    };
                    let Some(vote) = parse_house_vote_xml(&xml_text, &xml_url) else {
                        continue;
                    };

                    // Window filter is best-effort: unparseable dates pass.
                    if let Some(day) = vote.date.as_deref().and_then(day_prefix) {
                        if !window.contains(day) {
                            continue;
                        }
                    }

                    results.push(vote);
                    if results.len() >= cap {
                        debug!(cap, "reached vote cap; stopping House fetch");
                        sort_newest_first(&mut results);
                        return Ok(results);
                    }
                }
            }
        }

        debug!(count = results.len(), "finished House fetch");
        sort_newest_first(&mut results);
        Ok(results)
    }
}
