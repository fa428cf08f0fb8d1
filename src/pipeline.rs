// src/pipeline.rs
// Per-chamber update orchestration and the whole-run driver.
//
// Sources are attempted strictly in slice order (official first, fallback
// second). A source that throws or comes back empty never aborts the run;
// the one hard safety rule is that a chamber whose sources all failed
// keeps its existing vote list untouched.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::merge::merge_votes;
use crate::mode::{resolve_window, Mode};
use crate::model::{Chamber, DateWindow, MasterState};
use crate::sources::govtrack::GovTrackSource;
use crate::sources::house_clerk::HouseClerkSource;
use crate::sources::senate_lis::SenateLisSource;
use crate::sources::{HttpFetcher, VoteSource};
use crate::state::{utc_now_iso, StateStore};
use crate::status::SourceStatus;

/// One-time metrics registration so the series are self-describing when an
/// exporter picks them up (exposition lives in the serving layer).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Completed aggregation runs.");
        describe_counter!("votes_fetched_total", "Vote records fetched per source.");
        describe_counter!(
            "vote_source_errors_total",
            "Fetch attempts that raised an error."
        );
    });
}

/// Failed-attempt status text is trimmed so one giant upstream error body
/// can't bloat the snapshot.
const STATUS_TEXT_MAX: usize = 120;

fn error_status(e: &anyhow::Error) -> String {
    let mut msg = format!("error: {e:#}");
    if msg.len() > STATUS_TEXT_MAX {
        let mut cut = STATUS_TEXT_MAX;
        while !msg.is_char_boundary(cut) {
            cut -= 1;
        }
        msg.truncate(cut);
    }
    msg
}

/// Update one chamber's snapshot section from its prioritized sources.
///
/// `any_success` tracks "at least one source yielded at least one record".
/// When it stays false the existing vote list is preserved and only the
/// window dates advance, so an all-sources-down run never wipes data.
pub async fn update_votes_for_chamber(
    state: &mut MasterState,
    chamber: Chamber,
    window: DateWindow,
    sources: &[Box<dyn VoteSource>],
    cap: usize,
) {
    ensure_metrics_described();

    let mut new_votes = Vec::new();
    let mut any_success = false;

    for source in sources {
        let desc = source.descriptor();
        info!(chamber = %chamber, source = %desc.name, "fetching votes");

        let entry = state
            .source_meta
            .votes
            .entry(desc.key.clone())
            .or_insert_with(|| {
                SourceStatus::new(&desc.name, &desc.domain, &desc.url, desc.priority)
            });

        match source.fetch(window, cap).await {
            Ok(votes) => {
                let yielded = !votes.is_empty();
                if yielded {
                    any_success = true;
                }
                counter!("votes_fetched_total", "source" => desc.key.clone())
                    .increment(votes.len() as u64);
                *entry = entry.clone().after_attempt("ok", yielded, Utc::now());
                new_votes.extend(votes);
            }
            Err(e) => {
                warn!(chamber = %chamber, source = %desc.name, error = %e, "vote fetch failed");
                counter!("vote_source_errors_total", "source" => desc.key.clone()).increment(1);
                *entry = entry.clone().after_attempt(error_status(&e), false, Utc::now());
            }
        }
    }

    let section = state.votes.section_mut(chamber);
    section.from_date = Some(window.from.format("%Y-%m-%d").to_string());
    section.to_date = Some(window.to.format("%Y-%m-%d").to_string());

    if !any_success {
        warn!(
            chamber = %chamber,
            "all vote sources failed or were empty; preserving existing votes"
        );
        section.count = section.votes.len();
        return;
    }

    let merged = merge_votes(&section.votes, &new_votes, cap);
    section.count = merged.len();
    section.votes = merged;
}

/// Official-then-fallback source stack for one chamber.
fn build_sources(
    chamber: Chamber,
    fetcher: &Arc<HttpFetcher>,
    cfg: &PipelineConfig,
) -> Result<Vec<Box<dyn VoteSource>>> {
    let official: Box<dyn VoteSource> = match chamber {
        Chamber::House => Box::new(HouseClerkSource::new(fetcher.clone())),
        Chamber::Senate => Box::new(SenateLisSource::new()),
    };
    let fallback: Box<dyn VoteSource> = Box::new(GovTrackSource::over_http(
        chamber,
        &cfg.govtrack_base,
        cfg.fallback_timeout_secs,
    )?);
    Ok(vec![official, fallback])
}

/// Run the aggregation once: load (or initialize) the snapshot, refresh
/// both chambers for the resolved window, persist atomically. Partial
/// source failure is a normal completion.
pub async fn run(mode: Mode, cfg: &PipelineConfig) -> Result<()> {
    ensure_metrics_described();

    let store = StateStore::new(cfg.state_path.clone());
    let mut state = store.load(cfg);

    let today = Utc::now().date_naive();
    let window = resolve_window(mode, &state, today, cfg);

    info!(
        mode = mode.as_str(),
        from = %window.from,
        to = %window.to,
        "running vote aggregation"
    );
    info!("primary sources: Clerk (House XML), Senate LIS (XML)");
    info!(fallback = %format!("{}/vote", cfg.govtrack_base), "fallback source");

    state.generated_at = utc_now_iso();
    state.params.lookback_days = (window.to - window.from).num_days();
    state.params.vote_cap_per_chamber = cfg.vote_cap_per_chamber;

    let fetcher = Arc::new(HttpFetcher::new(cfg.official_timeout_secs, &cfg.user_agent)?);

    for chamber in Chamber::BOTH {
        let sources = build_sources(chamber, &fetcher, cfg)?;
        update_votes_for_chamber(&mut state, chamber, window, &sources, cfg.vote_cap_per_chamber)
            .await;
    }

    store.save(&state)?;
    counter!("pipeline_runs_total").increment(1);
    info!(path = %cfg.state_path.display(), "master state written");
    Ok(())
}
