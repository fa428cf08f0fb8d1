// src/mode.rs
// Invocation modes and date-window resolution.
//
//   live   : rolling [today - lookback, today] window (the default)
//   full   : historical backfill since the configured start date
//   update : resume from the last persisted window with a 2-day overlap

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::model::{DateWindow, MasterState};

/// Overlap subtracted from the last stored `toDate` in `update` mode so a
/// partially ingested day is re-fetched rather than skipped.
const UPDATE_OVERLAP_DAYS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    Full,
    Update,
}

impl Mode {
    /// Resolve from the optional positional argument. Unrecognized text
    /// falls back to `Live`.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("full") => Mode::Full,
            Some("update") => Mode::Update,
            _ => Mode::Live,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Full => "full",
            Mode::Update => "update",
        }
    }
}

/// Snapshot dates come in two flavours depending on who wrote them:
/// a full ISO date-time or a plain date.
fn parse_snapshot_date(raw: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// Compute the fetch window for this run. `update` reads the previously
/// persisted per-chamber `toDate` bounds; if neither parses it degrades to
/// the `live` window.
pub fn resolve_window(
    mode: Mode,
    state: &MasterState,
    today: NaiveDate,
    cfg: &PipelineConfig,
) -> DateWindow {
    match mode {
        Mode::Live => DateWindow::new(today - Duration::days(cfg.lookback_days), today),
        Mode::Full => DateWindow::new(cfg.historical_start, today),
        Mode::Update => {
            let last = [&state.votes.house.to_date, &state.votes.senate.to_date]
                .into_iter()
                .flatten()
                .filter_map(|s| parse_snapshot_date(s))
                .min();

            match last {
                Some(d) => DateWindow::new(d - Duration::days(UPDATE_OVERLAP_DAYS), today),
                None => {
                    debug!("no parseable prior toDate; update degrades to live window");
                    DateWindow::new(today - Duration::days(cfg.lookback_days), today)
                }
            }
        }
    }
}
