// src/state.rs
// Load/persist the master snapshot. Load never fails the run: a missing or
// corrupt document degrades to a fresh skeleton. Save is atomic
// (write-temp-then-rename) so a reader can never observe a half-written
// snapshot, even if the process dies mid-write.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::warn;

use crate::config::PipelineConfig;
use crate::model::{ChamberMap, MasterState, Params, SourceMeta};

/// Current UTC timestamp as a naive ISO string, matching the snapshot's
/// existing `generatedAt` format.
pub fn utc_now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Minimal valid document; league/cards get filled by other tooling.
    pub fn skeleton(cfg: &PipelineConfig) -> MasterState {
        MasterState {
            generated_at: utc_now_iso(),
            params: Params {
                lookback_days: cfg.lookback_days,
                vote_cap_per_chamber: cfg.vote_cap_per_chamber,
            },
            votes: ChamberMap::default(),
            source_meta: SourceMeta::default(),
            league: Default::default(),
            cards: Default::default(),
        }
    }

    /// Read the persisted snapshot, or initialize a skeleton when the file
    /// is absent or unparseable. Corrupt state must never abort the run.
    pub fn load(&self, cfg: &PipelineConfig) -> MasterState {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(state) => state,
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "snapshot is corrupt; starting from a skeleton"
                    );
                    Self::skeleton(cfg)
                }
            },
            Err(_) => Self::skeleton(cfg),
        }
    }

    /// Persist via temp file + rename in the same directory. The rename is
    /// the commit point; everything before it leaves the old file intact.
    pub fn save(&self, state: &MasterState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating snapshot dir {}", dir.display()))?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let body = serde_json::to_string_pretty(state).context("serializing master state")?;
        fs::write(&tmp, body)
            .with_context(|| format!("writing temp snapshot {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "renaming {} over {}",
                tmp.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}
