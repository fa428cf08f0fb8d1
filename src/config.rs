// src/config.rs
// One immutable configuration value built at process start and passed
// explicitly into the resolver, fetchers and orchestrator. Defaults match
// production; a TOML file can override individual knobs.
//
// Lookup order: $CAPITOL_CONFIG_PATH, then config/pipeline.toml, then
// built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

const ENV_PATH: &str = "CAPITOL_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";

pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;
/// Hard cap so we don't hammer the upstream feeds.
pub const DEFAULT_VOTE_CAP_PER_CHAMBER: usize = 200;
pub const DEFAULT_STATE_PATH: &str = "data/master_state.json";
pub const GOVTRACK_BASE: &str = "https://www.govtrack.us/api/v2";
pub const USER_AGENT: &str = "CapitolLeague/1.0 (+https://example.com)";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub lookback_days: i64,
    pub vote_cap_per_chamber: usize,
    /// Start of the `full` backfill window.
    pub historical_start: NaiveDate,
    pub state_path: PathBuf,
    /// Timeout for official-feed page/XML requests.
    pub official_timeout_secs: u64,
    /// Timeout for the fallback aggregator request.
    pub fallback_timeout_secs: u64,
    pub govtrack_base: String,
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            vote_cap_per_chamber: DEFAULT_VOTE_CAP_PER_CHAMBER,
            historical_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            official_timeout_secs: 30,
            fallback_timeout_secs: 20,
            govtrack_base: GOVTRACK_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// TOML overlay; every field optional so partial files work.
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    lookback_days: Option<i64>,
    vote_cap_per_chamber: Option<usize>,
    historical_start: Option<String>,
    state_path: Option<PathBuf>,
    official_timeout_secs: Option<u64>,
    fallback_timeout_secs: Option<u64>,
    govtrack_base: Option<String>,
    user_agent: Option<String>,
}

impl PipelineConfig {
    /// Load using env var + fallback path; defaults when neither exists.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let ov: FileOverrides = toml::from_str(&content)
            .with_context(|| format!("parsing pipeline config {}", path.display()))?;

        let mut cfg = Self::default();
        if let Some(v) = ov.lookback_days {
            cfg.lookback_days = v;
        }
        if let Some(v) = ov.vote_cap_per_chamber {
            cfg.vote_cap_per_chamber = v;
        }
        if let Some(s) = ov.historical_start {
            cfg.historical_start = NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .with_context(|| format!("historical_start {s:?} is not YYYY-MM-DD"))?;
        }
        if let Some(v) = ov.state_path {
            cfg.state_path = v;
        }
        if let Some(v) = ov.official_timeout_secs {
            cfg.official_timeout_secs = v;
        }
        if let Some(v) = ov.fallback_timeout_secs {
            cfg.fallback_timeout_secs = v;
        }
        if let Some(v) = ov.govtrack_base {
            cfg.govtrack_base = v;
        }
        if let Some(v) = ov.user_agent {
            cfg.user_agent = v;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn partial_toml_overlays_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("pipeline.toml");
        fs::write(
            &p,
            r#"
vote_cap_per_chamber = 50
historical_start = "2021-06-01"
"#,
        )
        .unwrap();

        let cfg = PipelineConfig::load_from(&p).unwrap();
        assert_eq!(cfg.vote_cap_per_chamber, 50);
        assert_eq!(
            cfg.historical_start,
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
        );
        // Untouched knobs keep their defaults.
        assert_eq!(cfg.lookback_days, DEFAULT_LOOKBACK_DAYS);
        assert_eq!(cfg.state_path, PathBuf::from(DEFAULT_STATE_PATH));
    }

    #[test]
    fn bad_historical_start_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("pipeline.toml");
        fs::write(&p, r#"historical_start = "June 2021""#).unwrap();
        assert!(PipelineConfig::load_from(&p).is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_path_takes_precedence() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("cfg.toml");
        fs::write(&p, "lookback_days = 14").unwrap();

        env::set_var(ENV_PATH, p.display().to_string());
        let cfg = PipelineConfig::load_default().unwrap();
        assert_eq!(cfg.lookback_days, 14);
        env::remove_var(ENV_PATH);
    }

    #[serial_test::serial]
    #[test]
    fn dangling_env_path_is_an_error() {
        env::set_var(ENV_PATH, "/definitely/not/here.toml");
        assert!(PipelineConfig::load_default().is_err());
        env::remove_var(ENV_PATH);
    }
}
