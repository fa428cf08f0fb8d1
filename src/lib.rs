// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod merge;
pub mod mode;
pub mod model;
pub mod pipeline;
pub mod sources;
pub mod state;
pub mod status;
pub mod trust;

// ---- Re-exports for stable public API ----
pub use crate::config::PipelineConfig;
pub use crate::merge::merge_votes;
pub use crate::mode::{resolve_window, Mode};
pub use crate::model::{Chamber, DateWindow, MasterState, VoteRecord};
pub use crate::state::StateStore;
pub use crate::trust::rank_source_domain;
