// src/merge.rs
// Merge/reconciliation of existing + freshly fetched vote records.
//
// Contract: dedup by id with incoming applied last (so incoming wins on
// collision; no field-level merge), sort newest-first by the best-effort
// recency key, trim to the per-chamber cap. Idempotent.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::VoteRecord;

/// Records without an `id` cannot be keyed and are dropped from both the
/// existing and incoming sides; the count is logged so silent loss shows
/// up in diagnostics.
pub fn merge_votes(existing: &[VoteRecord], incoming: &[VoteRecord], cap: usize) -> Vec<VoteRecord> {
    let mut by_id: BTreeMap<String, VoteRecord> = BTreeMap::new();
    let mut unkeyed = 0usize;

    for v in existing.iter().chain(incoming.iter()) {
        match &v.id {
            Some(id) => {
                by_id.insert(id.clone(), v.clone());
            }
            None => unkeyed += 1,
        }
    }

    if unkeyed > 0 {
        debug!(dropped = unkeyed, "dropped unkeyable vote records in merge");
    }

    let mut merged: Vec<VoteRecord> = by_id.into_values().collect();
    merged.sort_by(|a, b| b.sort_key().cmp(a.sort_key()));
    merged.truncate(cap);
    merged
}
