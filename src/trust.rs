// src/trust.rs
// Coarse domain trust scoring: .gov outranks .edu outranks .org outranks
// everything else. Used to tag provenance entries so later tooling can mix
// records from sources of different credibility.

use url::Url;

/// Score a source URL by its host suffix. Never fails; malformed or
/// host-less URLs score 0.
pub fn rank_source_domain(raw: &str) -> u32 {
    let host = match Url::parse(raw) {
        Ok(u) => u.host_str().map(|h| h.to_ascii_lowercase()),
        Err(_) => None,
    };
    let host = host.unwrap_or_default();

    if host.ends_with(".gov") {
        100
    } else if host.ends_with(".edu") {
        80
    } else if host.ends_with(".org") {
        60
    } else if !host.is_empty() {
        40
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gov_edu_org_other_ladder() {
        assert_eq!(rank_source_domain("https://clerk.house.gov/x"), 100);
        assert_eq!(rank_source_domain("https://foo.edu"), 80);
        assert_eq!(rank_source_domain("https://foo.org"), 60);
        assert_eq!(rank_source_domain("https://foo.io"), 40);
    }

    #[test]
    fn malformed_and_empty_score_zero() {
        assert_eq!(rank_source_domain("not a url"), 0);
        assert_eq!(rank_source_domain(""), 0);
        // Parses but carries no host.
        assert_eq!(rank_source_domain("file:///tmp/x"), 0);
    }

    #[test]
    fn host_case_is_ignored() {
        assert_eq!(rank_source_domain("https://WWW.GovTrack.US/api"), 40);
        assert_eq!(rank_source_domain("https://Clerk.House.GOV/evs/"), 100);
    }
}
