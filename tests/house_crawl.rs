// tests/house_crawl.rs
// Crawl-level behavior of the official House fetcher against canned
// Clerk pages: discovery via index + range pages, per-item skip on bad
// documents, window filtering and the cap short-circuit.

use std::sync::Arc;

use capitol_votes::model::DateWindow;
use capitol_votes::sources::house_clerk::HouseClerkSource;
use capitol_votes::sources::{StaticPages, VoteSource};
use chrono::NaiveDate;

const INDEX_HTML: &str = r#"<html><body>
  <a href="ROLL_1.asp">Roll Votes 1 - 99</a>
  <a href="ROLL_100.asp">Roll Votes 100 -</a>
</body></html>"#;

// 103 appears twice (dedup), 104 is outside the window, 50 has malformed
// XML, 999 has no XML document at all.
const RANGE_100_HTML: &str = r#"<html><body>
  <a href="index.asp?rollnumber=103&amp;year=2025">103</a>
  <a href="index.asp?rollnumber=103&amp;year=2025">103 again</a>
  <a href="index.asp?rollnumber=104&amp;year=2025">104</a>
  <a href="index.asp?ROLLNUMBER=50&amp;year=2025">50</a>
  <a href="index.asp?rollnumber=999&amp;year=2025">999</a>
</body></html>"#;

const RANGE_1_HTML: &str = r#"<html><body>
  <a href="index.asp?rollnumber=23&amp;year=2025">23</a>
</body></html>"#;

fn evs(path: &str) -> String {
    format!("https://clerk.house.gov/evs/2025/{path}")
}

fn pages() -> StaticPages {
    StaticPages::new()
        .with(evs("index.asp"), INDEX_HTML)
        .with(evs("ROLL_100.asp"), RANGE_100_HTML)
        .with(evs("ROLL_1.asp"), RANGE_1_HTML)
        .with(evs("roll023.xml"), include_str!("fixtures/roll023.xml"))
        .with(evs("roll103.xml"), include_str!("fixtures/roll103.xml"))
        .with(evs("roll104.xml"), include_str!("fixtures/roll104.xml"))
        .with(evs("roll050.xml"), "<rollcall-vote><oops")
}

fn window() -> DateWindow {
    DateWindow::new(
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
    )
}

#[tokio::test]
async fn crawl_discovers_filters_and_sorts() {
    let src = HouseClerkSource::new(Arc::new(pages()));
    let votes = src.fetch(window(), 200).await.unwrap();

    // Roll 104 (2025-01-12) is outside the window; 103 sits exactly on the
    // boundary and is included. Bad/missing documents are skipped quietly.
    let ids: Vec<_> = votes.iter().filter_map(|v| v.id.as_deref()).collect();
    assert_eq!(ids, vec!["H-119-1-103", "H-119-1-23"]);

    assert_eq!(votes[0].date.as_deref(), Some("2025-01-10T09:15:00"));
    assert_eq!(votes[0].totals.yea, 230);
    assert_eq!(
        votes[0].bill.as_ref().unwrap().official_site_url.as_deref(),
        Some("https://www.congress.gov/bill/119th-congress/senate-joint-resolution/9")
    );
    assert_eq!(votes[1].totals_by_party.len(), 2);
    assert_eq!(votes[1].sources[0].url, evs("roll023.xml"));
    assert_eq!(votes[1].sources[0].rank, 100);
}

#[tokio::test]
async fn cap_short_circuits_the_crawl() {
    let src = HouseClerkSource::new(Arc::new(pages()));
    let votes = src.fetch(window(), 1).await.unwrap();

    // Ranges are walked highest-start first, so the cap keeps roll 103 and
    // the range-1 page is never needed.
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].id.as_deref(), Some("H-119-1-103"));
}

#[tokio::test]
async fn missing_index_yields_empty_ok() {
    let src = HouseClerkSource::new(Arc::new(StaticPages::new()));
    let votes = src.fetch(window(), 200).await.unwrap();
    assert!(votes.is_empty());
}

#[tokio::test]
async fn index_without_range_links_assumes_default_range() {
    let pages = StaticPages::new()
        .with(evs("index.asp"), "<html>no links here</html>")
        .with(evs("ROLL_1.asp"), RANGE_1_HTML)
        .with(evs("roll023.xml"), include_str!("fixtures/roll023.xml"));

    let src = HouseClerkSource::new(Arc::new(pages));
    let votes = src.fetch(window(), 200).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].id.as_deref(), Some("H-119-1-23"));
}

#[tokio::test]
async fn window_spanning_years_visits_both_indexes() {
    // Only the 2025 index exists; the missing 2024 one is skipped, not fatal.
    let src = HouseClerkSource::new(Arc::new(pages()));
    let w = DateWindow::new(
        NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
    );
    let votes = src.fetch(w, 200).await.unwrap();
    assert_eq!(votes.len(), 2);
}
