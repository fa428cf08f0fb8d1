// src/sources/senate_lis.rs
// Official Senate fetcher against the LIS roll-call feeds.
//
// Deliberately stubbed: it reports zero records until the LIS XML crawl is
// wired up, and the orchestrator treats that as an ordinary empty result,
// not a failure. The URL templates below are the entry points the future
// implementation will use.
// TODO: parse vote_menu_{congress}_{session}.xml and the per-vote XML the
// same way house_clerk parses the Clerk documents.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::model::{DateWindow, VoteRecord};
use crate::sources::{SourceDescriptor, VoteSource};

pub const SENATE_MENU_URL: &str =
    "https://www.senate.gov/legislative/LIS/roll_call_lists/vote_menu_{congress}_{session}.xml";
pub const SENATE_VOTE_XML_URL: &str = "https://www.senate.gov/legislative/LIS/roll_call_votes/vote{congress}{session}/vote_{congress}_{session}_{roll:05}.xml";

#[derive(Default)]
pub struct SenateLisSource;

impl SenateLisSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VoteSource for SenateLisSource {
    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            key: "senate.lis".to_string(),
            name: "Senate LIS (XML)".to_string(),
            domain: "senate.gov".to_string(),
            url: "https://www.senate.gov/legislative/".to_string(),
            priority: 120,
        }
    }

    async fn fetch(&self, _window: DateWindow, _cap: usize) -> Result<Vec<VoteRecord>> {
        info!("Senate LIS fetch is stubbed; returning no records");
        Ok(Vec::new())
    }
}
