//! Task Sources: Where snapshots come from.
//!
//! The resolver never reads anything itself; callers pull snapshots from a
//! `TaskSource` and classify them. Two sources exist: the local snapshot
//! store and the in-memory demo set.

use super::repo::TaskRepo;
use super::types::{Amount, CoarseStatus, Identity, RawTaskRecord, WEI_PER_TOKEN};
use anyhow::Result;
use std::collections::BTreeMap;

/// A reader of task snapshots keyed by id.
pub trait TaskSource {
    /// Enumerates every known task id.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn task_ids(&self) -> Result<Vec<u64>>;

    /// Fetches one snapshot, `None` if the id is unknown.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn fetch(&self, id: u64) -> Result<Option<RawTaskRecord>>;

    /// Fetches every snapshot in id order.
    ///
    /// # Errors
    /// Returns an error if any read fails.
    fn fetch_all(&self) -> Result<Vec<RawTaskRecord>> {
        let mut records = Vec::new();
        for id in self.task_ids()? {
            if let Some(record) = self.fetch(id)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Snapshots held in the local SQLite store.
pub struct RepoSource<'a> {
    repo: TaskRepo<'a>,
}

impl<'a> RepoSource<'a> {
    #[must_use]
    pub fn new(repo: TaskRepo<'a>) -> Self {
        Self { repo }
    }
}

impl TaskSource for RepoSource<'_> {
    fn task_ids(&self) -> Result<Vec<u64>> {
        self.repo.ids()
    }

    fn fetch(&self, id: u64) -> Result<Option<RawTaskRecord>> {
        self.repo.find_by_id(id)
    }

    fn fetch_all(&self) -> Result<Vec<RawTaskRecord>> {
        self.repo.get_all()
    }
}

/// In-memory snapshots, used for demos and tests.
#[derive(Debug, Default, Clone)]
pub struct MockSource {
    records: BTreeMap<u64, RawTaskRecord>,
}

const HOUR: i64 = 3600;
const DAY: i64 = 24 * HOUR;

pub const DEMO_ALICE: &str = "0xA11CE5c0A6f6b7d3E1cC0b2e4F5d8a9B0c1D2e3F";
pub const DEMO_BOB: &str = "0xB0B0c5A8e2d3F4a5B6c7D8e9F0a1B2c3D4e5F6a7";
pub const DEMO_CAROL: &str = "0xCA401e7D8c9B0a1F2e3D4c5B6a7F8e9D0c1B2a3E";

impl MockSource {
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = RawTaskRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Demo tasks with deadlines placed around `now`, one per UI status
    /// plus an expired task the contract has not yet marked failed.
    #[must_use]
    pub fn dummy(now: i64) -> Self {
        let task = |id: u64, creator: &str, description: &str, deposit_milli: u128| RawTaskRecord {
            id,
            creator: Identity::new(creator),
            description: description.to_string(),
            deposit: Amount::from_wei(deposit_milli * (WEI_PER_TOKEN / 1000)),
            deadline: now,
            coarse_status: CoarseStatus::InProgress,
            proof_reference: String::new(),
            already_claimed: false,
        };

        let active = RawTaskRecord {
            deadline: now + 3 * DAY,
            ..task(1, DEMO_ALICE, "Run 5km every morning this week", 50)
        };
        let in_review = RawTaskRecord {
            deadline: now + DAY,
            proof_reference: "ipfs://bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi"
                .to_string(),
            ..task(2, DEMO_ALICE, "Finish chapter 10 of the Rust book", 100)
        };
        let completed = RawTaskRecord {
            deadline: now - 2 * DAY,
            coarse_status: CoarseStatus::Complete,
            proof_reference: "ipfs://bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku"
                .to_string(),
            ..task(3, DEMO_BOB, "Ship the portfolio site", 200)
        };
        let expired = RawTaskRecord {
            deadline: now - 6 * HOUR,
            ..task(4, DEMO_BOB, "Meditate 20 minutes a day for a month", 500)
        };
        let failed = RawTaskRecord {
            deadline: now - 5 * DAY,
            coarse_status: CoarseStatus::Failed,
            ..task(5, DEMO_CAROL, "Read three papers on consensus", 10)
        };

        Self::new([active, in_review, completed, expired, failed])
    }

    pub fn insert(&mut self, record: RawTaskRecord) {
        self.records.insert(record.id, record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TaskSource for MockSource {
    fn task_ids(&self) -> Result<Vec<u64>> {
        Ok(self.records.keys().copied().collect())
    }

    fn fetch(&self, id: u64) -> Result<Option<RawTaskRecord>> {
        Ok(self.records.get(&id).cloned())
    }
}
