//! Snapshot ingest: normalizes a JSON document and stores what survives.
//!
//! A bad entry never aborts the batch. Boundary rejections and store
//! failures are both reported against the entry's position.

use super::record::{normalize_all, split_document, ClaimDetection, RecordError};
use super::repo::TaskRepo;
use super::types::RawTaskRecord;
use anyhow::Result;
use tracing::{info, warn};

/// Outcome of one import batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub total: usize,
    /// Ids written to the store, in document order.
    pub stored: Vec<u64>,
    /// Entry position and reason, for every entry not stored.
    pub rejected: Vec<(usize, String)>,
}

/// Upserts every normalized record, collecting failures per entry.
pub fn store_all(
    repo: &TaskRepo,
    results: Vec<(usize, Result<RawTaskRecord, RecordError>)>,
) -> ImportReport {
    let mut report = ImportReport {
        total: results.len(),
        ..ImportReport::default()
    };
    for (idx, result) in results {
        let outcome = result
            .map_err(anyhow::Error::from)
            .and_then(|record| repo.upsert(&record).map(|()| record.id));
        match outcome {
            Ok(id) => report.stored.push(id),
            Err(e) => {
                warn!(entry = idx, error = %e, "snapshot rejected");
                report.rejected.push((idx, format!("{e:#}")));
            }
        }
    }
    info!(stored = report.stored.len(), total = report.total, "import finished");
    report
}

/// Parses `text` (an array of snapshots or a single object) and stores it.
///
/// # Errors
/// Returns error only if the document itself is not JSON.
pub fn import_document(repo: &TaskRepo, text: &str, policy: ClaimDetection) -> Result<ImportReport> {
    let entries = split_document(text)?;
    Ok(store_all(repo, normalize_all(&entries, policy)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::{Db, DB_FILE};
    use crate::engine::types::{Amount, CoarseStatus, Identity};

    fn record(id: u64) -> RawTaskRecord {
        RawTaskRecord {
            id,
            creator: Identity::new("0xabc"),
            description: String::new(),
            deposit: Amount::from_wei(1),
            deadline: 10,
            coarse_status: CoarseStatus::InProgress,
            proof_reference: String::new(),
            already_claimed: false,
        }
    }

    #[test]
    fn test_partial_import_commits_good_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let document = format!(
            r#"[
                {{"id": 1, "creator": "0xabc", "depositAmount": 20000000000000000000, "deadline": 10, "status": 0}},
                {{"id": 2, "creator": "", "depositAmount": "1", "deadline": 10, "status": 0}},
                {{"id": {}, "creator": "0xabc", "depositAmount": "1", "deadline": 10, "status": 0}},
                {{"id": 4, "creator": "0xabc", "depositAmount": "0.5", "deadline": 10, "status": "Failed"}}
            ]"#,
            u64::MAX
        );
        {
            let mut conn = Db::init(dir.path()).expect("init");
            let tx = conn.transaction().expect("tx");
            let report = import_document(&TaskRepo::new(&tx), &document, ClaimDetection::ExplicitFlag)
                .expect("document parses");
            tx.commit().expect("commit");

            assert_eq!(report.total, 4);
            assert_eq!(report.stored, vec![1, 4]);
            let positions: Vec<usize> = report.rejected.iter().map(|(idx, _)| *idx).collect();
            assert_eq!(positions, vec![1, 2]);
        }

        let conn = Db::open(&dir.path().join(DB_FILE)).expect("reopen");
        let repo = TaskRepo::new(&conn);
        assert_eq!(repo.ids().expect("ids"), vec![1, 4]);
        let big = repo.find_by_id(1).expect("query").expect("stored");
        assert_eq!(big.deposit.to_string(), "20");
    }

    #[test]
    fn test_store_failure_does_not_abort_batch() {
        let conn = Db::in_memory().expect("db");
        let repo = TaskRepo::new(&conn);
        let results = vec![(0, Ok(record(1))), (1, Ok(record(u64::MAX))), (2, Ok(record(3)))];

        let report = store_all(&repo, results);
        assert_eq!(report.stored, vec![1, 3]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, 1);
        assert_eq!(repo.count().expect("count"), 2);
    }

    #[test]
    fn test_invalid_document_is_an_error() {
        let conn = Db::in_memory().expect("db");
        assert!(import_document(&TaskRepo::new(&conn), "not json", ClaimDetection::ExplicitFlag).is_err());
    }
}
