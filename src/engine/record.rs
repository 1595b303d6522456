//! Record Boundary: Turns loosely-typed snapshots into `RawTaskRecord`.
//!
//! Contract readers and the demo data both hand over JSON objects whose
//! field types drift (amounts as decimal strings or integer wei, status
//! as a name or an enum ordinal). All of that is settled here so the
//! resolver only ever sees well-formed records.

use super::types::{Amount, CoarseStatus, Identity, RawTaskRecord};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

/// Largest id the snapshot store can hold (SQLite integer range).
pub const MAX_TASK_ID: u64 = i64::MAX as u64;

/// Why a snapshot was rejected at the boundary.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("task id must be positive")]
    ZeroId,
    #[error("task id {0} exceeds the supported range")]
    IdOutOfRange(u64),
    #[error("task {0} has no creator address")]
    MissingCreator(u64),
    #[error("task {id} has invalid deadline {deadline} (must be a positive unix timestamp)")]
    InvalidDeadline { id: u64, deadline: i64 },
    #[error("task {id} has negative deposit {value}")]
    NegativeDeposit { id: u64, value: String },
    #[error("task {id} has unparseable deposit '{value}'")]
    InvalidDeposit { id: u64, value: String },
    #[error("unknown task status '{0}'")]
    UnknownStatus(String),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// How to decide whether a completed task's stake was already withdrawn.
///
/// Contract variants differ: some keep an explicit flag, others zero the
/// deposit on claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimDetection {
    /// Trust the snapshot's `claimed` flag; infer from a zero deposit only
    /// when the flag is missing.
    #[default]
    ExplicitFlag,
    /// Always treat `Complete` with zero deposit as claimed.
    ZeroDeposit,
}

impl ClaimDetection {
    #[must_use]
    pub fn resolve(self, explicit: Option<bool>, status: CoarseStatus, deposit: Amount) -> bool {
        let inferred = status == CoarseStatus::Complete && deposit.is_zero();
        match self {
            ClaimDetection::ExplicitFlag => explicit.unwrap_or(inferred),
            ClaimDetection::ZeroDeposit => inferred,
        }
    }
}

/// Status as it appears on the wire: a name or the contract ordinal.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StatusField {
    Ordinal(i64),
    Name(String),
}

/// A task snapshot before validation.
///
/// The deposit is kept as raw JSON text: wei amounts routinely exceed
/// `u64`, and parsed JSON numbers would fall back to `f64`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaskSnapshot {
    pub id: u64,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "deposit")]
    pub deposit_amount: Box<RawValue>,
    pub deadline: i64,
    pub status: StatusField,
    #[serde(default, alias = "proofReference")]
    pub proof: Option<String>,
    #[serde(default, alias = "alreadyClaimed")]
    pub claimed: Option<bool>,
}

impl RawTaskSnapshot {
    /// Deserializes one snapshot from JSON text.
    ///
    /// # Errors
    /// Returns `RecordError::Malformed` if required fields are missing or mistyped.
    pub fn from_json(text: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validates the snapshot and resolves the claimed flag.
    ///
    /// # Errors
    /// Returns the first field that fails validation.
    pub fn normalize(self, policy: ClaimDetection) -> Result<RawTaskRecord, RecordError> {
        let id = self.id;
        if id == 0 {
            return Err(RecordError::ZeroId);
        }
        if id > MAX_TASK_ID {
            return Err(RecordError::IdOutOfRange(id));
        }

        let creator = Identity::new(self.creator);
        if creator.is_empty() {
            return Err(RecordError::MissingCreator(id));
        }

        if self.deadline <= 0 {
            return Err(RecordError::InvalidDeadline {
                id,
                deadline: self.deadline,
            });
        }

        let deposit = parse_deposit(id, &self.deposit_amount)?;
        let coarse_status = parse_status(&self.status)?;
        let proof_reference = self.proof.map(|p| p.trim().to_string()).unwrap_or_default();
        let already_claimed = policy.resolve(self.claimed, coarse_status, deposit);

        Ok(RawTaskRecord {
            id,
            creator,
            description: self.description.trim().to_string(),
            deposit,
            deadline: self.deadline,
            coarse_status,
            proof_reference,
            already_claimed,
        })
    }
}

/// Strings are decimal token amounts; bare integers are wei.
fn parse_deposit(id: u64, raw: &RawValue) -> Result<Amount, RecordError> {
    let text = raw.get().trim();
    let invalid = |value: &str| RecordError::InvalidDeposit {
        id,
        value: value.to_string(),
    };
    let negative = |value: &str| RecordError::NegativeDeposit {
        id,
        value: value.to_string(),
    };

    if text.starts_with('"') {
        let decimal: String = serde_json::from_str(text)?;
        if decimal.trim_start().starts_with('-') {
            return Err(negative(&decimal));
        }
        return Amount::from_decimal_str(&decimal).ok_or_else(|| invalid(&decimal));
    }

    if text.starts_with('-') {
        return Err(negative(text));
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(text));
    }
    text.parse::<u128>()
        .map(Amount::from_wei)
        .map_err(|_| invalid(text))
}

fn parse_status(field: &StatusField) -> Result<CoarseStatus, RecordError> {
    match field {
        StatusField::Ordinal(n) => {
            CoarseStatus::from_ordinal(*n).ok_or_else(|| RecordError::UnknownStatus(n.to_string()))
        }
        StatusField::Name(name) => name.parse(),
    }
}

/// Splits a document into snapshot entries: an array of objects or one object.
///
/// # Errors
/// Returns `RecordError::Malformed` if the text is not JSON.
pub fn split_document(text: &str) -> Result<Vec<Box<RawValue>>, RecordError> {
    let document: Box<RawValue> = serde_json::from_str(text)?;
    if document.get().trim_start().starts_with('[') {
        Ok(serde_json::from_str(document.get())?)
    } else {
        Ok(vec![document])
    }
}

/// Normalizes a batch, keeping each entry's position for error reports.
#[must_use]
pub fn normalize_all(
    entries: &[Box<RawValue>],
    policy: ClaimDetection,
) -> Vec<(usize, Result<RawTaskRecord, RecordError>)> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let record = RawTaskSnapshot::from_json(entry.get()).and_then(|s| s.normalize(policy));
            (idx, record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::WEI_PER_TOKEN;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> RawTaskSnapshot {
        RawTaskSnapshot::from_json(&value.to_string()).expect("snapshot should deserialize")
    }

    #[test]
    fn test_normalize_named_status_and_decimal_amount() {
        let record = snapshot(json!({
            "id": 7,
            "creator": " 0xAbC0000000000000000000000000000000000001 ",
            "description": "  Run every day  ",
            "depositAmount": "0.25",
            "deadline": 1_700_000_000,
            "status": "InProgress",
            "proof": ""
        }))
        .normalize(ClaimDetection::ExplicitFlag)
        .expect("valid snapshot");

        assert_eq!(record.id, 7);
        assert_eq!(record.creator.as_str(), "0xAbC0000000000000000000000000000000000001");
        assert_eq!(record.description, "Run every day");
        assert_eq!(record.deposit, Amount::from_wei(WEI_PER_TOKEN / 4));
        assert_eq!(record.coarse_status, CoarseStatus::InProgress);
        assert!(!record.has_proof());
        assert!(!record.already_claimed);
    }

    #[test]
    fn test_normalize_ordinal_status_and_wei_amount() {
        let record = snapshot(json!({
            "id": 3,
            "creator": "0xabc",
            "deposit": 1_000_000,
            "deadline": 10,
            "status": 2,
            "proofReference": "ipfs://Qm123"
        }))
        .normalize(ClaimDetection::ExplicitFlag)
        .expect("valid snapshot");

        assert_eq!(record.deposit, Amount::from_wei(1_000_000));
        assert_eq!(record.coarse_status, CoarseStatus::Failed);
        assert_eq!(record.proof_reference, "ipfs://Qm123");
    }

    #[test]
    fn test_whitespace_proof_is_empty() {
        let record = snapshot(json!({
            "id": 3, "creator": "0xabc", "depositAmount": "1",
            "deadline": 10, "status": 0, "proof": "   "
        }))
        .normalize(ClaimDetection::ExplicitFlag)
        .expect("valid snapshot");
        assert!(!record.has_proof());
    }

    #[test]
    fn test_rejections() {
        let cases = [
            json!({"id": 0, "creator": "0xabc", "depositAmount": "1", "deadline": 10, "status": 0}),
            json!({"id": 1, "creator": "  ", "depositAmount": "1", "deadline": 10, "status": 0}),
            json!({"id": 1, "creator": "0xabc", "depositAmount": "1", "deadline": 0, "status": 0}),
            json!({"id": 1, "creator": "0xabc", "depositAmount": "-1", "deadline": 10, "status": 0}),
            json!({"id": 1, "creator": "0xabc", "depositAmount": -5, "deadline": 10, "status": 0}),
            json!({"id": 1, "creator": "0xabc", "depositAmount": "abc", "deadline": 10, "status": 0}),
            json!({"id": 1, "creator": "0xabc", "depositAmount": 0.5, "deadline": 10, "status": 0}),
            json!({"id": 1, "creator": "0xabc", "depositAmount": "1", "deadline": 10, "status": 9}),
            json!({"id": 1, "creator": "0xabc", "depositAmount": "1", "deadline": 10, "status": "Pending"}),
        ];
        for value in cases {
            let result = snapshot(value.clone()).normalize(ClaimDetection::ExplicitFlag);
            assert!(result.is_err(), "expected rejection for {value}");
        }

        let negative = json!({
            "id": 4, "creator": "0xabc", "depositAmount": "-0.1", "deadline": 10, "status": 0
        });
        let err = snapshot(negative).normalize(ClaimDetection::ExplicitFlag);
        assert!(matches!(err, Err(RecordError::NegativeDeposit { id: 4, .. })));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = RawTaskSnapshot::from_json(r#"{"id": 1, "creator": "0xabc"}"#);
        assert!(matches!(err, Err(RecordError::Malformed(_))));
    }

    #[test]
    fn test_integer_deposit_above_u64() {
        let text = r#"{"id": 1, "creator": "0xabc", "depositAmount": 20000000000000000000,
                      "deadline": 10, "status": 0}"#;
        let record = RawTaskSnapshot::from_json(text)
            .and_then(|s| s.normalize(ClaimDetection::ExplicitFlag))
            .expect("20 tokens in wei");
        assert_eq!(record.deposit, Amount::from_wei(20 * WEI_PER_TOKEN));
        assert_eq!(record.deposit.to_string(), "20");
    }

    #[test]
    fn test_integer_deposit_forms() {
        let parse = |deposit: &str| {
            let text = format!(
                r#"{{"id": 2, "creator": "0xabc", "depositAmount": {deposit}, "deadline": 10, "status": 0}}"#
            );
            RawTaskSnapshot::from_json(&text).and_then(|s| s.normalize(ClaimDetection::ExplicitFlag))
        };
        assert!(matches!(parse("1e18"), Err(RecordError::InvalidDeposit { .. })));
        assert!(matches!(parse("-7"), Err(RecordError::NegativeDeposit { .. })));
        assert!(matches!(parse("null"), Err(RecordError::InvalidDeposit { .. })));
        assert!(matches!(
            parse("999999999999999999999999999999999999999999"),
            Err(RecordError::InvalidDeposit { .. })
        ));
        assert_eq!(parse("0").ok().map(|r| r.deposit), Some(Amount::ZERO));
    }

    #[test]
    fn test_id_above_storage_range_rejected() {
        let text = format!(
            r#"{{"id": {}, "creator": "0xabc", "depositAmount": "1", "deadline": 10, "status": 0}}"#,
            u64::MAX
        );
        let err = RawTaskSnapshot::from_json(&text).and_then(|s| s.normalize(ClaimDetection::ExplicitFlag));
        assert!(matches!(err, Err(RecordError::IdOutOfRange(u64::MAX))));

        let at_limit = text.replace(&u64::MAX.to_string(), &MAX_TASK_ID.to_string());
        let ok = RawTaskSnapshot::from_json(&at_limit).and_then(|s| s.normalize(ClaimDetection::ExplicitFlag));
        assert_eq!(ok.ok().map(|r| r.id), Some(MAX_TASK_ID));
    }

    #[test]
    fn test_split_document() {
        let many = split_document(r#"[{"id": 1}, {"id": 2}]"#).expect("array");
        assert_eq!(many.len(), 2);
        let one = split_document(r#"{"id": 1}"#).expect("object");
        assert_eq!(one.len(), 1);
        assert!(matches!(split_document("[{"), Err(RecordError::Malformed(_))));
    }

    #[test]
    fn test_claim_detection_policies() {
        let zero = Amount::ZERO;
        let some = Amount::from_wei(5);

        let explicit = ClaimDetection::ExplicitFlag;
        assert!(explicit.resolve(Some(true), CoarseStatus::Complete, some));
        assert!(!explicit.resolve(Some(false), CoarseStatus::Complete, zero));
        assert!(explicit.resolve(None, CoarseStatus::Complete, zero));
        assert!(!explicit.resolve(None, CoarseStatus::Complete, some));
        assert!(!explicit.resolve(None, CoarseStatus::Failed, zero));

        let heuristic = ClaimDetection::ZeroDeposit;
        assert!(heuristic.resolve(Some(false), CoarseStatus::Complete, zero));
        assert!(!heuristic.resolve(Some(true), CoarseStatus::Complete, some));
        assert!(!heuristic.resolve(None, CoarseStatus::InProgress, zero));
    }

    #[test]
    fn test_normalize_all_keeps_positions() {
        let document = json!([
            {"id": 1, "creator": "0xabc", "depositAmount": "1", "deadline": 10, "status": 0},
            {"nonsense": true},
            {"id": 2, "creator": "0xabc", "depositAmount": "0", "deadline": 10, "status": "Complete"},
        ]);
        let entries = split_document(&document.to_string()).expect("document");
        let results = normalize_all(&entries, ClaimDetection::ExplicitFlag);
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, 1);
        assert!(results[1].1.is_err());
        let claimed = results[2].1.as_ref().map(|r| r.already_claimed).ok();
        assert_eq!(claimed, Some(true));
    }
}
