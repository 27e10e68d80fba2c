// 💳 Transaction - the atomic record: date, description, amount + content identity

use crate::comparison::compare_sentences;
use crate::error::{Result, SequenceError};
use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Wire/date format for transaction dates
pub const DATE_FORMAT: &str = "%m/%d/%Y";

// ============================================================================
// RAW TRANSACTION
// ============================================================================

/// RawTransaction - the serialized record form `{date, description, amount}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Date as MM/DD/YYYY
    pub date: String,

    pub description: String,

    /// Amount exactly as received (never parsed to a number)
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: String,
}

impl RawTransaction {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        RawTransaction {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
        }
    }
}

/// Accept amounts written either as JSON strings or bare numbers
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an amount as a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

// ============================================================================
// SEQUENCE ID
// ============================================================================

/// Identifies the sequence owning a transaction.
/// A sequence is named after its anchor (first) member's identity, which is
/// unique because a transaction is owned by at most one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId(String);

impl SequenceId {
    pub fn new(anchor_id: impl Into<String>) -> Self {
        SequenceId(anchor_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// Transaction - immutable once built, except for the owning sequence
/// back-reference which is set at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "RawTransaction", try_from = "RawTransaction")]
pub struct Transaction {
    date: NaiveDate,
    description: String,
    amount: String,

    /// SHA-256 of the canonical content string
    id: String,

    /// Relation to the owning sequence (never ownership of it)
    sequence: Option<SequenceId>,
}

impl Transaction {
    /// Build a transaction, parsing `date` as MM/DD/YYYY
    pub fn new(date: &str, description: impl Into<String>, amount: impl Into<String>) -> Result<Self> {
        let parsed = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|source| {
            SequenceError::InvalidDate {
                value: date.to_string(),
                source,
            }
        })?;

        let description = description.into();
        let amount = amount.into();
        let id = compute_identity(&parsed, &description, &amount);

        Ok(Transaction {
            date: parsed,
            description,
            amount,
            id,
            sequence: None,
        })
    }

    pub fn from_raw(raw: &RawTransaction) -> Result<Self> {
        Transaction::new(&raw.date, raw.description.clone(), raw.amount.clone())
    }

    pub fn to_raw(&self) -> RawTransaction {
        RawTransaction {
            date: self.date.format(DATE_FORMAT).to_string(),
            description: self.description.clone(),
            amount: self.amount.clone(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Content identity: equal (date, description, amount) always give the same id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owning sequence, if this transaction was claimed by a finalized one
    pub fn sequence(&self) -> Option<&SequenceId> {
        self.sequence.as_ref()
    }

    /// Record the owning sequence. Only the first call has any effect.
    pub(crate) fn set_sequence(&mut self, sequence: SequenceId) {
        if self.sequence.is_none() {
            self.sequence = Some(sequence);
        }
    }

    /// Similarity of this transaction's description to another sentence,
    /// splitting on whitespace plus `extra_splits`
    pub fn compare_description<S: AsRef<str>>(
        &self,
        description: &str,
        extra_splits: &[S],
    ) -> Result<f64> {
        compare_sentences(&self.description, description, extra_splits)
    }

    /// Signed number of days from `self` to `other`
    pub fn days_until(&self, other: &Transaction) -> i64 {
        (other.date - self.date).num_days()
    }
}

/// Equality is content equality; the owning sequence is a relation, not content
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self.description == other.description
            && self.amount == other.amount
    }
}

impl Eq for Transaction {}

impl From<Transaction> for RawTransaction {
    fn from(tx: Transaction) -> Self {
        tx.to_raw()
    }
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = SequenceError;

    fn try_from(raw: RawTransaction) -> Result<Self> {
        Transaction::new(&raw.date, raw.description, raw.amount)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.date.format(DATE_FORMAT),
            self.description,
            self.amount
        )
    }
}

fn compute_identity(date: &NaiveDate, description: &str, amount: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}|{}|{}",
        date.format(DATE_FORMAT),
        description,
        amount
    ));
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::DEFAULT_SPLITTERS;

    fn create_test_transaction(date: &str, amount: &str) -> Transaction {
        Transaction::new(date, "TEST INVOICE 1234", amount).unwrap()
    }

    #[test]
    fn test_creation() {
        let tx = create_test_transaction("12/24/2019", "435.23");

        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2019, 12, 24).unwrap());
        assert_eq!(tx.description(), "TEST INVOICE 1234");
        assert_eq!(tx.amount(), "435.23");
        assert!(tx.sequence().is_none());
        assert_eq!(tx.to_raw().date, "12/24/2019");
    }

    #[test]
    fn test_invalid_date_fails_fast() {
        let result = Transaction::new("2019-12-24", "TEST INVOICE 1234", "435.23");
        match result {
            Err(SequenceError::InvalidDate { value, .. }) => assert_eq!(value, "2019-12-24"),
            other => panic!("expected InvalidDate, got {:?}", other),
        }

        assert!(Transaction::new("02/30/2020", "TEST", "1.00").is_err());
    }

    #[test]
    fn test_id_is_content_derived() {
        let tx1 = create_test_transaction("12/24/2019", "435.23");
        let tx2 = create_test_transaction("12/24/2019", "435.23");
        let tx3 = create_test_transaction("12/24/2019", "435.23");
        let tx4 = create_test_transaction("12/24/2019", "432.23");

        assert_eq!(tx1.id(), tx2.id());
        assert_eq!(tx2.id(), tx3.id());
        assert_ne!(tx3.id(), tx4.id());
        assert_eq!(tx1.id().len(), 64);
    }

    #[test]
    fn test_id_ignores_date_padding() {
        let padded = create_test_transaction("01/02/2020", "435.23");
        let unpadded = create_test_transaction("1/2/2020", "435.23");
        assert_eq!(padded.id(), unpadded.id());
    }

    #[test]
    fn test_sequence_set_at_most_once() {
        let mut tx = create_test_transaction("12/24/2019", "435.23");
        tx.set_sequence(SequenceId::new("first"));
        tx.set_sequence(SequenceId::new("second"));
        assert_eq!(tx.sequence().map(SequenceId::as_str), Some("first"));
    }

    #[test]
    fn test_compare_description() {
        let tx = create_test_transaction("12/24/2019", "435.23");
        assert_eq!(tx.compare_description("TEST INVOICE 1234", &DEFAULT_SPLITTERS).unwrap(), 1.0);
        assert!((tx.compare_description("TEST 1014", &DEFAULT_SPLITTERS).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_compare_description_uses_given_splitters() {
        let tx = Transaction::new("12/24/2019", "SPOTIFY/P1234/SE", "9.99").unwrap();

        // Default splitters leave the whole description as one token
        assert_eq!(tx.compare_description("SPOTIFY/P9999/SE", &DEFAULT_SPLITTERS).unwrap(), 0.0);

        let custom = vec!["/".to_string()];
        let score = tx.compare_description("SPOTIFY/P9999/SE", &custom).unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_days_until() {
        let a = create_test_transaction("01/22/2020", "435.23");
        let b = create_test_transaction("02/01/2020", "435.23");
        assert_eq!(a.days_until(&b), 10);
        assert_eq!(b.days_until(&a), -10);
    }

    #[test]
    fn test_serialized_form() {
        let tx = create_test_transaction("01/02/2020", "435.23");
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "01/02/2020",
                "description": "TEST INVOICE 1234",
                "amount": "435.23"
            })
        );
    }

    #[test]
    fn test_deserialize_numeric_amount() {
        let raw: RawTransaction = serde_json::from_str(
            r#"{"date": "01/02/2020", "description": "NETFLIX", "amount": 15}"#,
        )
        .unwrap();
        assert_eq!(raw.amount, "15");

        let tx: Transaction = serde_json::from_str(
            r#"{"date": "01/02/2020", "description": "NETFLIX", "amount": "-15.99"}"#,
        )
        .unwrap();
        assert_eq!(tx.amount(), "-15.99");
    }

    #[test]
    fn test_deserialize_rejects_bad_date() {
        let result: std::result::Result<Transaction, _> = serde_json::from_str(
            r#"{"date": "yesterday", "description": "NETFLIX", "amount": "15"}"#,
        );
        assert!(result.is_err());
    }
}
