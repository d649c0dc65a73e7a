//! Append-only record of the session's question/answer exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One asked question and its answer. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// Ordered log of exchanges for the active session.
///
/// Insertion order is preserved and duplicates are kept; there is no
/// removal and no capacity bound. The ledger lives for the session and is
/// cleared when the session resets.
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<QueryRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, question: String, answer: String) {
        self.records.push(QueryRecord {
            question,
            answer,
            asked_at: Utc::now(),
        });
    }

    /// Look up a record by its question text.
    ///
    /// When the same question was asked more than once the most recent
    /// record wins, so re-displaying always shows the newest answer.
    pub fn find_by_question(&self, question: &str) -> Option<&QueryRecord> {
        self.records.iter().rev().find(|r| r.question == question)
    }

    pub fn records(&self) -> &[QueryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
