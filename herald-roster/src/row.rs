use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herald_common::SendStatus;

/// Identifier for a recipient row.
///
/// A ULID assigned at ingestion time and never reassigned; rows keep their
/// identity across any number of runs over the same roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId {
    id: ulid::Ulid,
}

impl RowId {
    /// Generate a new unique row ID.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            id: ulid::Ulid::new(),
        }
    }

    /// Get the underlying ULID.
    #[must_use]
    pub const fn ulid(&self) -> ulid::Ulid {
        self.id
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl serde::Serialize for RowId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.id.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for RowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let id = ulid::Ulid::from_string(&s).map_err(serde::de::Error::custom)?;
        Ok(Self { id })
    }
}

/// One recipient: the ingested column data plus its delivery state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientRow {
    pub id: RowId,
    /// Arbitrary ingested columns. Column order lives at the roster level;
    /// rows only need lookup by name.
    pub fields: AHashMap<String, String>,
    pub email_status: SendStatus,
    /// Present if and only if SMS failover was attempted for this row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_status: Option<SendStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_sent_at: Option<DateTime<Utc>>,
    /// Failure detail from the last attempted channel that did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecipientRow {
    /// Create a fresh row with all delivery state at its initial values.
    #[must_use]
    pub fn new(id: RowId, fields: AHashMap<String, String>) -> Self {
        Self {
            id,
            fields,
            email_status: SendStatus::Pending,
            sms_status: None,
            email_sent_at: None,
            sms_sent_at: None,
            error: None,
        }
    }

    /// Look up a column value by exact name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Reset delivery state to its initial values, keeping identity and data.
    pub fn reset(&mut self) {
        self.email_status = SendStatus::Pending;
        self.sms_status = None;
        self.email_sent_at = None;
        self.sms_sent_at = None;
        self.error = None;
    }

    /// Apply a merge patch to this row's delivery state.
    pub fn apply(&mut self, patch: RowPatch) {
        if let Some(status) = patch.email_status {
            self.email_status = status;
        }
        if let Some(status) = patch.sms_status {
            self.sms_status = Some(status);
        }
        if let Some(at) = patch.email_sent_at {
            self.email_sent_at = Some(at);
        }
        if let Some(at) = patch.sms_sent_at {
            self.sms_sent_at = Some(at);
        }
        self.error = patch.error;
    }
}

/// Merge patch for a row's delivery state.
///
/// The status and timestamp fields merge (`None` leaves the stored value
/// untouched). `error` REPLACES the stored value verbatim, so a patch
/// without one clears any stale error from a previous run.
#[derive(Debug, Clone, Default)]
pub struct RowPatch {
    pub email_status: Option<SendStatus>,
    pub sms_status: Option<SendStatus>,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub sms_sent_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}
