//! Wire types shared between the delivery client and the provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::SendStatus;

/// Result of a single send attempt as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    /// Provider-side identifier for the attempt.
    pub row_id: String,
    /// Whether the channel completed delivery.
    pub success: bool,
    /// Outcome classification (`success`/`failed`/`bounced` for email,
    /// `sms_sent`/`failed` for SMS).
    pub status: SendStatus,
    /// Human-readable detail, also used as the row error on failure.
    pub message: String,
    /// Provider-side completion time.
    pub timestamp: DateTime<Utc>,
}

/// Envelope wrapped around every provider response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying a payload.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Failed envelope carrying only an error description.
    pub const fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            message: None,
        }
    }
}
