use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Delivery state of a single send attempt, shared between the engine, the
/// provider wire format, and the per-row bookkeeping.
///
/// The serialized form is the provider's vocabulary (`snake_case`, so the
/// SMS terminal state round-trips as `sms_sent`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    /// Not yet attempted.
    Pending,
    /// Delivered to the recipient's mailbox.
    Success,
    /// Rejected outright (bad address, provider refusal, network error).
    Failed,
    /// Accepted by the provider but not deliverable to the mailbox.
    Bounced,
    /// Terminal success state for the SMS channel.
    SmsSent,
}

impl SendStatus {
    /// A row in this state will not be touched again within the same run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether this outcome completed delivery on its channel.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::SmsSent)
    }
}

impl Display for SendStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let name = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Bounced => "bounced",
            Self::SmsSent => "sms_sent",
        };
        write!(fmt, "{name}")
    }
}
