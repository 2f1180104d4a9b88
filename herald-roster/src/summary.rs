use core::fmt::{self, Display, Formatter};

use serde::Serialize;

use herald_common::SendStatus;

use crate::{row::RecipientRow, store::Roster};

/// Rollup counts over a roster's current delivery state.
///
/// Recomputed on demand rather than cached; reads committed state only, so
/// it is safe to call while a run is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub bounced: usize,
    pub sms_sent: usize,
    pub pending: usize,
}

impl StatusSummary {
    /// Summarize a slice of rows.
    #[must_use]
    pub fn from_rows(rows: &[RecipientRow]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            ..Self::default()
        };

        for row in rows {
            match row.email_status {
                SendStatus::Pending => summary.pending += 1,
                SendStatus::Success => summary.success += 1,
                SendStatus::Failed => summary.failed += 1,
                SendStatus::Bounced => summary.bounced += 1,
                SendStatus::SmsSent => {}
            }
            if row.sms_status == Some(SendStatus::SmsSent) {
                summary.sms_sent += 1;
            }
        }

        summary
    }

    /// Summarize a roster's committed state.
    #[must_use]
    pub fn of(roster: &Roster) -> Self {
        Self::from_rows(&roster.snapshot())
    }
}

impl Display for StatusSummary {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            fmt,
            "total={} success={} failed={} bounced={} sms_sent={} pending={}",
            self.total, self.success, self.failed, self.bounced, self.sms_sent, self.pending
        )
    }
}
