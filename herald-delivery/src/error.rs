//! Typed error handling for campaign runs.
//!
//! Only two things can fail a run before or during its pass: a bad
//! configuration (rejected synchronously, the run never starts) and a
//! roster consistency violation (a patch targeting a vanished row). Every
//! per-row delivery failure is captured into that row's state instead.

use thiserror::Error;

use herald_roster::RosterError;

/// Errors that abort a campaign run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The run configuration is unusable; reported before any row is
    /// touched.
    #[error("Invalid run configuration for {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// A run is already active on this runner. The roster tolerates only
    /// one writer at a time.
    #[error("A run is already in progress")]
    AlreadyRunning,

    /// Roster consistency violation; a programming error, not an expected
    /// runtime condition.
    #[error(transparent)]
    Roster(#[from] RosterError),
}

impl RunError {
    /// Returns `true` if the error was raised before the run started.
    #[must_use]
    pub const fn is_pre_start(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::AlreadyRunning)
    }
}

/// Errors from a single delivery client call.
///
/// All variants are treated identically by the orchestrator: the row is
/// marked failed on that channel and the pass continues. None of them is
/// retried within a run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed (connection refused, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered outside the success range.
    #[error("Provider rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider answered 2xx but the envelope carried no payload.
    #[error("Provider response carried no data: {0}")]
    MissingData(String),

    /// The client itself could not be constructed.
    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_start_classification() {
        let err = RunError::InvalidConfig {
            field: "email_template_id",
            reason: "must not be empty".to_string(),
        };
        assert!(err.is_pre_start());
        assert!(RunError::AlreadyRunning.is_pre_start());

        let err = RunError::Roster(RosterError::RowNotFound(herald_roster::RowId::generate()));
        assert!(!err.is_pre_start());
    }

    #[test]
    fn client_error_display() {
        let err = ClientError::Provider {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Provider rejected the request (503): overloaded"
        );
    }
}
