//! The campaign runner: one sequential pass over the roster.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use herald_common::SendStatus;
use herald_roster::{
    ColumnDetector, ColumnMap, HeuristicDetector, RecipientRow, Roster, RosterError, RowId,
    RowPatch, StatusSummary,
};

use crate::{
    client::{DeliveryClient, EmailRequest, SmsRequest},
    error::RunError,
    failover::FailoverPolicy,
};

/// Default inter-row pacing delay: a courtesy to the provider, not a
/// correctness requirement.
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Immutable configuration for one campaign run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Template for the email channel. Required.
    pub email_template_id: String,
    /// Template for the SMS channel. Required when failover is enabled.
    pub sms_template_id: Option<String>,
    /// Gate for the failover policy.
    pub enable_sms_failover: bool,
    /// Fixed delay between rows.
    pub pacing: Duration,
}

impl RunConfig {
    #[must_use]
    pub fn new(email_template_id: impl Into<String>) -> Self {
        Self {
            email_template_id: email_template_id.into(),
            sms_template_id: None,
            enable_sms_failover: false,
            pacing: DEFAULT_PACING,
        }
    }

    /// Enable SMS failover with the given template.
    #[must_use]
    pub fn with_sms_failover(mut self, sms_template_id: impl Into<String>) -> Self {
        self.sms_template_id = Some(sms_template_id.into());
        self.enable_sms_failover = true;
        self
    }

    #[must_use]
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    fn validate(&self) -> Result<(), RunError> {
        if self.email_template_id.is_empty() {
            return Err(RunError::InvalidConfig {
                field: "email_template_id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.enable_sms_failover
            && !self
                .sms_template_id
                .as_deref()
                .is_some_and(|id| !id.is_empty())
        {
            return Err(RunError::InvalidConfig {
                field: "sms_template_id",
                reason: "required when SMS failover is enabled".to_string(),
            });
        }
        Ok(())
    }
}

/// How a run reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every row was processed.
    Completed,
    /// The operator stopped the run before exhaustion.
    Stopped,
}

/// Observable run state, published through a watch channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunProgress {
    pub running: bool,
    /// Rows completed so far; advances monotonically within a run.
    pub current_index: usize,
    pub total: usize,
    pub percent: f64,
}

impl RunProgress {
    const fn idle() -> Self {
        Self {
            running: false,
            current_index: 0,
            total: 0,
            percent: 0.0,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "Row counts are far below f64 precision limits"
    )]
    fn at(current_index: usize, total: usize, running: bool) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            (current_index as f64 / total as f64) * 100.0
        };
        Self {
            running,
            current_index,
            total,
            percent,
        }
    }
}

/// Final accounting for one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Rows processed before the terminal state was reached.
    pub processed: usize,
    pub summary: StatusSummary,
}

/// Clears the running flag on every exit path, including error returns.
struct RunningGuard<'a> {
    running: &'a AtomicBool,
    progress: &'a watch::Sender<RunProgress>,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.progress.send_modify(|progress| progress.running = false);
    }
}

/// Drives campaign runs over a roster.
///
/// States: `Idle -> Running -> (Completed | Stopped)`, re-enterable. The
/// runner is the roster's only writer; rows are processed strictly one at a
/// time, in roster order, awaiting each delivery call (and its failover
/// branch) before advancing. Cancellation is cooperative, checked at row
/// boundaries; an in-flight call is allowed to finish.
pub struct CampaignRunner {
    roster: Roster,
    client: Arc<dyn DeliveryClient>,
    detector: Box<dyn ColumnDetector>,
    running: AtomicBool,
    cancel: Mutex<CancellationToken>,
    progress: watch::Sender<RunProgress>,
}

impl fmt::Debug for CampaignRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CampaignRunner")
            .field("rows", &self.roster.len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CampaignRunner {
    /// Create a runner with the default column detection heuristics.
    #[must_use]
    pub fn new(roster: Roster, client: Arc<dyn DeliveryClient>) -> Self {
        Self::with_detector(roster, client, Box::new(HeuristicDetector::new()))
    }

    /// Create a runner with a custom column detection strategy.
    #[must_use]
    pub fn with_detector(
        roster: Roster,
        client: Arc<dyn DeliveryClient>,
        detector: Box<dyn ColumnDetector>,
    ) -> Self {
        let (progress, _) = watch::channel(RunProgress::idle());
        Self {
            roster,
            client,
            detector,
            running: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
            progress,
        }
    }

    /// The roster this runner writes to.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Whether a run is currently active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Subscribe to run progress.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<RunProgress> {
        self.progress.subscribe()
    }

    /// Request cancellation of the active run.
    ///
    /// The in-flight row's attempt is allowed to finish and its patch is
    /// committed; no further rows are started. A no-op when idle.
    pub fn stop(&self) {
        self.cancel.lock().cancel();
    }

    /// Execute one pass over the roster under the given configuration.
    ///
    /// # Errors
    ///
    /// [`RunError::InvalidConfig`] and [`RunError::AlreadyRunning`] are
    /// reported before any row is touched. [`RunError::Roster`] aborts the
    /// pass mid-run and indicates an internal consistency bug. Per-row
    /// delivery failures are not errors; they land in row state.
    pub async fn run(&self, config: &RunConfig) -> Result<RunReport, RunError> {
        config.validate()?;
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RunError::AlreadyRunning)?;
        let guard = RunningGuard {
            running: &self.running,
            progress: &self.progress,
        };

        // Fresh token per run; stop() cancels the current one.
        let cancel = {
            let mut slot = self.cancel.lock();
            *slot = CancellationToken::new();
            slot.clone()
        };

        let headers = self.roster.headers();
        let columns = self.detector.detect(&headers, &self.roster.snapshot());
        let policy = FailoverPolicy::from_config(config);
        let order = self.roster.order();
        let total = order.len();

        info!(
            rows = total,
            email_template = %config.email_template_id,
            sms_failover = config.enable_sms_failover,
            "Campaign run starting"
        );
        self.progress.send_replace(RunProgress::at(0, total, true));

        let mut processed = 0;
        let mut outcome = RunOutcome::Completed;

        for id in order {
            if cancel.is_cancelled() {
                outcome = RunOutcome::Stopped;
                break;
            }

            self.process_row(id, config, &policy, &columns).await?;

            processed += 1;
            self.progress
                .send_replace(RunProgress::at(processed, total, true));

            if processed < total && !config.pacing.is_zero() {
                tokio::select! {
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(config.pacing) => {}
                }
            }
        }

        if outcome == RunOutcome::Completed {
            self.progress.send_modify(|progress| {
                progress.current_index = total;
                progress.percent = 100.0;
            });
        }
        drop(guard);

        let summary = StatusSummary::of(&self.roster);
        info!(?outcome, processed, %summary, "Campaign run finished");

        Ok(RunReport {
            outcome,
            processed,
            summary,
        })
    }

    /// One row: email attempt, conditional SMS failover, one committed
    /// patch per channel.
    async fn process_row(
        &self,
        id: RowId,
        config: &RunConfig,
        policy: &FailoverPolicy,
        columns: &ColumnMap,
    ) -> Result<(), RunError> {
        // Re-read the row rather than holding a copy across awaits.
        let row = self
            .roster
            .get(id)
            .ok_or(RosterError::RowNotFound(id))?;

        let request = EmailRequest {
            template_id: config.email_template_id.clone(),
            recipient_email: columns.email_value(&row),
            variables: row.fields.clone(),
        };

        match self.client.send_email(&request).await {
            Ok(outcome) if outcome.success => {
                debug!(row = %id, "Email delivered");
                self.roster.update(
                    id,
                    RowPatch {
                        email_status: Some(SendStatus::Success),
                        email_sent_at: Some(Utc::now()),
                        ..RowPatch::default()
                    },
                )?;
            }
            Ok(outcome) if outcome.status == SendStatus::Bounced => {
                if policy.should_attempt_sms(outcome.status) {
                    self.attempt_sms_failover(id, config, columns, &row).await?;
                } else {
                    debug!(row = %id, "Email bounced, failover not applicable");
                    self.roster.update(
                        id,
                        RowPatch {
                            email_status: Some(SendStatus::Bounced),
                            ..RowPatch::default()
                        },
                    )?;
                }
            }
            Ok(outcome) => {
                debug!(row = %id, message = %outcome.message, "Email rejected");
                self.roster.update(
                    id,
                    RowPatch {
                        email_status: Some(SendStatus::Failed),
                        error: Some(outcome.message),
                        ..RowPatch::default()
                    },
                )?;
            }
            Err(error) => {
                warn!(row = %id, %error, "Email send failed in transit");
                self.roster.update(
                    id,
                    RowPatch {
                        email_status: Some(SendStatus::Failed),
                        error: Some("Network error".to_string()),
                        ..RowPatch::default()
                    },
                )?;
            }
        }

        Ok(())
    }

    async fn attempt_sms_failover(
        &self,
        id: RowId,
        config: &RunConfig,
        columns: &ColumnMap,
        row: &RecipientRow,
    ) -> Result<(), RunError> {
        let request = SmsRequest {
            // The policy only fires with a non-empty template configured.
            template_id: config.sms_template_id.clone().unwrap_or_default(),
            recipient_phone: columns.phone_value(row),
            variables: row.fields.clone(),
        };

        match self.client.send_sms(&request).await {
            Ok(sms) if sms.success => {
                debug!(row = %id, "SMS failover delivered");
                self.roster.update(
                    id,
                    RowPatch {
                        email_status: Some(SendStatus::Bounced),
                        sms_status: Some(SendStatus::SmsSent),
                        sms_sent_at: Some(Utc::now()),
                        ..RowPatch::default()
                    },
                )?;
            }
            Ok(sms) => {
                debug!(row = %id, message = %sms.message, "SMS failover rejected");
                self.roster.update(
                    id,
                    RowPatch {
                        email_status: Some(SendStatus::Bounced),
                        sms_status: Some(SendStatus::Failed),
                        error: Some(sms.message),
                        ..RowPatch::default()
                    },
                )?;
            }
            Err(error) => {
                warn!(row = %id, %error, "SMS send failed in transit");
                self.roster.update(
                    id,
                    RowPatch {
                        email_status: Some(SendStatus::Bounced),
                        sms_status: Some(SendStatus::Failed),
                        error: Some("SMS sending failed".to_string()),
                        ..RowPatch::default()
                    },
                )?;
            }
        }

        Ok(())
    }
}
