//! Orchestration scenarios against a scripted delivery client.

mod support;

use std::{sync::Arc, time::Duration};

use pretty_assertions::assert_eq;

use herald_common::SendStatus;
use herald_delivery::{CampaignRunner, RunConfig, RunError, RunOutcome};
use herald_roster::{RecipientRow, Roster, RowId, StatusSummary};
use support::{Scripted, ScriptedClient};

fn roster(rows: usize) -> Roster {
    let headers = vec!["name".to_string(), "email".to_string(), "phone".to_string()];
    let rows = (0..rows)
        .map(|i| {
            let fields = [
                ("name".to_string(), format!("Recipient {i}")),
                ("email".to_string(), format!("user{i}@example.com")),
                ("phone".to_string(), format!("+1555010{i:04}")),
            ]
            .into_iter()
            .collect();
            RecipientRow::new(RowId::generate(), fields)
        })
        .collect();
    Roster::from_rows(headers, rows)
}

fn config() -> RunConfig {
    RunConfig::new("email-1").with_pacing(Duration::ZERO)
}

fn config_with_failover() -> RunConfig {
    config().with_sms_failover("sms-1")
}

#[tokio::test]
async fn scenario_all_rows_succeed() {
    let client = ScriptedClient::new();
    let runner = CampaignRunner::new(roster(3), client.clone());

    let report = runner.run(&config()).await.expect("run completes");

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.processed, 3);
    assert_eq!(
        report.summary,
        StatusSummary {
            total: 3,
            success: 3,
            ..StatusSummary::default()
        }
    );

    for row in runner.roster().snapshot() {
        assert_eq!(row.email_status, SendStatus::Success);
        assert!(row.email_sent_at.is_some());
        assert_eq!(row.sms_status, None);
        assert_eq!(row.error, None);
    }
}

#[tokio::test]
async fn scenario_bounce_with_sms_failover_and_hard_failure() {
    let client = ScriptedClient::new();
    client.script_emails([
        Scripted::Status(SendStatus::Bounced, "Email bounced - recipient mailbox full"),
        Scripted::Status(SendStatus::Failed, "Invalid email address"),
    ]);
    client.script_sms([Scripted::Status(SendStatus::SmsSent, "SMS sent successfully")]);

    let runner = CampaignRunner::new(roster(2), client.clone());
    let report = runner
        .run(&config_with_failover())
        .await
        .expect("run completes");

    let rows = runner.roster().snapshot();
    assert_eq!(rows[0].email_status, SendStatus::Bounced);
    assert_eq!(rows[0].sms_status, Some(SendStatus::SmsSent));
    assert!(rows[0].sms_sent_at.is_some());
    assert_eq!(rows[0].error, None);

    assert_eq!(rows[1].email_status, SendStatus::Failed);
    assert_eq!(rows[1].sms_status, None);
    assert_eq!(rows[1].error.as_deref(), Some("Invalid email address"));

    assert_eq!(report.summary.bounced, 1);
    assert_eq!(report.summary.sms_sent, 1);
    assert_eq!(report.summary.failed, 1);

    // The failover call used the SMS template and the row's phone column.
    let sms_calls = client.sms_calls();
    assert_eq!(sms_calls.len(), 1);
    assert_eq!(sms_calls[0].template_id, "sms-1");
    assert_eq!(sms_calls[0].recipient_phone, "+15550100000");
}

#[tokio::test]
async fn scenario_bounce_without_failover_stays_bounced() {
    let client = ScriptedClient::new();
    client.script_emails([Scripted::Status(
        SendStatus::Bounced,
        "Email bounced - recipient mailbox full",
    )]);

    let runner = CampaignRunner::new(roster(1), client.clone());
    let report = runner.run(&config()).await.expect("run completes");

    let rows = runner.roster().snapshot();
    assert_eq!(rows[0].email_status, SendStatus::Bounced);
    assert_eq!(rows[0].sms_status, None);
    assert_eq!(rows[0].error, None);
    assert!(client.sms_calls().is_empty());
    assert_eq!(report.summary.bounced, 1);
}

#[tokio::test]
async fn scenario_stop_after_two_rows() {
    let client = ScriptedClient::new();
    let gate = client.gate_email_call(2);

    let runner = Arc::new(CampaignRunner::new(roster(5), client.clone()));
    let handle = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.run(&config()).await })
    };

    // Stop while row 2 is in flight, then let its attempt finish.
    gate.reached.notified().await;
    runner.stop();
    gate.release.notify_one();

    let report = handle
        .await
        .expect("task joins")
        .expect("run reaches a terminal state");

    assert_eq!(report.outcome, RunOutcome::Stopped);
    assert_eq!(report.processed, 2);
    assert!(!runner.is_running());

    let rows = runner.roster().snapshot();
    for row in &rows[..2] {
        assert_eq!(row.email_status, SendStatus::Success);
    }
    for row in &rows[2..] {
        assert_eq!(row.email_status, SendStatus::Pending);
    }
    assert_eq!(report.summary.pending, 3);
}

#[tokio::test]
async fn sms_network_error_records_fixed_message() {
    let client = ScriptedClient::new();
    client.script_emails([Scripted::Status(SendStatus::Bounced, "mailbox full")]);
    client.script_sms([Scripted::NetworkError]);

    let runner = CampaignRunner::new(roster(1), client.clone());
    runner
        .run(&config_with_failover())
        .await
        .expect("run completes");

    let rows = runner.roster().snapshot();
    assert_eq!(rows[0].email_status, SendStatus::Bounced);
    assert_eq!(rows[0].sms_status, Some(SendStatus::Failed));
    assert_eq!(rows[0].sms_sent_at, None);
    assert_eq!(rows[0].error.as_deref(), Some("SMS sending failed"));
}

#[tokio::test]
async fn sms_rejection_records_provider_message() {
    let client = ScriptedClient::new();
    client.script_emails([Scripted::Status(SendStatus::Bounced, "mailbox full")]);
    client.script_sms([Scripted::Status(SendStatus::Failed, "Invalid phone number")]);

    let runner = CampaignRunner::new(roster(1), client.clone());
    runner
        .run(&config_with_failover())
        .await
        .expect("run completes");

    let rows = runner.roster().snapshot();
    assert_eq!(rows[0].sms_status, Some(SendStatus::Failed));
    assert_eq!(rows[0].error.as_deref(), Some("Invalid phone number"));
}

#[tokio::test]
async fn email_network_error_marks_row_failed() {
    let client = ScriptedClient::new();
    client.script_emails([Scripted::NetworkError, Scripted::NetworkError]);

    let runner = CampaignRunner::new(roster(2), client.clone());
    let report = runner.run(&config()).await.expect("run completes");

    // Per-row failures never abort the pass.
    assert_eq!(report.outcome, RunOutcome::Completed);
    for row in runner.roster().snapshot() {
        assert_eq!(row.email_status, SendStatus::Failed);
        assert_eq!(row.error.as_deref(), Some("Network error"));
        assert_eq!(row.sms_status, None);
    }
}

#[tokio::test]
async fn empty_email_template_is_rejected_before_the_run() {
    let client = ScriptedClient::new();
    let runner = CampaignRunner::new(roster(2), client.clone());

    let err = runner
        .run(&RunConfig::new("").with_pacing(Duration::ZERO))
        .await
        .expect_err("invalid config");

    assert!(matches!(
        err,
        RunError::InvalidConfig {
            field: "email_template_id",
            ..
        }
    ));
    assert!(client.email_calls().is_empty());
    assert!(!runner.is_running());
    for row in runner.roster().snapshot() {
        assert_eq!(row.email_status, SendStatus::Pending);
    }
}

#[tokio::test]
async fn failover_without_sms_template_is_rejected() {
    let client = ScriptedClient::new();
    let runner = CampaignRunner::new(roster(1), client);

    let mut config = config();
    config.enable_sms_failover = true;

    let err = runner.run(&config).await.expect_err("invalid config");
    assert!(matches!(
        err,
        RunError::InvalidConfig {
            field: "sms_template_id",
            ..
        }
    ));
}

#[tokio::test]
async fn second_start_while_running_is_rejected() {
    let client = ScriptedClient::new();
    let gate = client.gate_email_call(1);

    let runner = Arc::new(CampaignRunner::new(roster(2), client));
    let handle = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move { runner.run(&config()).await })
    };

    gate.reached.notified().await;
    assert!(runner.is_running());
    let err = runner.run(&config()).await.expect_err("already running");
    assert!(matches!(err, RunError::AlreadyRunning));

    gate.release.notify_one();
    let report = handle.await.expect("task joins").expect("first run finishes");
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(!runner.is_running());
}

#[tokio::test]
async fn empty_roster_is_a_completed_noop() {
    let client = ScriptedClient::new();
    let runner = CampaignRunner::new(Roster::new(), client.clone());

    let report = runner.run(&config()).await.expect("run completes");

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.processed, 0);
    assert_eq!(report.summary, StatusSummary::default());
    assert!(client.email_calls().is_empty());

    let progress = *runner.progress().borrow();
    assert!(!progress.running);
    assert!((progress.percent - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn rerun_reprocesses_rows_and_clears_stale_errors() {
    let client = ScriptedClient::new();
    client.script_emails([Scripted::Status(SendStatus::Failed, "Invalid email address")]);

    let runner = CampaignRunner::new(roster(1), client.clone());
    runner.run(&config()).await.expect("first run");

    let rows = runner.roster().snapshot();
    assert_eq!(rows[0].email_status, SendStatus::Failed);
    assert!(rows[0].error.is_some());

    // The script is exhausted, so the second pass succeeds.
    runner.run(&config()).await.expect("second run");
    let rows = runner.roster().snapshot();
    assert_eq!(rows[0].email_status, SendStatus::Success);
    assert!(rows[0].email_sent_at.is_some());
    assert_eq!(rows[0].error, None);
}

#[tokio::test]
async fn email_requests_carry_the_row_data() {
    let client = ScriptedClient::new();
    let runner = CampaignRunner::new(roster(1), client.clone());
    runner.run(&config()).await.expect("run completes");

    let calls = client.email_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].template_id, "email-1");
    assert_eq!(calls[0].recipient_email, "user0@example.com");
    assert_eq!(
        calls[0].variables.get("name").map(String::as_str),
        Some("Recipient 0")
    );
    assert_eq!(calls[0].variables.len(), 3);
}

#[tokio::test]
async fn progress_reports_completion() {
    let client = ScriptedClient::new();
    let runner = CampaignRunner::new(roster(4), client);
    let progress = runner.progress();

    runner.run(&config()).await.expect("run completes");

    let last = *progress.borrow();
    assert!(!last.running);
    assert_eq!(last.current_index, 4);
    assert_eq!(last.total, 4);
    assert!((last.percent - 100.0).abs() < f64::EPSILON);
}
