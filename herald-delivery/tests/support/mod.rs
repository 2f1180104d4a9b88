//! Scripted delivery client for deterministic orchestration tests.
#![allow(dead_code, reason = "Test utility module - not all helpers used in every test")]

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;

use herald_common::{DeliveryOutcome, SendStatus};
use herald_delivery::{ClientError, DeliveryClient, EmailRequest, SmsRequest};

/// One scripted response.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// The provider answered with this classification and message.
    Status(SendStatus, &'static str),
    /// The call failed in transit.
    NetworkError,
}

impl Scripted {
    fn into_result(self) -> Result<DeliveryOutcome, ClientError> {
        match self {
            Self::Status(status, message) => Ok(DeliveryOutcome {
                row_id: "scripted".to_string(),
                success: status.is_success(),
                status,
                message: message.to_string(),
                timestamp: Utc::now(),
            }),
            Self::NetworkError => Err(ClientError::MissingData(
                "scripted network failure".to_string(),
            )),
        }
    }
}

/// Pauses the Nth email call until the test releases it, so cancellation
/// can be requested while that call is deterministically in flight.
pub struct GateControl {
    pub reached: Arc<Notify>,
    pub release: Arc<Notify>,
}

struct Gate {
    after_email_calls: usize,
    reached: Arc<Notify>,
    release: Arc<Notify>,
}

/// A [`DeliveryClient`] that replays scripted outcomes in call order and
/// records every request it receives. Calls beyond the script succeed.
#[derive(Default)]
pub struct ScriptedClient {
    email_script: Mutex<VecDeque<Scripted>>,
    sms_script: Mutex<VecDeque<Scripted>>,
    email_calls: Mutex<Vec<EmailRequest>>,
    sms_calls: Mutex<Vec<SmsRequest>>,
    gate: Mutex<Option<Gate>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_emails(&self, script: impl IntoIterator<Item = Scripted>) {
        self.email_script.lock().extend(script);
    }

    pub fn script_sms(&self, script: impl IntoIterator<Item = Scripted>) {
        self.sms_script.lock().extend(script);
    }

    /// Install a gate pausing the Nth (1-based) email call.
    pub fn gate_email_call(&self, after_email_calls: usize) -> GateControl {
        let reached = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock() = Some(Gate {
            after_email_calls,
            reached: Arc::clone(&reached),
            release: Arc::clone(&release),
        });
        GateControl { reached, release }
    }

    pub fn email_calls(&self) -> Vec<EmailRequest> {
        self.email_calls.lock().clone()
    }

    pub fn sms_calls(&self) -> Vec<SmsRequest> {
        self.sms_calls.lock().clone()
    }
}

#[async_trait]
impl DeliveryClient for ScriptedClient {
    async fn send_email(&self, request: &EmailRequest) -> Result<DeliveryOutcome, ClientError> {
        let call_index = {
            let mut calls = self.email_calls.lock();
            calls.push(request.clone());
            calls.len()
        };

        let scripted = self
            .email_script
            .lock()
            .pop_front()
            .unwrap_or(Scripted::Status(
                SendStatus::Success,
                "Email sent successfully",
            ));

        let pause = {
            let gate = self.gate.lock();
            gate.as_ref().and_then(|gate| {
                (gate.after_email_calls == call_index)
                    .then(|| (Arc::clone(&gate.reached), Arc::clone(&gate.release)))
            })
        };
        if let Some((reached, release)) = pause {
            reached.notify_one();
            release.notified().await;
        }

        scripted.into_result()
    }

    async fn send_sms(&self, request: &SmsRequest) -> Result<DeliveryOutcome, ClientError> {
        self.sms_calls.lock().push(request.clone());

        let scripted = self
            .sms_script
            .lock()
            .pop_front()
            .unwrap_or(Scripted::Status(
                SendStatus::SmsSent,
                "SMS sent successfully",
            ));

        scripted.into_result()
    }
}
