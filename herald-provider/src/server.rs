//! Mock provider HTTP server.

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Json, Router, extract::State, routing::get, routing::post};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use herald_common::{ApiResponse, DeliveryOutcome, SendStatus, Signal};

use crate::{
    config::{ProviderConfig, SimulationProfile},
    error::ProviderError,
    templates,
};

/// The mock delivery provider.
///
/// Binds on construction so callers can read the actual address before
/// serving (port 0 picks an ephemeral port, which the test suites rely on).
#[derive(Debug)]
pub struct ProviderServer {
    listener: TcpListener,
    router: Router,
}

impl ProviderServer {
    /// Bind the provider to its configured address.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Bind`] if the address cannot be bound.
    pub async fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let listener =
            TcpListener::bind(&config.listen_address)
                .await
                .map_err(|e| ProviderError::Bind {
                    address: config.listen_address.clone(),
                    source: e,
                })?;

        info!(address = %config.listen_address, "Mock provider bound");

        let profile = Arc::new(config.simulation);
        let router = Router::new()
            .route("/health", get(health))
            .route("/email-templates", get(email_templates))
            .route("/sms-templates", get(sms_templates))
            .route("/send-email", post(send_email))
            .route("/send-sms", post(send_sms))
            .with_state(profile);

        Ok(Self { listener, router })
    }

    /// The address the provider is listening on.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Server`] if the socket address cannot be
    /// read back.
    pub fn local_addr(&self) -> Result<SocketAddr, ProviderError> {
        self.listener
            .local_addr()
            .map_err(|e| ProviderError::Server(e.to_string()))
    }

    /// Serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Server`] if the server loop fails.
    pub async fn serve(
        self,
        mut shutdown: tokio::sync::broadcast::Receiver<Signal>,
    ) -> Result<(), ProviderError> {
        info!("Mock provider starting");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("Mock provider received shutdown signal");
            })
            .await
            .map_err(|e| ProviderError::Server(e.to_string()))?;

        info!("Mock provider stopped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        timestamp: Utc::now(),
    })
}

async fn email_templates() -> Json<ApiResponse<Vec<herald_common::EmailTemplate>>> {
    Json(ApiResponse::ok(templates::email_catalog()))
}

async fn sms_templates() -> Json<ApiResponse<Vec<herald_common::SmsTemplate>>> {
    Json(ApiResponse::ok(templates::sms_catalog()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code, reason = "The mock accepts the full contract but renders nothing")]
struct SendEmailRequest {
    template_id: String,
    recipient_email: String,
    #[serde(default)]
    variables: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code, reason = "The mock accepts the full contract but renders nothing")]
struct SendSmsRequest {
    template_id: String,
    recipient_phone: String,
    #[serde(default)]
    variables: HashMap<String, String>,
}

fn sample_delay(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms == 0 || max_ms < min_ms {
        return Duration::ZERO;
    }
    let millis = {
        let mut rng = rand::rng();
        rng.random_range(min_ms..=max_ms)
    };
    Duration::from_millis(millis)
}

fn outcome(status: SendStatus, message: &str) -> ApiResponse<DeliveryOutcome> {
    let success = status.is_success();
    ApiResponse {
        success,
        data: Some(DeliveryOutcome {
            row_id: format!("row-{}", ulid::Ulid::new()),
            success,
            status,
            message: message.to_string(),
            timestamp: Utc::now(),
        }),
        error: None,
        message: None,
    }
}

async fn send_email(
    State(profile): State<Arc<SimulationProfile>>,
    Json(_request): Json<SendEmailRequest>,
) -> Json<ApiResponse<DeliveryOutcome>> {
    let delay = sample_delay(profile.email_delay_min_ms, profile.email_delay_max_ms);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let roll: f64 = {
        let mut rng = rand::rng();
        rng.random()
    };

    let response = if roll < profile.email_failed_ratio {
        outcome(SendStatus::Failed, "Invalid email address")
    } else if roll < profile.email_failed_ratio + profile.email_bounced_ratio {
        outcome(
            SendStatus::Bounced,
            "Email bounced - recipient mailbox full",
        )
    } else {
        outcome(SendStatus::Success, "Email sent successfully")
    };

    Json(response)
}

async fn send_sms(
    State(profile): State<Arc<SimulationProfile>>,
    Json(_request): Json<SendSmsRequest>,
) -> Json<ApiResponse<DeliveryOutcome>> {
    let delay = sample_delay(profile.sms_delay_min_ms, profile.sms_delay_max_ms);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let roll: f64 = {
        let mut rng = rand::rng();
        rng.random()
    };

    let response = if roll < profile.sms_failed_ratio {
        outcome(SendStatus::Failed, "Invalid phone number")
    } else {
        outcome(SendStatus::SmsSent, "SMS sent successfully")
    };

    Json(response)
}
