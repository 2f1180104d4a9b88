//! Delivery client abstraction and the HTTP provider implementation.

use std::time::Duration;

use ahash::AHashMap;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};

use herald_common::{ApiResponse, DeliveryOutcome, EmailTemplate, SmsTemplate};

use crate::error::ClientError;

/// One email send, addressed from a row's data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub template_id: String,
    pub recipient_email: String,
    pub variables: AHashMap<String, String>,
}

/// One SMS send, addressed from a row's data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    pub template_id: String,
    pub recipient_phone: String,
    pub variables: AHashMap<String, String>,
}

/// Capability to send one message over a channel.
///
/// Implementations impose no retry or backoff; the orchestrator gives each
/// row exactly one attempt per channel per run, and treats any `Err` as a
/// failed attempt on that channel.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Send one templated email.
    async fn send_email(&self, request: &EmailRequest) -> Result<DeliveryOutcome, ClientError>;

    /// Send one templated SMS.
    async fn send_sms(&self, request: &SmsRequest) -> Result<DeliveryOutcome, ClientError>;
}

/// HTTP client for the templating/delivery provider.
///
/// Every request carries the provider API key as a bearer token. Latency is
/// whatever the provider takes; no timeout is applied unless one was
/// configured.
#[derive(Debug, Clone)]
pub struct HttpDeliveryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDeliveryClient {
    /// Build a client against the given provider base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the API key is not a valid
    /// header value, or [`ClientError::Transport`] if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ClientError::Configuration(format!("API key is not header-safe: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// List the provider's email templates.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or provider rejection.
    pub async fn email_templates(&self) -> Result<Vec<EmailTemplate>, ClientError> {
        self.get_catalog("email-templates").await
    }

    /// List the provider's SMS templates.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or provider rejection.
    pub async fn sms_templates(&self) -> Result<Vec<SmsTemplate>, ClientError> {
        self.get_catalog("sms-templates").await
    }

    /// Whether the provider answers its health endpoint.
    pub async fn health_check(&self) -> bool {
        match self.http.get(self.url("health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_catalog<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        let response = self.http.get(self.url(path)).send().await?;
        let envelope: ApiResponse<Vec<T>> = Self::decode(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn post_send<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<DeliveryOutcome, ClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let envelope: ApiResponse<DeliveryOutcome> = Self::decode(response).await?;
        envelope.data.ok_or_else(|| {
            ClientError::MissingData(
                envelope
                    .error
                    .or(envelope.message)
                    .unwrap_or_else(|| "empty response envelope".to_string()),
            )
        })
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiResponse<T>, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeliveryClient for HttpDeliveryClient {
    async fn send_email(&self, request: &EmailRequest) -> Result<DeliveryOutcome, ClientError> {
        self.post_send("send-email", request).await
    }

    async fn send_sms(&self, request: &SmsRequest) -> Result<DeliveryOutcome, ClientError> {
        self.post_send("send-sms", request).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn requests_serialize_camel_case() {
        let mut variables = AHashMap::new();
        variables.insert("name".to_string(), "Ada".to_string());

        let request = EmailRequest {
            template_id: "email-1".to_string(),
            recipient_email: "ada@example.com".to_string(),
            variables,
        };

        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["templateId"], "email-1");
        assert_eq!(json["recipientEmail"], "ada@example.com");
        assert_eq!(json["variables"]["name"], "Ada");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client =
            HttpDeliveryClient::new("http://localhost:3002/", "key", None).expect("valid client");
        assert_eq!(client.url("send-email"), "http://localhost:3002/send-email");
    }

    #[test]
    fn control_characters_in_api_key_are_rejected() {
        let result = HttpDeliveryClient::new("http://localhost:3002", "bad\nkey", None);
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }
}
