//! Template catalog types served by the provider.

use serde::{Deserialize, Serialize};

/// An email template as listed by `GET /email-templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub content: String,
}

/// An SMS template as listed by `GET /sms-templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsTemplate {
    pub id: String,
    pub name: String,
    pub content: String,
}
