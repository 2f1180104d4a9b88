//! Canned template catalogs served by the mock provider.

use herald_common::{EmailTemplate, SmsTemplate};

/// The built-in email templates.
#[must_use]
pub fn email_catalog() -> Vec<EmailTemplate> {
    vec![
        EmailTemplate {
            id: "email-1".to_string(),
            name: "Welcome Email".to_string(),
            subject: "Welcome aboard, {{name}}!".to_string(),
            content: "Hello {{name}}, welcome! We're excited to have you on board.".to_string(),
        },
        EmailTemplate {
            id: "email-2".to_string(),
            name: "Newsletter".to_string(),
            subject: "Monthly newsletter - {{company}}".to_string(),
            content: "Hi {{name}} from {{company}}, here's your monthly update.".to_string(),
        },
        EmailTemplate {
            id: "email-3".to_string(),
            name: "Product Update".to_string(),
            subject: "New features available - {{role}}".to_string(),
            content: "Dear {{name}}, as a {{role}}, you'll be interested in our latest features."
                .to_string(),
        },
    ]
}

/// The built-in SMS templates.
#[must_use]
pub fn sms_catalog() -> Vec<SmsTemplate> {
    vec![
        SmsTemplate {
            id: "sms-1".to_string(),
            name: "Welcome SMS".to_string(),
            content: "Welcome {{name}}! Your account is ready. Reply STOP to unsubscribe."
                .to_string(),
        },
        SmsTemplate {
            id: "sms-2".to_string(),
            name: "Alert SMS".to_string(),
            content: "Hi {{name}}, important update. Call us at {{phone}} for details."
                .to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let emails = email_catalog();
        let mut ids: Vec<_> = emails.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), emails.len());

        let sms = sms_catalog();
        assert_eq!(sms.len(), 2);
    }
}
