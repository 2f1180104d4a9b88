//! Column role detection.
//!
//! Ingested data has no required schema; which column carries the recipient
//! address is a best-effort guess. Detection is a pluggable strategy so the
//! heuristics stay testable in isolation and a deployment with a known
//! schema can pin the mapping outright.

use regex::Regex;

use crate::row::RecipientRow;

/// Resolved column roles for a roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    /// Column carrying the recipient email address, if any.
    pub email: Option<String>,
    /// Column carrying the recipient phone number, if any.
    pub phone: Option<String>,
}

impl ColumnMap {
    /// The row's email address, or an empty string when no column maps to
    /// the email role or the cell is missing.
    #[must_use]
    pub fn email_value(&self, row: &RecipientRow) -> String {
        self.value_of(self.email.as_deref(), row)
    }

    /// The row's phone number, with the same empty-string fallback.
    #[must_use]
    pub fn phone_value(&self, row: &RecipientRow) -> String {
        self.value_of(self.phone.as_deref(), row)
    }

    fn value_of(&self, column: Option<&str>, row: &RecipientRow) -> String {
        column
            .and_then(|name| row.field(name))
            .unwrap_or_default()
            .to_string()
    }
}

/// Strategy for resolving column roles from headers and sample rows.
pub trait ColumnDetector: Send + Sync {
    fn detect(&self, headers: &[String], sample: &[RecipientRow]) -> ColumnMap;
}

/// Fixed mapping for deployments that know their schema.
#[derive(Debug, Clone)]
pub struct FixedColumns(pub ColumnMap);

impl ColumnDetector for FixedColumns {
    fn detect(&self, _headers: &[String], _sample: &[RecipientRow]) -> ColumnMap {
        self.0.clone()
    }
}

/// Default detection heuristics.
///
/// Header names win: a column literally named like an email or phone column
/// takes the role. Otherwise the values of the first few rows are sniffed —
/// a column whose values look like email addresses (or like phone numbers:
/// at least seven digits once separators are stripped) takes the role.
#[derive(Debug)]
pub struct HeuristicDetector {
    sample_limit: usize,
    email_header: Regex,
    phone_header: Regex,
    email_value: Regex,
}

impl Default for HeuristicDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicDetector {
    /// The number of rows value sniffing inspects.
    pub const DEFAULT_SAMPLE_LIMIT: usize = 20;

    #[must_use]
    #[allow(
        clippy::missing_panics_doc,
        clippy::unwrap_used,
        reason = "The patterns are fixed and valid"
    )]
    pub fn new() -> Self {
        Self {
            sample_limit: Self::DEFAULT_SAMPLE_LIMIT,
            email_header: Regex::new(r"(?i)^(email|e-mail|mail)$").unwrap(),
            phone_header: Regex::new(r"(?i)^(phone|mobile|msisdn|contact|tel|telephone)$")
                .unwrap(),
            email_value: Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap(),
        }
    }

    fn sniff_email(&self, headers: &[String], sample: &[RecipientRow]) -> Option<String> {
        headers
            .iter()
            .find(|header| {
                sample.iter().any(|row| {
                    row.field(header)
                        .is_some_and(|value| self.email_value.is_match(value.trim()))
                })
            })
            .cloned()
    }

    fn sniff_phone(headers: &[String], sample: &[RecipientRow]) -> Option<String> {
        headers
            .iter()
            .find(|header| {
                sample.iter().any(|row| {
                    row.field(header).is_some_and(|value| {
                        let digits: String = value
                            .chars()
                            .filter(|c| c.is_ascii_digit() || *c == '+')
                            .collect();
                        digits.len() >= 7
                    })
                })
            })
            .cloned()
    }
}

impl ColumnDetector for HeuristicDetector {
    fn detect(&self, headers: &[String], sample: &[RecipientRow]) -> ColumnMap {
        let sample = &sample[..sample.len().min(self.sample_limit)];

        let email = headers
            .iter()
            .find(|header| self.email_header.is_match(header))
            .cloned()
            .or_else(|| self.sniff_email(headers, sample));

        let phone = headers
            .iter()
            .find(|header| self.phone_header.is_match(header))
            .cloned()
            .or_else(|| Self::sniff_phone(headers, sample));

        ColumnMap { email, phone }
    }
}

#[cfg(test)]
mod tests {
    use ahash::AHashMap;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::row::RowId;

    fn sample(rows: &[&[(&str, &str)]]) -> Vec<RecipientRow> {
        rows.iter()
            .map(|fields| {
                let fields = fields
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect::<AHashMap<_, _>>();
                RecipientRow::new(RowId::generate(), fields)
            })
            .collect()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn header_names_take_priority() {
        let detector = HeuristicDetector::new();
        let map = detector.detect(
            &headers(&["Name", "E-Mail", "Mobile"]),
            &sample(&[&[("Name", "Ada"), ("E-Mail", "x"), ("Mobile", "y")]]),
        );
        assert_eq!(map.email.as_deref(), Some("E-Mail"));
        assert_eq!(map.phone.as_deref(), Some("Mobile"));
    }

    #[test]
    fn values_are_sniffed_when_headers_do_not_match() {
        let detector = HeuristicDetector::new();
        let map = detector.detect(
            &headers(&["name", "primary_address", "cell"]),
            &sample(&[
                &[("name", "Ada"), ("primary_address", ""), ("cell", "n/a")],
                &[
                    ("name", "Grace"),
                    ("primary_address", "grace@example.com"),
                    ("cell", "+1 (555) 010-2030"),
                ],
            ]),
        );
        assert_eq!(map.email.as_deref(), Some("primary_address"));
        assert_eq!(map.phone.as_deref(), Some("cell"));
    }

    #[test]
    fn no_plausible_column_maps_to_none() {
        let detector = HeuristicDetector::new();
        let map = detector.detect(
            &headers(&["name", "city"]),
            &sample(&[&[("name", "Ada"), ("city", "London")]]),
        );
        assert_eq!(map, ColumnMap::default());
    }

    #[test]
    fn unmapped_roles_dispatch_as_empty_strings() {
        let map = ColumnMap::default();
        let rows = sample(&[&[("name", "Ada")]]);
        assert_eq!(map.email_value(&rows[0]), "");
        assert_eq!(map.phone_value(&rows[0]), "");
    }

    #[test]
    fn fixed_columns_ignore_the_data() {
        let fixed = FixedColumns(ColumnMap {
            email: Some("contact_email".to_string()),
            phone: None,
        });
        let map = fixed.detect(&headers(&["a", "b"]), &[]);
        assert_eq!(map.email.as_deref(), Some("contact_email"));
        assert_eq!(map.phone, None);
    }
}
