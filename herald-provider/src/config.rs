use serde::Deserialize;

const fn default_email_failed_ratio() -> f64 {
    0.1
}

const fn default_email_bounced_ratio() -> f64 {
    0.1
}

const fn default_sms_failed_ratio() -> f64 {
    0.1
}

const fn default_email_delay_min_ms() -> u64 {
    500
}

const fn default_email_delay_max_ms() -> u64 {
    1500
}

const fn default_sms_delay_min_ms() -> u64 {
    300
}

const fn default_sms_delay_max_ms() -> u64 {
    800
}

fn default_listen_address() -> String {
    "127.0.0.1:3002".to_string()
}

/// Outcome simulation knobs.
///
/// The ratios carve up the unit interval: a roll below `email_failed_ratio`
/// fails, one below `email_failed_ratio + email_bounced_ratio` bounces, and
/// everything else succeeds. A real provider's outcome vocabulary maps onto
/// the same three buckets.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationProfile {
    /// Fraction of email sends that are rejected outright.
    #[serde(default = "default_email_failed_ratio")]
    pub email_failed_ratio: f64,

    /// Fraction of email sends that bounce.
    #[serde(default = "default_email_bounced_ratio")]
    pub email_bounced_ratio: f64,

    /// Fraction of SMS sends that are rejected.
    #[serde(default = "default_sms_failed_ratio")]
    pub sms_failed_ratio: f64,

    /// Minimum simulated email latency (milliseconds).
    #[serde(default = "default_email_delay_min_ms")]
    pub email_delay_min_ms: u64,

    /// Maximum simulated email latency (milliseconds).
    #[serde(default = "default_email_delay_max_ms")]
    pub email_delay_max_ms: u64,

    /// Minimum simulated SMS latency (milliseconds).
    #[serde(default = "default_sms_delay_min_ms")]
    pub sms_delay_min_ms: u64,

    /// Maximum simulated SMS latency (milliseconds).
    #[serde(default = "default_sms_delay_max_ms")]
    pub sms_delay_max_ms: u64,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            email_failed_ratio: default_email_failed_ratio(),
            email_bounced_ratio: default_email_bounced_ratio(),
            sms_failed_ratio: default_sms_failed_ratio(),
            email_delay_min_ms: default_email_delay_min_ms(),
            email_delay_max_ms: default_email_delay_max_ms(),
            sms_delay_min_ms: default_sms_delay_min_ms(),
            sms_delay_max_ms: default_sms_delay_max_ms(),
        }
    }
}

impl SimulationProfile {
    /// A profile with no failures and no latency, for tests and demos.
    #[must_use]
    pub const fn deterministic() -> Self {
        Self {
            email_failed_ratio: 0.0,
            email_bounced_ratio: 0.0,
            sms_failed_ratio: 0.0,
            email_delay_min_ms: 0,
            email_delay_max_ms: 0,
            sms_delay_min_ms: 0,
            sms_delay_max_ms: 0,
        }
    }
}

/// Mock provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Socket address to listen on. Port 0 picks an ephemeral port.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default)]
    pub simulation: SimulationProfile,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            simulation: SimulationProfile::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_the_reference_simulation() {
        let profile = SimulationProfile::default();
        assert!((profile.email_failed_ratio - 0.1).abs() < f64::EPSILON);
        assert!((profile.email_bounced_ratio - 0.1).abs() < f64::EPSILON);
        assert_eq!(profile.email_delay_min_ms, 500);
        assert_eq!(profile.email_delay_max_ms, 1500);
        assert_eq!(profile.sms_delay_min_ms, 300);
        assert_eq!(profile.sms_delay_max_ms, 800);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"simulation": {"email_failed_ratio": 0.5}}"#)
                .expect("valid config");
        assert_eq!(config.listen_address, "127.0.0.1:3002");
        assert!((config.simulation.email_failed_ratio - 0.5).abs() < f64::EPSILON);
        assert!((config.simulation.email_bounced_ratio - 0.1).abs() < f64::EPSILON);
    }
}
