//! The service descriptor.

use serde::{Deserialize, Serialize};

/// Stable identifier of a service, the primary key for every status lookup.
pub type ServiceId = String;

/// Polling cadence used when a registry entry omits one: every five
/// minutes between 06:00 and 21:59 local time.
pub const DEFAULT_SCHEDULE: &str = "*/5 6-21 * * *";

/// One externally-owned system being monitored.
///
/// Immutable once the registry is loaded; shared as `Arc<Service>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Absolute URL probed for health.
    pub health_check_url: String,
    /// Absolute URL queried for the deployed version.
    #[serde(alias = "version_url")]
    pub version_check_url: String,
    /// 5-field cron expression (`minute hour day month weekday`).
    #[serde(alias = "ping_cron", default = "default_schedule")]
    pub schedule: String,
}

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_field_names_are_accepted() {
        let yaml = r#"
id: billing
name: Billing
description: Invoices
health_check_url: https://billing.example.com/health
version_url: https://billing.example.com/version
ping_cron: "*/10 * * * *"
"#;
        let service: Service = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(service.version_check_url, "https://billing.example.com/version");
        assert_eq!(service.schedule, "*/10 * * * *");
    }

    #[test]
    fn schedule_defaults_when_absent() {
        let yaml = r#"
id: billing
name: Billing
health_check_url: https://billing.example.com/health
version_check_url: https://billing.example.com/version
"#;
        let service: Service = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(service.schedule, DEFAULT_SCHEDULE);
        assert!(service.description.is_empty());
    }
}
