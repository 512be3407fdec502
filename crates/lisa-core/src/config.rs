//! lisa.toml daemon settings.
//!
//! Every section and key is optional; missing values fall back to the
//! defaults below. Durations are written as `"10s"`, `"500ms"` or `"2m"`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: ServerSettings,
    pub probe: ProbeSettings,
    pub schedule: ScheduleSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Probe timing. A probe slower than `dodgy_threshold` but inside
/// `timeout` is reported as dodgy rather than failed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSettings {
    #[serde(deserialize_with = "duration_str")]
    pub timeout: Duration,
    #[serde(deserialize_with = "duration_str")]
    pub dodgy_threshold: Duration,
    #[serde(deserialize_with = "duration_str")]
    pub version_timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            dodgy_threshold: Duration::from_secs(3),
            version_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleSettings {
    /// When false only the startup sweep runs; no recurring probes.
    pub ping_enabled: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self { ping_enabled: true }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

fn duration_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid duration {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.probe.timeout, Duration::from_secs(10));
        assert_eq!(settings.probe.dodgy_threshold, Duration::from_secs(3));
        assert!(settings.schedule.ping_enabled);
    }

    #[test]
    fn parses_all_sections() {
        let toml_str = r#"
[server]
bind = "127.0.0.1"
port = 9090

[probe]
timeout = "7s"
dodgy_threshold = "1500ms"
version_timeout = "2s"

[schedule]
ping_enabled = false
"#;
        let settings = Settings::from_toml_str(toml_str).unwrap();
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.probe.timeout, Duration::from_secs(7));
        assert_eq!(settings.probe.dodgy_threshold, Duration::from_millis(1500));
        assert_eq!(settings.probe.version_timeout, Duration::from_secs(2));
        assert!(!settings.schedule.ping_enabled);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings = Settings::from_toml_str("[probe]\ntimeout = \"5s\"\n").unwrap();
        assert_eq!(settings.probe.timeout, Duration::from_secs(5));
        assert_eq!(settings.probe.dodgy_threshold, Duration::from_secs(3));
    }

    #[test]
    fn rejects_bad_duration() {
        let err = Settings::from_toml_str("[probe]\ntimeout = \"soon\"\n").unwrap_err();
        assert!(matches!(err, CoreError::Toml(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Settings::from_toml_str("[probe]\nretries = 3\n").is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[server]\nport = 8181\n").unwrap();
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.server.port, 8181);
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("fast"), None);
    }

    #[test]
    fn parse_duration_rejects_minute_overflow() {
        let huge = format!("{}m", u64::MAX / 2);
        assert_eq!(parse_duration(&huge), None);
        let largest = u64::MAX / 60;
        assert_eq!(
            parse_duration(&format!("{largest}m")),
            Some(Duration::from_secs(largest * 60))
        );
    }
}
