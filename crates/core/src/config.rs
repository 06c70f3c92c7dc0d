use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).map(|v| v.to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_UDP_PAYLOAD: usize = 65_507;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub telemetry: TelemetryConfig,
    pub report: ReportConfig,
    pub rules: RulesConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `GRIDWATCH_PROFILE` env var. When set (e.g. `SITE_A`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("GRIDWATCH_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            telemetry: TelemetryConfig::from_env_profiled(p),
            report: ReportConfig::from_env_profiled(p),
            rules: RulesConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  telemetry:   listen={}, device_id_field={}, max_datagram={}",
            self.telemetry.listen_addr,
            self.telemetry.device_id_field,
            self.telemetry.max_datagram_bytes
        );
        tracing::info!(
            "  report:      period={}ms, bind={}, destination={}",
            self.report.period_ms,
            self.report.bind_addr,
            self.report.destination
        );
        tracing::info!(
            "  rules:       file={}, watch={}",
            self.rules.path.display(),
            self.rules.watch
        );
    }
}

// ── Telemetry ingress ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub listen_addr: String,
    /// Key under which every record carries its integer device id.
    pub device_id_field: String,
    pub max_datagram_bytes: usize,
}

impl TelemetryConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            listen_addr: profiled_env_or(p, "TELEMETRY_LISTEN_ADDR", "0.0.0.0:5005"),
            device_id_field: profiled_env_or(p, "DEVICE_ID_FIELD", "deviceId"),
            max_datagram_bytes: profiled_env_usize(p, "TELEMETRY_MAX_DATAGRAM", MAX_UDP_PAYLOAD)
                .clamp(1, MAX_UDP_PAYLOAD),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5005".to_string(),
            device_id_field: "deviceId".to_string(),
            max_datagram_bytes: MAX_UDP_PAYLOAD,
        }
    }
}

// ── Report egress ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub period_ms: u64,
    pub bind_addr: String,
    pub destination: String,
}

impl ReportConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            period_ms: profiled_env_u64(p, "REPORT_PERIOD_MS", 500).max(1),
            bind_addr: profiled_env_or(p, "REPORT_BIND_ADDR", "0.0.0.0:0"),
            destination: profiled_env_or(p, "REPORT_DESTINATION", "255.255.255.255:5006"),
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            period_ms: 500,
            bind_addr: "0.0.0.0:0".to_string(),
            destination: "255.255.255.255:5006".to_string(),
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub path: PathBuf,
    /// Reload the rules file when it changes on disk.
    pub watch: bool,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            path: PathBuf::from(profiled_env_or(p, "RULES_FILE", "config/rules.yml")),
            watch: profiled_env_bool(p, "RULES_WATCH", true),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("config/rules.yml"),
            watch: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.profile_label(), "default");
        assert_eq!(config.telemetry.device_id_field, "deviceId");
        assert_eq!(config.report.period(), Duration::from_millis(500));
        assert_eq!(config.report.destination, "255.255.255.255:5006");
        assert!(config.rules.watch);
    }

    #[test]
    fn profiled_lookup_prefers_prefixed_key() {
        // Keys are unique to this test so parallel tests cannot interfere.
        env::set_var("GWTEST_REPORT_PERIOD_MS", "250");
        assert_eq!(profiled_env_u64("GWTEST", "REPORT_PERIOD_MS", 500), 250);
        assert_eq!(profiled_env_u64("GWTEST", "REPORT_PERIOD_MS_MISSING", 500), 500);
        env::remove_var("GWTEST_REPORT_PERIOD_MS");
    }

    #[test]
    fn bool_values_fall_back_on_garbage() {
        env::set_var("GWBOOL_RULES_WATCH", "off");
        assert!(!profiled_env_bool("GWBOOL", "RULES_WATCH", true));
        env::set_var("GWBOOL_RULES_WATCH", "maybe");
        assert!(profiled_env_bool("GWBOOL", "RULES_WATCH", true));
        assert!(!profiled_env_bool("GWBOOL", "RULES_WATCH", false));
        env::remove_var("GWBOOL_RULES_WATCH");
    }
}
