use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Page size for incremental activity fetches. The poll cycle never paginates
/// beyond the first page; the watermark picks up the remainder next tick.
pub const ACTIVITY_PAGE_SIZE: u32 = 100;

/// Operator-enforced bounds for the activity poll interval (seconds).
pub const MIN_ACTIVITY_INTERVAL_SECS: u64 = 10;
pub const MAX_ACTIVITY_INTERVAL_SECS: u64 = 3600;

/// Operator-enforced bounds for the SLA deadline poll interval (seconds).
pub const MIN_DEADLINE_INTERVAL_SECS: u64 = 3600;
pub const MAX_DEADLINE_INTERVAL_SECS: u64 = 86_400;

/// Top-level config (huntrelay.toml + HUNTRELAY_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HuntrelayConfig {
    pub tracker: TrackerConfig,
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub sla: SlaConfig,
}

/// Credentials and endpoint for the bug-bounty tracker API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// API token identifier (basic-auth username).
    pub api_identifier: String,
    /// API token secret (basic-auth password).
    pub api_token: String,
    /// Program handle whose activities and reports are polled.
    pub program: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Where notifications are delivered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeliveryConfig {
    /// Incoming-webhook endpoint of the chat system. The channel id of each
    /// subscription is sent in the payload, so one URL serves all channels.
    pub webhook_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Intervals for the two recurring poll tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_activity_interval")]
    pub activity_interval_secs: u64,
    #[serde(default = "default_deadline_interval")]
    pub deadline_interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            activity_interval_secs: default_activity_interval(),
            deadline_interval_secs: default_deadline_interval(),
        }
    }
}

/// Day thresholds for the three SLA deadline categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    /// Days a `new` report may sit untriaged.
    #[serde(default = "default_sla_days")]
    pub new_days: u32,
    /// Days a triaged report may wait for a bounty.
    #[serde(default = "default_sla_days")]
    pub bounty_days: u32,
    /// Days a triaged, bounty-awarded report may stay unresolved.
    #[serde(default = "default_sla_days")]
    pub triaged_days: u32,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            new_days: default_sla_days(),
            bounty_days: default_sla_days(),
            triaged_days: default_sla_days(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.hackerone.com/v1/".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.huntrelay/huntrelay.db", home)
}
fn default_activity_interval() -> u64 {
    60
}
fn default_deadline_interval() -> u64 {
    3600
}
fn default_sla_days() -> u32 {
    14
}

impl HuntrelayConfig {
    /// Load config from a TOML file with HUNTRELAY_* env var overrides.
    ///
    /// Env keys use `__` as the section separator so snake_case fields stay
    /// addressable, e.g. `HUNTRELAY_POLL__ACTIVITY_INTERVAL_SECS=120`.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.huntrelay/huntrelay.toml
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: HuntrelayConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("HUNTRELAY_").split("__"))
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values before anything is wired up. Nothing is
    /// partially applied: the first bad field fails the whole load.
    pub fn validate(&self) -> Result<()> {
        let a = self.poll.activity_interval_secs;
        if !(MIN_ACTIVITY_INTERVAL_SECS..=MAX_ACTIVITY_INTERVAL_SECS).contains(&a) {
            return Err(CoreError::InvalidConfig(format!(
                "activity_interval_secs must be within {MIN_ACTIVITY_INTERVAL_SECS}..={MAX_ACTIVITY_INTERVAL_SECS}, got {a}"
            )));
        }
        let d = self.poll.deadline_interval_secs;
        if !(MIN_DEADLINE_INTERVAL_SECS..=MAX_DEADLINE_INTERVAL_SECS).contains(&d) {
            return Err(CoreError::InvalidConfig(format!(
                "deadline_interval_secs must be within {MIN_DEADLINE_INTERVAL_SECS}..={MAX_DEADLINE_INTERVAL_SECS}, got {d}"
            )));
        }
        for (name, days) in [
            ("sla.new_days", self.sla.new_days),
            ("sla.bounty_days", self.sla.bounty_days),
            ("sla.triaged_days", self.sla.triaged_days),
        ] {
            if days < 1 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be at least 1, got {days}"
                )));
            }
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.huntrelay/huntrelay.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> HuntrelayConfig {
        HuntrelayConfig::default()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn activity_interval_bounds() {
        let mut cfg = valid();
        cfg.poll.activity_interval_secs = 9;
        assert!(cfg.validate().is_err());
        cfg.poll.activity_interval_secs = 3601;
        assert!(cfg.validate().is_err());
        cfg.poll.activity_interval_secs = 10;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deadline_interval_bounds() {
        let mut cfg = valid();
        cfg.poll.deadline_interval_secs = 3599;
        assert!(cfg.validate().is_err());
        cfg.poll.deadline_interval_secs = 86_401;
        assert!(cfg.validate().is_err());
        cfg.poll.deadline_interval_secs = 86_400;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn sla_days_must_be_positive() {
        let mut cfg = valid();
        cfg.sla.bounty_days = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_overrides_reach_snake_case_fields() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "huntrelay.toml",
                r#"
                [tracker]
                api_identifier = "id-from-toml"
                api_token = "token-from-toml"
                program = "program-from-toml"

                [delivery]
                webhook_url = "https://toml.example/hook"
                "#,
            )?;
            jail.set_env("HUNTRELAY_TRACKER__PROGRAM", "program-from-env");
            jail.set_env("HUNTRELAY_TRACKER__API_IDENTIFIER", "id-from-env");
            jail.set_env("HUNTRELAY_DELIVERY__WEBHOOK_URL", "https://env.example/hook");
            jail.set_env("HUNTRELAY_DATABASE__PATH", "/tmp/huntrelay-test.db");
            jail.set_env("HUNTRELAY_POLL__ACTIVITY_INTERVAL_SECS", "120");
            jail.set_env("HUNTRELAY_POLL__DEADLINE_INTERVAL_SECS", "7200");
            jail.set_env("HUNTRELAY_SLA__BOUNTY_DAYS", "7");

            let config = HuntrelayConfig::load(Some("huntrelay.toml"))
                .map_err(|e| figment::Error::from(e.to_string()))?;

            // Single-word and snake_case leaves both take the env value.
            assert_eq!(config.tracker.program, "program-from-env");
            assert_eq!(config.tracker.api_identifier, "id-from-env");
            assert_eq!(config.delivery.webhook_url, "https://env.example/hook");
            assert_eq!(config.database.path, "/tmp/huntrelay-test.db");
            assert_eq!(config.poll.activity_interval_secs, 120);
            assert_eq!(config.poll.deadline_interval_secs, 7200);
            assert_eq!(config.sla.bounty_days, 7);
            // Fields without an override keep their TOML value.
            assert_eq!(config.tracker.api_token, "token-from-toml");
            Ok(())
        });
    }
}
