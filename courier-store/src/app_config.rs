use courier_booking::lifecycle::ExpiryWindows;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Reservations that would strand less than this are rejected.
    pub capacity_floor_kg: f64,
    pub standard_expiry_hours: i64,
    pub urgent_expiry_hours: i64,
    pub express_expiry_hours: i64,
    #[serde(default = "default_retry_attempts")]
    pub tx_retry_attempts: u32,
    #[serde(default = "default_lock_timeout_ms")]
    pub tx_lock_timeout_ms: u64,
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_lock_timeout_ms() -> u64 {
    2_000
}

impl BusinessRules {
    pub fn expiry_windows(&self) -> ExpiryWindows {
        ExpiryWindows {
            standard_hours: self.standard_expiry_hours,
            urgent_hours: self.urgent_expiry_hours,
            express_hours: self.express_expiry_hours,
        }
    }
}

impl Default for BusinessRules {
    fn default() -> Self {
        let windows = ExpiryWindows::default();
        Self {
            capacity_floor_kg: 0.5,
            standard_expiry_hours: windows.standard_hours,
            urgent_expiry_hours: windows.urgent_hours,
            express_expiry_hours: windows.express_hours,
            tx_retry_attempts: default_retry_attempts(),
            tx_lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // E.g. COURIER__SERVER__PORT=8080
            .add_source(config::Environment::with_prefix("COURIER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_sane() {
        let rules = BusinessRules::default();
        assert!(rules.capacity_floor_kg > 0.0);
        let windows = rules.expiry_windows();
        assert!(windows.express_hours < windows.urgent_hours);
        assert!(windows.urgent_hours < windows.standard_hours);
    }
}
