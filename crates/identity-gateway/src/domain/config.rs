//! Gateway configuration with validation.
//!
//! Loaded from an optional JSON file, then overridden from the environment.

use crate::interceptors::retry::parse_code;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG_PATH";

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Service name used in logs and metric names
    pub service_name: String,
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Session token configuration
    pub session: SessionConfig,
    /// One bus topic per write operation
    pub topics: TopicsConfig,
    /// Message bus connection
    pub kafka: KafkaConfig,
    /// Query service endpoints
    pub query: QueryConfig,
    /// Outbound retry policy
    pub retry: RetryConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            service_name: "identity_gateway".to_string(),
            http: HttpConfig::default(),
            session: SessionConfig::default(),
            topics: TopicsConfig::default(),
            kafka: KafkaConfig::default(),
            query: QueryConfig::default(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Read a JSON config file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `GATEWAY_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("GATEWAY_HTTP_PORT").and_then(|p| p.parse().ok()) {
            self.http.port = port;
        }
        if let Some(brokers) = lookup("GATEWAY_KAFKA_BROKERS") {
            self.kafka.brokers = brokers
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(addr) = lookup("GATEWAY_QUERY_SERVICE_ADDR") {
            self.query.set_all(&addr);
        }
        if let Some(secret) = lookup("GATEWAY_JWT_SECRET") {
            self.session.jwt_secret = secret;
        }
        if let Some(debug) = lookup("GATEWAY_DEBUG_ERRORS") {
            self.http.debug_errors_response = matches!(debug.as_str(), "1" | "true" | "TRUE");
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        if !self.http.base_path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.http.base_path.clone()));
        }
        for path in [
            &self.http.users_path,
            &self.http.groups_path,
            &self.http.memberships_path,
            &self.http.auth_path,
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
        }

        if let Some((name, _)) = self.topics.entries().into_iter().find(|(_, t)| t.is_empty()) {
            return Err(ConfigError::InvalidTopic(name.to_string()));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_attempts cannot be 0".into(),
            ));
        }
        if let Some(code) = self.retry.retry_codes.iter().find(|c| parse_code(c).is_none()) {
            return Err(ConfigError::InvalidRetry(format!("unknown status code {code}")));
        }

        if self.query.call_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "query call timeout cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: IpAddr,
    /// Port (default: 5001)
    pub port: u16,
    /// Prefix of every entity route
    pub base_path: String,
    pub users_path: String,
    pub groups_path: String,
    pub memberships_path: String,
    pub auth_path: String,
    /// Include raw internal error text in error bodies
    pub debug_errors_response: bool,
    /// Paths the request logger skips
    pub ignore_log_urls: Vec<String>,
    /// Upper bound on handling one request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 5001,
            base_path: "/api/v1".to_string(),
            users_path: "/users".to_string(),
            groups_path: "/groups".to_string(),
            memberships_path: "/memberships".to_string(),
            auth_path: "/auth".to_string(),
            debug_errors_response: false,
            ignore_log_urls: vec!["/metrics".to_string(), "/health".to_string()],
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Shared HMAC secret. Required.
    pub jwt_secret: String,
    pub user_lifetime_hours: u64,
    pub integration_lifetime_hours: u64,
    /// Lifetime for any other session type
    pub default_lifetime_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            user_lifetime_hours: 1,
            integration_lifetime_hours: 4380,
            default_lifetime_hours: 1,
        }
    }
}

/// Bus topic per write operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicsConfig {
    pub user_create: String,
    pub user_update: String,
    pub user_delete: String,
    pub group_create: String,
    pub group_update: String,
    pub group_delete: String,
    pub membership_create: String,
    pub membership_update: String,
    pub membership_delete: String,
    pub token_blacklist: String,
    pub password_update: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            user_create: "userCreate".to_string(),
            user_update: "userUpdate".to_string(),
            user_delete: "userDelete".to_string(),
            group_create: "groupCreate".to_string(),
            group_update: "groupUpdate".to_string(),
            group_delete: "groupDelete".to_string(),
            membership_create: "membershipCreate".to_string(),
            membership_update: "membershipUpdate".to_string(),
            membership_delete: "membershipDelete".to_string(),
            token_blacklist: "tokenBlacklist".to_string(),
            password_update: "passwordUpdate".to_string(),
        }
    }
}

impl TopicsConfig {
    fn entries(&self) -> [(&'static str, &str); 11] {
        [
            ("user_create", &self.user_create),
            ("user_update", &self.user_update),
            ("user_delete", &self.user_delete),
            ("group_create", &self.group_create),
            ("group_update", &self.group_update),
            ("group_delete", &self.group_delete),
            ("membership_create", &self.membership_create),
            ("membership_update", &self.membership_update),
            ("membership_delete", &self.membership_delete),
            ("token_blacklist", &self.token_blacklist),
            ("password_update", &self.password_update),
        ]
    }
}

/// Message bus connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub client_id: String,
    #[serde(with = "humantime_serde")]
    pub publish_timeout: Duration,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            client_id: "identity-gateway".to_string(),
            publish_timeout: Duration::from_secs(5),
        }
    }
}

/// Query service endpoints, one connection per service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub users_addr: String,
    pub groups_addr: String,
    pub memberships_addr: String,
    pub auth_addr: String,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Per-attempt deadline
    #[serde(with = "humantime_serde")]
    pub call_timeout: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let addr = "http://localhost:5003".to_string();
        Self {
            users_addr: addr.clone(),
            groups_addr: addr.clone(),
            memberships_addr: addr.clone(),
            auth_addr: addr,
            connect_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(10),
        }
    }
}

impl QueryConfig {
    /// Point every service at the same address.
    pub fn set_all(&mut self, addr: &str) {
        self.users_addr = addr.to_string();
        self.groups_addr = addr.to_string();
        self.memberships_addr = addr.to_string();
        self.auth_addr = addr.to_string();
    }
}

/// Outbound retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Linear backoff unit; attempt n waits n * backoff
    #[serde(with = "humantime_serde")]
    pub backoff: Duration,
    /// Status codes treated as transient, by name ("NotFound", "Aborted", ...)
    pub retry_codes: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(100),
            retry_codes: vec!["NotFound".to_string(), "Aborted".to_string()],
        }
    }
}

/// Log output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Filter used when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("session.jwt_secret must be set")]
    MissingSecret,
    #[error("invalid route path: {0}")]
    InvalidPath(String),
    #[error("empty topic name for {0}")]
    InvalidTopic(String),
    #[error("invalid retry policy: {0}")]
    InvalidRetry(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("cannot read config: {0}")]
    Io(String),
    #[error("cannot parse config: {0}")]
    Parse(String),
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() != 0 {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        } else {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            let m = mins.trim().parse::<u64>().map_err(|_| "invalid minutes")?;
            m.checked_mul(60)
                .map(Duration::from_secs)
                .ok_or("minutes out of range")
        } else {
            // Plain number = seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
