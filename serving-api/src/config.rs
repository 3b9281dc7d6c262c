//! Configuration module

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default upload / JSON body limit: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: IpAddr,

    /// Server port
    pub port: u16,

    /// Fitted scaler artifact (JSON)
    pub scaler_path: String,

    /// Fitted classifier artifact (JSON)
    pub model_path: String,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,

    /// Emit logs as JSON lines
    pub json_logs: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            scaler_path: env::var("SCALER_PATH")
                .unwrap_or_else(|_| "models/scaler.json".to_string()),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/classifier.json".to_string()),

            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),

            json_logs: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            scaler_path: "models/scaler.json".to_string(),
            model_path: "models/classifier.json".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            json_logs: false,
            environment: "development".to_string(),
        }
    }
}
