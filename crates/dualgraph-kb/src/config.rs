//! Configuration for dualgraph ingestion
//!
//! Values come from defaults, then a `.env` file if present, then the process
//! environment. Invalid numeric values are logged and ignored.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use tracing::{info, warn};

use crate::data::CoreError;
use crate::projection::ProjectionLimits;

/// Account and pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document API endpoint of the account
    #[serde(default)]
    pub cosmos_endpoint: Option<String>,

    /// Document database holding the flat records
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Container inside `database_name`
    #[serde(default = "default_container_name")]
    pub container_name: String,

    /// Partition key path of the container
    #[serde(default = "default_partition_key")]
    pub partition_key: String,

    /// Gremlin HTTP endpoint; in-memory stores are used when absent
    #[serde(default)]
    pub gremlin_endpoint: Option<String>,

    #[serde(default = "default_database_name")]
    pub gremlin_database: String,

    #[serde(default = "default_container_name")]
    pub gremlin_collection: String,

    /// Timeout in seconds for Gremlin requests
    #[serde(default = "default_gremlin_timeout")]
    pub gremlin_timeout_secs: u64,

    #[serde(default = "default_max_depth")]
    pub projection_max_depth: usize,

    #[serde(default = "default_max_keys")]
    pub projection_max_keys: usize,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_name() -> String {
    "knowledge".to_string()
}

fn default_container_name() -> String {
    "documents".to_string()
}

fn default_partition_key() -> String {
    "/pk".to_string()
}

fn default_gremlin_timeout() -> u64 {
    30
}

fn default_max_depth() -> usize {
    ProjectionLimits::default().max_depth
}

fn default_max_keys() -> usize {
    ProjectionLimits::default().max_keys
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A pair of settings that must name the same account resource but don't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMismatch {
    pub document_setting: &'static str,
    pub document_value: String,
    pub graph_setting: &'static str,
    pub graph_value: String,
}

impl fmt::Display for ConfigMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} does not match {}={}",
            self.document_setting, self.document_value, self.graph_setting, self.graph_value
        )
    }
}

impl AppConfig {
    /// Load configuration from `.env` and environment variables
    pub fn load() -> Result<Self, CoreError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Log level to install before the full configuration is loaded, so
    /// warnings raised while loading are not lost.
    pub fn bootstrap_log_level<F>(lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("LOG_LEVEL")
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(default_log_level)
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("COSMOS_ENDPOINT") {
            config.cosmos_endpoint = Some(endpoint);
        }

        if let Some(database) = lookup("DATABASE_NAME") {
            config.database_name = database;
        }

        if let Some(container) = lookup("CONTAINER_NAME") {
            config.container_name = container;
        }

        if let Some(partition_key) = lookup("PARTITION_KEY") {
            config.partition_key = partition_key;
        }

        if let Some(endpoint) = lookup("GREMLIN_ENDPOINT") {
            config.gremlin_endpoint = Some(endpoint);
        }

        if let Some(database) = lookup("GREMLIN_DATABASE") {
            config.gremlin_database = database;
        }

        if let Some(collection) = lookup("GREMLIN_COLLECTION") {
            config.gremlin_collection = collection;
        }

        if let Some(timeout) = lookup("GREMLIN_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                config.gremlin_timeout_secs = secs;
            } else {
                warn!("Invalid GREMLIN_TIMEOUT_SECS value: {}", timeout);
            }
        }

        if let Some(depth) = lookup("PROJECTION_MAX_DEPTH") {
            match depth.parse::<usize>() {
                Ok(value) if value > 0 => config.projection_max_depth = value,
                _ => warn!("Invalid PROJECTION_MAX_DEPTH value: {}", depth),
            }
        }

        if let Some(keys) = lookup("PROJECTION_MAX_KEYS") {
            if let Ok(value) = keys.parse::<usize>() {
                config.projection_max_keys = value;
            } else {
                warn!("Invalid PROJECTION_MAX_KEYS value: {}", keys);
            }
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if config.database_name.is_empty() {
            return Err(CoreError::ConfigurationError(
                "DATABASE_NAME must not be empty".to_string(),
            ));
        }

        if config.container_name.is_empty() {
            return Err(CoreError::ConfigurationError(
                "CONTAINER_NAME must not be empty".to_string(),
            ));
        }

        if config.gremlin_endpoint.is_none() {
            info!("No GREMLIN_ENDPOINT configured, graph writes stay in memory");
        }

        Ok(config)
    }

    pub fn limits(&self) -> ProjectionLimits {
        ProjectionLimits {
            max_depth: self.projection_max_depth,
            max_keys: self.projection_max_keys,
        }
    }

    /// Resource path the Gremlin API expects as its username.
    pub fn gremlin_username(&self) -> String {
        format!("/dbs/{}/colls/{}", self.gremlin_database, self.gremlin_collection)
    }

    /// Both APIs must point at the same database and container for the
    /// flat records and the graph to live side by side.
    pub fn verify_dual_api(&self) -> Vec<ConfigMismatch> {
        let mut mismatches = Vec::new();

        if self.database_name != self.gremlin_database {
            mismatches.push(ConfigMismatch {
                document_setting: "DATABASE_NAME",
                document_value: self.database_name.clone(),
                graph_setting: "GREMLIN_DATABASE",
                graph_value: self.gremlin_database.clone(),
            });
        }

        if self.container_name != self.gremlin_collection {
            mismatches.push(ConfigMismatch {
                document_setting: "CONTAINER_NAME",
                document_value: self.container_name.clone(),
                graph_setting: "GREMLIN_COLLECTION",
                graph_value: self.gremlin_collection.clone(),
            });
        }

        mismatches
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cosmos_endpoint: None,
            database_name: default_database_name(),
            container_name: default_container_name(),
            partition_key: default_partition_key(),
            gremlin_endpoint: None,
            gremlin_database: default_database_name(),
            gremlin_collection: default_container_name(),
            gremlin_timeout_secs: default_gremlin_timeout(),
            projection_max_depth: default_max_depth(),
            projection_max_keys: default_max_keys(),
            log_level: default_log_level(),
        }
    }
}
