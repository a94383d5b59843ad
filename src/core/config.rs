use crate::cloudtrail::model::ReadWriteType;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Error while loading or validating the remediation config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TRAIL_NAME env var is empty")]
    MissingTrailName,
}

pub const ENV_TRAIL_NAME: &str = "TRAIL_NAME";
pub const ENV_HOME_REGION: &str = "HOME_REGION";
pub const ENV_IS_MULTI_REGION_TRAIL: &str = "IS_MULTI_REGION_TRAIL";
pub const ENV_LOG_BUCKET_NAME: &str = "LOG_BUCKET_NAME";
pub const ENV_KMS_KEY_ID: &str = "KMS_KEY_ID";
pub const ENV_S3_DATA_EVENT_ARNS: &str = "S3_DATA_EVENT_ARNS";
pub const ENV_LAMBDA_DATA_EVENT_ARNS: &str = "LAMBDA_DATA_EVENT_ARNS";
pub const ENV_DATA_EVENT_READ_WRITE_TYPE: &str = "DATA_EVENT_READ_WRITE_TYPE";

/// Process-wide remediation settings, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationConfig {
    /// Name or ARN of the protected trail.
    pub trail_name: String,
    /// Region the trail lives in; empty means the SDK default region.
    pub home_region: String,
    pub is_multi_region_trail: bool,
    /// Log destination bucket reapplied on `UpdateTrail`.
    pub log_bucket_name: Option<String>,
    /// KMS key reapplied on `UpdateTrail`.
    pub kms_key_id: Option<String>,
    /// Bucket ARNs whose objects get data-event capture.
    pub s3_data_event_arns: Vec<String>,
    /// Function ARNs that get data-event capture.
    pub lambda_data_event_arns: Vec<String>,
    pub data_event_read_write_type: ReadWriteType,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            trail_name: String::new(),
            home_region: String::new(),
            is_multi_region_trail: true,
            log_bucket_name: None,
            kms_key_id: None,
            s3_data_event_arns: Vec::new(),
            lambda_data_event_arns: Vec::new(),
            data_event_read_write_type: ReadWriteType::All,
        }
    }
}

impl RemediationConfig {
    /// Reads the config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (env-shaped keys).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            trail_name: lookup(ENV_TRAIL_NAME).unwrap_or_default(),
            home_region: lookup(ENV_HOME_REGION).unwrap_or_default(),
            is_multi_region_trail: lookup(ENV_IS_MULTI_REGION_TRAIL)
                .map(|value| value.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            log_bucket_name: non_empty(lookup(ENV_LOG_BUCKET_NAME)),
            kms_key_id: non_empty(lookup(ENV_KMS_KEY_ID)),
            s3_data_event_arns: lookup(ENV_S3_DATA_EVENT_ARNS)
                .map(|raw| parse_arn_list(&raw))
                .unwrap_or_default(),
            lambda_data_event_arns: lookup(ENV_LAMBDA_DATA_EVENT_ARNS)
                .map(|raw| parse_arn_list(&raw))
                .unwrap_or_default(),
            data_event_read_write_type: ReadWriteType::parse_or_default(
                lookup(ENV_DATA_EVENT_READ_WRITE_TYPE).as_deref(),
            ),
        }
    }

    /// Loads a config file from TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents)?;
        Ok(raw.into())
    }

    /// Fails when the trail name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trail_name.is_empty() {
            return Err(ConfigError::MissingTrailName);
        }
        Ok(())
    }

    pub fn has_data_events(&self) -> bool {
        self.s3_data_event_arns
            .iter()
            .chain(self.lambda_data_event_arns.iter())
            .any(|arn| !arn.trim().is_empty())
    }
}

/// File layout of the config; list and mode fields are kept loose so a bad
/// value degrades instead of failing the load.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    trail_name: Option<String>,
    home_region: Option<String>,
    is_multi_region_trail: Option<bool>,
    log_bucket_name: Option<String>,
    kms_key_id: Option<String>,
    s3_data_event_arns: Option<Value>,
    lambda_data_event_arns: Option<Value>,
    data_event_read_write_type: Option<Value>,
}

impl From<RawConfig> for RemediationConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            trail_name: raw.trail_name.unwrap_or_default(),
            home_region: raw.home_region.unwrap_or_default(),
            is_multi_region_trail: raw.is_multi_region_trail.unwrap_or(true),
            log_bucket_name: non_empty(raw.log_bucket_name),
            kms_key_id: non_empty(raw.kms_key_id),
            s3_data_event_arns: raw
                .s3_data_event_arns
                .as_ref()
                .map(arn_list_from_value)
                .unwrap_or_default(),
            lambda_data_event_arns: raw
                .lambda_data_event_arns
                .as_ref()
                .map(arn_list_from_value)
                .unwrap_or_default(),
            data_event_read_write_type: ReadWriteType::parse_or_default(
                raw.data_event_read_write_type
                    .as_ref()
                    .and_then(Value::as_str),
            ),
        }
    }
}

/// Parses a JSON list of ARNs. Invalid JSON or a non-list value yields an
/// empty list; non-string entries are dropped.
pub fn parse_arn_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => arn_list_from_value(&value),
        Err(_) => Vec::new(),
    }
}

/// Extracts string entries from an already-decoded list value.
pub fn arn_list_from_value(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
