use crate::error::CostReportError;
use crate::time_range::{ReportingZone, DEFAULT_UTC_OFFSET_HOURS, DEFAULT_ZONE_LABEL};
use crate::timeout::DEFAULT_CALL_TIMEOUT;
use config::{Config as ConfigBuilder, Environment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const REPORT_ACCOUNTS: &str = "REPORT_ACCOUNTS";
pub const SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";

pub const DEFAULT_KEY_PREFIX: &str = "cost-reports/monthly";

/// One linked account the aggregator reads from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountConfig {
    pub account_id: String,
    pub alias: String,
    pub bucket: String,
}

/// Raw environment values; variable names are matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnvValues {
    report_accounts: Option<String>,
    sns_topic_arn: Option<String>,
    report_utc_offset_hours: i32,
    report_timezone_label: String,
    report_key_prefix: String,
    aws_call_timeout_secs: u64,
    s3_bucket_name: Option<String>,
    account_id: Option<String>,
}

impl Default for EnvValues {
    fn default() -> Self {
        EnvValues {
            report_accounts: None,
            sns_topic_arn: None,
            report_utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            report_timezone_label: DEFAULT_ZONE_LABEL.to_string(),
            report_key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            aws_call_timeout_secs: DEFAULT_CALL_TIMEOUT.as_secs(),
            s3_bucket_name: None,
            account_id: None,
        }
    }
}

impl EnvValues {
    fn load(environment: Environment) -> Result<Self, CostReportError> {
        let values = ConfigBuilder::builder()
            .add_source(ConfigBuilder::try_from(&EnvValues::default())?)
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        Ok(values)
    }

    fn settings(&self) -> Result<ReportSettings, CostReportError> {
        Ok(ReportSettings {
            zone: ReportingZone::from_hours(
                self.report_utc_offset_hours,
                &self.report_timezone_label,
            )?,
            key_prefix: self.report_key_prefix.trim_end_matches('/').to_string(),
            call_timeout: Duration::from_secs(self.aws_call_timeout_secs),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Settings shared by both functions.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub zone: ReportingZone,
    pub key_prefix: String,
    pub call_timeout: Duration,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            zone: ReportingZone::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    pub accounts: Vec<AccountConfig>,
    pub topic_arn: String,
    pub settings: ReportSettings,
}

impl AggregatorConfig {
    pub fn from_env() -> Result<Self, CostReportError> {
        Self::from_environment(Environment::default())
    }

    pub fn from_environment(environment: Environment) -> Result<Self, CostReportError> {
        let values = EnvValues::load(environment)?;
        let raw_accounts = non_empty(&values.report_accounts)
            .ok_or_else(|| CostReportError::MissingConfig(REPORT_ACCOUNTS.to_string()))?;
        let accounts: Vec<AccountConfig> =
            serde_json::from_str(&raw_accounts).map_err(|error| CostReportError::InvalidConfig {
                key: REPORT_ACCOUNTS.to_string(),
                reason: error.to_string(),
            })?;
        if accounts.is_empty() {
            return Err(CostReportError::InvalidConfig {
                key: REPORT_ACCOUNTS.to_string(),
                reason: "account list is empty".to_string(),
            });
        }
        Ok(AggregatorConfig {
            accounts,
            topic_arn: non_empty(&values.sns_topic_arn)
                .ok_or_else(|| CostReportError::MissingConfig(SNS_TOPIC_ARN.to_string()))?,
            settings: values.settings()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectorConfig {
    /// Resolved through the caller identity when absent.
    pub account_id: Option<String>,
    /// Defaults to `cost-data-{account_id}`.
    pub bucket: Option<String>,
    pub settings: ReportSettings,
}

impl CollectorConfig {
    pub fn from_env() -> Result<Self, CostReportError> {
        Self::from_environment(Environment::default())
    }

    pub fn from_environment(environment: Environment) -> Result<Self, CostReportError> {
        let values = EnvValues::load(environment)?;
        Ok(CollectorConfig {
            account_id: non_empty(&values.account_id),
            bucket: non_empty(&values.s3_bucket_name),
            settings: values.settings()?,
        })
    }

    pub fn bucket_for(&self, account_id: &str) -> String {
        self.bucket
            .clone()
            .unwrap_or_else(|| format!("cost-data-{}", account_id))
    }
}
