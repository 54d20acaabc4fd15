use crate::amount::parse_amount;
use crate::error::CostReportError;
use crate::time_range::MonthRange;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset};
use rusoto_ce::GetCostAndUsageResponse;
use serde::{Deserialize, Serialize};

pub const BLENDED_COST: &str = "BlendedCost";
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Envelope written by the collector around the raw Cost Explorer response.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CostReport {
    pub account_id: String,
    pub generated_at: String,
    pub month: String,
    pub monthly_costs: GetCostAndUsageResponse,
}

impl CostReport {
    pub fn parse(body: &str) -> Result<Self, CostReportError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Every `(service, amount)` group of every time bucket, in report order.
    pub fn service_amounts(&self) -> Result<Vec<(String, BigDecimal)>, CostReportError> {
        let mut amounts = Vec::new();
        let results = self.monthly_costs.results_by_time.as_deref().unwrap_or(&[]);
        for result in results {
            for group in result.groups.as_deref().unwrap_or(&[]) {
                let service = group
                    .keys
                    .as_ref()
                    .and_then(|keys| keys.first())
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_SERVICE.to_string());
                let amount = group
                    .metrics
                    .as_ref()
                    .and_then(|metrics| metrics.get(BLENDED_COST))
                    .and_then(|metric| metric.amount.as_deref())
                    .ok_or_else(|| CostReportError::MissingMetric(service.clone()))?;
                amounts.push((service, parse_amount(amount)?));
            }
        }
        Ok(amounts)
    }
}

/// `{prefix}/{account}_{YYYYMMDD_HHMMSS}.json`
pub fn report_key(prefix: &str, account_id: &str, generated_at: &DateTime<FixedOffset>) -> String {
    format!(
        "{}/{}_{}.json",
        prefix,
        account_id,
        key_timestamp(generated_at)
    )
}

pub fn key_timestamp(generated_at: &DateTime<FixedOffset>) -> String {
    generated_at.format("%Y%m%d_%H%M%S").to_string()
}

/// `{prefix}/{account}_{YYYYMM}`, matching every report key of that month.
pub fn month_prefix(prefix: &str, account_id: &str, range: &MonthRange) -> String {
    format!("{}/{}_{}", prefix, account_id, range.compact_label())
}
