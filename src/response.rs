use crate::amount::to_f64;
use crate::error::CostReportError;
use crate::summary::{AggregationResult, RankedAccount, RankedService};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

pub const CURRENCY: &str = "USD";

/// Value handed back to the Lambda runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn success<T: Serialize>(payload: &T) -> Result<Self, CostReportError> {
        Ok(InvocationResponse {
            status_code: 200,
            body: serde_json::to_string(payload)?,
        })
    }

    pub fn failure(error: &str, message: &str) -> Self {
        InvocationResponse {
            status_code: 500,
            body: json!({ "error": error, "message": message }).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionBody {
    pub message: String,
    pub account_id: String,
    pub month: String,
    pub file_created: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub account_id: String,
    pub alias: String,
    pub cost: f64,
    pub percentage: f64,
    pub display_name: String,
}

impl AccountSummary {
    fn try_from_ranked(account: &RankedAccount) -> Result<Self, CostReportError> {
        Ok(AccountSummary {
            account_id: account.account_id.clone(),
            alias: account.alias.clone(),
            cost: to_f64(&account.cost)?,
            percentage: to_f64(&account.percentage)?,
            display_name: account.display_name(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    pub service: String,
    pub cost: f64,
    pub percentage: f64,
}

impl ServiceSummary {
    fn try_from_ranked(service: &RankedService) -> Result<Self, CostReportError> {
        Ok(ServiceSummary {
            service: service.service.clone(),
            cost: to_f64(&service.cost)?,
            percentage: to_f64(&service.percentage)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub total_accounts: usize,
    pub active_accounts: usize,
    pub currency: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AccountCostData {
    pub alias: String,
    pub total: f64,
    pub services: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DataSummary {
    pub total_accounts: usize,
    pub active_accounts: usize,
    pub top_service: String,
    pub currency: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AggregationData {
    pub total_cost: f64,
    pub month: String,
    pub generated_at: String,
    pub timezone: String,
    pub account_costs: BTreeMap<String, AccountCostData>,
    pub service_costs: BTreeMap<String, f64>,
    pub summary: DataSummary,
}

#[derive(Debug, Serialize)]
pub struct AggregationBody {
    pub message: String,
    pub total_cost: f64,
    pub month: String,
    pub generated_at: String,
    pub account_summary: Vec<AccountSummary>,
    pub top_services: Vec<ServiceSummary>,
    pub summary: RunSummary,
    pub data: AggregationData,
}

/// When and where an aggregation ran, for the serialized body.
pub struct RunContext {
    pub month: String,
    pub generated_at: String,
    pub generated_at_rfc3339: String,
    pub timezone: String,
    pub total_accounts: usize,
    pub top_services: usize,
}

impl AggregationBody {
    pub fn build(
        message: &str,
        result: &AggregationResult,
        context: RunContext,
    ) -> Result<Self, CostReportError> {
        let active_accounts = result.active_accounts();
        let account_summary = result
            .ranked_accounts()
            .iter()
            .map(AccountSummary::try_from_ranked)
            .collect::<Result<Vec<_>, _>>()?;
        let top_services = result
            .ranked_services(context.top_services)
            .iter()
            .map(ServiceSummary::try_from_ranked)
            .collect::<Result<Vec<_>, _>>()?;

        let mut account_costs = BTreeMap::new();
        for (account_id, account) in &result.account_costs {
            account_costs.insert(
                account_id.clone(),
                AccountCostData {
                    alias: account.alias.clone(),
                    total: to_f64(&account.total)?,
                    services: to_f64_map(&account.services)?,
                    error: account.error.clone(),
                },
            );
        }

        let total_cost = to_f64(&result.total_cost)?;
        Ok(AggregationBody {
            message: message.to_string(),
            total_cost,
            month: context.month.clone(),
            generated_at: context.generated_at,
            account_summary,
            top_services,
            summary: RunSummary {
                total_accounts: context.total_accounts,
                active_accounts,
                currency: CURRENCY,
            },
            data: AggregationData {
                total_cost,
                month: context.month,
                generated_at: context.generated_at_rfc3339,
                timezone: context.timezone,
                account_costs,
                service_costs: to_f64_map(&result.service_costs)?,
                summary: DataSummary {
                    total_accounts: context.total_accounts,
                    active_accounts,
                    top_service: result.top_service().unwrap_or("None").to_string(),
                    currency: CURRENCY,
                },
            },
        })
    }
}

fn to_f64_map(amounts: &BTreeMap<String, BigDecimal>) -> Result<BTreeMap<String, f64>, CostReportError> {
    amounts
        .iter()
        .map(|(name, amount)| Ok((name.clone(), to_f64(amount)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::response::InvocationResponse;
    use serde_json::Value;

    #[tokio::test]
    async fn test_failure_body() {
        let response = InvocationResponse::failure("access denied", "Cost data aggregation failed");
        assert_eq!(response.status_code, 500);

        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["error"], "access denied");
        assert_eq!(body["message"], "Cost data aggregation failed");
    }

    #[tokio::test]
    async fn test_status_code_field_name() {
        let response = InvocationResponse::success(&vec![1, 2]).unwrap();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"], "[1,2]");
    }
}
