use crate::error::CostReportError;
use crate::time_range::MonthRange;
use crate::timeout::with_timeout;
use async_trait::async_trait;

use rusoto_ce::{
    CostExplorer, CostExplorerClient, GetCostAndUsageRequest, GetCostAndUsageResponse,
    GroupDefinition,
};
use std::time::Duration;
use tracing::info;

const GRANULARITY: &str = "MONTHLY";
const METRICS: [&'static str; 1] = ["BlendedCost"];
const GROUP_TYPE: &str = "DIMENSION";
const GROUP_KEY: &str = "SERVICE";

#[async_trait]
pub trait CostQuery: Send + Sync {
    async fn monthly_costs_by_service(
        &self,
        range: &MonthRange,
    ) -> Result<GetCostAndUsageResponse, CostReportError>;
}

pub struct CostExplorerQuery {
    client: CostExplorerClient,
    timeout: Duration,
}

#[async_trait]
impl CostQuery for CostExplorerQuery {
    async fn monthly_costs_by_service(
        &self,
        range: &MonthRange,
    ) -> Result<GetCostAndUsageResponse, CostReportError> {
        let mut response = self.fetch_page(range, None).await?;
        let mut next_page_token = response.next_page_token.take();
        while let Some(token) = next_page_token {
            info!("fetching next Cost Explorer page");
            let mut page = self.fetch_page(range, Some(token)).await?;
            next_page_token = page.next_page_token.take();
            if let Some(results) = page.results_by_time.take() {
                response
                    .results_by_time
                    .get_or_insert_with(Vec::new)
                    .extend(results);
            }
        }
        Ok(response)
    }
}

impl CostExplorerQuery {
    pub fn new_with_client(client: CostExplorerClient, timeout: Duration) -> Self {
        CostExplorerQuery { client, timeout }
    }

    async fn fetch_page(
        &self,
        range: &MonthRange,
        next_page_token: Option<String>,
    ) -> Result<GetCostAndUsageResponse, CostReportError> {
        let request = GetCostAndUsageRequest {
            time_period: range.to_date_interval(),
            granularity: GRANULARITY.to_string(),
            metrics: METRICS.iter().map(|metric| metric.to_string()).collect(),
            group_by: Some(vec![GroupDefinition {
                type_: Some(GROUP_TYPE.to_string()),
                key: Some(GROUP_KEY.to_string()),
            }]),
            next_page_token,
            ..Default::default()
        };
        with_timeout("GetCostAndUsage", self.timeout, async {
            Ok(self.client.get_cost_and_usage(request).await?)
        })
        .await
    }
}
