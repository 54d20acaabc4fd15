use crate::amount::format_usd;
use crate::config::{AccountConfig, AggregatorConfig};
use crate::error::CostReportError;
use crate::message::{Notification, SummaryContent, NOTIFICATION_TOP_N};
use crate::notifier::Notify;
use crate::report::{month_prefix, CostReport};
use crate::response::{AggregationBody, InvocationResponse, RunContext};
use crate::storage::{latest_object, ReportStore};
use crate::summary::{AccountOutcome, AccountSpend, AggregationResult};
use crate::time_range::{MonthRange, ReportingZone};
use chrono::{DateTime, FixedOffset, Utc};
use std::convert::TryFrom;
use tracing::{error, info, warn};

const LOG_TOP_SERVICES: usize = 10;
const ACCOUNT_LOG_TOP_SERVICES: usize = 3;

pub const AGGREGATION_SUCCEEDED: &str = "Cost data aggregation completed";
pub const AGGREGATION_FAILED: &str = "Cost data aggregation failed";

/// Reads every linked account's latest report for the month and publishes
/// the combined summary.
pub struct Aggregator<S, N> {
    config: AggregatorConfig,
    store: S,
    notifier: N,
}

impl<S: ReportStore, N: Notify> Aggregator<S, N> {
    pub fn new(config: AggregatorConfig, store: S, notifier: N) -> Self {
        Aggregator {
            config,
            store,
            notifier,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> InvocationResponse {
        let local = self.config.settings.zone.localize(now);
        match self.try_run(&local).await {
            Ok(response) => response,
            Err(error) => {
                error!("cost aggregation failed: {}", error);
                report_failure(
                    &self.notifier,
                    &self.config.settings.zone,
                    now,
                    &error.to_string(),
                )
                .await
            }
        }
    }

    async fn try_run(
        &self,
        local: &DateTime<FixedOffset>,
    ) -> Result<InvocationResponse, CostReportError> {
        let zone = &self.config.settings.zone;
        let range = MonthRange::try_from(*local)?;
        let generated_at = zone.format_local(local);
        info!(
            month = %range.month_label(),
            generated_at = %generated_at,
            "aggregating cost reports"
        );

        let result = self.aggregate(&range).await;
        self.log_summary(&result, &range);

        let body = AggregationBody::build(
            AGGREGATION_SUCCEEDED,
            &result,
            RunContext {
                month: range.compact_label(),
                generated_at: generated_at.clone(),
                generated_at_rfc3339: local.to_rfc3339(),
                timezone: zone.describe(),
                total_accounts: self.config.accounts.len(),
                top_services: NOTIFICATION_TOP_N,
            },
        )?;
        let response = InvocationResponse::success(&body)?;

        self.send_summary(&result, &range, &generated_at).await;
        Ok(response)
    }

    pub async fn aggregate(&self, range: &MonthRange) -> AggregationResult {
        let mut outcomes = Vec::with_capacity(self.config.accounts.len());
        for account in &self.config.accounts {
            let outcome = self.fetch_account(account, range).await;
            outcomes.push((account, outcome));
        }
        AggregationResult::from_outcomes(outcomes)
    }

    /// Never fails: anything going wrong for one account becomes `Unavailable`.
    pub async fn fetch_account(&self, account: &AccountConfig, range: &MonthRange) -> AccountOutcome {
        info!(
            account_id = %account.account_id,
            alias = %account.alias,
            "fetching cost data"
        );
        match self.load_latest_spend(account, range).await {
            Ok(spend) => {
                info!(
                    account_id = %account.account_id,
                    "account {} total {}",
                    account.alias,
                    format_usd(&spend.total)
                );
                for (service, cost) in spend.top_services(ACCOUNT_LOG_TOP_SERVICES) {
                    info!("  {}: {}", service, format_usd(cost));
                }
                AccountOutcome::Reported(spend)
            }
            Err(error) => {
                warn!(
                    account_id = %account.account_id,
                    "cost data unavailable for {}: {}",
                    account.alias,
                    error
                );
                AccountOutcome::Unavailable(error.to_string())
            }
        }
    }

    async fn load_latest_spend(
        &self,
        account: &AccountConfig,
        range: &MonthRange,
    ) -> Result<AccountSpend, CostReportError> {
        let prefix = month_prefix(&self.config.settings.key_prefix, &account.account_id, range);
        let objects = self.store.list_reports(&account.bucket, &prefix).await?;
        let latest =
            latest_object(&objects).ok_or_else(|| CostReportError::NoReportFound(prefix.clone()))?;
        info!(
            key = %latest.key,
            last_modified = %latest.last_modified.to_rfc3339(),
            "latest report selected"
        );

        let body = self.store.get_report(&account.bucket, &latest.key).await?;
        let report = CostReport::parse(&body)?;
        AccountSpend::from_report(latest.key.clone(), &report)
    }

    fn log_summary(&self, result: &AggregationResult, range: &MonthRange) {
        info!(
            "total {} for {} across {} active accounts",
            format_usd(&result.total_cost),
            range.month_label(),
            result.active_accounts()
        );
        for (rank, account) in result.ranked_accounts().iter().enumerate() {
            info!(
                "account #{} {}: {} ({}%)",
                rank + 1,
                account.display_name(),
                format_usd(&account.cost),
                account.percentage
            );
        }
        for (rank, service) in result.ranked_services(LOG_TOP_SERVICES).iter().enumerate() {
            info!(
                "service #{} {}: {} ({}%)",
                rank + 1,
                service.service,
                format_usd(&service.cost),
                service.percentage
            );
        }
    }

    async fn send_summary(&self, result: &AggregationResult, range: &MonthRange, generated_at: &str) {
        let accounts = result.ranked_accounts();
        let services = result.ranked_services(NOTIFICATION_TOP_N);
        let month_label = range.month_label();
        let notification = Notification::summary(&SummaryContent {
            month_label: &month_label,
            total_cost: &result.total_cost,
            active_accounts: accounts.len(),
            generated_at,
            accounts: &accounts,
            services: &services,
        });

        match self
            .notifier
            .publish(&notification.subject, &notification.body)
            .await
        {
            Ok(message_id) => info!(message_id = %message_id, "cost report notification sent"),
            Err(error) => error!("cost report notification failed: {}", error),
        }
    }
}

/// Best-effort failure notification followed by the error response.
pub async fn report_failure<N: Notify + ?Sized>(
    notifier: &N,
    zone: &ReportingZone,
    now: DateTime<Utc>,
    error: &str,
) -> InvocationResponse {
    let local = zone.localize(now);
    let notification = Notification::failure(
        error,
        &zone.format_local(&local),
        &local.format("%Y-%m-%d %H:%M").to_string(),
    );
    match notifier
        .publish(&notification.subject, &notification.body)
        .await
    {
        Ok(_) => info!("failure notification sent"),
        Err(publish_error) => error!("failure notification failed: {}", publish_error),
    }
    InvocationResponse::failure(error, AGGREGATION_FAILED)
}
