use crate::config::CollectorConfig;
use crate::cost_explorer::CostQuery;
use crate::error::CostReportError;
use crate::identity::CallerIdentity;
use crate::report::{key_timestamp, report_key, CostReport};
use crate::response::{CollectionBody, InvocationResponse};
use crate::storage::ReportStore;
use crate::time_range::MonthRange;
use chrono::{DateTime, Utc};
use std::convert::TryFrom;
use tracing::{error, info};

pub const COLLECTION_FAILED: &str = "Cost data collection failed";

/// Where one collector run stored its report.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub account_id: String,
    pub bucket: String,
    pub month: String,
    pub key: String,
    pub timestamp: String,
}

/// Queries this account's month-to-date costs and stores them as a new report.
pub struct Collector<Q, S, I> {
    config: CollectorConfig,
    costs: Q,
    store: S,
    identity: I,
}

impl<Q: CostQuery, S: ReportStore, I: CallerIdentity> Collector<Q, S, I> {
    pub fn new(config: CollectorConfig, costs: Q, store: S, identity: I) -> Self {
        Collector {
            config,
            costs,
            store,
            identity,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> InvocationResponse {
        let result = match self.collect(now).await {
            Ok(collection) => InvocationResponse::success(&CollectionBody {
                message: format!("{} cost data collected and stored", collection.month),
                account_id: collection.account_id,
                month: collection.month,
                file_created: collection.key,
                timestamp: collection.timestamp,
            }),
            Err(error) => Err(error),
        };
        result.unwrap_or_else(|error| {
            error!("cost collection failed: {}", error);
            InvocationResponse::failure(&error.to_string(), COLLECTION_FAILED)
        })
    }

    pub async fn collect(&self, now: DateTime<Utc>) -> Result<Collection, CostReportError> {
        let account_id = match self.config.account_id {
            Some(ref account_id) => account_id.clone(),
            None => self.identity.account_id().await?,
        };
        let bucket = self.config.bucket_for(&account_id);
        let settings = &self.config.settings;
        let local = settings.zone.localize(now);
        let range = MonthRange::try_from(local)?;
        let interval = range.to_date_interval();
        info!(
            account_id = %account_id,
            "querying {} costs ({} ~ {})",
            range.month_label(),
            interval.start,
            interval.end
        );

        let monthly_costs = self.costs.monthly_costs_by_service(&range).await?;
        let report = CostReport {
            account_id: account_id.clone(),
            generated_at: local.to_rfc3339(),
            month: range.month_label(),
            monthly_costs,
        };
        let body = serde_json::to_string_pretty(&report)?;
        let key = report_key(&settings.key_prefix, &account_id, &local);

        self.store.put_report(&bucket, &key, body).await?;
        info!("cost data stored at s3://{}/{}", bucket, key);

        Ok(Collection {
            account_id,
            bucket,
            month: report.month,
            key,
            timestamp: key_timestamp(&local),
        })
    }
}
