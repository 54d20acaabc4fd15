use anyhow::Context;
use chrono::Utc;
use cost_report_notifier::collector::{Collector, COLLECTION_FAILED};
use cost_report_notifier::config::CollectorConfig;
use cost_report_notifier::cost_explorer::CostExplorerQuery;
use cost_report_notifier::identity::StsCallerIdentity;
use cost_report_notifier::logging::init_tracing;
use cost_report_notifier::response::InvocationResponse;
use cost_report_notifier::storage::S3ReportStore;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use rusoto_ce::CostExplorerClient;
use rusoto_core::Region;
use rusoto_s3::S3Client;
use rusoto_sts::StsClient;
use serde_json::Value;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    run(service_fn(collect_handler)).await
}

async fn collect_handler(_: LambdaEvent<Value>) -> Result<InvocationResponse, Error> {
    let config = match CollectorConfig::from_env().context("loading collector configuration") {
        Ok(config) => config,
        Err(err) => {
            error!("{:#}", err);
            return Ok(InvocationResponse::failure(&format!("{:#}", err), COLLECTION_FAILED));
        }
    };
    let timeout = config.settings.call_timeout;

    // Cost Explorer is only served from us-east-1.
    let costs =
        CostExplorerQuery::new_with_client(CostExplorerClient::new(Region::UsEast1), timeout);
    let store = S3ReportStore::new_with_client(S3Client::new(Region::default()), timeout);
    let identity = StsCallerIdentity::new_with_client(StsClient::new(Region::default()), timeout);

    let collector = Collector::new(config, costs, store, identity);
    Ok(collector.run(Utc::now()).await)
}
