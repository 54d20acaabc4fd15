use anyhow::Context;
use chrono::Utc;
use cost_report_notifier::aggregator::{report_failure, Aggregator, AGGREGATION_FAILED};
use cost_report_notifier::config::{AggregatorConfig, SNS_TOPIC_ARN};
use cost_report_notifier::logging::init_tracing;
use cost_report_notifier::notifier::SnsNotifier;
use cost_report_notifier::response::InvocationResponse;
use cost_report_notifier::storage::S3ReportStore;
use cost_report_notifier::time_range::ReportingZone;
use cost_report_notifier::timeout::DEFAULT_CALL_TIMEOUT;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use rusoto_core::Region;
use rusoto_s3::S3Client;
use rusoto_sns::SnsClient;
use serde_json::Value;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    run(service_fn(aggregate_handler)).await
}

async fn aggregate_handler(_: LambdaEvent<Value>) -> Result<InvocationResponse, Error> {
    let config = match AggregatorConfig::from_env().context("loading aggregator configuration") {
        Ok(config) => config,
        Err(err) => return Ok(config_failure(&format!("{:#}", err)).await),
    };
    let timeout = config.settings.call_timeout;

    let store = S3ReportStore::new_with_client(S3Client::new(Region::default()), timeout);
    let notifier = SnsNotifier::new_with_client(
        SnsClient::new(Region::default()),
        config.topic_arn.clone(),
        timeout,
    );

    let aggregator = Aggregator::new(config, store, notifier);
    Ok(aggregator.run(Utc::now()).await)
}

/// The account list could not be read; still tell the topic if one is known.
async fn config_failure(message: &str) -> InvocationResponse {
    error!("{}", message);
    match std::env::var(SNS_TOPIC_ARN) {
        Ok(topic_arn) if !topic_arn.is_empty() => {
            let notifier = SnsNotifier::new_with_client(
                SnsClient::new(Region::default()),
                topic_arn,
                DEFAULT_CALL_TIMEOUT,
            );
            report_failure(&notifier, &ReportingZone::default(), Utc::now(), message).await
        }
        _ => InvocationResponse::failure(message, AGGREGATION_FAILED),
    }
}
