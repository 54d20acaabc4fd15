//! In-memory stand-ins for the AWS-backed traits.

use crate::cost_explorer::CostQuery;
use crate::error::CostReportError;
use crate::identity::CallerIdentity;
use crate::notifier::Notify;
use crate::storage::{ReportStore, StoredObject};
use crate::time_range::MonthRange;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusoto_ce::{GetCostAndUsageResponse, Group, MetricValue, ResultByTime};
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

pub struct StoredReport {
    pub bucket: String,
    pub object: StoredObject,
    pub body: String,
}

#[derive(Default)]
pub struct InMemoryStore {
    pub reports: Mutex<Vec<StoredReport>>,
    pub fail_writes: bool,
    /// Buckets whose list and get calls time out.
    pub fail_reads: Vec<String>,
}

impl InMemoryStore {
    pub fn with_report(self, bucket: &str, key: &str, last_modified: &str, body: String) -> Self {
        self.reports.lock().unwrap().push(StoredReport {
            bucket: bucket.to_string(),
            object: StoredObject {
                key: key.to_string(),
                last_modified: DateTime::<Utc>::from_str(last_modified).unwrap(),
            },
            body,
        });
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|report| format!("{}/{}", report.bucket, report.object.key))
            .collect()
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn put_report(
        &self,
        bucket: &str,
        key: &str,
        body: String,
    ) -> Result<(), CostReportError> {
        if self.fail_writes {
            return Err(CostReportError::Timeout("PutObject"));
        }
        self.reports.lock().unwrap().push(StoredReport {
            bucket: bucket.to_string(),
            object: StoredObject {
                key: key.to_string(),
                last_modified: Utc::now(),
            },
            body,
        });
        Ok(())
    }

    async fn list_reports(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, CostReportError> {
        if self.fail_reads.iter().any(|failing| failing == bucket) {
            return Err(CostReportError::Timeout("ListObjectsV2"));
        }
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|report| report.bucket == bucket && report.object.key.starts_with(prefix))
            .map(|report| report.object.clone())
            .collect())
    }

    async fn get_report(&self, bucket: &str, key: &str) -> Result<String, CostReportError> {
        if self.fail_reads.iter().any(|failing| failing == bucket) {
            return Err(CostReportError::Timeout("GetObject"));
        }
        self.reports
            .lock()
            .unwrap()
            .iter()
            .find(|report| report.bucket == bucket && report.object.key == key)
            .map(|report| report.body.clone())
            .ok_or(CostReportError::NoneValue)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        RecordingNotifier {
            fail: true,
            ..Default::default()
        }
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(subject, _)| subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<String, CostReportError> {
        if self.fail {
            return Err(CostReportError::Timeout("Publish"));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((subject.to_string(), message.to_string()));
        Ok(format!("message-{}", sent.len()))
    }
}

#[derive(Default)]
pub struct FixedCostQuery {
    pub response: GetCostAndUsageResponse,
    pub ranges: Mutex<Vec<MonthRange>>,
    pub fail: bool,
}

#[async_trait]
impl CostQuery for FixedCostQuery {
    async fn monthly_costs_by_service(
        &self,
        range: &MonthRange,
    ) -> Result<GetCostAndUsageResponse, CostReportError> {
        self.ranges.lock().unwrap().push(range.clone());
        if self.fail {
            return Err(CostReportError::Timeout("GetCostAndUsage"));
        }
        Ok(self.response.clone())
    }
}

pub struct FixedIdentity(pub Option<String>);

#[async_trait]
impl CallerIdentity for FixedIdentity {
    async fn account_id(&self) -> Result<String, CostReportError> {
        self.0.clone().ok_or(CostReportError::Timeout("GetCallerIdentity"))
    }
}

/// Cost Explorer response with one monthly bucket of `(service, amount)` groups.
pub fn cost_response(services: &[(&str, &str)]) -> GetCostAndUsageResponse {
    let groups = services
        .iter()
        .map(|(service, amount)| {
            let mut metrics = HashMap::new();
            metrics.insert(
                "BlendedCost".to_string(),
                MetricValue {
                    amount: Some(amount.to_string()),
                    unit: Some("USD".to_string()),
                    ..Default::default()
                },
            );
            Group {
                keys: Some(vec![service.to_string()]),
                metrics: Some(metrics),
                ..Default::default()
            }
        })
        .collect();
    GetCostAndUsageResponse {
        results_by_time: Some(vec![ResultByTime {
            groups: Some(groups),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// Report body as the collector writes it.
pub fn report_body(account_id: &str, services: &[(&str, &str)]) -> String {
    let groups: Vec<_> = services
        .iter()
        .map(|(service, amount)| {
            json!({
                "Keys": [service],
                "Metrics": {"BlendedCost": {"Amount": amount, "Unit": "USD"}}
            })
        })
        .collect();
    json!({
        "account_id": account_id,
        "generated_at": "2024-07-15T09:00:00+09:00",
        "month": "2024-07",
        "monthly_costs": {
            "ResultsByTime": [{
                "TimePeriod": {"Start": "2024-07-01", "End": "2024-08-01"},
                "Groups": groups,
                "Estimated": true
            }]
        }
    })
    .to_string()
}
