use crate::error::CostReportError;
use crate::timeout::with_timeout;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusoto_s3::{GetObjectRequest, ListObjectsV2Request, PutObjectRequest, S3Client, S3};
use std::time::Duration;
use tokio::io::AsyncReadExt;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn put_report(&self, bucket: &str, key: &str, body: String)
        -> Result<(), CostReportError>;

    async fn list_reports(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, CostReportError>;

    async fn get_report(&self, bucket: &str, key: &str) -> Result<String, CostReportError>;
}

/// Most recently written object. Equal timestamps fall back to the
/// lexicographically largest key.
pub fn latest_object(objects: &[StoredObject]) -> Option<&StoredObject> {
    objects.iter().max_by(|a, b| {
        a.last_modified
            .cmp(&b.last_modified)
            .then_with(|| a.key.cmp(&b.key))
    })
}

pub struct S3ReportStore {
    client: S3Client,
    timeout: Duration,
}

#[async_trait]
impl ReportStore for S3ReportStore {
    async fn put_report(
        &self,
        bucket: &str,
        key: &str,
        body: String,
    ) -> Result<(), CostReportError> {
        let request = PutObjectRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body: Some(body.into_bytes().into()),
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
            ..Default::default()
        };
        with_timeout("PutObject", self.timeout, async {
            self.client.put_object(request).await?;
            Ok(())
        })
        .await
    }

    async fn list_reports(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, CostReportError> {
        let mut objects = Vec::<StoredObject>::new();
        let mut continuation_token = None;
        loop {
            let request = ListObjectsV2Request {
                bucket: bucket.to_string(),
                prefix: Some(prefix.to_string()),
                continuation_token: continuation_token.take(),
                ..Default::default()
            };
            let output = with_timeout("ListObjectsV2", self.timeout, async {
                Ok(self.client.list_objects_v2(request).await?)
            })
            .await?;

            for object in output.contents.unwrap_or_default() {
                let last_modified = object.last_modified.ok_or(CostReportError::NoneValue)?;
                objects.push(StoredObject {
                    key: object.key.ok_or(CostReportError::NoneValue)?,
                    last_modified: DateTime::parse_from_rfc3339(&last_modified)?
                        .with_timezone(&Utc),
                });
            }

            match output.next_continuation_token {
                Some(token) if output.is_truncated == Some(true) => {
                    continuation_token = Some(token)
                }
                _ => break,
            }
        }
        Ok(objects)
    }

    async fn get_report(&self, bucket: &str, key: &str) -> Result<String, CostReportError> {
        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            ..Default::default()
        };
        with_timeout("GetObject", self.timeout, async {
            let output = self.client.get_object(request).await?;
            let mut body = String::new();
            output
                .body
                .ok_or(CostReportError::NoneValue)?
                .into_async_read()
                .read_to_string(&mut body)
                .await?;
            Ok(body)
        })
        .await
    }
}

impl S3ReportStore {
    pub fn new_with_client(client: S3Client, timeout: Duration) -> Self {
        S3ReportStore { client, timeout }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CostReportError;
    use crate::storage::{latest_object, ReportStore, S3ReportStore, StoredObject};
    use chrono::{DateTime, Utc};
    use rusoto_mock::{
        MockCredentialsProvider, MockRequestDispatcher, MockResponseReader, ReadMockResponse,
    };
    use rusoto_s3::S3Client;
    use std::str::FromStr;
    use std::time::Duration;

    fn stored(key: &str, last_modified: &str) -> StoredObject {
        StoredObject {
            key: key.to_string(),
            last_modified: DateTime::<Utc>::from_str(last_modified).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_latest_object_ignores_listing_order() {
        let newest = stored("a/111_20240703_000000.json", "2024-07-20T00:00:00Z");
        let orders = vec![
            vec![
                newest.clone(),
                stored("a/111_20240701_000000.json", "2024-07-01T00:00:00Z"),
                stored("a/111_20240702_000000.json", "2024-07-10T00:00:00Z"),
            ],
            vec![
                stored("a/111_20240701_000000.json", "2024-07-01T00:00:00Z"),
                newest.clone(),
                stored("a/111_20240702_000000.json", "2024-07-10T00:00:00Z"),
            ],
            vec![
                stored("a/111_20240702_000000.json", "2024-07-10T00:00:00Z"),
                stored("a/111_20240701_000000.json", "2024-07-01T00:00:00Z"),
                newest.clone(),
            ],
        ];

        for objects in orders {
            assert_eq!(latest_object(&objects), Some(&newest));
        }
    }

    #[tokio::test]
    async fn test_latest_object_tie_prefers_largest_key() {
        let objects = vec![
            stored("a/111_20240701_000001.json", "2024-07-01T00:00:00Z"),
            stored("a/111_20240701_000009.json", "2024-07-01T00:00:00Z"),
            stored("a/111_20240701_000005.json", "2024-07-01T00:00:00Z"),
        ];
        assert_eq!(
            latest_object(&objects).map(|object| object.key.as_str()),
            Some("a/111_20240701_000009.json")
        );
    }

    #[tokio::test]
    async fn test_latest_object_empty() {
        assert_eq!(latest_object(&[]), None);
    }

    #[tokio::test]
    async fn test_list_reports() {
        let mock = S3Client::new_with(
            MockRequestDispatcher::default().with_body(&*MockResponseReader::read_response(
                "test_resources/valid",
                "list_objects_v2.xml",
            )),
            MockCredentialsProvider,
            Default::default(),
        );

        let store = S3ReportStore::new_with_client(mock, Duration::from_secs(5));
        let objects = store
            .list_reports(
                "cost-data-111111111111",
                "cost-reports/monthly/111111111111_202407",
            )
            .await
            .unwrap();

        assert_eq!(
            objects,
            vec![
                stored(
                    "cost-reports/monthly/111111111111_20240701_090000.json",
                    "2024-07-01T00:00:05Z"
                ),
                stored(
                    "cost-reports/monthly/111111111111_20240715_090000.json",
                    "2024-07-15T00:00:04Z"
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_report() {
        let mock = S3Client::new_with(
            MockRequestDispatcher::default().with_body(&*MockResponseReader::read_response(
                "test_resources/valid",
                "cost_report.json",
            )),
            MockCredentialsProvider,
            Default::default(),
        );

        let store = S3ReportStore::new_with_client(mock, Duration::from_secs(5));
        let body = store
            .get_report(
                "cost-data-111111111111",
                "cost-reports/monthly/111111111111_20240715_090000.json",
            )
            .await
            .unwrap();

        assert!(body.contains("\"account_id\": \"111111111111\""));
    }

    #[tokio::test]
    async fn test_put_report_error() {
        let mock = S3Client::new_with(
            MockRequestDispatcher::with_status(403).with_body(&*MockResponseReader::read_response(
                "test_resources/error",
                "access_denied.xml",
            )),
            MockCredentialsProvider,
            Default::default(),
        );

        let store = S3ReportStore::new_with_client(mock, Duration::from_secs(5));
        let result = store
            .put_report(
                "cost-data-111111111111",
                "cost-reports/monthly/111111111111_20240715_090000.json",
                "{}".to_string(),
            )
            .await;

        assert!(matches!(result, Err(CostReportError::PutObjectError(_))));
    }
}
