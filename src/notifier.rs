use crate::error::CostReportError;
use crate::timeout::with_timeout;
use async_trait::async_trait;
use rusoto_sns::{PublishInput, Sns, SnsClient};
use std::time::Duration;

#[async_trait]
pub trait Notify: Send + Sync {
    /// Publishes one message and returns the channel's message id.
    async fn publish(&self, subject: &str, message: &str) -> Result<String, CostReportError>;
}

pub struct SnsNotifier {
    client: SnsClient,
    topic_arn: String,
    timeout: Duration,
}

#[async_trait]
impl Notify for SnsNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<String, CostReportError> {
        let input = PublishInput {
            topic_arn: Some(self.topic_arn.clone()),
            subject: Some(subject.to_string()),
            message: message.to_string(),
            ..Default::default()
        };
        let output = with_timeout("Publish", self.timeout, async {
            Ok(self.client.publish(input).await?)
        })
        .await?;
        output.message_id.ok_or(CostReportError::NoneValue)
    }
}

impl SnsNotifier {
    pub fn new_with_client(client: SnsClient, topic_arn: String, timeout: Duration) -> Self {
        SnsNotifier {
            client,
            topic_arn,
            timeout,
        }
    }
}
