use crate::error::CostReportError;
use crate::timeout::with_timeout;
use async_trait::async_trait;
use rusoto_sts::{GetCallerIdentityRequest, Sts, StsClient};
use std::time::Duration;

#[async_trait]
pub trait CallerIdentity: Send + Sync {
    async fn account_id(&self) -> Result<String, CostReportError>;
}

pub struct StsCallerIdentity {
    client: StsClient,
    timeout: Duration,
}

#[async_trait]
impl CallerIdentity for StsCallerIdentity {
    async fn account_id(&self) -> Result<String, CostReportError> {
        let output = with_timeout("GetCallerIdentity", self.timeout, async {
            Ok(self
                .client
                .get_caller_identity(GetCallerIdentityRequest {})
                .await?)
        })
        .await?;
        output.account.ok_or(CostReportError::NoneValue)
    }
}

impl StsCallerIdentity {
    pub fn new_with_client(client: StsClient, timeout: Duration) -> Self {
        StsCallerIdentity { client, timeout }
    }
}
