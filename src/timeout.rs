use crate::error::CostReportError;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds one outbound AWS call. Elapsing is reported as `Timeout(operation)`.
pub async fn with_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, CostReportError>
where
    F: Future<Output = Result<T, CostReportError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| CostReportError::Timeout(operation))?
}
