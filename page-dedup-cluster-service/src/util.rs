use crate::cancel::CancellationFlag;
use crate::report::CsvReport;
use page_dedup_service::dto::DataFile;
use page_dedup_service::error::ServiceError;
use page_dedup_service::util::upload_object_to_s3;
use rusoto_s3::S3Client;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::warn;

/// Time kept back from the invocation deadline for reporting.
const DEADLINE_MARGIN: Duration = Duration::from_secs(5);

pub async fn push_result_file(
    client: &S3Client,
    report: CsvReport,
    output: &DataFile,
) -> Result<(), ServiceError> {
    let object = report.into_bytes()?;
    upload_object_to_s3(client, object, output.bucket.clone(), output.key.clone()).await
}

/// How long a run may take given an invocation deadline in epoch milliseconds.
pub fn time_budget(deadline_ms: u64) -> Duration {
    let deadline = UNIX_EPOCH + Duration::from_millis(deadline_ms);
    deadline
        .duration_since(SystemTime::now())
        .unwrap_or_default()
        .saturating_sub(DEADLINE_MARGIN)
}

/// Cancels a run once its time budget is spent. Dropping it stops the timer.
pub struct Watchdog {
    timer: JoinHandle<()>,
}

impl Watchdog {
    pub fn spawn(cancel: CancellationFlag, budget: Duration) -> Self {
        let timer = tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            warn!("invocation deadline approaching, cancelling run");
            cancel.cancel();
        });
        Self { timer }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
