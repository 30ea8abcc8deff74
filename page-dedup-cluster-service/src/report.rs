use crate::document::InvalidDocument;
use crate::error::PipelineError;
use csv::Writer;
use page_dedup_service::dto::RecordResult;
use tracing::{info, warn};

/// Observer of a finished clustering run.
pub trait ReportSink {
    /// Called once per final bucket, members in bucket order.
    fn bucket(&mut self, index: usize, members: &[&str]) -> Result<(), PipelineError>;

    /// Called once after every bucket.
    fn finish(
        &mut self,
        leftovers: &[&str],
        invalid: &[InvalidDocument],
    ) -> Result<(), PipelineError>;
}

/// Writes the report through `tracing`.
#[derive(Debug, Default)]
pub struct LogReport;

impl ReportSink for LogReport {
    fn bucket(&mut self, index: usize, members: &[&str]) -> Result<(), PipelineError> {
        info!(bucket = index + 1, size = members.len(), ?members, "bucket");
        Ok(())
    }

    fn finish(
        &mut self,
        leftovers: &[&str],
        invalid: &[InvalidDocument],
    ) -> Result<(), PipelineError> {
        for doc in invalid {
            warn!(id = %doc.id, reason = %doc.reason, "excluded document");
        }
        info!(
            leftovers = leftovers.len(),
            invalid = invalid.len(),
            "clustering report complete"
        );
        Ok(())
    }
}

/// `id,cluster` rows. Bucket rows are labelled `<index>-<size>`.
pub struct CsvReport {
    writer: Writer<Vec<u8>>,
}

impl CsvReport {
    pub const LEFTOVER: &'static str = "leftover";
    pub const INVALID: &'static str = "invalid";

    pub fn new() -> Self {
        Self {
            writer: Writer::from_writer(vec![]),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, PipelineError> {
        self.writer
            .into_inner()
            .map_err(|err| PipelineError::Report(err.to_string()))
    }

    fn write(&mut self, row: RecordResult) -> Result<(), PipelineError> {
        self.writer
            .write_record([row.id, row.cluster_id])
            .map_err(|err| PipelineError::Report(err.to_string()))
    }
}

impl Default for CsvReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for CsvReport {
    fn bucket(&mut self, index: usize, members: &[&str]) -> Result<(), PipelineError> {
        let cluster_id = format!("{index}-{}", members.len());
        for id in members {
            self.write(RecordResult {
                id: id.to_string(),
                cluster_id: cluster_id.clone(),
            })?;
        }
        Ok(())
    }

    fn finish(
        &mut self,
        leftovers: &[&str],
        invalid: &[InvalidDocument],
    ) -> Result<(), PipelineError> {
        let labelled = leftovers
            .iter()
            .map(|id| (id.to_string(), Self::LEFTOVER))
            .chain(invalid.iter().map(|doc| (doc.id.clone(), Self::INVALID)));
        for (id, label) in labelled {
            self.write(RecordResult {
                id,
                cluster_id: label.to_string(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;

    #[test]
    fn csv_rows_label_buckets_leftovers_and_invalid() {
        let mut report = CsvReport::new();
        report.bucket(0, &["a.html", "b.html"]).unwrap();
        report.bucket(1, &["c.html"]).unwrap();
        report
            .finish(
                &["d.html"],
                &[InvalidDocument {
                    id: "e.html".into(),
                    reason: DocumentError::Empty,
                }],
            )
            .unwrap();
        let csv = String::from_utf8(report.into_bytes().unwrap()).unwrap();
        assert_eq!(
            csv,
            "a.html,0-2\nb.html,0-2\nc.html,1-1\nd.html,leftover\ne.html,invalid\n"
        );
    }

    #[test]
    fn log_report_never_fails() {
        let mut report = LogReport;
        assert!(report.bucket(0, &["a"]).is_ok());
        assert!(report.finish(&[], &[]).is_ok());
    }
}
