use lambda_runtime::{run, service_fn, Context, Error, LambdaEvent};
use lazy_static::lazy_static;
use page_dedup_cluster::cancel::CancellationFlag;
use page_dedup_cluster::config::ClusterConfig;
use page_dedup_cluster::extract::HtmlTextExtractor;
use page_dedup_cluster::pipeline;
use page_dedup_cluster::report::{CsvReport, LogReport};
use page_dedup_cluster::source;
use page_dedup_cluster::util::{push_result_file, time_budget, Watchdog};
use page_dedup_service::dto::{ClusterSummary, DedupConfig};
use page_dedup_service::error::ServiceError;
use page_dedup_service::response::make_response_payload;
use page_dedup_service::util::get_region;
use rusoto_core::{Client, Region};
use rusoto_s3::S3Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

lazy_static! {
    // AWS Region
    static ref REGION: Region = get_region().unwrap();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .json()
        .init();
    run(service_fn(process)).await?;
    Ok(())
}

async fn process(event: LambdaEvent<DedupConfig>) -> Result<Value, Error> {
    let (request, context) = event.into_parts();
    let result = dedup(request, &context).await;
    if let Err(err) = &result {
        warn!(error = %err, "clustering run failed");
    }
    make_response_payload(result)
}

async fn dedup(request: DedupConfig, context: &Context) -> Result<ClusterSummary, ServiceError> {
    let config = ClusterConfig::try_from(&request)?;
    let client = S3Client::new_with_client(Client::shared(), REGION.clone());
    let cancel = CancellationFlag::new();
    let watchdog = Watchdog::spawn(cancel.clone(), time_budget(context.deadline));

    let source = source::from_data_source(&request.data, &client);
    let ingested = pipeline::ingest(
        source.as_ref(),
        Arc::new(HtmlTextExtractor),
        config.shingle_size,
        &cancel,
    )
    .await?;
    let invalid = ingested.invalid;
    let clustering = {
        let config = config.clone();
        let cancel = cancel.clone();
        let documents = ingested.documents;
        tokio::task::spawn_blocking(move || {
            pipeline::cluster(documents, &config, &mut config.rng(), &cancel)
        })
        .await
        .map_err(ServiceError::internal_server_error)??
    };
    drop(watchdog);

    clustering.report(&mut LogReport, &invalid)?;
    let report = match request.output {
        Some(output) => {
            let mut csv = CsvReport::new();
            clustering.report(&mut csv, &invalid)?;
            push_result_file(&client, csv, &output).await?;
            info!(bucket = %output.bucket, key = %output.key, "uploaded cluster report");
            Some(output)
        }
        None => None,
    };

    Ok(ClusterSummary {
        buckets: clustering.buckets().len(),
        leftovers: clustering.leftovers().len(),
        invalid: invalid.len(),
        report,
    })
}
