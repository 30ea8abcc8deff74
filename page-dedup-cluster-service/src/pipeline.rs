use crate::cancel::CancellationFlag;
use crate::config::ClusterConfig;
use crate::dedup::{Bucket, BucketBuilder};
use crate::document::{total_shingles, Document, InvalidDocument};
use crate::error::PipelineError;
use crate::extract::TextExtractor;
use crate::hash_family::HashFamily;
use crate::lsh::{BandMatrix, HashedBandTable};
use crate::minhash::Signature;
use crate::prune::prune_buckets;
use crate::report::ReportSink;
use crate::source::DocumentSource;
use futures::stream::{self, StreamExt};
use rand::Rng;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pages fetched concurrently during ingestion.
const FETCH_CONCURRENCY: usize = 16;

/// Outcome of ingestion: documents ready for clustering and those excluded.
#[derive(Debug, Default)]
pub struct Ingested {
    pub documents: Vec<Document>,
    pub invalid: Vec<InvalidDocument>,
}

///
/// Enumerates `source`, fetches every page, extracts its text and shingles it.
///
/// Only enumeration failures and cancellation abort; a page that cannot be
/// fetched, extracted or shingled is recorded as invalid. Source order is
/// preserved.
///
pub async fn ingest(
    source: &dyn DocumentSource,
    extractor: Arc<dyn TextExtractor>,
    shingle_size: usize,
    cancel: &CancellationFlag,
) -> Result<Ingested, PipelineError> {
    let start = Instant::now();
    let ids = source.list().await?;
    info!(documents = ids.len(), "enumerated document source");

    let mut fetched = stream::iter(ids)
        .map(|id| async move {
            let raw = source.fetch(&id).await;
            (id, raw)
        })
        .buffered(FETCH_CONCURRENCY);
    let mut raw_pages = Vec::new();
    while let Some(page) = fetched.next().await {
        cancel.check()?;
        raw_pages.push(page);
    }

    // Extraction is CPU-bound; keep it off the async workers.
    let parsed: Vec<Result<Document, InvalidDocument>> = tokio::task::spawn_blocking(move || {
        raw_pages
            .into_par_iter()
            .map(|(id, raw)| {
                raw.and_then(|raw| extractor.extract(&raw))
                    .and_then(|text| Document::new(id.clone(), text, shingle_size))
                    .map_err(|reason| InvalidDocument { id, reason })
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|err| PipelineError::Task(err.to_string()))?;

    let mut ingested = Ingested::default();
    for result in parsed {
        match result {
            Ok(document) => ingested.documents.push(document),
            Err(invalid) => {
                warn!(id = %invalid.id, reason = %invalid.reason, "excluding document");
                ingested.invalid.push(invalid);
            }
        }
    }
    info!(
        valid = ingested.documents.len(),
        invalid = ingested.invalid.len(),
        secs = start.elapsed().as_secs_f64(),
        "ingested documents"
    );
    Ok(ingested)
}

/// Final buckets and leftovers, as indices into the owned documents.
#[derive(Debug)]
pub struct Clustering {
    documents: Vec<Document>,
    buckets: Vec<Bucket>,
    leftovers: Vec<usize>,
}

impl Clustering {
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn leftovers(&self) -> &[usize] {
        &self.leftovers
    }

    /// Member ids of every bucket, in bucket order.
    pub fn bucket_ids(&self) -> Vec<Vec<&str>> {
        self.buckets
            .iter()
            .map(|bucket| self.ids(bucket.members()))
            .collect()
    }

    pub fn leftover_ids(&self) -> Vec<&str> {
        self.ids(&self.leftovers)
    }

    /// Every document is in exactly one bucket or in the leftovers.
    pub fn is_partition(&self) -> bool {
        let mut seen = vec![false; self.documents.len()];
        let assigned = self
            .buckets
            .iter()
            .flat_map(|bucket| bucket.members())
            .chain(&self.leftovers);
        for &doc in assigned {
            match seen.get_mut(doc) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|slot| slot)
    }

    pub fn report(
        &self,
        sink: &mut dyn ReportSink,
        invalid: &[InvalidDocument],
    ) -> Result<(), PipelineError> {
        for (index, members) in self.bucket_ids().iter().enumerate() {
            sink.bucket(index, members)?;
        }
        sink.finish(&self.leftover_ids(), invalid)
    }

    fn ids(&self, indices: &[usize]) -> Vec<&str> {
        indices.iter().map(|&i| self.documents[i].id()).collect()
    }
}

///
/// Clusters `documents` into pruned candidate buckets.
///
/// Shingle hashing, signatures and pruning run in parallel; bucket
/// construction is sequential. `cancel` is polled between documents and
/// between buckets.
///
pub fn cluster<R: Rng + ?Sized>(
    mut documents: Vec<Document>,
    config: &ClusterConfig,
    rng: &mut R,
    cancel: &CancellationFlag,
) -> Result<Clustering, PipelineError> {
    config.validate()?;
    if documents.is_empty() {
        return Ok(Clustering {
            documents,
            buckets: Vec::new(),
            leftovers: Vec::new(),
        });
    }

    let start = Instant::now();
    let domain = total_shingles(&documents);
    documents.par_iter_mut().try_for_each(|doc| {
        cancel.check()?;
        doc.hash_shingles(domain);
        Ok::<_, PipelineError>(())
    })?;

    let primary = HashFamily::generate(rng, domain, config.num_perm)?;
    documents.par_iter_mut().try_for_each(|doc| {
        cancel.check()?;
        doc.compute_signature(&primary);
        Ok::<_, PipelineError>(())
    })?;
    info!(
        documents = documents.len(),
        shingles = domain,
        modulus = primary.modulus(),
        secs = start.elapsed().as_secs_f64(),
        "computed minhash signatures"
    );

    let start = Instant::now();
    let signatures: Vec<&Signature> = documents.iter().map(Document::signature).collect();
    let matrix = BandMatrix::new(&signatures, config.rows_per_band());
    let band_family = HashFamily::generate(rng, matrix.domain(), config.num_bands)?;
    let table = HashedBandTable::new(&matrix, &band_family);
    cancel.check()?;

    let buckets = BucketBuilder::new(&table).build(cancel)?;
    debug!(candidates = buckets.len(), "built candidate buckets");

    let pruned = prune_buckets(buckets, &documents, config.threshold());
    info!(
        buckets = pruned.buckets.len(),
        leftovers = pruned.leftovers.len(),
        threshold = config.threshold(),
        secs = start.elapsed().as_secs_f64(),
        "clustered documents"
    );
    Ok(Clustering {
        documents,
        buckets: pruned.buckets,
        leftovers: pruned.leftovers,
    })
}
