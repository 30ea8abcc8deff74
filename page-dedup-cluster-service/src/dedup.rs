use crate::cancel::CancellationFlag;
use crate::error::PipelineError;
use crate::lsh::HashedBandTable;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Candidate near-duplicates, as ascending document indices. The first member is the anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    members: Vec<usize>,
}

impl Bucket {
    pub fn new(members: Vec<usize>) -> Self {
        Self { members }
    }

    pub fn anchor(&self) -> Option<usize> {
        self.members.first().copied()
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

///
/// Groups documents that share a hashed band value with an anchor document.
///
/// The band table is never mutated. Documents leave the working set by being
/// dropped from `live`, so indices into the table stay valid for the whole run.
///
pub struct BucketBuilder<'a> {
    table: &'a HashedBandTable,
    /// Per band: hashed value to the documents carrying it, ascending.
    postings: Vec<FxHashMap<u64, Vec<usize>>>,
    /// Documents not yet assigned to a bucket.
    live: BTreeSet<usize>,
}

impl<'a> BucketBuilder<'a> {
    pub fn new(table: &'a HashedBandTable) -> Self {
        let postings = table
            .rows()
            .par_iter()
            .map(|row| {
                let mut posting: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
                for (doc, &value) in row.iter().enumerate() {
                    posting.entry(value).or_default().push(doc);
                }
                posting
            })
            .collect();
        Self {
            table,
            postings,
            live: (0..table.document_count()).collect(),
        }
    }

    /// Number of documents still in the working set.
    pub fn remaining(&self) -> usize {
        self.live.len()
    }

    ///
    /// Takes the lowest live document as anchor, collects every live document
    /// that matches it in at least one band, and removes the group from the
    /// working set. Matches are with the anchor only; they are not chased
    /// transitively. Returns `None` once the working set is empty.
    ///
    pub fn next_bucket(&mut self) -> Option<Bucket> {
        let anchor = self.live.pop_first()?;
        let mut similar = BTreeSet::from([anchor]);
        for (band, posting) in self.postings.iter().enumerate() {
            let value = self.table.row(band)[anchor];
            if let Some(docs) = posting.get(&value) {
                similar.extend(docs.iter().filter(|doc| self.live.contains(*doc)));
            }
        }
        for doc in &similar {
            self.live.remove(doc);
        }
        Some(Bucket::new(similar.into_iter().collect()))
    }

    /// Drains the working set into buckets, polling `cancel` between buckets.
    pub fn build(mut self, cancel: &CancellationFlag) -> Result<Vec<Bucket>, PipelineError> {
        let mut buckets = Vec::new();
        loop {
            cancel.check()?;
            match self.next_bucket() {
                Some(bucket) => {
                    debug!(
                        bucket = buckets.len() + 1,
                        anchor = bucket.anchor(),
                        size = bucket.len(),
                        remaining = self.remaining(),
                        "extracted candidate bucket"
                    );
                    buckets.push(bucket);
                }
                None => return Ok(buckets),
            }
        }
    }
}
