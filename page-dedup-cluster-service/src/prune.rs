//! Exact Jaccard verification of candidate buckets.

use crate::dedup::Bucket;
use crate::document::Document;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::hash::Hash;

/// `|A ∩ B| / |A ∪ B|` over the distinct elements of each slice.
pub fn jaccard_similarity<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let a: FxHashSet<&T> = a.iter().collect();
    let b: FxHashSet<&T> = b.iter().collect();
    set_similarity(&a, &b)
}

fn set_similarity<T: Eq + Hash>(a: &FxHashSet<T>, b: &FxHashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Buckets after verification, and the documents evicted from them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pruned {
    pub buckets: Vec<Bucket>,
    pub leftovers: Vec<usize>,
}

///
/// Evicts every member whose shingle-set similarity to the bucket's anchor is
/// below `threshold`. Similarity to other members is not considered.
///
pub fn prune_buckets(buckets: Vec<Bucket>, documents: &[Document], threshold: f64) -> Pruned {
    let (buckets, evicted): (Vec<Bucket>, Vec<Vec<usize>>) = buckets
        .into_par_iter()
        .map(|bucket| prune_bucket(bucket, documents, threshold))
        .unzip();
    Pruned {
        buckets,
        leftovers: evicted.into_iter().flatten().collect(),
    }
}

fn prune_bucket(bucket: Bucket, documents: &[Document], threshold: f64) -> (Bucket, Vec<usize>) {
    if bucket.len() < 2 {
        return (bucket, Vec::new());
    }
    let (anchor, rest) = (bucket.members()[0], &bucket.members()[1..]);
    let anchor_set = shingle_set(&documents[anchor]);
    let (kept, evicted): (Vec<usize>, Vec<usize>) = rest.iter().partition(|&&member| {
        set_similarity(&anchor_set, &shingle_set(&documents[member])) >= threshold
    });
    let mut members = Vec::with_capacity(kept.len() + 1);
    members.push(anchor);
    members.extend(kept);
    (Bucket::new(members), evicted)
}

fn shingle_set(document: &Document) -> FxHashSet<&str> {
    document.shingles().iter().map(String::as_str).collect()
}
