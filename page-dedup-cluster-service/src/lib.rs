//! Near-duplicate clustering of scraped product pages.
//!
//! Pages are shingled, summarised by MinHash signatures, grouped into
//! candidate buckets by banded locality-sensitive hashing and finally
//! verified against exact Jaccard similarity.

pub mod cancel;
pub mod config;
pub mod dedup;
pub mod document;
pub mod error;
pub mod extract;
pub mod hash_family;
pub mod lsh;
pub mod minhash;
pub mod pipeline;
pub mod prune;
pub mod report;
pub mod shingle;
pub mod source;
pub mod util;
