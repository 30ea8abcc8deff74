use crate::error::DocumentError;
use crate::hash_family::HashFamily;
use crate::minhash::Signature;
use crate::shingle::{shingle_code, shingles};

/// A product page moving through the pipeline.
#[derive(Clone, Debug)]
pub struct Document {
    id: String,
    text: String,
    shingles: Vec<String>,
    shingle_codes: Vec<u64>,
    signature: Signature,
}

impl Document {
    /// Tokenizes `text` into `k`-shingles. Text without a single shingle is rejected.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        k: usize,
    ) -> Result<Self, DocumentError> {
        let text = text.into();
        let shingles = shingles(&text, k);
        if shingles.is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(Self {
            id: id.into(),
            text,
            shingles,
            shingle_codes: Vec::new(),
            signature: Signature::default(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shingles(&self) -> &[String] {
        &self.shingles
    }

    pub fn shingle_codes(&self) -> &[u64] {
        &self.shingle_codes
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// One code in `[0, domain)` per shingle, duplicates included.
    pub fn hash_shingles(&mut self, domain: u64) {
        self.shingle_codes = self
            .shingles
            .iter()
            .map(|shingle| shingle_code(shingle, domain))
            .collect();
    }

    pub fn compute_signature(&mut self, family: &HashFamily) {
        self.signature = Signature::compute(&self.shingle_codes, family);
    }
}

/// A document excluded from clustering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidDocument {
    pub id: String,
    pub reason: DocumentError,
}

/// Shingle count across the collection: the domain of the shingle codes.
pub fn total_shingles(documents: &[Document]) -> u64 {
    documents.iter().map(|doc| doc.shingles.len() as u64).sum()
}
