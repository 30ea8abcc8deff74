use crate::hash_family::HashFamily;
use rustc_hash::FxHashSet;

/// MinHash signature: one minimum per function of the primary family.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    hash_values: Vec<u64>,
}

impl Signature {
    /// Computes the signature over the *set* of `codes`; multiplicity is ignored.
    pub fn compute(codes: &[u64], family: &HashFamily) -> Self {
        let items: FxHashSet<u64> = codes.iter().copied().collect();
        let mut hash_values = vec![u64::MAX; family.len()];
        for &item in &items {
            for (i, function) in family.iter().enumerate() {
                hash_values[i] = hash_values[i].min(function.hash(item));
            }
        }
        Signature { hash_values }
    }

    pub fn values(&self) -> &[u64] {
        &self.hash_values
    }

    pub fn len(&self) -> usize {
        self.hash_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hash_values.is_empty()
    }

    /// Fraction of agreeing components, an estimate of the Jaccard similarity.
    pub fn estimated_similarity(&self, other: &Signature) -> f64 {
        assert_eq!(
            self.len(),
            other.len(),
            "signatures from different families cannot be compared"
        );
        if self.is_empty() {
            return 0.0;
        }
        let equal_count = self
            .hash_values
            .iter()
            .zip(&other.hash_values)
            .filter(|&(a, b)| a == b)
            .count();
        equal_count as f64 / self.len() as f64
    }
}
