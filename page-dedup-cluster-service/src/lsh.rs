//! Banding of MinHash signatures.
//!
//! Each signature is cut into `b` contiguous bands of `r` rows. A band is
//! collapsed to the sum of its rows, and the sum is hashed with the band's own
//! function from a secondary family. Equal sums collide; distinct tuples with
//! equal sums are false positives left for pruning to remove.

use crate::hash_family::HashFamily;
use crate::minhash::Signature;
use rayon::prelude::*;

/// Splits a signature into consecutive bands of `rows` values.
pub fn split_bands(signature: &[u64], rows: usize) -> std::slice::ChunksExact<'_, u64> {
    assert!(
        rows > 0 && signature.len() % rows == 0,
        "signature length {} is not a multiple of {rows} rows",
        signature.len()
    );
    signature.chunks_exact(rows)
}

/// Band sums laid out band-major: `sums[band][document]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandMatrix {
    sums: Vec<Vec<u64>>,
    documents: usize,
}

impl BandMatrix {
    pub fn new(signatures: &[&Signature], rows: usize) -> Self {
        let documents = signatures.len();
        let Some(first) = signatures.first() else {
            return Self {
                sums: Vec::new(),
                documents,
            };
        };
        let band_count = first.len() / rows;
        let mut sums = vec![Vec::with_capacity(documents); band_count];
        for signature in signatures {
            assert_eq!(
                signature.len(),
                first.len(),
                "every signature must have the same length"
            );
            for (band, values) in split_bands(signature.values(), rows).enumerate() {
                sums[band].push(values.iter().sum());
            }
        }
        Self { sums, documents }
    }

    pub fn band_count(&self) -> usize {
        self.sums.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn row(&self, band: usize) -> &[u64] {
        &self.sums[band]
    }

    /// Bound for the band hash family: at least `bands * documents` and every band sum.
    pub fn domain(&self) -> u64 {
        let largest = self.sums.iter().flatten().copied().max().unwrap_or(0);
        ((self.band_count() * self.documents) as u64).max(largest)
    }
}

/// Hashed band values, `rows[band][document]`. Column `i` is the same document in every row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashedBandTable {
    rows: Vec<Vec<u64>>,
    documents: usize,
}

impl HashedBandTable {
    pub fn new(matrix: &BandMatrix, family: &HashFamily) -> Self {
        assert_eq!(
            family.len(),
            matrix.band_count(),
            "one band hash function per band"
        );
        let rows = (0..matrix.band_count())
            .into_par_iter()
            .map(|band| {
                let function = family.get(band);
                matrix.row(band).iter().map(|&sum| function.hash(sum)).collect()
            })
            .collect();
        Self::from_rows(rows)
    }

    pub fn from_rows(rows: Vec<Vec<u64>>) -> Self {
        let documents = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == documents),
            "band rows must be aligned by document"
        );
        Self { rows, documents }
    }

    pub fn band_count(&self) -> usize {
        self.rows.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn row(&self, band: usize) -> &[u64] {
        &self.rows[band]
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_family::HashFamily;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn signature(codes: &[u64], family: &HashFamily) -> Signature {
        Signature::compute(codes, family)
    }

    #[test]
    fn split_is_positional() {
        let values = [1, 2, 3, 4, 5, 6];
        let bands: Vec<&[u64]> = split_bands(&values, 2).collect();
        assert_eq!(bands, vec![&[1, 2][..], &[3, 4], &[5, 6]]);
    }

    #[test]
    #[should_panic(expected = "not a multiple")]
    fn uneven_split_panics() {
        split_bands(&[1, 2, 3], 2).count();
    }

    #[test]
    fn band_columns_stay_with_their_document() {
        let mut rng = StdRng::seed_from_u64(1);
        let primary = HashFamily::generate(&mut rng, 1_000, 8).unwrap();
        let low = signature(&[1, 2, 3], &primary);
        let high = signature(&[900, 950, 999], &primary);

        let matrix = BandMatrix::new(&[&low, &high], 4);
        assert_eq!(matrix.band_count(), 2);
        for band in 0..2 {
            let expected_low: u64 = low.values()[band * 4..band * 4 + 4].iter().sum();
            let expected_high: u64 = high.values()[band * 4..band * 4 + 4].iter().sum();
            assert_eq!(matrix.row(band), &[expected_low, expected_high]);
        }

        let secondary = HashFamily::generate(&mut rng, matrix.domain(), 2).unwrap();
        let table = HashedBandTable::new(&matrix, &secondary);
        assert_eq!(table.document_count(), 2);
        for band in 0..2 {
            let function = secondary.get(band);
            assert_eq!(table.row(band)[0], function.hash(matrix.row(band)[0]));
            assert_eq!(table.row(band)[1], function.hash(matrix.row(band)[1]));
        }
    }

    #[test]
    fn domain_covers_every_sum() {
        let rows = vec![vec![3, 400], vec![7, 9]];
        let matrix = BandMatrix {
            sums: rows,
            documents: 2,
        };
        assert_eq!(matrix.domain(), 400);

        let small = BandMatrix {
            sums: vec![vec![1, 1, 1]; 5],
            documents: 3,
        };
        assert_eq!(small.domain(), 15);
    }

    #[test]
    fn equal_sums_collide() {
        let matrix = BandMatrix {
            sums: vec![vec![10, 10, 11]],
            documents: 3,
        };
        let family =
            HashFamily::generate(&mut StdRng::seed_from_u64(4), matrix.domain(), 1).unwrap();
        let table = HashedBandTable::new(&matrix, &family);
        assert_eq!(table.row(0)[0], table.row(0)[1]);
        assert_ne!(table.row(0)[0], table.row(0)[2]);
    }

    #[test]
    #[should_panic(expected = "aligned")]
    fn misaligned_rows_panic() {
        HashedBandTable::from_rows(vec![vec![1, 2], vec![3]]);
    }
}
