// [libs/core/probabilistic/src/lsh.rs]
/*!
 * =================================================================
 * APARATO: ESCANER DE SINGULARIDAD (EXACT HASH + SIGN-LSH)
 * CLASIFICACIÓN: CORE PROBABILISTIC (ESTRATO L1)
 * RESPONSABILIDAD: CLUSTERING DE VECTORES DE RASGOS Y FIRMAS SIGN-LSH
 *
 * Backs the singularity scanner (§4.9): feature vectors get clustered
 * two ways. An exact pass buckets vectors by a 3-decimal string key so
 * near-identical vectors land in the same bucket cheaply; a near-clone pass
 * projects each vector through a fixed set of random +-1 hyperplanes into a
 * sign-LSH signature, so vectors landing in the same bucket are *probably*
 * close and only those get the exact cosine check. This module only builds
 * signatures and buckets — the caller owns what to do with a detected pair
 * (which glyph survives, which roles are exempt).
 * =================================================================
 */

use crucible_core_math::prelude::DeterministicLcg;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Number of hyperplanes in the sign-LSH signature, per §4.9.
pub const SIGNATURE_BITS: usize = 12;

/// Formats each component rounded to 3 decimal places, joined by commas —
/// the pre-hash key two near-identical vectors must produce identically.
fn rounded_key_string(vector: &[f64]) -> String {
    let mut key = String::with_capacity(vector.len() * 7);
    for (i, component) in vector.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        key.push_str(&format!("{component:.3}"));
    }
    key
}

/// Buckets feature vectors by SipHashing a string key formed from each
/// component rounded to 3 decimal places. Two vectors with the same key are
/// candidates for the scanner's "exact cull" pass.
#[must_use]
pub fn exact_hash_key(vector: &[f64]) -> u64 {
    let mut hasher = SipHasher13::new();
    rounded_key_string(vector).hash(&mut hasher);
    hasher.finish()
}

/// Groups indices of `vectors` by their [`exact_hash_key`], in first-seen
/// order within each bucket.
#[must_use]
pub fn exact_hash_clusters(vectors: &[Vec<f64>]) -> Vec<Vec<usize>> {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    for (index, vector) in vectors.iter().enumerate() {
        buckets
            .entry(exact_hash_key(vector))
            .or_default()
            .push(index);
    }
    buckets.into_values().collect()
}

/// A fixed table of [`SIGNATURE_BITS`] random +-1 hyperplane normals, built
/// once from a deterministic LCG so the same seed always yields the same
/// table — required for LSH signatures to be reproducible within a process
/// (§4.9, §9).
#[derive(Debug, Clone)]
pub struct SignatureTable {
    hyperplanes: Vec<Vec<f64>>,
}

impl SignatureTable {
    /// Builds the table for vectors of the given dimensionality, seeding
    /// the LCG with `seed`.
    #[must_use]
    pub fn new(seed: u64, dims: usize) -> Self {
        let mut lcg = DeterministicLcg::new(seed);
        let hyperplanes = (0..SIGNATURE_BITS)
            .map(|_| {
                lcg.projection_vector(dims)
                    .into_iter()
                    .map(|v| if v >= 0.0 { 1.0 } else { -1.0 })
                    .collect()
            })
            .collect();
        Self { hyperplanes }
    }

    /// Projects `vector` through every hyperplane and packs the signs into
    /// a [`SIGNATURE_BITS`]-bit signature (bit set iff the dot product with
    /// that hyperplane is non-negative).
    #[must_use]
    pub fn signature(&self, vector: &[f64]) -> u16 {
        let mut signature: u16 = 0;
        for (bit, hyperplane) in self.hyperplanes.iter().enumerate() {
            let dot: f64 = hyperplane.iter().zip(vector.iter()).map(|(a, b)| a * b).sum();
            if dot >= 0.0 {
                signature |= 1 << bit;
            }
        }
        signature
    }

    /// Dimensionality this table was built for.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.hyperplanes.first().map_or(0, Vec::len)
    }

    /// Like [`Self::signature`], but rejects a vector whose length does not
    /// match the table's dimensionality instead of silently truncating via
    /// `zip`.
    pub fn checked_signature(&self, vector: &[f64]) -> Result<u16, crate::errors::ProbabilisticError> {
        if vector.len() != self.dims() {
            return Err(crate::errors::ProbabilisticError::DimensionMismatch {
                expected: self.dims(),
                actual: vector.len(),
            });
        }
        Ok(self.signature(vector))
    }
}

/// Groups indices of `vectors` by their sign-LSH signature under `table`.
#[must_use]
pub fn signature_buckets(table: &SignatureTable, vectors: &[Vec<f64>]) -> Vec<Vec<usize>> {
    let mut buckets: HashMap<u16, Vec<usize>> = HashMap::new();
    for (index, vector) in vectors.iter().enumerate() {
        buckets.entry(table.signature(vector)).or_default().push(index);
    }
    buckets.into_values().collect()
}

/// Cosine similarity between two equal-length vectors; `0.0` if either is
/// the zero vector.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_share_exact_hash_key() {
        let a = vec![1.0001, 2.0001];
        let b = vec![0.9999, 1.9999];
        assert_eq!(exact_hash_key(&a), exact_hash_key(&b));
    }

    #[test]
    fn exact_hash_clusters_groups_near_identical_vectors() {
        let vectors = vec![
            vec![1.0, 1.0],
            vec![1.0001, 1.0001],
            vec![5.0, 5.0],
        ];
        let clusters = exact_hash_clusters(&vectors);
        let biggest = clusters.iter().map(Vec::len).max().unwrap();
        assert_eq!(biggest, 2);
    }

    #[test]
    fn same_seed_yields_same_signature_table() {
        let a = SignatureTable::new(47, 8);
        let b = SignatureTable::new(47, 8);
        let vector = vec![0.1, -0.2, 0.3, 0.4, -0.5, 0.6, 0.1, 0.2];
        assert_eq!(a.signature(&vector), b.signature(&vector));
    }

    #[test]
    fn checked_signature_rejects_wrong_dimensionality() {
        let table = SignatureTable::new(47, 8);
        let err = table.checked_signature(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            crate::errors::ProbabilisticError::DimensionMismatch {
                expected: 8,
                actual: 2,
            }
        );
    }

    #[test]
    fn identical_vectors_collide_in_the_same_bucket() {
        let table = SignatureTable::new(47, 4);
        let vectors = vec![vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0]];
        let buckets = signature_buckets(&table, &vectors);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].len(), 2);
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_similarity_handles_zero_vector() {
        let zero = vec![0.0, 0.0];
        let other = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&zero, &other), 0.0);
    }

    use proptest::prelude::*;

    fn arbitrary_vector(dims: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(-100.0f64..100.0, dims)
    }

    proptest! {
        /// Cosine similarity always lands in `[-1, 1]` (within floating
        /// point slop), for any pair of equal-length vectors.
        #[test]
        fn cosine_similarity_is_always_bounded(
            a in arbitrary_vector(6),
            b in arbitrary_vector(6),
        ) {
            let sim = cosine_similarity(&a, &b);
            prop_assert!((-1.0001..=1.0001).contains(&sim));
        }

        /// Exact hash keys agree iff the 3-decimal rounded key strings
        /// agree, for any pair of vectors of the same length.
        #[test]
        fn exact_hash_key_is_consistent_with_rounded_string(
            a in arbitrary_vector(4),
            b in arbitrary_vector(4),
        ) {
            let same_key = exact_hash_key(&a) == exact_hash_key(&b);
            let same_string = rounded_key_string(&a) == rounded_key_string(&b);
            prop_assert_eq!(same_key, same_string);
        }

        /// `SignatureTable::signature` is a pure function of its table and
        /// input: the same seed and vector always produce the same
        /// signature, across any number of repeated calls.
        #[test]
        fn signature_is_deterministic_across_repeated_calls(
            seed in any::<u64>(),
            vector in arbitrary_vector(8),
        ) {
            let table = SignatureTable::new(seed, 8);
            let first = table.signature(&vector);
            for _ in 0..5 {
                prop_assert_eq!(table.signature(&vector), first);
            }
        }
    }
}
