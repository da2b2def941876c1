// [libs/core/probabilistic/src/tag_embedding.rs]
/*!
 * =================================================================
 * APARATO: EMBEDDING HASHEADO DE ETIQUETAS (TAG BAGS)
 * CLASIFICACIÓN: CORE PROBABILISTIC (ESTRATO L1)
 * RESPONSABILIDAD: COMPRESION DE TAGS POR SIMILITUD COSENO
 *
 * Tag compression (§4.2) needs a cheap, deterministic notion of "these
 * two tag sets mean almost the same thing" so the tag operator table's
 * output stays bounded without an ML model in the hot step path. Every tag
 * string is folded into a fixed 64-dim bag of hashed trigrams, bigrams, and
 * unigrams; two tags are near-duplicates when their bags' cosine similarity
 * clears a floor.
 * =================================================================
 */

/// Dimensionality of the hashed tag embedding, per §4.2.
pub const EMBEDDING_DIMS: usize = 64;

/// Fixed hashing constants for the trigram/bigram/unigram folds. These are
/// arbitrary but must stay fixed across runs — they are not cryptographic,
/// only a cheap way to spread character n-grams across the embedding's
/// buckets.
const TRIGRAM_CONSTANT: u64 = 7919;
const BIGRAM_CONSTANT: u64 = 6271;
const UNIGRAM_CONSTANT: u64 = 4219;

/// A 64-dim hashed bag-of-n-grams embedding for one tag string.
#[derive(Debug, Clone, PartialEq)]
pub struct TagEmbedding {
    buckets: [f64; EMBEDDING_DIMS],
}

impl TagEmbedding {
    /// Embeds a single tag: every character unigram, bigram, and trigram is
    /// hashed into one of [`EMBEDDING_DIMS`] buckets and accumulated, then
    /// the whole vector is L2-normalized so cosine similarity reduces to a
    /// dot product.
    #[must_use]
    pub fn embed(tag: &str) -> Self {
        let chars: Vec<char> = tag.chars().collect();
        let mut buckets = [0.0_f64; EMBEDDING_DIMS];

        for window in chars.windows(1) {
            accumulate(&mut buckets, window, UNIGRAM_CONSTANT);
        }
        for window in chars.windows(2) {
            accumulate(&mut buckets, window, BIGRAM_CONSTANT);
        }
        for window in chars.windows(3) {
            accumulate(&mut buckets, window, TRIGRAM_CONSTANT);
        }

        normalize(&mut buckets);
        Self { buckets }
    }

    /// Cosine similarity against another embedding, in `[-1, 1]` (in
    /// practice `[0, 1]` for these non-negative bags).
    #[must_use]
    pub fn cosine_similarity(&self, other: &TagEmbedding) -> f64 {
        self.buckets
            .iter()
            .zip(other.buckets.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Sums the bags of several tags into a single set-level embedding
    /// (used to compare whole tag sets rather than individual tags), then
    /// re-normalizes.
    #[must_use]
    pub fn embed_set<'a>(tags: impl Iterator<Item = &'a str>) -> Self {
        let mut buckets = [0.0_f64; EMBEDDING_DIMS];
        for tag in tags {
            let embedded = Self::embed(tag);
            for (slot, value) in buckets.iter_mut().zip(embedded.buckets.iter()) {
                *slot += value;
            }
        }
        normalize(&mut buckets);
        Self { buckets }
    }
}

fn accumulate(buckets: &mut [f64; EMBEDDING_DIMS], window: &[char], constant: u64) {
    let mut hash: u64 = constant;
    for ch in window {
        hash = hash
            .wrapping_mul(31)
            .wrapping_add(*ch as u64)
            .wrapping_add(constant);
    }
    let bucket = (hash % EMBEDDING_DIMS as u64) as usize;
    buckets[bucket] += 1.0;
}

fn normalize(buckets: &mut [f64; EMBEDDING_DIMS]) {
    let norm: f64 = buckets.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for slot in buckets.iter_mut() {
            *slot /= norm;
        }
    }
}

/// Compresses a tag set down to at most `cap` entries by folding
/// near-duplicates (cosine similarity above `similarity_floor`) into one
/// another, always keeping every tag for which `is_protected` returns
/// `true` regardless of similarity or the cap.
///
/// Mirrors §4.2's compression step: protected/cognitive tags are never
/// dropped; ordinary tags are deduped pairwise and the result is truncated
/// to `cap` once no further merge clears the floor.
#[must_use]
pub fn compress_tags(
    tags: &[String],
    similarity_floor: f64,
    cap: usize,
    is_protected: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut kept: Vec<(String, TagEmbedding)> = Vec::with_capacity(tags.len());

    for tag in tags {
        let embedding = TagEmbedding::embed(tag);
        let protected = is_protected(tag);
        let duplicate = !protected
            && kept
                .iter()
                .any(|(_, other)| embedding.cosine_similarity(other) >= similarity_floor);
        if !duplicate {
            kept.push((tag.clone(), embedding));
        }
    }

    if kept.len() > cap {
        let (protected, mut rest): (Vec<_>, Vec<_>) =
            kept.into_iter().partition(|(tag, _)| is_protected(tag));
        let budget = cap.saturating_sub(protected.len());
        rest.truncate(budget);
        let mut merged = protected;
        merged.extend(rest);
        kept = merged;
    }

    kept.into_iter().map(|(tag, _)| tag).collect()
}
