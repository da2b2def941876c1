// [libs/core/probabilistic/src/lib.rs]

#![deny(missing_docs)]

//! # APARATO: PROBABILISTIC STRATUM ROOT
//! CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
//! RESPONSABILIDAD: EMBEDDING DE TAGS Y CLUSTERING LSH
//!
//! Two independent pieces of math live here, both shared by the domain
//! engine but neither aware of glyph vocabulary: the hashed tag-bag
//! embedding behind tag compression, and the exact-hash / sign-LSH
//! clustering behind the singularity scanner.

/// Definiciones de errores para el triaje programatico de fallos.
pub mod errors;

/// Clustering exacto y firmas sign-LSH para el escaner de singularidad.
pub mod lsh;

/// Embedding hasheado de trigramas/bigramas/unigramas para compresion de tags.
pub mod tag_embedding;

/**
 * PRELUDIO PROBABILISTICO
 *
 * Coleccion de tipos de alta frecuencia para inyeccion directa en el motor.
 */
pub mod prelude {
    pub use crate::errors::ProbabilisticError;
    pub use crate::lsh::{
        cosine_similarity, exact_hash_clusters, exact_hash_key, signature_buckets,
        SignatureTable, SIGNATURE_BITS,
    };
    pub use crate::tag_embedding::{compress_tags, TagEmbedding, EMBEDDING_DIMS};
}
