// [libs/core/probabilistic/src/errors.rs]
// =================================================================
// APARATO: PROBABILISTIC ERRORS
// RESPONSABILIDAD: CATALOGO DE FALLOS EN EMBEDDING Y CLUSTERING
// =================================================================

use thiserror::Error;

/// Errors raised by the tag embedding and LSH clustering helpers.
#[derive(Error, Debug, PartialEq)]
pub enum ProbabilisticError {
    /// A feature vector passed to the signature table did not match the
    /// table's configured dimensionality.
    #[error("feature vector has {actual} dims, expected {expected}")]
    DimensionMismatch {
        /// Dimensionality the table was built for.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },
}
