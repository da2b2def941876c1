// [libs/core/math-engine/src/errors.rs]
// =================================================================
// APARATO: MATH ERRORS
// RESPONSABILIDAD: CATALOGO DE FALLOS ARITMETICOS DEL NUCLEO
// =================================================================

use thiserror::Error;

/// Errors raised by the defensive guards in this crate.
///
/// Normal operation never produces one of these: the helix integrator and
/// the matrix commutator test are fed values the engine already clamps to
/// finite ranges. They exist so a caller embedding this crate outside the
/// simulation core (e.g. a unit test feeding adversarial input) gets a
/// typed failure instead of a silent NaN propagating through the ODE.
#[derive(Error, Debug, PartialEq)]
pub enum MathError {
    /// A value that must be finite (not NaN or +/-Inf) was not.
    #[error("non-finite value in {context}: {value}")]
    NonFinite {
        /// Name of the quantity that failed the guard, for diagnostics.
        context: &'static str,
        /// The offending value.
        value: f64,
    },
}
