// [libs/domain/engine/src/errors.rs]
// =================================================================
// APARATO: ENGINE ERRORS
// RESPONSABILIDAD: EL UNICO MODO DE FALLO EXTERNO DEL MOTOR
// =================================================================

use thiserror::Error;

/// The engine is a closed system during normal operation (§7): `step`,
/// `inject_concept`, and `trigger_shockwave` never fail. The only externally
/// observable error comes from `deserialize` rejecting a malformed snapshot.
#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    /// A snapshot failed validation: a required field was missing, an id
    /// collided, or a numeric field was non-finite. The engine is left in
    /// its pre-call state; there is no partial restore.
    #[error("invalid snapshot field `{field}`: {reason}")]
    InvalidSnapshot {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable reason the field was rejected.
        reason: String,
    },
}
