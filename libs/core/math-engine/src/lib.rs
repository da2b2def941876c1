// [libs/core/math-engine/src/lib.rs]
#![deny(missing_docs)]

/*!
 * =================================================================
 * APARATO: CORE MATH MASTER HUB
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: ORQUESTACIÓN DE PRIMITIVAS NUMERICAS SIN ESTADO
 *
 * Stateless numeric primitives shared by the simulation core: 2x2 phase
 * tensor algebra and the commutator test behind pool activation, the
 * helix self-coupled oscillator, a deterministic LCG for the singularity
 * scanner's projection table, and the defensive numeric guards the rest
 * of the crate leans on. This crate knows nothing about glyphs, tags, or
 * ticks — domain vocabulary stays out of the L1 layer.
 * =================================================================
 */

/// Catalogo de fallos aritmeticos del nucleo.
pub mod errors;
/// Guardas numericas defensivas (division segura, clamping, finitud).
pub mod guard;
/// El oscilador auto-acoplado helix y su detector de estabilidad.
pub mod helix;
/// Un LCG de 48 bits determinista para proyecciones reproducibles.
pub mod lcg;
/// Algebra de matrices 2x2 reales y el test de conmutador de activacion.
pub mod matrix;

/**
 * PRELUDIO MATEMATICO
 *
 * Superficie publica de conveniencia para `use crucible_core_math::prelude::*`
 * desde los estratos superiores del workspace.
 */
pub mod prelude {
    pub use crate::errors::MathError;
    pub use crate::guard::{clamp, clamp01, ln1p_nonneg, require_finite, safe_div, EPSILON};
    pub use crate::helix::{HelixParams, HelixState, StabilityWindow};
    pub use crate::lcg::DeterministicLcg;
    pub use crate::matrix::{CommutatorTest, Matrix2};
}
