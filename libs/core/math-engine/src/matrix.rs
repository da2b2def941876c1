// [libs/core/math-engine/src/matrix.rs]
/*!
 * =================================================================
 * APARATO: 2x2 PHASE TENSOR ALGEBRA
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: MULTIPLICACION, CONMUTADOR Y NORMA DE FROBENIUS
 *
 * Backs the pool/shortcut system's "does this pair of glyphs commute"
 * test (§4.10): two 2x2 real matrices derived from thermodynamic
 * state are multiplied in both orders, and the pool only activates when
 * the commutator is non-trivial and "energetic" enough.
 * =================================================================
 */

/// A dense 2x2 matrix of `f64`, row-major (`[[a, b], [c, d]]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Matrix2 {
    /// Builds a matrix from row-major entries.
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// The zero matrix.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Standard matrix product `self * other`.
    #[must_use]
    pub fn mul(&self, other: &Matrix2) -> Matrix2 {
        Matrix2::new(
            self.a * other.a + self.b * other.c,
            self.a * other.b + self.b * other.d,
            self.c * other.a + self.d * other.c,
            self.c * other.b + self.d * other.d,
        )
    }

    /// `self - other`, entrywise.
    #[must_use]
    pub fn sub(&self, other: &Matrix2) -> Matrix2 {
        Matrix2::new(
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
        )
    }

    /// Trace (`a + d`).
    #[must_use]
    pub fn trace(&self) -> f64 {
        self.a + self.d
    }

    /// Frobenius norm, `sqrt(sum of squares of entries)`.
    #[must_use]
    pub fn frobenius_norm(&self) -> f64 {
        (self.a * self.a + self.b * self.b + self.c * self.c + self.d * self.d).sqrt()
    }

    /// The commutator `[g, g'] = g*g' - g'*g`.
    #[must_use]
    pub fn commutator(g: &Matrix2, g_prime: &Matrix2) -> Matrix2 {
        g.mul(g_prime).sub(&g_prime.mul(g))
    }
}

/// Result of testing whether a pair of phase tensors activates a pool
/// shortcut, per §4.10: the commutator must be non-trivial (Frobenius
/// norm above a floor) and at least one product ordering must carry enough
/// trace to clear the half-hbar analogue.
#[derive(Debug, Clone, Copy)]
pub struct CommutatorTest {
    pub commutator_norm: f64,
    pub max_product_trace: f64,
}

impl CommutatorTest {
    /// Runs the test for a pair of phase tensors `g`, `g_prime`.
    #[must_use]
    pub fn evaluate(g: &Matrix2, g_prime: &Matrix2) -> Self {
        let commutator_norm = Matrix2::commutator(g, g_prime).frobenius_norm();
        let max_product_trace = g.mul(g_prime).trace().max(g_prime.mul(g).trace());
        Self {
            commutator_norm,
            max_product_trace,
        }
    }

    /// Whether the pool should activate: non-commuting (norm above
    /// `commutator_floor`) and energetic enough (trace at or above
    /// `trace_floor`, the `HBAR_OVER_2` constant at the call site).
    #[must_use]
    pub fn activates(&self, commutator_floor: f64, trace_floor: f64) -> bool {
        self.commutator_norm > commutator_floor && self.max_product_trace >= trace_floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_commutes_with_anything() {
        let identity = Matrix2::new(1.0, 0.0, 0.0, 1.0);
        let other = Matrix2::new(3.0, 1.0, 2.0, 5.0);
        let test = CommutatorTest::evaluate(&identity, &other);
        assert!(test.commutator_norm < 1e-12);
    }

    #[test]
    fn non_commuting_pair_has_positive_norm() {
        let g = Matrix2::new(1.0, 1.0, 0.0, 1.0);
        let g_prime = Matrix2::new(1.0, 0.0, 1.0, 1.0);
        let test = CommutatorTest::evaluate(&g, &g_prime);
        assert!(test.commutator_norm > 0.0);
    }

    #[test]
    fn activation_requires_both_conditions() {
        let g = Matrix2::new(1.0, 1.0, 0.0, 1.0);
        let g_prime = Matrix2::new(1.0, 0.0, 1.0, 1.0);
        let test = CommutatorTest::evaluate(&g, &g_prime);
        assert!(!test.activates(f64::MAX, 0.0));
        assert!(!test.activates(0.0, f64::MAX));
    }

    use proptest::prelude::*;

    fn arbitrary_matrix() -> impl Strategy<Value = Matrix2> {
        (-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0)
            .prop_map(|(a, b, c, d)| Matrix2::new(a, b, c, d))
    }

    proptest! {
        /// Frobenius norm is never negative.
        #[test]
        fn frobenius_norm_is_nonnegative(m in arbitrary_matrix()) {
            prop_assert!(m.frobenius_norm() >= 0.0);
        }

        /// A matrix always commutes with itself.
        #[test]
        fn self_commutator_is_zero(m in arbitrary_matrix()) {
            let zero = Matrix2::commutator(&m, &m);
            prop_assert!(zero.frobenius_norm() < 1e-6);
        }

        /// Swapping the operands negates the commutator entrywise.
        #[test]
        fn commutator_is_antisymmetric(g in arbitrary_matrix(), g_prime in arbitrary_matrix()) {
            let forward = Matrix2::commutator(&g, &g_prime);
            let backward = Matrix2::commutator(&g_prime, &g);
            prop_assert!((forward.a + backward.a).abs() < 1e-6);
            prop_assert!((forward.b + backward.b).abs() < 1e-6);
            prop_assert!((forward.c + backward.c).abs() < 1e-6);
            prop_assert!((forward.d + backward.d).abs() < 1e-6);
        }
    }
}
