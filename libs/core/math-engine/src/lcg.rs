// [libs/core/math-engine/src/lcg.rs]
/*!
 * =================================================================
 * APARATO: GENERADOR LINEAL CONGRUENCIAL (LCG) DETERMINISTA
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: TABLA DE PROYECCION REPRODUCIBLE PARA EL SINGULARITY SCANNER
 *
 * The singularity scanner (§4.9) hashes each glyph's tag/position
 * vector through a fixed random projection to get its sign-LSH bucket.
 * The projection table must be identical across runs for the same seed
 * so two engines fed the same history converge on the same near-clone
 * clusters — so this is a plain LCG (same multiplier/increment shape as
 * the classic `java.util.Random` construction), not the process-seeded
 * `rand` crate.
 * =================================================================
 */

/// A 48-bit linear congruential generator, parameterized like
/// `java.util.Random`: `seed = (seed * MULTIPLIER + INCREMENT) & MASK`.
#[derive(Debug, Clone)]
pub struct DeterministicLcg {
    seed: u64,
}

const MULTIPLIER: u64 = 0x5DEECE66D;
const INCREMENT: u64 = 0xB;
const MASK: u64 = (1u64 << 48) - 1;

impl DeterministicLcg {
    /// Seeds the generator the way `java.util.Random::new` does: XOR the
    /// seed with the multiplier before masking, so even small seeds (like
    /// the engine's fixed `47`) produce well-mixed initial state.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed: (seed ^ MULTIPLIER) & MASK,
        }
    }

    fn next_bits(&mut self, bits: u32) -> u32 {
        self.seed = (self.seed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT)) & MASK;
        (self.seed >> (48 - bits)) as u32
    }

    /// Next `f64` uniform on `[0, 1)`, built from a 53-bit draw like the
    /// reference generator's `nextDouble`.
    pub fn next_f64(&mut self) -> f64 {
        let hi = self.next_bits(26) as u64;
        let lo = self.next_bits(27) as u64;
        ((hi << 27) + lo) as f64 / (1u64 << 53) as f64
    }

    /// Next standard-normal sample via Box-Muller, consuming two uniforms.
    pub fn next_gaussian(&mut self) -> f64 {
        let u1 = self.next_f64().max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Builds a fixed-length projection vector of standard-normal weights,
    /// used as one hyperplane normal in the sign-LSH table.
    pub fn projection_vector(&mut self, dims: usize) -> Vec<f64> {
        (0..dims).map(|_| self.next_gaussian()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_same_stream() {
        let mut a = DeterministicLcg::new(47);
        let mut b = DeterministicLcg::new(47);
        for _ in 0..32 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = DeterministicLcg::new(47);
        let mut b = DeterministicLcg::new(48);
        assert_ne!(a.next_f64(), b.next_f64());
    }

    #[test]
    fn uniforms_stay_in_unit_interval() {
        let mut lcg = DeterministicLcg::new(47);
        for _ in 0..1000 {
            let x = lcg.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn projection_vector_has_requested_length() {
        let mut lcg = DeterministicLcg::new(47);
        let v = lcg.projection_vector(12);
        assert_eq!(v.len(), 12);
        assert!(v.iter().all(|x| x.is_finite()));
    }

    use proptest::prelude::*;

    proptest! {
        /// Same seed always reproduces the same stream, for any seed.
        #[test]
        fn same_seed_is_always_reproducible(seed in any::<u64>(), draws in 1usize..64) {
            let mut a = DeterministicLcg::new(seed);
            let mut b = DeterministicLcg::new(seed);
            for _ in 0..draws {
                prop_assert_eq!(a.next_f64(), b.next_f64());
            }
        }

        /// Every draw stays within the documented `[0, 1)` range and every
        /// projection vector entry stays finite, for any seed.
        #[test]
        fn draws_stay_bounded_and_finite(seed in any::<u64>(), dims in 1usize..32) {
            let mut lcg = DeterministicLcg::new(seed);
            for _ in 0..32 {
                let x = lcg.next_f64();
                prop_assert!((0.0..1.0).contains(&x));
            }
            let v = lcg.projection_vector(dims);
            prop_assert_eq!(v.len(), dims);
            prop_assert!(v.iter().all(|x| x.is_finite()));
        }
    }
}
