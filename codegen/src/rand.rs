//! Counter-based uniform draws shared by generated kernels and host code.
//!
//! Element `i` of a `Rand` load with seed `s` is a pure function of `(s, i)`,
//! so results do not depend on iteration order and the host can reproduce
//! any element exactly.

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_1: u64 = 0xBF58_476D_1CE4_E5B9;
const MIX_2: u64 = 0x94D0_49BB_1331_11EB;

/// SplitMix64 output for counter `index` of stream `seed`.
pub fn splitmix64(seed: u64, index: u64) -> u64 {
    let mut z = seed.wrapping_add(index.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA));
    z = (z ^ (z >> 30)).wrapping_mul(MIX_1);
    z = (z ^ (z >> 27)).wrapping_mul(MIX_2);
    z ^ (z >> 31)
}

/// Uniform `f32` in `[0, 1)` from the top 24 bits.
pub fn uniform_f32(seed: u64, index: u64) -> f32 {
    (splitmix64(seed, index) >> 40) as f32 * (1.0 / (1u64 << 24) as f32)
}

/// Uniform `f64` in `[0, 1)` from the top 53 bits.
pub fn uniform_f64(seed: u64, index: u64) -> f64 {
    (splitmix64(seed, index) >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// C definition of the same generator, emitted into `Rand` kernels.
pub(crate) const C_SPLITMIX64: &str = "\
static inline unsigned long long kiln_splitmix64(unsigned long long seed, unsigned long long i) {
  unsigned long long z = seed + (i + 1ULL) * 0x9E3779B97F4A7C15ULL;
  z = (z ^ (z >> 30)) * 0xBF58476D1CE4E5B9ULL;
  z = (z ^ (z >> 27)) * 0x94D049BB133111EBULL;
  return z ^ (z >> 31);
}";
