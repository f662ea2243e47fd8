//! Deterministic stateless hashing.
//!
//! Every procedural field in the crate derives its values from
//! `permute(permute(seed, x), y)`, so two fields built from the same seed
//! produce bit-identical output on every thread and every run.
//! The mixing constants are those of a 48-bit linear congruential generator.

/// LCG multiplier.
pub const MULTIPLIER: i64 = 0x5DEECE66D;
/// LCG addend.
pub const ADDEND: i64 = 0xB;

const INV_2_POW_24: f32 = 1.0 / 16_777_216.0;
const INV_2_POW_53: f64 = 1.0 / 9_007_199_254_740_992.0;

/// Advance an LCG state by one step.
#[inline]
pub fn next_seed(seed: i64) -> i64 {
    seed.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND)
}

/// Mix `salt` into `seed`. The rotation amount depends on the salt,
/// so consecutive coordinates land far apart.
#[inline]
pub fn permute(seed: i64, salt: i32) -> i64 {
    let mixed = seed.wrapping_add(salt as i64).wrapping_mul(MULTIPLIER);
    seed.wrapping_add(mixed.rotate_left(salt as u32 & 63))
}

/// Hash a 2D lattice coordinate under `seed`.
#[inline]
pub fn hash2(seed: i64, x: i32, y: i32) -> i64 {
    permute(permute(seed, x), y)
}

/// 32 uniformly distributed bits derived from `bits`.
#[inline]
pub fn next_int(bits: i64) -> i32 {
    ((next_seed(bits) as u64) >> 16) as i32
}

/// 64 uniformly distributed bits derived from `bits` (two LCG steps).
#[inline]
pub fn next_long(bits: i64) -> i64 {
    let high = next_seed(bits);
    let low = next_seed(high);
    ((high << 16) & (0xFFFF_FFFF_0000_0000_u64 as i64)) | (((low as u64) >> 16) as i64 & 0xFFFF_FFFF)
}

/// Signed unit float in `[-1, 1)`: the top 24 bits form the mantissa and
/// the 25th is the sign. The lower end is closed: a `next_int` of
/// `i32::MIN` gives exactly -1, as the game's hash always has.
#[inline]
pub fn unit_f32(bits: i64) -> f32 {
    (next_int(bits) >> 7) as f32 * INV_2_POW_24
}

/// Unit float in `[0, 1)` from the top 24 bits.
#[inline]
pub fn unit_f32_positive(bits: i64) -> f32 {
    ((next_int(bits) as u32) >> 8) as f32 * INV_2_POW_24
}

/// Signed unit double in `[-1, 1)` from the top 54 bits.
#[inline]
pub fn unit_f64(bits: i64) -> f64 {
    (next_long(bits) >> 10) as f64 * INV_2_POW_53
}

/// Unit double in `[0, 1)` from the top 53 bits.
#[inline]
pub fn unit_f64_positive(bits: i64) -> f64 {
    ((next_long(bits) as u64) >> 11) as f64 * INV_2_POW_53
}

/// Stateful stream over the same LCG, used where a sequence of
/// reproducible rolls is needed (rock parameters, child seeds).
#[derive(Clone, Debug)]
pub struct SeedStream(i64);

impl SeedStream {
    pub fn new(seed: i64) -> Self {
        Self(seed)
    }

    fn advance(&mut self) -> i64 {
        self.0 = next_seed(self.0);
        self.0
    }

    /// Fresh 64-bit seed for a child field.
    pub fn next_seed(&mut self) -> i64 {
        next_long(self.advance())
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        unit_f64_positive(self.advance())
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        unit_f32_positive(self.advance())
    }
}
