//! Small scalar helpers shared by the noise fields and the rasterizer.

/// Smoothstep `t²(3 − 2t)`.
#[inline]
pub fn smooth(t: f32) -> f32 {
    t * t * (t * -2.0 + 3.0)
}

/// Derivative of [`smooth`]: `6t(1 − t)`.
#[inline]
pub fn smooth_derivative(t: f32) -> f32 {
    6.0 * t * (1.0 - t)
}

#[inline]
pub fn smooth_f64(t: f64) -> f64 {
    t * t * (t * -2.0 + 3.0)
}

/// Linear interpolation from `low` (at 0) to `high` (at 1).
#[inline]
pub fn mix(low: f32, high: f32, t: f32) -> f32 {
    (high - low) * t + low
}

#[inline]
pub fn mix_f64(low: f64, high: f64, t: f64) -> f64 {
    (high - low) * t + low
}

/// Sum of squares of two components.
#[inline]
pub fn square2(a: f64, b: f64) -> f64 {
    a * a + b * b
}

#[inline]
pub fn floor_i32(value: f64) -> i32 {
    value.floor() as i32
}

#[inline]
pub fn ceil_i32(value: f64) -> i32 {
    value.ceil() as i32
}

/// Round to nearest, ties toward positive infinity.
#[inline]
pub fn round_half_up(value: f64) -> i32 {
    floor_i32(value + 0.5)
}

/// Smallest power of two `>= n` (with `n == 0` mapping to 1).
/// Returned as u64 so the result never overflows for any u32 input.
#[inline]
pub fn next_power_of_two(n: u32) -> u64 {
    (n as u64).next_power_of_two()
}
