//! Kaiser–Bessel blobs: smooth, radially symmetric basis functions.
//!
//! A blob of radius `a`, order `m` and taper `alpha` has the profile
//!
//! ```text
//! b(r) = w^(m/2) I_m(alpha √w) / I_m(alpha),     w = 1 - (r/a)²,   r < a
//! ```
//!
//! and vanishes for `r >= a`. Its line integral along a ray passing at
//! distance `s` from the centre has the closed form implemented by
//! `projection`, which is what crystal projection footprints are built from.

use std::f64::consts::PI;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlobParams {
    /// Support radius, in voxels
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Order `m` of the modified Bessel function
    #[serde(default = "default_order")]
    pub order: u32,

    /// Taper parameter
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_radius() -> f64 { 2.0 }
fn default_order () -> u32 { 2 }
fn default_alpha () -> f64 { 10.4 }

impl Default for BlobParams {
    fn default() -> Self {
        Self { radius: default_radius(), order: default_order(), alpha: default_alpha() }
    }
}

impl BlobParams {

    pub fn new(radius: f64, order: u32, alpha: f64) -> Result<Self> {
        Self { radius, order, alpha }.validated()
    }

    /// Reject blobs whose radius or taper are not strictly positive
    pub fn validated(self) -> Result<Self> {
        if !(self.radius > 0.0) {
            return Err(Error::InvalidBlob(format!("radius must be positive, got {}", self.radius)))
        }
        if !(self.alpha > 0.0) {
            return Err(Error::InvalidBlob(format!("alpha must be positive, got {}", self.alpha)))
        }
        Ok(self)
    }

    /// Blob value at distance `r` from its centre
    pub fn value(&self, r: f64) -> f64 {
        let Self { radius: a, order: m, alpha } = *self;
        let w = 1.0 - (r / a).powi(2);
        if w <= 0.0 { return 0.0 }
        let m = m as f64;
        w.powf(m / 2.0) * bessel_i(m, alpha * w.sqrt()) / bessel_i(m, alpha)
    }

    /// Line integral of the blob along a ray passing at distance `s` from its centre
    pub fn projection(&self, s: f64) -> f64 {
        let Self { radius: a, order: m, alpha } = *self;
        let w = 1.0 - (s / a).powi(2);
        if w <= 0.0 { return 0.0 }
        let nu = m as f64 + 0.5;
        (a / bessel_i(m as f64, alpha)) * (2.0 * PI / alpha).sqrt()
            * w.powf(nu / 2.0) * bessel_i(nu, alpha * w.sqrt())
    }
}

/// Modified Bessel function of the first kind, `I_nu(x)`, for non-negative
/// integer or half-integer `nu`, summed from its power series.
pub fn bessel_i(nu: f64, x: f64) -> f64 {
    let half_x = x / 2.0;
    let q = half_x * half_x;
    let mut term = half_x.powf(nu) / gamma_of_half_integer(nu + 1.0);
    let mut sum = term;
    for k in 1..500 {
        let k = k as f64;
        term *= q / (k * (k + nu));
        sum += term;
        if term <= sum * f64::EPSILON { break }
    }
    sum
}

/// `Γ(z)` for positive `z` which is a multiple of ½
fn gamma_of_half_integer(z: f64) -> f64 {
    let (mut g, mut t) = if z.fract() == 0.0 { (1.0, 1.0) } else { (PI.sqrt(), 0.5) };
    while t < z - 0.25 {
        g *= t;
        t += 1.0;
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rstest::rstest;

    #[rstest(/**/ nu , x  , expected,
             case(0.0, 0.0, 1.0),
             case(1.0, 0.0, 0.0),
             case(0.0, 1.0, 1.266_065_877_752_008_4),
             case(1.0, 1.0, 0.565_159_103_992_485_1),
             case(2.0, 2.5, 1.276_466_147_819_164_6),
             case(0.0, 10.4, 4_116.771_616_401_387),
    )]
    fn bessel_known_values(nu: f64, x: f64, expected: f64) {
        assert_float_eq!(bessel_i(nu, x), expected, r2nd <= 1e-9);
    }

    // Half-integer orders have closed forms in terms of hyperbolic functions
    #[rstest(x, case(0.3), case(1.0), case(4.0), case(10.4))]
    fn bessel_half_integer_orders(x: f64) {
        let k = (2.0 / (PI * x)).sqrt();
        assert_float_eq!(bessel_i(0.5, x), k * x.sinh()                  , r2nd <= 1e-12);
        assert_float_eq!(bessel_i(1.5, x), k * (x.cosh() - x.sinh() / x) , r2nd <= 1e-12);
    }

    #[test]
    fn gamma_at_half_integers() {
        assert_float_eq!(gamma_of_half_integer(1.0), 1.0, ulps <= 1);
        assert_float_eq!(gamma_of_half_integer(5.0), 24.0, ulps <= 1);
        assert_float_eq!(gamma_of_half_integer(0.5), PI.sqrt(), ulps <= 1);
        assert_float_eq!(gamma_of_half_integer(3.5), 15.0 / 8.0 * PI.sqrt(), r2nd <= 1e-15);
    }

    #[rstest(/**/ radius, alpha, ok,
             case( 2.0 , 10.4, true ),
             case( 0.0 , 10.4, false),
             case(-1.0 , 10.4, false),
             case( 2.0 ,  0.0, false),
             case( 2.0 , f64::NAN, false),
    )]
    fn blob_validation(radius: f64, alpha: f64, ok: bool) {
        let result = BlobParams::new(radius, 2, alpha);
        assert_eq!(result.is_ok(), ok);
        if !ok { assert!(matches!(result, Err(Error::InvalidBlob(_)))) }
    }

    #[test]
    fn blob_profile() {
        let blob = BlobParams::default();
        assert_float_eq!(blob.value(0.0), 1.0, ulps <= 2);
        assert_eq!(blob.value(blob.radius), 0.0);
        assert_eq!(blob.value(blob.radius + 0.1), 0.0);
        assert_eq!(blob.projection(blob.radius), 0.0);
        // Monotonically decreasing away from the centre
        let samples: Vec<f64> = (0..20).map(|n| blob.value(n as f64 * 0.1)).collect();
        assert!(samples.windows(2).all(|w| w[0] > w[1]));
    }

    /// Integrate `f` over `[lo, hi]` with Simpson's rule
    fn simpson(f: impl Fn(f64) -> f64, lo: f64, hi: f64, n: usize) -> f64 {
        let h = (hi - lo) / n as f64;
        let inner: f64 = (1..n)
            .map(|i| f(lo + i as f64 * h) * if i % 2 == 1 { 4.0 } else { 2.0 })
            .sum();
        (f(lo) + f(hi) + inner) * h / 3.0
    }

    // The closed-form projection agrees with numerically integrating the
    // profile along the ray.
    #[rstest(/**/ radius, order, alpha,  s ,
             case(  2.0 ,   2  , 10.4 , 0.0),
             case(  2.0 ,   2  , 10.4 , 0.7),
             case(  2.0 ,   2  , 10.4 , 1.6),
             case(  1.5 ,   1  ,  6.0 , 0.4),
             case(  3.0 ,   3  , 12.0 , 1.0),
    )]
    fn projection_is_line_integral(radius: f64, order: u32, alpha: f64, s: f64) {
        let blob = BlobParams::new(radius, order, alpha).unwrap();
        let half_chord = (radius * radius - s * s).sqrt();
        let numeric = simpson(|t| blob.value((s * s + t * t).sqrt()), -half_chord, half_chord, 4000);
        assert_float_eq!(blob.projection(s), numeric, r2nd <= 1e-6);
    }

    #[test]
    fn deserialize_with_defaults() {
        let blob: BlobParams = toml::from_str("radius = 1.5").unwrap();
        assert_eq!(blob, BlobParams { radius: 1.5, ..BlobParams::default() });
    }
}
