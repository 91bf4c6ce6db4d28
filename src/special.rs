//! Scalar special functions used by the inverse-CDF truncated normal.
//!
//! These are single precision approximations evaluated in `f64`: `erf` is accurate to about
//! `1.2e-7` and `erfinv` to a few `1e-7`, whatever the element type of the tensor they feed.

use std::f64::consts::SQRT_2;

/// The error function.
///
/// Evaluated through a Chebyshev fit of `erfc`, fractional error below `1.2e-7`.
pub fn erf(x: f64) -> f64 {
    1. - erfc(x)
}

/// The complementary error function.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1. / (1. + 0.5 * z);

    let poly = -1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));

    let ans = t * (-z * z + poly).exp();
    if x >= 0. { ans } else { 2. - ans }
}

/// The inverse of the error function on `[-1, 1]`.
///
/// Giles' single precision polynomial. Returns `±inf` at `±1` and `NaN` outside of the domain.
pub fn erfinv(x: f64) -> f64 {
    if x.is_nan() || x.abs() > 1. {
        return f64::NAN;
    }

    if x.abs() == 1. {
        return x * f64::INFINITY;
    }

    let mut w = -((1. - x) * (1. + x)).ln();

    let p = if w < 5. {
        w -= 2.5;
        let mut p = 2.810_226_36e-08;
        p = 3.432_739_39e-07 + p * w;
        p = -3.523_387_7e-06 + p * w;
        p = -4.391_506_54e-06 + p * w;
        p = 0.000_218_580_87 + p * w;
        p = -0.001_253_725_03 + p * w;
        p = -0.004_177_681_64 + p * w;
        p = 0.246_640_727 + p * w;
        1.501_409_41 + p * w
    } else {
        w = w.sqrt() - 3.;
        let mut p = -0.000_200_214_257;
        p = 0.000_100_950_558 + p * w;
        p = 0.001_349_343_22 + p * w;
        p = -0.003_673_428_44 + p * w;
        p = 0.005_739_507_73 + p * w;
        p = -0.007_622_461_3 + p * w;
        p = 0.009_438_870_47 + p * w;
        p = 1.001_674_06 + p * w;
        2.832_976_82 + p * w
    };

    p * x
}

/// The standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1. + erf(x / SQRT_2))
}
