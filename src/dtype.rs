use std::fmt::{self, Display};

use half::f16;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// The element type of a `Tensor`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    F16,
    #[default]
    F32,
    F64,
}

impl Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DType::F16 => "f16",
            DType::F32 => "f32",
            DType::F64 => "f64",
        };

        f.write_str(s)
    }
}

/// Steps to the adjacent representable value below `$x` through its bit pattern.
macro_rules! step_down {
    ($x:expr, $ty:ty, $zero:expr) => {{
        let x = $x;
        if x.is_nan() || x == <$ty>::NEG_INFINITY {
            x
        } else if x == $zero {
            -<$ty>::from_bits(1)
        } else if x > $zero {
            <$ty>::from_bits(x.to_bits() - 1)
        } else {
            <$ty>::from_bits(x.to_bits() + 1)
        }
    }};
}

/// A scalar that can be stored in a `Tensor`.
///
/// Elementwise transforms are evaluated in `f64` and narrowed back to the element type.
pub trait Element: Copy + PartialOrd + fmt::Debug + 'static {
    /// Narrows `value` to the nearest value of this type.
    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;

    /// Wraps an array of this element type in the matching `Tensor` variant.
    fn into_tensor(arr: ArrayD<Self>) -> Tensor;

    /// The next value of this type towards negative infinity.
    fn step_down(self) -> Self;

    /// The next value of this type towards positive infinity.
    fn step_up(self) -> Self;

    /// The smallest value of this type not less than `value`.
    fn ceil_from_f64(value: f64) -> Self {
        let x = Self::from_f64(value);
        if x.to_f64() < value { x.step_up() } else { x }
    }

    /// The largest value of this type not greater than `value`.
    fn floor_from_f64(value: f64) -> Self {
        let x = Self::from_f64(value);
        if x.to_f64() > value { x.step_down() } else { x }
    }

    /// The largest value of this type strictly less than `value`.
    fn below_f64(value: f64) -> Self {
        let x = Self::floor_from_f64(value);
        if x.to_f64() == value { x.step_down() } else { x }
    }
}

impl Element for f16 {
    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }

    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    fn into_tensor(arr: ArrayD<Self>) -> Tensor {
        Tensor::F16(arr)
    }

    fn step_down(self) -> Self {
        step_down!(self, f16, f16::ZERO)
    }

    fn step_up(self) -> Self {
        -Element::step_down(-self)
    }
}

impl Element for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn into_tensor(arr: ArrayD<Self>) -> Tensor {
        Tensor::F32(arr)
    }

    fn step_down(self) -> Self {
        step_down!(self, f32, 0.)
    }

    fn step_up(self) -> Self {
        -Element::step_down(-self)
    }
}

impl Element for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn into_tensor(arr: ArrayD<Self>) -> Tensor {
        Tensor::F64(arr)
    }

    fn step_down(self) -> Self {
        step_down!(self, f64, 0.)
    }

    fn step_up(self) -> Self {
        -Element::step_down(-self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_one() {
        assert_eq!(f16::below_f64(1.).to_f64(), 1. - 2f64.powi(-11));
        assert_eq!(f32::below_f64(1.).to_f64(), 1. - 2f64.powi(-24));
        assert_eq!(f64::below_f64(1.), 1. - 2f64.powi(-53));
    }

    #[test]
    fn unrepresentable_bounds_round_inward() {
        // 0.04 lies between two f16 values, the nearest one being above it
        assert!(f16::from_f64(0.04).to_f64() > 0.04);

        let hi = f16::floor_from_f64(0.04).to_f64();
        let lo = f16::ceil_from_f64(-0.04).to_f64();
        assert!(hi <= 0.04 && hi > 0.0399, "hi = {hi}");
        assert!(lo >= -0.04 && lo < -0.0399, "lo = {lo}");

        assert!(f32::floor_from_f64(0.1).to_f64() <= 0.1);
        assert!(f32::ceil_from_f64(0.1).to_f64() >= 0.1);
    }

    #[test]
    fn representable_bounds_are_kept() {
        assert_eq!(f16::floor_from_f64(0.5).to_f64(), 0.5);
        assert_eq!(f16::ceil_from_f64(-0.5).to_f64(), -0.5);
        assert_eq!(f32::floor_from_f64(f64::INFINITY), f32::INFINITY);
    }

    #[test]
    fn out_of_range_saturates_to_finite() {
        assert_eq!(f16::floor_from_f64(1e6), f16::MAX);
        assert_eq!(f16::ceil_from_f64(-1e6), f16::MIN);
    }

    #[test]
    fn steps_across_zero() {
        assert!(f32::step_down(0.) < 0.);
        assert!(f16::ZERO.step_up() > f16::ZERO);
        assert_eq!(f64::step_down(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }
}
