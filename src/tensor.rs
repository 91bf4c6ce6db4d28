use half::f16;
use ndarray::ArrayD;

use crate::{
    InitErr, Result,
    dtype::{DType, Element},
    shape::Shape,
};

/// Applies `$body` to the array held by any `Tensor` variant, rebuilding the same variant.
macro_rules! map_variant {
    ($tensor:expr, $arr:ident => $body:expr) => {
        match $tensor {
            Tensor::F16($arr) => Tensor::F16($body),
            Tensor::F32($arr) => Tensor::F32($body),
            Tensor::F64($arr) => Tensor::F64($body),
        }
    };
}

/// Evaluates `$body` against the array held by any `Tensor` variant.
macro_rules! with_variant {
    ($tensor:expr, $arr:ident => $body:expr) => {
        match $tensor {
            Tensor::F16($arr) => $body,
            Tensor::F32($arr) => $body,
            Tensor::F64($arr) => $body,
        }
    };
}

/// An owned multi-dimensional array of a single element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    F16(ArrayD<f16>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl Tensor {
    /// Wraps raw data laid out in row major order.
    ///
    /// # Arguments
    /// * `shape` - The shape of the tensor.
    /// * `data` - Exactly `shape.elements()` values.
    ///
    /// # Returns
    /// A backend error if the amount of values does not match the shape.
    pub fn from_shape_vec<T: Element>(shape: &Shape, data: Vec<T>) -> Result<Self> {
        let arr = ArrayD::from_shape_vec(shape.to_ix(), data)?;
        Ok(T::into_tensor(arr))
    }

    /// Builds a tensor of `dtype` evaluating `f` on the `f64` view of every element of `src`.
    pub(crate) fn from_fn<T, F>(src: &ArrayD<T>, dtype: DType, f: F) -> Self
    where
        T: Element,
        F: Fn(f64) -> f64,
    {
        match dtype {
            DType::F16 => Tensor::F16(src.mapv(|x| f16::from_f64(f(x.to_f64())))),
            DType::F32 => Tensor::F32(src.mapv(|x| f(x.to_f64()) as f32)),
            DType::F64 => Tensor::F64(src.mapv(|x| f(x.to_f64()))),
        }
    }

    /// The element type of this tensor.
    pub fn dtype(&self) -> DType {
        match self {
            Tensor::F16(_) => DType::F16,
            Tensor::F32(_) => DType::F32,
            Tensor::F64(_) => DType::F64,
        }
    }

    /// The shape of this tensor.
    pub fn shape(&self) -> Result<Shape> {
        let dims: Vec<i64> =
            with_variant!(self, a => a.shape().iter().map(|&d| d as i64).collect());
        Shape::new(&dims)
    }

    /// The amount of elements in this tensor.
    pub fn len(&self) -> usize {
        with_variant!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Computes `a * x + b` for every element `x`.
    pub fn affine(self, a: f64, b: f64) -> Self {
        self.map(|x| a * x + b)
    }

    /// Clamps every element to `[lo, hi]`.
    ///
    /// Both bounds are first rounded inward to values of this tensor's element type, so no
    /// element ends up outside of `[lo, hi]` once narrowed.
    ///
    /// # Returns
    /// An `InvalidParameter` error if no value of the element type lies within the bounds,
    /// which includes reversed and NaN bounds.
    pub fn clamp(self, lo: f64, hi: f64) -> Result<Self> {
        Ok(map_variant!(self, a => clamp_elems(a, lo, hi, Upper::Closed)?))
    }

    /// Clamps every element to `[lo, hi)`.
    ///
    /// Same as `clamp`, except elements equal to `hi` are moved to the largest value of the
    /// element type below it.
    pub fn clamp_below(self, lo: f64, hi: f64) -> Result<Self> {
        Ok(map_variant!(self, a => clamp_elems(a, lo, hi, Upper::Open)?))
    }

    /// Applies `f` elementwise, evaluated in `f64` and narrowed back to this tensor's dtype.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        map_variant!(self, a => map_elems(a, &f))
    }

    /// Applies `f` to the `f64` view of every element, narrowing the results to `dtype`.
    pub fn map_into<F>(&self, dtype: DType, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        with_variant!(self, a => Tensor::from_fn(a, dtype, &f))
    }

    /// Copies every element into a `Vec<f64>` in logical (row major) order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_variant!(self, a => a.iter().map(|x| x.to_f64()).collect())
    }

    /// Returns the `f32` storage if this tensor holds `f32` elements.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            Tensor::F32(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the `f64` storage if this tensor holds `f64` elements.
    pub fn as_f64(&self) -> Option<&ArrayD<f64>> {
        match self {
            Tensor::F64(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the `f16` storage if this tensor holds `f16` elements.
    pub fn as_f16(&self) -> Option<&ArrayD<f16>> {
        match self {
            Tensor::F16(a) => Some(a),
            _ => None,
        }
    }
}

fn map_elems<T, F>(mut arr: ArrayD<T>, f: &F) -> ArrayD<T>
where
    T: Element,
    F: Fn(f64) -> f64,
{
    arr.mapv_inplace(|x| T::from_f64(f(x.to_f64())));
    arr
}

#[derive(Clone, Copy)]
enum Upper {
    Closed,
    Open,
}

fn clamp_elems<T: Element>(
    mut arr: ArrayD<T>,
    lo: f64,
    hi: f64,
    upper: Upper,
) -> Result<ArrayD<T>> {
    let lo_t = T::ceil_from_f64(lo);
    let hi_t = match upper {
        Upper::Closed => T::floor_from_f64(hi),
        Upper::Open => T::below_f64(hi),
    };

    if lo_t.partial_cmp(&hi_t).is_none_or(|ord| ord.is_gt()) {
        return Err(InitErr::param(
            "upper bound",
            hi,
            "no value of the element type lies within the bounds",
        ));
    }

    arr.mapv_inplace(|x| {
        if x < lo_t {
            lo_t
        } else if x > hi_t {
            hi_t
        } else {
            x
        }
    });

    Ok(arr)
}

impl From<ArrayD<f16>> for Tensor {
    fn from(value: ArrayD<f16>) -> Self {
        Self::F16(value)
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(value: ArrayD<f32>) -> Self {
        Self::F32(value)
    }
}

impl From<ArrayD<f64>> for Tensor {
    fn from(value: ArrayD<f64>) -> Self {
        Self::F64(value)
    }
}
