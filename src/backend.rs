use half::f16;
use ndarray::{ArrayD, Dimension};
use ndarray_rand::RandomExt;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Normal, Uniform};

use crate::{
    Result,
    dtype::{DType, Element},
    shape::Shape,
    tensor::Tensor,
};

/// Amount of evenly spaced `f16` values uniform draws pick from.
///
/// `f16` carries 11 significant bits, so `k / 2048` is exact for every `k < 2048`.
const HALF_STEPS: u16 = 1 << 11;

/// The array library an `Initializer` delegates storage and sampling to.
pub trait Backend {
    /// Should draw independent samples uniform on `[0, 1)`.
    ///
    /// # Arguments
    /// * `shape` - The shape of the resulting tensor.
    /// * `dtype` - The element type of the resulting tensor.
    fn draw_uniform(&mut self, shape: &Shape, dtype: DType) -> Result<Tensor>;

    /// Should draw independent samples from the standard normal distribution.
    ///
    /// # Arguments
    /// * `shape` - The shape of the resulting tensor.
    /// * `dtype` - The element type of the resulting tensor.
    fn draw_normal(&mut self, shape: &Shape, dtype: DType) -> Result<Tensor>;

    /// Should build a tensor with every element set to `value`.
    fn fill(&self, shape: &Shape, value: f64, dtype: DType) -> Result<Tensor>;

    /// Should build a tensor with ones where the first two indices match and zeros elsewhere.
    fn identity(&self, shape: &Shape, dtype: DType) -> Result<Tensor>;
}

/// A `Backend` over `ndarray` drawing from an owned random number generator.
pub struct ArrayBackend<R: Rng = StdRng> {
    rng: R,
}

impl<R: Rng> ArrayBackend<R> {
    /// Creates a new `ArrayBackend`.
    ///
    /// # Arguments
    /// * `rng` - The random number generator every draw consumes.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl ArrayBackend<StdRng> {
    /// Creates a new reproducible `ArrayBackend` from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Creates a new `ArrayBackend` seeded from the operating system's entropy.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Generates a backend given (or not) a seed.
    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os_rng(),
        }
    }
}

impl<R: Rng> Backend for ArrayBackend<R> {
    fn draw_uniform(&mut self, shape: &Shape, dtype: DType) -> Result<Tensor> {
        let ix = shape.to_ix();
        let rng = &mut self.rng;

        let tensor = match dtype {
            DType::F16 => {
                // narrowing an f32 draw to f16 may round it up to 1
                let steps = ArrayD::<u16>::random_using(ix, Uniform::new(0, HALF_STEPS)?, rng);
                Tensor::F16(steps.mapv(|k| f16::from_f32(k as f32 / HALF_STEPS as f32)))
            }
            DType::F32 => Tensor::F32(ArrayD::random_using(ix, Uniform::new(0f32, 1.)?, rng)),
            DType::F64 => Tensor::F64(ArrayD::random_using(ix, Uniform::new(0f64, 1.)?, rng)),
        };

        Ok(tensor)
    }

    fn draw_normal(&mut self, shape: &Shape, dtype: DType) -> Result<Tensor> {
        let ix = shape.to_ix();
        let rng = &mut self.rng;

        let tensor = match dtype {
            DType::F16 => {
                let draw = ArrayD::<f32>::random_using(ix, Normal::new(0f32, 1.)?, rng);
                Tensor::F16(draw.mapv(f16::from_f32))
            }
            DType::F32 => Tensor::F32(ArrayD::random_using(ix, Normal::new(0f32, 1.)?, rng)),
            DType::F64 => Tensor::F64(ArrayD::random_using(ix, Normal::new(0f64, 1.)?, rng)),
        };

        Ok(tensor)
    }

    fn fill(&self, shape: &Shape, value: f64, dtype: DType) -> Result<Tensor> {
        let ix = shape.to_ix();

        let tensor = match dtype {
            DType::F16 => Tensor::F16(ArrayD::from_elem(ix, f16::from_f64(value))),
            DType::F32 => Tensor::F32(ArrayD::from_elem(ix, f32::from_f64(value))),
            DType::F64 => Tensor::F64(ArrayD::from_elem(ix, value)),
        };

        Ok(tensor)
    }

    fn identity(&self, shape: &Shape, dtype: DType) -> Result<Tensor> {
        let eye = ArrayD::from_shape_fn(shape.to_ix(), |idx| {
            let row = idx[0];
            let col = if idx.ndim() > 1 { idx[1] } else { 0 };
            (row == col) as u8 as f64
        });

        Ok(Tensor::from_fn(&eye, dtype, |x| x))
    }
}
