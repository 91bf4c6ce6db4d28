use std::f64::consts::SQRT_2;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    InitErr, Result,
    backend::{ArrayBackend, Backend},
    dtype::DType,
    parameter::Parameter,
    shape::Shape,
    special,
    tensor::Tensor,
};

/// How `Initializer::trunc_normal_with` restricts normal samples to the cutoffs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncMethod {
    /// Samples a normal and clamps it to the cutoffs. Values beyond the cutoffs pile up on the
    /// boundaries, so this is not a true truncated normal.
    #[default]
    Clamp,
    /// Maps uniform samples through the normal CDF bounds and the inverse error function.
    ///
    /// `special::erf` and `special::erfinv` are single precision approximations, with errors
    /// around `1e-7`, so `F64` tensors do not get more accurate quantiles than `F32` ones.
    InverseCdf,
}

/// The standard deviation Kaiming schemes scale by, `sqrt(1 / fan_in)`.
///
/// # Returns
/// An `InvalidParameter` error if `fan_in` is not positive.
pub fn kaiming_stdv(fan_in: i64) -> Result<f64> {
    if fan_in <= 0 {
        return Err(InitErr::param("fan_in", fan_in as f64, "must be positive"));
    }

    Ok((1. / fan_in as f64).sqrt())
}

/// The standard deviation Glorot schemes scale by, `sqrt(2 / (fan_in + fan_out))`.
///
/// # Returns
/// An `InvalidParameter` error if `fan_in + fan_out` is not positive.
pub fn glorot_stdv(fan_in: i64, fan_out: i64) -> Result<f64> {
    let fan_sum = fan_in.saturating_add(fan_out);
    if fan_sum <= 0 {
        return Err(InitErr::param(
            "fan_in + fan_out",
            fan_sum as f64,
            "must be positive",
        ));
    }

    Ok((2. / fan_sum as f64).sqrt())
}

/// The half width of the range a uniform sample with standard deviation `stdv` spans.
pub fn uniform_limit(stdv: f64) -> f64 {
    3f64.sqrt() * stdv
}

fn check_finite(what: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(InitErr::param(what, value, "must be finite"));
    }

    Ok(())
}

fn check_stdv(stdv: f64) -> Result<()> {
    if !stdv.is_finite() || stdv <= 0. {
        return Err(InitErr::param("stdv", stdv, "must be positive and finite"));
    }

    Ok(())
}

fn check_bounds(what: &'static str, min: f64, max: f64) -> Result<()> {
    if min.is_nan() || max.is_nan() {
        return Err(InitErr::param(what, f64::NAN, "bounds must not be NaN"));
    }

    if min > max {
        return Err(InitErr::param(what, min, "lower bound exceeds upper bound"));
    }

    Ok(())
}

/// Builds initial values for neural network parameters.
///
/// Every random draw consumes entropy from the owned backend, so two initializers built from the
/// same seed produce identical tensors for the same sequence of calls.
pub struct Initializer<B: Backend = ArrayBackend> {
    backend: B,
}

impl Initializer<ArrayBackend> {
    /// Creates a new reproducible `Initializer` from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ArrayBackend::seeded(seed))
    }

    /// Creates a new `Initializer` seeded from the operating system's entropy.
    pub fn from_os_rng() -> Self {
        Self::new(ArrayBackend::from_os_rng())
    }
}

impl<B: Backend> Initializer<B> {
    /// Creates a new `Initializer`.
    ///
    /// # Arguments
    /// * `backend` - The array backend to sample from.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    // -------------------------------------------------------------------------
    // Tensors
    // -------------------------------------------------------------------------

    /// Samples uniformly on `[min, max)`.
    ///
    /// # Arguments
    /// * `shape` - The shape of the tensor.
    /// * `min` - The inclusive lower limit.
    /// * `max` - The exclusive upper limit.
    /// * `dtype` - The element type.
    ///
    /// # Returns
    /// An error if the bounds are not finite, `min > max` or the element type has no value in
    /// `[min, max)`.
    pub fn uniform(&mut self, shape: Shape, min: f64, max: f64, dtype: DType) -> Result<Tensor> {
        check_finite("min", min)?;
        check_finite("max", max)?;
        check_bounds("min", min, max)?;

        trace!(elements = shape.elements(), min = min, max = max; "uniform draw");
        let draw = self.backend.draw_uniform(&shape, dtype)?.affine(max - min, min);
        if min == max {
            return Ok(draw);
        }

        // narrowing to the element type can round onto `max`
        draw.clamp_below(min, max)
    }

    /// Samples from a normal distribution.
    ///
    /// # Arguments
    /// * `shape` - The shape of the tensor.
    /// * `stdv` - The standard deviation.
    /// * `mean` - The mean.
    /// * `dtype` - The element type.
    ///
    /// # Returns
    /// An error if `stdv` is not positive or either argument is not finite.
    pub fn normal(&mut self, shape: Shape, stdv: f64, mean: f64, dtype: DType) -> Result<Tensor> {
        check_stdv(stdv)?;
        check_finite("mean", mean)?;

        trace!(elements = shape.elements(), stdv = stdv, mean = mean; "normal draw");
        let draw = self.backend.draw_normal(&shape, dtype)?;
        Ok(draw.affine(stdv, mean))
    }

    /// Kaiming uniform initialization, samples on `[-sqrt(3 / fan_in), sqrt(3 / fan_in))`.
    pub fn kaiming_uniform(&mut self, shape: Shape, fan_in: i64, dtype: DType) -> Result<Tensor> {
        let limit = uniform_limit(kaiming_stdv(fan_in)?);
        debug!(fan_in = fan_in, limit = limit; "kaiming uniform");
        self.uniform(shape, -limit, limit, dtype)
    }

    /// Kaiming normal initialization, samples with standard deviation `sqrt(1 / fan_in)`.
    pub fn kaiming_normal(&mut self, shape: Shape, fan_in: i64, dtype: DType) -> Result<Tensor> {
        let stdv = kaiming_stdv(fan_in)?;
        debug!(fan_in = fan_in, stdv = stdv; "kaiming normal");
        self.normal(shape, stdv, 0., dtype)
    }

    /// Glorot uniform initialization, samples on `±sqrt(6 / (fan_in + fan_out))`.
    pub fn glorot_uniform(
        &mut self,
        shape: Shape,
        fan_in: i64,
        fan_out: i64,
        dtype: DType,
    ) -> Result<Tensor> {
        let limit = uniform_limit(glorot_stdv(fan_in, fan_out)?);
        debug!(fan_in = fan_in, fan_out = fan_out, limit = limit; "glorot uniform");
        self.uniform(shape, -limit, limit, dtype)
    }

    /// Glorot normal initialization, samples with standard deviation `sqrt(2 / (fan_in + fan_out))`.
    pub fn glorot_normal(
        &mut self,
        shape: Shape,
        fan_in: i64,
        fan_out: i64,
        dtype: DType,
    ) -> Result<Tensor> {
        let stdv = glorot_stdv(fan_in, fan_out)?;
        debug!(fan_in = fan_in, fan_out = fan_out, stdv = stdv; "glorot normal");
        self.normal(shape, stdv, 0., dtype)
    }

    /// Samples a normal distribution restricted to `[min_cutoff, max_cutoff]` by clamping.
    ///
    /// See `TruncMethod::Clamp`.
    pub fn trunc_normal(
        &mut self,
        shape: Shape,
        stdv: f64,
        mean: f64,
        min_cutoff: f64,
        max_cutoff: f64,
        dtype: DType,
    ) -> Result<Tensor> {
        self.trunc_normal_with(
            TruncMethod::Clamp,
            shape,
            stdv,
            mean,
            min_cutoff,
            max_cutoff,
            dtype,
        )
    }

    /// Samples a normal distribution restricted to `[min_cutoff, max_cutoff]`.
    ///
    /// # Arguments
    /// * `method` - How the samples are restricted to the cutoffs.
    /// * `shape` - The shape of the tensor.
    /// * `stdv` - The standard deviation of the untruncated distribution.
    /// * `mean` - The mean of the untruncated distribution.
    /// * `min_cutoff` - The inclusive lower cutoff, may be infinite.
    /// * `max_cutoff` - The inclusive upper cutoff, may be infinite.
    /// * `dtype` - The element type.
    ///
    /// # Returns
    /// An error if `stdv` is not positive, `mean` is not finite, the cutoffs are reversed or the
    /// element type has no value within them.
    pub fn trunc_normal_with(
        &mut self,
        method: TruncMethod,
        shape: Shape,
        stdv: f64,
        mean: f64,
        min_cutoff: f64,
        max_cutoff: f64,
        dtype: DType,
    ) -> Result<Tensor> {
        check_stdv(stdv)?;
        check_finite("mean", mean)?;
        check_bounds("min_cutoff", min_cutoff, max_cutoff)?;

        debug!(
            stdv = stdv,
            mean = mean,
            min_cutoff = min_cutoff,
            max_cutoff = max_cutoff;
            "truncated normal"
        );

        let result = match method {
            TruncMethod::Clamp => self.backend.draw_normal(&shape, dtype)?.affine(stdv, mean),
            TruncMethod::InverseCdf => {
                let l = 2. * special::normal_cdf((min_cutoff - mean) / stdv) - 1.;
                let u = 2. * special::normal_cdf((max_cutoff - mean) / stdv) - 1.;

                // erfinv diverges at ±1
                let bound = 1. - f64::EPSILON;

                self.backend
                    .draw_uniform(&shape, DType::F64)?
                    .map_into(dtype, |d| {
                        let x = (l + (u - l) * d).clamp(-bound, bound);
                        mean + stdv * SQRT_2 * special::erfinv(x)
                    })
            }
        };

        result.clamp(min_cutoff, max_cutoff)
    }

    // -------------------------------------------------------------------------
    // Parameters
    // -------------------------------------------------------------------------

    /// A parameter with every element set to `value`.
    pub fn constant(
        &self,
        value: f64,
        shape: Shape,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let tensor = self.backend.fill(&shape, value, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }

    /// A `(output_size, input_size)` parameter with every element set to `value`.
    pub fn constant_matrix(
        &self,
        value: f64,
        output_size: i64,
        input_size: i64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let shape = Shape::matrix(output_size, input_size)?;
        self.constant(value, shape, dtype, calc_grad)
    }

    /// A parameter with ones where the first two indices match and zeros elsewhere.
    pub fn identity(&self, shape: Shape, dtype: DType, calc_grad: bool) -> Result<Parameter> {
        let tensor = self.backend.identity(&shape, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }

    /// A `(output_size, input_size)` identity parameter.
    pub fn identity_matrix(
        &self,
        output_size: i64,
        input_size: i64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let shape = Shape::matrix(output_size, input_size)?;
        self.identity(shape, dtype, calc_grad)
    }

    pub fn uniform_param(
        &mut self,
        shape: Shape,
        min: f64,
        max: f64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let tensor = self.uniform(shape, min, max, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }

    pub fn uniform_matrix(
        &mut self,
        output_size: i64,
        input_size: i64,
        min: f64,
        max: f64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let shape = Shape::matrix(output_size, input_size)?;
        self.uniform_param(shape, min, max, dtype, calc_grad)
    }

    pub fn normal_param(
        &mut self,
        shape: Shape,
        stdv: f64,
        mean: f64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let tensor = self.normal(shape, stdv, mean, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }

    pub fn normal_matrix(
        &mut self,
        output_size: i64,
        input_size: i64,
        stdv: f64,
        mean: f64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let shape = Shape::matrix(output_size, input_size)?;
        self.normal_param(shape, stdv, mean, dtype, calc_grad)
    }

    pub fn kaiming_uniform_param(
        &mut self,
        shape: Shape,
        fan_in: i64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let tensor = self.kaiming_uniform(shape, fan_in, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }

    pub fn kaiming_normal_param(
        &mut self,
        shape: Shape,
        fan_in: i64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let tensor = self.kaiming_normal(shape, fan_in, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }

    pub fn glorot_uniform_param(
        &mut self,
        shape: Shape,
        fan_in: i64,
        fan_out: i64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let tensor = self.glorot_uniform(shape, fan_in, fan_out, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }

    pub fn glorot_normal_param(
        &mut self,
        shape: Shape,
        fan_in: i64,
        fan_out: i64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let tensor = self.glorot_normal(shape, fan_in, fan_out, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }

    pub fn trunc_normal_param(
        &mut self,
        shape: Shape,
        stdv: f64,
        mean: f64,
        min_cutoff: f64,
        max_cutoff: f64,
        dtype: DType,
        calc_grad: bool,
    ) -> Result<Parameter> {
        let tensor = self.trunc_normal(shape, stdv, mean, min_cutoff, max_cutoff, dtype)?;
        Ok(Parameter::new(tensor, calc_grad))
    }
}
