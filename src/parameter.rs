use crate::{Result, dtype::DType, shape::Shape, tensor::Tensor};

/// A tensor tagged with whether it participates in gradient-based optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    tensor: Tensor,
    requires_grad: bool,
}

impl Parameter {
    /// Creates a new `Parameter`.
    ///
    /// # Arguments
    /// * `tensor` - The initial value.
    /// * `requires_grad` - Whether gradients should be tracked for this parameter.
    pub fn new(tensor: Tensor, requires_grad: bool) -> Self {
        Self {
            tensor,
            requires_grad,
        }
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn into_tensor(self) -> Tensor {
        self.tensor
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn dtype(&self) -> DType {
        self.tensor.dtype()
    }

    pub fn shape(&self) -> Result<Shape> {
        self.tensor.shape()
    }
}

/// Wraps `tensor` as a constant input, gradients are not tracked.
pub fn input(tensor: Tensor) -> Parameter {
    Parameter::new(tensor, false)
}

/// Same as `input`.
pub fn no_grad(tensor: Tensor) -> Parameter {
    Parameter::new(tensor, false)
}

/// Wraps `tensor` as a trainable parameter.
pub fn param(tensor: Tensor) -> Parameter {
    Parameter::new(tensor, true)
}
