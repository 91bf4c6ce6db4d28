//! Initial values for neural network parameters.
//!
//! Uniform and normal sampling, Kaiming and Glorot variance scaling, truncated normals and
//! helpers to wrap tensors as trainable parameters or constants. Sampling is delegated to a
//! [`Backend`], by default `ndarray` drawing from a seedable generator.

pub mod backend;
pub mod builder;
pub mod dtype;
pub mod error;
pub mod initializer;
pub mod parameter;
pub mod shape;
pub mod special;
pub mod specs;
pub mod tensor;

pub use backend::{ArrayBackend, Backend};
pub use builder::build_all;
pub use dtype::DType;
pub use error::{InitErr, Result};
pub use initializer::{Initializer, TruncMethod};
pub use parameter::{Parameter, input, no_grad, param};
pub use shape::Shape;
pub use specs::{InitConfig, InitSpec, ParamSpec};
pub use tensor::Tensor;
