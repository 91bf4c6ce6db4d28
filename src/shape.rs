use std::fmt::{self, Display};

use ndarray::IxDyn;

use crate::{InitErr, Result};

/// The maximum amount of dimensions a `Shape` can describe.
pub const MAX_DIMS: usize = 4;

/// The extents of a tensor, up to `MAX_DIMS` dimensions.
///
/// Unused trailing dimensions have size 1. The shape also remembers how many
/// dimensions were given explicitly so the produced arrays keep that rank.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Shape {
    dims: [usize; MAX_DIMS],
    rank: usize,
}

impl Shape {
    /// Creates a new `Shape` from signed extents.
    ///
    /// # Arguments
    /// * `dims` - Between 0 and `MAX_DIMS` extents, none of them negative.
    ///
    /// # Returns
    /// An `InvalidShape` error if an extent is negative, there are too many of them or they
    /// describe more than `isize::MAX` elements.
    pub fn new(dims: &[i64]) -> Result<Self> {
        if dims.len() > MAX_DIMS {
            return Err(InitErr::InvalidShape(format!(
                "got {} dimensions, at most {MAX_DIMS} are supported",
                dims.len()
            )));
        }

        let mut padded = [1; MAX_DIMS];
        // zero extents are skipped, ndarray bounds the product of the non-zero ones
        let mut elements: usize = 1;
        for (i, &d) in dims.iter().enumerate() {
            if d < 0 {
                return Err(InitErr::InvalidShape(format!(
                    "dimension {i} has negative size {d}"
                )));
            }

            let extent = usize::try_from(d)
                .map_err(|_| InitErr::InvalidShape(format!("dimension {i} is too large: {d}")))?;

            elements = elements
                .checked_mul(extent.max(1))
                .filter(|&n| n <= isize::MAX as usize)
                .ok_or_else(|| {
                    InitErr::InvalidShape(format!("{dims:?} holds more than isize::MAX elements"))
                })?;

            padded[i] = extent;
        }

        Ok(Self {
            dims: padded,
            rank: dims.len().max(1),
        })
    }

    /// Creates the 2-D shape `(output_size, input_size)`.
    pub fn matrix(output_size: i64, input_size: i64) -> Result<Self> {
        Self::new(&[output_size, input_size])
    }

    /// The explicit extents of this shape.
    pub fn dims(&self) -> &[usize] {
        &self.dims[..self.rank]
    }

    /// All `MAX_DIMS` extents, trailing ones included.
    pub fn padded(&self) -> [usize; MAX_DIMS] {
        self.dims
    }

    /// The amount of explicit dimensions.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The total amount of elements, at most `isize::MAX`.
    pub fn elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// The ndarray dimension for this shape.
    pub fn to_ix(&self) -> IxDyn {
        IxDyn(self.dims())
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
    }
}

impl TryFrom<&[i64]> for Shape {
    type Error = InitErr;

    fn try_from(value: &[i64]) -> Result<Self> {
        Self::new(value)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<_> = self.dims().iter().map(usize::to_string).collect();
        write!(f, "({})", dims.join(", "))
    }
}
