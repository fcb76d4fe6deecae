//! Core tensor data structures and operations.
//!
//! # Dense Row-Major Tensors
//!
//! Every array that flows through the forward and backward passes is a
//! [`Tensor`]: a shape plus a flat, row-major buffer. The numeric routines
//! only ever need rank 0 to rank 2, but the type itself does not restrict
//! rank.
//!
//! It supports:
//! - Construction with an asserted ([`Tensor::new`]) or checked
//!   ([`Tensor::try_new`]) shape/data agreement
//! - The bias trick ([`Ten64::with_ones_column`])
//! - Row-parallel matrix multiplication ([`Ten64::matmul`])
//! - Elementwise maps that preserve shape
//! - The [`tensor!`](crate::tensor) literal macro
//!
//! ## Limitations
//! - Row-major only
//! - No broadcasting or slicing beyond whole rows
//!
//! ## Example
//!
//! ```rust
//! use relu_backprop::tensors::Tensor;
//! let t = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! assert_eq!(t.shape, vec![2, 3]);
//! ```

use rayon::prelude::*;

use crate::error::{Result, ShapeError};

/// Represents an N-dimensional tensor with a shape and flat row-major data.
///
/// - All elements must be the same type (`T`).
/// - `shape` defines the structure, e.g., `[2, 3]` for a 2×3 matrix.
/// - `data` holds the flattened content in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

/// The element type used by every numeric routine.
pub type Ten64 = Tensor<f64>;

impl<T> Tensor<T> {
    /// Creates a new tensor with the given shape and flat data.
    ///
    /// # Panics
    /// Panics if the number of elements in `data` does not match the shape product.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Self {
        let shape = shape.into();
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {:?} is incompatible with {} data elements",
            shape,
            data.len()
        );
        Self { shape, data }
    }

    /// Like [`Tensor::new`], but reports the disagreement instead of panicking.
    pub fn try_new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Result<Self> {
        let shape = shape.into();
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(ShapeError::mismatch("tensor data", shape, [data.len()]));
        }
        Ok(Self { shape, data })
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Leading dimension of a rank-2 tensor; vectors and scalars count as one row.
    pub fn rows(&self) -> usize {
        match self.shape.as_slice() {
            [r, _] => *r,
            _ => 1,
        }
    }

    /// Trailing dimension of a rank-2 tensor, or the length of a vector.
    pub fn cols(&self) -> usize {
        match self.shape.as_slice() {
            [_, c] => *c,
            [c] => *c,
            _ => 1,
        }
    }

    /// Borrows row `i` of a rank-2 tensor.
    pub fn row(&self, i: usize) -> Result<&[T]> {
        let (rows, cols) = (self.rows(), self.cols());
        if self.rank() != 2 || i >= rows {
            return Err(ShapeError::mismatch("row index", [rows, cols], [i]));
        }
        Ok(&self.data[i * cols..(i + 1) * cols])
    }

    /// Applies `f` to every element, keeping the shape.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Tensor<U> {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl Ten64 {
    /// A tensor of the given shape filled with `0.0`.
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let len = shape.iter().product();
        Self::new(shape, vec![0.0; len])
    }

    /// A `(k, 1)` column vector.
    pub fn column(values: Vec<f64>) -> Self {
        Self::new(vec![values.len(), 1], values)
    }

    /// Appends a column of ones to a rank-2 tensor: `(n, k)` becomes `(n, k + 1)`.
    ///
    /// This is the bias trick: multiplying the result by a matrix whose last
    /// row holds biases computes an affine map in a single product.
    pub fn with_ones_column(&self) -> Result<Self> {
        if self.rank() != 2 {
            return Err(ShapeError::mismatch(
                "bias augmentation",
                [self.rows(), self.cols()],
                self.shape.clone(),
            ));
        }
        let (n, k) = (self.rows(), self.cols());
        let mut data = Vec::with_capacity(n * (k + 1));
        for i in 0..n {
            data.extend_from_slice(&self.data[i * k..(i + 1) * k]);
            data.push(1.0);
        }
        Ok(Self::new(vec![n, k + 1], data))
    }

    /// Matrix multiplication `C = A × B` for `A: n×k`, `B: k×m`.
    ///
    /// Output rows are computed in parallel with `rayon`.
    ///
    /// # Errors
    /// [`ShapeError::ShapeMismatch`] if either operand is not rank 2 or the
    /// inner dimensions differ.
    pub fn matmul(&self, rhs: &Ten64) -> Result<Self> {
        if self.rank() != 2 || rhs.rank() != 2 {
            return Err(ShapeError::mismatch(
                "matmul operands",
                [2, 2],
                [self.rank(), rhs.rank()],
            ));
        }
        let (n, k) = (self.rows(), self.cols());
        let m = rhs.cols();
        if rhs.rows() != k {
            return Err(ShapeError::mismatch("matmul inner dimension", [k, m], rhs.shape.clone()));
        }

        let mut out_data = vec![0.0; n * m];
        if m == 0 {
            return Ok(Self::new(vec![n, m], out_data));
        }

        let a_data = &self.data;
        let b_data = &rhs.data;
        out_data
            .par_chunks_mut(m)
            .enumerate()
            .for_each(|(i, row)| {
                for (j, out) in row.iter_mut().enumerate() {
                    let mut sum = 0.0;
                    for l in 0..k {
                        sum += a_data[i * k + l] * b_data[l * m + j];
                    }
                    *out = sum;
                }
            });

        Ok(Self::new(vec![n, m], out_data))
    }
}

/// Defines a tensor from nested literal arrays.
///
/// Supports arbitrary dimensionality as long as sublists are uniform in shape.
///
/// # Example
/// ```
/// use relu_backprop::tensor;
/// let t = tensor!([[1.0, -2.0], [3.0, 4.0]]);
/// assert_eq!(t.shape, vec![2, 2]);
/// ```
#[macro_export]
macro_rules! tensor {
    ([ $( [ $($inner:tt)* ] ),+ $(,)? ]) => {{
        let children = vec![ $( $crate::tensor!([ $($inner)* ]) ),+ ];
        let first_shape = children[0].shape.clone();
        assert!(children.iter().all(|c| c.shape == first_shape),
            "ragged tensor literal (rows have mismatched shapes)");
        let mut shape = vec![children.len()];
        shape.extend_from_slice(&first_shape);
        let mut data = Vec::with_capacity(children.len() * children[0].data.len());
        for c in children { data.extend(c.data); }
        $crate::tensors::Tensor::new(shape, data)
    }};

    ([ $( $x:expr ),+ $(,)? ]) => {{
        let data = vec![ $( $x ),+ ];
        $crate::tensors::Tensor::new(vec![data.len()], data)
    }};

    ($x:expr) => {
        $crate::tensors::Tensor::new(Vec::<usize>::new(), vec![$x])
    };
}
