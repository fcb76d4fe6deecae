//! Batched forward evaluation.
//!
//! # Forward Pass
//!
//! Evaluates the network `y_hat = relu([relu([X | 1] · Wh) | 1] · Theta)` on
//! a batch and keeps every intermediate array, so the backward pass never
//! recomputes anything.
//!
//! Shape conventions:
//!
//! | array   | shape      |
//! |---------|------------|
//! | `X`     | `(n, d)`   |
//! | `Wh`    | `(d+1, m)` |
//! | `Theta` | `(m+1, 1)` |
//! | `pre_h`, `h`     | `(n, m)` |
//! | `pre_y`, `y_hat` | `(n, 1)` |
//!
//! The last row of `Wh` and of `Theta` holds the biases; they multiply the
//! constant-one column appended by [`Ten64::with_ones_column`].

use tracing::debug;

use crate::activation::relu;
use crate::error::{Result, ShapeError};
use crate::gradients::ExampleCache;
use crate::tensors::Ten64;

/// Every intermediate array of one forward evaluation.
///
/// Invariants: `h == relu(pre_h)` and `y_hat == relu(pre_y)` elementwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    /// Hidden pre-activation, `(n, m)`.
    pub pre_h: Ten64,
    /// Hidden activation, `(n, m)`.
    pub h: Ten64,
    /// Output pre-activation, `(n, 1)`.
    pub pre_y: Ten64,
    /// Prediction, `(n, 1)`.
    pub y_hat: Ten64,
}

impl ForwardPass {
    /// Number of examples evaluated.
    pub fn batch_size(&self) -> usize {
        self.y_hat.rows()
    }

    /// Hidden width `m`.
    pub fn hidden_width(&self) -> usize {
        self.h.cols()
    }

    /// Borrows the cached values of example `i`, ready for
    /// [`gradients`](crate::gradients::gradients).
    pub fn example(&self, i: usize) -> Result<ExampleCache<'_>> {
        let n = self.batch_size();
        if i >= n {
            return Err(ShapeError::mismatch("example index", [n], [i]));
        }
        let output = |context: &'static str, t: &Ten64| {
            t.data.get(i).copied().ok_or_else(|| ShapeError::mismatch(context, [n, 1], t.shape.clone()))
        };
        Ok(ExampleCache {
            pre_h: self.pre_h.row(i)?,
            h: self.h.row(i)?,
            pre_y: output("pre_y", &self.pre_y)?,
            y_hat: output("y_hat", &self.y_hat)?,
        })
    }
}

/// Normalizes an input to a rank-2 batch.
///
/// - rank 2 `(n, d)`: unchanged
/// - rank 1 `(d,)`: one example, `(1, d)`
/// - rank 0: one example of dimension one, `(1, 1)`
///
/// Anything of higher rank is a [`ShapeError::ShapeMismatch`].
pub fn as_batch(x: &Ten64) -> Result<Ten64> {
    match x.shape.as_slice() {
        [_, _] => Ok(x.clone()),
        [d] => Ok(Ten64::new(vec![1, *d], x.data.clone())),
        [] => Ok(Ten64::new(vec![1, 1], x.data.clone())),
        _ => Err(ShapeError::mismatch("input batch", [x.rows(), x.cols()], x.shape.clone())),
    }
}

/// Checks that `Wh` is `(d+1, m)` and `Theta` is `(m+1, 1)` for inputs of
/// dimension `d`. Returns `m`.
pub(crate) fn check_weights(d: usize, wh: &Ten64, theta: &Ten64) -> Result<usize> {
    if wh.rank() != 2 || wh.rows() != d + 1 {
        return Err(ShapeError::mismatch("hidden weights", [d + 1, wh.cols()], wh.shape.clone()));
    }
    let m = wh.cols();
    if theta.shape != [m + 1, 1] {
        return Err(ShapeError::mismatch("output weights", [m + 1, 1], theta.shape.clone()));
    }
    Ok(m)
}

/// Evaluates the network on a batch.
///
/// `x` may be a batch `(n, d)`, a single example `(d,)`, or a scalar; see
/// [`as_batch`].
///
/// # Errors
/// [`ShapeError::ShapeMismatch`] if `wh` is not `(d+1, m)` or `theta` is not
/// `(m+1, 1)`. All checks run before any arithmetic.
///
/// # Example
/// ```rust
/// use relu_backprop::{forward::forward, tensor};
///
/// let x = tensor!([[2.0]]);
/// let wh = tensor!([[1.0], [0.0]]);
/// let theta = tensor!([[1.0], [0.0]]);
/// let pass = forward(&x, &wh, &theta).unwrap();
/// assert_eq!(pass.y_hat.data, vec![2.0]);
/// ```
pub fn forward(x: &Ten64, wh: &Ten64, theta: &Ten64) -> Result<ForwardPass> {
    let x = as_batch(x)?;
    let (n, d) = (x.rows(), x.cols());
    let m = check_weights(d, wh, theta)?;
    debug!(n, d, m, "forward pass");

    let pre_h = x.with_ones_column()?.matmul(wh)?;
    let h = relu(&pre_h);

    let pre_y = h.with_ones_column()?.matmul(theta)?;
    let y_hat = relu(&pre_y);

    Ok(ForwardPass { pre_h, h, pre_y, y_hat })
}
