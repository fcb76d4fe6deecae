//! Single-example backpropagation.
//!
//! # Backward Pass
//!
//! Given one example `(x, y)`, its cached forward values and the output
//! weights, [`gradients`] composes the chain rule from the loss back to both
//! weight matrices:
//!
//! ```text
//! dl/dy_hat     = y_hat - y
//! dy_hat/dpre_y = relu'(pre_y)
//! dl/dtheta     = dl/dy_hat · dy_hat/dpre_y · [h, 1]
//! dl/dh         = dl/dpre_y · theta[..m]          (bias row dropped)
//! dl/dpre_h     = dl/dh ⊙ relu'(pre_h)
//! dl/dwh[i][j]  = [x, 1][i] · dl/dpre_h[j]
//! ```
//!
//! Only one example is handled per call. The forward pass is batched; pick
//! the example with [`ForwardPass::example`](crate::forward::ForwardPass::example)
//! and pass the same `x` and `y` that produced it.

use tracing::trace;

use crate::activation::relu_derivative_scalar;
use crate::error::{Result, ShapeError};
use crate::loss::loss_gradient;
use crate::tensors::Ten64;

/// One example's slice of a [`ForwardPass`](crate::forward::ForwardPass).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExampleCache<'a> {
    /// Hidden pre-activation, length `m`.
    pub pre_h: &'a [f64],
    /// Hidden activation, length `m`.
    pub h: &'a [f64],
    pub pre_y: f64,
    pub y_hat: f64,
}

impl<'a> ExampleCache<'a> {
    /// Builds a cache from loose tensors.
    ///
    /// Hidden values must be `(m,)` or `(1, m)`; `pre_y` and `y_hat` must be a
    /// scalar, `(1,)` or `(1, 1)`.
    pub fn from_tensors(
        pre_h: &'a Ten64,
        h: &'a Ten64,
        pre_y: &Ten64,
        y_hat: &Ten64,
    ) -> Result<Self> {
        let pre_h = single_row("pre_h", pre_h)?;
        let h = single_row("h", h)?;
        if pre_h.len() != h.len() {
            return Err(ShapeError::mismatch("h", [pre_h.len()], [h.len()]));
        }
        Ok(Self {
            pre_h,
            h,
            pre_y: single_value("pre_y", pre_y)?,
            y_hat: single_value("y_hat", y_hat)?,
        })
    }
}

fn single_row<'a>(context: &'static str, t: &'a Ten64) -> Result<&'a [f64]> {
    match t.shape.as_slice() {
        [_] | [1, _] => Ok(&t.data),
        _ => Err(ShapeError::mismatch(context, [1, t.cols()], t.shape.clone())),
    }
}

fn single_value(context: &'static str, t: &Ten64) -> Result<f64> {
    match (t.shape.as_slice(), t.data.as_slice()) {
        ([] | [1] | [1, 1], [v]) => Ok(*v),
        _ => Err(ShapeError::mismatch(context, [1, 1], t.shape.clone())),
    }
}

/// Gradients of the per-example loss with respect to both weight matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    /// `dl/dtheta`, shape `(m+1,)`; the last entry is the output bias.
    pub dl_dtheta: Ten64,
    /// `dl/dwh`, shape `(d+1, m)`, laid out like `Wh`.
    pub dl_dwh: Ten64,
}

/// Computes `dl/dtheta` and `dl/dwh` for one example.
///
/// `theta` may be given as `(m+1, 1)` or `(m+1,)`.
///
/// # Errors
/// [`ShapeError::ShapeMismatch`] if `cache.pre_h` and `cache.h` differ in
/// length or `theta` does not hold `m+1` weights.
///
/// # Example
/// ```rust
/// use relu_backprop::{forward::forward, gradients::gradients, tensor};
///
/// let theta = tensor!([[1.0], [0.0]]);
/// let pass = forward(&tensor!([[2.0]]), &tensor!([[1.0], [0.0]]), &theta).unwrap();
/// let grads = gradients(&[2.0], 1.0, &pass.example(0).unwrap(), &theta).unwrap();
/// assert_eq!(grads.dl_dtheta.data, vec![2.0, 1.0]);
/// assert_eq!(grads.dl_dwh.data, vec![2.0, 1.0]);
/// ```
pub fn gradients(x: &[f64], y: f64, cache: &ExampleCache<'_>, theta: &Ten64) -> Result<Gradients> {
    let m = cache.h.len();
    let d = x.len();
    if cache.pre_h.len() != m {
        return Err(ShapeError::mismatch("pre_h", [m], [cache.pre_h.len()]));
    }
    let theta_is_column = matches!(theta.shape.as_slice(), [_, 1] | [_]);
    if !theta_is_column || theta.data.len() != m + 1 {
        return Err(ShapeError::mismatch("output weights", [m + 1, 1], theta.shape.clone()));
    }

    let dl_dy_hat = loss_gradient(cache.y_hat, y);
    let dy_hat_dpre_y = relu_derivative_scalar(cache.pre_y);
    let dl_dpre_y = dl_dy_hat * dy_hat_dpre_y;
    trace!(d, m, dl_dy_hat, dl_dpre_y, "example gradients");

    // dpre_y/dtheta is the augmented hidden vector [h, 1]
    let dl_dtheta: Vec<f64> = cache
        .h
        .iter()
        .chain(std::iter::once(&1.0))
        .map(|&v| dl_dy_hat * dy_hat_dpre_y * v)
        .collect();

    // the bias row of theta does not depend on h
    let dpre_y_dh = &theta.data[..m];
    let dl_dh = dpre_y_dh.iter().map(|&w| dl_dpre_y * w);
    let dh_dpre_h = cache.pre_h.iter().map(|&p| relu_derivative_scalar(p));
    let dl_dpre_h: Vec<f64> = dl_dh.zip(dh_dpre_h).map(|(g, s)| g * s).collect();

    let mut dl_dwh = Vec::with_capacity((d + 1) * m);
    for &xi in x.iter().chain(std::iter::once(&1.0)) {
        dl_dwh.extend(dl_dpre_h.iter().map(|&g| xi * g));
    }

    Ok(Gradients {
        dl_dtheta: Ten64::new(vec![m + 1], dl_dtheta),
        dl_dwh: Ten64::new(vec![d + 1, m], dl_dwh),
    })
}
