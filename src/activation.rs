//! ReLU and its derivative.
//!
//! Both the forward pass and the backward pass go through these functions, so
//! the value used at the kink ([`RELU_DERIVATIVE_AT_ZERO`]) is the same
//! everywhere.

use crate::tensors::Ten64;

/// Heaviside value at `x == 0`. The derivative of ReLU is undefined there;
/// this crate takes the subgradient `0`.
pub const RELU_DERIVATIVE_AT_ZERO: f64 = 0.0;

/// `max(x, 0)`. NaN passes through.
#[inline]
pub fn relu_scalar(x: f64) -> f64 {
    if x < 0.0 { 0.0 } else { x }
}

/// Heaviside step: `1` for `x > 0`, `0` for `x < 0`,
/// [`RELU_DERIVATIVE_AT_ZERO`] at zero.
#[inline]
pub fn relu_derivative_scalar(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        0.0
    } else if x == 0.0 {
        RELU_DERIVATIVE_AT_ZERO
    } else {
        // NaN propagates
        x
    }
}

/// Applies the ReLU activation elementwise: `$$ f(x) = \\max(0, x) $$`.
///
/// Works on any shape.
///
/// # Example
/// ```rust
/// use relu_backprop::{activation::relu, tensor};
///
/// let out = relu(&tensor!([[-1.0, 0.0], [2.5, -3.0]]));
/// assert_eq!(out.data, vec![0.0, 0.0, 2.5, 0.0]);
/// ```
pub fn relu(x: &Ten64) -> Ten64 {
    x.map(|&v| relu_scalar(v))
}

/// Elementwise derivative of [`relu`]:
/// `$$ \\frac{\\partial f}{\\partial x} = 1 \\text{ if } x > 0 \\text{ else } 0 $$`
pub fn relu_derivative(x: &Ten64) -> Ten64 {
    x.map(|&v| relu_derivative_scalar(v))
}
