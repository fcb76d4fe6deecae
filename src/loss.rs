//! Squared-error loss and its scaling convention.
//!
//! The reported loss is `(y_hat - y)^2`. The backward pass, however, seeds
//! the chain rule with `dl/dy_hat = y_hat - y`, which is the exact derivative
//! of `½ (y_hat - y)^2`. [`gradient_objective`] is that halved function;
//! finite-difference checks must differentiate it rather than
//! [`squared_loss`].

use crate::error::{Result, ShapeError};

/// Multiplier on `y_hat - y` when seeding the backward pass.
pub const LOSS_GRADIENT_SCALE: f64 = 1.0;

/// Per-example loss, `(y_hat - y)^2`.
#[inline]
pub fn squared_loss(y_hat: f64, y: f64) -> f64 {
    (y_hat - y).powi(2)
}

/// The function whose exact gradient [`gradients`](crate::gradients::gradients)
/// computes: `½ (y_hat - y)^2`.
#[inline]
pub fn gradient_objective(y_hat: f64, y: f64) -> f64 {
    0.5 * LOSS_GRADIENT_SCALE * squared_loss(y_hat, y)
}

/// `dl/dy_hat`.
#[inline]
pub fn loss_gradient(y_hat: f64, y: f64) -> f64 {
    LOSS_GRADIENT_SCALE * (y_hat - y)
}

/// Mean of [`squared_loss`] over paired predictions and targets.
///
/// Returns `NaN` for empty input.
///
/// # Errors
/// [`ShapeError::ShapeMismatch`] if the slices differ in length.
pub fn mean_squared_loss(y_hat: &[f64], y: &[f64]) -> Result<f64> {
    if y_hat.len() != y.len() {
        return Err(ShapeError::mismatch("targets", [y_hat.len()], [y.len()]));
    }
    let total: f64 = y_hat.iter().zip(y).map(|(&p, &t)| squared_loss(p, t)).sum();
    Ok(total / y.len() as f64)
}
