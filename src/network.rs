//! Weight pair of the one-hidden-layer network.
//!
//! [`Weights`] owns `Wh` and `Theta` and guarantees on construction that they
//! fit together, so the convenience methods below only ever fail on a bad
//! input batch. The same check backs its `briny` [`Validate`] impl, which
//! weight loading relies on.

use briny::prelude::{Validate, ValidationError};

use crate::error::{Result, ShapeError};
use crate::forward::{self, ForwardPass};
use crate::gradients::{self, ExampleCache, Gradients};
use crate::tensors::Ten64;

/// Hidden weights `Wh: (d+1, m)` and output weights `Theta: (m+1, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    wh: Ten64,
    theta: Ten64,
}

impl Weights {
    /// Pairs `wh` and `theta` after checking their shapes.
    ///
    /// # Errors
    /// [`ShapeError::ShapeMismatch`] if `wh` is not rank 2 with at least the
    /// bias row, or `theta` is not `(wh.cols() + 1, 1)`.
    pub fn new(wh: Ten64, theta: Ten64) -> Result<Self> {
        check_pair(&wh, &theta)?;
        Ok(Self { wh, theta })
    }

    /// Pairs `wh` and `theta` as-is. The result must go through
    /// [`Validate`] before it is used.
    pub(crate) fn unchecked(wh: Ten64, theta: Ten64) -> Self {
        Self { wh, theta }
    }

    /// All-zero weights for inputs of dimension `d` and `m` hidden units.
    pub fn zeros(d: usize, m: usize) -> Self {
        Self {
            wh: Ten64::zeros(vec![d + 1, m]),
            theta: Ten64::zeros(vec![m + 1, 1]),
        }
    }

    /// Input dimension `d`.
    pub fn input_dim(&self) -> usize {
        self.wh.rows() - 1
    }

    /// Hidden width `m`.
    pub fn hidden_width(&self) -> usize {
        self.wh.cols()
    }

    pub fn wh(&self) -> &Ten64 {
        &self.wh
    }

    pub fn theta(&self) -> &Ten64 {
        &self.theta
    }

    pub fn into_parts(self) -> (Ten64, Ten64) {
        (self.wh, self.theta)
    }

    /// See [`forward::forward`].
    pub fn forward(&self, x: &Ten64) -> Result<ForwardPass> {
        forward::forward(x, &self.wh, &self.theta)
    }

    /// See [`gradients::gradients`]. Also checks that `x` has dimension `d`.
    pub fn gradients(&self, x: &[f64], y: f64, cache: &ExampleCache<'_>) -> Result<Gradients> {
        if x.len() != self.input_dim() {
            return Err(ShapeError::mismatch("example input", [self.input_dim()], [x.len()]));
        }
        if cache.h.len() != self.hidden_width() {
            return Err(ShapeError::mismatch("h", [self.hidden_width()], [cache.h.len()]));
        }
        gradients::gradients(x, y, cache, &self.theta)
    }
}

fn check_pair(wh: &Ten64, theta: &Ten64) -> Result<usize> {
    if wh.rank() != 2 || wh.rows() == 0 {
        return Err(ShapeError::mismatch("hidden weights", [wh.rows().max(1), wh.cols()], wh.shape.clone()));
    }
    forward::check_weights(wh.rows() - 1, wh, theta)
}

impl Validate for Weights {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        check_pair(&self.wh, &self.theta).map(|_| ()).map_err(|_| ValidationError)
    }
}
