//! relu_backprop: forward evaluation and exact gradients for a
//! one-hidden-layer ReLU network with a single output.
//!
//! The network computes
//!
//! ```text
//! pre_h = [X | 1] · Wh        h     = relu(pre_h)
//! pre_y = [h | 1] · Theta     y_hat = relu(pre_y)
//! ```
//!
//! where `Wh: (d+1, m)` and `Theta: (m+1, 1)` carry their biases in the last
//! row. This crate is the numeric core of a gradient-descent loop: the loop
//! itself (learning rate, update rule, data) lives with the caller.
//!
//! # Modules
//!
//! - [`tensors`] — Row-major tensors, the bias trick and parallel matmul.
//! - [`activation`] — ReLU and its Heaviside derivative.
//! - [`forward`](mod@forward) — Batched forward pass keeping every intermediate array.
//! - [`gradients`](mod@gradients) — Single-example chain rule for `dl/dtheta` and `dl/dwh`.
//! - [`loss`] — Squared error and its scaling convention.
//! - [`network`] — Shape-checked weight pair.
//! - [`gradcheck`] — Finite-difference verification of [`gradients`](fn@gradients).
//! - [`modelio`] — Saving/loading weights in the `.bpat` format.
//! - [`approx`] — Tolerance ladder for float comparisons.
//!
//! # Example
//!
//! ```rust
//! use relu_backprop::{forward::forward, gradients::gradients, tensor};
//!
//! let x = tensor!([[2.0]]);
//! let wh = tensor!([[1.0], [0.0]]);
//! let theta = tensor!([[1.0], [0.0]]);
//!
//! let pass = forward(&x, &wh, &theta).unwrap();
//! let grads = gradients(&[2.0], 1.0, &pass.example(0).unwrap(), &theta).unwrap();
//! assert_eq!(grads.dl_dtheta.data, vec![2.0, 1.0]);
//! ```

pub mod activation;
pub mod approx;
pub mod error;
pub mod forward;
pub mod gradcheck;
pub mod gradients;
pub mod loss;
pub mod modelio;
pub mod network;
pub mod tensors;

pub use error::{ModelIoError, Result, ShapeError};
pub use forward::{ForwardPass, forward};
pub use gradients::{ExampleCache, Gradients, gradients};
pub use network::Weights;
pub use tensors::{Ten64, Tensor};
