//! Finite-difference gradient checking.
//!
//! Perturbs every weight by `±eps`, reruns the forward pass on one example
//! and differentiates [`gradient_objective`] by central differences. Agreement
//! with [`gradients`](crate::gradients::gradients) is only expected away from
//! ReLU kinks.

use crate::approx::{ApproxEquality, RelativeEq};
use crate::error::{Result, ShapeError};
use crate::gradients::Gradients;
use crate::loss::gradient_objective;
use crate::network::Weights;
use crate::tensors::Ten64;

fn objective(x: &Ten64, y: f64, wh: &Ten64, theta: &Ten64) -> Result<f64> {
    let pass = crate::forward::forward(x, wh, theta)?;
    Ok(gradient_objective(pass.y_hat.data[0], y))
}

/// `d eval / d params[i]` for every entry, by central differences.
fn central_differences(
    params: &Ten64,
    eps: f64,
    mut eval: impl FnMut(&Ten64) -> Result<f64>,
) -> Result<Vec<f64>> {
    let mut p = params.clone();
    (0..p.data.len())
        .map(|i| {
            let original = p.data[i];
            p.data[i] = original + eps;
            let plus = eval(&p)?;
            p.data[i] = original - eps;
            let minus = eval(&p)?;
            p.data[i] = original;
            Ok((plus - minus) / (2.0 * eps))
        })
        .collect()
}

/// Numerical gradients of one example, shaped like [`gradients`](crate::gradients::gradients)'
/// output.
///
/// # Errors
/// [`ShapeError::ShapeMismatch`] if `x` does not have `weights.input_dim()`
/// entries.
pub fn numerical_gradients(x: &[f64], y: f64, weights: &Weights, eps: f64) -> Result<Gradients> {
    if x.len() != weights.input_dim() {
        return Err(ShapeError::mismatch("example input", [weights.input_dim()], [x.len()]));
    }
    let x = Ten64::new(vec![1, x.len()], x.to_vec());
    let (wh, theta) = (weights.wh(), weights.theta());

    let dl_dwh = central_differences(wh, eps, |wh| objective(&x, y, wh, theta))?;
    let dl_dtheta = central_differences(theta, eps, |theta| objective(&x, y, wh, theta))?;

    Ok(Gradients {
        dl_dtheta: Ten64::new(vec![theta.rows()], dl_dtheta),
        dl_dwh: Ten64::new(wh.shape.clone(), dl_dwh),
    })
}

/// Largest absolute entrywise gap between two gradient bundles.
///
/// Bundles of different shapes are infinitely far apart.
pub fn max_abs_difference(a: &Gradients, b: &Gradients) -> f64 {
    if a.dl_dtheta.shape != b.dl_dtheta.shape || a.dl_dwh.shape != b.dl_dwh.shape {
        return f64::INFINITY;
    }
    a.dl_dtheta
        .data
        .iter()
        .zip(&b.dl_dtheta.data)
        .chain(a.dl_dwh.data.iter().zip(&b.dl_dwh.data))
        .map(|(p, q)| (p - q).abs())
        .fold(0.0, f64::max)
}

impl RelativeEq<Self> for Gradients {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        if self.dl_dtheta.shape != rhs.dl_dtheta.shape || self.dl_dwh.shape != rhs.dl_dwh.shape {
            return ApproxEquality::Scarce;
        }
        self.dl_dtheta.data[..]
            .approx_eq(&rhs.dl_dtheta.data[..])
            .max(self.dl_dwh.data[..].approx_eq(&rhs.dl_dwh.data[..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx::approx_eq;
    use crate::tensor;

    #[test]
    fn matches_analytic_on_single_unit() {
        let w = Weights::new(tensor!([[1.0], [0.0]]), tensor!([[1.0], [0.0]])).unwrap();
        let pass = w.forward(&tensor!([[2.0]])).unwrap();
        let analytic = w.gradients(&[2.0], 1.0, &pass.example(0).unwrap()).unwrap();
        let numeric = numerical_gradients(&[2.0], 1.0, &w, 1e-6).unwrap();
        assert!(max_abs_difference(&analytic, &numeric) < 1e-4);
        assert!(approx_eq(&analytic, &numeric, ApproxEquality::Partial));
    }

    #[test]
    fn shape_disagreement_is_infinite() {
        let a = Gradients { dl_dtheta: Ten64::zeros(vec![2]), dl_dwh: Ten64::zeros(vec![2, 1]) };
        let b = Gradients { dl_dtheta: Ten64::zeros(vec![3]), dl_dwh: Ten64::zeros(vec![2, 2]) };
        assert_eq!(max_abs_difference(&a, &b), f64::INFINITY);
        assert_eq!(a.approx_eq(&b), ApproxEquality::Scarce);
    }

    #[test]
    fn rejects_wrong_input_dimension() {
        assert!(numerical_gradients(&[1.0, 2.0], 0.0, &Weights::zeros(1, 2), 1e-6).is_err());
    }
}
