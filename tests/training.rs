//! A minimal SGD loop driving the forward and backward passes. The update
//! rule lives here, not in the crate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use relu_backprop::loss::mean_squared_loss;
use relu_backprop::{Ten64, forward, gradients};

fn sgd_step(param: &mut Ten64, grad: &Ten64, lr: f64) {
    for (w, g) in param.data.iter_mut().zip(&grad.data) {
        *w -= lr * g;
    }
}

#[test]
fn test_sgd_reduces_loss_on_affine_target() {
    let (d, m, n) = (1, 4, 32);
    let mut rng = StdRng::seed_from_u64(3);

    let xs: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
    let batch = Ten64::new(vec![n, d], xs.clone());

    // positive init keeps every unit alive on x >= 0
    let mut wh = Ten64::new(vec![d + 1, m], (0..(d + 1) * m).map(|_| rng.random_range(0.1..0.5)).collect());
    let mut theta = Ten64::new(vec![m + 1, 1], (0..=m).map(|_| rng.random_range(0.1..0.5)).collect());

    let initial = mean_squared_loss(&forward(&batch, &wh, &theta).unwrap().y_hat.data, &ys).unwrap();

    let lr = 0.01;
    for _epoch in 0..200 {
        for i in 0..n {
            let x = [xs[i]];
            let pass = forward(&Ten64::new(vec![1, d], x.to_vec()), &wh, &theta).unwrap();
            let grads = gradients(&x, ys[i], &pass.example(0).unwrap(), &theta).unwrap();
            sgd_step(&mut wh, &grads.dl_dwh, lr);
            // dl_dtheta is (m+1,); theta is (m+1, 1) with the same layout
            sgd_step(&mut theta, &grads.dl_dtheta, lr);
        }
    }

    let last = mean_squared_loss(&forward(&batch, &wh, &theta).unwrap().y_hat.data, &ys).unwrap();
    assert!(last < initial, "loss went from {initial} to {last}");
    assert!(last < 0.1, "loss stalled at {last}");
}
