use ndarray::{array, Array1, Array2};

use crate::layers::DenseGradients;
use crate::optimizer::{Adam, GradientClipper, Optimizer, OptimizerWrapper, SGD};

#[test]
fn test_sgd_update() {
    let mut optimizer = SGD::new();
    let mut weights = array![[1.0, 2.0], [3.0, 4.0]];
    let gradients = array![[0.5, -0.5], [1.0, 0.0]];
    optimizer.update_weights(0, &mut weights, &gradients, 0.1);
    let expected: Array2<f32> = array![[0.95, 2.05], [2.9, 4.0]];
    assert!(weights.iter().zip(expected.iter()).all(|(w, e)| (w - e).abs() < 1e-6));

    let mut biases = array![1.0, -1.0];
    optimizer.update_biases(0, &mut biases, &array![2.0, -2.0], 0.5);
    assert_eq!(biases, array![0.0, 0.0]);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    // After bias correction the first Adam step is lr * g / (|g| + eps)
    let mut optimizer = Adam::default();
    let mut weights = Array2::<f32>::zeros((1, 2));
    optimizer.begin_step();
    optimizer.update_weights(0, &mut weights, &array![[2.0, -3.0]], 0.1);

    assert!((weights[[0, 0]] + 0.1).abs() < 1e-5);
    assert!((weights[[0, 1]] - 0.1).abs() < 1e-5);
    assert_eq!(optimizer.t, 1);
}

#[test]
fn test_adam_keeps_moments_per_layer() {
    let mut optimizer = OptimizerWrapper::Adam(Adam::default());
    let mut first = Array1::<f32>::zeros(3);
    let mut second = Array1::<f32>::zeros(1);

    for _ in 0..5 {
        optimizer.begin_step();
        optimizer.update_biases(0, &mut first, &array![1.0, 1.0, 1.0], 0.01);
        optimizer.update_biases(1, &mut second, &array![-1.0], 0.01);
    }

    // Constant gradients: every step moves by ~lr in the opposite direction
    assert!(first.iter().all(|&b| (b + 0.05).abs() < 1e-4));
    assert!((second[0] - 0.05).abs() < 1e-4);
}

#[test]
fn test_adam_zero_gradient_leaves_parameters() {
    let mut optimizer = Adam::default();
    let mut weights = array![[0.3, -0.7]];
    optimizer.begin_step();
    optimizer.update_weights(0, &mut weights, &Array2::zeros((1, 2)), 0.1);
    assert_eq!(weights, array![[0.3, -0.7]]);
}

#[test]
fn test_gradient_clipper_scales_to_max_norm() {
    let mut gradients = vec![DenseGradients {
        weights: array![[3.0]],
        biases: array![4.0],
    }];
    let norm = GradientClipper::new(1.0).clip(&mut gradients);

    assert!((norm - 5.0).abs() < 1e-6);
    assert!((gradients[0].weights[[0, 0]] - 0.6).abs() < 1e-5);
    assert!((gradients[0].biases[0] - 0.8).abs() < 1e-5);
    assert!((GradientClipper::global_norm(&gradients) - 1.0).abs() < 1e-5);
}

#[test]
fn test_gradient_clipper_spans_layers() {
    let mut gradients = vec![
        DenseGradients {
            weights: array![[0.3]],
            biases: array![0.0],
        },
        DenseGradients {
            weights: array![[0.0]],
            biases: array![0.4],
        },
    ];
    // Global norm 0.5 is below the limit: untouched
    let norm = GradientClipper::default().clip(&mut gradients);
    assert!((norm - 0.5).abs() < 1e-6);
    assert_eq!(gradients[0].weights, array![[0.3]]);
    assert_eq!(gradients[1].biases, array![0.4]);

    let norm = GradientClipper::new(0.25).clip(&mut gradients);
    assert!((norm - 0.5).abs() < 1e-6);
    assert!((gradients[0].weights[[0, 0]] - 0.15).abs() < 1e-5);
    assert!((gradients[1].biases[0] - 0.2).abs() < 1e-5);
}
