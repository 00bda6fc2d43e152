use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activations::Activation;
use crate::error::DqnError;
use crate::layers::{DenseLayer, WeightInit};

#[test]
fn test_dense_layer_shapes() {
    let mut rng = StdRng::seed_from_u64(1);
    let layer = DenseLayer::new(3, 5, &WeightInit::default(), &mut rng);
    assert_eq!(layer.weights.shape(), [3, 5]);
    assert_eq!(layer.biases.shape(), [5]);
    assert_eq!(layer.input_size(), 3);
    assert_eq!(layer.output_size(), 5);
}

#[test]
fn test_fan_in_uniform_bounds() {
    let mut rng = StdRng::seed_from_u64(2);
    let layer = DenseLayer::new(16, 8, &WeightInit::FanInUniform, &mut rng);
    let limit = 1.0 / 4.0;
    assert!(layer.weights.iter().all(|w| w.abs() <= limit));
    assert!(layer.biases.iter().all(|b| b.abs() <= limit));
}

#[test]
fn test_initialization_is_seeded() {
    let a = DenseLayer::new(4, 4, &WeightInit::HeUniform, &mut StdRng::seed_from_u64(9));
    let b = DenseLayer::new(4, 4, &WeightInit::HeUniform, &mut StdRng::seed_from_u64(9));
    let c = DenseLayer::new(4, 4, &WeightInit::HeUniform, &mut StdRng::seed_from_u64(10));
    assert_eq!(a, b);
    assert_ne!(a, c);
    // He and Xavier start with zero biases
    assert!(a.biases.iter().all(|&b| b == 0.0));
}

#[test]
fn test_uniform_range_validation() {
    assert!(WeightInit::Uniform { min: -0.1, max: 0.1 }.validate().is_ok());
    assert!(matches!(
        WeightInit::Uniform { min: 1.0, max: -1.0 }.validate(),
        Err(DqnError::InvalidParameter { .. })
    ));
}

#[test]
fn test_from_parts_checks_bias_length() {
    let weights = Array2::zeros((2, 3));
    assert!(DenseLayer::from_parts(weights.clone(), array![0.0, 0.0, 0.0]).is_ok());
    assert!(matches!(
        DenseLayer::from_parts(weights, array![0.0, 0.0]),
        Err(DqnError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_forward_and_backward_batch() {
    let layer = DenseLayer::from_parts(array![[1.0, -1.0], [2.0, 0.5]], array![0.5, 0.0]).unwrap();
    let inputs = array![[1.0, 1.0], [0.0, -1.0]];

    // z = x·W + b = [[3.5, -0.5], [-1.5, -0.5]]
    let (outputs, cache) = layer.forward_batch(inputs.view(), Activation::Relu);
    assert_eq!(outputs, array![[3.5, 0.0], [0.0, 0.0]]);
    assert_eq!(cache.pre_activation, array![[3.5, -0.5], [-1.5, -0.5]]);

    let errors = array![[1.0, 1.0], [1.0, 1.0]];
    let (input_errors, gradients) = layer.backward_batch(&cache, errors.view(), Activation::Relu);

    // Only the first sample's first unit is active
    assert_eq!(gradients.weights, array![[1.0, 0.0], [1.0, 0.0]]);
    assert_eq!(gradients.biases, array![1.0, 0.0]);
    assert_eq!(input_errors, array![[1.0, 2.0], [0.0, 0.0]]);
}
