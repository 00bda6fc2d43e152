use ndarray::array;
use crate::activations::Activation;

#[test]
fn test_relu_clamps_negatives() {
    let mut data = array![[-2.0, -0.0, 0.0, 3.5]];
    Activation::Relu.apply_batch(&mut data);
    assert_eq!(data, array![[0.0, 0.0, 0.0, 3.5]]);
}

#[test]
fn test_linear_is_identity() {
    let mut data = array![[-2.0, 1.0], [0.25, 7.0]];
    let expected = data.clone();
    Activation::Linear.apply_batch(&mut data);
    assert_eq!(data, expected);
}

#[test]
fn test_derivatives() {
    let z = array![[-1.0, 0.0, 2.0]];
    assert_eq!(Activation::Relu.derivative_batch(z.view()), array![[0.0, 0.0, 1.0]]);
    assert_eq!(Activation::Linear.derivative_batch(z.view()), array![[1.0, 1.0, 1.0]]);
}

#[test]
fn test_output_layer_is_linear() {
    assert_eq!(Activation::for_layer(0, 3), Activation::Relu);
    assert_eq!(Activation::for_layer(1, 3), Activation::Relu);
    assert_eq!(Activation::for_layer(2, 3), Activation::Linear);
    assert_eq!(Activation::for_layer(0, 1), Activation::Linear);
}
