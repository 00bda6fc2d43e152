//! # Activation Functions Module
//!
//! The Q-network only needs two activations:
//!
//! - **ReLU**: `max(0, x)` on every hidden layer
//! - **Linear**: identity on the output layer, so action values can take any sign
//!
//! ## Usage Example
//!
//! ```rust
//! use deepq::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
