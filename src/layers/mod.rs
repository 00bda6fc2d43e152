pub mod dense;
pub mod initialization;

pub use dense::{DenseGradients, DenseLayer, LayerCache};
pub use initialization::WeightInit;
