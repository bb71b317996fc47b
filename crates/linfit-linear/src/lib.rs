pub mod regression;
pub mod perceptron;

pub use regression::*;
pub use perceptron::*;
