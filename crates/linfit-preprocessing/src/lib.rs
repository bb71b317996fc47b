pub mod bias;
pub mod scaler;

pub use bias::*;
pub use scaler::*;
