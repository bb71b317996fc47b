pub mod config;
pub mod context;
pub mod trainer;

pub use config::*;
pub use context::*;
pub use trainer::*;
