pub mod artifacts;
pub mod config;
pub mod error;
pub mod eval;

pub use config::Config;
pub use error::{PatchrankError, Result};
pub use eval::{Evaluation, KValues, RankMetricsEngine};
