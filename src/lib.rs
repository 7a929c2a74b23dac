pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{LocalStorage, OrientationConfig};

#[cfg(feature = "geometry")]
pub use crate::core::{pipeline::LivePipeline, resolver::OrientationResolver};
pub use crate::core::{
    cached_pipeline::CachedPipeline,
    etl::{run_analysis, ComputeMode, OrientationEngine, RunReport},
};
pub use crate::domain::model::{Direction, MatchStatus, OrientationResult, Property};
pub use crate::domain::summary::Summary;
pub use crate::utils::error::{OrientationError, Result};
