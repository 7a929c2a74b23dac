pub mod aggregator;
pub mod cached_pipeline;
pub mod etl;
pub mod loader;
pub mod report;

#[cfg(feature = "geometry")]
pub mod pipeline;
#[cfg(feature = "geometry")]
pub mod projection;
#[cfg(feature = "geometry")]
pub mod resolver;
#[cfg(feature = "geometry")]
pub mod road_index;
#[cfg(feature = "geometry")]
pub mod road_network;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{Direction, MatchStatus, OrientationResult, Property};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
