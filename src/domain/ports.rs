use crate::domain::model::{CoordinateSystem, OrientationResult};
use crate::domain::summary::{ResultSource, Summary};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn properties_file(&self) -> &str;
    fn transactions_file(&self) -> &str;
    fn gnaf_file(&self) -> &str;
    fn roads_file(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn results_file(&self) -> &str;
    fn summary_file(&self) -> &str;
    fn precomputed_path(&self) -> &str;
    fn coordinates(&self) -> CoordinateSystem;
    fn search_radius_m(&self) -> f64;
    fn impute_fraction(&self) -> Option<f64>;
    fn progress_interval(&self) -> usize;
}

/// One provider of orientation results.
///
/// `extract` gathers whatever the provider needs, `transform` turns it into
/// exactly one result per property, `load` persists results and summary and
/// returns the primary output location.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;

    fn source(&self) -> ResultSource;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Vec<OrientationResult>>;
    async fn load(&self, results: &[OrientationResult], summary: &Summary) -> Result<String>;
}
