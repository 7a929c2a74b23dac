use crate::config::storage::join_path;
use crate::core::loader::parse_precomputed;
use crate::core::report::summary_json;
use crate::domain::model::OrientationResult;
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::summary::{ResultSource, Summary};
use crate::utils::error::Result;

/// Replays a results table from an earlier run instead of computing one.
///
/// Only the summary is written; the results table it read is left alone.
pub struct CachedPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CachedPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CachedPipeline<S, C> {
    type Extracted = Vec<u8>;

    fn source(&self) -> ResultSource {
        ResultSource::Precomputed
    }

    async fn extract(&self) -> Result<Vec<u8>> {
        let path = self.config.precomputed_path();
        tracing::info!("Loading pre-computed results from {}", path);
        self.storage.read_file(path).await
    }

    async fn transform(&self, data: Vec<u8>) -> Result<Vec<OrientationResult>> {
        parse_precomputed(self.config.precomputed_path(), &data)
    }

    async fn load(&self, _results: &[OrientationResult], summary: &Summary) -> Result<String> {
        let summary_path = join_path(self.config.output_dir(), self.config.summary_file());
        self.storage.write_file(&summary_path, &summary_json(summary)?).await?;
        Ok(summary_path)
    }
}
