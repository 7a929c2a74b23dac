use crate::config::toml_config::OrientationConfig;
use crate::core::aggregator::summarize;
use crate::core::cached_pipeline::CachedPipeline;
use crate::core::report::sample_lines;
use crate::domain::ports::{Pipeline, Storage};
use crate::domain::summary::{ResultSource, Summary};
use crate::utils::error::Result;

/// Whether this build can compute orientations itself.
pub const GEOMETRY_AVAILABLE: bool = cfg!(feature = "geometry");

const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeMode {
    Live,
    Precomputed,
}

impl ComputeMode {
    pub fn detect(force_precomputed: bool, geometry_available: bool) -> Self {
        if !geometry_available {
            tracing::warn!("Geometry support is not available in this build, using pre-computed results");
            return ComputeMode::Precomputed;
        }
        if force_precomputed {
            tracing::info!("Using pre-computed results as requested");
            return ComputeMode::Precomputed;
        }
        ComputeMode::Live
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub summary: Summary,
    /// First few results as `address -> orientation`.
    pub samples: Vec<String>,
}

impl RunReport {
    /// One-line outcome; a cached run only writes the summary.
    pub fn headline(&self) -> String {
        match self.summary.source {
            ResultSource::Computed => format!(
                "🎉 Saved {} properties, output: {}",
                self.summary.total, self.output_path
            ),
            ResultSource::Precomputed => format!(
                "📊 Summarised {} cached results, summary: {}",
                self.summary.total, self.output_path
            ),
        }
    }
}

pub struct OrientationEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> OrientationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let source = self.pipeline.source();
        tracing::info!("Starting orientation analysis ({} results)", source);

        let extracted = self.pipeline.extract().await?;
        let results = self.pipeline.transform(extracted).await?;
        tracing::info!("Resolved {} properties", results.len());

        let summary = summarize(&results, source);
        let output_path = self.pipeline.load(&results, &summary).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(RunReport {
            output_path,
            samples: sample_lines(&results, SAMPLE_SIZE),
            summary,
        })
    }
}

/// Runs the analysis with whichever result provider the build and config allow.
pub async fn run_analysis<S: Storage>(storage: S, config: OrientationConfig) -> Result<RunReport> {
    let mode = ComputeMode::detect(config.output.use_precomputed, GEOMETRY_AVAILABLE);
    run_with_mode(storage, config, mode).await
}

pub async fn run_with_mode<S: Storage>(
    storage: S,
    config: OrientationConfig,
    mode: ComputeMode,
) -> Result<RunReport> {
    match mode {
        ComputeMode::Live => run_live(storage, config).await,
        ComputeMode::Precomputed => OrientationEngine::new(CachedPipeline::new(storage, config)).run().await,
    }
}

#[cfg(feature = "geometry")]
async fn run_live<S: Storage>(storage: S, config: OrientationConfig) -> Result<RunReport> {
    use crate::core::pipeline::LivePipeline;
    OrientationEngine::new(LivePipeline::new(storage, config)).run().await
}

#[cfg(not(feature = "geometry"))]
async fn run_live<S: Storage>(_storage: S, _config: OrientationConfig) -> Result<RunReport> {
    Err(crate::utils::error::OrientationError::ProcessingError {
        message: "orientations cannot be computed without the geometry feature".to_string(),
    })
}
