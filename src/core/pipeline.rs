use crate::config::storage::join_path;
use crate::core::aggregator::impute_unknowns;
use crate::core::loader::{join_transactions, parse_properties};
use crate::core::report::{results_csv, summary_json};
use crate::core::resolver::OrientationResolver;
use crate::core::road_index::RTreeRoadIndex;
use crate::core::road_network::{parse_geojson_roads, RoadNetwork};
use crate::domain::model::{OrientationResult, Property};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::summary::{ResultSource, Summary};
use crate::utils::error::{OrientationError, Result};

pub struct LiveInput {
    pub properties: Vec<Property>,
    pub network: RoadNetwork,
}

/// Computes orientations from the property tables and the road network.
pub struct LivePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> LivePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn load_properties(&self) -> Result<Vec<Property>> {
        let dir = self.config.input_dir();
        let properties_path = join_path(dir, self.config.properties_file());
        if self.storage.exists(&properties_path).await {
            tracing::info!("Loading properties from {}", properties_path);
            let data = self.storage.read_file(&properties_path).await?;
            return parse_properties(&properties_path, &data);
        }

        let transactions_path = join_path(dir, self.config.transactions_file());
        let gnaf_path = join_path(dir, self.config.gnaf_file());
        if self.storage.exists(&transactions_path).await && self.storage.exists(&gnaf_path).await {
            tracing::info!(
                "Joining transactions {} with GNAF properties {}",
                transactions_path,
                gnaf_path
            );
            let transactions = self.storage.read_file(&transactions_path).await?;
            let gnaf = self.storage.read_file(&gnaf_path).await?;
            return join_transactions(&transactions_path, &transactions, &gnaf_path, &gnaf);
        }

        Err(OrientationError::missing_input(format!(
            "{} (or {} and {})",
            properties_path, transactions_path, gnaf_path
        )))
    }

    async fn load_roads(&self) -> Result<RoadNetwork> {
        let roads_path = join_path(self.config.input_dir(), self.config.roads_file());
        tracing::info!("Loading roads from {}", roads_path);
        let data = self.storage.read_file(&roads_path).await?;
        let raw = parse_geojson_roads(&roads_path, &data)?;
        RoadNetwork::build(&roads_path, raw, self.config.coordinates())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LivePipeline<S, C> {
    type Extracted = LiveInput;

    fn source(&self) -> ResultSource {
        ResultSource::Computed
    }

    async fn extract(&self) -> Result<LiveInput> {
        let network = self.load_roads().await?;
        let properties = self.load_properties().await?;
        tracing::info!(
            "Processing {} properties with {} road segments",
            properties.len(),
            network.len()
        );
        Ok(LiveInput {
            properties,
            network,
        })
    }

    async fn transform(&self, data: LiveInput) -> Result<Vec<OrientationResult>> {
        let LiveInput {
            properties,
            network,
        } = data;
        let transform = network.transform;
        let resolver = OrientationResolver::new(
            RTreeRoadIndex::new(network.segments),
            transform,
            self.config.search_radius_m(),
        );

        tracing::info!(
            "Calculating orientations against {} indexed roads...",
            resolver.road_count()
        );
        let mut results = resolver.resolve_all(&properties, self.config.progress_interval());

        if let Some(fraction) = self.config.impute_fraction() {
            impute_unknowns(&mut results, fraction);
        }
        Ok(results)
    }

    async fn load(&self, results: &[OrientationResult], summary: &Summary) -> Result<String> {
        let results_path = join_path(self.config.output_dir(), self.config.results_file());
        let summary_path = join_path(self.config.output_dir(), self.config.summary_file());

        tracing::debug!("Writing {} results to {}", results.len(), results_path);
        self.storage.write_file(&results_path, &results_csv(results)?).await?;
        self.storage.write_file(&summary_path, &summary_json(summary)?).await?;

        Ok(results_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::OrientationConfig;
    use crate::core::aggregator::summarize;
    use crate::core::testing::MockStorage;
    use crate::domain::model::{CoordinateSystem, Direction, MatchStatus};

    const ROADS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"id": "EW"},
             "geometry": {"type": "LineString", "coordinates": [[-100.0, 0.0], [100.0, 0.0]]}},
            {"type": "Feature", "properties": {"id": "NS"},
             "geometry": {"type": "LineString", "coordinates": [[1000.0, -100.0], [1000.0, 100.0]]}}
        ]
    }"#;

    fn projected_config() -> OrientationConfig {
        let mut config = OrientationConfig::default();
        config.input.dir = "in".to_string();
        config.output.dir = "out".to_string();
        config.input.coordinates = CoordinateSystem::Projected;
        config
    }

    #[tokio::test]
    async fn test_extract_single_table_layout() {
        let storage = MockStorage::new();
        storage.put("in/roads.geojson", ROADS).await;
        storage
            .put("in/properties.csv", "id,address,latitude,longitude\nP1,1 North Rd,50,0\n")
            .await;

        let pipeline = LivePipeline::new(storage, projected_config());
        let input = pipeline.extract().await.unwrap();

        assert_eq!(input.properties.len(), 1);
        assert_eq!(input.network.len(), 2);
    }

    #[tokio::test]
    async fn test_extract_falls_back_to_transaction_join() {
        let storage = MockStorage::new();
        storage.put("in/roads.geojson", ROADS).await;
        storage
            .put("in/transactions.csv", "gnaf_pid,street\nG1,1 North Rd\nG2,2 Nowhere Ln\n")
            .await;
        storage
            .put("in/gnaf_prop.csv", "gnaf_pid,latitude,longitude\nG1,50,0\n")
            .await;

        let pipeline = LivePipeline::new(storage, projected_config());
        let input = pipeline.extract().await.unwrap();

        assert_eq!(input.properties.len(), 1);
        assert_eq!(input.properties[0].address, "1 North Rd");
    }

    #[tokio::test]
    async fn test_extract_reports_missing_inputs() {
        let storage = MockStorage::new();
        storage.put("in/roads.geojson", ROADS).await;
        let pipeline = LivePipeline::new(storage, projected_config());
        let err = pipeline.extract().await.err().unwrap();
        assert!(matches!(err, OrientationError::MissingInputError { .. }));
        assert!(err.to_string().contains("properties.csv"));

        let storage = MockStorage::new();
        storage
            .put("in/properties.csv", "id,address,latitude,longitude\n")
            .await;
        let pipeline = LivePipeline::new(storage, projected_config());
        let err = pipeline.extract().await.err().unwrap();
        assert!(err.to_string().contains("roads.geojson"));
    }

    #[tokio::test]
    async fn test_transform_resolves_every_property() {
        let storage = MockStorage::new();
        storage.put("in/roads.geojson", ROADS).await;
        storage
            .put(
                "in/properties.csv",
                "id,address,latitude,longitude\n\
                 P1,1 North Rd,50,0\n\
                 P2,2 East Rd,0,1040\n\
                 P3,3 Far Rd,90000,90000\n\
                 P4,4 Bad Rd,,\n",
            )
            .await;

        let pipeline = LivePipeline::new(storage, projected_config());
        let input = pipeline.extract().await.unwrap();
        let results = pipeline.transform(input).await.unwrap();

        let labels: Vec<Direction> = results.iter().map(|r| r.orientation).collect();
        assert_eq!(labels, vec![Direction::S, Direction::W, Direction::Unknown, Direction::Unknown]);
        assert_eq!(results[2].status, MatchStatus::NoRoad);
        assert_eq!(results[3].status, MatchStatus::InvalidLocation);
    }

    #[tokio::test]
    async fn test_transform_imputes_when_configured() {
        let storage = MockStorage::new();
        storage.put("in/roads.geojson", ROADS).await;
        storage
            .put(
                "in/properties.csv",
                "id,address,latitude,longitude\n\
                 P1,a,50,0\nP2,b,60,10\nP3,c,90000,0\nP4,d,90000,0\n",
            )
            .await;

        let mut config = projected_config();
        config.resolver.impute_fraction = Some(0.25);
        let pipeline = LivePipeline::new(storage, config);
        let results = pipeline.transform(pipeline.extract().await.unwrap()).await.unwrap();

        assert_eq!(results[2].orientation, Direction::S);
        assert_eq!(results[2].status, MatchStatus::Imputed);
        assert_eq!(results[3].orientation, Direction::Unknown);
    }

    #[tokio::test]
    async fn test_load_writes_results_and_summary() {
        let storage = MockStorage::new();
        storage.put("in/roads.geojson", ROADS).await;
        storage
            .put("in/properties.csv", "id,address,latitude,longitude\nP1,1 North Rd,50,0\n")
            .await;

        let pipeline = LivePipeline::new(storage.clone(), projected_config());
        let results = pipeline.transform(pipeline.extract().await.unwrap()).await.unwrap();
        let summary = summarize(&results, ResultSource::Computed);
        let output_path = pipeline.load(&results, &summary).await.unwrap();

        assert_eq!(output_path, "out/property_orientations_final.csv");
        let table = String::from_utf8(storage.get_file(&output_path).await.unwrap()).unwrap();
        assert!(table.starts_with("id,address,orientation,status"));
        assert!(table.contains("P1,1 North Rd,S,matched,EW,50.0,180.0"));
        assert!(storage.get_file("out/orientation_summary.json").await.is_some());
    }

    #[tokio::test]
    async fn test_zero_length_stub_does_not_shadow_a_real_road() {
        let storage = MockStorage::new();
        storage
            .put(
                "in/roads.geojson",
                r#"{"type": "FeatureCollection", "features": [
                    {"type": "Feature", "properties": {"id": "STUB"},
                     "geometry": {"type": "LineString", "coordinates": [[0.0, 2.0], [0.0, 2.0]]}},
                    {"type": "Feature", "properties": {"id": "REAL"},
                     "geometry": {"type": "LineString", "coordinates": [[-50.0, 7.0], [50.0, 7.0]]}}
                ]}"#,
            )
            .await;
        storage
            .put("in/properties.csv", "id,address,latitude,longitude
P1,1 Stub Ln,0,0
")
            .await;

        let pipeline = LivePipeline::new(storage, projected_config());
        let input = pipeline.extract().await.unwrap();
        assert_eq!(input.network.len(), 1);
        let results = pipeline.transform(input).await.unwrap();

        assert_eq!(results[0].status, MatchStatus::Matched);
        assert_eq!(results[0].road_id.as_deref(), Some("REAL"));
        assert_eq!(results[0].orientation, Direction::N);
    }
}
