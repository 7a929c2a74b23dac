use anyhow::Result;
use property_orientation::core::etl::run_with_mode;
use property_orientation::domain::summary::ResultSource;
use property_orientation::{ComputeMode, Direction, LocalStorage, OrientationConfig, OrientationError};
use tempfile::TempDir;

const LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// A results table shaped like the legacy analysis output: address and orientation only.
fn legacy_results(total: usize, unknown: usize) -> String {
    let mut out = String::from("address,orientation\n");
    for i in 0..total {
        let label = if i % (total / unknown) == 0 && i / (total / unknown) < unknown {
            "Unknown"
        } else {
            LABELS[i % LABELS.len()]
        };
        out.push_str(&format!("{} Example St,{}\n", i + 1, label));
    }
    out
}

fn config_with_cache(temp_dir: &TempDir) -> OrientationConfig {
    let mut config = OrientationConfig::default();
    config.output.dir = temp_dir.path().join("processed").to_string_lossy().into_owned();
    config.output.precomputed_path = temp_dir
        .path()
        .join("cache/property_orientations_final.csv")
        .to_string_lossy()
        .into_owned();
    config
}

#[tokio::test]
async fn test_fallback_matches_the_cached_file_statistics() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_with_cache(&temp_dir);
    std::fs::create_dir_all(temp_dir.path().join("cache"))?;
    std::fs::write(&config.output.precomputed_path, legacy_results(20_801, 458))?;

    // Geometry unavailable: the capability check picks the cached provider
    let mode = ComputeMode::detect(false, false);
    assert_eq!(mode, ComputeMode::Precomputed);
    let report = run_with_mode(LocalStorage::default(), config.clone(), mode).await?;

    let summary = &report.summary;
    assert_eq!(summary.source, ResultSource::Precomputed);
    assert_eq!(summary.total, 20_801);
    assert_eq!(summary.unknown, 458);
    assert_eq!(summary.count(Direction::Unknown), 458);
    assert_eq!(format!("{:.1}", summary.success_rate * 100.0), "97.8");
    assert_eq!(format!("{:.1}", summary.unknown_rate * 100.0), "2.2");
    assert_eq!(summary.success_rate, (20_801.0 - 458.0) / 20_801.0);

    // Only the summary is written; the cached table is untouched
    assert!(temp_dir.path().join("processed/orientation_summary.json").exists());
    assert!(!temp_dir
        .path()
        .join("processed/property_orientations_final.csv")
        .exists());
    Ok(())
}

#[tokio::test]
async fn test_use_precomputed_flag_skips_computation() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = config_with_cache(&temp_dir);
    config.output.use_precomputed = true;
    // No raw inputs exist at all, which would be fatal for a live run
    config.input.dir = temp_dir.path().join("raw").to_string_lossy().into_owned();
    std::fs::create_dir_all(temp_dir.path().join("cache"))?;
    std::fs::write(
        &config.output.precomputed_path,
        "id,address,orientation,status\nA,1 St,E,matched\nB,2 St,Unknown,no_road\n",
    )?;

    let report = property_orientation::run_analysis(LocalStorage::default(), config).await?;
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.success_rate, 0.5);
    Ok(())
}

#[tokio::test]
async fn test_empty_cache_reports_zero_success() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_with_cache(&temp_dir);
    std::fs::create_dir_all(temp_dir.path().join("cache"))?;
    std::fs::write(&config.output.precomputed_path, "address,orientation\n")?;

    let report = run_with_mode(LocalStorage::default(), config, ComputeMode::Precomputed).await?;
    assert_eq!(report.summary.total, 0);
    assert_eq!(report.summary.success_rate, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_missing_cache_is_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_with_cache(&temp_dir);

    let err = run_with_mode(LocalStorage::default(), config, ComputeMode::Precomputed)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OrientationError::MissingInputError { .. }));
    assert_eq!(err.exit_code(), 1);
    Ok(())
}
