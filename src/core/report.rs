use crate::domain::model::OrientationResult;
use crate::domain::summary::Summary;
use crate::utils::error::{OrientationError, Result};

/// Results table: id, address, orientation, status, road_id, distance_m, bearing_deg.
pub fn results_csv(results: &[OrientationResult]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if results.is_empty() {
        writer.write_record([
            "id",
            "address",
            "orientation",
            "status",
            "road_id",
            "distance_m",
            "bearing_deg",
        ])?;
    }
    for result in results {
        writer.serialize(result)?;
    }
    writer.into_inner().map_err(|e| OrientationError::ProcessingError {
        message: format!("failed to flush results table: {}", e),
    })
}

pub fn summary_json(summary: &Summary) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(summary)?)
}

/// First `limit` results as `address -> orientation` lines.
pub fn sample_lines(results: &[OrientationResult], limit: usize) -> Vec<String> {
    results
        .iter()
        .take(limit)
        .map(|r| format!("{} -> {}", r.address, r.orientation))
        .collect()
}
