use crate::domain::model::{Direction, MatchStatus, OrientationResult, Property, UNKNOWN_ADDRESS};
use crate::utils::error::{OrientationError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct PropertyRow {
    #[serde(alias = "gnaf_pid")]
    id: String,
    #[serde(default, alias = "street")]
    address: Option<String>,
    #[serde(default, alias = "lat", alias = "y")]
    latitude: Option<String>,
    #[serde(default, alias = "lon", alias = "lng", alias = "x")]
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    gnaf_pid: String,
    #[serde(default, alias = "address")]
    street: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GnafRow {
    gnaf_pid: String,
    #[serde(default, alias = "lat")]
    latitude: Option<String>,
    #[serde(default, alias = "lon", alias = "lng")]
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrecomputedRow {
    #[serde(default, alias = "gnaf_pid")]
    id: Option<String>,
    #[serde(default, alias = "street")]
    address: Option<String>,
    orientation: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    road_id: Option<String>,
    #[serde(default)]
    distance_m: Option<f64>,
    #[serde(default)]
    bearing_deg: Option<f64>,
}

fn read_rows<T: DeserializeOwned>(path: &str, data: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()
        .map_err(|e| OrientationError::invalid_input(path, e.to_string()))
}

/// Unparsable or non-finite values read as missing; the resolver reports them.
fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn address_or_default(address: Option<String>) -> String {
    address
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
}

/// Reads the single-table layout: id, address, latitude, longitude.
pub fn parse_properties(path: &str, data: &[u8]) -> Result<Vec<Property>> {
    let rows: Vec<PropertyRow> = read_rows(path, data)?;
    Ok(rows
        .into_iter()
        .map(|row| Property {
            latitude: parse_coordinate(row.latitude.as_deref()),
            longitude: parse_coordinate(row.longitude.as_deref()),
            address: address_or_default(row.address),
            id: row.id,
        })
        .collect())
}

/// Inner-joins transactions with GNAF locations on `gnaf_pid`.
///
/// Transaction order is kept and a transaction with no GNAF row is dropped.
/// When a `gnaf_pid` appears more than once in the GNAF table the first row wins.
pub fn join_transactions(
    transactions_path: &str,
    transactions: &[u8],
    gnaf_path: &str,
    gnaf: &[u8],
) -> Result<Vec<Property>> {
    let transactions: Vec<TransactionRow> = read_rows(transactions_path, transactions)?;
    let gnaf_rows: Vec<GnafRow> = read_rows(gnaf_path, gnaf)?;

    let mut locations: HashMap<String, (Option<f64>, Option<f64>)> = HashMap::with_capacity(gnaf_rows.len());
    for row in gnaf_rows {
        locations.entry(row.gnaf_pid).or_insert((
            parse_coordinate(row.latitude.as_deref()),
            parse_coordinate(row.longitude.as_deref()),
        ));
    }

    let total = transactions.len();
    let properties: Vec<Property> = transactions
        .into_iter()
        .filter_map(|tx| {
            let (latitude, longitude) = *locations.get(&tx.gnaf_pid)?;
            Some(Property {
                id: tx.gnaf_pid,
                address: address_or_default(tx.street),
                latitude,
                longitude,
            })
        })
        .collect();

    if properties.len() < total {
        tracing::warn!(
            "{} of {} transactions have no GNAF location and were dropped",
            total - properties.len(),
            total
        );
    }
    Ok(properties)
}

fn parse_status(raw: &str) -> Option<MatchStatus> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "matched" => Some(MatchStatus::Matched),
        "imputed" => Some(MatchStatus::Imputed),
        "no_road" => Some(MatchStatus::NoRoad),
        "invalid_location" => Some(MatchStatus::InvalidLocation),
        "degenerate_road" => Some(MatchStatus::DegenerateRoad),
        _ => None,
    }
}

/// Reads a results table written by an earlier run (or by the legacy analysis,
/// which only had `address` and `orientation` columns).
///
/// Rows without an id are numbered from 1. A status that contradicts the
/// orientation is replaced by one derived from the orientation.
pub fn parse_precomputed(path: &str, data: &[u8]) -> Result<Vec<OrientationResult>> {
    let rows: Vec<PrecomputedRow> = read_rows(path, data)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| -> Result<OrientationResult> {
            let orientation: Direction = row.orientation.parse().map_err(|e: String| {
                OrientationError::invalid_input(path, format!("row {}: {}", i + 1, e))
            })?;
            let derived = if orientation.is_known() {
                MatchStatus::Matched
            } else {
                MatchStatus::NoRoad
            };
            let status = row
                .status
                .as_deref()
                .and_then(parse_status)
                .filter(|s| s.has_direction() == orientation.is_known())
                .unwrap_or(derived);

            Ok(OrientationResult {
                id: row
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| (i + 1).to_string()),
                address: address_or_default(row.address),
                orientation,
                status,
                road_id: row.road_id.filter(|r| !r.is_empty()),
                distance_m: row.distance_m,
                bearing_deg: row.bearing_deg,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties_with_aliases_and_bad_values() {
        let csv = "gnaf_pid,street,lat,lon,extra\n\
                   GANSW1,1 George St,-33.87,151.20,x\n\
                   GANSW2,,-33.88,151.21,y\n\
                   GANSW3,3 Pitt St,not-a-number,151.22,z\n\
                   GANSW4,4 Kent St,,NaN,w\n";
        let properties = parse_properties("properties.csv", csv.as_bytes()).unwrap();

        assert_eq!(properties.len(), 4);
        assert_eq!(properties[0].id, "GANSW1");
        assert_eq!(properties[0].latitude, Some(-33.87));
        assert_eq!(properties[0].longitude, Some(151.20));
        assert_eq!(properties[1].address, UNKNOWN_ADDRESS);
        assert_eq!(properties[2].latitude, None);
        assert_eq!(properties[3].latitude, None);
        assert_eq!(properties[3].longitude, None);
    }

    #[test]
    fn test_parse_properties_requires_an_id_column() {
        let csv = "address,latitude,longitude\n1 George St,-33.87,151.20\n";
        let err = parse_properties("properties.csv", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, OrientationError::InvalidInputError { .. }));
    }

    #[test]
    fn test_join_transactions_is_an_inner_join() {
        let transactions = "gnaf_pid,street,price\n\
                            A,1 First Ave,100\n\
                            B,2 Second Ave,200\n\
                            A,1 First Ave,150\n\
                            C,3 Third Ave,300\n";
        let gnaf = "gnaf_pid,latitude,longitude\n\
                    C,-33.1,151.3\n\
                    A,-33.0,151.0\n\
                    A,-40.0,140.0\n";

        let properties = join_transactions(
            "transactions.csv",
            transactions.as_bytes(),
            "gnaf_prop.csv",
            gnaf.as_bytes(),
        )
        .unwrap();

        let ids: Vec<&str> = properties.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "A", "C"]);
        assert_eq!(properties[0].latitude, Some(-33.0));
        assert_eq!(properties[1].longitude, Some(151.0));
        assert_eq!(properties[2].address, "3 Third Ave");
    }

    #[test]
    fn test_parse_precomputed_legacy_two_column_file() {
        let csv = "address,orientation\n\
                   1 George St,NE\n\
                   ,Unknown\n\
                   3 Pitt St,s\n";
        let results = parse_precomputed("property_orientations_final.csv", csv.as_bytes()).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "1");
        assert_eq!(results[0].orientation, Direction::NE);
        assert_eq!(results[0].status, MatchStatus::Matched);
        assert_eq!(results[1].address, UNKNOWN_ADDRESS);
        assert_eq!(results[1].status, MatchStatus::NoRoad);
        assert_eq!(results[2].orientation, Direction::S);
    }

    #[test]
    fn test_parse_precomputed_keeps_consistent_status() {
        let csv = "id,address,orientation,status,road_id,distance_m,bearing_deg\n\
                   P1,1 A St,W,imputed,,,\n\
                   P2,2 B St,Unknown,invalid_location,,,\n\
                   P3,3 C St,Unknown,matched,,,\n\
                   P4,4 D St,N,matched,R9,12.5,3.0\n";
        let results = parse_precomputed("results.csv", csv.as_bytes()).unwrap();

        assert_eq!(results[0].status, MatchStatus::Imputed);
        assert_eq!(results[1].status, MatchStatus::InvalidLocation);
        assert_eq!(results[2].status, MatchStatus::NoRoad);
        assert_eq!(results[3].road_id.as_deref(), Some("R9"));
        assert_eq!(results[3].distance_m, Some(12.5));
    }

    #[test]
    fn test_parse_precomputed_rejects_unknown_labels() {
        let csv = "address,orientation\n1 George St,Northish\n";
        let err = parse_precomputed("results.csv", csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
