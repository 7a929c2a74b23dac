use crate::core::projection::PlaneTransform;
use crate::domain::model::CoordinateSystem;
use crate::utils::error::{OrientationError, Result};
use geo::{Coord, LineString};
use geojson::{feature::Id, Feature, GeoJson, Value};

/// A road line in the metric plane. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    pub id: String,
    /// Position in the road file; the tie-break between equidistant roads.
    pub ordinal: usize,
    pub line: LineString<f64>,
}

/// A road line as stored in the input file, before projection.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRoad {
    pub id: String,
    /// `[x, y]` positions, longitude first for geographic data.
    pub coords: Vec<[f64; 2]>,
}

/// Reads LineString and MultiLineString features from a GeoJSON document.
///
/// Each line of a MultiLineString becomes its own road sharing the feature id.
pub fn parse_geojson_roads(path: &str, data: &[u8]) -> Result<Vec<RawRoad>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| OrientationError::invalid_input(path, format!("not UTF-8: {}", e)))?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| OrientationError::invalid_input(path, e.to_string()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(OrientationError::invalid_input(
                path,
                "expected a FeatureCollection of road lines",
            ))
        }
    };

    let mut roads = Vec::new();
    let mut skipped = 0usize;
    for (index, feature) in features.iter().enumerate() {
        let id = road_id(feature, index);
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::LineString(line)) => roads.push(RawRoad {
                id,
                coords: positions(line),
            }),
            Some(Value::MultiLineString(lines)) => {
                roads.extend(lines.iter().map(|line| RawRoad {
                    id: id.clone(),
                    coords: positions(line),
                }));
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} road features without line geometry in {}", skipped, path);
    }
    Ok(roads)
}

fn positions(line: &[Vec<f64>]) -> Vec<[f64; 2]> {
    line.iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => [*x, *y],
            _ => [f64::NAN, f64::NAN],
        })
        .collect()
}

fn road_id(feature: &Feature, index: usize) -> String {
    for key in ["id", "road_id", "fid"] {
        match feature.property(key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(serde_json::Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    match &feature.id {
        Some(Id::String(s)) => s.clone(),
        Some(Id::Number(n)) => n.to_string(),
        None => index.to_string(),
    }
}

/// Road lines projected onto the matching plane, plus the transform used.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    pub segments: Vec<RoadSegment>,
    pub transform: PlaneTransform,
}

impl RoadNetwork {
    /// Projects the raw roads; the projection is fitted to the roads themselves.
    ///
    /// A line with any position that cannot be projected is skipped whole, as
    /// is a line with fewer than two positions. Lines whose positions all
    /// coincide are skipped too, so they never shadow a real road nearby. A
    /// network without any usable line is an input error.
    pub fn build(path: &str, raw: Vec<RawRoad>, system: CoordinateSystem) -> Result<Self> {
        let transform = PlaneTransform::for_system(
            system,
            raw.iter().flat_map(|r| r.coords.iter().map(|c| (c[0], c[1]))),
        )
        .ok_or_else(|| OrientationError::invalid_input(path, "road network has no valid coordinates"))?;

        let mut segments = Vec::with_capacity(raw.len());
        let mut unusable = 0usize;
        let mut zero_length = 0usize;
        for (ordinal, road) in raw.into_iter().enumerate() {
            let coords: Option<Vec<Coord<f64>>> = road
                .coords
                .iter()
                .map(|c| transform.to_plane(c[1], c[0]))
                .collect();
            let Some(coords) = coords.filter(|c| c.len() >= 2) else {
                unusable += 1;
                continue;
            };
            if coords.iter().all(|c| *c == coords[0]) {
                zero_length += 1;
                continue;
            }
            segments.push(RoadSegment {
                id: road.id,
                ordinal,
                line: LineString::from(coords),
            });
        }

        if unusable > 0 {
            tracing::warn!(
                "Dropped {} road lines with invalid positions or fewer than two positions",
                unusable
            );
        }
        if zero_length > 0 {
            tracing::warn!("Dropped {} zero-length road lines", zero_length);
        }
        if segments.is_empty() {
            return Err(OrientationError::invalid_input(
                path,
                "road network contains no usable line geometries",
            ));
        }
        Ok(Self {
            segments,
            transform,
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
