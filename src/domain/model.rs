use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compass octant a property faces, or `Unknown` when it could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    #[serde(alias = "unknown", alias = "UNKNOWN")]
    Unknown,
}

impl Direction {
    /// The eight compass octants, clockwise from north.
    pub const COMPASS: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Every label a result can carry, in report order.
    pub const ALL: [Direction; 9] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
        Direction::Unknown,
    ];

    /// Maps a bearing to its 45 degree sector: `round(bearing / 45) mod 8`.
    ///
    /// Halfway bearings round away from north, so 22.5 is NE and 337.5 is N.
    /// Non-finite bearings map to `Unknown`.
    pub fn from_bearing(bearing_deg: f64) -> Self {
        if !bearing_deg.is_finite() {
            return Direction::Unknown;
        }
        let sector = (normalize_bearing(bearing_deg) / 45.0).round() as usize % 8;
        Self::COMPASS[sector]
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Direction::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
            Direction::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Direction::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("'{}' is not a compass direction", trimmed))
    }
}

/// Normalizes any finite angle into `[0, 360)`.
pub fn normalize_bearing(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Bearing of the vector (dx east, dy north), clockwise from north in degrees.
pub fn bearing_from_delta(dx: f64, dy: f64) -> f64 {
    normalize_bearing(dx.atan2(dy).to_degrees())
}

/// How a result's direction was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Nearest road found within the search radius.
    Matched,
    /// Filled in with the most common known direction.
    Imputed,
    /// No road within the search radius.
    NoRoad,
    /// Missing, unparsable or out of range coordinates.
    InvalidLocation,
    /// The matched road piece has no length, so it has no bearing.
    DegenerateRoad,
}

impl MatchStatus {
    pub fn has_direction(&self) -> bool {
        matches!(self, MatchStatus::Matched | MatchStatus::Imputed)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Matched => "matched",
            MatchStatus::Imputed => "imputed",
            MatchStatus::NoRoad => "no_road",
            MatchStatus::InvalidLocation => "invalid_location",
            MatchStatus::DegenerateRoad => "degenerate_road",
        };
        f.write_str(s)
    }
}

/// A property row as read from the input tables.
///
/// Coordinates stay optional: a row with a bad location is still a property
/// and still gets a result.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: String,
    pub address: String,
    /// Latitude, or northing when the input is already projected.
    pub latitude: Option<f64>,
    /// Longitude, or easting when the input is already projected.
    pub longitude: Option<f64>,
}

pub const UNKNOWN_ADDRESS: &str = "Unknown Address";

/// How the input coordinates are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSystem {
    /// WGS84 latitude/longitude degrees, projected to metres before matching.
    #[default]
    Geographic,
    /// Already metric x/y; used as is.
    Projected,
}

impl FromStr for CoordinateSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geographic" | "wgs84" => Ok(CoordinateSystem::Geographic),
            "projected" | "metric" => Ok(CoordinateSystem::Projected),
            other => Err(format!("unknown coordinate system '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationResult {
    pub id: String,
    pub address: String,
    pub orientation: Direction,
    pub status: MatchStatus,
    pub road_id: Option<String>,
    pub distance_m: Option<f64>,
    pub bearing_deg: Option<f64>,
}

impl OrientationResult {
    pub fn matched(
        property: &Property,
        orientation: Direction,
        road_id: String,
        distance_m: f64,
        bearing_deg: f64,
    ) -> Self {
        Self {
            id: property.id.clone(),
            address: property.address.clone(),
            orientation,
            status: MatchStatus::Matched,
            road_id: Some(road_id),
            distance_m: Some(distance_m),
            bearing_deg: Some(bearing_deg),
        }
    }

    pub fn unknown(property: &Property, status: MatchStatus) -> Self {
        Self {
            id: property.id.clone(),
            address: property.address.clone(),
            orientation: Direction::Unknown,
            status,
            road_id: None,
            distance_m: None,
            bearing_deg: None,
        }
    }
}
