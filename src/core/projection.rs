use crate::domain::model::CoordinateSystem;
use geo::Coord;

/// Mean earth radius in metres (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Equirectangular projection around a fixed origin.
///
/// Distortion stays well under a percent within a few tens of kilometres of
/// the origin, which covers a metro-area road network and its properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin_lat: f64,
    origin_lon: f64,
    cos_origin_lat: f64,
}

impl LocalProjection {
    pub fn centred_on(lat: f64, lon: f64) -> Self {
        Self {
            origin_lat: lat,
            origin_lon: lon,
            cos_origin_lat: lat.to_radians().cos(),
        }
    }

    /// Centres the projection on the bounding box of `(lon, lat)` pairs.
    pub fn fitted_to<I>(lon_lat: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for (lon, lat) in lon_lat {
            if !valid_lat_lon(lat, lon) {
                continue;
            }
            bounds = Some(match bounds {
                None => (lon, lat, lon, lat),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(lon), min_y.min(lat), max_x.max(lon), max_y.max(lat))
                }
            });
        }
        bounds.map(|(min_x, min_y, max_x, max_y)| {
            Self::centred_on((min_y + max_y) / 2.0, (min_x + max_x) / 2.0)
        })
    }

    pub fn project(&self, lat: f64, lon: f64) -> Coord<f64> {
        Coord {
            x: EARTH_RADIUS_M * (lon - self.origin_lon).to_radians() * self.cos_origin_lat,
            y: EARTH_RADIUS_M * (lat - self.origin_lat).to_radians(),
        }
    }
}

fn valid_lat_lon(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Maps input coordinates onto the metric plane used for matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaneTransform {
    Local(LocalProjection),
    Identity,
}

impl PlaneTransform {
    pub fn for_system<I>(system: CoordinateSystem, road_lon_lat: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        match system {
            CoordinateSystem::Geographic => LocalProjection::fitted_to(road_lon_lat).map(Self::Local),
            CoordinateSystem::Projected => Some(Self::Identity),
        }
    }

    /// `first` is latitude (or y), `second` longitude (or x).
    ///
    /// Returns `None` for coordinates that cannot be placed on the plane.
    pub fn to_plane(&self, first: f64, second: f64) -> Option<Coord<f64>> {
        match self {
            Self::Local(projection) => {
                valid_lat_lon(first, second).then(|| projection.project(first, second))
            }
            Self::Identity => (first.is_finite() && second.is_finite()).then_some(Coord {
                x: second,
                y: first,
            }),
        }
    }
}
