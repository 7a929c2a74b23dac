use crate::core::projection::PlaneTransform;
use crate::core::road_index::RoadIndex;
use crate::domain::model::{
    bearing_from_delta, normalize_bearing, Direction, MatchStatus, OrientationResult, Property,
};

/// Properties closer than this to their road have no usable bearing towards it.
pub const ON_ROAD_TOLERANCE_M: f64 = 0.01;

/// Pieces shorter than this have no usable bearing.
const MIN_PIECE_LENGTH_M: f64 = 1e-9;

/// Direction a property faces given the road's bearing and the angle,
/// clockwise from the road bearing, at which the road is seen from the property.
pub fn facing_direction(road_bearing: f64, relative_angle: f64) -> Direction {
    Direction::from_bearing(road_bearing + relative_angle)
}

/// Assigns each property the compass direction towards its nearest road.
pub struct OrientationResolver<I: RoadIndex> {
    index: I,
    transform: PlaneTransform,
    search_radius_m: f64,
}

impl<I: RoadIndex> OrientationResolver<I> {
    pub fn new(index: I, transform: PlaneTransform, search_radius_m: f64) -> Self {
        Self {
            index,
            transform,
            search_radius_m,
        }
    }

    /// Resolves one property. Never fails: problems become an `Unknown` result.
    pub fn resolve(&self, property: &Property) -> OrientationResult {
        let point = match (property.latitude, property.longitude) {
            (Some(lat), Some(lon)) => self.transform.to_plane(lat, lon),
            _ => None,
        };
        let Some(point) = point else {
            return OrientationResult::unknown(property, MatchStatus::InvalidLocation);
        };

        let Some(nearest) = self.index.nearest_within(point, self.search_radius_m) else {
            return OrientationResult::unknown(property, MatchStatus::NoRoad);
        };

        let (dx, dy) = (nearest.piece.dx(), nearest.piece.dy());
        if dx.hypot(dy) < MIN_PIECE_LENGTH_M {
            tracing::debug!(
                "Property {} matched zero-length piece of road {}",
                property.id,
                nearest.road.id
            );
            return OrientationResult::unknown(property, MatchStatus::DegenerateRoad);
        }

        let road_bearing = bearing_from_delta(dx, dy);
        let relative_angle = if nearest.distance < ON_ROAD_TOLERANCE_M {
            // Sitting on the road: face square to it
            90.0
        } else {
            let towards_road = bearing_from_delta(nearest.closest.x - point.x, nearest.closest.y - point.y);
            normalize_bearing(towards_road - road_bearing)
        };

        OrientationResult::matched(
            property,
            facing_direction(road_bearing, relative_angle),
            nearest.road.id.clone(),
            nearest.distance,
            normalize_bearing(road_bearing + relative_angle),
        )
    }

    /// Resolves every property in order, one result each.
    pub fn resolve_all(&self, properties: &[Property], progress_interval: usize) -> Vec<OrientationResult> {
        let total = properties.len();
        let interval = progress_interval.max(1);
        properties
            .iter()
            .enumerate()
            .map(|(i, property)| {
                if i % interval == 0 {
                    tracing::info!("Processed {}/{} properties...", i, total);
                }
                self.resolve(property)
            })
            .collect()
    }

    pub fn road_count(&self) -> usize {
        self.index.road_count()
    }
}
