//! Nearest-road lookup behind a narrow interface.
//!
//! The resolver only asks "which road piece is nearest to this point, within
//! this radius". [`RTreeRoadIndex`] answers with an R-tree over the straight
//! pieces of every road; [`LinearScanIndex`] checks every piece and exists as
//! a reference for small networks and tests.

use crate::core::road_network::RoadSegment;
use geo::{Closest, ClosestPoint, Coord, EuclideanDistance, Line, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Distances closer than this are treated as equal when breaking ties.
pub const TIE_TOLERANCE_M: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct RoadMatch<'a> {
    pub road: &'a RoadSegment,
    /// Index of the matched piece within the road's line.
    pub piece_index: usize,
    pub piece: Line<f64>,
    /// Nearest point of the piece to the query point.
    pub closest: Coord<f64>,
    pub distance: f64,
}

pub trait RoadIndex: Send + Sync {
    /// Nearest road piece no further than `radius_m` from `point`.
    ///
    /// Equidistant candidates resolve to the road with the lowest load
    /// ordinal, then the lowest piece index, whatever order the index visits
    /// them in.
    fn nearest_within(&self, point: Coord<f64>, radius_m: f64) -> Option<RoadMatch<'_>>;

    fn road_count(&self) -> usize;
}

/// Straight pieces of a road worth indexing.
///
/// Zero-length pieces are left out unless the road has nothing else, in which
/// case its first piece stands in so the road can still be matched.
fn indexable_pieces(road: &RoadSegment) -> Vec<(usize, Line<f64>)> {
    let pieces: Vec<(usize, Line<f64>)> = road
        .line
        .lines()
        .enumerate()
        .filter(|(_, line)| line.dx() != 0.0 || line.dy() != 0.0)
        .collect();
    if pieces.is_empty() {
        road.line.lines().take(1).enumerate().collect()
    } else {
        pieces
    }
}

fn closest_on_piece(line: &Line<f64>, point: Coord<f64>) -> Coord<f64> {
    let (dx, dy) = (line.dx(), line.dy());
    let length_2 = dx * dx + dy * dy;
    if length_2 == 0.0 {
        return line.start;
    }
    let t = (((point.x - line.start.x) * dx + (point.y - line.start.y) * dy) / length_2).clamp(0.0, 1.0);
    Coord {
        x: line.start.x + t * dx,
        y: line.start.y + t * dy,
    }
}

fn is_better(candidate: (f64, usize, usize), current: (f64, usize, usize)) -> bool {
    let (distance, ordinal, piece) = candidate;
    let (best_distance, best_ordinal, best_piece) = current;
    if distance < best_distance - TIE_TOLERANCE_M {
        return true;
    }
    if distance > best_distance + TIE_TOLERANCE_M {
        return false;
    }
    (ordinal, piece) < (best_ordinal, best_piece)
}

struct IndexedPiece {
    road: usize,
    piece_index: usize,
    line: Line<f64>,
}

impl RTreeObject for IndexedPiece {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let (a, b) = (self.line.start, self.line.end);
        AABB::from_corners([a.x.min(b.x), a.y.min(b.y)], [a.x.max(b.x), a.y.max(b.y)])
    }
}

impl PointDistance for IndexedPiece {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let c = closest_on_piece(&self.line, Coord { x: point[0], y: point[1] });
        let (dx, dy) = (c.x - point[0], c.y - point[1]);
        dx * dx + dy * dy
    }
}

pub struct RTreeRoadIndex {
    roads: Vec<RoadSegment>,
    tree: RTree<IndexedPiece>,
}

impl RTreeRoadIndex {
    pub fn new(roads: Vec<RoadSegment>) -> Self {
        let pieces: Vec<IndexedPiece> = roads
            .iter()
            .enumerate()
            .flat_map(|(road, segment)| {
                indexable_pieces(segment)
                    .into_iter()
                    .map(move |(piece_index, line)| IndexedPiece {
                        road,
                        piece_index,
                        line,
                    })
            })
            .collect();
        tracing::debug!("Bulk loading {} road pieces into the R-tree", pieces.len());
        Self {
            roads,
            tree: RTree::bulk_load(pieces),
        }
    }
}

impl RoadIndex for RTreeRoadIndex {
    fn nearest_within(&self, point: Coord<f64>, radius_m: f64) -> Option<RoadMatch<'_>> {
        let query = [point.x, point.y];
        let mut best: Option<(&IndexedPiece, f64)> = None;

        // Candidates arrive in ascending distance, so stop once past the radius
        // or clearly past the best distance.
        for (piece, distance_2) in self.tree.nearest_neighbor_iter_with_distance_2(&query) {
            let distance = distance_2.sqrt();
            if distance > radius_m {
                break;
            }
            match best {
                Some((_, best_distance)) if distance > best_distance + TIE_TOLERANCE_M => break,
                Some((current, best_distance)) => {
                    let candidate = (distance, self.roads[piece.road].ordinal, piece.piece_index);
                    let incumbent = (best_distance, self.roads[current.road].ordinal, current.piece_index);
                    if is_better(candidate, incumbent) {
                        best = Some((piece, distance));
                    }
                }
                None => best = Some((piece, distance)),
            }
        }

        best.map(|(piece, distance)| RoadMatch {
            road: &self.roads[piece.road],
            piece_index: piece.piece_index,
            piece: piece.line,
            closest: closest_on_piece(&piece.line, point),
            distance,
        })
    }

    fn road_count(&self) -> usize {
        self.roads.len()
    }
}

/// Checks every piece of every road.
pub struct LinearScanIndex {
    roads: Vec<RoadSegment>,
}

impl LinearScanIndex {
    pub fn new(roads: Vec<RoadSegment>) -> Self {
        Self { roads }
    }
}

impl RoadIndex for LinearScanIndex {
    fn nearest_within(&self, point: Coord<f64>, radius_m: f64) -> Option<RoadMatch<'_>> {
        let query = Point::from(point);
        let mut best: Option<RoadMatch<'_>> = None;

        for road in &self.roads {
            for (piece_index, piece) in indexable_pieces(road) {
                let distance = query.euclidean_distance(&piece);
                if distance > radius_m {
                    continue;
                }
                let replace = match &best {
                    None => true,
                    Some(current) => is_better(
                        (distance, road.ordinal, piece_index),
                        (current.distance, current.road.ordinal, current.piece_index),
                    ),
                };
                if replace {
                    let closest = match piece.closest_point(&query) {
                        Closest::Intersection(p) | Closest::SinglePoint(p) => p.0,
                        Closest::Indeterminate => piece.start,
                    };
                    best = Some(RoadMatch {
                        road,
                        piece_index,
                        piece,
                        closest,
                        distance,
                    });
                }
            }
        }
        best
    }

    fn road_count(&self) -> usize {
        self.roads.len()
    }
}
