use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Centers created without coordinates sit at (0, 0)
    pub fn is_unset(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Anything that can be ranked by distance
pub trait Located {
    fn location(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}

/// A candidate annotated with its distance from the query origin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate<T> {
    #[serde(flatten)]
    pub item: T,
    pub distance_km: f64,
}

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
pub fn haversine_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    // rounding can push h a hair past 1.0 near antipodes
    let h = ((delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

/// Rank candidates by distance from `origin`, nearest first, keeping at most `limit`.
///
/// Distances are rounded to two decimals before sorting. The sort is stable, so
/// candidates at equal distance come back in the order they were given.
pub fn rank_nearest<T, I>(origin: GeoPoint, candidates: I, limit: usize) -> Vec<RankedCandidate<T>>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<RankedCandidate<T>> = candidates
        .into_iter()
        .map(|item| {
            let distance_km = round_km(haversine_distance_km(origin, item.location()));
            RankedCandidate { item, distance_km }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: GeoPoint = GeoPoint::new(40.7128, -74.0060);
    const LOS_ANGELES: GeoPoint = GeoPoint::new(34.0522, -118.2437);

    #[derive(Debug, Clone, PartialEq)]
    struct Site {
        name: &'static str,
        at: GeoPoint,
    }

    impl Located for Site {
        fn location(&self) -> GeoPoint {
            self.at
        }
    }

    // Points due north of the equator origin; one degree of latitude is ~111.19 km
    fn site_north(name: &'static str, km: f64) -> Site {
        Site {
            name,
            at: GeoPoint::new(km / 111.195, 0.0),
        }
    }

    fn names(ranked: &[RankedCandidate<Site>]) -> Vec<&'static str> {
        ranked.iter().map(|r| r.item.name).collect()
    }

    #[test]
    fn test_same_point_is_zero() {
        for p in [NEW_YORK, LOS_ANGELES, GeoPoint::new(-89.9, 179.9), GeoPoint::new(0.0, 0.0)] {
            assert_eq!(haversine_distance_km(p, p), 0.0);
        }
    }

    #[test]
    fn test_symmetric_and_non_negative() {
        let points = [
            NEW_YORK,
            LOS_ANGELES,
            GeoPoint::new(-6.2088, 106.8456),
            GeoPoint::new(90.0, 0.0),
            GeoPoint::new(-90.0, 180.0),
        ];
        for a in points {
            for b in points {
                let ab = haversine_distance_km(a, b);
                assert!(ab >= 0.0);
                assert_eq!(ab, haversine_distance_km(b, a));
            }
        }
    }

    #[test]
    fn test_new_york_los_angeles() {
        let distance = haversine_distance_km(NEW_YORK, LOS_ANGELES);
        // Should be approximately 3935-3945 km
        assert!(distance > 3935.0 && distance < 3945.0, "got {distance}");
    }

    #[test]
    fn test_antipodes_is_half_circumference() {
        let distance = haversine_distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_rank_orders_by_distance() {
        let origin = GeoPoint::new(0.0, 0.0);
        let sites = vec![
            site_north("ten", 10.0),
            site_north("three", 3.0),
            site_north("seven", 7.0),
        ];

        let ranked = rank_nearest(origin, sites, 3);

        assert_eq!(names(&ranked), ["three", "seven", "ten"]);
        assert!((ranked[0].distance_km - 3.0).abs() < 0.01);
        assert!((ranked[1].distance_km - 7.0).abs() < 0.01);
        assert!((ranked[2].distance_km - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let origin = GeoPoint::new(0.0, 0.0);
        let sites = vec![
            site_north("a", 50.0),
            site_north("b", 20.0),
            site_north("c", 40.0),
            site_north("d", 10.0),
            site_north("e", 30.0),
        ];

        let ranked = rank_nearest(origin, sites, 2);

        assert_eq!(names(&ranked), ["d", "b"]);
    }

    #[test]
    fn test_rank_keeps_input_order_on_ties() {
        let origin = GeoPoint::new(0.0, 0.0);
        // Mirrored east and west give identical distances
        let sites = vec![
            Site { name: "far", at: GeoPoint::new(0.0, 2.0) },
            Site { name: "east", at: GeoPoint::new(0.0, 1.0) },
            Site { name: "west", at: GeoPoint::new(0.0, -1.0) },
        ];

        let ranked = rank_nearest(origin, sites.clone(), 3);
        assert_eq!(names(&ranked), ["east", "west", "far"]);

        let reversed: Vec<Site> = sites.into_iter().rev().collect();
        let ranked = rank_nearest(origin, reversed, 3);
        assert_eq!(names(&ranked), ["west", "east", "far"]);
    }

    #[test]
    fn test_rank_empty_and_zero_limit() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!(rank_nearest(origin, Vec::<Site>::new(), 5).is_empty());
        assert!(rank_nearest(origin, vec![site_north("a", 1.0)], 0).is_empty());
    }

    #[test]
    fn test_rank_limit_exceeds_count() {
        let origin = GeoPoint::new(0.0, 0.0);
        let sites = vec![site_north("a", 1.0), site_north("b", 2.0), site_north("c", 3.0)];
        assert_eq!(rank_nearest(origin, sites, 10).len(), 3);
    }

    #[test]
    fn test_rank_distance_is_rounded_haversine() {
        let ranked = rank_nearest(NEW_YORK, vec![LOS_ANGELES], 1);
        let expected = (haversine_distance_km(NEW_YORK, LOS_ANGELES) * 100.0).round() / 100.0;
        assert_eq!(ranked[0].distance_km, expected);
        assert_eq!(ranked[0].item, LOS_ANGELES);
    }

    #[test]
    fn test_rank_does_not_touch_borrowed_input() {
        let origin = GeoPoint::new(0.0, 0.0);
        let sites = vec![site_north("b", 2.0), site_north("a", 1.0)];
        let before = sites.clone();

        let ranked = rank_nearest(origin, sites.iter().cloned(), 2);

        assert_eq!(sites, before);
        assert_eq!(names(&ranked), ["a", "b"]);
    }

    #[test]
    fn test_unset_and_valid() {
        assert!(GeoPoint::new(0.0, 0.0).is_unset());
        assert!(!GeoPoint::new(0.0, 0.1).is_unset());
        assert!(NEW_YORK.is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_ranked_serializes_flat() {
        let ranked = rank_nearest(NEW_YORK, vec![NEW_YORK], 1);
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["latitude"], 40.7128);
        assert_eq!(json["longitude"], -74.0060);
        assert_eq!(json["distance_km"], 0.0);
    }
}
