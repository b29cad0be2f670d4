use rstar::{AABB, Envelope, PointDistance, RTreeObject};
use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_RADIUS_METERS, METERS_PER_DEGREE_LAT};
use crate::units::Meters;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }

    pub fn haversine_distance(&self, other: &GeoPoint) -> Meters {
        Meters::new(haversine_distance(self.lat, self.lon, other.lat, other.lon))
    }

    /// Bounding box with `radius` of slack in every direction, in lon/lat
    /// degree space. Used to pre-filter R-tree range queries before the exact
    /// haversine check.
    pub fn bounding_box(&self, radius: Meters) -> AABB<[f64; 2]> {
        let dlat = radius.value() / METERS_PER_DEGREE_LAT;
        let dlon = radius.value() / (METERS_PER_DEGREE_LAT * self.lat.to_radians().cos().max(0.01));
        AABB::from_corners(
            [self.lon - dlon, self.lat - dlat],
            [self.lon + dlon, self.lat + dlat],
        )
    }
}

impl RTreeObject for GeoPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lon, self.lat])
    }
}

impl PointDistance for GeoPoint {
    fn distance_2(&self, point: &<Self::Envelope as Envelope>::Point) -> f64 {
        haversine_distance(self.lat, self.lon, point[1], point[0]).powi(2)
    }
}

impl From<&GeoPoint> for geo::Point {
    fn from(point: &GeoPoint) -> Self {
        geo::Point::new(point.lon, point.lat)
    }
}

impl From<geo::Point> for GeoPoint {
    fn from(point: geo::Point) -> Self {
        GeoPoint::new(point.y(), point.x())
    }
}

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();

    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_compute_haversine_distance() {
        // Brussels Grand-Place to Antwerp Central, roughly 41.5 km
        let brussels = GeoPoint::new(50.8467, 4.3525);
        let antwerp = GeoPoint::new(51.2172, 4.4211);

        let distance = brussels.haversine_distance(&antwerp);
        assert!((distance.value() - 41_500.0).abs() < 500.0);
    }

    #[test]
    fn should_contain_radius_in_bounding_box() {
        let center = GeoPoint::new(46.0, 7.0);
        let bbox = center.bounding_box(Meters::new(2000.0));

        let nearby = GeoPoint::new(46.015, 7.0);
        assert!(bbox.contains_point(&[nearby.lon, nearby.lat]));
        assert!(center.haversine_distance(&nearby) < Meters::new(2000.0));
    }
}
