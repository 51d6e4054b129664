//! Fixed-point coordinates and the planar/spherical math used for snapping

use bytemuck::{Pod, Zeroable};
use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Fixed-point scale of stored coordinates (1e-7 degrees)
pub const COORDINATE_PRECISION: f64 = 1e7;

/// Web mercator is undefined at the poles
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Node coordinate, longitude first, in 1e-7 degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Coordinate {
    pub lon: i32,
    pub lat: i32,
}

impl Coordinate {
    pub fn new(lon: i32, lat: i32) -> Self {
        Self { lon, lat }
    }

    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self {
            lon: (lon * COORDINATE_PRECISION).round() as i32,
            lat: (lat * COORDINATE_PRECISION).round() as i32,
        }
    }

    pub fn lon_degrees(self) -> f64 {
        self.lon as f64 / COORDINATE_PRECISION
    }

    pub fn lat_degrees(self) -> f64 {
        self.lat as f64 / COORDINATE_PRECISION
    }

    pub fn is_valid(self) -> bool {
        (-1_800_000_000..=1_800_000_000).contains(&self.lon) && (-900_000_000..=900_000_000).contains(&self.lat)
    }
}

/// Great-circle distance in meters
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let p1 = Point::new(a.lon_degrees(), a.lat_degrees());
    let p2 = Point::new(b.lon_degrees(), b.lat_degrees());
    Haversine::distance(p1, p2)
}

/// Initial bearing from `from` to `to` in degrees, `[0, 360)`
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat_degrees().to_radians();
    let lat2 = to.lat_degrees().to_radians();
    let delta_lon = (to.lon_degrees() - from.lon_degrees()).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();
    let degrees = y.atan2(x).to_degrees();
    if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// True if `c` lies to the left of the directed line `a -> b`
pub fn is_ccw(a: Coordinate, b: Coordinate, c: Coordinate) -> bool {
    let cross = (b.lon as i64 - a.lon as i64) * (c.lat as i64 - a.lat as i64)
        - (b.lat as i64 - a.lat as i64) * (c.lon as i64 - a.lon as i64);
    cross > 0
}

fn lat_to_y(lat: f64) -> f64 {
    let clamped = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (std::f64::consts::FRAC_PI_4 + clamped / 2.0).tan().ln().to_degrees()
}

fn y_to_lat(y: f64) -> f64 {
    (2.0 * y.to_radians().exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees()
}

/// Projects `point` onto the segment `source -> target` in web mercator.
///
/// Returns the clamped ratio along the segment and the snapped coordinate.
pub fn project_point_on_segment(
    source: Coordinate,
    target: Coordinate,
    point: Coordinate,
) -> (f64, Coordinate) {
    let (sx, sy) = (source.lon_degrees(), lat_to_y(source.lat_degrees()));
    let (tx, ty) = (target.lon_degrees(), lat_to_y(target.lat_degrees()));
    let (px, py) = (point.lon_degrees(), lat_to_y(point.lat_degrees()));

    let dx = tx - sx;
    let dy = ty - sy;
    let squared_length = dx * dx + dy * dy;
    if squared_length == 0.0 {
        return (0.0, source);
    }

    let ratio = (((px - sx) * dx + (py - sy) * dy) / squared_length).clamp(0.0, 1.0);
    if ratio == 0.0 {
        return (0.0, source);
    }
    if ratio == 1.0 {
        return (1.0, target);
    }

    let nearest = Coordinate::from_degrees(sx + ratio * dx, y_to_lat(sy + ratio * dy));
    (ratio, nearest)
}

/// Axis-aligned bounding box in fixed-point degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Rectangle {
    pub min_lon: i32,
    pub max_lon: i32,
    pub min_lat: i32,
    pub max_lat: i32,
}

impl Rectangle {
    /// Identity element of `merge`
    pub const EMPTY: Rectangle = Rectangle {
        min_lon: i32::MAX,
        max_lon: i32::MIN,
        min_lat: i32::MAX,
        max_lat: i32::MIN,
    };

    pub fn from_corners(south_west: Coordinate, north_east: Coordinate) -> Self {
        Self {
            min_lon: south_west.lon.min(north_east.lon),
            max_lon: south_west.lon.max(north_east.lon),
            min_lat: south_west.lat.min(north_east.lat),
            max_lat: south_west.lat.max(north_east.lat),
        }
    }

    pub fn merge(self, other: Rectangle) -> Rectangle {
        Rectangle {
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.min_lon..=self.max_lon).contains(&coordinate.lon)
            && (self.min_lat..=self.max_lat).contains(&coordinate.lat)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            lon: ((self.min_lon as i64 + self.max_lon as i64) / 2) as i32,
            lat: ((self.min_lat as i64 + self.max_lat as i64) / 2) as i32,
        }
    }

    /// Lower bound in meters of the distance from `coordinate` to anything inside
    pub fn min_distance(&self, coordinate: Coordinate) -> f64 {
        if self.min_lon > self.max_lon || self.min_lat > self.max_lat {
            return f64::INFINITY;
        }
        if self.contains(coordinate) {
            return 0.0;
        }
        let clamped = Coordinate {
            lon: coordinate.lon.clamp(self.min_lon, self.max_lon),
            lat: coordinate.lat.clamp(self.min_lat, self.max_lat),
        };
        haversine_distance(coordinate, clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_round_trip() {
        let c = Coordinate::from_degrees(4.3517, 50.8503);
        assert_eq!(c.lon, 43_517_000);
        assert_eq!(c.lat, 508_503_000);
        assert!((c.lat_degrees() - 50.8503).abs() < 1e-9);
        assert!(c.is_valid());
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let a = Coordinate::from_degrees(0.0, 0.0);
        let b = Coordinate::from_degrees(0.0, 1.0);
        let d = haversine_distance(a, b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_haversine_symmetric_and_zero() {
        let a = Coordinate::from_degrees(4.35, 50.85);
        let b = Coordinate::from_degrees(2.35, 48.86);
        assert_eq!(haversine_distance(a, a), 0.0);
        assert!((haversine_distance(a, b) - haversine_distance(b, a)).abs() < 1e-6);
        assert!((haversine_distance(a, b) - 264_000.0).abs() < 2_000.0);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::from_degrees(0.0, 0.0);
        assert!(bearing(origin, Coordinate::from_degrees(0.0, 1.0)).abs() < 1e-6);
        assert!((bearing(origin, Coordinate::from_degrees(1.0, 0.0)) - 90.0).abs() < 1e-6);
        assert!((bearing(origin, Coordinate::from_degrees(0.0, -1.0)) - 180.0).abs() < 1e-6);
        assert!((bearing(origin, Coordinate::from_degrees(-1.0, 0.0)) - 270.0).abs() < 1e-6);
    }

    #[test]
    fn test_is_ccw() {
        let a = Coordinate::from_degrees(0.0, 0.0);
        let b = Coordinate::from_degrees(0.0, 1.0);
        assert!(is_ccw(a, b, Coordinate::from_degrees(-0.1, 0.5)));
        assert!(!is_ccw(a, b, Coordinate::from_degrees(0.1, 0.5)));
    }

    #[test]
    fn test_projection_onto_segment() {
        let a = Coordinate::from_degrees(0.0, 0.0);
        let b = Coordinate::from_degrees(0.0, 1.0);
        let (ratio, nearest) = project_point_on_segment(a, b, Coordinate::from_degrees(0.0001, 0.5));
        assert!((ratio - 0.5).abs() < 1e-3);
        assert_eq!(nearest.lon, 0);
        assert!((nearest.lat_degrees() - 0.5).abs() < 1e-3);

        // Beyond the end clamps to the endpoint
        let (ratio, nearest) = project_point_on_segment(a, b, Coordinate::from_degrees(0.0, 2.0));
        assert_eq!(ratio, 1.0);
        assert_eq!(nearest, b);

        // Degenerate segment
        let (ratio, nearest) = project_point_on_segment(a, a, b);
        assert_eq!(ratio, 0.0);
        assert_eq!(nearest, a);
    }

    #[test]
    fn test_rectangle_min_distance() {
        let rect = Rectangle::from_corners(
            Coordinate::from_degrees(0.0, 0.0),
            Coordinate::from_degrees(1.0, 1.0),
        );
        assert_eq!(rect.min_distance(Coordinate::from_degrees(0.5, 0.5)), 0.0);
        let outside = rect.min_distance(Coordinate::from_degrees(0.5, 2.0));
        assert!((outside - 111_195.0).abs() < 100.0);
        assert_eq!(Rectangle::EMPTY.merge(rect), rect);
        assert_eq!(Rectangle::EMPTY.min_distance(Coordinate::default()), f64::INFINITY);
    }
}
