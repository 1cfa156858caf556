use serde::{Deserialize, Serialize};

/// Coordinates closer than this many degrees on both axes compare equal.
///
/// Also the smallest meaningful great-arc distance when solving for ranges;
/// below it, coordinate precision dominates the result.
pub const EQUALITY_TOLERANCE: f64 = 1e-7;

/// A point on the earth's surface, latitude/longitude in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// A point with NaN coordinates, used to mean "no position".
    pub const fn invalid() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Tolerant equality. Invalid points never compare equal.
    pub fn equals(&self, other: GeoPoint) -> bool {
        (self.lat - other.lat).abs() <= EQUALITY_TOLERANCE
            && (self.lon - other.lon).abs() <= EQUALITY_TOLERANCE
    }

    /// Great-circle distance to `other`, in great-arc radians (haversine).
    pub fn distance(&self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let half_dlat = (lat2 - lat1) * 0.5;
        let half_dlon = (other.lon - self.lon).to_radians() * 0.5;

        let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
        2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt())
    }

    /// Initial true bearing towards `other`, in degrees within `[0, 360)`.
    pub fn bearing_to(&self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// The point reached by travelling `distance` great-arc radians along the
    /// great circle leaving this point at `bearing_deg` true.
    pub fn offset(&self, bearing_deg: f64, distance: f64) -> GeoPoint {
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();
        let bearing = bearing_deg.to_radians();

        let sin_lat2 = lat1.sin() * distance.cos() + lat1.cos() * distance.sin() * bearing.cos();
        let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
        let lon2 = lon1
            + (bearing.sin() * distance.sin() * lat1.cos())
                .atan2(distance.cos() - lat1.sin() * sin_lat2);

        GeoPoint::new(lat2.to_degrees(), normalize_lon(lon2.to_degrees()))
    }
}

/// Wraps a longitude into `[-180, 180)`.
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
