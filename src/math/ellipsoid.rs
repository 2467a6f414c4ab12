use glam::DVec3;

/// WGS84 semi-major axis in meters.
pub const WGS84_RADIUS_EQUATOR: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in meters.
pub const WGS84_RADIUS_POLAR: f64 = 6_356_752.314245;

const MAX_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE: f64 = 1e-15;

/// Geodetic location: latitude and longitude in radians, altitude above the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Geodetic {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    pub fn from_degrees(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self::new(latitude.to_radians(), longitude.to_radians(), altitude)
    }
}

/// Conversion between Earth-centered Cartesian (ECEF) and geodetic coordinates
pub trait EllipsoidModel {
    /// Convert an ECEF point to latitude/longitude/altitude
    fn to_geodetic(&self, ecef: DVec3) -> Geodetic;

    /// Convert latitude/longitude/altitude back to an ECEF point
    fn to_ecef(&self, location: Geodetic) -> DVec3;

    /// Equatorial radius, used to turn surface distances into angles
    fn radius_equator(&self) -> f64;
}

/// Oblate ellipsoid of revolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    radius_equator: f64,
    radius_polar: f64,
    eccentricity_squared: f64,
}

impl Ellipsoid {
    pub fn new(radius_equator: f64, radius_polar: f64) -> Self {
        let flattening = (radius_equator - radius_polar) / radius_equator;
        Self {
            radius_equator,
            radius_polar,
            eccentricity_squared: 2.0 * flattening - flattening * flattening,
        }
    }

    pub fn wgs84() -> Self {
        Self::new(WGS84_RADIUS_EQUATOR, WGS84_RADIUS_POLAR)
    }

    /// Perfect sphere, handy for tests and toy globes
    pub fn sphere(radius: f64) -> Self {
        Self::new(radius, radius)
    }

    pub fn radius_polar(&self) -> f64 {
        self.radius_polar
    }

    /// Prime vertical radius of curvature at the given latitude
    fn prime_vertical_radius(&self, sin_latitude: f64) -> f64 {
        self.radius_equator / (1.0 - self.eccentricity_squared * sin_latitude * sin_latitude).sqrt()
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl EllipsoidModel for Ellipsoid {
    fn to_geodetic(&self, ecef: DVec3) -> Geodetic {
        let a = self.radius_equator;
        let b = self.radius_polar;
        let e2 = self.eccentricity_squared;

        let longitude = ecef.y.atan2(ecef.x);
        let p = ecef.x.hypot(ecef.y);

        // Bowring's estimate, then fixed-point refinement. atan2 keeps the poles well-defined.
        let second_e2 = if b > 0.0 { (a * a - b * b) / (b * b) } else { 0.0 };
        let theta = (ecef.z * a).atan2(p * b);
        let (sin_t, cos_t) = theta.sin_cos();
        let mut latitude = (ecef.z + second_e2 * b * sin_t.powi(3))
            .atan2(p - e2 * a * cos_t.powi(3));

        for _ in 0..MAX_ITERATIONS {
            let n = self.prime_vertical_radius(latitude.sin());
            let next = (ecef.z + e2 * n * latitude.sin()).atan2(p);
            let converged = (next - latitude).abs() < LATITUDE_TOLERANCE;
            latitude = next;
            if converged {
                break;
            }
        }

        // Altitude form that stays finite at the poles (no division by cos(latitude))
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let n = self.prime_vertical_radius(sin_lat);
        let altitude = p * cos_lat + ecef.z * sin_lat - a * a / n;

        Geodetic::new(latitude, longitude, altitude)
    }

    fn to_ecef(&self, location: Geodetic) -> DVec3 {
        let (sin_lat, cos_lat) = location.latitude.sin_cos();
        let (sin_lon, cos_lon) = location.longitude.sin_cos();
        let n = self.prime_vertical_radius(sin_lat);
        let horizontal = (n + location.altitude) * cos_lat;

        DVec3::new(
            horizontal * cos_lon,
            horizontal * sin_lon,
            (n * (1.0 - self.eccentricity_squared) + location.altitude) * sin_lat,
        )
    }

    fn radius_equator(&self) -> f64 {
        self.radius_equator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(ellipsoid: &Ellipsoid, location: Geodetic) {
        let ecef = ellipsoid.to_ecef(location);
        let back = ellipsoid.to_geodetic(ecef);
        assert!((back.latitude - location.latitude).abs() < 1e-12, "{:?} vs {:?}", back, location);
        assert!((back.altitude - location.altitude).abs() < 1e-6, "{:?} vs {:?}", back, location);
        assert!((ellipsoid.to_ecef(back) - ecef).length() < 1e-6);
    }

    #[test]
    fn test_equator_prime_meridian() {
        let wgs84 = Ellipsoid::wgs84();
        let ecef = wgs84.to_ecef(Geodetic::new(0.0, 0.0, 0.0));
        assert!((ecef - DVec3::new(WGS84_RADIUS_EQUATOR, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_north_pole() {
        let wgs84 = Ellipsoid::wgs84();
        let location = wgs84.to_geodetic(DVec3::new(0.0, 0.0, WGS84_RADIUS_POLAR + 10.0));
        assert!((location.latitude - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((location.altitude - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_south_pole_altitude_finite() {
        let wgs84 = Ellipsoid::wgs84();
        let location = wgs84.to_geodetic(DVec3::new(0.0, 0.0, -WGS84_RADIUS_POLAR));
        assert!(location.altitude.is_finite());
        assert!(location.altitude.abs() < 1e-6);
    }

    #[test]
    fn test_round_trips() {
        let wgs84 = Ellipsoid::wgs84();
        assert_round_trip(&wgs84, Geodetic::from_degrees(0.0, 0.0, 0.0));
        assert_round_trip(&wgs84, Geodetic::from_degrees(51.5, -0.12, 35.0));
        assert_round_trip(&wgs84, Geodetic::from_degrees(-33.9, 151.2, 1_000.0));
        assert_round_trip(&wgs84, Geodetic::from_degrees(89.999, 45.0, 2.0));
        assert_round_trip(&wgs84, Geodetic::from_degrees(12.0, 179.0, 400_000.0));
    }

    #[test]
    fn test_sphere_altitude_is_distance_minus_radius() {
        let sphere = Ellipsoid::sphere(100.0);
        let location = sphere.to_geodetic(DVec3::new(30.0, 40.0, 120.0));
        let distance = DVec3::new(30.0, 40.0, 120.0).length();
        assert!((location.altitude - (distance - 100.0)).abs() < 1e-9);
        assert_eq!(sphere.radius_equator(), 100.0);
    }

    #[test]
    fn test_origin_is_deep_below_surface() {
        let wgs84 = Ellipsoid::wgs84();
        let location = wgs84.to_geodetic(DVec3::ZERO);
        assert!(location.altitude.is_finite());
        assert!(location.altitude <= -WGS84_RADIUS_POLAR + 1e-6);
        assert!(location.altitude >= -WGS84_RADIUS_EQUATOR - 1e-6);
    }
}
