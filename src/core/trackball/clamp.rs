use log::trace;

use crate::math::{EllipsoidModel, LookAt};

/// Altitudes closer than this are treated as equal when locating the surface crossing
const EQUAL_ALTITUDE_TOLERANCE: f64 = 1e-6;

/// Pin the look-at center to the ellipsoid surface and keep the eye above `minimum_altitude`.
///
/// The new center is found by interpolating along the eye-center line to where the
/// (linearly interpolated) altitude reaches zero, then dropping that point onto the surface.
/// When eye and center sit at the same altitude there is no such crossing; the center is
/// then dropped straight down onto the surface instead.
pub fn clamp_to_globe(look_at: &mut LookAt, ellipsoid: &dyn EllipsoidModel, minimum_altitude: f64) {
    let location_center = ellipsoid.to_geodetic(look_at.center);
    let mut location_eye = ellipsoid.to_geodetic(look_at.eye);

    let ratio = surface_ratio(location_eye.altitude, location_center.altitude);
    let mut location = ellipsoid.to_geodetic(look_at.center * ratio + look_at.eye * (1.0 - ratio));

    location.altitude = 0.0;
    look_at.center = ellipsoid.to_ecef(location);

    if location_eye.altitude < minimum_altitude {
        trace!(
            "eye altitude {:.3} below minimum {:.3}, raising",
            location_eye.altitude,
            minimum_altitude
        );
        location_eye.altitude = minimum_altitude;
        look_at.eye = ellipsoid.to_ecef(location_eye);
    }
}

/// Interpolation weight of the center at which altitude crosses zero
fn surface_ratio(eye_altitude: f64, center_altitude: f64) -> f64 {
    let span = eye_altitude - center_altitude;
    if span.abs() < EQUAL_ALTITUDE_TOLERANCE {
        trace!("eye and center at equal altitude {:.3}, dropping center vertically", eye_altitude);
        return 1.0;
    }

    let ratio = eye_altitude / span;
    if ratio.is_finite() {
        ratio
    } else {
        1.0
    }
}
