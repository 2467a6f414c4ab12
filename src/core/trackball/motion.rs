use glam::{DMat4, DVec2, DVec3};

use crate::math::LookAt;

/// Rotate the frame by `angle` radians about an eye-space `axis` through the look-at center.
///
/// The center stays fixed; eye and up orbit around it.
pub fn rotate(look_at: &mut LookAt, angle: f64, axis: DVec3) {
    let rotation = DMat4::from_axis_angle(axis, angle);
    let lv = look_at.view_matrix();
    let center_eye_space = lv.transform_point3(look_at.center);

    let matrix = lv.inverse()
        * DMat4::from_translation(center_eye_space)
        * rotation
        * DMat4::from_translation(-center_eye_space)
        * lv;

    look_at.transform(&matrix);
}

/// Move the eye along the look vector by `ratio` of the eye-center distance
///
/// Positive ratios move towards the center, 1.0 lands on it and larger values pass through.
pub fn zoom(look_at: &mut LookAt, ratio: f64) {
    let look_vector = look_at.look_vector();
    look_at.eye += look_vector * ratio;
}

/// Side and up axes used to turn a screen-space pan into world motion
fn pan_axes(look_at: &LookAt, pan_scale: f64) -> (DVec3, DVec3, f64) {
    let look_vector = look_at.look_vector();
    let look_normal = look_vector.normalize();
    let side_normal = look_normal.cross(look_at.up);
    (look_normal, side_normal, look_vector.length() * pan_scale)
}

/// Translate eye and center together in the view plane
pub fn pan_flat(look_at: &mut LookAt, delta: DVec2, pan_scale: f64) {
    let (_, side_normal, distance) = pan_axes(look_at, pan_scale);
    let translation = side_normal * (-delta.x * distance) + look_at.up * (delta.y * distance);

    look_at.eye += translation;
    look_at.center += translation;
}

/// Pan across a globe by rotating the whole frame about the globe's center.
///
/// The screen-space motion is projected onto the tangent plane at the look-at center and
/// converted into an arc angle, so the apparent speed stays the same at any zoom.
/// Returns false when the motion is degenerate and nothing changed.
pub fn pan_globe(look_at: &mut LookAt, delta: DVec2, pan_scale: f64, radius_equator: f64) -> bool {
    let (look_normal, side_normal, scale) = pan_axes(look_at, pan_scale);
    let Some(globe_normal) = look_at.center.try_normalize() else {
        return false;
    };

    let m = look_at.up * (-scale * delta.y) + side_normal * (scale * delta.x);
    let v = m + look_normal * m.dot(globe_normal);
    let angle = v.length() / radius_equator;

    if angle == 0.0 || !angle.is_finite() {
        return false;
    }

    let Some(n) = (look_at.center + v).try_normalize() else {
        return false;
    };
    let Some(axis) = globe_normal.cross(n).try_normalize() else {
        return false;
    };

    look_at.transform(&DMat4::from_axis_angle(axis, -angle));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn frame() -> LookAt {
        LookAt::new(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO, DVec3::Y)
    }

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < TOLERANCE, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_rotate_zero_angle_is_identity() {
        let mut look_at = frame();
        rotate(&mut look_at, 0.0, DVec3::X);
        assert_close(look_at.eye, frame().eye);
        assert_close(look_at.center, frame().center);
        assert_close(look_at.up, frame().up);
    }

    #[test]
    fn test_rotate_keeps_center_fixed() {
        let mut look_at = frame();
        rotate(&mut look_at, 0.7, DVec3::new(0.0, 1.0, 0.0));
        assert_close(look_at.center, DVec3::ZERO);
        assert!((look_at.distance() - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_rotate_quarter_turn_about_view_up() {
        let mut look_at = frame();
        rotate(&mut look_at, std::f64::consts::FRAC_PI_2, DVec3::Y);
        // Orbiting about the view's up axis swings the eye round to the x axis
        assert!((look_at.eye.y).abs() < TOLERANCE);
        assert!((look_at.eye.x.abs() - 10.0).abs() < TOLERANCE);
        assert_close(look_at.up, DVec3::Y);
    }

    #[test]
    fn test_rotate_keeps_up_unit_length() {
        let mut look_at = frame();
        for _ in 0..50 {
            rotate(&mut look_at, 0.13, DVec3::new(1.0, 1.0, 0.0).normalize());
        }
        assert!((look_at.up.length() - 1.0).abs() < TOLERANCE);
        assert!(look_at.up.dot(look_at.look_vector().normalize()).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_zero_leaves_eye() {
        let mut look_at = frame();
        zoom(&mut look_at, 0.0);
        assert_eq!(look_at.eye, frame().eye);
    }

    #[test]
    fn test_zoom_one_reaches_center() {
        let mut look_at = frame();
        zoom(&mut look_at, 1.0);
        assert_eq!(look_at.eye, look_at.center);
    }

    #[test]
    fn test_zoom_half() {
        let mut look_at = frame();
        zoom(&mut look_at, 0.5);
        assert_close(look_at.eye, DVec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_zoom_overshoots_past_center() {
        let mut look_at = frame();
        zoom(&mut look_at, 1.5);
        assert_close(look_at.eye, DVec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_pan_flat_translates_both_points() {
        let mut look_at = frame();
        pan_flat(&mut look_at, DVec2::new(1.0, 0.0), 0.3);
        // look = -Z, side = -Z x Y = +X; positive x pans the scene, moving the eye to -X
        assert_close(look_at.eye, DVec3::new(-3.0, 0.0, 10.0));
        assert_close(look_at.center, DVec3::new(-3.0, 0.0, 0.0));

        let mut look_at = frame();
        pan_flat(&mut look_at, DVec2::new(0.0, 1.0), 0.3);
        assert_close(look_at.eye, DVec3::new(0.0, 3.0, 10.0));
        assert_close(look_at.center, DVec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_pan_globe_preserves_distance_to_globe_center() {
        let radius = 1000.0;
        let mut look_at = LookAt::new(DVec3::new(0.0, 0.0, radius + 100.0), DVec3::new(0.0, 0.0, radius), DVec3::Y);
        let moved = pan_globe(&mut look_at, DVec2::new(0.2, 0.1), 0.3, radius);

        assert!(moved);
        assert!((look_at.center.length() - radius).abs() < 1e-6);
        assert!((look_at.eye.length() - (radius + 100.0)).abs() < 1e-6);
        assert!(look_at.center.x.abs() > 0.0 || look_at.center.y.abs() > 0.0);
    }

    #[test]
    fn test_pan_globe_zero_delta_is_noop() {
        let mut look_at = LookAt::new(DVec3::new(0.0, 0.0, 1100.0), DVec3::new(0.0, 0.0, 1000.0), DVec3::Y);
        let before = look_at;
        assert!(!pan_globe(&mut look_at, DVec2::ZERO, 0.3, 1000.0));
        assert_eq!(look_at, before);
    }

    #[test]
    fn test_pan_globe_degenerate_center_is_noop() {
        let mut look_at = frame();
        let before = look_at;
        assert!(!pan_globe(&mut look_at, DVec2::new(0.5, 0.5), 0.3, 1000.0));
        assert_eq!(look_at, before);
    }
}
