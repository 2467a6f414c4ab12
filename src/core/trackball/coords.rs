use std::f64::consts::PI;

use glam::{DVec2, DVec3};

use crate::math::RenderArea;

/// Map window pixels into normalized device coordinates
///
/// x spans [-aspect, aspect] and y spans [-1, 1] (y grows downwards, like the window).
/// A zero-sized axis maps to 0.
pub fn ndc(x: i32, y: i32, area: RenderArea) -> DVec2 {
    let width = f64::from(area.width);
    let height = f64::from(area.height);
    let aspect_ratio = area.aspect_ratio();

    DVec2::new(
        if area.width > 0 {
            ((f64::from(x) - f64::from(area.x)) / width * 2.0 - 1.0) * aspect_ratio
        } else {
            0.0
        },
        if area.height > 0 {
            (f64::from(y) - f64::from(area.y)) / height * 2.0 - 1.0
        } else {
            0.0
        },
    )
}

/// Lift an NDC position onto the trackball dome
///
/// Inside the unit disk the height follows a raised cosine (1 at the center, 0 at the rim);
/// outside it the surface is flat.
pub fn trackball_coordinate(ndc: DVec2) -> DVec3 {
    let l = ndc.length();
    if l < 1.0 {
        let h = 0.5 + (l * PI).cos() * 0.5;
        DVec3::new(ndc.x, -ndc.y, h)
    } else {
        DVec3::new(ndc.x, -ndc.y, 0.0)
    }
}

/// Previous pointer position, kept to turn the next move into a delta
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub ndc: DVec2,
    pub tbc: DVec3,
}

impl PointerSample {
    pub fn at(x: i32, y: i32, area: RenderArea) -> Self {
        let ndc = ndc(x, y, area);
        Self {
            ndc,
            tbc: trackball_coordinate(ndc),
        }
    }
}
