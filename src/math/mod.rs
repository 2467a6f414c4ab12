mod ellipsoid;
mod look_at;
mod render_area;

pub use ellipsoid::{Ellipsoid, EllipsoidModel, Geodetic, WGS84_RADIUS_EQUATOR, WGS84_RADIUS_POLAR};
pub use look_at::LookAt;
pub use render_area::RenderArea;
