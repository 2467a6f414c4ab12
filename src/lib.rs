pub mod builder;
pub mod cli;
pub mod config;
pub mod core;
pub mod frame;
pub mod math;
pub mod traits;

pub use builder::{Builder, GeometryInfo, GeometryType, Mesh, Shape};
pub use config::{TrackballSettings, ViewerConfig};
pub use crate::core::{Camera, GlobeTrackball, InputEvent, WinitInput};
pub use frame::FrameClock;
pub use math::{Ellipsoid, EllipsoidModel, Geodetic, LookAt, RenderArea};
