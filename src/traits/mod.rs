pub mod camera;
pub mod handler;

pub use camera::*;
pub use handler::*;
