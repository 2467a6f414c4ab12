pub mod cache;
pub mod camera;
pub mod events;
pub mod gpu_context;
pub mod input_adapter;
pub mod trackball;

pub use cache::ResourceCache;
pub use camera::{Camera, Perspective, ViewMatrix};
pub use events::*;
pub use gpu_context::GpuContext;
pub use input_adapter::WinitInput;
pub use trackball::{GlobeTrackball, PendingMotion, UpdateMode};
