//! Markers and the surfaces they are drawn on

pub mod headless;
pub mod marker;
pub mod pool;
pub mod surface;

pub use headless::HeadlessSurface;
pub use marker::{Marker, MarkerFrame, MarkerId, MarkerState};
pub use pool::MarkerPool;
pub use surface::{resolve_surface, Surface, SurfaceId, SurfaceProvider};
