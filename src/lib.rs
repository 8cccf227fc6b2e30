//! Touch Visualizer - show every touch on screen.
//!
//! Draws a transient marker under each active contact so touches are visible
//! while debugging and in screen recordings. The visualizer observes the
//! host's input pipeline without changing how the application handles it.

pub mod animation;
pub mod capture;
pub mod overlay;
pub mod replay;
pub mod visualizer;

pub use capture::input::{ContactId, HostEvent, Point, TouchContact, TouchPhase};
pub use overlay::{HeadlessSurface, Surface, SurfaceId, SurfaceProvider};
pub use visualizer::{shared, Configuration, SharedVisualizer, TouchVisualizer};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "touch_visualizer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
