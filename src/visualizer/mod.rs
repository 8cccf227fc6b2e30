//! Visualizer controller, configuration and diagnostics
//!
//! `TouchVisualizer` is the explicit context object; `shared()` exposes the
//! single process-wide instance wired to the host's dispatch hook.

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod shared;

pub use config::{Configuration, MarkerColor};
pub use controller::TouchVisualizer;
pub use diagnostics::{DiagnosticLogger, DiagnosticSink, MemorySink, TracingSink};
pub use error::{VisualizerError, VisualizerResult};
pub use shared::{shared, SharedVisualizer};
