//! Input capture
//!
//! The visualizer only observes input; it never consumes or alters events.

pub mod input;

pub use input::{DispatchHub, EventDispatch, EventInterceptor, HostEvent, TouchContact, TouchPhase};
