//! Touch input capture
//!
//! Defines the touch data the host hands over and the interceptor that hooks
//! the host's dispatch path so every touch event is observed once, in order.

pub mod interceptor;
pub mod types;

pub use interceptor::{DispatchHub, EventDispatch, EventInterceptor, EventObserver, ObserverToken};
pub use types::{ContactId, HostEvent, Point, TouchContact, TouchPhase};
