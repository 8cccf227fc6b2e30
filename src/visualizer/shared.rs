//! Process-wide visualizer
//!
//! [`shared()`] hands out one [`SharedVisualizer`] that lives for the rest of
//! the process. It pairs the controller with the event interceptor so `start`
//! also hooks the surface's dispatch path.

use crate::animation::fade::{FadeHandle, FadeScheduler};
use crate::capture::input::interceptor::EventInterceptor;
use crate::capture::input::types::{HostEvent, TouchContact};
use crate::overlay::surface::{Surface, SurfaceId, SurfaceProvider};
use crate::visualizer::config::Configuration;
use crate::visualizer::controller::TouchVisualizer;
use once_cell::sync::Lazy;
use parking_lot::Mutex as ParkingMutex;
use std::sync::Arc;
use std::time::Instant;

static SHARED: Lazy<SharedVisualizer> = Lazy::new(SharedVisualizer::new);

/// The process-wide visualizer, created on first use and never torn down
pub fn shared() -> &'static SharedVisualizer {
    &SHARED
}

/// A visualizer plus its dispatch hook.
///
/// None of these methods may be called from inside an event observer: the
/// observer already holds the controller lock while it runs.
pub struct SharedVisualizer {
    core: Arc<ParkingMutex<TouchVisualizer>>,
    interceptor: ParkingMutex<EventInterceptor>,
}

impl Default for SharedVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedVisualizer {
    pub fn new() -> Self {
        Self::from_visualizer(TouchVisualizer::new())
    }

    pub fn from_visualizer(visualizer: TouchVisualizer) -> Self {
        Self {
            core: Arc::new(ParkingMutex::new(visualizer)),
            interceptor: ParkingMutex::new(EventInterceptor::new()),
        }
    }

    /// Run `f` with exclusive access to the controller
    pub fn with<R>(&self, f: impl FnOnce(&mut TouchVisualizer) -> R) -> R {
        f(&mut *self.core.lock())
    }

    pub fn start(&self, config: Option<Configuration>, surface: Arc<dyn Surface>) {
        self.core.lock().start(config, surface.clone());

        let installed = self
            .interceptor
            .lock()
            .install(&surface, Arc::downgrade(&self.core));
        if let Err(e) = installed {
            tracing::warn!("Touches on surface {} will not be shown: {}", surface.id(), e);
        }
    }

    pub fn stop(&self) {
        self.core.lock().stop();
    }

    pub fn is_enabled(&self) -> bool {
        self.core.lock().is_enabled()
    }

    pub fn get_touches(&self) -> Vec<TouchContact> {
        self.core.lock().get_touches()
    }

    pub fn remove_all_touch_views(&self) {
        self.core.lock().remove_all_touch_views();
    }

    pub fn handle_event(&self, event: &HostEvent) {
        self.core.lock().handle_event(event);
    }

    pub fn orientation_did_change(&self) {
        self.core.lock().orientation_did_change();
    }

    pub fn complete_fade(&self, handle: FadeHandle) -> bool {
        self.core.lock().complete_fade(handle)
    }

    pub fn tick(&self, now: Instant) -> usize {
        self.core.lock().tick(now)
    }

    pub fn set_fade_scheduler(&self, scheduler: Box<dyn FadeScheduler>) {
        self.core.lock().set_fade_scheduler(scheduler);
    }

    pub fn set_surface_provider(&self, provider: Option<Arc<dyn SurfaceProvider>>) {
        self.core.lock().set_surface_provider(provider);
    }

    pub fn hooked_surface(&self) -> Option<SurfaceId> {
        self.interceptor.lock().installed_surface()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::types::TouchPhase;
    use crate::overlay::headless::HeadlessSurface;

    fn began(id: u64) -> HostEvent {
        HostEvent::Touches(vec![TouchContact::new(id, TouchPhase::Began, 1.0, 1.0)])
    }

    #[test]
    fn test_shared_is_a_single_instance() {
        assert!(std::ptr::eq(shared(), shared()));
    }

    #[test]
    fn test_start_hooks_surface_dispatch() {
        let visualizer = SharedVisualizer::new();
        let surface = HeadlessSurface::new(1, 0);
        let hub = surface.hub();

        visualizer.start(None, surface.clone());
        visualizer.start(None, surface.clone());
        assert_eq!(hub.observer_count(), 1);
        assert_eq!(visualizer.hooked_surface(), Some(SurfaceId(1)));

        hub.dispatch(&began(1), |_| {});
        assert_eq!(visualizer.get_touches().len(), 1);
        assert_eq!(surface.attached_count(), 1);

        visualizer.stop();
        visualizer.stop();
        assert!(!visualizer.is_enabled());
        assert_eq!(surface.attached_count(), 0);

        hub.dispatch(&began(2), |_| {});
        assert!(visualizer.get_touches().is_empty());
    }

    #[test]
    fn test_orientation_through_dispatch_path() {
        let visualizer = SharedVisualizer::new();
        let surface = HeadlessSurface::new(1, 0);
        let hub = surface.hub();
        visualizer.start(None, surface.clone());

        hub.dispatch(&began(1), |_| {});
        hub.dispatch(&HostEvent::OrientationChanged, |_| {});

        assert!(visualizer.get_touches().is_empty());
        assert!(visualizer.is_enabled());
    }

    #[test]
    fn test_unhookable_surface_still_runs() {
        let visualizer = SharedVisualizer::new();
        let surface = HeadlessSurface::without_dispatch(5, 0);

        visualizer.start(None, surface.clone());

        assert!(visualizer.is_enabled());
        assert_eq!(visualizer.hooked_surface(), None);

        visualizer.handle_event(&began(1));
        assert_eq!(surface.attached_count(), 1);
    }
}
