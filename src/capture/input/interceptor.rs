//! Event interception
//!
//! The host exposes one registration point on its dispatch path
//! ([`EventDispatch`]). The [`EventInterceptor`] registers a single observer per
//! target surface that forwards every event to the visualizer. Observers only
//! watch: delivery to the host's own handlers is never altered.

use crate::capture::input::types::HostEvent;
use crate::overlay::surface::{Surface, SurfaceId};
use crate::visualizer::controller::TouchVisualizer;
use crate::visualizer::error::{VisualizerError, VisualizerResult};
use parking_lot::Mutex as ParkingMutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Callback invoked for every event on the host's dispatch path
pub type EventObserver = Box<dyn FnMut(&HostEvent) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(pub u64);

/// The host's event-dispatch abstraction
pub trait EventDispatch: Send + Sync {
    /// Register an observer that sees every event before normal delivery
    fn add_observer(&self, observer: EventObserver) -> ObserverToken;

    /// Remove a previously registered observer. Unknown tokens are ignored.
    fn remove_observer(&self, token: ObserverToken);
}

/// In-process dispatch path: notifies observers in registration order, then
/// runs normal delivery with the unmodified event.
#[derive(Default)]
pub struct DispatchHub {
    next_token: AtomicU64,
    observers: ParkingMutex<Vec<(ObserverToken, EventObserver)>>,
}

impl DispatchHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Send an event down the dispatch path.
    ///
    /// Observers must not register or remove observers from inside their
    /// callback; the observer list is locked for the duration of the call.
    pub fn dispatch<F>(&self, event: &HostEvent, deliver: F)
    where
        F: FnOnce(&HostEvent),
    {
        {
            let mut observers = self.observers.lock();
            for (_, observer) in observers.iter_mut() {
                observer(event);
            }
        }
        deliver(event);
    }
}

impl EventDispatch for DispatchHub {
    fn add_observer(&self, observer: EventObserver) -> ObserverToken {
        let token = ObserverToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((token, observer));
        token
    }

    fn remove_observer(&self, token: ObserverToken) {
        self.observers.lock().retain(|(t, _)| *t != token);
    }
}

struct Installation {
    surface_id: SurfaceId,
    dispatch: Arc<dyn EventDispatch>,
    token: ObserverToken,
}

/// Keeps exactly one forwarding observer installed on the current target surface
#[derive(Default)]
pub struct EventInterceptor {
    installed: Option<Installation>,
}

impl EventInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn installed_surface(&self) -> Option<SurfaceId> {
        self.installed.as_ref().map(|i| i.surface_id)
    }

    /// Install the forwarding observer on `surface`'s dispatch path.
    ///
    /// Returns `Ok(false)` when it is already installed there. Moving to a new
    /// surface removes the previous observer first. The observer holds a weak
    /// reference, so dropping the visualizer silently stops forwarding.
    pub fn install(
        &mut self,
        surface: &Arc<dyn Surface>,
        target: Weak<ParkingMutex<TouchVisualizer>>,
    ) -> VisualizerResult<bool> {
        let surface_id = surface.id();
        if self.installed_surface() == Some(surface_id) {
            return Ok(false);
        }

        self.uninstall();

        let dispatch = surface.dispatcher().ok_or_else(|| {
            VisualizerError::InterceptionUnavailable(format!(
                "surface {} has no event dispatch hook",
                surface_id
            ))
        })?;

        let token = dispatch.add_observer(Box::new(move |event| {
            if let Some(visualizer) = target.upgrade() {
                visualizer.lock().handle_event(event);
            }
        }));

        tracing::debug!("Event interceptor installed on surface {}", surface_id);
        self.installed = Some(Installation {
            surface_id,
            dispatch,
            token,
        });
        Ok(true)
    }

    pub fn uninstall(&mut self) {
        if let Some(installation) = self.installed.take() {
            installation.dispatch.remove_observer(installation.token);
            tracing::debug!(
                "Event interceptor removed from surface {}",
                installation.surface_id
            );
        }
    }
}

impl Drop for EventInterceptor {
    fn drop(&mut self) {
        self.uninstall();
    }
}
