//! Visualizer controller
//!
//! `TouchVisualizer` owns the marker pool, the diagnostic logger and the fade
//! timers. Everything runs on the host's event thread: the interceptor feeds
//! `handle_event`, and expired fades come back through `complete_fade` or
//! `tick` on that same thread.

use crate::animation::fade::{FadeHandle, FadeScheduler, ManualFadeScheduler, FADE_END_SCALE};
use crate::capture::input::types::{HostEvent, TouchContact, TouchPhase};
use crate::overlay::marker::MarkerFrame;
use crate::overlay::pool::MarkerPool;
use crate::overlay::surface::{resolve_surface, Surface, SurfaceId, SurfaceProvider};
use crate::visualizer::config::Configuration;
use crate::visualizer::diagnostics::{DiagnosticLogger, DiagnosticSink};
use std::sync::Arc;
use std::time::Instant;

pub struct TouchVisualizer {
    enabled: bool,
    config: Configuration,
    primary: Option<Arc<dyn Surface>>,
    provider: Option<Arc<dyn SurfaceProvider>>,
    pool: MarkerPool,
    logger: DiagnosticLogger,
    fades: Box<dyn FadeScheduler>,
    warned_missing_radius: bool,
}

impl Default for TouchVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchVisualizer {
    pub fn new() -> Self {
        Self {
            enabled: false,
            config: Configuration::default(),
            primary: None,
            provider: None,
            pool: MarkerPool::new(),
            logger: DiagnosticLogger::default(),
            fades: Box::new(ManualFadeScheduler::new()),
            warned_missing_radius: false,
        }
    }

    pub fn with_diagnostic_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.logger = DiagnosticLogger::new(sink);
        self
    }

    pub fn with_fade_scheduler(mut self, scheduler: Box<dyn FadeScheduler>) -> Self {
        self.set_fade_scheduler(scheduler);
        self
    }

    /// Swap the fade backend. Markers still fading under the old backend are
    /// detached right away since their timers are dropped with it.
    pub fn set_fade_scheduler(&mut self, scheduler: Box<dyn FadeScheduler>) {
        for handle in self.pool.release_all() {
            self.fades.cancel(handle);
        }
        self.fades = scheduler;
    }

    /// Where to look for surfaces stacked above the primary one
    pub fn set_surface_provider(&mut self, provider: Option<Arc<dyn SurfaceProvider>>) {
        self.provider = provider;
    }

    /// Begin (or restart) a session on `surface`. The latest configuration and
    /// surface replace any previous ones.
    pub fn start(&mut self, config: Option<Configuration>, surface: Arc<dyn Surface>) {
        let config = config.unwrap_or_default();
        let surface_id = surface.id();

        for handle in self.pool.release_on(surface_id) {
            self.fades.cancel(handle);
        }

        self.config = config;
        self.primary = Some(surface);
        self.enabled = true;
        self.logger.reset();

        tracing::info!(
            "Touch visualizer started (surface={}, shows_log={})",
            surface_id,
            self.config.shows_log
        );
        if self.config.shows_log {
            self.logger.note("Touch visualizer: start");
        }
    }

    pub fn stop(&mut self) {
        let was_enabled = self.enabled;
        self.enabled = false;
        self.remove_all_touch_views();

        if was_enabled {
            tracing::info!("Touch visualizer stopped");
            if self.config.shows_log {
                self.logger.note("Touch visualizer: finish");
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn primary_surface_id(&self) -> Option<SurfaceId> {
        self.primary.as_ref().map(|surface| surface.id())
    }

    pub fn pool(&self) -> &MarkerPool {
        &self.pool
    }

    /// Contacts bound to an in-use marker, in pool order. A snapshot.
    pub fn get_touches(&self) -> Vec<TouchContact> {
        self.pool
            .in_use()
            .filter_map(|marker| marker.contact().cloned())
            .collect()
    }

    /// Detach every marker, fading or not. Leaves `enabled` alone.
    pub fn remove_all_touch_views(&mut self) {
        for handle in self.pool.release_all() {
            self.fades.cancel(handle);
        }
    }

    pub fn orientation_did_change(&mut self) {
        tracing::debug!("Orientation changed, dropping {} markers", self.pool.in_use_count());
        self.remove_all_touch_views();
    }

    pub fn handle_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::OrientationChanged => self.orientation_did_change(),
            HostEvent::Other => {}
            HostEvent::Touches(contacts) => {
                if !self.enabled {
                    return;
                }
                for contact in contacts {
                    self.handle_contact(contact);
                    if self.config.shows_log {
                        self.logger.log(&self.pool);
                    }
                }
            }
        }
    }

    /// Finish an expired fade. Stale or cancelled handles are ignored.
    pub fn complete_fade(&mut self, handle: FadeHandle) -> bool {
        match self.pool.fading_mut(handle) {
            Some(marker) => {
                marker.release();
                true
            }
            None => false,
        }
    }

    /// Complete every fade the scheduler reports as due at `now`
    pub fn tick(&mut self, now: Instant) -> usize {
        let due = self.fades.poll_due(now);
        due.into_iter()
            .filter(|handle| self.complete_fade(*handle))
            .count()
    }

    fn handle_contact(&mut self, contact: &TouchContact) {
        if contact.radius.is_none() && !self.warned_missing_radius {
            tracing::warn!("Touch radius is not reported in this environment; using 0");
            self.warned_missing_radius = true;
        }
        let radius = contact.radius.unwrap_or(0.0);

        match contact.phase {
            TouchPhase::Began => {
                let Some(surface) = self.target_surface() else {
                    return;
                };
                // A repeated `began` for a live contact restarts its marker
                if let Some(previous) = self.pool.unbind(contact.id) {
                    if let Some(handle) = previous.release() {
                        self.fades.cancel(handle);
                    }
                }
                let center = surface.convert_from_screen(contact.location);
                let frame = self.config.active_frame(center, radius);
                self.pool
                    .dequeue(contact.id)
                    .activate(contact.clone(), &surface, frame);
            }
            TouchPhase::Moved | TouchPhase::Stationary => {
                let Some(marker) = self.pool.bound_mut(contact.id) else {
                    return;
                };
                let center = marker
                    .surface()
                    .map(|surface| surface.convert_from_screen(contact.location))
                    .unwrap_or(contact.location);
                marker.track(contact, self.config.active_frame(center, radius));
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                let Some(marker) = self.pool.unbind(contact.id) else {
                    return;
                };
                let center = marker
                    .surface()
                    .map(|surface| surface.convert_from_screen(contact.location))
                    .unwrap_or(contact.location);
                let duration = self.config.fade_duration();
                let handle = self.fades.schedule(duration);
                let end_frame = MarkerFrame {
                    center,
                    opacity: 0.0,
                    scale: FADE_END_SCALE,
                    transition: duration,
                    ..*marker.frame()
                };
                marker.begin_fade(contact, handle, end_frame);
            }
            TouchPhase::RegionEntered
            | TouchPhase::RegionMoved
            | TouchPhase::RegionExited
            | TouchPhase::Unknown => {
                // Logged with its own phase code but never moves the marker
                if let Some(marker) = self.pool.bound_mut(contact.id) {
                    marker.observe(contact);
                }
            }
        }
    }

    fn target_surface(&self) -> Option<Arc<dyn Surface>> {
        let primary = self.primary.as_ref()?;
        let candidates = self
            .provider
            .as_ref()
            .map(|provider| provider.surfaces())
            .unwrap_or_default();
        Some(resolve_surface(primary, &candidates))
    }
}
