//! A single reusable touch marker
//!
//! State machine: `Free -> Active -> Fading -> Free`. A marker is free exactly
//! when it has no attach surface. It only holds a weak reference to that
//! surface, so it never keeps a closed window alive.

use crate::animation::fade::FadeHandle;
use crate::capture::input::types::{Point, TouchContact};
use crate::overlay::surface::{Surface, SurfaceId};
use crate::visualizer::config::MarkerColor;
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Free,
    Active,
    Fading(FadeHandle),
}

/// What a surface draws for one marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerFrame {
    /// Center in the attach surface's local space
    pub center: Point,
    pub diameter: f64,
    pub color: MarkerColor,
    pub opacity: f32,
    pub scale: f32,
    /// Zero means "apply immediately"
    pub transition: Duration,
}

impl Default for MarkerFrame {
    fn default() -> Self {
        Self {
            center: Point::default(),
            diameter: 0.0,
            color: MarkerColor::default(),
            opacity: 1.0,
            scale: 1.0,
            transition: Duration::ZERO,
        }
    }
}

pub struct Marker {
    id: MarkerId,
    state: MarkerState,
    contact: Option<TouchContact>,
    frame: MarkerFrame,
    surface: Option<Weak<dyn Surface>>,
    surface_id: Option<SurfaceId>,
}

impl Marker {
    pub fn new(id: MarkerId) -> Self {
        Self {
            id,
            state: MarkerState::Free,
            contact: None,
            frame: MarkerFrame::default(),
            surface: None,
            surface_id: None,
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn state(&self) -> MarkerState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.surface.is_none()
    }

    /// The contact this marker is bound to, with the latest data seen for it
    pub fn contact(&self) -> Option<&TouchContact> {
        self.contact.as_ref()
    }

    pub fn frame(&self) -> &MarkerFrame {
        &self.frame
    }

    pub fn center(&self) -> Point {
        self.frame.center
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface_id
    }

    pub fn surface(&self) -> Option<Arc<dyn Surface>> {
        self.surface.as_ref().and_then(Weak::upgrade)
    }

    pub fn fade_handle(&self) -> Option<FadeHandle> {
        match self.state {
            MarkerState::Fading(handle) => Some(handle),
            _ => None,
        }
    }

    /// Bind to a contact and attach to `surface`
    pub fn activate(&mut self, contact: TouchContact, surface: &Arc<dyn Surface>, frame: MarkerFrame) {
        surface.attach(self.id, &frame);
        self.surface = Some(Arc::downgrade(surface));
        self.surface_id = Some(surface.id());
        self.contact = Some(contact);
        self.frame = frame;
        self.state = MarkerState::Active;
    }

    /// Follow the contact. Does not change state.
    pub fn track(&mut self, contact: &TouchContact, frame: MarkerFrame) {
        self.frame = frame;
        self.contact = Some(contact.clone());
        if let Some(surface) = self.surface() {
            surface.update(self.id, &self.frame);
        }
    }

    /// Remember the latest data for the bound contact. No redraw, no state change.
    pub fn observe(&mut self, contact: &TouchContact) {
        if self.contact.is_some() {
            self.contact = Some(contact.clone());
        }
    }

    /// Start the fade-and-shrink toward `end_frame`. The marker stays attached
    /// and bound until [`Marker::release`].
    pub fn begin_fade(&mut self, contact: &TouchContact, handle: FadeHandle, end_frame: MarkerFrame) {
        self.frame = end_frame;
        self.contact = Some(contact.clone());
        self.state = MarkerState::Fading(handle);
        if let Some(surface) = self.surface() {
            surface.update(self.id, &self.frame);
        }
    }

    /// Detach from the surface and return to `Free`.
    ///
    /// Returns the pending fade, if any, so the caller can cancel its timer.
    pub fn release(&mut self) -> Option<FadeHandle> {
        let pending = self.fade_handle();
        if let Some(surface) = self.surface() {
            surface.detach(self.id);
        }
        self.surface = None;
        self.surface_id = None;
        self.contact = None;
        self.frame.opacity = 1.0;
        self.frame.scale = 1.0;
        self.frame.transition = Duration::ZERO;
        self.state = MarkerState::Free;
        pending
    }
}
