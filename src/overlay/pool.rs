//! Marker pool
//!
//! Markers are created on demand and kept for the life of the pool, so the
//! number ever created equals the peak number of markers in use at once.

use crate::animation::fade::FadeHandle;
use crate::capture::input::types::ContactId;
use crate::overlay::marker::{Marker, MarkerId};
use crate::overlay::surface::SurfaceId;
use std::collections::HashMap;

#[derive(Default)]
pub struct MarkerPool {
    markers: Vec<Marker>,
    /// Contacts that can still move; fading markers are no longer listed here
    bindings: HashMap<ContactId, usize>,
}

impl MarkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers ever created
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn in_use_count(&self) -> usize {
        self.markers.iter().filter(|m| !m.is_free()).count()
    }

    /// Markers currently bound to a contact (active or fading), in pool order
    pub fn in_use(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(|m| !m.is_free())
    }

    /// Take the first free marker, creating one if every marker is in use,
    /// and bind it to `contact`.
    pub fn dequeue(&mut self, contact: ContactId) -> &mut Marker {
        let index = match self.markers.iter().position(Marker::is_free) {
            Some(index) => index,
            None => {
                let index = self.markers.len();
                self.markers.push(Marker::new(MarkerId(index)));
                tracing::debug!("Marker pool grew to {}", self.markers.len());
                index
            }
        };
        self.bindings.insert(contact, index);
        &mut self.markers[index]
    }

    /// The marker tracking a live (not yet ended) contact
    pub fn bound_mut(&mut self, contact: ContactId) -> Option<&mut Marker> {
        let index = *self.bindings.get(&contact)?;
        self.markers.get_mut(index)
    }

    /// Stop routing `contact` to its marker and hand the marker back for fading
    pub fn unbind(&mut self, contact: ContactId) -> Option<&mut Marker> {
        let index = self.bindings.remove(&contact)?;
        self.markers.get_mut(index)
    }

    pub fn fading_mut(&mut self, handle: FadeHandle) -> Option<&mut Marker> {
        self.markers
            .iter_mut()
            .find(|m| m.fade_handle() == Some(handle))
    }

    /// Force every in-use marker back to `Free`, returning fades to cancel
    pub fn release_all(&mut self) -> Vec<FadeHandle> {
        self.bindings.clear();
        self.markers
            .iter_mut()
            .filter(|m| !m.is_free())
            .filter_map(Marker::release)
            .collect()
    }

    /// Force the markers attached to one surface back to `Free`
    pub fn release_on(&mut self, surface: SurfaceId) -> Vec<FadeHandle> {
        let mut pending = Vec::new();
        for (index, marker) in self.markers.iter_mut().enumerate() {
            if marker.surface_id() != Some(surface) {
                continue;
            }
            self.bindings.retain(|_, bound| *bound != index);
            pending.extend(marker.release());
        }
        pending
    }
}
