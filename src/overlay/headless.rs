//! In-memory surface
//!
//! Keeps the frames of attached markers instead of drawing them. Used by the
//! replay tool and by recorders that composite markers onto captured frames.

use crate::capture::input::interceptor::{DispatchHub, EventDispatch};
use crate::capture::input::types::Point;
use crate::overlay::marker::{MarkerFrame, MarkerId};
use crate::overlay::surface::{Surface, SurfaceId};
use parking_lot::Mutex as ParkingMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct HeadlessSurface {
    id: SurfaceId,
    level: i32,
    origin: Point,
    hidden: AtomicBool,
    hub: Arc<DispatchHub>,
    exposes_dispatch: bool,
    markers: ParkingMutex<Vec<(MarkerId, MarkerFrame)>>,
}

impl HeadlessSurface {
    pub fn new(id: u64, level: i32) -> Arc<Self> {
        Arc::new(Self::build(id, level, Point::default(), true))
    }

    /// A surface whose host offers no dispatch hook
    pub fn without_dispatch(id: u64, level: i32) -> Arc<Self> {
        Arc::new(Self::build(id, level, Point::default(), false))
    }

    /// A surface whose top-left corner sits at `origin` in screen space
    pub fn with_origin(id: u64, level: i32, origin: Point) -> Arc<Self> {
        Arc::new(Self::build(id, level, origin, true))
    }

    fn build(id: u64, level: i32, origin: Point, exposes_dispatch: bool) -> Self {
        Self {
            id: SurfaceId(id),
            level,
            origin,
            hidden: AtomicBool::new(false),
            hub: Arc::new(DispatchHub::new()),
            exposes_dispatch,
            markers: ParkingMutex::new(Vec::new()),
        }
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::SeqCst);
    }

    /// The dispatch path events for this surface travel through
    pub fn hub(&self) -> Arc<DispatchHub> {
        self.hub.clone()
    }

    pub fn attached_count(&self) -> usize {
        self.markers.lock().len()
    }

    pub fn frame_of(&self, marker: MarkerId) -> Option<MarkerFrame> {
        self.markers
            .lock()
            .iter()
            .find(|(id, _)| *id == marker)
            .map(|(_, frame)| *frame)
    }

    /// Attached markers in attach order
    pub fn markers(&self) -> Vec<(MarkerId, MarkerFrame)> {
        self.markers.lock().clone()
    }
}

impl Surface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn level(&self) -> i32 {
        self.level
    }

    fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    fn convert_from_screen(&self, point: Point) -> Point {
        Point::new(point.x - self.origin.x, point.y - self.origin.y)
    }

    fn attach(&self, marker: MarkerId, frame: &MarkerFrame) {
        let mut markers = self.markers.lock();
        markers.retain(|(id, _)| *id != marker);
        markers.push((marker, *frame));
    }

    fn update(&self, marker: MarkerId, frame: &MarkerFrame) {
        if let Some(entry) = self.markers.lock().iter_mut().find(|(id, _)| *id == marker) {
            entry.1 = *frame;
        }
    }

    fn detach(&self, marker: MarkerId) {
        self.markers.lock().retain(|(id, _)| *id != marker);
    }

    fn dispatcher(&self) -> Option<Arc<dyn EventDispatch>> {
        if !self.exposes_dispatch {
            return None;
        }
        let hub: Arc<dyn EventDispatch> = self.hub.clone();
        Some(hub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_local_space() {
        let surface = HeadlessSurface::with_origin(1, 0, Point::new(100.0, 50.0));
        assert_eq!(
            surface.convert_from_screen(Point::new(130.0, 60.0)),
            Point::new(30.0, 10.0)
        );
    }

    #[test]
    fn test_update_ignores_detached_marker() {
        let surface = HeadlessSurface::new(1, 0);
        surface.update(MarkerId(4), &MarkerFrame::default());
        assert_eq!(surface.attached_count(), 0);
    }
}
