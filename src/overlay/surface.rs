//! Display surfaces and surface resolution
//!
//! A surface is a window or layer that can host markers. Applications may
//! present several at once; markers go on the top-most visible one.

use crate::capture::input::interceptor::EventDispatch;
use crate::capture::input::types::Point;
use crate::overlay::marker::{MarkerFrame, MarkerId};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A display surface that can draw markers on top of its content
pub trait Surface: Send + Sync {
    fn id(&self) -> SurfaceId;

    /// Stacking priority; higher levels draw above lower ones
    fn level(&self) -> i32;

    fn is_hidden(&self) -> bool;

    /// Convert a screen-space location into this surface's local space
    fn convert_from_screen(&self, point: Point) -> Point {
        point
    }

    /// Add the marker's visual on top of the surface content
    fn attach(&self, marker: MarkerId, frame: &MarkerFrame);

    /// Redraw an attached marker. A non-zero `frame.transition` asks the
    /// surface to animate toward the new frame.
    fn update(&self, marker: MarkerId, frame: &MarkerFrame);

    /// Remove the marker's visual immediately, cancelling any running animation
    fn detach(&self, marker: MarkerId);

    /// The event-dispatch path feeding this surface, if the host exposes one
    fn dispatcher(&self) -> Option<Arc<dyn EventDispatch>> {
        None
    }
}

/// Lists every surface the application currently presents, back to front
pub trait SurfaceProvider: Send + Sync {
    fn surfaces(&self) -> Vec<Arc<dyn Surface>>;
}

/// Pick the surface new markers attach to.
///
/// A visible candidate replaces `primary` only when its level is strictly
/// higher than the primary's (or the primary is hidden). Among candidates
/// with equal levels the later one, i.e. the front-most, wins.
pub fn resolve_surface(
    primary: &Arc<dyn Surface>,
    candidates: &[Arc<dyn Surface>],
) -> Arc<dyn Surface> {
    let primary_id = primary.id();
    let mut best: Option<&Arc<dyn Surface>> = None;
    let mut best_level = if primary.is_hidden() {
        None
    } else {
        Some(primary.level())
    };

    for candidate in candidates {
        if candidate.id() == primary_id || candidate.is_hidden() {
            continue;
        }
        let level = candidate.level();
        let wins = match (best, best_level) {
            (_, None) => true,
            (None, Some(threshold)) => level > threshold,
            (Some(_), Some(threshold)) => level >= threshold,
        };
        if wins {
            best = Some(candidate);
            best_level = Some(level);
        }
    }

    best.cloned().unwrap_or_else(|| primary.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::headless::HeadlessSurface;

    fn surface(id: u64, level: i32) -> Arc<dyn Surface> {
        HeadlessSurface::new(id, level)
    }

    #[test]
    fn test_defaults_to_primary_without_candidates() {
        let primary = surface(1, 0);
        assert_eq!(resolve_surface(&primary, &[]).id(), SurfaceId(1));
    }

    #[test]
    fn test_higher_visible_surface_wins() {
        let primary = surface(1, 0);
        let candidates = vec![primary.clone(), surface(2, 10), surface(3, 5)];
        assert_eq!(resolve_surface(&primary, &candidates).id(), SurfaceId(2));
    }

    #[test]
    fn test_hidden_surfaces_are_skipped() {
        let primary = surface(1, 0);
        let alert = HeadlessSurface::new(2, 100);
        alert.set_hidden(true);
        let candidates = vec![primary.clone(), alert as Arc<dyn Surface>];
        assert_eq!(resolve_surface(&primary, &candidates).id(), SurfaceId(1));
    }

    #[test]
    fn test_equal_level_keeps_primary() {
        let primary = surface(1, 0);
        let candidates = vec![surface(2, 0), primary.clone()];
        assert_eq!(resolve_surface(&primary, &candidates).id(), SurfaceId(1));
    }

    #[test]
    fn test_front_most_wins_among_equal_levels() {
        let primary = surface(1, 0);
        let candidates = vec![surface(2, 5), surface(3, 5)];
        assert_eq!(resolve_surface(&primary, &candidates).id(), SurfaceId(3));
    }

    #[test]
    fn test_hidden_primary_yields_to_any_visible_surface() {
        let primary = HeadlessSurface::new(1, 50);
        primary.set_hidden(true);
        let primary: Arc<dyn Surface> = primary;
        let candidates = vec![surface(2, -5)];
        assert_eq!(resolve_surface(&primary, &candidates).id(), SurfaceId(2));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let primary = surface(1, 0);
        let candidates = vec![surface(2, 3), surface(3, 7), surface(4, 7)];
        let first = resolve_surface(&primary, &candidates).id();
        for _ in 0..10 {
            assert_eq!(resolve_surface(&primary, &candidates).id(), first);
        }
    }
}
