//! Scripted touch traces
//!
//! A trace is a JSON list of timed frames. Replaying one drives the shared
//! visualizer through a headless surface on a tokio timer, which makes it easy
//! to check marker behavior and diagnostic output without a touch screen.
//!
//! ```json
//! {
//!   "config": { "showsLog": true },
//!   "frames": [
//!     { "atMs": 0,   "touches": [{ "id": 1, "phase": "began", "x": 10, "y": 20, "radius": 8 }] },
//!     { "atMs": 120, "touches": [{ "id": 1, "phase": "ended", "x": 12, "y": 20 }] },
//!     { "atMs": 400, "orientationChanged": true }
//!   ]
//! }
//! ```

use crate::animation::fade::TokioFadeScheduler;
use crate::capture::input::types::{ContactId, HostEvent, Point, TouchContact, TouchPhase};
use crate::overlay::headless::HeadlessSurface;
use crate::visualizer::config::Configuration;
use crate::visualizer::error::{VisualizerError, VisualizerResult};
use crate::visualizer::shared::SharedVisualizer;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayTrace {
    #[serde(default)]
    pub config: Option<Configuration>,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFrame {
    /// Offset from the start of the replay
    pub at_ms: u64,
    #[serde(default)]
    pub touches: Vec<ReplayTouch>,
    #[serde(default)]
    pub orientation_changed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayTouch {
    pub id: u64,
    pub phase: TouchPhase,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub radius: Option<f64>,
}

/// What a replay left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events_delivered: usize,
    pub markers_created: usize,
    /// Contacts still on screen when the trace ran out
    pub touches_remaining: usize,
}

impl ReplayTouch {
    fn contact(&self) -> TouchContact {
        TouchContact {
            id: ContactId(self.id),
            phase: self.phase,
            location: Point::new(self.x, self.y),
            radius: self.radius,
        }
    }
}

impl ReplayFrame {
    /// Host events for this frame: the touch event first, then the orientation flip
    pub fn events(&self) -> Vec<HostEvent> {
        let mut events = Vec::new();
        if !self.touches.is_empty() {
            events.push(HostEvent::Touches(
                self.touches.iter().map(ReplayTouch::contact).collect(),
            ));
        }
        if self.orientation_changed {
            events.push(HostEvent::OrientationChanged);
        }
        events
    }
}

impl ReplayTrace {
    pub fn from_json_str(json: &str) -> VisualizerResult<Self> {
        let trace: ReplayTrace = serde_json::from_str(json)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn load(path: &Path) -> VisualizerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> VisualizerResult<()> {
        for pair in self.frames.windows(2) {
            if pair[1].at_ms < pair[0].at_ms {
                return Err(VisualizerError::InvalidTrace(format!(
                    "frame at {}ms comes after frame at {}ms",
                    pair[1].at_ms, pair[0].at_ms
                )));
            }
        }
        Ok(())
    }
}

/// Play `trace` through `visualizer` in real (tokio) time.
///
/// Must run inside a tokio runtime; fades expire on tokio timers and are
/// completed on this task between frames. Waits for running fades before
/// stopping the visualizer.
pub async fn run_trace(
    trace: &ReplayTrace,
    visualizer: &SharedVisualizer,
) -> VisualizerResult<ReplaySummary> {
    let (scheduler, mut completions) = TokioFadeScheduler::from_current()?;
    visualizer.set_fade_scheduler(Box::new(scheduler));

    let surface = HeadlessSurface::new(0, 0);
    let hub = surface.hub();
    visualizer.start(trace.config.clone(), surface.clone());

    tracing::info!("Replaying {} frames", trace.frames.len());

    let started = tokio::time::Instant::now();
    let mut events_delivered = 0;

    for frame in &trace.frames {
        let next_frame = tokio::time::sleep_until(started + Duration::from_millis(frame.at_ms));
        tokio::pin!(next_frame);

        loop {
            tokio::select! {
                _ = &mut next_frame => break,
                Some(handle) = completions.recv() => {
                    visualizer.complete_fade(handle);
                }
            }
        }

        for event in frame.events() {
            // Observers see the event before this delivery callback runs
            hub.dispatch(&event, |_| events_delivered += 1);
        }
    }

    while visualizer.with(|v| v.pool().in_use().any(|m| m.fade_handle().is_some())) {
        match completions.recv().await {
            Some(handle) => {
                visualizer.complete_fade(handle);
            }
            None => break,
        }
    }

    let summary = visualizer.with(|v| ReplaySummary {
        events_delivered,
        markers_created: v.pool().len(),
        touches_remaining: v.get_touches().len(),
    });
    visualizer.stop();

    tracing::info!(
        "Replay finished (events={}, markers={}, remaining={}, elapsed={:?})",
        summary.events_delivered,
        summary.markers_created,
        summary.touches_remaining,
        started.elapsed()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::controller::TouchVisualizer;
    use crate::visualizer::diagnostics::MemorySink;
    use std::io::Write;

    const OVERLAPPING: &str = r#"{
        "config": { "showsLog": true },
        "frames": [
            { "atMs": 0,   "touches": [{ "id": 1, "phase": "began", "x": 10, "y": 10, "radius": 4 }] },
            { "atMs": 16,  "touches": [{ "id": 2, "phase": "began", "x": 50, "y": 50, "radius": 4 }] },
            { "atMs": 32,  "touches": [
                { "id": 1, "phase": "ended", "x": 10, "y": 10, "radius": 4 },
                { "id": 2, "phase": "ended", "x": 50, "y": 50, "radius": 4 }
            ] },
            { "atMs": 600, "touches": [{ "id": 3, "phase": "began", "x": 5, "y": 5, "radius": 4 }] },
            { "atMs": 700, "touches": [{ "id": 3, "phase": "stationary", "x": 5, "y": 5, "radius": 4 }] }
        ]
    }"#;

    #[test]
    fn test_parse_trace() {
        let trace = ReplayTrace::from_json_str(OVERLAPPING).unwrap();
        assert_eq!(trace.frames.len(), 5);
        assert!(trace.config.unwrap().shows_log);
        assert_eq!(trace.frames[2].events().len(), 1);
    }

    #[test]
    fn test_orientation_frame_events() {
        let trace =
            ReplayTrace::from_json_str(r#"{"frames": [{"atMs": 5, "orientationChanged": true}]}"#)
                .unwrap();
        assert_eq!(trace.frames[0].events(), vec![HostEvent::OrientationChanged]);
    }

    #[test]
    fn test_rejects_out_of_order_frames() {
        let result = ReplayTrace::from_json_str(
            r#"{"frames": [{"atMs": 50}, {"atMs": 10}]}"#,
        );
        assert!(matches!(result, Err(VisualizerError::InvalidTrace(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(OVERLAPPING.as_bytes()).unwrap();

        let trace = ReplayTrace::load(file.path()).unwrap();
        assert_eq!(trace.frames.last().unwrap().at_ms, 700);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ReplayTrace::load(Path::new("/nonexistent/trace.json"));
        assert!(matches!(result, Err(VisualizerError::Io(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_reuses_faded_markers() {
        let trace = ReplayTrace::from_json_str(OVERLAPPING).unwrap();
        let sink = MemorySink::new();
        let visualizer = SharedVisualizer::from_visualizer(
            TouchVisualizer::new().with_diagnostic_sink(Box::new(sink.clone())),
        );

        let summary = run_trace(&trace, &visualizer).await.unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                events_delivered: 5,
                markers_created: 2,
                touches_remaining: 1,
            }
        );
        assert!(!visualizer.is_enabled());
        assert!(sink
            .blocks()
            .iter()
            .any(|block| block.starts_with("Touch: [0]<S> c:(5.00, 5.00) r:4.00")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_waits_for_trailing_fades() {
        let trace = ReplayTrace::from_json_str(
            r#"{"frames": [
                { "atMs": 0,  "touches": [{ "id": 1, "phase": "began", "x": 1, "y": 1 }] },
                { "atMs": 10, "touches": [{ "id": 1, "phase": "cancelled", "x": 1, "y": 1 }] }
            ]}"#,
        )
        .unwrap();
        let visualizer = SharedVisualizer::new();

        let summary = run_trace(&trace, &visualizer).await.unwrap();

        assert_eq!(summary.touches_remaining, 0);
        assert_eq!(summary.markers_created, 1);
    }
}
