//! Fade-out timing for released markers
//!
//! A fade is a cancellable timed task. When it expires its handle is handed
//! back to the visualizer on the event thread, which returns the marker to the
//! pool. Two backends:
//!
//! * [`ManualFadeScheduler`] for frame-driven hosts that call
//!   `TouchVisualizer::tick` every frame
//! * [`TokioFadeScheduler`] for hosts running a tokio event loop, which read
//!   expired handles from [`FadeCompletions`]

use crate::visualizer::error::{VisualizerError, VisualizerResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Scale a marker shrinks to by the end of its fade
pub const FADE_END_SCALE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FadeHandle(pub u64);

pub trait FadeScheduler: Send {
    /// Start a fade that expires after `duration`
    fn schedule(&mut self, duration: Duration) -> FadeHandle;

    /// Drop a pending fade; it will never be reported as expired
    fn cancel(&mut self, handle: FadeHandle);

    /// Fades that expired at or before `now`, in scheduling order
    fn poll_due(&mut self, _now: Instant) -> Vec<FadeHandle> {
        Vec::new()
    }
}

/// Opacity and scale of a fading marker `elapsed` into a fade of `duration`
pub fn fade_appearance(elapsed: Duration, duration: Duration) -> (f32, f32) {
    let t = if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
    };
    (1.0 - t, 1.0 - (1.0 - FADE_END_SCALE) * t)
}

#[derive(Debug, Default)]
pub struct ManualFadeScheduler {
    next: u64,
    pending: Vec<(FadeHandle, Instant)>,
}

impl ManualFadeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl FadeScheduler for ManualFadeScheduler {
    fn schedule(&mut self, duration: Duration) -> FadeHandle {
        let handle = FadeHandle(self.next);
        self.next += 1;
        self.pending.push((handle, Instant::now() + duration));
        handle
    }

    fn cancel(&mut self, handle: FadeHandle) {
        self.pending.retain(|(h, _)| *h != handle);
    }

    fn poll_due(&mut self, now: Instant) -> Vec<FadeHandle> {
        let mut due = Vec::new();
        self.pending.retain(|(handle, deadline)| {
            if *deadline <= now {
                due.push(*handle);
                false
            } else {
                true
            }
        });
        due
    }
}

/// Timer-backed fades on a tokio runtime
pub struct TokioFadeScheduler {
    runtime: tokio::runtime::Handle,
    completed: mpsc::UnboundedSender<FadeHandle>,
    tasks: HashMap<FadeHandle, JoinHandle<()>>,
    next: u64,
}

/// Receiving end for expired fades; drain it on the event loop
pub struct FadeCompletions {
    rx: mpsc::UnboundedReceiver<FadeHandle>,
}

impl FadeCompletions {
    pub async fn recv(&mut self) -> Option<FadeHandle> {
        self.rx.recv().await
    }

    /// Everything that expired so far, without waiting
    pub fn drain(&mut self) -> Vec<FadeHandle> {
        let mut handles = Vec::new();
        while let Ok(handle) = self.rx.try_recv() {
            handles.push(handle);
        }
        handles
    }
}

impl TokioFadeScheduler {
    /// Bind to the runtime of the calling context
    pub fn from_current() -> VisualizerResult<(Self, FadeCompletions)> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| VisualizerError::NoRuntime)?;
        let (completed, rx) = mpsc::unbounded_channel();
        Ok((
            Self {
                runtime,
                completed,
                tasks: HashMap::new(),
                next: 0,
            },
            FadeCompletions { rx },
        ))
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl FadeScheduler for TokioFadeScheduler {
    fn schedule(&mut self, duration: Duration) -> FadeHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        let handle = FadeHandle(self.next);
        self.next += 1;

        let completed = self.completed.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            // Receiver gone means the host loop shut down
            let _ = completed.send(handle);
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: FadeHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioFadeScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_appearance_curve() {
        let duration = Duration::from_millis(200);
        assert_eq!(fade_appearance(Duration::ZERO, duration), (1.0, 1.0));

        let (opacity, scale) = fade_appearance(Duration::from_millis(100), duration);
        assert!((opacity - 0.5).abs() < 1e-6);
        assert!((scale - 0.75).abs() < 1e-6);

        assert_eq!(fade_appearance(Duration::from_secs(5), duration), (0.0, FADE_END_SCALE));
        assert_eq!(fade_appearance(Duration::ZERO, Duration::ZERO), (0.0, FADE_END_SCALE));
    }

    #[test]
    fn test_manual_scheduler_reports_due_fades_in_order() {
        let mut scheduler = ManualFadeScheduler::new();
        let first = scheduler.schedule(Duration::from_millis(200));
        let second = scheduler.schedule(Duration::from_millis(200));

        assert!(scheduler.poll_due(Instant::now()).is_empty());

        let later = Instant::now() + Duration::from_secs(1);
        assert_eq!(scheduler.poll_due(later), vec![first, second]);
        assert!(scheduler.poll_due(later).is_empty());
    }

    #[test]
    fn test_manual_scheduler_cancel() {
        let mut scheduler = ManualFadeScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(10));
        scheduler.cancel(handle);

        assert_eq!(scheduler.pending_count(), 0);
        assert!(scheduler
            .poll_due(Instant::now() + Duration::from_secs(1))
            .is_empty());
    }

    #[test]
    fn test_tokio_scheduler_needs_runtime() {
        assert!(matches!(
            TokioFadeScheduler::from_current(),
            Err(VisualizerError::NoRuntime)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_delivers_after_duration() {
        let (mut scheduler, mut completions) = TokioFadeScheduler::from_current().unwrap();
        let handle = scheduler.schedule(Duration::from_millis(200));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(completions.drain().is_empty());

        assert_eq!(completions.recv().await, Some(handle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_cancel_suppresses_completion() {
        let (mut scheduler, mut completions) = TokioFadeScheduler::from_current().unwrap();
        let cancelled = scheduler.schedule(Duration::from_millis(100));
        let kept = scheduler.schedule(Duration::from_millis(200));
        scheduler.cancel(cancelled);

        assert_eq!(completions.recv().await, Some(kept));
        assert!(completions.drain().is_empty());
    }
}
