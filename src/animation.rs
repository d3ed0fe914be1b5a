//! Animation driver
//!
//! Runs a time-based interpolation loop for a single scalar (the window's
//! vertical offset). Progress comes from a monotonic clock, not the frame
//! counter, so a stalled tick never stretches the wall-clock budget. The
//! driver writes the interpolated position to the window every frame; a
//! failed write is logged and the loop keeps going.

use crate::port::WindowPort;
use log::warn;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Wall-clock budget for a show/hide slide
pub const ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Fixed vertical offset parking the window above the visible screen,
/// the animation's hidden-state endpoint
pub const OFF_SCREEN_OFFSET: f64 = -1000.0;

/// Frame tick, ~60fps
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

static NEXT_ANIMATION_ID: AtomicU64 = AtomicU64::new(1);

/// Ease-out quadratic, `f(t) = t * (2 - t)`. Fixed, not configurable.
pub fn ease_out_quad(t: f64) -> f64 {
    t * (2.0 - t)
}

/// Handle to a scheduled animation.
///
/// Cancellation is synchronous and idempotent: once `cancel()` returns, no
/// further `on_frame` or `on_complete` call fires for this handle. The flag
/// is checked at the top of every frame before anything else happens.
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl AnimationHandle {
    /// Fresh handle with a process-unique id. Created by the caller before
    /// the animation is scheduled so it can be stored (and cancelled) with
    /// no window between scheduling and bookkeeping.
    pub fn new() -> Self {
        Self {
            id: NEXT_ANIMATION_ID.fetch_add(1, Ordering::SeqCst),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for AnimationHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Schedules frame callbacks interpolating `from` -> `to` over `duration`.
///
/// Every frame: `on_frame(value)` then a fire-and-forget `set_position(x,
/// value)` on the port. When progress reaches 1.0 the final frame carries
/// exactly `to`, then `on_complete` runs exactly once with the handle id.
/// A cancelled animation never calls `on_complete`.
pub fn animate<F, C>(
    handle: &AnimationHandle,
    port: Arc<dyn WindowPort>,
    x: i32,
    from: f64,
    to: f64,
    duration: Duration,
    mut on_frame: F,
    on_complete: C,
) where
    F: FnMut(f64) + Send + 'static,
    C: FnOnce(u64) + Send + 'static,
{
    let task_handle = handle.clone();
    tokio::spawn(async move {
        let start = Instant::now();
        let mut ticker = tokio::time::interval(FRAME_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut on_complete = Some(on_complete);

        loop {
            ticker.tick().await;
            if task_handle.is_cancelled() {
                return;
            }

            let progress = if duration.is_zero() {
                1.0
            } else {
                (start.elapsed().as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            };
            let value = from + (to - from) * ease_out_quad(progress);
            on_frame(value);

            #[allow(clippy::cast_possible_truncation)]
            if let Err(e) = port.set_position(x, value.round() as i32).await {
                // one failed frame write does not cancel the animation
                warn!("[animation] frame position write failed: {e}");
            }

            if progress >= 1.0 {
                if !task_handle.is_cancelled() {
                    if let Some(done) = on_complete.take() {
                        done(task_handle.id);
                    }
                }
                return;
            }
        }
    });
}
