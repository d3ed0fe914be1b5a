//! Visibility state machine
//!
//! Owns the shown/hidden lifecycle of the overlay window: decides animation
//! endpoints, issues the underlying show/hide/position calls in the right
//! order, and emits the `shown`/`hidden` notifications.
//!
//! Ordering is deliberate and asymmetric: `shown` fires as soon as the
//! underlying show call resolves, while the entrance animation is still
//! running, so focus restoration overlaps the slide-in. `hidden` fires at
//! the start of the exit animation so cleanup (focus clear, input clear)
//! happens promptly; the underlying hide call waits until the window is
//! fully off-screen to avoid a visible pop.

use crate::animation::{self, AnimationHandle, ANIMATION_DURATION, OFF_SCREEN_OFFSET};
use crate::bridge::AppEvent;
use crate::port::WindowPort;
use log::{debug, error};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Lifecycle notification, no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Shown,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Showing,
    Visible,
    Hiding,
}

impl Visibility {
    /// Showing counts as visible-side: focus capture and trapping engage at
    /// `shown`, during the entrance animation.
    pub fn is_visible_side(self) -> bool {
        matches!(self, Visibility::Showing | Visibility::Visible)
    }
}

/// Per-window animation bookkeeping.
///
/// `active_animation` is `Some` iff an animation is currently scheduled; at
/// most one handle is live at any time. While animating, `current_offset`
/// lies between `initial_offset` and `target_offset`; on completion it
/// equals `target_offset` exactly.
#[derive(Debug, Clone)]
pub struct WindowState {
    pub visibility: Visibility,
    pub initial_offset: f64,
    pub target_offset: f64,
    pub current_offset: f64,
    pub active_animation: Option<AnimationHandle>,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            visibility: Visibility::Hidden,
            initial_offset: OFF_SCREEN_OFFSET,
            target_offset: OFF_SCREEN_OFFSET,
            current_offset: OFF_SCREEN_OFFSET,
            active_animation: None,
        }
    }
}

/// Drives show/hide transitions over the window port.
///
/// Created once per window at startup; the state is mutated only here and by
/// the animation frame callback. Completion events come back through the app
/// event channel so transitions interleave with toggles in delivery order.
pub struct VisibilityController {
    port: Arc<dyn WindowPort>,
    state: Arc<Mutex<WindowState>>,
    events: mpsc::UnboundedSender<AppEvent>,
    lifecycle: broadcast::Sender<Lifecycle>,
    duration: Duration,
}

impl VisibilityController {
    pub fn new(port: Arc<dyn WindowPort>, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let (lifecycle, _) = broadcast::channel(16);
        Self {
            port,
            state: Arc::new(Mutex::new(WindowState::default())),
            events,
            lifecycle,
            duration: ANIMATION_DURATION,
        }
    }

    /// Shorten the slide for tests
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Subscribe to the external `shown`/`hidden` notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Lifecycle> {
        self.lifecycle.subscribe()
    }

    pub fn visibility(&self) -> Visibility {
        self.state.lock().unwrap().visibility
    }

    pub fn window_state(&self) -> WindowState {
        self.state.lock().unwrap().clone()
    }

    /// Flip toward the opposite side of wherever we are right now.
    ///
    /// Mid-animation this is the opposite-direction request: the running
    /// animation is cancelled and the new one resumes from the current
    /// interpolated offset, never a fixed origin, so rapid retoggles don't
    /// snap visually.
    pub async fn toggle(&self) {
        let show = {
            let state = self.state.lock().unwrap();
            matches!(state.visibility, Visibility::Hidden | Visibility::Hiding)
        };
        if show {
            self.begin_show().await;
        } else {
            self.begin_hide().await;
        }
    }

    async fn begin_show(&self) {
        let from = {
            let mut state = self.state.lock().unwrap();
            if let Some(handle) = state.active_animation.take() {
                handle.cancel();
            }
            let from = if state.visibility == Visibility::Hidden {
                OFF_SCREEN_OFFSET
            } else {
                state.current_offset
            };
            state.visibility = Visibility::Showing;
            state.initial_offset = from;
            state.target_offset = 0.0;
            state.current_offset = from;
            from
        };

        let x = self.centered_x().await;

        #[allow(clippy::cast_possible_truncation)]
        if let Err(e) = self.port.set_position(x, from.round() as i32).await {
            error!("[window] pre-show position failed: {e}");
        }
        if let Err(e) = self.port.show().await {
            // transition still completes logically
            error!("[window] show failed: {e}");
        }

        // shown fires now, not at animation end, so focus restore can run
        // while the window is still sliding in
        self.emit(Lifecycle::Shown);
        self.start_animation(x, from, 0.0);
    }

    async fn begin_hide(&self) {
        let from = {
            let mut state = self.state.lock().unwrap();
            if let Some(handle) = state.active_animation.take() {
                handle.cancel();
            }
            // resume from wherever the window currently sits
            let from = state.current_offset;
            state.visibility = Visibility::Hiding;
            state.initial_offset = from;
            state.target_offset = OFF_SCREEN_OFFSET;
            from
        };

        // hidden fires immediately so cleanup doesn't wait for the slide-out
        self.emit(Lifecycle::Hidden);

        let x = self.centered_x().await;
        self.start_animation(x, from, OFF_SCREEN_OFFSET);
    }

    /// Animation completion, delivered through the event channel. Stale ids
    /// (from a cancelled animation) are dropped.
    pub async fn handle_animation_done(&self, id: u64) {
        let finished = {
            let mut state = self.state.lock().unwrap();
            match &state.active_animation {
                Some(handle) if handle.id() == id && !handle.is_cancelled() => {
                    state.active_animation = None;
                    state.current_offset = state.target_offset;
                    Some(state.visibility)
                }
                _ => {
                    debug!("[window] dropping stale animation completion {id}");
                    None
                }
            }
        };

        match finished {
            Some(Visibility::Showing) => {
                self.state.lock().unwrap().visibility = Visibility::Visible;
            }
            Some(Visibility::Hiding) => {
                self.state.lock().unwrap().visibility = Visibility::Hidden;
                // hide only once fully off-screen
                if let Err(e) = self.port.hide().await {
                    error!("[window] hide failed: {e}");
                }
            }
            _ => {}
        }
    }

    fn start_animation(&self, x: i32, from: f64, to: f64) {
        let handle = AnimationHandle::new();
        self.state.lock().unwrap().active_animation = Some(handle.clone());

        let state = self.state.clone();
        let frame_handle = handle.clone();
        let events = self.events.clone();
        animation::animate(
            &handle,
            self.port.clone(),
            x,
            from,
            to,
            self.duration,
            move |value| {
                // cancellation happens under this same lock, so a frame
                // racing a cancel can never clobber the resumed offset
                let mut state = state.lock().unwrap();
                if !frame_handle.is_cancelled() {
                    state.current_offset = value;
                }
            },
            move |id| {
                let _ = events.send(AppEvent::AnimationDone(id));
            },
        );
    }

    /// Horizontal center from the current screen width and window width.
    /// Falls back to the last known x when the port can't answer.
    async fn centered_x(&self) -> i32 {
        let screen = self.port.screen_size().await;
        let window = self.port.inner_size().await;
        match (screen, window) {
            #[allow(clippy::cast_possible_wrap)]
            (Ok((screen_w, _)), Ok((window_w, _))) => {
                (screen_w.saturating_sub(window_w) / 2) as i32
            }
            (screen, window) => {
                if let Err(e) = &screen {
                    error!("[window] screen size query failed: {e}");
                }
                if let Err(e) = &window {
                    error!("[window] window size query failed: {e}");
                }
                self.port.outer_position().await.map_or(0, |(x, _)| x)
            }
        }
    }

    fn emit(&self, event: Lifecycle) {
        let app_event = match event {
            Lifecycle::Shown => AppEvent::Shown,
            Lifecycle::Hidden => AppEvent::Hidden,
        };
        if self.events.send(app_event).is_err() {
            debug!("[window] event channel closed, dropping {event:?}");
        }
        // external listeners; fine if nobody is subscribed
        let _ = self.lifecycle.send(event);
    }
}
