//! Windowing collaborator port
//!
//! The underlying windowing system (Tauri in the desktop build) sits behind
//! the `WindowPort` trait so the visibility state machine never talks to a
//! concrete toolkit. Every call is async and fallible; callers log failures
//! and carry on, since a launcher overlay that dies on a single failed
//! position write is worse than a momentarily misplaced window.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Collaborator-defined windowing failure
#[derive(Debug, Error)]
pub enum PortError {
    #[error("window operation failed: {0}")]
    Window(String),
}

pub type PortResult<T> = Result<T, PortError>;

/// Async surface of the underlying window
#[async_trait]
pub trait WindowPort: Send + Sync {
    async fn show(&self) -> PortResult<()>;
    async fn hide(&self) -> PortResult<()>;
    async fn set_position(&self, x: i32, y: i32) -> PortResult<()>;
    async fn inner_size(&self) -> PortResult<(u32, u32)>;
    async fn outer_position(&self) -> PortResult<(i32, i32)>;
    /// Size of the screen the window lives on, needed for horizontal centering
    async fn screen_size(&self) -> PortResult<(u32, u32)>;
}

#[derive(Debug)]
struct SimState {
    visible: bool,
    position: (i32, i32),
    window_size: (u32, u32),
    screen_size: (u32, u32),
    calls: Vec<String>,
}

/// In-memory window used by the demo harness and the tests.
///
/// Records every call in order and can be told to fail individual
/// operations, which is how the "log and keep going" failure policy
/// gets exercised.
pub struct SimulatedWindow {
    state: Mutex<SimState>,
    fail_show: AtomicBool,
    fail_hide: AtomicBool,
    fail_set_position: AtomicBool,
}

impl SimulatedWindow {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                visible: false,
                position: (0, 0),
                window_size: (600, 400),
                screen_size: (1920, 1080),
                calls: Vec::new(),
            }),
            fail_show: AtomicBool::new(false),
            fail_hide: AtomicBool::new(false),
            fail_set_position: AtomicBool::new(false),
        }
    }

    pub fn set_fail_show(&self, fail: bool) {
        self.fail_show.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_hide(&self, fail: bool) {
        self.fail_hide.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_set_position(&self, fail: bool) {
        self.fail_set_position.store(fail, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().unwrap().visible
    }

    pub fn position(&self) -> (i32, i32) {
        self.state.lock().unwrap().position
    }

    /// Call log in arrival order, `set_position` entries collapsed to the name
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }
}

impl Default for SimulatedWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowPort for SimulatedWindow {
    async fn show(&self) -> PortResult<()> {
        self.record("show");
        if self.fail_show.load(Ordering::SeqCst) {
            return Err(PortError::Window("simulated show failure".to_string()));
        }
        self.state.lock().unwrap().visible = true;
        Ok(())
    }

    async fn hide(&self) -> PortResult<()> {
        self.record("hide");
        if self.fail_hide.load(Ordering::SeqCst) {
            return Err(PortError::Window("simulated hide failure".to_string()));
        }
        self.state.lock().unwrap().visible = false;
        Ok(())
    }

    async fn set_position(&self, x: i32, y: i32) -> PortResult<()> {
        self.record("set_position");
        if self.fail_set_position.load(Ordering::SeqCst) {
            return Err(PortError::Window(
                "simulated set_position failure".to_string(),
            ));
        }
        self.state.lock().unwrap().position = (x, y);
        Ok(())
    }

    async fn inner_size(&self) -> PortResult<(u32, u32)> {
        Ok(self.state.lock().unwrap().window_size)
    }

    async fn outer_position(&self) -> PortResult<(i32, i32)> {
        Ok(self.state.lock().unwrap().position)
    }

    async fn screen_size(&self) -> PortResult<(u32, u32)> {
        Ok(self.state.lock().unwrap().screen_size)
    }
}
