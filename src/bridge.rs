//! Toggle event bridge
//!
//! Single consumer loop over the app event channel. The external toggle
//! signal, the internal shown/hidden notifications, animation completions
//! and input events all land on one mpsc channel and are dispatched strictly
//! in delivery order, so two rapid toggles can never race: the show/hide
//! decision reads in-memory state synchronously before any async window call
//! is issued.

use crate::chat::ChatManager;
use crate::focus::{ElementId, FocusGuard};
use crate::visibility::VisibilityController;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Tab { shift: bool },
    Escape,
}

/// Everything the bridge dispatches, in arrival order
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// External toggle signal (global hotkey, tray, ...)
    Toggle,
    /// Window became logically visible (underlying show call resolved)
    Shown,
    /// Window is going away (exit animation started)
    Hidden,
    /// An animation finished; payload is the handle id
    AnimationDone(u64),
    Key(KeyEvent),
    FocusChanged(ElementId),
    /// Chat input submit
    Submit(String),
    Shutdown,
}

pub struct EventBridge {
    controller: Arc<VisibilityController>,
    focus: Arc<FocusGuard>,
    chat: Arc<ChatManager>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventBridge {
    pub fn new(
        controller: Arc<VisibilityController>,
        focus: Arc<FocusGuard>,
        chat: Arc<ChatManager>,
        rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> Self {
        Self {
            controller,
            focus,
            chat,
            rx,
        }
    }

    /// Consume events until the channel closes or `Shutdown` arrives
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            match event {
                AppEvent::Toggle => self.controller.toggle().await,
                AppEvent::AnimationDone(id) => self.controller.handle_animation_done(id).await,
                AppEvent::Shown => self.focus.on_window_shown(),
                AppEvent::Hidden => self.focus.on_window_hidden(),
                AppEvent::Key(KeyEvent::Tab { shift }) => {
                    if self.controller.visibility().is_visible_side() {
                        self.focus.trap_tab(shift);
                    }
                }
                AppEvent::Key(KeyEvent::Escape) => {
                    // same transition as an external toggle
                    if self.controller.visibility().is_visible_side() {
                        self.controller.toggle().await;
                    }
                }
                AppEvent::FocusChanged(id) => {
                    if self.controller.visibility().is_visible_side() {
                        self.focus.capture_focus(id);
                    }
                }
                AppEvent::Submit(text) => {
                    if !self.controller.visibility().is_visible_side() {
                        debug!("[bridge] dropping submit while hidden");
                        continue;
                    }
                    match self.chat.submit(&text).await {
                        Ok(messages) => {
                            for message in messages {
                                info!("[chat] {}: {}", message.role, message.content);
                            }
                        }
                        Err(e) => warn!("[chat] submit rejected: {e}"),
                    }
                }
                AppEvent::Shutdown => break,
            }
        }
        info!("[bridge] event loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::{FocusSurface, SimulatedSurface};
    use crate::port::SimulatedWindow;
    use crate::visibility::Visibility;
    use std::time::Duration;
    use tokio::time::sleep;

    const E1: ElementId = ElementId(1);
    const E2: ElementId = ElementId(2);
    const E3: ElementId = ElementId(3);

    struct Harness {
        tx: mpsc::UnboundedSender<AppEvent>,
        controller: Arc<VisibilityController>,
        focus: Arc<FocusGuard>,
        surface: Arc<SimulatedSurface>,
        port: Arc<SimulatedWindow>,
        chat: Arc<ChatManager>,
    }

    fn harness() -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        let port = Arc::new(SimulatedWindow::new());
        let controller = Arc::new(
            VisibilityController::new(port.clone(), tx.clone())
                .with_animation_duration(Duration::from_millis(50)),
        );
        let surface = Arc::new(SimulatedSurface::new());
        surface.add_element(E1);
        surface.add_element(E2);
        surface.add_element(E3);
        let focus = Arc::new(FocusGuard::new(surface.clone()).with_default_target(E1));
        let chat = Arc::new(ChatManager::new());

        let bridge = EventBridge::new(controller.clone(), focus.clone(), chat.clone(), rx);
        tokio::spawn(bridge.run());

        Harness {
            tx,
            controller,
            focus,
            surface,
            port,
            chat,
        }
    }

    async fn settle() {
        sleep(Duration::from_millis(120)).await;
    }

    #[tokio::test]
    async fn toggle_shows_and_focuses_default_target() {
        let h = harness();
        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;

        assert_eq!(h.controller.visibility(), Visibility::Visible);
        assert!(h.port.is_visible());
        assert_eq!(h.surface.active(), Some(E1));
    }

    #[tokio::test]
    async fn escape_hides_like_a_toggle() {
        let h = harness();
        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;

        h.tx.send(AppEvent::Key(KeyEvent::Escape)).unwrap();
        settle().await;

        assert_eq!(h.controller.visibility(), Visibility::Hidden);
        assert!(!h.port.is_visible());
    }

    #[tokio::test]
    async fn escape_while_hidden_is_ignored() {
        let h = harness();
        h.tx.send(AppEvent::Key(KeyEvent::Escape)).unwrap();
        settle().await;

        assert_eq!(h.controller.visibility(), Visibility::Hidden);
        assert!(!h.port.is_visible());
    }

    #[tokio::test]
    async fn focus_captured_before_escape_is_restored_on_next_show() {
        let h = harness();

        // show, move focus to E2
        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;
        h.surface.focus(E2);
        h.tx.send(AppEvent::FocusChanged(E2)).unwrap();

        // escape-triggered hide, then show again
        h.tx.send(AppEvent::Key(KeyEvent::Escape)).unwrap();
        settle().await;
        assert_eq!(h.controller.visibility(), Visibility::Hidden);

        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;

        assert_eq!(h.controller.visibility(), Visibility::Visible);
        assert_eq!(h.surface.active(), Some(E2));
    }

    #[tokio::test]
    async fn rapid_double_toggle_nets_exactly_one_flip() {
        let h = harness();
        h.tx.send(AppEvent::Toggle).unwrap();
        sleep(Duration::from_millis(15)).await;
        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;

        assert_eq!(h.controller.visibility(), Visibility::Hidden);
        assert!(!h.port.is_visible());
    }

    #[tokio::test]
    async fn tab_events_are_trapped_only_while_visible() {
        let h = harness();

        // hidden: tab does nothing
        h.surface.focus(E3);
        h.tx.send(AppEvent::Key(KeyEvent::Tab { shift: false })).unwrap();
        settle().await;
        assert_eq!(h.surface.active(), Some(E3));

        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;
        h.surface.focus(E3);
        h.tx.send(AppEvent::Key(KeyEvent::Tab { shift: false })).unwrap();
        settle().await;
        assert_eq!(h.surface.active(), Some(E1));
    }

    #[tokio::test]
    async fn hide_clears_the_chat_input() {
        let h = harness();
        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;

        h.surface.set_input("half-typed");
        h.tx.send(AppEvent::FocusChanged(E1)).unwrap();
        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;

        assert!(h.surface.input().is_empty());
        assert_eq!(h.surface.active(), None);
        // last focused survives the hide for the next show
        assert_eq!(h.focus.focus_state().last_focused, Some(E1));
    }

    #[tokio::test]
    async fn submit_while_visible_reaches_the_chat_manager() {
        let h = harness();
        h.tx.send(AppEvent::Toggle).unwrap();
        settle().await;

        h.tx.send(AppEvent::Submit("hello".to_string())).unwrap();
        settle().await;

        let sessions = h.chat.list_sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn submit_while_hidden_is_dropped() {
        let h = harness();
        h.tx.send(AppEvent::Submit("hello".to_string())).unwrap();
        settle().await;

        assert!(h.chat.list_sessions().await.is_empty());
    }
}
