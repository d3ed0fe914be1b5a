//! Headless demo harness
//!
//! Wires the full core (bridge, visibility controller, focus guard, chat)
//! over the simulated window and surface, driven by stdin commands. The real
//! desktop build replaces the simulated port with a toolkit adapter and the
//! stdin reader with the global hotkey; nothing else changes.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::Result;
use glint::bridge::{AppEvent, EventBridge, KeyEvent};
use glint::chat::ChatManager;
use glint::focus::{ElementId, FocusGuard, SimulatedSurface};
use glint::port::SimulatedWindow;
use glint::settings::SettingsManager;
use glint::visibility::VisibilityController;
use log::{error, info};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Feed external toggle/input signals from stdin. In the desktop build this
/// is the global hotkey listener; if its registration fails the failure is
/// logged once and the process keeps running with the window non-interactive
/// for toggle rather than crashing.
fn spawn_input_source(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line.trim().to_string(),
                Ok(None) => break,
                Err(e) => {
                    error!("[glint] input source failed, window toggle disabled: {e}");
                    break;
                }
            };
            let event = match line.as_str() {
                "toggle" => AppEvent::Toggle,
                "tab" => AppEvent::Key(KeyEvent::Tab { shift: false }),
                "shift-tab" => AppEvent::Key(KeyEvent::Tab { shift: true }),
                "esc" => AppEvent::Key(KeyEvent::Escape),
                "quit" => AppEvent::Shutdown,
                "" => continue,
                other => {
                    if let Some(text) = other.strip_prefix("say ") {
                        AppEvent::Submit(text.to_string())
                    } else {
                        info!("commands: toggle | tab | shift-tab | esc | say <text> | quit");
                        continue;
                    }
                }
            };
            let quit = matches!(event, AppEvent::Shutdown);
            if tx.send(event).is_err() || quit {
                break;
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    match SettingsManager::new().await {
        Ok(manager) => {
            let prefs = manager.get_settings().await.preferences;
            info!(
                "[glint] settings loaded ({}x{} window, toggle on {})",
                prefs.window_width, prefs.window_height, prefs.keyboard_shortcuts.toggle_window
            );
        }
        Err(e) => error!("[glint] settings unavailable, using defaults: {e}"),
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let port = Arc::new(SimulatedWindow::new());
    let controller = Arc::new(VisibilityController::new(port.clone(), tx.clone()));

    let surface = Arc::new(SimulatedSurface::new());
    // chat input, send button, settings button - document order
    surface.add_element(ElementId(1));
    surface.add_element(ElementId(2));
    surface.add_element(ElementId(3));
    let focus = Arc::new(FocusGuard::new(surface.clone()).with_default_target(ElementId(1)));

    let chat = Arc::new(ChatManager::new());

    let mut lifecycle = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = lifecycle.recv().await {
            info!("[glint] lifecycle: {event:?}");
        }
    });

    spawn_input_source(tx);

    info!("[glint] ready - type 'toggle' to show the palette");
    EventBridge::new(controller, focus, chat, rx).run().await;
    Ok(())
}
