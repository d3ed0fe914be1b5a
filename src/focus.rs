//! Focus guard
//!
//! Captures and restores the focused element across show/hide cycles and
//! traps Tab navigation inside the window while it is visible. The UI tree
//! is reached only through the injected `FocusSurface` capability, never
//! ambient globals, and the focusable set is recomputed on every query
//! because tree mutation silently invalidates any cache.

use log::debug;
use std::sync::{Arc, Mutex};

/// Opaque id of an element in the UI tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Queries and actions against the current UI tree.
///
/// `focusable_elements` returns the interactive, currently rendered elements
/// in document order. Implementations decide membership (buttons, links,
/// inputs, explicit non-negative tab index; nothing display-hidden).
pub trait FocusSurface: Send + Sync {
    fn active_element(&self) -> Option<ElementId>;
    fn focus(&self, id: ElementId);
    fn blur(&self);
    /// Liveness check: references held across transitions may go stale
    fn is_attached(&self, id: ElementId) -> bool;
    fn focusable_elements(&self) -> Vec<ElementId>;
    fn clear_selection(&self);
    fn clear_input(&self);
}

/// Back-references into the UI tree, lookup only, never ownership.
/// Either may be stale; check `is_attached` before use.
#[derive(Debug, Default, Clone)]
pub struct FocusState {
    pub last_focused: Option<ElementId>,
    pub default_target: Option<ElementId>,
}

pub struct FocusGuard {
    surface: Arc<dyn FocusSurface>,
    state: Mutex<FocusState>,
}

impl FocusGuard {
    pub fn new(surface: Arc<dyn FocusSurface>) -> Self {
        Self {
            surface,
            state: Mutex::new(FocusState::default()),
        }
    }

    pub fn with_default_target(self, target: ElementId) -> Self {
        self.state.lock().unwrap().default_target = Some(target);
        self
    }

    pub fn focus_state(&self) -> FocusState {
        self.state.lock().unwrap().clone()
    }

    /// Restore focus after the window becomes visible.
    ///
    /// Priority chain: last focused element if still attached, else the
    /// default target if attached, else the first live focusable. After this
    /// call exactly one element has focus whenever any focusable exists.
    /// Stale targets fall through silently; none of this is user-visible.
    pub fn on_window_shown(&self) {
        let state = self.state.lock().unwrap().clone();

        if let Some(last) = state.last_focused {
            if self.surface.is_attached(last) {
                self.surface.focus(last);
                return;
            }
            debug!("[focus] last focused element is stale, falling back");
        }

        if let Some(default) = state.default_target {
            if self.surface.is_attached(default) {
                self.surface.focus(default);
                return;
            }
            debug!("[focus] default focus target is stale, falling back");
        }

        if let Some(first) = self.surface.focusable_elements().first() {
            self.surface.focus(*first);
        }
    }

    /// Cleanup when the window goes away: drop any text selection, blur the
    /// active element, clear the transient chat input. `last_focused` is
    /// kept on purpose so the next show can restore it.
    pub fn on_window_hidden(&self) {
        self.surface.clear_selection();
        self.surface.blur();
        self.surface.clear_input();
    }

    /// Record every focus change while the window is visible
    pub fn capture_focus(&self, id: ElementId) {
        self.state.lock().unwrap().last_focused = Some(id);
    }

    /// Tab handling while visible. Wraps last -> first on plain Tab and
    /// first -> last on Shift+Tab; anything in between passes through to the
    /// native tab order. Returns true when the event was intercepted.
    pub fn trap_tab(&self, shift: bool) -> bool {
        let focusables = self.surface.focusable_elements();
        let (Some(first), Some(last)) = (focusables.first(), focusables.last()) else {
            return false;
        };

        let Some(active) = self.surface.active_element() else {
            return false;
        };

        if !shift && active == *last {
            self.surface.focus(*first);
            self.capture_focus(*first);
            return true;
        }
        if shift && active == *first {
            self.surface.focus(*last);
            self.capture_focus(*last);
            return true;
        }
        false
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    /// (id, attached) in document order
    elements: Vec<(ElementId, bool)>,
    active: Option<ElementId>,
    input: String,
    has_selection: bool,
}

/// In-memory UI tree for the demo harness and the tests
#[derive(Debug, Default)]
pub struct SimulatedSurface {
    state: Mutex<SurfaceState>,
}

impl SimulatedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&self, id: ElementId) {
        self.state.lock().unwrap().elements.push((id, true));
    }

    /// Remove the element from the tree, leaving any held references stale
    pub fn detach(&self, id: ElementId) {
        let mut state = self.state.lock().unwrap();
        for element in &mut state.elements {
            if element.0 == id {
                element.1 = false;
            }
        }
        if state.active == Some(id) {
            state.active = None;
        }
    }

    pub fn set_input(&self, text: &str) {
        self.state.lock().unwrap().input = text.to_string();
    }

    pub fn input(&self) -> String {
        self.state.lock().unwrap().input.clone()
    }

    pub fn set_selection(&self, selected: bool) {
        self.state.lock().unwrap().has_selection = selected;
    }

    pub fn has_selection(&self) -> bool {
        self.state.lock().unwrap().has_selection
    }

    pub fn active(&self) -> Option<ElementId> {
        self.state.lock().unwrap().active
    }
}

impl FocusSurface for SimulatedSurface {
    fn active_element(&self) -> Option<ElementId> {
        self.state.lock().unwrap().active
    }

    fn focus(&self, id: ElementId) {
        let mut state = self.state.lock().unwrap();
        if state.elements.iter().any(|(e, attached)| *e == id && *attached) {
            state.active = Some(id);
        }
    }

    fn blur(&self) {
        self.state.lock().unwrap().active = None;
    }

    fn is_attached(&self, id: ElementId) -> bool {
        self.state
            .lock()
            .unwrap()
            .elements
            .iter()
            .any(|(e, attached)| *e == id && *attached)
    }

    fn focusable_elements(&self) -> Vec<ElementId> {
        self.state
            .lock()
            .unwrap()
            .elements
            .iter()
            .filter(|(_, attached)| *attached)
            .map(|(e, _)| *e)
            .collect()
    }

    fn clear_selection(&self) {
        self.state.lock().unwrap().has_selection = false;
    }

    fn clear_input(&self) {
        self.state.lock().unwrap().input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E1: ElementId = ElementId(1);
    const E2: ElementId = ElementId(2);
    const E3: ElementId = ElementId(3);

    fn surface_with_three() -> Arc<SimulatedSurface> {
        let surface = Arc::new(SimulatedSurface::new());
        surface.add_element(E1);
        surface.add_element(E2);
        surface.add_element(E3);
        surface
    }

    #[test]
    fn restores_last_focused_when_still_attached() {
        let surface = surface_with_three();
        let guard = FocusGuard::new(surface.clone());
        guard.capture_focus(E2);

        guard.on_window_shown();
        assert_eq!(surface.active(), Some(E2));
    }

    #[test]
    fn stale_last_focus_falls_back_to_default_target() {
        let surface = surface_with_three();
        let guard = FocusGuard::new(surface.clone()).with_default_target(E1);
        guard.capture_focus(E3);
        surface.detach(E3);

        guard.on_window_shown();
        assert_eq!(surface.active(), Some(E1));
    }

    #[test]
    fn falls_back_to_first_focusable_when_everything_is_stale() {
        let surface = surface_with_three();
        let guard = FocusGuard::new(surface.clone()).with_default_target(E2);
        guard.capture_focus(E3);
        surface.detach(E3);
        surface.detach(E2);

        guard.on_window_shown();
        assert_eq!(surface.active(), Some(E1));
    }

    #[test]
    fn shown_with_no_focusables_focuses_nothing() {
        let surface = Arc::new(SimulatedSurface::new());
        let guard = FocusGuard::new(surface.clone());

        guard.on_window_shown();
        assert_eq!(surface.active(), None);
    }

    #[test]
    fn hidden_clears_selection_input_and_focus_but_keeps_last_focused() {
        let surface = surface_with_three();
        let guard = FocusGuard::new(surface.clone());
        guard.capture_focus(E2);
        surface.focus(E2);
        surface.set_input("half-typed query");
        surface.set_selection(true);

        guard.on_window_hidden();

        assert!(!surface.has_selection());
        assert_eq!(surface.active(), None);
        assert!(surface.input().is_empty());
        // the reference survives the hide for the next show
        assert_eq!(guard.focus_state().last_focused, Some(E2));
    }

    #[test]
    fn tab_on_last_wraps_to_first() {
        let surface = surface_with_three();
        let guard = FocusGuard::new(surface.clone());
        surface.focus(E3);

        assert!(guard.trap_tab(false));
        assert_eq!(surface.active(), Some(E1));
    }

    #[test]
    fn shift_tab_on_first_wraps_to_last() {
        let surface = surface_with_three();
        let guard = FocusGuard::new(surface.clone());
        surface.focus(E1);

        assert!(guard.trap_tab(true));
        assert_eq!(surface.active(), Some(E3));
    }

    #[test]
    fn tab_in_the_middle_passes_through() {
        let surface = surface_with_three();
        let guard = FocusGuard::new(surface.clone());
        surface.focus(E2);

        assert!(!guard.trap_tab(false));
        assert!(!guard.trap_tab(true));
        // native order trusted, active element untouched
        assert_eq!(surface.active(), Some(E2));
    }

    #[test]
    fn focusable_set_is_recomputed_not_cached() {
        let surface = surface_with_three();
        let guard = FocusGuard::new(surface.clone());
        surface.focus(E2);

        // E3 detaches after the guard has already been used once
        assert!(!guard.trap_tab(false));
        surface.detach(E3);

        // now E2 is the last member, so plain Tab wraps
        assert!(guard.trap_tab(false));
        assert_eq!(surface.active(), Some(E1));
    }
}
