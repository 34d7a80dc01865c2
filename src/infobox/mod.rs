//! Collapsible info panel with a show/hide toggle.

mod loader;

pub use loader::{InfoBoxLoader, LoadOutcome, INFOBOX_CONTAINER_ID};

use crate::error::UiError;
use crate::logging::{self, obj, v_str, Domain};
use crate::ui::{EventKind, Listener, Ui};

pub const TOGGLE_ID: &str = "toggleInfoButton";
pub const PANEL_ID: &str = "infoBox";
pub const SHOWN_CLASS: &str = "show";
pub const HIDE_TEXT: &str = "Hide";
pub const SHOW_TEXT: &str = "Show";

#[derive(Debug, Default)]
pub struct InfoBox {
    initialized: bool,
}

impl InfoBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Attach the toggle behavior. Safe to call repeatedly: the listener is
    /// attached at most once per toggle element. Returns whether the toggle
    /// is wired after the call.
    pub fn initialize(&mut self, ui: &mut dyn Ui) -> bool {
        if let Some(missing) = [TOGGLE_ID, PANEL_ID].into_iter().find(|id| !ui.exists(id)) {
            logging::warn(
                Domain::InfoBox,
                "missing_element",
                obj(&[("id", v_str(missing)), ("msg", v_str("element not present, skipping init"))]),
            );
            return false;
        }
        match ui.listen(TOGGLE_ID, EventKind::Click, Listener::ToggleInfoBox) {
            Ok(attached) => {
                logging::debug(
                    Domain::InfoBox,
                    "initialized",
                    obj(&[("newly_attached", serde_json::Value::Bool(attached))]),
                );
                self.initialized = true;
                true
            }
            Err(e) => {
                logging::warn(Domain::InfoBox, "init_failed", obj(&[("msg", v_str(&e.to_string()))]));
                false
            }
        }
    }

    /// Flip the panel and relabel the toggle. Returns whether the panel is
    /// now shown.
    pub fn toggle(&self, ui: &mut dyn Ui) -> Result<bool, UiError> {
        let shown = ui.has_class(PANEL_ID, SHOWN_CLASS)?;
        if shown {
            ui.remove_class(PANEL_ID, SHOWN_CLASS)?;
            ui.set_text(TOGGLE_ID, SHOW_TEXT)?;
        } else {
            ui.add_class(PANEL_ID, SHOWN_CLASS)?;
            ui.set_text(TOGGLE_ID, HIDE_TEXT)?;
        }
        Ok(!shown)
    }
}
