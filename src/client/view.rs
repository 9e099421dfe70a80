//! Presentation surface driven by the request controller.

use crate::models::SearchKind;
use crate::render::{AuthorCard, ResultsPanel};

/// Label shown on the control of a search that is in flight
pub const BUSY_LABEL: &str = "Investigando...";

/// Message shown when a failure carries no message of its own
pub const GENERIC_CLIENT_ERROR: &str =
    "Ocorreu um erro ao buscar os dados. Tente novamente em instantes.";

/// Label shown on an idle search control
pub fn idle_label(kind: SearchKind) -> &'static str {
    match kind {
        SearchKind::AuthorList => "Buscar Escritores",
        SearchKind::SubgenreEssay => "Buscar Subgênero",
    }
}

/// State of one search-initiating control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Not clickable, idle label
    Disabled,
    /// Clickable, idle label
    Ready,
    /// Not clickable, busy indicator
    Busy,
}

impl ControlState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ControlState::Ready)
    }

    /// Label for the control of `kind` in this state
    pub fn label(&self, kind: SearchKind) -> &'static str {
        match self {
            ControlState::Busy => BUSY_LABEL,
            ControlState::Disabled | ControlState::Ready => idle_label(kind),
        }
    }
}

/// Everything the controller may change on screen
///
/// Implementations only draw; all state decisions live in the controller.
pub trait SearchView: Send {
    fn set_selector_enabled(&mut self, enabled: bool);

    fn clear_selection(&mut self);

    fn set_control(&mut self, kind: SearchKind, state: ControlState);

    /// Enter the loading state: heading set, placeholder and cards hidden
    fn show_loading(&mut self, heading: &str);

    /// Reveal the results section with freshly rendered cards
    fn show_results(&mut self, panel: &ResultsPanel);

    /// Hide the results section and show `message` in the placeholder area
    fn show_error(&mut self, message: &str);

    /// A card was expanded or collapsed
    fn card_toggled(&mut self, _card: &AuthorCard) {}
}
