//! Request controller: one search in flight, silent cancellation.
//!
//! The controller owns the selection, the in-flight search and the
//! rendered results. Every search gets its own [`CancellationToken`]; a new
//! search or a selection change cancels the previous token before doing
//! anything else. A result is applied only if its search is still the
//! active one, so a superseded call that races to completion never touches
//! the view.

use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::client::api::{ClientError, SearchApi};
use crate::client::view::{ControlState, SearchView};
use crate::models::{SearchKind, SearchOutcome, SearchRequest, SearchResult, Subgenre};
use crate::render::ResultsContainer;

/// Errors from driving the controller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("No subgenre selected")]
    NothingSelected,
}

#[derive(Debug, Clone)]
struct ActiveSearch {
    generation: u64,
    token: CancellationToken,
}

struct ControllerState<V> {
    view: V,
    selection: Option<Subgenre>,
    active: Option<ActiveSearch>,
    next_generation: u64,
    results: ResultsContainer,
}

impl<V: SearchView> ControllerState<V> {
    fn cancel_active(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.token.cancel();
                tracing::debug!(generation = active.generation, "Cancelled in-flight search");
                true
            }
            None => false,
        }
    }

    fn set_controls(&mut self, state: ControlState) {
        for kind in SearchKind::ALL {
            self.view.set_control(kind, state);
        }
    }

    /// Back to idle after a search finished for real
    fn reset(&mut self) {
        self.selection = None;
        self.view.set_selector_enabled(true);
        self.view.clear_selection();
        self.set_controls(ControlState::Disabled);
    }
}

/// Keeps an in-flight search from dangling when its future is dropped
///
/// Dropped before [`RequestController::search`] reaches `finish` (task
/// abort, an outer `select!` winning), it cancels the token and releases the
/// active slot if this search still holds it. The view is not touched, so a
/// dropped search is as silent as a cancelled one.
struct InFlight<'a, V> {
    state: &'a Mutex<ControllerState<V>>,
    ticket: ActiveSearch,
}

impl<V> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        self.ticket.token.cancel();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state
            .active
            .as_ref()
            .is_some_and(|active| active.generation == self.ticket.generation)
        {
            state.active = None;
            tracing::debug!(generation = self.ticket.generation, "Search dropped in flight");
        }
    }
}

/// Drives a [`SearchView`] through `Idle → Loading → {Success, Error, Cancelled} → Idle`
pub struct RequestController<A, V> {
    api: A,
    state: Mutex<ControllerState<V>>,
}

impl<A: SearchApi, V: SearchView> RequestController<A, V> {
    /// Create a controller with nothing selected and all controls disabled
    pub fn new(api: A, mut view: V) -> Self {
        view.set_selector_enabled(true);
        for kind in SearchKind::ALL {
            view.set_control(kind, ControlState::Disabled);
        }
        Self {
            api,
            state: Mutex::new(ControllerState {
                view,
                selection: None,
                active: None,
                next_generation: 0,
                results: ResultsContainer::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState<V>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Change the selected subgenre
    ///
    /// Any in-flight search is cancelled first. Controls become clickable
    /// only while something is selected.
    pub fn select_subgenre(&self, subgenre: Option<Subgenre>) {
        let mut state = self.lock();
        state.cancel_active();
        let controls = if subgenre.is_some() {
            ControlState::Ready
        } else {
            ControlState::Disabled
        };
        state.selection = subgenre;
        state.set_controls(controls);
    }

    pub fn selection(&self) -> Option<Subgenre> {
        self.lock().selection.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.lock().active.is_some()
    }

    /// Abandon the in-flight search, if any, without touching the view
    pub fn cancel(&self) -> bool {
        self.lock().cancel_active()
    }

    /// Run a search of `kind` for the selected subgenre
    ///
    /// Returns [`SearchOutcome::Cancelled`] when the search was superseded or
    /// cancelled before its result could be applied.
    pub async fn search(&self, kind: SearchKind) -> Result<SearchOutcome, ControllerError> {
        let (request, ticket) = self.begin(kind)?;
        let in_flight = InFlight {
            state: &self.state,
            ticket,
        };
        let result = self.api.search(&request, &in_flight.ticket.token).await;
        Ok(self.finish(&in_flight.ticket, result))
    }

    fn begin(&self, kind: SearchKind) -> Result<(SearchRequest, ActiveSearch), ControllerError> {
        let mut state = self.lock();
        let subgenre = state
            .selection
            .clone()
            .ok_or(ControllerError::NothingSelected)?;

        state.cancel_active();
        let ticket = ActiveSearch {
            generation: state.next_generation,
            token: CancellationToken::new(),
        };
        state.next_generation += 1;
        state.active = Some(ticket.clone());

        for control in SearchKind::ALL {
            let control_state = if control == kind {
                ControlState::Busy
            } else {
                ControlState::Disabled
            };
            state.view.set_control(control, control_state);
        }
        state.view.show_loading(&subgenre.name);

        tracing::debug!(
            generation = ticket.generation,
            subgenre = %subgenre.id,
            kind = %kind,
            "Search started"
        );
        Ok((SearchRequest::new(subgenre.id, kind), ticket))
    }

    fn finish(
        &self,
        ticket: &ActiveSearch,
        result: Result<SearchResult, ClientError>,
    ) -> SearchOutcome {
        let mut state = self.lock();

        let is_active = state
            .active
            .as_ref()
            .is_some_and(|active| active.generation == ticket.generation);
        if !is_active || ticket.token.is_cancelled() {
            tracing::debug!(generation = ticket.generation, "Discarding superseded search");
            return SearchOutcome::Cancelled;
        }
        state.active = None;
        if matches!(result, Err(ClientError::Cancelled)) {
            tracing::debug!(generation = ticket.generation, "Search cancelled");
            return SearchOutcome::Cancelled;
        }

        let outcome = match result {
            Ok(result) => {
                let state = &mut *state;
                let panel = state.results.replace(result.clone());
                state.view.show_results(panel);
                SearchOutcome::Success(result)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Search failed");
                let message = err.user_message();
                state.results.clear();
                state.view.show_error(&message);
                SearchOutcome::Failure(message)
            }
        };

        state.reset();
        outcome
    }

    /// Expand or collapse the author card `card_id`
    pub fn toggle_card(&self, card_id: &str) -> Option<bool> {
        let mut state = self.lock();
        let state = &mut *state;
        let expanded = state.results.toggle(card_id)?;
        if let Some(card) = state.results.panel().and_then(|panel| panel.card(card_id)) {
            state.view.card_toggled(card);
        }
        Some(expanded)
    }

    /// Inspect the view
    pub fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.lock().view)
    }

    /// Inspect the rendered results
    pub fn with_results<R>(&self, f: impl FnOnce(&ResultsContainer) -> R) -> R {
        f(&self.lock().results)
    }
}
