//! Reducer trait for the MVI loop.

use super::intent::Intent;
use super::state::DomainState;

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where domain transitions happen.
/// It must be a pure function: (State, Intent) -> State. It never fails;
/// invalid input is normalized into a valid state.
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: DomainState;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Process an intent and return the new state.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
