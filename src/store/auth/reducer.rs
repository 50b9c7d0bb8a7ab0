//! Reducer for the session lifecycle.

use crate::store::mvi::Reducer;

use super::intent::AuthIntent;
use super::state::{AuthState, AuthStatus, Session};

/// Session state machine:
///
/// ```text
/// Anonymous ──Submit──→ Authenticating ──Succeeded──→ Authenticated
///     ↑                      │                             │
///     └──────Failed──────────┘                             │
///     └──────────────Logout / Invalidate───────────────────┘
/// ```
///
/// Responses for anything but the latest submitted request are stale and
/// leave the state untouched. Persisting the session is the caller's job.
pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Intent = AuthIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            AuthIntent::Submit { request } => AuthState {
                session: state.session,
                status: AuthStatus::Authenticating { request },
                error: None,
            },

            AuthIntent::Succeeded {
                request,
                token,
                user,
            } => {
                if state.pending_request() != Some(request) {
                    return state;
                }
                AuthState::with_session(Session::Authenticated { token, user })
            }

            AuthIntent::Failed { request, reason } => {
                if state.pending_request() != Some(request) {
                    return state;
                }
                AuthState {
                    session: Session::Anonymous,
                    status: AuthStatus::Idle,
                    error: Some(reason),
                }
            }

            AuthIntent::Logout | AuthIntent::Invalidate { .. } => AuthState::default(),
        }
    }
}
