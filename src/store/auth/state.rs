use serde::{Deserialize, Serialize};

use crate::api::User;
use crate::store::auth::BearerToken;
use crate::store::mvi::DomainState;

/// Who the client is talking to the server as.
///
/// Token and user only exist together; "token without user" cannot be
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { token: BearerToken, user: User },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&BearerToken> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            Session::Anonymous => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated { user, .. } => Some(user),
            Session::Anonymous => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    Idle,
    /// A login/registration attempt is in flight. Only the response carrying
    /// this sequence number may resolve it.
    Authenticating { request: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    pub session: Session,
    pub status: AuthStatus,
    /// Human-readable reason of the last failed attempt.
    pub error: Option<String>,
}

impl DomainState for AuthState {}

impl AuthState {
    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, AuthStatus::Authenticating { .. })
    }

    pub fn pending_request(&self) -> Option<u64> {
        match self.status {
            AuthStatus::Authenticating { request } => Some(request),
            AuthStatus::Idle => None,
        }
    }
}
