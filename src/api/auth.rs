//! `/auth` endpoints.

use crate::api::client::ApiRequest;
use crate::api::error::ApiError;
use crate::api::types::{AuthResponse, Credentials, SignupRequest, User};
use crate::store::auth::BearerToken;

/// `POST /auth/login`. Sent without credentials so that a 401 here means
/// "wrong password", never "your session expired".
pub fn login(credentials: &Credentials) -> ApiRequest {
    ApiRequest::post(&["auth", "login"]).json(credentials).anonymous()
}

/// `POST /auth/signup`.
pub fn signup(request: &SignupRequest) -> ApiRequest {
    ApiRequest::post(&["auth", "signup"]).json(request).anonymous()
}

impl AuthResponse {
    /// Split a successful auth payload into the two halves of a session.
    ///
    /// A missing or blank token fails even though the HTTP layer succeeded.
    pub fn into_session_parts(self) -> Result<(BearerToken, User), ApiError> {
        let token = self
            .token
            .and_then(BearerToken::parse)
            .ok_or(ApiError::MissingToken)?;
        let user = self
            .user
            .ok_or_else(|| ApiError::Decode("auth response is missing the user profile".to_string()))?;
        Ok((token, user))
    }
}
