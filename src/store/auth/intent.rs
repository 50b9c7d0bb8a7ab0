use crate::api::User;
use crate::store::auth::BearerToken;
use crate::store::mvi::Intent;

#[derive(Debug, Clone)]
pub enum AuthIntent {
    /// Credentials submitted; `request` is a fresh sequence number.
    Submit { request: u64 },
    Succeeded {
        request: u64,
        token: BearerToken,
        user: User,
    },
    Failed { request: u64, reason: String },
    /// User-initiated sign out.
    Logout,
    /// The server answered 401/403 to an authenticated call.
    Invalidate { status: u16 },
}

impl Intent for AuthIntent {}
