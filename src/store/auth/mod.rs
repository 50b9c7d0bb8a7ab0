mod intent;
mod reducer;
mod state;
mod token;

pub use intent::AuthIntent;
pub use reducer::AuthReducer;
pub use state::{AuthState, AuthStatus, Session};
pub use token::BearerToken;
