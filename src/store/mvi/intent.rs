//! Base trait for intents in the MVI loop.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (add to cart, log out)
/// - Resolved network responses (login succeeded, request rejected)
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {}
