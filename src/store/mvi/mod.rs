//! Model-View-Intent (MVI) primitives for the storefront domains.
//!
//! Every piece of client state that survives a restart is driven through
//! this unidirectional loop:
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Persist / Front-end
//!    ↑                                   │
//!    └───────────────────────────────────┘
//! ```
//!
//! - **State**: immutable snapshot of one domain (cart, auth)
//! - **Intent**: user action or resolved network response
//! - **Reducer**: pure function producing the next snapshot

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::DomainState;
