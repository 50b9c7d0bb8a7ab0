//! Client-side core of an e-commerce storefront.
//!
//! Cart and session state are driven by pure reducers ([`store`]), survive
//! restarts through [`persist`], and talk to the REST service through
//! [`api`]. [`app::Storefront`] wires the three together.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod forms;
pub mod guard;
pub mod logging;
pub mod persist;
pub mod store;

pub use app::{AppError, AppState, Storefront};
