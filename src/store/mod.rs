//! Client-side domain state: the cart and the session.

pub mod auth;
pub mod cart;
pub mod mvi;
